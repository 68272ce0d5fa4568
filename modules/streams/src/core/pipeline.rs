//! Detached, reusable chains of stages.

#[cfg(test)]
mod tests;

use alloc::{sync::Arc, vec::Vec};
use core::{cmp::Ordering, convert::Infallible, fmt::Display, future::Future, hash::Hash, marker::PhantomData};

use futures::{
  FutureExt, TryFutureExt,
  future::{Map, UnwrapOrElse},
};

use super::{
  FlowDefinition, Groups, Keyed, StageKind, Stream, StreamDslError,
  flow::{
    async_filter_definition, async_reduce_definition, batch_definition, collect_definition, drop_definition,
    filter_definition, flat_map_definition, group_by_definition, key_by_definition, last_definition, map_definition,
    make_async_definition, reduce_definition, reduce1_definition, resolve_definition, sort_by_definition,
    stop_when_definition, take_definition, try_map_definition, try_tap_definition, uniq_by_definition,
  },
  stream::settle_fallible,
};

type FlowFactory = Arc<dyn Fn() -> FlowDefinition + Send + Sync>;

/// Immutable chain of transformations that is not yet bound to a source.
///
/// A pipeline stores stage factories rather than stages: every [`Pipeline::attach`] (or
/// [`Stream::through`]) instantiates fresh stage state, so one pipeline can serve any number of
/// streams independently. Closures must therefore be `Clone`.
///
/// ```
/// use exstream_rs::core::{Pipeline, Stream};
///
/// let double_small = Pipeline::<u32, u32>::new().map(|value| value * 2).filter(|value| *value < 6);
/// let first = Stream::from_iterator([1_u32, 2, 3]).through(&double_small).values();
/// let second = Stream::from_iterator([0_u32, 5]).through(&double_small).values();
/// assert_eq!(first.into_immediate(), Some(Ok(vec![2, 4])));
/// assert_eq!(second.into_immediate(), Some(Ok(vec![0])));
/// ```
pub struct Pipeline<In, Out> {
  factories: Vec<FlowFactory>,
  _pd:       PhantomData<fn(In) -> Out>,
}

impl<In, Out> Clone for Pipeline<In, Out> {
  fn clone(&self) -> Self {
    Self { factories: self.factories.clone(), _pd: PhantomData }
  }
}

impl<T> Pipeline<T, T>
where
  T: Send + 'static,
{
  /// Creates a pipeline that passes elements through unchanged.
  #[must_use]
  pub const fn new() -> Self {
    Self { factories: Vec::new(), _pd: PhantomData }
  }
}

impl<T> Default for Pipeline<T, T>
where
  T: Send + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<In, Out> Pipeline<In, Out>
where
  In: Send + 'static,
  Out: Send + 'static,
{
  fn push<U, F>(mut self, factory: F) -> Pipeline<In, U>
  where
    F: Fn() -> FlowDefinition + Send + Sync + 'static, {
    self.factories.push(Arc::new(factory));
    Pipeline { factories: self.factories, _pd: PhantomData }
  }

  /// Returns the number of stages.
  #[must_use]
  pub fn len(&self) -> usize {
    self.factories.len()
  }

  /// Returns `true` when the pipeline has no stages.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.factories.is_empty()
  }

  /// Appends fresh instances of this pipeline's stages to `stream`.
  #[must_use]
  pub fn attach(&self, stream: Stream<In>) -> Stream<Out> {
    stream.push_all(self.factories.iter().map(|factory| factory()))
  }

  /// Appends the stages of `next` after this pipeline's stages.
  #[must_use]
  pub fn via<U>(mut self, next: &Pipeline<Out, U>) -> Pipeline<In, U>
  where
    U: Send + 'static, {
    self.factories.extend(next.factories.iter().cloned());
    Pipeline { factories: self.factories, _pd: PhantomData }
  }

  /// Adds a map stage.
  #[must_use]
  pub fn map<U, F>(self, func: F) -> Pipeline<In, U>
  where
    U: Send + 'static,
    F: FnMut(Out) -> U + Clone + Send + Sync + 'static, {
    self.push(move || map_definition::<Out, U, F>(func.clone()))
  }

  /// Adds a fallible map stage.
  #[must_use]
  pub fn try_map<U, E, F>(self, func: F) -> Pipeline<In, U>
  where
    U: Send + 'static,
    E: Display + 'static,
    F: FnMut(Out) -> Result<U, E> + Clone + Send + Sync + 'static, {
    self.push(move || try_map_definition::<Out, U, E, F>(func.clone()))
  }

  /// Adds a filter stage.
  #[must_use]
  pub fn filter<F>(self, predicate: F) -> Pipeline<In, Out>
  where
    F: FnMut(&Out) -> bool + Clone + Send + Sync + 'static, {
    self.push(move || filter_definition::<Out, F>(predicate.clone()))
  }

  /// Adds a stage that drops elements matching `predicate`.
  #[must_use]
  pub fn reject<F>(self, predicate: F) -> Pipeline<In, Out>
  where
    F: FnMut(&Out) -> bool + Clone + Send + Sync + 'static, {
    self.push(move || {
      let mut predicate = predicate.clone();
      filter_definition::<Out, _>(move |value: &Out| !predicate(value))
    })
  }

  /// Adds an asynchronous filter stage.
  #[must_use]
  pub fn async_filter<F, Fut>(self, predicate: F) -> Pipeline<In, Out>
  where
    F: FnMut(&Out) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static, {
    self.push(move || async_filter_definition::<Out, F, Fut>(predicate.clone()))
  }

  /// Adds a fold stage seeded with a clone of `seed` on every attachment.
  #[must_use]
  pub fn reduce<Acc, F>(self, seed: Acc, func: F) -> Pipeline<In, Acc>
  where
    Acc: Clone + Send + Sync + 'static,
    F: FnMut(Acc, Out) -> Acc + Clone + Send + Sync + 'static, {
    self.push(move || reduce_definition::<Out, Acc, F>(seed.clone(), func.clone()))
  }

  /// Adds a fold stage seeded with the first element.
  #[must_use]
  pub fn reduce1<F>(self, func: F) -> Pipeline<In, Out>
  where
    F: FnMut(Out, Out) -> Out + Clone + Send + Sync + 'static, {
    self.push(move || reduce1_definition::<Out, F>(func.clone()))
  }

  /// Adds an asynchronous fold stage.
  #[must_use]
  pub fn async_reduce<Acc, F, Fut>(self, seed: Acc, func: F) -> Pipeline<In, Acc>
  where
    Acc: Clone + Send + Sync + 'static,
    F: FnMut(Acc, Out) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Acc> + Send + 'static, {
    self.push(move || async_reduce_definition::<Out, Acc, F, Fut>(seed.clone(), func.clone()))
  }

  /// Adds a batching stage.
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError`] when `size` is zero.
  pub fn batch(self, size: usize) -> Result<Pipeline<In, Vec<Out>>, StreamDslError> {
    let size = StreamDslError::require_positive("size", size)?;
    Ok(self.push(move || batch_definition::<Out>(size)))
  }

  /// Adds a side-effect stage.
  #[must_use]
  pub fn tap<F>(self, func: F) -> Pipeline<In, Out>
  where
    F: FnMut(&Out) + Clone + Send + Sync + 'static, {
    self.push(move || {
      let mut func = func.clone();
      try_tap_definition::<Out, Infallible, _>(move |value: &Out| {
        func(value);
        Ok(())
      })
    })
  }

  /// Adds a fallible side-effect stage.
  #[must_use]
  pub fn try_tap<E, F>(self, func: F) -> Pipeline<In, Out>
  where
    E: Display + 'static,
    F: FnMut(&Out) -> Result<(), E> + Clone + Send + Sync + 'static, {
    self.push(move || try_tap_definition::<Out, E, F>(func.clone()))
  }

  /// Adds a stage that defers consumption without changing elements.
  #[must_use]
  pub fn make_async(self) -> Pipeline<In, Out> {
    self.push(make_async_definition::<Out>)
  }

  /// Adds a stage passing at most `count` elements.
  #[must_use]
  pub fn take(self, count: usize) -> Pipeline<In, Out> {
    self.push(move || take_definition::<Out>(count))
  }

  /// Adds a stage passing only the first element.
  #[must_use]
  pub fn head(self) -> Pipeline<In, Out> {
    self.take(1)
  }

  /// Adds a stage skipping the first `count` elements.
  #[must_use]
  pub fn drop(self, count: usize) -> Pipeline<In, Out> {
    self.push(move || drop_definition::<Out>(count))
  }

  /// Adds stages passing the elements with index in `start..end`.
  #[must_use]
  pub fn slice(self, start: usize, end: usize) -> Pipeline<In, Out> {
    self.drop(start).take(end.saturating_sub(start))
  }

  /// Adds a stage emitting only the final element.
  #[must_use]
  pub fn last(self) -> Pipeline<In, Out> {
    self.push(last_definition::<Out>)
  }

  /// Adds stages emitting the first element matching `predicate`.
  #[must_use]
  pub fn find<F>(self, predicate: F) -> Pipeline<In, Out>
  where
    F: FnMut(&Out) -> bool + Clone + Send + Sync + 'static, {
    self.filter(predicate).take(1)
  }

  /// Adds a de-duplication stage.
  #[must_use]
  pub fn uniq(self) -> Pipeline<In, Out>
  where
    Out: Eq + Hash + Clone, {
    self.uniq_by(Out::clone)
  }

  /// Adds a de-duplication stage keyed by `key`.
  #[must_use]
  pub fn uniq_by<K, F>(self, key: F) -> Pipeline<In, Out>
  where
    K: Eq + Hash + Send + 'static,
    F: FnMut(&Out) -> K + Clone + Send + Sync + 'static, {
    self.push(move || uniq_by_definition::<Out, K, F>(key.clone()))
  }

  /// Adds a flat-map stage.
  #[must_use]
  pub fn flat_map<I, F>(self, func: F) -> Pipeline<In, I::Item>
  where
    I: IntoIterator + 'static,
    I::Item: Send + 'static,
    F: FnMut(Out) -> I + Clone + Send + Sync + 'static, {
    self.push(move || flat_map_definition::<Out, F, I>(StageKind::FlowFlatMap, func.clone()))
  }

  /// Adds a stage gathering every element into one vector.
  #[must_use]
  pub fn collect(self) -> Pipeline<In, Vec<Out>> {
    self.push(collect_definition::<Out>)
  }

  /// Adds a grouping stage.
  #[must_use]
  pub fn group_by<K, F>(self, key: F) -> Pipeline<In, Groups<K, Out>>
  where
    K: Eq + Hash + Send + 'static,
    F: FnMut(&Out) -> K + Clone + Send + Sync + 'static, {
    self.push(move || group_by_definition::<Out, K, F>(key.clone()))
  }

  /// Adds an indexing stage.
  #[must_use]
  pub fn key_by<K, F>(self, key: F) -> Pipeline<In, Keyed<K, Out>>
  where
    K: Eq + Hash + Send + 'static,
    F: FnMut(&Out) -> K + Clone + Send + Sync + 'static, {
    self.push(move || key_by_definition::<Out, K, F>(key.clone()))
  }

  /// Adds an ascending sort stage.
  #[must_use]
  pub fn sort(self) -> Pipeline<In, Out>
  where
    Out: Ord, {
    self.sort_by(Out::cmp)
  }

  /// Adds a stable sort stage ordered by `compare`.
  #[must_use]
  pub fn sort_by<C>(self, compare: C) -> Pipeline<In, Out>
  where
    C: FnMut(&Out, &Out) -> Ordering + Clone + Send + Sync + 'static, {
    self.push(move || sort_by_definition::<Out, C>(compare.clone()))
  }

  /// Adds a stage that completes the stream when `predicate` holds.
  #[must_use]
  pub fn stop_when<F>(self, predicate: F) -> Pipeline<In, Out>
  where
    F: FnMut(&Out) -> bool + Clone + Send + Sync + 'static, {
    self.push(move || stop_when_definition::<Out, F>(predicate.clone()))
  }
}

impl<In, Fut> Pipeline<In, Fut>
where
  In: Send + 'static,
  Fut: Future + Send + 'static,
  Fut::Output: Send + 'static,
{
  /// Adds an ordered resolve stage with parallelism one.
  #[must_use]
  pub fn resolve(self) -> Pipeline<In, Fut::Output> {
    self.push(|| resolve_definition::<Fut, Fut::Output>(1, true, Ok))
  }

  /// Adds an ordered resolve stage with bounded parallelism.
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError`] when `parallelism` is zero.
  pub fn resolve_with(self, parallelism: usize) -> Result<Pipeline<In, Fut::Output>, StreamDslError> {
    let parallelism = StreamDslError::require_positive("parallelism", parallelism)?;
    Ok(self.push(move || resolve_definition::<Fut, Fut::Output>(parallelism, true, Ok)))
  }

  /// Adds a resolve stage that emits in completion order.
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError`] when `parallelism` is zero.
  pub fn resolve_unordered(self, parallelism: usize) -> Result<Pipeline<In, Fut::Output>, StreamDslError> {
    let parallelism = StreamDslError::require_positive("parallelism", parallelism)?;
    Ok(self.push(move || resolve_definition::<Fut, Fut::Output>(parallelism, false, Ok)))
  }

  /// Adds a stage chaining `func` onto every future-valued element.
  #[must_use]
  pub fn mass_then<U, F>(self, func: F) -> Pipeline<In, Map<Fut, F>>
  where
    U: Send + 'static,
    F: FnOnce(Fut::Output) -> U + Clone + Send + Sync + 'static, {
    self.map(move |future: Fut| future.map(func.clone()))
  }
}

impl<In, Fut, U, E> Pipeline<In, Fut>
where
  In: Send + 'static,
  Fut: Future<Output = Result<U, E>> + Send + 'static,
  U: Send + 'static,
  E: Display + 'static,
{
  /// Adds an ordered resolve stage for fallible futures.
  #[must_use]
  pub fn try_resolve(self) -> Pipeline<In, U> {
    self.push(|| resolve_definition::<Fut, U>(1, true, settle_fallible::<U, E>))
  }
}

impl<In, Fut, U, E> Pipeline<In, Fut>
where
  In: Send + 'static,
  Fut: Future<Output = Result<U, E>> + Send + 'static,
  U: Send + 'static,
  E: 'static,
{
  /// Adds a stage replacing the error of every failing future-valued element with `func(error)`.
  #[must_use]
  pub fn mass_catch<F>(self, func: F) -> Pipeline<In, UnwrapOrElse<Fut, F>>
  where
    F: FnOnce(E) -> U + Clone + Send + Sync + 'static, {
    self.map(move |future: Fut| future.unwrap_or_else(func.clone()))
  }
}

impl<In, C> Pipeline<In, C>
where
  In: Send + 'static,
  C: IntoIterator + Send + 'static,
  C::Item: Send + 'static,
{
  /// Adds a stage emitting the items of each collection-valued element.
  #[must_use]
  pub fn flatten(self) -> Pipeline<In, C::Item> {
    self.push(|| flat_map_definition::<C, _, C>(StageKind::FlowFlatten, core::convert::identity))
  }
}

impl<In, U> Pipeline<In, Option<U>>
where
  In: Send + 'static,
  U: Send + 'static,
{
  /// Adds a stage dropping `None` elements.
  #[must_use]
  pub fn compact(self) -> Pipeline<In, U> {
    self.push(|| flat_map_definition::<Option<U>, _, Option<U>>(StageKind::FlowCompact, core::convert::identity))
  }
}
