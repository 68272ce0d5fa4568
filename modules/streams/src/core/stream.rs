//! Lazy stream builder.

#[cfg(test)]
mod tests;

use alloc::vec::Vec;
use core::{cmp::Ordering, convert::Infallible, fmt::Display, future::Future, hash::Hash, marker::PhantomData};

use futures::{
  FutureExt, TryFutureExt,
  future::{Map, UnwrapOrElse},
};

use super::{
  ErrorPolicy, Evaluation, FlowDefinition, Groups, Keyed, Pipeline, SinkDefinition, SourceDefinition, StageKind,
  StreamCompletion, StreamConfig, StreamControl, StreamDslError, StreamError, StreamErrors, StreamFuture, StreamIter,
  StreamPlan, SyncIter,
  flow::{
    async_filter_definition, async_reduce_definition, batch_definition, collect_definition, drop_definition,
    filter_definition, flat_map_definition, group_by_definition, key_by_definition, last_definition, map_definition,
    make_async_definition, reduce_definition, reduce1_definition, resolve_definition, sort_by_definition,
    stop_when_definition, take_definition, try_map_definition, try_tap_definition, uniq_by_definition,
  },
  sink::{
    collect_sink_definition, first_sink_definition, foreach_sink_definition, ignore_sink_definition,
    pipe_sink_definition, queue_sink_definition, to_array_sink_definition,
  },
  sink_queue::SinkQueue,
  source::{
    async_source_definition, failed_source_definition, fn_source_definition, iterator_source_definition,
    try_async_source_definition, try_iterator_source_definition,
  },
  stream_interpreter::StreamInterpreter,
};

/// Lazy, ordered sequence of `T` built from a source and a chain of transformations.
///
/// Building a stream never touches the source. Elements are pulled only once a consumption
/// method (such as [`Stream::values`] or [`Stream::pipe`]) is called and its evaluation is driven.
/// A stream is asynchronous when its source or any stage is asynchronous; that is decided as the
/// stages are appended, never by looking at the produced values.
pub struct Stream<T> {
  plan:    StreamPlan,
  config:  StreamConfig,
  control: StreamControl,
  errors:  StreamErrors,
  _pd:     PhantomData<fn() -> T>,
}

impl<T> Stream<T>
where
  T: Send + 'static,
{
  /// Creates a stream over a finite sequence or synchronous generator.
  #[must_use]
  pub fn from_iterator<I>(values: I) -> Self
  where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static, {
    Self::from_source(iterator_source_definition(StageKind::SourceIterator, values.into_iter()))
  }

  /// Creates a stream over the elements of `values`.
  #[must_use]
  pub fn from_vec(values: Vec<T>) -> Self {
    Self::from_iterator(values)
  }

  /// Creates a stream that emits `value` once.
  #[must_use]
  pub fn of(value: T) -> Self {
    Self::from_source(iterator_source_definition(StageKind::SourceSingle, core::iter::once(value)))
  }

  /// Creates a stream that completes without emitting.
  #[must_use]
  pub fn empty() -> Self {
    Self::from_source(iterator_source_definition(StageKind::SourceEmpty, core::iter::empty::<T>()))
  }

  /// Creates a stream from a generator closure; the first `None` ends the stream.
  #[must_use]
  pub fn from_fn<F>(func: F) -> Self
  where
    F: FnMut() -> Option<T> + Send + 'static, {
    Self::from_source(fn_source_definition(func))
  }

  /// Creates a stream from a fallible sequence. `Err` items become source errors.
  #[must_use]
  pub fn try_from_iterator<I, E>(values: I) -> Self
  where
    I: IntoIterator<Item = Result<T, E>>,
    I::IntoIter: Send + 'static,
    E: Display + 'static, {
    Self::from_source(try_iterator_source_definition(values.into_iter()))
  }

  /// Creates a stream whose source fails on the first pull.
  #[must_use]
  pub fn failed(error: impl Display) -> Self {
    Self::from_source(failed_source_definition::<T>(StreamError::source(error)))
  }

  /// Creates an asynchronous stream over a [`futures::Stream`].
  #[must_use]
  pub fn from_async<S>(stream: S) -> Self
  where
    S: futures::Stream<Item = T> + Send + 'static, {
    Self::from_async_kind(StageKind::SourceAsync, stream)
  }

  /// Creates an asynchronous stream over a fallible [`futures::Stream`].
  #[must_use]
  pub fn try_from_async<S, E>(stream: S) -> Self
  where
    S: futures::Stream<Item = Result<T, E>> + Send + 'static,
    E: Display + 'static, {
    Self::try_from_async_kind(StageKind::SourceAsync, stream)
  }

  pub(crate) fn from_async_kind<S>(kind: StageKind, stream: S) -> Self
  where
    S: futures::Stream<Item = T> + Send + 'static, {
    Self::from_source(async_source_definition(kind, stream))
  }

  pub(crate) fn try_from_async_kind<S, E>(kind: StageKind, stream: S) -> Self
  where
    S: futures::Stream<Item = Result<T, E>> + Send + 'static,
    E: Display + 'static, {
    Self::from_source(try_async_source_definition(kind, stream))
  }

  pub(crate) fn from_source(source: SourceDefinition) -> Self {
    Self {
      plan:    StreamPlan::from_source(source),
      config:  StreamConfig::default(),
      control: StreamControl::new(),
      errors:  StreamErrors::new(),
      _pd:     PhantomData,
    }
  }

  /// Returns a handle that pauses, resumes, ends or destroys this stream once it runs.
  #[must_use]
  pub fn control(&self) -> StreamControl {
    self.control.clone()
  }

  /// Returns the collection that receives every error recorded while this stream runs.
  #[must_use]
  pub fn errors(&self) -> StreamErrors {
    self.errors.clone()
  }

  /// Returns the evaluation settings.
  #[must_use]
  pub const fn config(&self) -> StreamConfig {
    self.config
  }

  /// Returns `true` when consumption results will be deferred.
  #[must_use]
  pub fn is_async(&self) -> bool {
    self.plan.is_asynchronous()
  }

  /// Replaces the evaluation settings.
  #[must_use]
  pub const fn with_config(mut self, config: StreamConfig) -> Self {
    self.config = config;
    self
  }

  /// Chooses between halting on the first error (`true`, the default) and recording errors while
  /// continuing with the next element (`false`).
  #[must_use]
  pub const fn stop_on_error(mut self, stop: bool) -> Self {
    self.config = self.config.with_error_policy(ErrorPolicy::from_stop_on_error(stop));
    self
  }

  fn push<U>(mut self, definition: FlowDefinition) -> Stream<U> {
    self.plan.push_flow(definition);
    Stream { plan: self.plan, config: self.config, control: self.control, errors: self.errors, _pd: PhantomData }
  }

  pub(crate) fn push_all<U, I>(mut self, definitions: I) -> Stream<U>
  where
    I: IntoIterator<Item = FlowDefinition>, {
    for definition in definitions {
      self.plan.push_flow(definition);
    }
    Stream { plan: self.plan, config: self.config, control: self.control, errors: self.errors, _pd: PhantomData }
  }

  /// Maps each element.
  ///
  /// Mapping to a future yields a stream of futures; follow with [`Stream::resolve`] to await them.
  #[must_use]
  pub fn map<U, F>(self, func: F) -> Stream<U>
  where
    U: Send + 'static,
    F: FnMut(T) -> U + Send + 'static, {
    self.push(map_definition::<T, U, F>(func))
  }

  /// Maps each element with a fallible closure; `Err` becomes a stream error.
  #[must_use]
  pub fn try_map<U, E, F>(self, func: F) -> Stream<U>
  where
    U: Send + 'static,
    E: Display + 'static,
    F: FnMut(T) -> Result<U, E> + Send + 'static, {
    self.push(try_map_definition::<T, U, E, F>(func))
  }

  /// Keeps elements for which `predicate` holds.
  #[must_use]
  pub fn filter<F>(self, predicate: F) -> Stream<T>
  where
    F: FnMut(&T) -> bool + Send + 'static, {
    self.push(filter_definition::<T, F>(predicate))
  }

  /// Drops elements for which `predicate` holds.
  #[must_use]
  pub fn reject<F>(self, mut predicate: F) -> Stream<T>
  where
    F: FnMut(&T) -> bool + Send + 'static, {
    self.filter(move |value| !predicate(value))
  }

  /// Keeps elements for which the asynchronous `predicate` resolves to `true`. Makes the stream
  /// asynchronous.
  #[must_use]
  pub fn async_filter<F, Fut>(self, predicate: F) -> Stream<T>
  where
    F: FnMut(&T) -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static, {
    self.push(async_filter_definition::<T, F, Fut>(predicate))
  }

  /// Folds every element into `seed` and emits the result once the source ends.
  #[must_use]
  pub fn reduce<Acc, F>(self, seed: Acc, func: F) -> Stream<Acc>
  where
    Acc: Send + 'static,
    F: FnMut(Acc, T) -> Acc + Send + 'static, {
    self.push(reduce_definition::<T, Acc, F>(seed, func))
  }

  /// Folds elements using the first one as seed. Emits nothing for an empty source.
  #[must_use]
  pub fn reduce1<F>(self, func: F) -> Stream<T>
  where
    F: FnMut(T, T) -> T + Send + 'static, {
    self.push(reduce1_definition::<T, F>(func))
  }

  /// Folds with an asynchronous closure, one element at a time. Makes the stream asynchronous.
  #[must_use]
  pub fn async_reduce<Acc, F, Fut>(self, seed: Acc, func: F) -> Stream<Acc>
  where
    Acc: Send + 'static,
    F: FnMut(Acc, T) -> Fut + Send + 'static,
    Fut: Future<Output = Acc> + Send + 'static, {
    self.push(async_reduce_definition::<T, Acc, F, Fut>(seed, func))
  }

  /// Groups elements into vectors of `size`; the final group may be shorter.
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError`] when `size` is zero.
  pub fn batch(self, size: usize) -> Result<Stream<Vec<T>>, StreamDslError> {
    let size = StreamDslError::require_positive("size", size)?;
    Ok(self.push(batch_definition::<T>(size)))
  }

  /// Runs `func` for each element and passes the element on.
  #[must_use]
  pub fn tap<F>(self, mut func: F) -> Stream<T>
  where
    F: FnMut(&T) + Send + 'static, {
    self.try_tap(move |value| {
      func(value);
      Ok::<(), Infallible>(())
    })
  }

  /// Runs a fallible side effect for each element; `Err` becomes a stream error.
  #[must_use]
  pub fn try_tap<E, F>(self, func: F) -> Stream<T>
  where
    E: Display + 'static,
    F: FnMut(&T) -> Result<(), E> + Send + 'static, {
    self.push(try_tap_definition::<T, E, F>(func))
  }

  /// Marks the stream asynchronous without changing its elements, so every consumption is
  /// deferred.
  #[must_use]
  pub fn make_async(self) -> Stream<T> {
    self.push(make_async_definition::<T>())
  }

  /// Passes at most `count` elements, then stops pulling.
  #[must_use]
  pub fn take(self, count: usize) -> Stream<T> {
    self.push(take_definition::<T>(count))
  }

  /// Passes the first element only.
  #[must_use]
  pub fn head(self) -> Stream<T> {
    self.take(1)
  }

  /// Skips the first `count` elements.
  #[must_use]
  pub fn drop(self, count: usize) -> Stream<T> {
    self.push(drop_definition::<T>(count))
  }

  /// Passes the elements with index in `start..end`.
  #[must_use]
  pub fn slice(self, start: usize, end: usize) -> Stream<T> {
    self.drop(start).take(end.saturating_sub(start))
  }

  /// Emits only the final element.
  #[must_use]
  pub fn last(self) -> Stream<T> {
    self.push(last_definition::<T>())
  }

  /// Emits the first element matching `predicate`, then stops pulling.
  #[must_use]
  pub fn find<F>(self, predicate: F) -> Stream<T>
  where
    F: FnMut(&T) -> bool + Send + 'static, {
    self.filter(predicate).take(1)
  }

  /// Drops elements equal to one already emitted.
  #[must_use]
  pub fn uniq(self) -> Stream<T>
  where
    T: Eq + Hash + Clone, {
    self.uniq_by(T::clone)
  }

  /// Drops elements whose key was already emitted.
  #[must_use]
  pub fn uniq_by<K, F>(self, key: F) -> Stream<T>
  where
    K: Eq + Hash + Send + 'static,
    F: FnMut(&T) -> K + Send + 'static, {
    self.push(uniq_by_definition::<T, K, F>(key))
  }

  /// Maps each element to a collection and emits its items in order.
  #[must_use]
  pub fn flat_map<I, F>(self, func: F) -> Stream<I::Item>
  where
    I: IntoIterator + 'static,
    I::Item: Send + 'static,
    F: FnMut(T) -> I + Send + 'static, {
    self.push(flat_map_definition::<T, F, I>(StageKind::FlowFlatMap, func))
  }

  /// Gathers every element into a single vector.
  #[must_use]
  pub fn collect(self) -> Stream<Vec<T>> {
    self.push(collect_definition::<T>())
  }

  /// Groups elements by key into a single map; each group keeps arrival order.
  #[must_use]
  pub fn group_by<K, F>(self, key: F) -> Stream<Groups<K, T>>
  where
    K: Eq + Hash + Send + 'static,
    F: FnMut(&T) -> K + Send + 'static, {
    self.push(group_by_definition::<T, K, F>(key))
  }

  /// Indexes elements by key into a single map; a later element replaces an earlier one.
  #[must_use]
  pub fn key_by<K, F>(self, key: F) -> Stream<Keyed<K, T>>
  where
    K: Eq + Hash + Send + 'static,
    F: FnMut(&T) -> K + Send + 'static, {
    self.push(key_by_definition::<T, K, F>(key))
  }

  /// Emits every element in ascending order once the source ends.
  #[must_use]
  pub fn sort(self) -> Stream<T>
  where
    T: Ord, {
    self.sort_by(T::cmp)
  }

  /// Emits every element ordered by `compare` once the source ends. The sort is stable.
  #[must_use]
  pub fn sort_by<C>(self, compare: C) -> Stream<T>
  where
    C: FnMut(&T, &T) -> Ordering + Send + 'static, {
    self.push(sort_by_definition::<T, C>(compare))
  }

  /// Completes normally as soon as `predicate` holds; the matching element is not emitted.
  #[must_use]
  pub fn stop_when<F>(self, predicate: F) -> Stream<T>
  where
    F: FnMut(&T) -> bool + Send + 'static, {
    self.push(stop_when_definition::<T, F>(predicate))
  }

  /// Appends a fresh instance of every stage in `pipeline`.
  #[must_use]
  pub fn through<U>(self, pipeline: &Pipeline<T, U>) -> Stream<U>
  where
    U: Send + 'static, {
    pipeline.attach(self)
  }

  fn run<R>(self, sink: SinkDefinition, completion: StreamCompletion<R>) -> (StreamFuture<R>, bool) {
    let asynchronous = self.plan.is_asynchronous();
    let Self { plan, config, control, errors, .. } = self;
    let future = match StreamInterpreter::new(plan, sink, config, control, errors) {
      | Ok(interpreter) => StreamFuture::new(interpreter, completion),
      | Err(error) => StreamFuture::failed(error),
    };
    (future, asynchronous)
  }

  fn evaluate<R>(self, sink: SinkDefinition, completion: StreamCompletion<R>) -> Evaluation<R> {
    let (future, asynchronous) = self.run(sink, completion);
    Evaluation::evaluate(future, asynchronous)
  }

  /// Collects every output.
  ///
  /// Immediate for synchronous streams, deferred for asynchronous ones.
  pub fn values(self) -> Evaluation<Vec<T>> {
    let completion = StreamCompletion::new();
    self.evaluate(collect_sink_definition::<T>(completion.clone()), completion)
  }

  /// Returns the first output and stops pulling. Settles with [`StreamError::Empty`] when the
  /// stream produces nothing.
  pub fn value(self) -> Evaluation<T> {
    let completion = StreamCompletion::new();
    self.evaluate(first_sink_definition::<T>(completion.clone()), completion)
  }

  /// Collects every output into a future, regardless of the stream mode.
  pub fn to_promise(self) -> StreamFuture<Vec<T>> {
    let completion = StreamCompletion::new();
    self.run(collect_sink_definition::<T>(completion.clone()), completion).0
  }

  /// Calls `func` for each output in order.
  pub fn each<F>(self, func: F) -> Evaluation<()>
  where
    F: FnMut(T) + Send + 'static, {
    let completion = StreamCompletion::new();
    self.evaluate(foreach_sink_definition::<T, F>(func, completion.clone()), completion)
  }

  /// Calls `callback` exactly once with every output, after the stream completes.
  ///
  /// The callback is not called when the stream fails or is destroyed.
  pub fn to_array<F>(self, callback: F) -> Evaluation<()>
  where
    F: FnOnce(Vec<T>) + Send + 'static, {
    let completion = StreamCompletion::new();
    self.evaluate(to_array_sink_definition::<T, F>(callback, completion.clone()), completion)
  }

  /// Drives the stream to completion, discarding outputs.
  pub fn start(self) -> Evaluation<()> {
    let completion = StreamCompletion::new();
    self.evaluate(ignore_sink_definition::<T>(completion.clone()), completion)
  }

  /// Forwards every output to `destination`, waiting on its readiness before each element, then
  /// closes it.
  ///
  /// Destination errors are recorded and halt the stream.
  pub fn pipe<D>(self, destination: D) -> StreamFuture<()>
  where
    D: futures::Sink<T> + Unpin + Send + 'static,
    D::Error: Display, {
    let completion = StreamCompletion::new();
    self.run(pipe_sink_definition::<T, D>(destination, completion.clone()), completion).0
  }

  /// Returns an async iterator that pulls one output per request.
  #[must_use]
  pub fn to_async_iterator(self) -> StreamIter<T> {
    let queue = SinkQueue::new();
    let sink = queue_sink_definition::<T>(queue.clone());
    let Self { plan, config, control, errors, .. } = self;
    StreamIter::new(StreamInterpreter::new(plan, sink, config, control, errors), queue)
  }

  /// Returns a plain iterator over a synchronous stream.
  ///
  /// # Errors
  ///
  /// Returns [`StreamError::AsyncStream`] when the stream has asynchronous stages.
  pub fn consume_sync(self) -> Result<SyncIter<T>, StreamError> {
    if self.is_async() {
      return Err(StreamError::AsyncStream);
    }
    Ok(SyncIter::new(self.to_async_iterator()))
  }
}

impl<Fut> Stream<Fut>
where
  Fut: Future + Send + 'static,
  Fut::Output: Send + 'static,
{
  /// Awaits each future-valued element one at a time, preserving order. Makes the stream
  /// asynchronous.
  #[must_use]
  pub fn resolve(self) -> Stream<Fut::Output> {
    self.push(resolve_definition::<Fut, Fut::Output>(1, true, Ok))
  }

  /// Awaits up to `parallelism` elements concurrently, emitting in input order.
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError`] when `parallelism` is zero.
  pub fn resolve_with(self, parallelism: usize) -> Result<Stream<Fut::Output>, StreamDslError> {
    let parallelism = StreamDslError::require_positive("parallelism", parallelism)?;
    Ok(self.push(resolve_definition::<Fut, Fut::Output>(parallelism, true, Ok)))
  }

  /// Awaits up to `parallelism` elements concurrently, emitting each as soon as it settles.
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError`] when `parallelism` is zero.
  pub fn resolve_unordered(self, parallelism: usize) -> Result<Stream<Fut::Output>, StreamDslError> {
    let parallelism = StreamDslError::require_positive("parallelism", parallelism)?;
    Ok(self.push(resolve_definition::<Fut, Fut::Output>(parallelism, false, Ok)))
  }

  /// Chains `func` onto every future-valued element without awaiting it. The stream stays
  /// synchronous until a resolve stage is added.
  #[must_use]
  pub fn mass_then<U, F>(self, func: F) -> Stream<Map<Fut, F>>
  where
    U: Send + 'static,
    F: FnOnce(Fut::Output) -> U + Clone + Send + 'static, {
    self.map(move |future| future.map(func.clone()))
  }
}

impl<Fut, U, E> Stream<Fut>
where
  Fut: Future<Output = Result<U, E>> + Send + 'static,
  U: Send + 'static,
  E: Display + 'static,
{
  /// Awaits each fallible future in order; `Err` becomes a stream error.
  #[must_use]
  pub fn try_resolve(self) -> Stream<U> {
    self.push(resolve_definition::<Fut, U>(1, true, settle_fallible::<U, E>))
  }
}

impl<Fut, U, E> Stream<Fut>
where
  Fut: Future<Output = Result<U, E>> + Send + 'static,
  U: Send + 'static,
  E: 'static,
{
  /// Replaces the error of every failing future-valued element with `func(error)`.
  #[must_use]
  pub fn mass_catch<F>(self, func: F) -> Stream<UnwrapOrElse<Fut, F>>
  where
    F: FnOnce(E) -> U + Clone + Send + 'static, {
    self.map(move |future| future.unwrap_or_else(func.clone()))
  }
}

impl<C> Stream<C>
where
  C: IntoIterator + Send + 'static,
  C::Item: Send + 'static,
{
  /// Emits the items of each collection-valued element in order.
  #[must_use]
  pub fn flatten(self) -> Stream<C::Item> {
    self.push(flat_map_definition::<C, _, C>(StageKind::FlowFlatten, core::convert::identity))
  }
}

impl<U> Stream<Option<U>>
where
  U: Send + 'static,
{
  /// Drops `None` elements and unwraps the rest.
  #[must_use]
  pub fn compact(self) -> Stream<U> {
    self.push(flat_map_definition::<Option<U>, _, Option<U>>(StageKind::FlowCompact, core::convert::identity))
  }
}

pub(crate) fn settle_fallible<U, E>(output: Result<U, E>) -> Result<U, StreamError>
where
  E: Display, {
  output.map_err(|error| StreamError::transform(StageKind::FlowResolve, error))
}
