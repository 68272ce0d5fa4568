//! Flow stage logics.
//!
//! Every transformation on [`Stream`](super::Stream) and [`Pipeline`](super::Pipeline) is backed
//! by one of the logics below. A logic receives type-erased elements, downcasts them to its input
//! type and returns zero or more type-erased outputs. Aggregating logics hold their state until
//! the upstream finishes; asynchronous logics keep futures in flight and are drained with the
//! consumer's waker.


use alloc::{boxed::Box, collections::VecDeque, vec, vec::Vec};
use core::{
  any::TypeId,
  cmp::Ordering,
  fmt::Display,
  future::Future,
  hash::Hash,
  marker::PhantomData,
  mem,
  pin::Pin,
  task::{Context, Poll},
};

use ahash::RandomState;
use hashbrown::HashSet;

use super::{DynValue, FlowDefinition, FlowLogic, Groups, Keyed, StageKind, StreamError, downcast_value};

fn flow_definition<In, Out, L>(kind: StageKind, asynchronous: bool, logic: L) -> FlowDefinition
where
  In: 'static,
  Out: 'static,
  L: FlowLogic + 'static, {
  FlowDefinition {
    kind,
    input_type: TypeId::of::<In>(),
    output_type: TypeId::of::<Out>(),
    asynchronous,
    logic: Box::new(logic),
  }
}

fn emit<T>(value: T) -> Vec<DynValue>
where
  T: Send + 'static, {
  vec![Box::new(value) as DynValue]
}

struct MapLogic<In, Out, F> {
  func: F,
  _pd:  PhantomData<fn(In) -> Out>,
}

impl<In, Out, F> FlowLogic for MapLogic<In, Out, F>
where
  In: Send + 'static,
  Out: Send + 'static,
  F: FnMut(In) -> Out + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    Ok(emit((self.func)(value)))
  }
}

struct TryMapLogic<In, Out, E, F> {
  func: F,
  _pd:  PhantomData<fn(In) -> Result<Out, E>>,
}

impl<In, Out, E, F> FlowLogic for TryMapLogic<In, Out, E, F>
where
  In: Send + 'static,
  Out: Send + 'static,
  E: Display,
  F: FnMut(In) -> Result<Out, E> + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    match (self.func)(value) {
      | Ok(output) => Ok(emit(output)),
      | Err(error) => Err(StreamError::transform(StageKind::FlowTryMap, error)),
    }
  }
}

struct FilterLogic<In, F> {
  predicate: F,
  _pd:       PhantomData<fn(In)>,
}

impl<In, F> FlowLogic for FilterLogic<In, F>
where
  In: Send + 'static,
  F: FnMut(&In) -> bool + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    if (self.predicate)(&value) { Ok(emit(value)) } else { Ok(Vec::new()) }
  }
}

struct TapLogic<In, E, F> {
  func: F,
  _pd:  PhantomData<fn(&In) -> E>,
}

impl<In, E, F> FlowLogic for TapLogic<In, E, F>
where
  In: Send + 'static,
  E: Display,
  F: FnMut(&In) -> Result<(), E> + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    (self.func)(&value).map_err(|error| StreamError::transform(StageKind::FlowTap, error))?;
    Ok(emit(value))
  }
}

struct BatchLogic<In> {
  size:    usize,
  current: Vec<In>,
}

impl<In> FlowLogic for BatchLogic<In>
where
  In: Send + 'static,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    self.current.push(value);
    if self.current.len() < self.size {
      return Ok(Vec::new());
    }
    let batch = mem::replace(&mut self.current, Vec::with_capacity(self.size));
    Ok(emit(batch))
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    if self.current.is_empty() {
      return Ok(Vec::new());
    }
    Ok(emit(mem::take(&mut self.current)))
  }
}

struct ReduceLogic<In, Acc, F> {
  acc:  Option<Acc>,
  func: F,
  _pd:  PhantomData<fn(In)>,
}

impl<In, Acc, F> FlowLogic for ReduceLogic<In, Acc, F>
where
  In: Send + 'static,
  Acc: Send + 'static,
  F: FnMut(Acc, In) -> Acc + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    if let Some(acc) = self.acc.take() {
      self.acc = Some((self.func)(acc, value));
    }
    Ok(Vec::new())
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    Ok(self.acc.take().map(emit).unwrap_or_default())
  }
}

struct Reduce1Logic<In, F> {
  acc:  Option<In>,
  func: F,
}

impl<In, F> FlowLogic for Reduce1Logic<In, F>
where
  In: Send + 'static,
  F: FnMut(In, In) -> In + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    self.acc = Some(match self.acc.take() {
      | Some(acc) => (self.func)(acc, value),
      | None => value,
    });
    Ok(Vec::new())
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    Ok(self.acc.take().map(emit).unwrap_or_default())
  }
}

struct AsyncReduceLogic<In, Acc, F, Fut> {
  acc:       Option<Acc>,
  func:      F,
  in_flight: Option<Pin<Box<Fut>>>,
  _pd:       PhantomData<fn(In)>,
}

impl<In, Acc, F, Fut> FlowLogic for AsyncReduceLogic<In, Acc, F, Fut>
where
  In: Send + 'static,
  Acc: Send + 'static,
  F: FnMut(Acc, In) -> Fut + Send,
  Fut: Future<Output = Acc> + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    if let Some(acc) = self.acc.take() {
      self.in_flight = Some(Box::pin((self.func)(acc, value)));
    }
    Ok(Vec::new())
  }

  fn can_accept_input(&self) -> bool {
    self.in_flight.is_none()
  }

  fn poll_drain(&mut self, cx: &mut Context<'_>) -> Result<Vec<DynValue>, StreamError> {
    if let Some(future) = self.in_flight.as_mut()
      && let Poll::Ready(acc) = future.as_mut().poll(cx)
    {
      self.acc = Some(acc);
      self.in_flight = None;
    }
    Ok(Vec::new())
  }

  fn has_in_flight(&self) -> bool {
    self.in_flight.is_some()
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    Ok(self.acc.take().map(emit).unwrap_or_default())
  }
}

enum ResolveEntry<Fut, Out> {
  InFlight(Pin<Box<Fut>>),
  Settled(Result<Out, StreamError>),
}

struct ResolveLogic<Fut, Out>
where
  Fut: Future, {
  parallelism: usize,
  ordered:     bool,
  pending:     VecDeque<ResolveEntry<Fut, Out>>,
  settle:      fn(Fut::Output) -> Result<Out, StreamError>,
}

impl<Fut, Out> ResolveLogic<Fut, Out>
where
  Fut: Future,
{
  fn poll_in_flight(&mut self, cx: &mut Context<'_>) {
    for entry in &mut self.pending {
      let ResolveEntry::InFlight(future) = entry else {
        continue;
      };
      if let Poll::Ready(output) = future.as_mut().poll(cx) {
        *entry = ResolveEntry::Settled((self.settle)(output));
      }
    }
  }

  // An error is only surfaced once every value settled before it has been emitted.
  fn take_settled(&mut self, index: usize, outputs: &[DynValue]) -> Option<Result<Out, StreamError>> {
    match self.pending.get(index)? {
      | ResolveEntry::InFlight(_) => None,
      | ResolveEntry::Settled(Err(_)) if !outputs.is_empty() => None,
      | ResolveEntry::Settled(_) => match self.pending.remove(index)? {
        | ResolveEntry::Settled(result) => Some(result),
        | ResolveEntry::InFlight(_) => None,
      },
    }
  }
}

impl<Fut, Out> FlowLogic for ResolveLogic<Fut, Out>
where
  Fut: Future + Send + 'static,
  Out: Send + 'static,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let future = downcast_value::<Fut>(input)?;
    self.pending.push_back(ResolveEntry::InFlight(Box::pin(future)));
    Ok(Vec::new())
  }

  // Settled entries waiting behind the head still occupy a slot.
  fn can_accept_input(&self) -> bool {
    self.pending.len() < self.parallelism
  }

  fn poll_drain(&mut self, cx: &mut Context<'_>) -> Result<Vec<DynValue>, StreamError> {
    self.poll_in_flight(cx);
    let mut outputs: Vec<DynValue> = Vec::new();
    let mut index = 0;
    while index < self.pending.len() {
      match self.take_settled(index, &outputs) {
        | Some(Ok(value)) => outputs.push(Box::new(value)),
        | Some(Err(error)) => return Err(error),
        | None if self.ordered => break,
        | None => index += 1,
      }
    }
    Ok(outputs)
  }

  fn has_in_flight(&self) -> bool {
    !self.pending.is_empty()
  }
}

struct AsyncFilterLogic<In, F, Fut> {
  predicate: F,
  in_flight: Option<(In, Pin<Box<Fut>>)>,
}

impl<In, F, Fut> FlowLogic for AsyncFilterLogic<In, F, Fut>
where
  In: Send + 'static,
  F: FnMut(&In) -> Fut + Send,
  Fut: Future<Output = bool> + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    let future = (self.predicate)(&value);
    self.in_flight = Some((value, Box::pin(future)));
    Ok(Vec::new())
  }

  fn can_accept_input(&self) -> bool {
    self.in_flight.is_none()
  }

  fn poll_drain(&mut self, cx: &mut Context<'_>) -> Result<Vec<DynValue>, StreamError> {
    let Some((_, future)) = self.in_flight.as_mut() else {
      return Ok(Vec::new());
    };
    let Poll::Ready(keep) = future.as_mut().poll(cx) else {
      return Ok(Vec::new());
    };
    match self.in_flight.take() {
      | Some((value, _)) if keep => Ok(emit(value)),
      | _ => Ok(Vec::new()),
    }
  }

  fn has_in_flight(&self) -> bool {
    self.in_flight.is_some()
  }
}

struct TakeLogic<In> {
  remaining:          usize,
  shutdown_requested: bool,
  _pd:                PhantomData<fn(In)>,
}

impl<In> FlowLogic for TakeLogic<In>
where
  In: Send + 'static,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    if self.remaining == 0 {
      return Ok(Vec::new());
    }
    self.remaining -= 1;
    if self.remaining == 0 {
      self.shutdown_requested = true;
    }
    Ok(emit(value))
  }

  fn take_shutdown_request(&mut self) -> bool {
    mem::take(&mut self.shutdown_requested)
  }
}

struct DropLogic<In> {
  remaining: usize,
  _pd:       PhantomData<fn(In)>,
}

impl<In> FlowLogic for DropLogic<In>
where
  In: Send + 'static,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    if self.remaining > 0 {
      self.remaining -= 1;
      return Ok(Vec::new());
    }
    Ok(emit(value))
  }
}

struct LastLogic<In> {
  last: Option<In>,
}

impl<In> FlowLogic for LastLogic<In>
where
  In: Send + 'static,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    self.last = Some(downcast_value::<In>(input)?);
    Ok(Vec::new())
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    Ok(self.last.take().map(emit).unwrap_or_default())
  }
}

struct FlatMapLogic<In, F, I> {
  func: F,
  _pd:  PhantomData<fn(In) -> I>,
}

impl<In, F, I> FlowLogic for FlatMapLogic<In, F, I>
where
  In: Send + 'static,
  F: FnMut(In) -> I + Send,
  I: IntoIterator,
  I::Item: Send + 'static,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    Ok((self.func)(value).into_iter().map(|item| Box::new(item) as DynValue).collect())
  }
}

struct UniqByLogic<In, K, F> {
  key:  F,
  seen: HashSet<K, RandomState>,
  _pd:  PhantomData<fn(In)>,
}

impl<In, K, F> FlowLogic for UniqByLogic<In, K, F>
where
  In: Send + 'static,
  K: Eq + Hash + Send,
  F: FnMut(&In) -> K + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    if self.seen.insert((self.key)(&value)) { Ok(emit(value)) } else { Ok(Vec::new()) }
  }
}

struct CollectLogic<In> {
  values: Vec<In>,
}

impl<In> FlowLogic for CollectLogic<In>
where
  In: Send + 'static,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    self.values.push(downcast_value::<In>(input)?);
    Ok(Vec::new())
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    Ok(emit(mem::take(&mut self.values)))
  }
}

struct GroupByLogic<In, K, F> {
  key:    F,
  groups: Groups<K, In>,
}

impl<In, K, F> FlowLogic for GroupByLogic<In, K, F>
where
  In: Send + 'static,
  K: Eq + Hash + Send + 'static,
  F: FnMut(&In) -> K + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    self.groups.entry((self.key)(&value)).or_default().push(value);
    Ok(Vec::new())
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    Ok(emit(mem::take(&mut self.groups)))
  }
}

struct KeyByLogic<In, K, F> {
  key:   F,
  keyed: Keyed<K, In>,
}

impl<In, K, F> FlowLogic for KeyByLogic<In, K, F>
where
  In: Send + 'static,
  K: Eq + Hash + Send + 'static,
  F: FnMut(&In) -> K + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    self.keyed.insert((self.key)(&value), value);
    Ok(Vec::new())
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    Ok(emit(mem::take(&mut self.keyed)))
  }
}

struct SortLogic<In, C> {
  compare: C,
  values:  Vec<In>,
}

impl<In, C> FlowLogic for SortLogic<In, C>
where
  In: Send + 'static,
  C: FnMut(&In, &In) -> Ordering + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    self.values.push(downcast_value::<In>(input)?);
    Ok(Vec::new())
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    let compare = &mut self.compare;
    self.values.sort_by(|left, right| compare(left, right));
    Ok(mem::take(&mut self.values).into_iter().map(|value| Box::new(value) as DynValue).collect())
  }
}

struct StopWhenLogic<In, F> {
  predicate:          F,
  stopped:            bool,
  shutdown_requested: bool,
  _pd:                PhantomData<fn(In)>,
}

impl<In, F> FlowLogic for StopWhenLogic<In, F>
where
  In: Send + 'static,
  F: FnMut(&In) -> bool + Send,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    let value = downcast_value::<In>(input)?;
    if self.stopped {
      return Ok(Vec::new());
    }
    if (self.predicate)(&value) {
      self.stopped = true;
      self.shutdown_requested = true;
      return Ok(Vec::new());
    }
    Ok(emit(value))
  }

  fn take_shutdown_request(&mut self) -> bool {
    mem::take(&mut self.shutdown_requested)
  }
}

struct PassThroughLogic<In> {
  _pd: PhantomData<fn(In)>,
}

impl<In> FlowLogic for PassThroughLogic<In>
where
  In: Send + 'static,
{
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError> {
    Ok(emit(downcast_value::<In>(input)?))
  }
}

pub(crate) fn map_definition<In, Out, F>(func: F) -> FlowDefinition
where
  In: Send + 'static,
  Out: Send + 'static,
  F: FnMut(In) -> Out + Send + 'static, {
  flow_definition::<In, Out, _>(StageKind::FlowMap, false, MapLogic::<In, Out, F> { func, _pd: PhantomData })
}

pub(crate) fn try_map_definition<In, Out, E, F>(func: F) -> FlowDefinition
where
  In: Send + 'static,
  Out: Send + 'static,
  E: Display + 'static,
  F: FnMut(In) -> Result<Out, E> + Send + 'static, {
  flow_definition::<In, Out, _>(StageKind::FlowTryMap, false, TryMapLogic::<In, Out, E, F> { func, _pd: PhantomData })
}

pub(crate) fn filter_definition<In, F>(predicate: F) -> FlowDefinition
where
  In: Send + 'static,
  F: FnMut(&In) -> bool + Send + 'static, {
  flow_definition::<In, In, _>(StageKind::FlowFilter, false, FilterLogic::<In, F> { predicate, _pd: PhantomData })
}

pub(crate) fn try_tap_definition<In, E, F>(func: F) -> FlowDefinition
where
  In: Send + 'static,
  E: Display + 'static,
  F: FnMut(&In) -> Result<(), E> + Send + 'static, {
  flow_definition::<In, In, _>(StageKind::FlowTap, false, TapLogic::<In, E, F> { func, _pd: PhantomData })
}

pub(crate) fn batch_definition<In>(size: usize) -> FlowDefinition
where
  In: Send + 'static, {
  flow_definition::<In, Vec<In>, _>(StageKind::FlowBatch, false, BatchLogic::<In> { size, current: Vec::with_capacity(size) })
}

pub(crate) fn reduce_definition<In, Acc, F>(seed: Acc, func: F) -> FlowDefinition
where
  In: Send + 'static,
  Acc: Send + 'static,
  F: FnMut(Acc, In) -> Acc + Send + 'static, {
  flow_definition::<In, Acc, _>(StageKind::FlowReduce, false, ReduceLogic::<In, Acc, F> { acc: Some(seed), func, _pd: PhantomData })
}

pub(crate) fn reduce1_definition<In, F>(func: F) -> FlowDefinition
where
  In: Send + 'static,
  F: FnMut(In, In) -> In + Send + 'static, {
  flow_definition::<In, In, _>(StageKind::FlowReduce1, false, Reduce1Logic::<In, F> { acc: None, func })
}

pub(crate) fn async_reduce_definition<In, Acc, F, Fut>(seed: Acc, func: F) -> FlowDefinition
where
  In: Send + 'static,
  Acc: Send + 'static,
  F: FnMut(Acc, In) -> Fut + Send + 'static,
  Fut: Future<Output = Acc> + Send + 'static, {
  let logic = AsyncReduceLogic::<In, Acc, F, Fut> { acc: Some(seed), func, in_flight: None, _pd: PhantomData };
  flow_definition::<In, Acc, _>(StageKind::FlowAsyncReduce, true, logic)
}

pub(crate) fn resolve_definition<Fut, Out>(
  parallelism: usize,
  ordered: bool,
  settle: fn(Fut::Output) -> Result<Out, StreamError>,
) -> FlowDefinition
where
  Fut: Future + Send + 'static,
  Out: Send + 'static, {
  let logic = ResolveLogic::<Fut, Out> { parallelism, ordered, pending: VecDeque::new(), settle };
  flow_definition::<Fut, Out, _>(StageKind::FlowResolve, true, logic)
}

pub(crate) fn async_filter_definition<In, F, Fut>(predicate: F) -> FlowDefinition
where
  In: Send + 'static,
  F: FnMut(&In) -> Fut + Send + 'static,
  Fut: Future<Output = bool> + Send + 'static, {
  flow_definition::<In, In, _>(StageKind::FlowAsyncFilter, true, AsyncFilterLogic::<In, F, Fut> { predicate, in_flight: None })
}

pub(crate) fn take_definition<In>(count: usize) -> FlowDefinition
where
  In: Send + 'static, {
  let logic = TakeLogic::<In> { remaining: count, shutdown_requested: count == 0, _pd: PhantomData };
  flow_definition::<In, In, _>(StageKind::FlowTake, false, logic)
}

pub(crate) fn drop_definition<In>(count: usize) -> FlowDefinition
where
  In: Send + 'static, {
  flow_definition::<In, In, _>(StageKind::FlowDrop, false, DropLogic::<In> { remaining: count, _pd: PhantomData })
}

pub(crate) fn last_definition<In>() -> FlowDefinition
where
  In: Send + 'static, {
  flow_definition::<In, In, _>(StageKind::FlowLast, false, LastLogic::<In> { last: None })
}

pub(crate) fn flat_map_definition<In, F, I>(kind: StageKind, func: F) -> FlowDefinition
where
  In: Send + 'static,
  F: FnMut(In) -> I + Send + 'static,
  I: IntoIterator + 'static,
  I::Item: Send + 'static, {
  flow_definition::<In, I::Item, _>(kind, false, FlatMapLogic::<In, F, I> { func, _pd: PhantomData })
}

pub(crate) fn uniq_by_definition<In, K, F>(key: F) -> FlowDefinition
where
  In: Send + 'static,
  K: Eq + Hash + Send + 'static,
  F: FnMut(&In) -> K + Send + 'static, {
  let logic = UniqByLogic::<In, K, F> { key, seen: HashSet::with_hasher(RandomState::new()), _pd: PhantomData };
  flow_definition::<In, In, _>(StageKind::FlowUniq, false, logic)
}

pub(crate) fn collect_definition<In>() -> FlowDefinition
where
  In: Send + 'static, {
  flow_definition::<In, Vec<In>, _>(StageKind::FlowCollect, false, CollectLogic::<In> { values: Vec::new() })
}

pub(crate) fn group_by_definition<In, K, F>(key: F) -> FlowDefinition
where
  In: Send + 'static,
  K: Eq + Hash + Send + 'static,
  F: FnMut(&In) -> K + Send + 'static, {
  let logic = GroupByLogic::<In, K, F> { key, groups: Groups::with_hasher(RandomState::new()) };
  flow_definition::<In, Groups<K, In>, _>(StageKind::FlowGroupBy, false, logic)
}

pub(crate) fn key_by_definition<In, K, F>(key: F) -> FlowDefinition
where
  In: Send + 'static,
  K: Eq + Hash + Send + 'static,
  F: FnMut(&In) -> K + Send + 'static, {
  let logic = KeyByLogic::<In, K, F> { key, keyed: Keyed::with_hasher(RandomState::new()) };
  flow_definition::<In, Keyed<K, In>, _>(StageKind::FlowKeyBy, false, logic)
}

pub(crate) fn sort_by_definition<In, C>(compare: C) -> FlowDefinition
where
  In: Send + 'static,
  C: FnMut(&In, &In) -> Ordering + Send + 'static, {
  flow_definition::<In, In, _>(StageKind::FlowSort, false, SortLogic::<In, C> { compare, values: Vec::new() })
}

pub(crate) fn stop_when_definition<In, F>(predicate: F) -> FlowDefinition
where
  In: Send + 'static,
  F: FnMut(&In) -> bool + Send + 'static, {
  let logic = StopWhenLogic::<In, F> { predicate, stopped: false, shutdown_requested: false, _pd: PhantomData };
  flow_definition::<In, In, _>(StageKind::FlowStopWhen, false, logic)
}

pub(crate) fn make_async_definition<In>() -> FlowDefinition
where
  In: Send + 'static, {
  flow_definition::<In, In, _>(StageKind::FlowMakeAsync, true, PassThroughLogic::<In> { _pd: PhantomData })
}
