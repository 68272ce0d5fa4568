use alloc::{string::String, sync::Arc, vec, vec::Vec};
use core::{
  future::{Future, IntoFuture},
  pin::Pin,
  task::Context,
};

use futures::{
  FutureExt,
  channel::mpsc,
  executor::block_on,
  future::{self, ready},
  stream,
  task::noop_waker_ref,
};
use spin::Mutex;

use crate::core::{Evaluation, StageKind, Stream, StreamBufferConfig, StreamConfig, StreamDslError, StreamError};

fn immediate<T>(evaluation: Evaluation<T>) -> Result<T, StreamError> {
  evaluation.into_immediate().expect("synchronous stream should settle immediately")
}

fn counting_source(limit: Option<u32>) -> (Stream<u32>, Arc<Mutex<u32>>) {
  let pulls = Arc::new(Mutex::new(0_u32));
  let counter = pulls.clone();
  let stream = Stream::from_fn(move || {
    let mut guard = counter.lock();
    if limit.is_some_and(|limit| *guard >= limit) {
      return None;
    }
    *guard += 1;
    Some(*guard)
  });
  (stream, pulls)
}

#[test]
fn map_then_filter_preserves_order() {
  let values = Stream::from_iterator([1_u32, 2, 3]).map(|value| value * 2).filter(|value| *value < 6).values();
  assert!(values.is_immediate());
  assert_eq!(immediate(values), Ok(vec![2, 4]));
}

#[test]
fn building_a_stream_does_not_pull() {
  let (stream, pulls) = counting_source(Some(5));
  let stream = stream.map(|value| value + 1).filter(|_| true);
  assert_eq!(*pulls.lock(), 0);
  drop(stream);
  assert_eq!(*pulls.lock(), 0);
}

#[test]
fn empty_and_single_sources() {
  assert_eq!(immediate(Stream::<u32>::empty().values()), Ok(Vec::new()));
  assert_eq!(immediate(Stream::of(5_u32).values()), Ok(vec![5]));
  assert_eq!(immediate(Stream::from_vec(vec!['a', 'b']).values()), Ok(vec!['a', 'b']));
}

#[test]
fn reduce1_sums_and_reduce_seeds() {
  assert_eq!(immediate(Stream::from_iterator(1_u32..=3).reduce1(|left, right| left + right).values()), Ok(vec![6]));
  assert_eq!(immediate(Stream::<u32>::empty().reduce1(|left, right| left + right).values()), Ok(Vec::new()));
  let joined = Stream::from_iterator(["a", "b"]).reduce(String::from(">"), |mut acc, value| {
    acc.push_str(value);
    acc
  });
  assert_eq!(immediate(joined.value()), Ok(String::from(">ab")));
}

#[test]
fn batch_groups_with_a_short_tail() {
  let batches = Stream::from_iterator(1_u32..=5).batch(2).expect("positive size").values();
  assert_eq!(immediate(batches), Ok(vec![vec![1, 2], vec![3, 4], vec![5]]));
}

#[test]
fn batch_rejects_zero() {
  let error = Stream::from_iterator([1_u32]).batch(0).err();
  assert_eq!(error, Some(StreamDslError::InvalidArgument { name: "size", value: 0, reason: "must be greater than zero" }));
}

#[test]
fn take_stops_an_endless_source() {
  let (stream, pulls) = counting_source(None);
  assert_eq!(immediate(stream.take(3).values()), Ok(vec![1, 2, 3]));
  assert_eq!(*pulls.lock(), 3);
}

#[test]
fn take_zero_never_pulls() {
  let (stream, pulls) = counting_source(None);
  let taps = Arc::new(Mutex::new(0_u32));
  let seen = taps.clone();
  let values = stream.tap(move |_| *seen.lock() += 1).take(0).values();
  assert_eq!(immediate(values), Ok(Vec::new()));
  assert_eq!(*pulls.lock(), 0);
  assert_eq!(*taps.lock(), 0);
}

#[test]
fn value_takes_the_first_output_and_stops() {
  let (stream, pulls) = counting_source(None);
  assert_eq!(immediate(stream.filter(|value| value % 4 == 0).value()), Ok(4));
  assert_eq!(*pulls.lock(), 4);
  assert_eq!(immediate(Stream::<u32>::empty().value()), Err(StreamError::Empty));
}

#[test]
fn positional_operators() {
  assert_eq!(immediate(Stream::from_iterator(0_u32..10).slice(2, 5).values()), Ok(vec![2, 3, 4]));
  assert_eq!(immediate(Stream::from_iterator(0_u32..10).drop(8).values()), Ok(vec![8, 9]));
  assert_eq!(immediate(Stream::from_iterator(0_u32..10).last().values()), Ok(vec![9]));
  assert_eq!(immediate(Stream::from_iterator(0_u32..10).head().values()), Ok(vec![0]));
  assert_eq!(immediate(Stream::from_iterator(0_u32..10).find(|value| *value > 6).values()), Ok(vec![7]));
}

#[test]
fn collection_operators() {
  let uniq = Stream::from_iterator([3_u32, 1, 3, 2, 1]).uniq().values();
  assert_eq!(immediate(uniq), Ok(vec![3, 1, 2]));
  let sorted = Stream::from_iterator([3_u32, 1, 2]).sort().values();
  assert_eq!(immediate(sorted), Ok(vec![1, 2, 3]));
  let flattened = Stream::from_iterator([vec![1_u32], Vec::new(), vec![2, 3]]).flatten().values();
  assert_eq!(immediate(flattened), Ok(vec![1, 2, 3]));
  let compacted = Stream::from_iterator([Some(1_u32), None, Some(2)]).compact().values();
  assert_eq!(immediate(compacted), Ok(vec![1, 2]));
  let collected = Stream::<u32>::empty().collect().values();
  assert_eq!(immediate(collected), Ok(vec![Vec::new()]));
  let rejected = Stream::from_iterator(1_u32..=4).reject(|value| value % 2 == 0).values();
  assert_eq!(immediate(rejected), Ok(vec![1, 3]));
}

#[test]
fn key_by_keeps_the_latest_element() {
  let keyed = immediate(Stream::from_iterator([(1_u32, 'a'), (2, 'b'), (1, 'c')]).key_by(|pair| pair.0).value())
    .expect("keyed map");
  assert_eq!(keyed.len(), 2);
  assert_eq!(keyed.get(&1), Some(&(1, 'c')));
}

#[test]
fn stop_when_completes_without_the_matching_element() {
  let (stream, pulls) = counting_source(None);
  assert_eq!(immediate(stream.stop_when(|value| *value == 3).values()), Ok(vec![1, 2]));
  assert_eq!(*pulls.lock(), 3);
}

#[test]
fn to_array_calls_back_exactly_once() {
  let calls = Arc::new(Mutex::new(Vec::new()));
  let sink_calls = calls.clone();
  let evaluation = Stream::from_iterator([1_u32, 2]).to_array(move |values| sink_calls.lock().push(values));
  assert_eq!(immediate(evaluation), Ok(()));
  assert_eq!(*calls.lock(), vec![vec![1, 2]]);
}

#[test]
fn each_and_start_drive_side_effects() {
  let seen = Arc::new(Mutex::new(Vec::new()));
  let tapped = seen.clone();
  let each_seen = seen.clone();
  let evaluation = Stream::from_iterator([1_u32, 2]).tap(move |value| tapped.lock().push(*value * 10)).each(move |value| {
    each_seen.lock().push(value);
  });
  assert_eq!(immediate(evaluation), Ok(()));
  assert_eq!(*seen.lock(), vec![10, 1, 20, 2]);

  let (stream, pulls) = counting_source(Some(4));
  assert_eq!(immediate(stream.start()), Ok(()));
  assert_eq!(*pulls.lock(), 4);
}

#[test]
fn stop_policy_records_the_first_error_once() {
  let stream = Stream::from_iterator([1_u32, 2, 3]).try_map(|value| if value == 2 { Err("two") } else { Ok(value) });
  let errors = stream.errors();
  let result = immediate(stream.values());
  let expected = StreamError::transform(StageKind::FlowTryMap, "two");
  assert_eq!(result, Err(expected.clone()));
  assert_eq!(errors.snapshot(), vec![expected]);
}

#[test]
fn continue_policy_skips_failed_elements() {
  let stream = Stream::try_from_iterator([Ok(1_u32), Err("bad"), Ok(3)])
    .try_map(|value| if value == 3 { Err("three") } else { Ok(value) })
    .stop_on_error(false);
  let errors = stream.errors();
  assert_eq!(immediate(stream.values()), Ok(vec![1]));
  assert_eq!(errors.snapshot(), vec![StreamError::source("bad"), StreamError::transform(StageKind::FlowTryMap, "three")]);
}

#[test]
fn failed_source_settles_with_its_error() {
  assert_eq!(immediate(Stream::<u32>::failed("offline").values()), Err(StreamError::source("offline")));
}

#[test]
fn paused_stream_defers_and_resumes_without_lost_elements() {
  let (stream, pulls) = counting_source(Some(3));
  let control = stream.control();
  control.pause();
  let evaluation = stream.values();
  assert!(evaluation.is_deferred());
  assert_eq!(*pulls.lock(), 0);
  control.resume();
  assert_eq!(block_on(evaluation.into_deferred().expect("deferred")), Ok(vec![1, 2, 3]));
}

#[test]
fn destroyed_stream_stops_callbacks() {
  let (stream, pulls) = counting_source(None);
  let control = stream.control();
  let calls = Arc::new(Mutex::new(0_u32));
  let sink_calls = calls.clone();
  control.destroy();
  let evaluation = stream.to_array(move |_| *sink_calls.lock() += 1);
  assert_eq!(immediate(evaluation), Err(StreamError::Destroyed));
  assert_eq!(*pulls.lock(), 0);
  assert_eq!(*calls.lock(), 0);
}

#[test]
fn ended_stream_completes_with_what_it_has() {
  let (stream, pulls) = counting_source(None);
  stream.control().end();
  let control = stream.control();
  assert!(control.is_ended());
  assert_eq!(immediate(stream.values()), Ok(Vec::new()));
  assert_eq!(*pulls.lock(), 0);
}

#[test]
fn async_stages_make_the_stream_deferred() {
  let stream = Stream::from_iterator([1_u32, 2, 3]);
  assert!(!stream.is_async());
  let stream = stream.map(|value| ready(value * 3)).resolve();
  assert!(stream.is_async());
  let evaluation = stream.values();
  assert!(evaluation.is_deferred());
  assert_eq!(block_on(evaluation.into_future()), Ok(vec![3, 6, 9]));
}

#[test]
fn async_source_filter_and_reduce() {
  let total = Stream::from_async(stream::iter(1_u32..=4))
    .async_filter(|value| ready(value % 2 == 0))
    .async_reduce(0_u32, |acc, value| ready(acc + value))
    .value();
  assert!(total.is_deferred());
  assert_eq!(block_on(total.into_future()), Ok(6));
}

#[test]
fn try_resolve_surfaces_rejections() {
  let results = Stream::from_iterator([Ok(1_u32), Err("late"), Ok(3)]).map(ready).try_resolve().values();
  assert_eq!(block_on(results.into_future()), Err(StreamError::transform(StageKind::FlowResolve, "late")));
}

#[test]
fn resolve_arguments_are_validated() {
  let error = Stream::from_iterator([ready(1_u32)]).resolve_with(0).err();
  assert!(matches!(error, Some(StreamDslError::InvalidArgument { name: "parallelism", .. })));
  assert!(Stream::from_iterator([ready(1_u32)]).resolve_unordered(2).is_ok());
}

#[test]
fn to_promise_is_always_a_future() {
  assert_eq!(block_on(Stream::from_iterator([1_u32]).to_promise()), Ok(vec![1]));
}

#[test]
fn pipe_forwards_into_a_sink_and_closes_it() {
  let (sender, receiver) = mpsc::unbounded::<u32>();
  let piped = Stream::from_iterator([1_u32, 2, 3]).pipe(sender);
  assert_eq!(block_on(piped), Ok(()));
  let received: Vec<u32> = block_on(futures::StreamExt::collect(receiver));
  assert_eq!(received, vec![1, 2, 3]);
}

#[test]
fn pipe_to_a_closed_destination_fails() {
  let (sender, receiver) = mpsc::unbounded::<u32>();
  drop(receiver);
  let stream = Stream::from_iterator([1_u32]);
  let errors = stream.errors();
  let result = block_on(stream.pipe(sender));
  assert!(matches!(result, Err(StreamError::Sink(_))));
  assert_eq!(errors.len(), 1);
}

#[test]
fn async_iterator_pulls_one_element_per_request() {
  let (stream, pulls) = counting_source(None);
  let mut iter = stream.to_async_iterator();
  assert_eq!(*pulls.lock(), 0);
  assert_eq!(block_on(futures::StreamExt::next(&mut iter)), Some(Ok(1)));
  assert_eq!(block_on(futures::StreamExt::next(&mut iter)), Some(Ok(2)));
  assert_eq!(*pulls.lock(), 2);
}

#[test]
fn consume_sync_iterates_and_rejects_async_streams() {
  let values: Result<Vec<u32>, StreamError> =
    Stream::from_iterator([1_u32, 2, 3]).consume_sync().expect("sync stream").collect();
  assert_eq!(values, Ok(vec![1, 2, 3]));
  let error = Stream::from_async(stream::iter([1_u32])).consume_sync().err();
  assert_eq!(error, Some(StreamError::AsyncStream));
}

#[test]
fn small_buffers_still_deliver_everything() {
  let config = StreamConfig::default().with_buffer(StreamBufferConfig::new(1));
  let values = Stream::from_iterator(0_u32..50).flat_map(|value| [value, value]).with_config(config).values();
  assert_eq!(immediate(values).map(|values| values.len()), Ok(100));
}

#[test]
fn ordered_resolve_stops_pulling_behind_a_blocked_head() {
  let (stream, pulls) = counting_source(Some(10_000));
  let config = StreamConfig::default().with_buffer(StreamBufferConfig::new(1));
  let mut promise = stream
    .with_config(config)
    .map(|value| if value == 1 { future::pending::<u32>().boxed() } else { ready(value).boxed() })
    .resolve_with(2)
    .expect("positive parallelism")
    .to_promise();
  let mut cx = Context::from_waker(noop_waker_ref());
  assert!(Pin::new(&mut promise).poll(&mut cx).is_pending());
  let pulled = *pulls.lock();
  assert!(pulled <= 6, "pulled {pulled} elements while the head was blocked");
  assert!(Pin::new(&mut promise).poll(&mut cx).is_pending());
  assert_eq!(*pulls.lock(), pulled);
}

#[test]
fn make_async_defers_a_synchronous_chain() {
  let stream = Stream::from_iterator([1_u32, 2]).make_async();
  assert!(stream.is_async());
  let evaluation = stream.values();
  assert!(evaluation.is_deferred());
  assert_eq!(block_on(evaluation.into_future()), Ok(vec![1, 2]));
}

#[test]
fn mass_then_and_mass_catch_reshape_future_elements() {
  let chained = Stream::from_iterator([1_u32, 2, 3]).map(ready).mass_then(|value| value * 10);
  assert!(!chained.is_async());
  assert_eq!(block_on(chained.resolve().to_promise()), Ok(vec![10, 20, 30]));

  let recovered = Stream::from_iterator([Ok(1_u32), Err("missing"), Ok(3)])
    .map(ready)
    .mass_catch(|error: &'static str| error.len() as u32)
    .resolve()
    .to_promise();
  assert_eq!(block_on(recovered), Ok(vec![1, 7, 3]));
}
