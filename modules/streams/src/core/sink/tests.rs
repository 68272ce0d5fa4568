use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::task::{Context, Poll};

use futures::{channel::mpsc, task::noop_waker_ref};
use spin::Mutex;

use super::{
  collect_sink_definition, first_sink_definition, foreach_sink_definition, ignore_sink_definition, pipe_sink_definition,
  queue_sink_definition, to_array_sink_definition,
};
use crate::core::{DemandTracker, SinkDecision, SinkDefinition, StreamCompletion, StreamError, sink_queue::SinkQueue};

fn push_all<T>(definition: &mut SinkDefinition, demand: &mut DemandTracker, values: Vec<T>)
where
  T: Send + 'static, {
  for value in values {
    assert!(demand.consume_one());
    let decision = definition.logic.on_push(Box::new(value), demand).expect("push should succeed");
    assert_eq!(decision, SinkDecision::Continue);
  }
}

fn complete(definition: &mut SinkDefinition) {
  let mut cx = Context::from_waker(noop_waker_ref());
  assert_eq!(definition.logic.poll_complete(&mut cx), Poll::Ready(Ok(())));
}

#[test]
fn collect_sink_requests_unbounded_demand_and_settles_with_values() {
  let completion = StreamCompletion::<Vec<u32>>::new();
  let mut definition = collect_sink_definition(completion.clone());
  let mut demand = DemandTracker::new();
  definition.logic.on_start(&mut demand).expect("start");
  assert!(demand.has_demand());
  push_all(&mut definition, &mut demand, vec![1_u32, 2, 3]);
  complete(&mut definition);
  assert_eq!(completion.try_take(), Some(Ok(vec![1, 2, 3])));
}

#[test]
fn collect_sink_rejects_foreign_types() {
  let mut definition = collect_sink_definition(StreamCompletion::<Vec<u32>>::new());
  let mut demand = DemandTracker::new();
  definition.logic.on_start(&mut demand).expect("start");
  assert_eq!(definition.logic.on_push(Box::new("text"), &mut demand).err(), Some(StreamError::TypeMismatch));
}

#[test]
fn first_sink_completes_after_one_element() {
  let completion = StreamCompletion::<u32>::new();
  let mut definition = first_sink_definition(completion.clone());
  let mut demand = DemandTracker::new();
  definition.logic.on_start(&mut demand).expect("start");
  assert!(demand.consume_one());
  assert!(!demand.has_demand());
  let decision = definition.logic.on_push(Box::new(7_u32), &mut demand).expect("push");
  assert_eq!(decision, SinkDecision::Complete);
  complete(&mut definition);
  assert_eq!(completion.try_take(), Some(Ok(7)));
}

#[test]
fn first_sink_without_elements_settles_empty() {
  let completion = StreamCompletion::<u32>::new();
  let mut definition = first_sink_definition(completion.clone());
  complete(&mut definition);
  assert_eq!(completion.try_take(), Some(Err(StreamError::Empty)));
}

#[test]
fn foreach_sink_runs_the_callback_per_element() {
  let seen = Arc::new(Mutex::new(Vec::new()));
  let completion = StreamCompletion::new();
  let sink_seen = seen.clone();
  let mut definition = foreach_sink_definition(move |value: u32| sink_seen.lock().push(value), completion.clone());
  let mut demand = DemandTracker::new();
  definition.logic.on_start(&mut demand).expect("start");
  push_all(&mut definition, &mut demand, vec![4_u32, 5]);
  complete(&mut definition);
  assert_eq!(*seen.lock(), vec![4, 5]);
  assert_eq!(completion.try_take(), Some(Ok(())));
}

#[test]
fn to_array_sink_calls_back_once_on_completion() {
  let calls = Arc::new(Mutex::new(Vec::new()));
  let completion = StreamCompletion::new();
  let sink_calls = calls.clone();
  let mut definition = to_array_sink_definition(move |values: Vec<u32>| sink_calls.lock().push(values), completion.clone());
  let mut demand = DemandTracker::new();
  definition.logic.on_start(&mut demand).expect("start");
  push_all(&mut definition, &mut demand, vec![1_u32, 2]);
  complete(&mut definition);
  complete(&mut definition);
  assert_eq!(*calls.lock(), vec![vec![1, 2]]);
  assert_eq!(completion.try_take(), Some(Ok(())));
}

#[test]
fn to_array_sink_skips_the_callback_on_error() {
  let calls = Arc::new(Mutex::new(0_usize));
  let completion = StreamCompletion::new();
  let sink_calls = calls.clone();
  let mut definition = to_array_sink_definition(move |_: Vec<u32>| *sink_calls.lock() += 1, completion.clone());
  definition.logic.on_error(StreamError::source("boom"));
  complete(&mut definition);
  assert_eq!(*calls.lock(), 0);
  assert_eq!(completion.try_take(), Some(Err(StreamError::source("boom"))));
}

#[test]
fn ignore_sink_settles_without_values() {
  let completion = StreamCompletion::new();
  let mut definition = ignore_sink_definition::<u32>(completion.clone());
  let mut demand = DemandTracker::new();
  definition.logic.on_start(&mut demand).expect("start");
  push_all(&mut definition, &mut demand, vec![1_u32, 2]);
  complete(&mut definition);
  assert_eq!(completion.try_take(), Some(Ok(())));
}

#[test]
fn pipe_sink_grants_demand_only_when_the_destination_is_ready() {
  let (sender, mut receiver) = mpsc::channel::<u32>(0);
  let completion = StreamCompletion::new();
  let mut definition = pipe_sink_definition(sender, completion.clone());
  let mut demand = DemandTracker::new();
  let mut cx = Context::from_waker(noop_waker_ref());
  definition.logic.on_start(&mut demand).expect("start");
  assert!(!demand.has_demand());

  assert_eq!(definition.logic.poll_ready(&mut cx, &mut demand), Poll::Ready(Ok(())));
  assert!(demand.has_demand());
  push_all(&mut definition, &mut demand, vec![9_u32]);
  assert_eq!(receiver.try_next().ok().flatten(), Some(9));

  complete(&mut definition);
  assert_eq!(completion.try_take(), Some(Ok(())));
  assert_eq!(receiver.try_next().ok().flatten(), None);
}

#[test]
fn pipe_sink_reports_a_closed_destination() {
  let (sender, receiver) = mpsc::channel::<u32>(1);
  drop(receiver);
  let mut definition = pipe_sink_definition(sender, StreamCompletion::new());
  let mut demand = DemandTracker::new();
  let mut cx = Context::from_waker(noop_waker_ref());
  let ready = definition.logic.poll_ready(&mut cx, &mut demand);
  assert!(matches!(ready, Poll::Ready(Err(StreamError::Sink(_)))));
}

#[test]
fn queue_sink_forwards_values_and_the_outcome() {
  let queue = SinkQueue::<u32>::new();
  let mut definition = queue_sink_definition(queue.clone());
  let mut demand = DemandTracker::new();
  demand.request(2);
  push_all(&mut definition, &mut demand, vec![1_u32, 2]);
  definition.logic.on_error(StreamError::Destroyed);
  complete(&mut definition);
  assert_eq!(queue.pop(), Some(1));
  assert_eq!(queue.pop(), Some(2));
  assert!(queue.is_empty());
  assert_eq!(queue.take_finish(), Some(Err(StreamError::Destroyed)));
}
