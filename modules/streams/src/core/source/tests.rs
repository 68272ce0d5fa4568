use alloc::vec::Vec;
use core::task::{Context, Poll};

use futures::task::noop_waker_ref;

use super::{
  async_source_definition, failed_source_definition, fn_source_definition, iterator_source_definition,
  try_async_source_definition, try_iterator_source_definition,
};
use crate::core::{DynValue, SourceDefinition, StageKind, StreamError, downcast_value};

fn pull(definition: &mut SourceDefinition) -> Poll<Result<Option<DynValue>, StreamError>> {
  let mut cx = Context::from_waker(noop_waker_ref());
  definition.logic.poll_pull(&mut cx)
}

fn drain_u32(definition: &mut SourceDefinition) -> Vec<Result<u32, StreamError>> {
  let mut out = Vec::new();
  loop {
    match pull(definition) {
      | Poll::Ready(Ok(Some(value))) => out.push(downcast_value::<u32>(value)),
      | Poll::Ready(Ok(None)) => return out,
      | Poll::Ready(Err(error)) => out.push(Err(error)),
      | Poll::Pending => panic!("sync source must not pend"),
    }
  }
}

#[test]
fn iterator_source_emits_in_order_and_ends() {
  let mut definition = iterator_source_definition(StageKind::SourceIterator, [1_u32, 2, 3].into_iter());
  assert!(!definition.asynchronous);
  assert_eq!(drain_u32(&mut definition), vec![Ok(1), Ok(2), Ok(3)]);
  assert!(matches!(pull(&mut definition), Poll::Ready(Ok(None))));
}

#[test]
fn cancelled_iterator_source_reports_exhaustion() {
  let mut definition = iterator_source_definition(StageKind::SourceIterator, 0_u32..);
  definition.logic.on_cancel();
  assert!(matches!(pull(&mut definition), Poll::Ready(Ok(None))));
}

#[test]
fn try_iterator_source_maps_errors_to_source_errors() {
  let items: Vec<Result<u32, &'static str>> = vec![Ok(1), Err("bad row"), Ok(3)];
  let mut definition = try_iterator_source_definition(items.into_iter());
  assert_eq!(drain_u32(&mut definition), vec![Ok(1), Err(StreamError::source("bad row")), Ok(3)]);
}

#[test]
fn fn_source_stops_at_first_none() {
  let mut next = 0_u32;
  let mut definition = fn_source_definition(move || {
    next += 1;
    (next <= 2).then_some(next)
  });
  assert_eq!(drain_u32(&mut definition), vec![Ok(1), Ok(2)]);
}

#[test]
fn failed_source_fails_once() {
  let mut definition = failed_source_definition::<u32>(StreamError::source("offline"));
  assert_eq!(drain_u32(&mut definition), vec![Err(StreamError::source("offline"))]);
}

#[test]
fn async_sources_are_flagged_and_forward_items() {
  let mut definition = async_source_definition(StageKind::SourceAsync, futures::stream::iter([4_u32, 5]));
  assert!(definition.asynchronous);
  assert_eq!(drain_u32(&mut definition), vec![Ok(4), Ok(5)]);

  let items: Vec<Result<u32, &'static str>> = vec![Err("late"), Ok(6)];
  let mut definition = try_async_source_definition(StageKind::SourceAsync, futures::stream::iter(items));
  assert_eq!(drain_u32(&mut definition), vec![Err(StreamError::source("late")), Ok(6)]);
}

#[test]
fn pending_async_source_pends() {
  let mut definition = async_source_definition(StageKind::SourceAsync, futures::stream::pending::<u32>());
  assert!(pull(&mut definition).is_pending());
}
