use alloc::{vec, vec::Vec};
use core::future::IntoFuture;

use futures::{executor::block_on, future::ready};

use crate::core::{Evaluation, Stream, StreamError};

#[test]
fn synchronous_streams_are_immediate() {
  let evaluation = Stream::from_iterator([1_u32, 2]).values();
  assert!(evaluation.is_immediate());
  assert!(!evaluation.is_deferred());
  assert_eq!(evaluation.into_immediate(), Some(Ok(vec![1, 2])));
}

#[test]
fn asynchronous_streams_are_deferred_without_being_polled() {
  let stream = Stream::from_iterator([1_u32]).map(ready).resolve();
  let evaluation = stream.values();
  assert!(evaluation.is_deferred());
  let Evaluation::Deferred(future) = evaluation else {
    panic!("expected a deferred evaluation");
  };
  assert!(!future.is_terminated());
  assert_eq!(block_on(future), Ok(vec![1]));
}

#[test]
fn immediate_and_deferred_results_can_both_be_awaited() {
  let immediate: Result<Vec<u32>, StreamError> = block_on(Stream::from_iterator([4_u32]).values().into_future());
  assert_eq!(immediate, Ok(vec![4]));
  let deferred = block_on(Stream::from_iterator([5_u32]).map(ready).resolve().value().into_future());
  assert_eq!(deferred, Ok(5));
}

#[test]
fn accessors_return_none_for_the_other_variant() {
  assert!(Stream::from_iterator([1_u32]).values().into_deferred().is_none());
  assert!(Stream::from_iterator([1_u32]).map(ready).resolve().values().into_immediate().is_none());
}
