use alloc::{string::String, vec, vec::Vec};

use super::Pipeline;
use crate::core::{Stream, StreamError};

#[test]
fn empty_pipeline_passes_elements_through() {
  let identity = Pipeline::<u32, u32>::default();
  assert!(identity.is_empty());
  let values = Stream::from_iterator([1_u32, 2]).through(&identity).values();
  assert_eq!(values.into_immediate(), Some(Ok(vec![1, 2])));
}

#[test]
fn attachments_do_not_share_stage_state() {
  let first_two = Pipeline::<u32, u32>::new().take(2).reduce(0_u32, |acc, value| acc + value);
  assert_eq!(first_two.len(), 2);
  let left = first_two.attach(Stream::from_iterator([1_u32, 2, 3])).values();
  let right = first_two.attach(Stream::from_iterator([10_u32, 20, 30])).values();
  assert_eq!(left.into_immediate(), Some(Ok(vec![3])));
  assert_eq!(right.into_immediate(), Some(Ok(vec![30])));
}

#[test]
fn pipelines_compose_with_via() {
  let parse = Pipeline::<&'static str, &'static str>::new().try_map(|text: &'static str| text.parse::<u32>());
  let evens = Pipeline::<u32, u32>::new().filter(|value| value % 2 == 0).map(|value| value * 10);
  let combined = parse.via(&evens);
  assert_eq!(combined.len(), 3);
  let values = Stream::from_iterator(["1", "2", "4"]).through(&combined).values();
  assert_eq!(values.into_immediate(), Some(Ok(vec![20, 40])));
}

#[test]
fn pipeline_errors_follow_the_stream_policy() {
  let parse = Pipeline::<&'static str, &'static str>::new().try_map(|text: &'static str| text.parse::<u32>());
  let stream = Stream::from_iterator(["1", "x", "3"]).stop_on_error(false).through(&parse);
  let errors = stream.errors();
  assert_eq!(stream.values().into_immediate(), Some(Ok(vec![1, 3])));
  assert_eq!(errors.len(), 1);

  let failing = Stream::from_iterator(["x"]).through(&parse).values().into_immediate();
  assert!(matches!(failing, Some(Err(StreamError::Transform { .. }))));
}

#[test]
fn async_pipeline_makes_the_stream_deferred() {
  let delayed = Pipeline::<u32, u32>::new().map(futures::future::ready).resolve();
  let stream = Stream::from_iterator([1_u32, 2]).through(&delayed);
  assert!(stream.is_async());
  let values: Result<Vec<u32>, StreamError> = futures::executor::block_on(stream.to_promise());
  assert_eq!(values, Ok(vec![1, 2]));
}

#[test]
fn batching_pipeline_validates_its_size() {
  assert!(Pipeline::<u32, u32>::new().batch(0).is_err());
  let batched = Pipeline::<u32, u32>::new().batch(2).expect("positive size").flatten().sort_by(|left, right| right.cmp(left));
  let values = Stream::from_iterator([1_u32, 2, 3]).through(&batched).values();
  assert_eq!(values.into_immediate(), Some(Ok(vec![3, 2, 1])));
}

#[test]
fn pipeline_recovers_failed_futures_and_defers() {
  let recovering = Pipeline::<Result<u32, String>, Result<u32, String>>::new()
    .map(futures::future::ready)
    .mass_catch(|_| 0_u32)
    .mass_then(|value: u32| value + 1)
    .resolve()
    .make_async();
  let stream = Stream::from_iterator([Ok(4_u32), Err(String::from("gone"))]).through(&recovering);
  assert!(stream.is_async());
  assert_eq!(futures::executor::block_on(stream.to_promise()), Ok(vec![5, 1]));
}
