use alloc::vec;

use crate::core::{Stream, StreamError};

#[tokio::test(flavor = "current_thread")]
async fn pushed_values_arrive_in_order() {
  let (mut emitter, stream) = Stream::<u32>::from_push(4);
  assert!(stream.is_async());
  let producer = tokio::spawn(async move {
    for value in 1..=3 {
      emitter.emit(value).await.expect("stream should accept values");
    }
    emitter.end();
  });
  assert_eq!(stream.values().await, Ok(vec![1, 2, 3]));
  producer.await.expect("producer task");
}

#[tokio::test(flavor = "current_thread")]
async fn try_emit_reports_a_full_buffer() {
  let (mut emitter, stream) = Stream::<u32>::from_push(0);
  assert_eq!(emitter.try_emit(1), Ok(()));
  assert_eq!(emitter.try_emit(2), Err(StreamError::BufferFull));
  emitter.end();
  assert_eq!(stream.values().await, Ok(vec![1]));
}

#[tokio::test(flavor = "current_thread")]
async fn fail_surfaces_a_source_error_after_pending_values() {
  let (mut emitter, stream) = Stream::<u32>::from_push(4);
  emitter.try_emit(1).expect("room in buffer");
  emitter.fail("upstream gone").await.expect("stream alive");
  let stream = stream.stop_on_error(false);
  let errors = stream.errors();
  assert_eq!(stream.values().await, Ok(vec![1]));
  assert_eq!(errors.snapshot(), vec![StreamError::source("upstream gone")]);
}

#[tokio::test(flavor = "current_thread")]
async fn destroying_the_stream_closes_the_emitter() {
  let (mut emitter, stream) = Stream::<u32>::from_push(4);
  let control = stream.control();
  control.destroy();
  assert_eq!(stream.values().await, Err(StreamError::Destroyed));
  assert!(emitter.is_closed());
  assert_eq!(emitter.try_emit(5), Err(StreamError::Destroyed));
}
