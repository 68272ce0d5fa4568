//! Iterator adapter for synchronous consumption.


use core::task::{Context, Poll};

use futures::task::noop_waker_ref;

use super::{StreamError, StreamIter};

/// Blocking-free iterator over a synchronous stream, returned by
/// [`Stream::consume_sync`](super::Stream::consume_sync).
///
/// Iteration stops early when the stream is paused; calling `next` again after
/// [`StreamControl::resume`](super::StreamControl::resume) continues where it left off.
pub struct SyncIter<T> {
  inner: StreamIter<T>,
}

impl<T> SyncIter<T> {
  pub(crate) const fn new(inner: StreamIter<T>) -> Self {
    Self { inner }
  }
}

impl<T> Iterator for SyncIter<T> {
  type Item = Result<T, StreamError>;

  fn next(&mut self) -> Option<Self::Item> {
    let mut cx = Context::from_waker(noop_waker_ref());
    match self.inner.poll_item(&mut cx) {
      | Poll::Ready(item) => item,
      | Poll::Pending => None,
    }
  }
}
