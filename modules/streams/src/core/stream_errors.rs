//! Error collection shared between a stream and its consumer.


use alloc::{sync::Arc, vec::Vec};

use spin::Mutex;

use super::StreamError;

/// Every error recorded while a stream ran, in occurrence order.
///
/// Obtain it with [`Stream::errors`](super::Stream::errors); the collection keeps filling while the
/// stream runs, so it can be inspected after consumption settles.
#[derive(Clone, Default)]
pub struct StreamErrors {
  inner: Arc<Mutex<Vec<StreamError>>>,
}

impl StreamErrors {
  /// Creates an empty collection.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the number of recorded errors.
  #[must_use]
  pub fn len(&self) -> usize {
    self.inner.lock().len()
  }

  /// Returns `true` when nothing was recorded.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.inner.lock().is_empty()
  }

  /// Returns a copy of the recorded errors.
  #[must_use]
  pub fn snapshot(&self) -> Vec<StreamError> {
    self.inner.lock().clone()
  }

  /// Removes and returns the recorded errors.
  pub fn drain(&self) -> Vec<StreamError> {
    core::mem::take(&mut *self.inner.lock())
  }

  pub(crate) fn record(&self, error: StreamError) {
    self.inner.lock().push(error);
  }
}
