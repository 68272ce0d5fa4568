
use futures::executor::block_on;

use crate::core::{Evaluation, StreamError, StreamFuture};

impl<T> Evaluation<T> {
  /// Returns the result, blocking the current thread while a deferred evaluation runs.
  ///
  /// Must not be called from inside an async runtime worker.
  ///
  /// # Errors
  ///
  /// Returns the [`StreamError`] the stream settled with.
  pub fn wait(self) -> Result<T, StreamError> {
    match self {
      | Self::Immediate(result) => result,
      | Self::Deferred(future) => future.wait(),
    }
  }
}

impl<T> StreamFuture<T> {
  /// Drives the future on the current thread until it settles.
  ///
  /// # Errors
  ///
  /// Returns the [`StreamError`] the stream settled with.
  pub fn wait(self) -> Result<T, StreamError> {
    block_on(self)
  }
}
