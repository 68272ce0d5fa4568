
use tokio::{runtime::Handle, task::JoinHandle};

use crate::core::{Evaluation, Stream, StreamError, StreamFuture};

const TRACE_TARGET: &str = "exstream::stream";

/// Spawns consumption futures onto a Tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioDriver {
  handle: Handle,
}

impl TokioDriver {
  /// Binds to the runtime of the calling context.
  ///
  /// # Errors
  ///
  /// Returns [`StreamError::ExecutorUnavailable`] when called outside a Tokio runtime.
  pub fn current() -> Result<Self, StreamError> {
    Handle::try_current().map(Self::from_handle).map_err(|_| StreamError::ExecutorUnavailable)
  }

  /// Binds to an explicit runtime handle.
  #[must_use]
  pub const fn from_handle(handle: Handle) -> Self {
    Self { handle }
  }

  /// Returns the runtime handle.
  #[must_use]
  pub const fn handle(&self) -> &Handle {
    &self.handle
  }

  /// Runs `future` as a Tokio task.
  pub fn spawn<T>(&self, future: StreamFuture<T>) -> JoinHandle<Result<T, StreamError>>
  where
    T: Send + 'static, {
    tracing::debug!(target: TRACE_TARGET, "stream spawned on tokio");
    self.handle.spawn(future)
  }

  /// Runs an evaluation as a Tokio task; immediate results are returned through the task as-is.
  pub fn spawn_evaluation<T>(&self, evaluation: Evaluation<T>) -> JoinHandle<Result<T, StreamError>>
  where
    T: Send + 'static, {
    match evaluation {
      | Evaluation::Immediate(result) => self.handle.spawn(async move { result }),
      | Evaluation::Deferred(future) => self.spawn(future),
    }
  }

  /// Drives `stream` to completion in the background, discarding its outputs.
  pub fn spawn_start<T>(&self, stream: Stream<T>) -> JoinHandle<Result<(), StreamError>>
  where
    T: Send + 'static, {
    self.spawn_evaluation(stream.start())
  }
}
