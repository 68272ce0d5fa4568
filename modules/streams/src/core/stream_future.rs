//! Future that drives a stream to its consumption result.


use core::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use super::{StreamCompletion, StreamError, stream_interpreter::StreamInterpreter};

enum FutureState<T> {
  Running { interpreter: StreamInterpreter, completion: StreamCompletion<T> },
  Failed(StreamError),
  Finished,
}

/// Deferred consumption result.
///
/// Polling the future drives the stream; dropping it releases the source, in-flight futures and
/// the sink without producing further callbacks.
#[must_use = "streams do nothing unless the returned future is polled"]
pub struct StreamFuture<T> {
  state: FutureState<T>,
}

impl<T> StreamFuture<T> {
  pub(crate) const fn new(interpreter: StreamInterpreter, completion: StreamCompletion<T>) -> Self {
    Self { state: FutureState::Running { interpreter, completion } }
  }

  pub(crate) const fn failed(error: StreamError) -> Self {
    Self { state: FutureState::Failed(error) }
  }

  /// Returns `true` once the future produced its output.
  #[must_use]
  pub const fn is_terminated(&self) -> bool {
    matches!(self.state, FutureState::Finished)
  }
}

impl<T> Future for StreamFuture<T> {
  type Output = Result<T, StreamError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    let result = match &mut this.state {
      | FutureState::Running { interpreter, completion } => {
        if interpreter.poll_run(cx).is_pending() {
          return Poll::Pending;
        }
        completion.try_take().unwrap_or(Err(StreamError::NotRunning))
      },
      | FutureState::Failed(error) => Err(error.clone()),
      | FutureState::Finished => Err(StreamError::NotRunning),
    };
    this.state = FutureState::Finished;
    Poll::Ready(result)
  }
}
