//! Async iterator over stream outputs.


use core::{
  pin::Pin,
  task::{Context, Poll},
};

use futures::{StreamExt, stream::Next};

use super::{StreamError, sink_queue::SinkQueue, stream_interpreter::StreamInterpreter};

/// Pull-based consumer returned by [`Stream::to_async_iterator`](super::Stream::to_async_iterator).
///
/// Each request grants the stream demand for exactly one element, so nothing is pulled from the
/// source ahead of the consumer beyond what the stages buffer. Errors are yielded as items; under
/// the default policy the first error is the last item.
pub struct StreamIter<T> {
  interpreter: Option<StreamInterpreter>,
  queue:       SinkQueue<T>,
  failure:     Option<StreamError>,
}

impl<T> StreamIter<T> {
  pub(crate) fn new(interpreter: Result<StreamInterpreter, StreamError>, queue: SinkQueue<T>) -> Self {
    match interpreter {
      | Ok(interpreter) => Self { interpreter: Some(interpreter), queue, failure: None },
      | Err(error) => Self { interpreter: None, queue, failure: Some(error) },
    }
  }

  /// Pulls the next element, granting demand for exactly one.
  ///
  /// Resolves to `None` once the stream has completed; later pulls keep resolving to `None`.
  pub fn pull(&mut self) -> Next<'_, Self> {
    self.next()
  }

  pub(crate) fn poll_item(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<T, StreamError>>> {
    loop {
      if let Some(value) = self.queue.pop() {
        return Poll::Ready(Some(Ok(value)));
      }
      let Some(interpreter) = self.interpreter.as_mut() else {
        return Poll::Ready(self.failure.take().map(Err));
      };
      if interpreter.state().is_terminal() {
        self.interpreter = None;
        self.failure = match self.queue.take_finish() {
          | Some(Err(error)) => Some(error),
          | _ => None,
        };
        continue;
      }
      if !interpreter.has_demand() {
        interpreter.request_demand(1);
      }
      if interpreter.poll_run(cx).is_pending() && self.queue.is_empty() {
        return Poll::Pending;
      }
    }
  }
}

impl<T> futures::Stream for StreamIter<T> {
  type Item = Result<T, StreamError>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.get_mut().poll_item(cx)
  }
}
