// allow module_wiring::no_parent_reexport
extern crate std;

#[cfg(test)]
mod tests;

use core::fmt::Display;
use std::string::{String, ToString};

use futures::{SinkExt, channel::mpsc};

use crate::core::{StageKind, Stream, StreamError};

/// Producer side of a push-based stream created by [`Stream::from_push`].
///
/// Values are buffered up to the capacity given at creation. [`Emitter::emit`] waits for room,
/// [`Emitter::try_emit`] reports [`StreamError::BufferFull`] instead. Dropping every emitter ends
/// the stream like [`Emitter::end`].
pub struct Emitter<T> {
  sender: mpsc::Sender<Result<T, String>>,
}

impl<T> Clone for Emitter<T> {
  fn clone(&self) -> Self {
    Self { sender: self.sender.clone() }
  }
}

impl<T> Emitter<T>
where
  T: Send + 'static,
{
  /// Pushes `value`, waiting while the buffer is full.
  ///
  /// # Errors
  ///
  /// Returns [`StreamError::Destroyed`] when the stream no longer accepts values.
  pub async fn emit(&mut self, value: T) -> Result<(), StreamError> {
    self.sender.send(Ok(value)).await.map_err(|_| StreamError::Destroyed)
  }

  /// Pushes `value` without waiting.
  ///
  /// # Errors
  ///
  /// Returns [`StreamError::BufferFull`] when the buffer has no room and
  /// [`StreamError::Destroyed`] when the stream no longer accepts values.
  pub fn try_emit(&mut self, value: T) -> Result<(), StreamError> {
    self.sender.try_send(Ok(value)).map_err(|error| {
      if error.is_full() { StreamError::BufferFull } else { StreamError::Destroyed }
    })
  }

  /// Reports a source error after the values already pushed, then ends the stream.
  ///
  /// # Errors
  ///
  /// Returns [`StreamError::Destroyed`] when the stream no longer accepts values.
  pub async fn fail(mut self, error: impl Display) -> Result<(), StreamError> {
    let sent = self.sender.send(Err(error.to_string())).await.map_err(|_| StreamError::Destroyed);
    self.sender.close_channel();
    sent
  }

  /// Ends the stream once the buffered values have been consumed.
  pub fn end(mut self) {
    self.sender.close_channel();
  }

  /// Returns `true` once the stream stopped accepting values.
  #[must_use]
  pub fn is_closed(&self) -> bool {
    self.sender.is_closed()
  }
}

impl<T> Stream<T>
where
  T: Send + 'static,
{
  /// Creates an asynchronous stream fed by the returned [`Emitter`].
  ///
  /// `capacity` bounds how many values may wait for the consumer.
  #[must_use]
  pub fn from_push(capacity: usize) -> (Emitter<T>, Self) {
    let (sender, receiver) = mpsc::channel(capacity);
    (Emitter { sender }, Self::try_from_async_kind(StageKind::SourcePush, receiver))
  }
}
