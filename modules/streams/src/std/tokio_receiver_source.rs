#[cfg(test)]
mod tests;

use futures::stream;
use tokio::sync::mpsc::{Receiver, UnboundedReceiver};

use crate::core::{StageKind, Stream};

impl<T> Stream<T>
where
  T: Send + 'static,
{
  /// Creates an asynchronous stream over a bounded Tokio channel.
  ///
  /// The stream ends once every sender is dropped and the buffered values were pulled. Ending or
  /// destroying the stream drops the receiver, which closes the channel for the senders.
  #[must_use]
  pub fn from_tokio_receiver(mut receiver: Receiver<T>) -> Self {
    Self::from_async_kind(StageKind::SourceChannel, stream::poll_fn(move |cx| receiver.poll_recv(cx)))
  }

  /// Creates an asynchronous stream over an unbounded Tokio channel.
  #[must_use]
  pub fn from_tokio_unbounded_receiver(mut receiver: UnboundedReceiver<T>) -> Self {
    Self::from_async_kind(StageKind::SourceChannel, stream::poll_fn(move |cx| receiver.poll_recv(cx)))
  }
}
