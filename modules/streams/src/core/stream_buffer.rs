//! Bounded FIFO buffer placed between stages.


use alloc::collections::VecDeque;

use super::StreamBufferConfig;

/// Bounded buffer for stream elements.
///
/// Stages consult [`StreamBuffer::has_room`] before producing, so a full buffer holds the upstream
/// stage back instead of rejecting elements. Stages that expand one input into several outputs may
/// overshoot the capacity for that single step.
pub(crate) struct StreamBuffer<T> {
  queue:    VecDeque<T>,
  capacity: usize,
}

impl<T> StreamBuffer<T> {
  /// Creates a buffer sized by `config`.
  #[must_use]
  pub(crate) fn new(config: StreamBufferConfig) -> Self {
    Self { queue: VecDeque::with_capacity(config.capacity()), capacity: config.capacity() }
  }

  /// Enqueues a value.
  pub(crate) fn offer(&mut self, value: T) {
    self.queue.push_back(value);
  }

  /// Enqueues every value in order.
  pub(crate) fn offer_all<I>(&mut self, values: I)
  where
    I: IntoIterator<Item = T>, {
    self.queue.extend(values);
  }

  /// Dequeues the oldest value.
  pub(crate) fn poll(&mut self) -> Option<T> {
    self.queue.pop_front()
  }

  /// Drops every buffered value.
  pub(crate) fn clear(&mut self) {
    self.queue.clear();
  }

  /// Returns `true` while the buffer holds fewer values than its capacity.
  #[must_use]
  pub(crate) fn has_room(&self) -> bool {
    self.queue.len() < self.capacity
  }

  /// Returns the number of buffered elements.
  #[cfg(test)]
  #[must_use]
  pub(crate) fn len(&self) -> usize {
    self.queue.len()
  }

  /// Returns true when the buffer is empty.
  #[must_use]
  pub(crate) fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }

  /// Returns the buffer capacity.
  #[cfg(test)]
  #[must_use]
  pub(crate) const fn capacity(&self) -> usize {
    self.capacity
  }
}
