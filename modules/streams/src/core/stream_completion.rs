//! One-shot slot carrying the result of an evaluation.

use alloc::sync::Arc;

use spin::Mutex;

use super::StreamError;


enum Slot<T> {
  Empty,
  Settled(Result<T, StreamError>),
  Taken,
}

/// Slot shared between a sink and the future that reports its result.
///
/// The first result wins; later results, including those arriving after the result was taken,
/// are dropped.
pub(crate) struct StreamCompletion<T> {
  slot: Arc<Mutex<Slot<T>>>,
}

impl<T> Clone for StreamCompletion<T> {
  fn clone(&self) -> Self {
    Self { slot: self.slot.clone() }
  }
}

impl<T> StreamCompletion<T> {
  pub(crate) fn new() -> Self {
    Self { slot: Arc::new(Mutex::new(Slot::Empty)) }
  }

  pub(crate) fn complete(&self, result: Result<T, StreamError>) {
    let mut slot = self.slot.lock();
    if matches!(*slot, Slot::Empty) {
      *slot = Slot::Settled(result);
    }
  }

  pub(crate) fn try_take(&self) -> Option<Result<T, StreamError>> {
    let mut slot = self.slot.lock();
    match core::mem::replace(&mut *slot, Slot::Taken) {
      | Slot::Settled(result) => Some(result),
      | previous => {
        *slot = previous;
        None
      },
    }
  }
}
