//! Queue shared between a queue sink and the iterator pulling from it.


use alloc::{collections::VecDeque, sync::Arc};

use spin::Mutex;

use super::StreamError;

struct SinkQueueState<T> {
  values:   VecDeque<T>,
  finished: Option<Result<(), StreamError>>,
}

pub(crate) struct SinkQueue<T> {
  inner: Arc<Mutex<SinkQueueState<T>>>,
}

impl<T> Clone for SinkQueue<T> {
  fn clone(&self) -> Self {
    Self { inner: self.inner.clone() }
  }
}

impl<T> SinkQueue<T> {
  pub(crate) fn new() -> Self {
    Self { inner: Arc::new(Mutex::new(SinkQueueState { values: VecDeque::new(), finished: None })) }
  }

  pub(crate) fn push(&self, value: T) {
    self.inner.lock().values.push_back(value);
  }

  pub(crate) fn pop(&self) -> Option<T> {
    self.inner.lock().values.pop_front()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.inner.lock().values.is_empty()
  }

  pub(crate) fn finish(&self, result: Result<(), StreamError>) {
    let mut guard = self.inner.lock();
    if guard.finished.is_none() {
      guard.finished = Some(result);
    }
  }

  pub(crate) fn take_finish(&self) -> Option<Result<(), StreamError>> {
    self.inner.lock().finished.take()
  }
}
