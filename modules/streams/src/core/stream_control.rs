//! Pause, resume, end and destroy handle shared with a running stream.


use alloc::sync::Arc;
use core::task::Context;

use futures::task::AtomicWaker;
use portable_atomic::{AtomicU8, Ordering};

const RUNNING: u8 = 0;
const PAUSED: u8 = 1;
const ENDED: u8 = 2;
const DESTROYED: u8 = 3;

const TRACE_TARGET: &str = "exstream::stream";

/// Flow-control handle for a stream.
///
/// Obtain it with [`Stream::control`](super::Stream::control) before consuming the stream. Every
/// clone controls the same evaluation, so the handle can be moved into callbacks.
#[derive(Clone)]
pub struct StreamControl {
  inner: Arc<ControlShared>,
}

impl StreamControl {
  /// Creates a handle in the running state.
  #[must_use]
  pub fn new() -> Self {
    Self { inner: Arc::new(ControlShared::new()) }
  }

  /// Suspends pulling and processing until [`StreamControl::resume`] is called.
  ///
  /// Has no effect on an ended or destroyed stream.
  pub fn pause(&self) {
    if self.inner.transition(RUNNING, PAUSED) {
      tracing::debug!(target: TRACE_TARGET, "stream paused");
    }
  }

  /// Resumes a paused stream.
  pub fn resume(&self) {
    if self.inner.transition(PAUSED, RUNNING) {
      tracing::debug!(target: TRACE_TARGET, "stream resumed");
      self.inner.waker.wake();
    }
  }

  /// Stops pulling from the source; elements already in flight are still delivered and the
  /// consumption completes normally.
  pub fn end(&self) {
    let updated = self.inner.state.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| match current {
      | RUNNING | PAUSED => Some(ENDED),
      | _ => None,
    });
    if updated.is_ok() {
      tracing::debug!(target: TRACE_TARGET, "stream end requested");
      self.inner.waker.wake();
    }
  }

  /// Stops the stream immediately, discards in-flight elements and settles the consumption with
  /// [`StreamError::Destroyed`](super::StreamError::Destroyed).
  pub fn destroy(&self) {
    if self.inner.state.swap(DESTROYED, Ordering::AcqRel) != DESTROYED {
      tracing::debug!(target: TRACE_TARGET, "stream destroy requested");
      self.inner.waker.wake();
    }
  }

  /// Returns `true` while the stream is paused.
  #[must_use]
  pub fn is_paused(&self) -> bool {
    self.inner.load() == PAUSED
  }

  /// Returns `true` once [`StreamControl::end`] took effect.
  #[must_use]
  pub fn is_ended(&self) -> bool {
    self.inner.load() == ENDED
  }

  /// Returns `true` once [`StreamControl::destroy`] was called.
  #[must_use]
  pub fn is_destroyed(&self) -> bool {
    self.inner.load() == DESTROYED
  }

  pub(crate) fn is_halted(&self) -> bool {
    matches!(self.inner.load(), PAUSED | DESTROYED)
  }

  pub(crate) fn poll_signal(&self, cx: &mut Context<'_>) -> ControlSignal {
    match self.inner.load() {
      | RUNNING | PAUSED => {
        self.inner.waker.register(cx.waker());
        // a transition may have raced the registration
        ControlSignal::from_state(self.inner.load())
      },
      | state => ControlSignal::from_state(state),
    }
  }
}

impl Default for StreamControl {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlSignal {
  Run,
  Pause,
  End,
  Destroy,
}

impl ControlSignal {
  const fn from_state(state: u8) -> Self {
    match state {
      | PAUSED => Self::Pause,
      | ENDED => Self::End,
      | DESTROYED => Self::Destroy,
      | _ => Self::Run,
    }
  }
}

struct ControlShared {
  state: AtomicU8,
  waker: AtomicWaker,
}

impl ControlShared {
  const fn new() -> Self {
    Self { state: AtomicU8::new(RUNNING), waker: AtomicWaker::new() }
  }

  fn load(&self) -> u8 {
    self.state.load(Ordering::Acquire)
  }

  fn transition(&self, from: u8, to: u8) -> bool {
    self.state.compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire).is_ok()
  }
}
