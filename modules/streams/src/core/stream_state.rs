//! Stream lifecycle states.

/// Lifecycle state of a running stream.
///
/// Pausing is tracked by [`StreamControl`](super::StreamControl) and is not a state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
  /// Built but not started.
  Idle,
  /// Started and not yet settled.
  Running,
  /// The source and every stage finished and the sink accepted completion.
  Completed,
  /// Halted by an error.
  Failed,
  /// Halted by [`StreamControl::destroy`](super::StreamControl::destroy).
  Destroyed,
}

impl StreamState {
  /// Returns `true` for states that never change again.
  #[must_use]
  pub const fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Failed | Self::Destroyed)
  }
}
