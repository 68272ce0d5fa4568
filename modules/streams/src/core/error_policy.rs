/// How a stream reacts to a failing source or transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorPolicy {
  /// Record the first error, surface it through the consumption result and halt.
  #[default]
  Stop,
  /// Record the error and continue with the next element.
  Continue,
}

impl ErrorPolicy {
  /// Maps the `stop_on_error` flag onto a policy.
  #[must_use]
  pub const fn from_stop_on_error(stop: bool) -> Self {
    if stop { Self::Stop } else { Self::Continue }
  }

  /// Returns `true` when errors halt the stream.
  #[must_use]
  pub const fn stops(&self) -> bool {
    matches!(self, Self::Stop)
  }
}
