#[cfg(test)]
mod tests;

use super::{ErrorPolicy, StreamBufferConfig};

/// Evaluation settings carried by a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamConfig {
  buffer:       StreamBufferConfig,
  error_policy: ErrorPolicy,
}

impl StreamConfig {
  /// Creates a configuration from its parts.
  #[must_use]
  pub const fn new(buffer: StreamBufferConfig, error_policy: ErrorPolicy) -> Self {
    Self { buffer, error_policy }
  }

  /// Returns the buffer configuration used for every inter-stage edge.
  #[must_use]
  pub const fn buffer(&self) -> StreamBufferConfig {
    self.buffer
  }

  /// Returns the error policy.
  #[must_use]
  pub const fn error_policy(&self) -> ErrorPolicy {
    self.error_policy
  }

  /// Updates the buffer configuration.
  #[must_use]
  pub const fn with_buffer(mut self, buffer: StreamBufferConfig) -> Self {
    self.buffer = buffer;
    self
  }

  /// Updates the error policy.
  #[must_use]
  pub const fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
    self.error_policy = error_policy;
    self
  }
}
