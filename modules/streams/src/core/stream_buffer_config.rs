/// Per-edge capacity used when [`StreamConfig`](super::StreamConfig) is not overridden.
const DEFAULT_EDGE_CAPACITY: usize = 16;

/// Sizing of the buffers placed between adjacent stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamBufferConfig {
  capacity: usize,
}

impl StreamBufferConfig {
  /// Creates a configuration holding at most `capacity` elements per edge.
  ///
  /// A capacity of zero is treated as one.
  #[must_use]
  pub const fn new(capacity: usize) -> Self {
    Self { capacity: at_least_one(capacity) }
  }

  /// Returns the per-edge capacity.
  #[must_use]
  pub const fn capacity(&self) -> usize {
    self.capacity
  }

  /// Replaces the per-edge capacity, clamping zero to one.
  #[must_use]
  pub const fn with_capacity(self, capacity: usize) -> Self {
    Self::new(capacity)
  }
}

impl Default for StreamBufferConfig {
  fn default() -> Self {
    Self::new(DEFAULT_EDGE_CAPACITY)
  }
}

const fn at_least_one(capacity: usize) -> usize {
  if capacity == 0 { 1 } else { capacity }
}
