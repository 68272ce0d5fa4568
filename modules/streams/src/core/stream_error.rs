//! Stream error definitions.


use alloc::string::{String, ToString};
use core::fmt::Display;

use super::StageKind;

/// Errors produced while evaluating a stream.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StreamError {
  /// The source failed to produce an element.
  #[error("source failed: {0}")]
  Source(String),
  /// A transformation stage failed.
  #[error("{stage:?} stage failed: {message}")]
  Transform {
    /// Stage that reported the failure.
    stage:   StageKind,
    /// Rendered failure message.
    message: String,
  },
  /// The destination rejected an element or failed to close.
  #[error("destination failed: {0}")]
  Sink(String),
  /// Adjacent stages disagree on the element type.
  #[error("stage type mismatch")]
  TypeMismatch,
  /// The stream completed without producing a value.
  #[error("stream produced no value")]
  Empty,
  /// The stream was destroyed before it settled.
  #[error("stream was destroyed")]
  Destroyed,
  /// A synchronous consumer was used on an asynchronous stream.
  #[error("stream is asynchronous")]
  AsyncStream,
  /// The stream is not running.
  #[error("stream is not running")]
  NotRunning,
  /// A push source buffer reached capacity.
  #[error("buffer is full")]
  BufferFull,
  /// Required executor is unavailable.
  #[error("executor is unavailable")]
  ExecutorUnavailable,
}

impl StreamError {
  /// Builds a source error from any displayable failure.
  #[must_use]
  pub fn source(error: impl Display) -> Self {
    Self::Source(error.to_string())
  }

  /// Builds a transformation error attributed to `stage`.
  #[must_use]
  pub fn transform(stage: StageKind, error: impl Display) -> Self {
    Self::Transform { stage, message: error.to_string() }
  }

  /// Builds a destination error from any displayable failure.
  #[must_use]
  pub fn sink(error: impl Display) -> Self {
    Self::Sink(error.to_string())
  }
}
