//! Errors raised while building a stream.


/// Rejected builder argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StreamDslError {
  /// A numeric argument is outside its accepted range.
  #[error("invalid argument `{name}` = {value}: {reason}")]
  InvalidArgument {
    /// Argument name.
    name:   &'static str,
    /// Rejected value.
    value:  usize,
    /// Why the value was rejected.
    reason: &'static str,
  },
}

impl StreamDslError {
  pub(crate) const fn require_positive(name: &'static str, value: usize) -> Result<usize, Self> {
    if value == 0 {
      return Err(Self::InvalidArgument { name, value, reason: "must be greater than zero" });
    }
    Ok(value)
  }
}
