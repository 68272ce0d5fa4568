//! Immediate-or-deferred consumption results.

#[cfg(test)]
mod tests;

use core::{
  future::{Future, IntoFuture},
  pin::Pin,
  task::{Context, Poll},
};

use futures::{
  future::{Either, Ready, ready},
  task::noop_waker_ref,
};

use super::{StreamError, StreamFuture};

/// Result of a consumption method.
///
/// Streams without asynchronous stages evaluate while the method runs and return
/// [`Evaluation::Immediate`]. Asynchronous streams, and synchronous streams that are paused when
/// consumption starts, return [`Evaluation::Deferred`]. Both variants can be awaited.
#[must_use = "a deferred evaluation does nothing unless awaited"]
pub enum Evaluation<T> {
  /// The stream settled while the consumption method ran.
  Immediate(Result<T, StreamError>),
  /// The stream settles when the future is driven.
  Deferred(StreamFuture<T>),
}

impl<T> Evaluation<T> {
  // Sync streams are driven once in place; anything that cannot finish without a wakeup is deferred.
  pub(crate) fn evaluate(mut future: StreamFuture<T>, asynchronous: bool) -> Self {
    if asynchronous {
      return Self::Deferred(future);
    }
    let mut cx = Context::from_waker(noop_waker_ref());
    match Pin::new(&mut future).poll(&mut cx) {
      | Poll::Ready(result) => Self::Immediate(result),
      | Poll::Pending => Self::Deferred(future),
    }
  }

  /// Returns `true` for [`Evaluation::Immediate`].
  #[must_use]
  pub const fn is_immediate(&self) -> bool {
    matches!(self, Self::Immediate(_))
  }

  /// Returns `true` for [`Evaluation::Deferred`].
  #[must_use]
  pub const fn is_deferred(&self) -> bool {
    matches!(self, Self::Deferred(_))
  }

  /// Returns the immediate result, or `None` when the evaluation is deferred.
  #[must_use]
  pub fn into_immediate(self) -> Option<Result<T, StreamError>> {
    match self {
      | Self::Immediate(result) => Some(result),
      | Self::Deferred(_) => None,
    }
  }

  /// Returns the deferred future, or `None` when the evaluation is immediate.
  #[must_use]
  pub fn into_deferred(self) -> Option<StreamFuture<T>> {
    match self {
      | Self::Immediate(_) => None,
      | Self::Deferred(future) => Some(future),
    }
  }
}

impl<T> IntoFuture for Evaluation<T> {
  type IntoFuture = Either<Ready<Result<T, StreamError>>, StreamFuture<T>>;
  type Output = Result<T, StreamError>;

  fn into_future(self) -> Self::IntoFuture {
    match self {
      | Self::Immediate(result) => Either::Left(ready(result)),
      | Self::Deferred(future) => Either::Right(future),
    }
  }
}
