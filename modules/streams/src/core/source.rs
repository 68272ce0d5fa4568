//! Source stage logics.

#[cfg(test)]
mod tests;

use alloc::boxed::Box;
use core::{
  any::TypeId,
  fmt::Display,
  marker::PhantomData,
  pin::Pin,
  task::{Context, Poll},
};

use futures::Stream as AsyncStream;

use super::{DynValue, SourceDefinition, SourceLogic, StageKind, StreamError};

struct IteratorSourceLogic<I> {
  iter: Option<I>,
}

impl<I> SourceLogic for IteratorSourceLogic<I>
where
  I: Iterator + Send,
  I::Item: Send + 'static,
{
  fn poll_pull(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<DynValue>, StreamError>> {
    let next = self.iter.as_mut().and_then(Iterator::next);
    if next.is_none() {
      self.iter = None;
    }
    Poll::Ready(Ok(next.map(|value| Box::new(value) as DynValue)))
  }

  fn on_cancel(&mut self) {
    self.iter = None;
  }
}

struct TryIteratorSourceLogic<I> {
  iter: Option<I>,
}

impl<I, T, E> SourceLogic for TryIteratorSourceLogic<I>
where
  I: Iterator<Item = Result<T, E>> + Send,
  T: Send + 'static,
  E: Display,
{
  fn poll_pull(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<DynValue>, StreamError>> {
    match self.iter.as_mut().and_then(Iterator::next) {
      | Some(Ok(value)) => Poll::Ready(Ok(Some(Box::new(value)))),
      | Some(Err(error)) => Poll::Ready(Err(StreamError::source(error))),
      | None => {
        self.iter = None;
        Poll::Ready(Ok(None))
      },
    }
  }

  fn on_cancel(&mut self) {
    self.iter = None;
  }
}

struct FnSourceLogic<F, T> {
  func: Option<F>,
  _pd:  PhantomData<fn() -> T>,
}

impl<F, T> SourceLogic for FnSourceLogic<F, T>
where
  F: FnMut() -> Option<T> + Send,
  T: Send + 'static,
{
  fn poll_pull(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<DynValue>, StreamError>> {
    let next = self.func.as_mut().and_then(|func| func());
    if next.is_none() {
      self.func = None;
    }
    Poll::Ready(Ok(next.map(|value| Box::new(value) as DynValue)))
  }

  fn on_cancel(&mut self) {
    self.func = None;
  }
}

struct FailedSourceLogic {
  error: Option<StreamError>,
}

impl SourceLogic for FailedSourceLogic {
  fn poll_pull(&mut self, _cx: &mut Context<'_>) -> Poll<Result<Option<DynValue>, StreamError>> {
    match self.error.take() {
      | Some(error) => Poll::Ready(Err(error)),
      | None => Poll::Ready(Ok(None)),
    }
  }
}

struct AsyncSourceLogic<S> {
  stream: Option<Pin<Box<S>>>,
}

impl<S> SourceLogic for AsyncSourceLogic<S>
where
  S: AsyncStream + Send,
  S::Item: Send + 'static,
{
  fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<DynValue>, StreamError>> {
    let Some(stream) = self.stream.as_mut() else {
      return Poll::Ready(Ok(None));
    };
    match stream.as_mut().poll_next(cx) {
      | Poll::Pending => Poll::Pending,
      | Poll::Ready(Some(value)) => Poll::Ready(Ok(Some(Box::new(value)))),
      | Poll::Ready(None) => {
        self.stream = None;
        Poll::Ready(Ok(None))
      },
    }
  }

  fn on_cancel(&mut self) {
    self.stream = None;
  }
}

struct TryAsyncSourceLogic<S> {
  stream: Option<Pin<Box<S>>>,
}

impl<S, T, E> SourceLogic for TryAsyncSourceLogic<S>
where
  S: AsyncStream<Item = Result<T, E>> + Send,
  T: Send + 'static,
  E: Display,
{
  fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<DynValue>, StreamError>> {
    let Some(stream) = self.stream.as_mut() else {
      return Poll::Ready(Ok(None));
    };
    match stream.as_mut().poll_next(cx) {
      | Poll::Pending => Poll::Pending,
      | Poll::Ready(Some(Ok(value))) => Poll::Ready(Ok(Some(Box::new(value)))),
      | Poll::Ready(Some(Err(error))) => Poll::Ready(Err(StreamError::source(error))),
      | Poll::Ready(None) => {
        self.stream = None;
        Poll::Ready(Ok(None))
      },
    }
  }

  fn on_cancel(&mut self) {
    self.stream = None;
  }
}

pub(crate) fn iterator_source_definition<I>(kind: StageKind, iter: I) -> SourceDefinition
where
  I: Iterator + Send + 'static,
  I::Item: Send + 'static, {
  SourceDefinition {
    kind,
    output_type: TypeId::of::<I::Item>(),
    asynchronous: false,
    logic: Box::new(IteratorSourceLogic { iter: Some(iter) }),
  }
}

pub(crate) fn try_iterator_source_definition<I, T, E>(iter: I) -> SourceDefinition
where
  I: Iterator<Item = Result<T, E>> + Send + 'static,
  T: Send + 'static,
  E: Display + 'static, {
  SourceDefinition {
    kind:         StageKind::SourceIterator,
    output_type:  TypeId::of::<T>(),
    asynchronous: false,
    logic:        Box::new(TryIteratorSourceLogic { iter: Some(iter) }),
  }
}

pub(crate) fn fn_source_definition<F, T>(func: F) -> SourceDefinition
where
  F: FnMut() -> Option<T> + Send + 'static,
  T: Send + 'static, {
  SourceDefinition {
    kind:         StageKind::SourceFn,
    output_type:  TypeId::of::<T>(),
    asynchronous: false,
    logic:        Box::new(FnSourceLogic::<F, T> { func: Some(func), _pd: PhantomData }),
  }
}

pub(crate) fn failed_source_definition<T>(error: StreamError) -> SourceDefinition
where
  T: Send + 'static, {
  SourceDefinition {
    kind:         StageKind::SourceFailed,
    output_type:  TypeId::of::<T>(),
    asynchronous: false,
    logic:        Box::new(FailedSourceLogic { error: Some(error) }),
  }
}

pub(crate) fn async_source_definition<S>(kind: StageKind, stream: S) -> SourceDefinition
where
  S: AsyncStream + Send + 'static,
  S::Item: Send + 'static, {
  SourceDefinition {
    kind,
    output_type: TypeId::of::<S::Item>(),
    asynchronous: true,
    logic: Box::new(AsyncSourceLogic { stream: Some(Box::pin(stream)) }),
  }
}

pub(crate) fn try_async_source_definition<S, T, E>(kind: StageKind, stream: S) -> SourceDefinition
where
  S: AsyncStream<Item = Result<T, E>> + Send + 'static,
  T: Send + 'static,
  E: Display + 'static, {
  SourceDefinition {
    kind,
    output_type: TypeId::of::<T>(),
    asynchronous: true,
    logic: Box::new(TryAsyncSourceLogic { stream: Some(Box::pin(stream)) }),
  }
}
