//! Sink stage logics.

#[cfg(test)]
mod tests;

use alloc::{boxed::Box, vec::Vec};
use core::{
  any::TypeId,
  fmt::Display,
  marker::PhantomData,
  mem,
  task::{Context, Poll},
};

use futures::{Sink as AsyncSink, SinkExt};

use super::{
  DemandTracker, DynValue, SinkDecision, SinkDefinition, SinkLogic, StageKind, StreamCompletion, StreamError,
  downcast_value, sink_queue::SinkQueue,
};

fn sink_definition<In, L>(kind: StageKind, logic: L) -> SinkDefinition
where
  In: 'static,
  L: SinkLogic + 'static, {
  SinkDefinition { kind, input_type: TypeId::of::<In>(), logic: Box::new(logic) }
}

struct CollectSinkLogic<In> {
  values:     Vec<In>,
  completion: StreamCompletion<Vec<In>>,
}

impl<In> SinkLogic for CollectSinkLogic<In>
where
  In: Send + 'static,
{
  fn on_start(&mut self, demand: &mut DemandTracker) -> Result<(), StreamError> {
    demand.request_unbounded();
    Ok(())
  }

  fn on_push(&mut self, input: DynValue, _demand: &mut DemandTracker) -> Result<SinkDecision, StreamError> {
    self.values.push(downcast_value::<In>(input)?);
    Ok(SinkDecision::Continue)
  }

  fn poll_complete(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
    self.completion.complete(Ok(mem::take(&mut self.values)));
    Poll::Ready(Ok(()))
  }

  fn on_error(&mut self, error: StreamError) {
    self.values.clear();
    self.completion.complete(Err(error));
  }
}

struct FirstSinkLogic<In> {
  completion: StreamCompletion<In>,
}

impl<In> SinkLogic for FirstSinkLogic<In>
where
  In: Send + 'static,
{
  fn on_start(&mut self, demand: &mut DemandTracker) -> Result<(), StreamError> {
    demand.request(1);
    Ok(())
  }

  fn on_push(&mut self, input: DynValue, _demand: &mut DemandTracker) -> Result<SinkDecision, StreamError> {
    self.completion.complete(Ok(downcast_value::<In>(input)?));
    Ok(SinkDecision::Complete)
  }

  fn poll_complete(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
    self.completion.complete(Err(StreamError::Empty));
    Poll::Ready(Ok(()))
  }

  fn on_error(&mut self, error: StreamError) {
    self.completion.complete(Err(error));
  }
}

struct ForeachSinkLogic<In, F> {
  func:       F,
  completion: StreamCompletion<()>,
  _pd:        PhantomData<fn(In)>,
}

impl<In, F> SinkLogic for ForeachSinkLogic<In, F>
where
  In: Send + 'static,
  F: FnMut(In) + Send,
{
  fn on_start(&mut self, demand: &mut DemandTracker) -> Result<(), StreamError> {
    demand.request_unbounded();
    Ok(())
  }

  fn on_push(&mut self, input: DynValue, _demand: &mut DemandTracker) -> Result<SinkDecision, StreamError> {
    (self.func)(downcast_value::<In>(input)?);
    Ok(SinkDecision::Continue)
  }

  fn poll_complete(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
    self.completion.complete(Ok(()));
    Poll::Ready(Ok(()))
  }

  fn on_error(&mut self, error: StreamError) {
    self.completion.complete(Err(error));
  }
}

struct ToArraySinkLogic<In, F> {
  values:     Vec<In>,
  callback:   Option<F>,
  completion: StreamCompletion<()>,
}

impl<In, F> SinkLogic for ToArraySinkLogic<In, F>
where
  In: Send + 'static,
  F: FnOnce(Vec<In>) + Send,
{
  fn on_start(&mut self, demand: &mut DemandTracker) -> Result<(), StreamError> {
    demand.request_unbounded();
    Ok(())
  }

  fn on_push(&mut self, input: DynValue, _demand: &mut DemandTracker) -> Result<SinkDecision, StreamError> {
    self.values.push(downcast_value::<In>(input)?);
    Ok(SinkDecision::Continue)
  }

  fn poll_complete(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
    if let Some(callback) = self.callback.take() {
      callback(mem::take(&mut self.values));
    }
    self.completion.complete(Ok(()));
    Poll::Ready(Ok(()))
  }

  fn on_error(&mut self, error: StreamError) {
    self.callback = None;
    self.values.clear();
    self.completion.complete(Err(error));
  }
}

struct IgnoreSinkLogic<In> {
  completion: StreamCompletion<()>,
  _pd:        PhantomData<fn(In)>,
}

impl<In> SinkLogic for IgnoreSinkLogic<In>
where
  In: Send + 'static,
{
  fn on_start(&mut self, demand: &mut DemandTracker) -> Result<(), StreamError> {
    demand.request_unbounded();
    Ok(())
  }

  fn on_push(&mut self, input: DynValue, _demand: &mut DemandTracker) -> Result<SinkDecision, StreamError> {
    downcast_value::<In>(input)?;
    Ok(SinkDecision::Continue)
  }

  fn poll_complete(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
    self.completion.complete(Ok(()));
    Poll::Ready(Ok(()))
  }

  fn on_error(&mut self, error: StreamError) {
    self.completion.complete(Err(error));
  }
}

struct PipeSinkLogic<In, D> {
  destination: Option<D>,
  completion:  StreamCompletion<()>,
  _pd:         PhantomData<fn(In)>,
}

impl<In, D> SinkLogic for PipeSinkLogic<In, D>
where
  In: Send + 'static,
  D: AsyncSink<In> + Unpin + Send,
  D::Error: Display,
{
  fn on_start(&mut self, _demand: &mut DemandTracker) -> Result<(), StreamError> {
    Ok(())
  }

  fn poll_ready(&mut self, cx: &mut Context<'_>, demand: &mut DemandTracker) -> Poll<Result<(), StreamError>> {
    let Some(destination) = self.destination.as_mut() else {
      return Poll::Ready(Err(StreamError::NotRunning));
    };
    match destination.poll_ready_unpin(cx) {
      | Poll::Pending => Poll::Pending,
      | Poll::Ready(Ok(())) => {
        demand.request(1);
        Poll::Ready(Ok(()))
      },
      | Poll::Ready(Err(error)) => Poll::Ready(Err(StreamError::sink(error))),
    }
  }

  fn on_push(&mut self, input: DynValue, _demand: &mut DemandTracker) -> Result<SinkDecision, StreamError> {
    let value = downcast_value::<In>(input)?;
    let destination = self.destination.as_mut().ok_or(StreamError::NotRunning)?;
    destination.start_send_unpin(value).map_err(StreamError::sink)?;
    Ok(SinkDecision::Continue)
  }

  fn poll_complete(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
    let Some(destination) = self.destination.as_mut() else {
      return Poll::Ready(Ok(()));
    };
    match destination.poll_close_unpin(cx) {
      | Poll::Pending => Poll::Pending,
      | Poll::Ready(Ok(())) => {
        self.destination = None;
        self.completion.complete(Ok(()));
        Poll::Ready(Ok(()))
      },
      | Poll::Ready(Err(error)) => Poll::Ready(Err(StreamError::sink(error))),
    }
  }

  fn on_error(&mut self, error: StreamError) {
    self.destination = None;
    self.completion.complete(Err(error));
  }
}

struct QueueSinkLogic<In> {
  queue: SinkQueue<In>,
}

impl<In> SinkLogic for QueueSinkLogic<In>
where
  In: Send + 'static,
{
  fn on_start(&mut self, _demand: &mut DemandTracker) -> Result<(), StreamError> {
    Ok(())
  }

  fn on_push(&mut self, input: DynValue, _demand: &mut DemandTracker) -> Result<SinkDecision, StreamError> {
    self.queue.push(downcast_value::<In>(input)?);
    Ok(SinkDecision::Continue)
  }

  fn poll_complete(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), StreamError>> {
    self.queue.finish(Ok(()));
    Poll::Ready(Ok(()))
  }

  fn on_error(&mut self, error: StreamError) {
    self.queue.finish(Err(error));
  }
}

pub(crate) fn collect_sink_definition<In>(completion: StreamCompletion<Vec<In>>) -> SinkDefinition
where
  In: Send + 'static, {
  sink_definition::<In, _>(StageKind::SinkCollect, CollectSinkLogic::<In> { values: Vec::new(), completion })
}

pub(crate) fn first_sink_definition<In>(completion: StreamCompletion<In>) -> SinkDefinition
where
  In: Send + 'static, {
  sink_definition::<In, _>(StageKind::SinkFirst, FirstSinkLogic::<In> { completion })
}

pub(crate) fn foreach_sink_definition<In, F>(func: F, completion: StreamCompletion<()>) -> SinkDefinition
where
  In: Send + 'static,
  F: FnMut(In) + Send + 'static, {
  sink_definition::<In, _>(StageKind::SinkForeach, ForeachSinkLogic::<In, F> { func, completion, _pd: PhantomData })
}

pub(crate) fn to_array_sink_definition<In, F>(callback: F, completion: StreamCompletion<()>) -> SinkDefinition
where
  In: Send + 'static,
  F: FnOnce(Vec<In>) + Send + 'static, {
  let logic = ToArraySinkLogic::<In, F> { values: Vec::new(), callback: Some(callback), completion };
  sink_definition::<In, _>(StageKind::SinkToArray, logic)
}

pub(crate) fn ignore_sink_definition<In>(completion: StreamCompletion<()>) -> SinkDefinition
where
  In: Send + 'static, {
  sink_definition::<In, _>(StageKind::SinkIgnore, IgnoreSinkLogic::<In> { completion, _pd: PhantomData })
}

pub(crate) fn pipe_sink_definition<In, D>(destination: D, completion: StreamCompletion<()>) -> SinkDefinition
where
  In: Send + 'static,
  D: AsyncSink<In> + Unpin + Send + 'static,
  D::Error: Display, {
  let logic = PipeSinkLogic::<In, D> { destination: Some(destination), completion, _pd: PhantomData };
  sink_definition::<In, _>(StageKind::SinkPipe, logic)
}

pub(crate) fn queue_sink_definition<In>(queue: SinkQueue<In>) -> SinkDefinition
where
  In: Send + 'static, {
  sink_definition::<In, _>(StageKind::SinkQueue, QueueSinkLogic::<In> { queue })
}
