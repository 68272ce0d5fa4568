/// Demand tracking utilities.
mod demand_tracker;
/// Error policy selection.
mod error_policy;
/// Immediate-or-deferred evaluation results.
mod evaluation;
/// Flow stage logics.
mod flow;
/// Reusable detached stage chains.
mod pipeline;
/// Sink stage logics.
mod sink;
/// Shared element queue for pull-based consumption.
mod sink_queue;
/// Source stage logics.
mod source;
/// Built-in stage kinds.
mod stage_kind;
/// Lazy stream builder.
mod stream;
/// Stream buffer implementation.
mod stream_buffer;
/// Stream buffer configuration.
mod stream_buffer_config;
/// Stream completion handle.
mod stream_completion;
/// Stream configuration.
mod stream_config;
/// Pause/resume/end/destroy handle.
mod stream_control;
/// Builder argument errors.
mod stream_dsl_error;
/// Stream error definitions.
mod stream_error;
/// Recorded error collection.
mod stream_errors;
/// Deferred consumption future.
mod stream_future;
/// Stream interpreter runtime.
mod stream_interpreter;
/// Async iterator over stream outputs.
mod stream_iter;
/// Stream state enum.
mod stream_state;
/// Sync iterator over stream outputs.
mod sync_iter;

use alloc::{boxed::Box, vec::Vec};
use core::{
  any::{Any, TypeId},
  task::{Context, Poll},
};

pub use error_policy::ErrorPolicy;
pub use evaluation::Evaluation;
pub use pipeline::Pipeline;
pub use stage_kind::StageKind;
pub use stream::Stream;
pub use stream_buffer_config::StreamBufferConfig;
pub use stream_config::StreamConfig;
pub use stream_control::StreamControl;
pub use stream_dsl_error::StreamDslError;
pub use stream_error::StreamError;
pub use stream_errors::StreamErrors;
pub use stream_future::StreamFuture;
pub use stream_iter::StreamIter;
pub use stream_state::StreamState;
pub use sync_iter::SyncIter;

pub(crate) use demand_tracker::DemandTracker;
pub(crate) use stream_buffer::StreamBuffer;
pub(crate) use stream_completion::StreamCompletion;

/// Grouped outputs produced by [`Stream::group_by`].
pub type Groups<K, T> = hashbrown::HashMap<K, Vec<T>, ahash::RandomState>;

/// Keyed outputs produced by [`Stream::key_by`].
pub type Keyed<K, T> = hashbrown::HashMap<K, T, ahash::RandomState>;

pub(crate) type DynValue = Box<dyn Any + Send + 'static>;

pub(crate) struct SourceDefinition {
  kind:         StageKind,
  output_type:  TypeId,
  asynchronous: bool,
  logic:        Box<dyn SourceLogic>,
}

pub(crate) struct FlowDefinition {
  kind:         StageKind,
  input_type:   TypeId,
  output_type:  TypeId,
  asynchronous: bool,
  logic:        Box<dyn FlowLogic>,
}

pub(crate) struct SinkDefinition {
  kind:       StageKind,
  input_type: TypeId,
  logic:      Box<dyn SinkLogic>,
}

/// Evaluation-ready immutable blueprint.
///
/// The plan owns the stage definitions only. Edge buffers and demand are created by the
/// interpreter when the plan is run.
pub(crate) struct StreamPlan {
  source: SourceDefinition,
  flows:  Vec<FlowDefinition>,
}

impl StreamPlan {
  const fn from_source(source: SourceDefinition) -> Self {
    Self { source, flows: Vec::new() }
  }

  fn push_flow(&mut self, flow: FlowDefinition) {
    self.flows.push(flow);
  }

  fn is_asynchronous(&self) -> bool {
    self.source.asynchronous || self.flows.iter().any(|flow| flow.asynchronous)
  }

  fn output_type(&self) -> TypeId {
    self.flows.last().map_or(self.source.output_type, |flow| flow.output_type)
  }
}

pub(crate) trait SourceLogic: Send {
  fn poll_pull(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<DynValue>, StreamError>>;

  fn on_cancel(&mut self) {}
}

pub(crate) trait FlowLogic: Send {
  fn apply(&mut self, input: DynValue) -> Result<Vec<DynValue>, StreamError>;

  fn can_accept_input(&self) -> bool {
    true
  }

  fn poll_drain(&mut self, cx: &mut Context<'_>) -> Result<Vec<DynValue>, StreamError> {
    let _ = cx;
    Ok(Vec::new())
  }

  fn has_in_flight(&self) -> bool {
    false
  }

  fn on_upstream_finish(&mut self) -> Result<Vec<DynValue>, StreamError> {
    Ok(Vec::new())
  }

  fn take_shutdown_request(&mut self) -> bool {
    false
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SinkDecision {
  Continue,
  Complete,
}

pub(crate) trait SinkLogic: Send {
  fn on_start(&mut self, demand: &mut DemandTracker) -> Result<(), StreamError>;

  fn poll_ready(&mut self, cx: &mut Context<'_>, demand: &mut DemandTracker) -> Poll<Result<(), StreamError>> {
    let _ = (cx, demand);
    Poll::Ready(Ok(()))
  }

  fn on_push(&mut self, input: DynValue, demand: &mut DemandTracker) -> Result<SinkDecision, StreamError>;

  fn poll_complete(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), StreamError>>;

  fn on_error(&mut self, error: StreamError);
}

pub(crate) fn downcast_value<In>(value: DynValue) -> Result<In, StreamError>
where
  In: Any + Send + 'static, {
  match value.downcast::<In>() {
    | Ok(value) => Ok(*value),
    | Err(_) => Err(StreamError::TypeMismatch),
  }
}
