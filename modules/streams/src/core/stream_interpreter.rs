use alloc::vec::Vec;
use core::task::{Context, Poll};


use super::{
  DemandTracker, DynValue, ErrorPolicy, FlowDefinition, SinkDecision, SinkDefinition, SourceDefinition,
  StageKind, StreamBuffer, StreamConfig, StreamControl, StreamError, StreamErrors, StreamPlan, StreamState,
  stream_control::ControlSignal,
};

const TRACE_TARGET: &str = "exstream::stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriveOutcome {
  Progressed,
  Idle,
}

struct FlowRuntime {
  definition: FlowDefinition,
  finished:   bool,
}

/// Executes a linear stream plan: one source, its flows and a sink.
///
/// Each drive pass pulls from the source only while the sink has demand and the first edge has
/// room, moves elements through the flows in order and pushes to the sink while demand remains.
/// Asynchronous stages register the caller's waker and report no progress until woken.
pub(crate) struct StreamInterpreter {
  source:          SourceDefinition,
  flows:           Vec<FlowRuntime>,
  edges:           Vec<StreamBuffer<DynValue>>,
  sink:            SinkDefinition,
  demand:          DemandTracker,
  state:           StreamState,
  policy:          ErrorPolicy,
  control:         StreamControl,
  errors:          StreamErrors,
  asynchronous:    bool,
  source_done:     bool,
  source_canceled: bool,
  end_observed:    bool,
  pulled:          u64,
}

impl StreamInterpreter {
  /// Wires `plan` to `sink`.
  ///
  /// # Errors
  ///
  /// Returns [`StreamError::TypeMismatch`] when adjacent stages disagree on the element type.
  pub(crate) fn new(
    plan: StreamPlan,
    sink: SinkDefinition,
    config: StreamConfig,
    control: StreamControl,
    errors: StreamErrors,
  ) -> Result<Self, StreamError> {
    Self::validate(&plan, &sink)?;
    let asynchronous = plan.is_asynchronous();
    let StreamPlan { source, flows } = plan;
    let edges = (0..=flows.len()).map(|_| StreamBuffer::new(config.buffer())).collect();
    Ok(Self {
      source,
      flows: flows.into_iter().map(|definition| FlowRuntime { definition, finished: false }).collect(),
      edges,
      sink,
      demand: DemandTracker::new(),
      state: StreamState::Idle,
      policy: config.error_policy(),
      control,
      errors,
      asynchronous,
      source_done: false,
      source_canceled: false,
      end_observed: false,
      pulled: 0,
    })
  }

  fn validate(plan: &StreamPlan, sink: &SinkDefinition) -> Result<(), StreamError> {
    let mut upstream = plan.source.output_type;
    for flow in &plan.flows {
      if flow.input_type != upstream {
        return Err(StreamError::TypeMismatch);
      }
      upstream = flow.output_type;
    }
    if sink.input_type != plan.output_type() {
      return Err(StreamError::TypeMismatch);
    }
    Ok(())
  }

  /// Starts the interpreter and lets the sink declare its initial demand.
  ///
  /// # Errors
  ///
  /// Returns [`StreamError`] when the sink cannot start.
  pub(crate) fn start(&mut self) -> Result<(), StreamError> {
    if self.state != StreamState::Idle {
      return Ok(());
    }
    self.state = StreamState::Running;
    self.sink.logic.on_start(&mut self.demand)?;
    if self.flows.iter_mut().any(|flow| flow.definition.logic.take_shutdown_request()) {
      self.request_shutdown();
    }
    tracing::debug!(
      target: TRACE_TARGET,
      source = ?self.source.kind,
      flows = self.flows.len(),
      sink = ?self.sink.kind,
      asynchronous = self.asynchronous,
      demand = ?self.demand.remaining(),
      "stream started"
    );
    Ok(())
  }

  /// Returns the current stream state.
  pub(crate) const fn state(&self) -> StreamState {
    self.state
  }

  /// Grants the sink additional demand on behalf of a pulling consumer.
  pub(crate) const fn request_demand(&mut self, amount: u64) {
    self.demand.request(amount);
  }

  /// Returns `true` while the sink may accept at least one more element.
  pub(crate) const fn has_demand(&self) -> bool {
    self.demand.has_demand()
  }

  /// Drives until the stream reaches a terminal state or no stage can make progress.
  ///
  /// Returns `Poll::Pending` when the interpreter is waiting on a waker registered with `cx`, on
  /// demand, or on a paused control handle.
  pub(crate) fn poll_run(&mut self, cx: &mut Context<'_>) -> Poll<()> {
    if self.state == StreamState::Idle
      && let Err(error) = self.start()
    {
      self.fail(error);
    }
    loop {
      let outcome = self.drive(cx);
      if self.state.is_terminal() {
        return Poll::Ready(());
      }
      if outcome == DriveOutcome::Idle {
        return Poll::Pending;
      }
    }
  }

  fn drive(&mut self, cx: &mut Context<'_>) -> DriveOutcome {
    if self.state != StreamState::Running {
      return DriveOutcome::Idle;
    }

    match self.control.poll_signal(cx) {
      | ControlSignal::Destroy => {
        self.destroy();
        return DriveOutcome::Progressed;
      },
      | ControlSignal::Pause => return DriveOutcome::Idle,
      | ControlSignal::End if !self.end_observed => {
        self.end_observed = true;
        self.request_shutdown();
      },
      | ControlSignal::End | ControlSignal::Run => {},
    }

    match self.step(cx) {
      | Ok(true) => DriveOutcome::Progressed,
      | Ok(false) => DriveOutcome::Idle,
      | Err(error) => {
        self.fail(error);
        DriveOutcome::Progressed
      },
    }
  }

  fn step(&mut self, cx: &mut Context<'_>) -> Result<bool, StreamError> {
    let mut progressed = false;

    if !self.demand.has_demand() && !self.all_finished() {
      match self.sink.logic.poll_ready(cx, &mut self.demand) {
        | Poll::Ready(Ok(())) => {},
        | Poll::Ready(Err(error)) => return Err(error),
        | Poll::Pending => {},
      }
    }

    if self.demand.has_demand() && self.pull_source_if_needed(cx)? {
      progressed = true;
    }

    while self.drive_flow_stages_once(cx)? {
      progressed = true;
    }

    while self.drive_sink_once()? {
      progressed = true;
    }

    if self.control.is_halted() {
      return Ok(progressed);
    }

    if self.all_finished() {
      match self.sink.logic.poll_complete(cx) {
        | Poll::Ready(Ok(())) => {
          self.state = StreamState::Completed;
          tracing::debug!(target: TRACE_TARGET, pulled = self.pulled, "stream completed");
          progressed = true;
        },
        | Poll::Ready(Err(error)) => return Err(error),
        | Poll::Pending => {},
      }
    }

    Ok(progressed)
  }

  fn all_finished(&self) -> bool {
    self.source_done
      && self.flows.iter().all(|flow| flow.finished)
      && self.edges.iter().all(StreamBuffer::is_empty)
  }

  fn pull_source_if_needed(&mut self, cx: &mut Context<'_>) -> Result<bool, StreamError> {
    if self.source_done || self.control.is_halted() {
      return Ok(false);
    }
    if !self.edges[0].has_room() {
      return Ok(false);
    }
    match self.source.logic.poll_pull(cx) {
      | Poll::Pending => Ok(false),
      | Poll::Ready(Ok(Some(value))) => {
        self.pulled = self.pulled.saturating_add(1);
        self.edges[0].offer(value);
        Ok(true)
      },
      | Poll::Ready(Ok(None)) => {
        self.source_done = true;
        self.source_canceled = true;
        tracing::trace!(target: TRACE_TARGET, pulled = self.pulled, "source exhausted");
        Ok(true)
      },
      | Poll::Ready(Err(error)) => {
        self.handle_failure(self.source.kind, error)?;
        Ok(true)
      },
    }
  }

  fn drive_flow_stages_once(&mut self, cx: &mut Context<'_>) -> Result<bool, StreamError> {
    if self.control.is_halted() {
      return Ok(false);
    }
    let mut progressed = false;
    let mut upstream_finished = self.source_done;

    for index in 0..self.flows.len() {
      let outgoing = index + 1;
      if !self.edges[outgoing].has_room() {
        upstream_finished = false;
        continue;
      }

      let accepts = self.flows[index].definition.logic.can_accept_input();
      if accepts && let Some(input) = self.edges[index].poll() {
        let result = self.flows[index].definition.logic.apply(input);
        self.route_flow_outputs(index, result)?;
        progressed = true;
      }

      let drained = self.flows[index].definition.logic.poll_drain(cx);
      if self.route_flow_outputs(index, drained)? {
        progressed = true;
      }

      if self.flows[index].definition.logic.take_shutdown_request() {
        tracing::trace!(target: TRACE_TARGET, stage = ?self.flows[index].definition.kind, "stage requested shutdown");
        self.request_shutdown();
        upstream_finished = self.source_done;
        progressed = true;
      }

      let flow = &mut self.flows[index];
      if upstream_finished && !flow.finished && self.edges[index].is_empty() && !flow.definition.logic.has_in_flight() {
        flow.finished = true;
        let result = flow.definition.logic.on_upstream_finish();
        self.route_flow_outputs(index, result)?;
        progressed = true;
      }
      upstream_finished = self.flows[index].finished;
    }

    Ok(progressed)
  }

  // Returns whether any output was buffered or an error was absorbed.
  fn route_flow_outputs(&mut self, index: usize, result: Result<Vec<DynValue>, StreamError>) -> Result<bool, StreamError> {
    match result {
      | Ok(outputs) if outputs.is_empty() => Ok(false),
      | Ok(outputs) => {
        self.edges[index + 1].offer_all(outputs);
        Ok(true)
      },
      | Err(error) => {
        self.handle_failure(self.flows[index].definition.kind, error)?;
        Ok(true)
      },
    }
  }

  fn drive_sink_once(&mut self) -> Result<bool, StreamError> {
    if self.state != StreamState::Running || self.control.is_halted() || !self.demand.has_demand() {
      return Ok(false);
    }
    let Some(value) = self.edges.last_mut().and_then(StreamBuffer::poll) else {
      return Ok(false);
    };
    if !self.demand.consume_one() {
      return Ok(false);
    }
    match self.sink.logic.on_push(value, &mut self.demand)? {
      | SinkDecision::Continue => {},
      | SinkDecision::Complete => {
        tracing::trace!(target: TRACE_TARGET, sink = ?self.sink.kind, "sink satisfied");
        self.request_shutdown();
        self.edges.iter_mut().for_each(StreamBuffer::clear);
        self.flows.iter_mut().for_each(|flow| flow.finished = true);
      },
    }
    Ok(true)
  }

  fn handle_failure(&mut self, stage: StageKind, error: StreamError) -> Result<(), StreamError> {
    match self.policy {
      | ErrorPolicy::Stop => Err(error),
      | ErrorPolicy::Continue => {
        tracing::warn!(target: TRACE_TARGET, stage = ?stage, %error, "stream error skipped");
        self.errors.record(error);
        Ok(())
      },
    }
  }

  fn request_shutdown(&mut self) {
    if self.source_done {
      return;
    }
    tracing::debug!(target: TRACE_TARGET, pulled = self.pulled, "stream stopped pulling");
    self.source_done = true;
    self.cancel_source();
  }

  fn cancel_source(&mut self) {
    if self.source_canceled {
      return;
    }
    self.source.logic.on_cancel();
    self.source_canceled = true;
  }

  fn release(&mut self) {
    self.source_done = true;
    self.cancel_source();
    self.edges.iter_mut().for_each(StreamBuffer::clear);
    self.flows.clear();
  }

  fn fail(&mut self, error: StreamError) {
    if self.state.is_terminal() {
      return;
    }
    tracing::warn!(target: TRACE_TARGET, %error, "stream failed");
    self.state = StreamState::Failed;
    self.errors.record(error.clone());
    self.release();
    self.sink.logic.on_error(error);
  }

  fn destroy(&mut self) {
    if self.state.is_terminal() {
      return;
    }
    tracing::debug!(target: TRACE_TARGET, pulled = self.pulled, "stream destroyed");
    self.state = StreamState::Destroyed;
    self.release();
    self.sink.logic.on_error(StreamError::Destroyed);
  }
}
