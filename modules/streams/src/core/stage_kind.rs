/// Built-in stage kinds, used to attribute errors and trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
  /// Source that drains an iterator.
  SourceIterator,
  /// Source that emits a single element.
  SourceSingle,
  /// Source that emits nothing.
  SourceEmpty,
  /// Source that calls a generator closure.
  SourceFn,
  /// Source that fails on its first pull.
  SourceFailed,
  /// Source that polls an asynchronous stream.
  SourceAsync,
  /// Source fed by an external emitter.
  SourcePush,
  /// Source that polls a channel receiver.
  SourceChannel,
  /// Flow stage that maps elements.
  FlowMap,
  /// Flow stage that maps elements with a fallible closure.
  FlowTryMap,
  /// Flow stage that keeps elements matching a predicate.
  FlowFilter,
  /// Flow stage that keeps elements matching an asynchronous predicate.
  FlowAsyncFilter,
  /// Flow stage that observes elements.
  FlowTap,
  /// Flow stage that groups elements into fixed-size vectors.
  FlowBatch,
  /// Flow stage that folds elements from a seed.
  FlowReduce,
  /// Flow stage that folds elements using the first as seed.
  FlowReduce1,
  /// Flow stage that folds elements with an asynchronous closure.
  FlowAsyncReduce,
  /// Flow stage that awaits future-valued elements.
  FlowResolve,
  /// Flow stage that passes a bounded number of elements.
  FlowTake,
  /// Flow stage that skips a number of elements.
  FlowDrop,
  /// Flow stage that emits only the final element.
  FlowLast,
  /// Flow stage that expands nested collections.
  FlowFlatten,
  /// Flow stage that maps each element to a collection and expands it.
  FlowFlatMap,
  /// Flow stage that drops `None` elements.
  FlowCompact,
  /// Flow stage that drops repeated keys.
  FlowUniq,
  /// Flow stage that gathers every element into one vector.
  FlowCollect,
  /// Flow stage that groups elements by key.
  FlowGroupBy,
  /// Flow stage that indexes elements by key.
  FlowKeyBy,
  /// Flow stage that sorts all elements.
  FlowSort,
  /// Flow stage that completes early when a predicate holds.
  FlowStopWhen,
  /// Flow stage that passes elements through and defers evaluation.
  FlowMakeAsync,
  /// Sink that gathers every element.
  SinkCollect,
  /// Sink that completes with the first element.
  SinkFirst,
  /// Sink that applies a closure for each element.
  SinkForeach,
  /// Sink that hands all elements to a closure once.
  SinkToArray,
  /// Sink that ignores elements.
  SinkIgnore,
  /// Sink that forwards elements to an external destination.
  SinkPipe,
  /// Sink that queues elements for a pulling consumer.
  SinkQueue,
}

impl StageKind {
  /// Returns `true` for source stages.
  #[must_use]
  pub const fn is_source(&self) -> bool {
    matches!(
      self,
      Self::SourceIterator
        | Self::SourceSingle
        | Self::SourceEmpty
        | Self::SourceFn
        | Self::SourceFailed
        | Self::SourceAsync
        | Self::SourcePush
        | Self::SourceChannel
    )
  }

  /// Returns `true` for sink stages.
  #[must_use]
  pub const fn is_sink(&self) -> bool {
    matches!(
      self,
      Self::SinkCollect
        | Self::SinkFirst
        | Self::SinkForeach
        | Self::SinkToArray
        | Self::SinkIgnore
        | Self::SinkPipe
        | Self::SinkQueue
    )
  }
}
