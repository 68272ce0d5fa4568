//! Demand granted to the sink by its consumer.


/// Counts the elements the sink may still receive.
///
/// Collecting sinks switch to unbounded demand on start; pull-based consumers and `pipe`
/// destinations grant one element at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DemandTracker {
  remaining: u64,
  unbounded: bool,
}

impl DemandTracker {
  pub(crate) const fn new() -> Self {
    Self { remaining: 0, unbounded: false }
  }

  pub(crate) const fn has_demand(&self) -> bool {
    self.unbounded || self.remaining > 0
  }

  /// Bounded demand still outstanding, `None` once unbounded.
  pub(crate) const fn remaining(&self) -> Option<u64> {
    if self.unbounded { None } else { Some(self.remaining) }
  }

  // Overflow promotes to unbounded demand.
  pub(crate) const fn request(&mut self, amount: u64) {
    match self.remaining.checked_add(amount) {
      | Some(total) => self.remaining = total,
      | None => self.unbounded = true,
    }
  }

  pub(crate) const fn request_unbounded(&mut self) {
    self.unbounded = true;
  }

  #[must_use]
  pub(crate) const fn consume_one(&mut self) -> bool {
    if self.unbounded {
      return true;
    }
    if self.remaining == 0 {
      return false;
    }
    self.remaining -= 1;
    true
  }
}
