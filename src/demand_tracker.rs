//! Cumulative demand accounting for one producer-consumer link.


use crate::{demand::Demand, stream_error::StreamError};

/// Tracks the net outstanding demand a consumer has signalled.
#[derive(Debug, Clone)]
pub struct DemandTracker {
  current: Demand,
}

impl DemandTracker {
  /// Creates a new demand tracker with zero demand.
  #[must_use]
  pub const fn new() -> Self {
    Self { current: Demand::none() }
  }

  /// Returns the current demand value.
  #[must_use]
  pub const fn current(&self) -> Demand {
    self.current
  }

  /// Returns the outstanding demand clamped into a `u64`.
  ///
  /// Unbounded demand is reported as `u64::MAX`.
  #[must_use]
  pub const fn outstanding(&self) -> u64 {
    self.current.outstanding()
  }

  /// Adds demand to the tracker.
  ///
  /// Demand is cumulative; overflow saturates to unbounded.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::InvalidDemand` when `amount` is zero.
  pub const fn request(&mut self, amount: u64) -> Result<Demand, StreamError> {
    if amount == 0 {
      return Err(StreamError::InvalidDemand);
    }

    self.current = self.current.saturating_add(amount);
    Ok(self.current)
  }

  /// Consumes a single unit of demand when available.
  #[must_use]
  pub const fn consume_one(&mut self) -> bool {
    match self.current.checked_decrement() {
      | Some(next) => {
        self.current = next;
        true
      },
      | None => false,
    }
  }
}

impl Default for DemandTracker {
  fn default() -> Self {
    Self::new()
  }
}
