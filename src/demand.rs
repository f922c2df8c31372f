/// Net demand outstanding on one producer-consumer link.
///
/// Demand accumulates across `request` calls and never wraps: a running total
/// past `u64::MAX` collapses into [`Demand::Unbounded`], after which the link
/// never runs dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
  /// At most this many elements may still be delivered.
  Finite(u64),
  /// Demand accumulated past `u64::MAX`.
  Unbounded,
}

impl Demand {
  /// Demand of a link nothing has been requested on yet.
  #[must_use]
  pub const fn none() -> Self {
    Self::Finite(0)
  }

  /// Returns `true` once demand has saturated.
  #[must_use]
  pub const fn is_unbounded(&self) -> bool {
    matches!(self, Self::Unbounded)
  }

  /// Returns the outstanding amount clamped into a `u64`.
  #[must_use]
  pub const fn outstanding(&self) -> u64 {
    match self {
      | Self::Finite(value) => *value,
      | Self::Unbounded => u64::MAX,
    }
  }

  /// Accumulates `amount` more demand, saturating to unbounded.
  #[must_use]
  pub const fn saturating_add(self, amount: u64) -> Self {
    match self {
      | Self::Unbounded => Self::Unbounded,
      | Self::Finite(current) => match current.checked_add(amount) {
        | Some(total) => Self::Finite(total),
        | None => Self::Unbounded,
      },
    }
  }

  /// Spends one unit of demand, or returns `None` when none is outstanding.
  #[must_use]
  pub const fn checked_decrement(self) -> Option<Self> {
    match self {
      | Self::Unbounded => Some(Self::Unbounded),
      | Self::Finite(0) => None,
      | Self::Finite(value) => Some(Self::Finite(value - 1)),
    }
  }
}
