//! Process-wide unique identifiers for stream ports.

use core::{fmt, sync::atomic::{AtomicU64, Ordering}};

static NEXT_PORT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier shared by inlet and outlet ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(u64);

impl PortId {
  /// Allocates the next unused port identifier.
  #[must_use]
  pub fn next() -> Self {
    Self(NEXT_PORT_ID.fetch_add(1, Ordering::Relaxed))
  }

  /// Returns the raw identifier value.
  #[must_use]
  pub const fn value(&self) -> u64 {
    self.0
  }
}

impl fmt::Display for PortId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "port-{}", self.0)
  }
}
