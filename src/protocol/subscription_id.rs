use core::{fmt, sync::atomic::{AtomicU64, Ordering}};

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one established producer-consumer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
  /// Allocates the next unused subscription identifier.
  #[must_use]
  pub fn next() -> Self {
    Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
  }

  /// Returns the raw identifier value.
  #[must_use]
  pub const fn value(&self) -> u64 {
    self.0
  }
}

impl fmt::Display for SubscriptionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "subscription-{}", self.0)
  }
}
