use super::{Subscription, SubscriptionId};

/// Inert subscription handed to subscribers that will never receive elements,
/// e.g. a second subscriber of a single-subscriber publisher.
pub struct CancelledSubscription {
  id: SubscriptionId,
}

impl CancelledSubscription {
  /// Creates a new inert subscription.
  #[must_use]
  pub fn new() -> Self {
    Self { id: SubscriptionId::next() }
  }
}

impl Default for CancelledSubscription {
  fn default() -> Self {
    Self::new()
  }
}

impl Subscription for CancelledSubscription {
  fn id(&self) -> SubscriptionId {
    self.id
  }

  fn request(&self, _n: u64) {}

  fn cancel(&self) {}
}
