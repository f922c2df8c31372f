use std::sync::atomic::{AtomicBool, Ordering};

use super::{SubscriberRef, Subscription, SubscriptionId};

/// Subscription of the always-completed producer.
///
/// The first `request` immediately signals `on_complete` and nothing else,
/// regardless of the requested amount; `cancel` is a no-op.
pub struct CompletedSubscription<T> {
  id:         SubscriptionId,
  subscriber: SubscriberRef<T>,
  fired:      AtomicBool,
}

impl<T> CompletedSubscription<T> {
  /// Creates a subscription bound to `subscriber`.
  #[must_use]
  pub fn new(subscriber: SubscriberRef<T>) -> Self {
    Self { id: SubscriptionId::next(), subscriber, fired: AtomicBool::new(false) }
  }
}

impl<T: Send + Sync> Subscription for CompletedSubscription<T> {
  fn id(&self) -> SubscriptionId {
    self.id
  }

  fn request(&self, _n: u64) {
    if !self.fired.swap(true, Ordering::AcqRel) {
      self.subscriber.on_complete();
    }
  }

  fn cancel(&self) {}
}
