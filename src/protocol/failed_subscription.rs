use std::sync::atomic::{AtomicBool, Ordering};

use super::{SubscriberRef, Subscription, SubscriptionId};
use crate::stream_error::StreamError;

/// Subscription of the always-failed producer.
///
/// The first `request` immediately signals `on_error` with the cause captured
/// at construction; `cancel` is a no-op.
pub struct FailedSubscription<T> {
  id:         SubscriptionId,
  subscriber: SubscriberRef<T>,
  cause:      StreamError,
  fired:      AtomicBool,
}

impl<T> FailedSubscription<T> {
  /// Creates a subscription bound to `subscriber` carrying `cause`.
  #[must_use]
  pub fn new(subscriber: SubscriberRef<T>, cause: StreamError) -> Self {
    Self { id: SubscriptionId::next(), subscriber, cause, fired: AtomicBool::new(false) }
  }
}

impl<T: Send + Sync> Subscription for FailedSubscription<T> {
  fn id(&self) -> SubscriptionId {
    self.id
  }

  fn request(&self, _n: u64) {
    if !self.fired.swap(true, Ordering::AcqRel) {
      self.subscriber.on_error(self.cause.clone());
    }
  }

  fn cancel(&self) {}
}
