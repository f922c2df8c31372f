use std::sync::Arc;

use super::SubscriptionId;

/// Live handle through which a subscriber signals demand and cancellation.
///
/// `request` is cumulative: each call adds to the net outstanding demand.
/// `cancel` is idempotent and final; elements already in flight may still
/// arrive afterwards and must be tolerated by the subscriber.
pub trait Subscription: Send + Sync {
  /// Returns the identity of this link.
  fn id(&self) -> SubscriptionId;

  /// Signals willingness to receive up to `n` more elements.
  ///
  /// `n` must be positive; implementations treat zero as a protocol
  /// violation and fail the link instead of delivering elements.
  fn request(&self, n: u64);

  /// Stops the flow of elements. Safe to call more than once.
  fn cancel(&self);
}

/// Shared subscription handle.
pub type SubscriptionRef = Arc<dyn Subscription>;
