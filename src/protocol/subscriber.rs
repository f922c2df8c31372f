use std::sync::Arc;

use super::SubscriptionRef;
use crate::{dyn_value::DynValue, stream_error::StreamError};

/// Consumer role of the demand protocol.
///
/// Calls arrive in protocol order for one link: `on_subscribe` first, then
/// zero or more `on_next`, closed by exactly one `on_complete` or `on_error`.
/// Implementations use interior mutability; the materializer and publishers
/// share subscribers behind `Arc`s.
pub trait Subscriber<T>: Send + Sync {
  /// Hands over the subscription created by the `subscribe` handshake.
  fn on_subscribe(&self, subscription: SubscriptionRef);

  /// Delivers one element. Never called beyond the outstanding demand.
  fn on_next(&self, element: T);

  /// Signals successful completion of the link.
  fn on_complete(&self);

  /// Signals failure of the link with the recorded cause.
  fn on_error(&self, cause: StreamError);
}

/// Shared typed subscriber handle.
pub type SubscriberRef<T> = Arc<dyn Subscriber<T>>;

/// Shared subscriber handle at the dynamic graph layer.
pub type DynSubscriber = SubscriberRef<DynValue>;
