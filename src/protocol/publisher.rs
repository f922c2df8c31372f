use std::sync::Arc;

use super::SubscriberRef;
use crate::dyn_value::DynValue;

/// Producer role of the demand protocol.
///
/// A publisher accepts one `subscribe` call per subscriber instance and must
/// issue `on_subscribe` to the subscriber before delivering anything else.
pub trait Publisher<T>: Send + Sync {
  /// Establishes a link with `subscriber`.
  fn subscribe(&self, subscriber: SubscriberRef<T>);
}

/// Shared typed publisher handle.
pub type PublisherRef<T> = Arc<dyn Publisher<T>>;

/// Shared publisher handle at the dynamic graph layer.
pub type DynPublisher = PublisherRef<DynValue>;
