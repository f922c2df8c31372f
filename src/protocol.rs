//! The three-party demand protocol every stage obeys.
//!
//! A [`Publisher`] accepts exactly one `subscribe` per subscriber instance and
//! answers it with `on_subscribe` before any element. A [`Subscriber`] then
//! sees zero or more `on_next` calls, closed by exactly one `on_complete` or
//! `on_error`. The [`Subscription`] in between carries cumulative `request`
//! demand and idempotent `cancel`.

/// Degenerate subscription that completes on first request.
mod completed_subscription;
/// Degenerate no-op subscription for rejected subscribers.
mod cancelled_subscription;
/// Degenerate subscription that fails on first request.
mod failed_subscription;
/// Publisher role.
mod publisher;
/// Per-link protocol state machine.
mod stage_state;
/// Subscriber role.
mod subscriber;
/// Subscription role.
mod subscription;
/// Subscription identity.
mod subscription_id;
/// Typed views over dynamically wired endpoints.
mod typed_adapter;

pub use cancelled_subscription::CancelledSubscription;
pub use completed_subscription::CompletedSubscription;
pub use failed_subscription::FailedSubscription;
pub use publisher::{DynPublisher, Publisher, PublisherRef};
pub use stage_state::StageState;
pub use subscriber::{DynSubscriber, Subscriber, SubscriberRef};
pub use subscription::{Subscription, SubscriptionRef};
pub use subscription_id::SubscriptionId;
pub use typed_adapter::{TypedPublisher, TypedSubscriber};

pub(crate) use typed_adapter::ErasingPublisher;
