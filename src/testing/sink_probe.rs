use core::fmt;
use std::{
  sync::{mpsc, Arc, Mutex},
  time::Duration,
};

use super::DEFAULT_PROBE_TIMEOUT;
use crate::{
  dyn_value::Element,
  lock::lock_unpoisoned,
  module::{MaterializationContext, StageFactory, StageParts},
  protocol::{Subscriber, SubscriberRef, SubscriptionRef, TypedSubscriber},
  stage::Sink,
  stream_error::StreamError,
};

enum SinkProbeEvent<T> {
  Subscribed,
  Next(T),
  Completed,
  Errored(StreamError),
}

// Elements are not required to be `Debug`, so the event elides them.
impl<T> fmt::Debug for SinkProbeEvent<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      | Self::Subscribed => write!(f, "Subscribed"),
      | Self::Next(_) => write!(f, "Next(..)"),
      | Self::Completed => write!(f, "Completed"),
      | Self::Errored(cause) => write!(f, "Errored({cause:?})"),
    }
  }
}

struct SinkProbeShared<T> {
  events:       mpsc::Sender<SinkProbeEvent<T>>,
  subscription: Mutex<Option<SubscriptionRef>>,
}

/// Consumer-side probe.
///
/// Acts as a subscriber that records every signal it receives and only
/// requests or cancels when the test says so.
///
/// Every expectation panics on timeout or on an unexpected signal; probes are
/// test instrumentation, not production stages.
pub struct TestSinkProbe<T> {
  shared:  Arc<SinkProbeShared<T>>,
  events:  Mutex<mpsc::Receiver<SinkProbeEvent<T>>>,
  timeout: Duration,
}

impl<T: Element> TestSinkProbe<T> {
  /// Creates a probe and the subscriber endpoint it observes.
  #[must_use]
  pub fn probe() -> (Self, SubscriberRef<T>) {
    let (sender, receiver) = mpsc::channel();
    let shared = Arc::new(SinkProbeShared {
      events:       sender,
      subscription: Mutex::new(None),
    });
    let subscriber: SubscriberRef<T> = Arc::new(ProbeSubscriber { shared: shared.clone() });
    (
      Self {
        shared,
        events: Mutex::new(receiver),
        timeout: DEFAULT_PROBE_TIMEOUT,
      },
      subscriber,
    )
  }

  /// Returns a probe waiting up to `timeout` per expectation.
  #[must_use]
  pub fn within(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  fn next_event(&self, expecting: &str) -> SinkProbeEvent<T> {
    let events = lock_unpoisoned(&self.events);
    match events.recv_timeout(self.timeout) {
      | Ok(event) => event,
      | Err(_) => panic!("timed out after {:?} waiting for {expecting}", self.timeout),
    }
  }

  /// Waits until the probe received its subscription.
  ///
  /// # Panics
  ///
  /// Panics on timeout or when another signal arrives first.
  pub fn expect_subscription(&self) {
    match self.next_event("a subscription") {
      | SinkProbeEvent::Subscribed => {},
      | other => panic!("expected a subscription, got {other:?}"),
    }
  }

  /// Waits for the next element.
  ///
  /// # Panics
  ///
  /// Panics on timeout or when another signal arrives first.
  pub fn expect_next(&self) -> T {
    match self.next_event("an element") {
      | SinkProbeEvent::Next(element) => element,
      | other => panic!("expected an element, got {other:?}"),
    }
  }

  /// Waits for stream completion.
  ///
  /// # Panics
  ///
  /// Panics on timeout or when another signal arrives first.
  pub fn expect_complete(&self) {
    match self.next_event("completion") {
      | SinkProbeEvent::Completed => {},
      | other => panic!("expected completion, got {other:?}"),
    }
  }

  /// Waits for a stream failure and returns its cause.
  ///
  /// # Panics
  ///
  /// Panics on timeout or when another signal arrives first.
  pub fn expect_error(&self) -> StreamError {
    match self.next_event("an error") {
      | SinkProbeEvent::Errored(cause) => cause,
      | other => panic!("expected an error, got {other:?}"),
    }
  }

  /// Asserts that no signal arrives within `duration`.
  ///
  /// # Panics
  ///
  /// Panics when any signal arrives in time.
  pub fn expect_silence(&self, duration: Duration) {
    let events = lock_unpoisoned(&self.events);
    if let Ok(event) = events.recv_timeout(duration) {
      panic!("expected silence, got {event:?}");
    }
  }

  fn subscription(&self) -> SubscriptionRef {
    let subscription = lock_unpoisoned(&self.shared.subscription);
    match subscription.clone() {
      | Some(subscription) => subscription,
      | None => panic!("the sink probe has not been subscribed"),
    }
  }

  /// Signals `n` units of demand upstream.
  ///
  /// # Panics
  ///
  /// Panics when the probe has not been subscribed.
  pub fn request(&self, n: u64) {
    self.subscription().request(n);
  }

  /// Cancels the upstream.
  ///
  /// # Panics
  ///
  /// Panics when the probe has not been subscribed.
  pub fn cancel(&self) {
    self.subscription().cancel();
  }
}

struct ProbeSubscriber<T> {
  shared: Arc<SinkProbeShared<T>>,
}

impl<T: Element> Subscriber<T> for ProbeSubscriber<T> {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    let mut slot = lock_unpoisoned(&self.shared.subscription);
    *slot = Some(subscription);
    drop(slot);
    let _ = self.shared.events.send(SinkProbeEvent::Subscribed);
  }

  fn on_next(&self, element: T) {
    let _ = self.shared.events.send(SinkProbeEvent::Next(element));
  }

  fn on_complete(&self) {
    let _ = self.shared.events.send(SinkProbeEvent::Completed);
  }

  fn on_error(&self, cause: StreamError) {
    let _ = self.shared.events.send(SinkProbeEvent::Errored(cause));
  }
}

/// Sink leaf materializing a [`TestSinkProbe`] for its stream.
#[must_use]
pub fn probe_sink<T: Element>() -> Sink<T, TestSinkProbe<T>> {
  let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
    let (probe, subscriber) = TestSinkProbe::<T>::probe();
    Ok(StageParts::sink(Arc::new(TypedSubscriber::new(subscriber)), Box::new(probe)))
  });
  Sink::from_factory("probe-sink", factory)
}
