use std::{
  sync::{mpsc, Arc, Mutex},
  time::Duration,
};

use super::DEFAULT_PROBE_TIMEOUT;
use crate::{
  dyn_value::Element,
  lock::lock_unpoisoned,
  module::{MaterializationContext, StageFactory, StageParts},
  protocol::{DynPublisher, ErasingPublisher, Publisher, PublisherRef, SubscriberRef, Subscription, SubscriptionId},
  stage::Source,
  stream_error::StreamError,
};

#[derive(Debug)]
enum SourceProbeEvent {
  Subscribed(SubscriptionId),
  Requested(SubscriptionId, u64),
  Cancelled(SubscriptionId),
}

struct SourceProbeInner<T> {
  events_tx: mpsc::Sender<SourceProbeEvent>,
  events_rx: Mutex<mpsc::Receiver<SourceProbeEvent>>,
  links:     Mutex<Vec<(SubscriptionId, SubscriberRef<T>)>>,
}

impl<T> SourceProbeInner<T> {
  fn next_event(&self, timeout: Duration, expecting: &str) -> SourceProbeEvent {
    let events = lock_unpoisoned(&self.events_rx);
    match events.recv_timeout(timeout) {
      | Ok(event) => event,
      | Err(_) => panic!("timed out after {timeout:?} waiting for {expecting}"),
    }
  }
}

/// Producer-side probe.
///
/// Acts as a publisher that records every inbound protocol call, tagged with
/// the subscription it arrived on, and sends elements or terminal signals
/// only when the test says so. Several subscribers may attach; each
/// [`expect_subscription`](TestSourceProbe::expect_subscription) returns a
/// handle scoped to one of them.
///
/// Every expectation panics on timeout or on an unexpected signal; probes are
/// test instrumentation, not production stages.
pub struct TestSourceProbe<T> {
  inner:   Arc<SourceProbeInner<T>>,
  timeout: Duration,
}

impl<T: Element> TestSourceProbe<T> {
  /// Creates a probe and the publisher endpoint it drives.
  #[must_use]
  pub fn probe() -> (Self, PublisherRef<T>) {
    let (sender, receiver) = mpsc::channel();
    let inner = Arc::new(SourceProbeInner {
      events_tx: sender,
      events_rx: Mutex::new(receiver),
      links:     Mutex::new(Vec::new()),
    });
    let publisher: PublisherRef<T> = Arc::new(ProbePublisher { inner: inner.clone() });
    (Self { inner, timeout: DEFAULT_PROBE_TIMEOUT }, publisher)
  }

  /// Returns a probe waiting up to `timeout` per expectation.
  #[must_use]
  pub fn within(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Waits until the next subscriber attached and returns the handle scoped
  /// to its subscription.
  ///
  /// # Panics
  ///
  /// Panics on timeout or when another signal arrives first.
  pub fn expect_subscription(&self) -> SourceProbeSubscription<T> {
    match self.inner.next_event(self.timeout, "a subscription") {
      | SourceProbeEvent::Subscribed(id) => {
        let links = lock_unpoisoned(&self.inner.links);
        let subscriber = links
          .iter()
          .find(|(link, _)| *link == id)
          .map(|(_, subscriber)| subscriber.clone());
        drop(links);
        match subscriber {
          | Some(subscriber) => SourceProbeSubscription {
            inner: self.inner.clone(),
            id,
            subscriber,
            timeout: self.timeout,
          },
          | None => panic!("subscription {id} has no recorded subscriber"),
        }
      },
      | other => panic!("expected a subscription, got {other:?}"),
    }
  }

  /// Asserts that no signal arrives within `duration`.
  ///
  /// # Panics
  ///
  /// Panics when any signal arrives in time.
  pub fn expect_silence(&self, duration: Duration) {
    let events = lock_unpoisoned(&self.inner.events_rx);
    if let Ok(event) = events.recv_timeout(duration) {
      panic!("expected silence, got {event:?}");
    }
  }
}

/// Handle over one established link of a [`TestSourceProbe`].
///
/// Expectations read from the probe's shared signal channel; scanning
/// expectations consume the signals they skip.
pub struct SourceProbeSubscription<T> {
  inner:      Arc<SourceProbeInner<T>>,
  id:         SubscriptionId,
  subscriber: SubscriberRef<T>,
  timeout:    Duration,
}

impl<T: Element> SourceProbeSubscription<T> {
  /// Returns the identity of this link.
  #[must_use]
  pub const fn id(&self) -> SubscriptionId {
    self.id
  }

  /// Waits for the next demand signal, asserts it belongs to this link and
  /// returns the requested amount.
  ///
  /// # Panics
  ///
  /// Panics on timeout or when another signal arrives first.
  pub fn expect_request(&self) -> u64 {
    match self.inner.next_event(self.timeout, "a demand request") {
      | SourceProbeEvent::Requested(id, n) if id == self.id => n,
      | other => panic!("expected a demand request on {}, got {other:?}", self.id),
    }
  }

  /// Waits for the next demand signal and asserts it requests exactly `n`
  /// elements on this link.
  ///
  /// # Panics
  ///
  /// Panics on timeout or when the next signal differs.
  pub fn expect_request_of(&self, n: u64) {
    let requested = self.expect_request();
    assert_eq!(requested, n, "expected a request of {n} on {}", self.id);
  }

  /// Waits until this link is cancelled, skipping demand signals and signals
  /// belonging to other links.
  ///
  /// # Panics
  ///
  /// Panics on timeout.
  pub fn expect_cancellation(&self) {
    loop {
      match self.inner.next_event(self.timeout, "a cancellation") {
        | SourceProbeEvent::Cancelled(id) if id == self.id => return,
        | _ => {},
      }
    }
  }

  /// Delivers one element to this link's subscriber.
  pub fn send_next(&self, element: T) {
    self.subscriber.on_next(element);
  }

  /// Completes this link's subscriber.
  pub fn send_complete(&self) {
    self.subscriber.on_complete();
  }

  /// Fails this link's subscriber with `cause`.
  pub fn send_error(&self, cause: StreamError) {
    self.subscriber.on_error(cause);
  }
}

struct ProbePublisher<T> {
  inner: Arc<SourceProbeInner<T>>,
}

impl<T: Element> Publisher<T> for ProbePublisher<T> {
  fn subscribe(&self, subscriber: SubscriberRef<T>) {
    let id = SubscriptionId::next();
    let mut links = lock_unpoisoned(&self.inner.links);
    links.push((id, subscriber.clone()));
    drop(links);
    let _ = self.inner.events_tx.send(SourceProbeEvent::Subscribed(id));
    subscriber.on_subscribe(Arc::new(ProbeSubscriptionSender {
      events: self.inner.events_tx.clone(),
      id,
    }));
  }
}

struct ProbeSubscriptionSender {
  events: mpsc::Sender<SourceProbeEvent>,
  id:     SubscriptionId,
}

impl Subscription for ProbeSubscriptionSender {
  fn id(&self) -> SubscriptionId {
    self.id
  }

  fn request(&self, n: u64) {
    let _ = self.events.send(SourceProbeEvent::Requested(self.id, n));
  }

  fn cancel(&self) {
    let _ = self.events.send(SourceProbeEvent::Cancelled(self.id));
  }
}

/// Source leaf materializing a [`TestSourceProbe`] for its stream.
#[must_use]
pub fn probe_source<T: Element>() -> Source<T, TestSourceProbe<T>> {
  let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
    let (probe, publisher) = TestSourceProbe::<T>::probe();
    let erased: DynPublisher = Arc::new(ErasingPublisher { inner: publisher });
    Ok(StageParts::source(erased, Box::new(probe)))
  });
  Source::from_factory("probe-source", factory)
}
