//! Typed views over dynamically wired protocol endpoints.


use std::sync::Arc;

use super::{DynPublisher, Publisher, Subscriber, SubscriberRef, SubscriptionRef};
use crate::{
  dyn_value::{downcast_value, dyn_value, DynValue, Element},
  stream_error::StreamError,
};

/// Presents a dynamic publisher as a typed one.
///
/// Elements flowing to attached subscribers are downcast at the boundary; an
/// element of the wrong type fails the affected link.
pub struct TypedPublisher<T> {
  inner: DynPublisher,
  _pd:   core::marker::PhantomData<fn() -> T>,
}

impl<T> TypedPublisher<T> {
  /// Wraps a dynamic publisher endpoint.
  #[must_use]
  pub fn new(inner: DynPublisher) -> Self {
    Self { inner, _pd: core::marker::PhantomData }
  }
}

impl<T: Element> Publisher<T> for TypedPublisher<T> {
  fn subscribe(&self, subscriber: SubscriberRef<T>) {
    self.inner.subscribe(Arc::new(TypedSubscriber::new(subscriber)));
  }
}

/// Presents a typed subscriber as a dynamic one.
pub struct TypedSubscriber<T> {
  inner: SubscriberRef<T>,
}

impl<T> TypedSubscriber<T> {
  /// Wraps a typed subscriber endpoint.
  #[must_use]
  pub fn new(inner: SubscriberRef<T>) -> Self {
    Self { inner }
  }
}

impl<T: Element> Subscriber<DynValue> for TypedSubscriber<T> {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    self.inner.on_subscribe(subscription);
  }

  fn on_next(&self, element: DynValue) {
    match downcast_value::<T>(element) {
      | Ok(value) => self.inner.on_next(value),
      | Err(cause) => {
        tracing::error!(error = %cause, "dropping element of unexpected type");
        self.inner.on_error(cause);
      },
    }
  }

  fn on_complete(&self) {
    self.inner.on_complete();
  }

  fn on_error(&self, cause: StreamError) {
    self.inner.on_error(cause);
  }
}

/// Presents a typed publisher to the dynamic layer.
pub(crate) struct ErasingPublisher<T> {
  pub(crate) inner: super::PublisherRef<T>,
}

impl<T: Element> Publisher<DynValue> for ErasingPublisher<T> {
  fn subscribe(&self, subscriber: super::DynSubscriber) {
    self.inner.subscribe(Arc::new(ErasingSubscriber { inner: subscriber }));
  }
}

/// Presents a typed publisher element stream to the dynamic layer.
pub(crate) struct ErasingSubscriber {
  pub(crate) inner: super::DynSubscriber,
}

impl<T: Element> Subscriber<T> for ErasingSubscriber {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    self.inner.on_subscribe(subscription);
  }

  fn on_next(&self, element: T) {
    self.inner.on_next(dyn_value(element));
  }

  fn on_complete(&self) {
    self.inner.on_complete();
  }

  fn on_error(&self, cause: StreamError) {
    self.inner.on_error(cause);
  }
}
