use std::sync::Mutex;

use crate::{
  dyn_value::{downcast_value, DynValue, Element},
  lock::lock_unpoisoned,
  protocol::{StageState, Subscriber, SubscriptionRef},
  stream_completion::StreamCompletion,
  stream_error::StreamError,
};

struct HeadState {
  stage:        StageState,
  subscription: Option<SubscriptionRef>,
}

/// Requests exactly one element, resolves its completion with it and cancels
/// the rest of the stream.
///
/// Completing without an element resolves the completion with
/// [`StreamError::NoElement`].
pub(crate) struct HeadSink<T> {
  inner:      Mutex<HeadState>,
  completion: StreamCompletion<T>,
}

impl<T: Element> HeadSink<T> {
  pub(crate) fn new(completion: StreamCompletion<T>) -> Self {
    Self {
      inner: Mutex::new(HeadState {
        stage:        StageState::new(),
        subscription: None,
      }),
      completion,
    }
  }

  fn abort(&self, subscription: Option<SubscriptionRef>, cause: StreamError) {
    tracing::error!(error = %cause, "head sink aborted");
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
    self.completion.complete(Err(cause));
  }
}

impl<T: Element> Subscriber<DynValue> for HeadSink<T> {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    let mut inner = lock_unpoisoned(&self.inner);
    match inner.stage.on_subscribe() {
      | Ok(()) => {
        inner.subscription = Some(subscription.clone());
        drop(inner);
        subscription.request(1);
      },
      | Err(cause) => {
        drop(inner);
        self.abort(Some(subscription), cause);
      },
    }
  }

  fn on_next(&self, element: DynValue) {
    let mut inner = lock_unpoisoned(&self.inner);
    match inner.stage.on_element() {
      | Ok(true) => {
        let _ = inner.stage.cancel();
        let subscription = inner.subscription.take();
        drop(inner);
        self.completion.complete(downcast_value::<T>(element));
        if let Some(subscription) = subscription {
          subscription.cancel();
        }
      },
      | Ok(false) => {},
      | Err(cause) => {
        let subscription = inner.subscription.take();
        drop(inner);
        self.abort(subscription, cause);
      },
    }
  }

  fn on_complete(&self) {
    let mut inner = lock_unpoisoned(&self.inner);
    match inner.stage.on_complete() {
      | Ok(true) => {
        inner.subscription = None;
        drop(inner);
        self.completion.complete(Err(StreamError::NoElement));
      },
      | Ok(false) => {},
      | Err(cause) => {
        let subscription = inner.subscription.take();
        drop(inner);
        self.abort(subscription, cause);
      },
    }
  }

  fn on_error(&self, cause: StreamError) {
    let mut inner = lock_unpoisoned(&self.inner);
    match inner.stage.on_error() {
      | Ok(true) => {
        inner.subscription = None;
        drop(inner);
        self.completion.complete(Err(cause));
      },
      | Ok(false) => {},
      | Err(violation) => {
        let subscription = inner.subscription.take();
        drop(inner);
        self.abort(subscription, violation);
      },
    }
  }
}
