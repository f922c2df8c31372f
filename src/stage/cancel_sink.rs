use std::sync::Mutex;

use crate::{
  dyn_value::DynValue,
  lock::lock_unpoisoned,
  protocol::{StageState, Subscriber, SubscriptionRef},
  stream_error::StreamError,
};

/// Cancels its upstream during the handshake, before requesting anything.
pub(crate) struct CancelSink {
  state: Mutex<StageState>,
}

impl CancelSink {
  pub(crate) fn new() -> Self {
    Self { state: Mutex::new(StageState::new()) }
  }
}

impl Subscriber<DynValue> for CancelSink {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    let mut state = lock_unpoisoned(&self.state);
    let _ = state.on_subscribe();
    let _ = state.cancel();
    drop(state);
    subscription.cancel();
  }

  fn on_next(&self, _element: DynValue) {
    // in-flight elements racing the cancellation are dropped
  }

  fn on_complete(&self) {}

  fn on_error(&self, _cause: StreamError) {}
}
