use std::sync::Mutex;

use crate::{
  dyn_value::DynValue,
  lock::lock_unpoisoned,
  protocol::{StageState, Subscriber, SubscriptionRef},
  stream_completion::StreamCompletion,
  stream_done::StreamDone,
  stream_error::StreamError,
};

/// Requests unbounded demand, discards every element and resolves its
/// completion when the stream ends.
pub(crate) struct IgnoreSink {
  state:      Mutex<StageState>,
  completion: StreamCompletion<StreamDone>,
}

impl IgnoreSink {
  pub(crate) fn new(completion: StreamCompletion<StreamDone>) -> Self {
    Self { state: Mutex::new(StageState::new()), completion }
  }

  fn abort(&self, cause: StreamError) {
    tracing::error!(error = %cause, "ignore sink aborted");
    self.completion.complete(Err(cause));
  }
}

impl Subscriber<DynValue> for IgnoreSink {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    let transition = lock_unpoisoned(&self.state).on_subscribe();
    match transition {
      | Ok(()) => subscription.request(u64::MAX),
      | Err(cause) => {
        subscription.cancel();
        self.abort(cause);
      },
    }
  }

  fn on_next(&self, _element: DynValue) {
    let disposition = lock_unpoisoned(&self.state).on_element();
    if let Err(cause) = disposition {
      self.abort(cause);
    }
  }

  fn on_complete(&self) {
    let transition = lock_unpoisoned(&self.state).on_complete();
    match transition {
      | Ok(true) => self.completion.complete(Ok(StreamDone)),
      | Ok(false) => {},
      | Err(cause) => self.abort(cause),
    }
  }

  fn on_error(&self, cause: StreamError) {
    let transition = lock_unpoisoned(&self.state).on_error();
    match transition {
      | Ok(true) => self.completion.complete(Err(cause)),
      | Ok(false) => {},
      | Err(violation) => self.abort(violation),
    }
  }
}
