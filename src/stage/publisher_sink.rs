use std::sync::{Arc, Mutex};

use crate::{
  demand_tracker::DemandTracker,
  dyn_value::DynValue,
  lock::lock_unpoisoned,
  protocol::{CancelledSubscription, DynSubscriber, Publisher, StageState, Subscriber, Subscription, SubscriptionId, SubscriptionRef},
  stream_error::StreamError,
};

struct SingleState {
  upstream_state: StageState,
  upstream:       Option<SubscriptionRef>,
  downstream:     Option<DynSubscriber>,
  attached:       bool,
  downstream_done: bool,
  pending:        DemandTracker,
  pending_cancel: bool,
  terminal:       Option<Result<(), StreamError>>,
}

impl SingleState {
  fn new() -> Self {
    Self {
      upstream_state:  StageState::new(),
      upstream:        None,
      downstream:      None,
      attached:        false,
      downstream_done: false,
      pending:         DemandTracker::new(),
      pending_cancel:  false,
      terminal:        None,
    }
  }
}

/// Exposes the stream it consumes as a publisher for exactly one external
/// subscriber.
///
/// Demand signalled by the downstream is forwarded verbatim to the upstream,
/// buffering nothing; signals arriving before either side is attached are
/// stashed until both ends exist.
pub(crate) struct PublisherSink {
  state: Arc<Mutex<SingleState>>,
}

impl PublisherSink {
  pub(crate) fn new() -> Self {
    Self { state: Arc::new(Mutex::new(SingleState::new())) }
  }
}

impl Subscriber<DynValue> for PublisherSink {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    let mut state = lock_unpoisoned(&self.state);
    match state.upstream_state.on_subscribe() {
      | Ok(()) => {
        state.upstream = Some(subscription.clone());
        if state.pending_cancel {
          state.upstream = None;
          drop(state);
          subscription.cancel();
          return;
        }
        let stashed = state.pending.outstanding();
        state.pending = DemandTracker::new();
        drop(state);
        if stashed > 0 {
          subscription.request(stashed);
        }
      },
      | Err(cause) => {
        drop(state);
        tracing::error!(error = %cause, "publisher sink rejected duplicate upstream");
        subscription.cancel();
      },
    }
  }

  fn on_next(&self, element: DynValue) {
    let mut state = lock_unpoisoned(&self.state);
    match state.upstream_state.on_element() {
      | Ok(true) => {
        if state.downstream_done {
          return;
        }
        if let Some(downstream) = state.downstream.clone() {
          drop(state);
          downstream.on_next(element);
        } else {
          tracing::warn!("dropping element delivered without downstream demand");
        }
      },
      | Ok(false) => {},
      | Err(cause) => {
        let upstream = state.upstream.take();
        let downstream = state.downstream.take();
        state.downstream_done = true;
        drop(state);
        tracing::error!(error = %cause, "publisher sink aborted");
        if let Some(upstream) = upstream {
          upstream.cancel();
        }
        if let Some(downstream) = downstream {
          downstream.on_error(cause);
        }
      },
    }
  }

  fn on_complete(&self) {
    let mut state = lock_unpoisoned(&self.state);
    match state.upstream_state.on_complete() {
      | Ok(true) => {
        state.upstream = None;
        if state.attached {
          if state.downstream_done {
            return;
          }
          state.downstream_done = true;
          let downstream = state.downstream.take();
          drop(state);
          if let Some(downstream) = downstream {
            downstream.on_complete();
          }
        } else {
          state.terminal = Some(Ok(()));
        }
      },
      | Ok(false) => {},
      | Err(cause) => tracing::error!(error = %cause, "publisher sink received completion in invalid state"),
    }
  }

  fn on_error(&self, cause: StreamError) {
    let mut state = lock_unpoisoned(&self.state);
    match state.upstream_state.on_error() {
      | Ok(true) => {
        state.upstream = None;
        if state.attached {
          if state.downstream_done {
            return;
          }
          state.downstream_done = true;
          let downstream = state.downstream.take();
          drop(state);
          if let Some(downstream) = downstream {
            downstream.on_error(cause);
          }
        } else {
          state.terminal = Some(Err(cause));
        }
      },
      | Ok(false) => {},
      | Err(violation) => tracing::error!(error = %violation, "publisher sink received failure in invalid state"),
    }
  }
}

impl Publisher<DynValue> for PublisherSink {
  fn subscribe(&self, subscriber: DynSubscriber) {
    let mut state = lock_unpoisoned(&self.state);
    if state.attached {
      drop(state);
      subscriber.on_subscribe(Arc::new(CancelledSubscription::new()));
      subscriber.on_error(StreamError::AlreadySubscribed);
      return;
    }
    state.attached = true;
    state.downstream = Some(subscriber.clone());
    let terminal = state.terminal.take();
    let subscription = Arc::new(SingleSubscription {
      state: self.state.clone(),
      id:    SubscriptionId::next(),
    });
    if terminal.is_some() {
      state.downstream = None;
      state.downstream_done = true;
    }
    drop(state);
    subscriber.on_subscribe(subscription);
    match terminal {
      | Some(Ok(())) => subscriber.on_complete(),
      | Some(Err(cause)) => subscriber.on_error(cause),
      | None => {},
    }
  }
}

struct SingleSubscription {
  state: Arc<Mutex<SingleState>>,
  id:    SubscriptionId,
}

impl Subscription for SingleSubscription {
  fn id(&self) -> SubscriptionId {
    self.id
  }

  fn request(&self, n: u64) {
    let mut state = lock_unpoisoned(&self.state);
    if state.downstream_done {
      return;
    }
    if n == 0 {
      state.downstream_done = true;
      let downstream = state.downstream.take();
      let upstream = state.upstream.take();
      drop(state);
      if let Some(upstream) = upstream {
        upstream.cancel();
      }
      if let Some(downstream) = downstream {
        downstream.on_error(StreamError::InvalidDemand);
      }
      return;
    }
    match state.upstream.clone() {
      | Some(upstream) => {
        drop(state);
        upstream.request(n);
      },
      | None => {
        let _ = state.pending.request(n);
      },
    }
  }

  fn cancel(&self) {
    let mut state = lock_unpoisoned(&self.state);
    if state.downstream_done {
      return;
    }
    state.downstream_done = true;
    state.downstream = None;
    match state.upstream.take() {
      | Some(upstream) => {
        drop(state);
        upstream.cancel();
      },
      | None => state.pending_cancel = true,
    }
  }
}
