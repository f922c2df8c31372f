use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use crate::{
  demand_tracker::DemandTracker,
  dyn_value::DynValue,
  lock::lock_unpoisoned,
  protocol::{CancelledSubscription, DynSubscriber, Publisher, StageState, Subscriber, Subscription, SubscriptionId, SubscriptionRef},
  stream_error::StreamError,
};

struct Downstream {
  id:         u64,
  subscriber: DynSubscriber,
  demand:     DemandTracker,
  next_index: u64,
  handshaken: bool,
  done:       bool,
}

struct FanoutState {
  upstream_state:     StageState,
  upstream:           Option<SubscriptionRef>,
  upstream_cancelled: bool,
  requested:          u64,
  received:           u64,
  head_index:         u64,
  buffer:             VecDeque<DynValue>,
  downstreams:        Vec<Downstream>,
  ever_attached:      bool,
  terminal:           Option<Result<(), StreamError>>,
  next_downstream_id: u64,
  initial:            u64,
  max:                u64,
}

enum Action {
  Request(SubscriptionRef, u64),
  CancelUpstream(SubscriptionRef),
  Next(DynSubscriber, DynValue),
  Complete(DynSubscriber),
  Error(DynSubscriber, StreamError),
}

fn run_actions(actions: Vec<Action>) {
  for action in actions {
    match action {
      | Action::Request(subscription, n) => subscription.request(n),
      | Action::CancelUpstream(subscription) => subscription.cancel(),
      | Action::Next(subscriber, element) => subscriber.on_next(element),
      | Action::Complete(subscriber) => subscriber.on_complete(),
      | Action::Error(subscriber, cause) => subscriber.on_error(cause),
    }
  }
}

impl FanoutState {
  fn new(initial: u64, max: u64) -> Self {
    Self {
      upstream_state: StageState::new(),
      upstream: None,
      upstream_cancelled: false,
      requested: 0,
      received: 0,
      head_index: 0,
      buffer: VecDeque::new(),
      downstreams: Vec::new(),
      ever_attached: false,
      terminal: None,
      next_downstream_id: 0,
      initial,
      max,
    }
  }

  /// Single progress step: delivers buffered elements against per-downstream
  /// demand, flushes terminals to caught-up downstreams, prunes the shared
  /// buffer behind the slowest cursor and tops up upstream demand.
  fn pump(&mut self) -> Vec<Action> {
    let mut actions = Vec::new();

    for downstream in self.downstreams.iter_mut().filter(|d| d.handshaken && !d.done) {
      while downstream.next_index < self.received {
        if !downstream.demand.consume_one() {
          break;
        }
        let offset = (downstream.next_index - self.head_index) as usize;
        if let Some(element) = self.buffer.get(offset) {
          actions.push(Action::Next(downstream.subscriber.clone(), element.clone()));
        }
        downstream.next_index += 1;
      }
    }

    if let Some(result) = self.terminal.clone() {
      for downstream in self.downstreams.iter_mut().filter(|d| d.handshaken && !d.done) {
        if downstream.next_index == self.received {
          downstream.done = true;
          match &result {
            | Ok(()) => actions.push(Action::Complete(downstream.subscriber.clone())),
            | Err(cause) => actions.push(Action::Error(downstream.subscriber.clone(), cause.clone())),
          }
        }
      }
    }

    let slowest = self.downstreams.iter().filter(|d| !d.done).map(|d| d.next_index).min();
    match slowest {
      | Some(min_index) => {
        while self.head_index < min_index {
          self.buffer.pop_front();
          self.head_index += 1;
        }
      },
      | None => {
        if self.ever_attached && self.terminal.is_none() && !self.upstream_cancelled {
          self.upstream_cancelled = true;
          self.buffer.clear();
          if let Some(upstream) = self.upstream.take() {
            actions.push(Action::CancelUpstream(upstream));
          }
        }
      },
    }

    if self.terminal.is_none() && !self.upstream_cancelled {
      if let Some(upstream) = self.upstream.clone() {
        let buffered = self.buffer.len() as u64;
        let desired = if self.ever_attached {
          self
            .downstreams
            .iter()
            .filter(|d| !d.done)
            .map(|d| (d.next_index.saturating_add(d.demand.outstanding())).saturating_sub(self.received))
            .min()
            .unwrap_or(0)
        } else {
          self.initial.saturating_sub(buffered)
        };
        let in_flight = self.requested - self.received;
        let target = desired.min(self.max.saturating_sub(buffered));
        if target > in_flight {
          let delta = target - in_flight;
          self.requested += delta;
          actions.push(Action::Request(upstream, delta));
        }
      }
    }

    actions
  }

  fn fail_downstreams(&mut self, cause: &StreamError) -> Vec<Action> {
    let mut actions = Vec::new();
    if !self.upstream_cancelled {
      self.upstream_cancelled = true;
      if let Some(upstream) = self.upstream.take() {
        actions.push(Action::CancelUpstream(upstream));
      }
    }
    for downstream in self.downstreams.iter_mut().filter(|d| !d.done) {
      downstream.done = true;
      actions.push(Action::Error(downstream.subscriber.clone(), cause.clone()));
    }
    actions
  }

  fn downstream_mut(&mut self, id: u64) -> Option<&mut Downstream> {
    self.downstreams.iter_mut().find(|d| d.id == id)
  }
}

/// Exposes the stream it consumes as a publisher for any number of external
/// subscribers.
///
/// Elements are shared through a ring of undelivered elements bounded by
/// `max`; upstream demand follows the slowest downstream so the ring never
/// overflows. Before the first subscriber attaches, up to `initial` elements
/// are prefetched.
pub(crate) struct FanoutPublisherSink {
  state: Arc<Mutex<FanoutState>>,
}

impl FanoutPublisherSink {
  pub(crate) fn new(initial: u64, max: u64) -> Self {
    Self { state: Arc::new(Mutex::new(FanoutState::new(initial, max))) }
  }
}

impl Subscriber<DynValue> for FanoutPublisherSink {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    let mut state = lock_unpoisoned(&self.state);
    match state.upstream_state.on_subscribe() {
      | Ok(()) => {
        state.upstream = Some(subscription);
        let actions = state.pump();
        drop(state);
        run_actions(actions);
      },
      | Err(cause) => {
        drop(state);
        tracing::error!(error = %cause, "fan-out sink rejected duplicate upstream");
        subscription.cancel();
      },
    }
  }

  fn on_next(&self, element: DynValue) {
    let mut state = lock_unpoisoned(&self.state);
    match state.upstream_state.on_element() {
      | Ok(true) => {
        if state.received >= state.requested {
          let cause = StreamError::ProtocolViolation("element delivered beyond requested demand");
          tracing::error!(error = %cause, "fan-out sink aborted");
          let actions = state.fail_downstreams(&cause);
          state.terminal = Some(Err(cause));
          drop(state);
          run_actions(actions);
          return;
        }
        state.received += 1;
        state.buffer.push_back(element);
        let actions = state.pump();
        drop(state);
        run_actions(actions);
      },
      | Ok(false) => {},
      | Err(cause) => {
        tracing::error!(error = %cause, "fan-out sink aborted");
        let actions = state.fail_downstreams(&cause);
        drop(state);
        run_actions(actions);
      },
    }
  }

  fn on_complete(&self) {
    let mut state = lock_unpoisoned(&self.state);
    match state.upstream_state.on_complete() {
      | Ok(true) => {
        state.upstream = None;
        state.terminal = Some(Ok(()));
        let actions = state.pump();
        drop(state);
        run_actions(actions);
      },
      | Ok(false) => {},
      | Err(cause) => tracing::error!(error = %cause, "fan-out sink received completion in invalid state"),
    }
  }

  fn on_error(&self, cause: StreamError) {
    let mut state = lock_unpoisoned(&self.state);
    match state.upstream_state.on_error() {
      | Ok(true) => {
        state.upstream = None;
        state.terminal = Some(Err(cause));
        let actions = state.pump();
        drop(state);
        run_actions(actions);
      },
      | Ok(false) => {},
      | Err(violation) => tracing::error!(error = %violation, "fan-out sink received failure in invalid state"),
    }
  }
}

impl Publisher<DynValue> for FanoutPublisherSink {
  fn subscribe(&self, subscriber: DynSubscriber) {
    let mut state = lock_unpoisoned(&self.state);
    if state.upstream_cancelled && state.terminal.is_none() {
      drop(state);
      subscriber.on_subscribe(Arc::new(CancelledSubscription::new()));
      subscriber.on_error(StreamError::DownstreamClosed);
      return;
    }
    let id = state.next_downstream_id;
    state.next_downstream_id += 1;
    let next_index = state.head_index;
    state.downstreams.push(Downstream {
      id,
      subscriber: subscriber.clone(),
      demand: DemandTracker::new(),
      next_index,
      handshaken: false,
      done: false,
    });
    state.ever_attached = true;
    drop(state);

    let subscription = Arc::new(FanoutSubscription {
      state: self.state.clone(),
      downstream: id,
      id: SubscriptionId::next(),
    });
    subscriber.on_subscribe(subscription);

    let mut state = lock_unpoisoned(&self.state);
    if let Some(downstream) = state.downstream_mut(id) {
      downstream.handshaken = true;
    }
    let actions = state.pump();
    drop(state);
    run_actions(actions);
  }
}

struct FanoutSubscription {
  state:      Arc<Mutex<FanoutState>>,
  downstream: u64,
  id:         SubscriptionId,
}

impl Subscription for FanoutSubscription {
  fn id(&self) -> SubscriptionId {
    self.id
  }

  fn request(&self, n: u64) {
    let mut state = lock_unpoisoned(&self.state);
    let Some(downstream) = state.downstream_mut(self.downstream) else {
      return;
    };
    if downstream.done {
      return;
    }
    let mut actions = Vec::new();
    if n == 0 {
      downstream.done = true;
      actions.push(Action::Error(downstream.subscriber.clone(), StreamError::InvalidDemand));
    } else {
      let _ = downstream.demand.request(n);
    }
    actions.extend(state.pump());
    drop(state);
    run_actions(actions);
  }

  fn cancel(&self) {
    let mut state = lock_unpoisoned(&self.state);
    let Some(downstream) = state.downstream_mut(self.downstream) else {
      return;
    };
    if downstream.done {
      return;
    }
    downstream.done = true;
    let actions = state.pump();
    drop(state);
    run_actions(actions);
  }
}
