use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
  time::Duration,
};

use tokio::sync::oneshot;

use crate::{
  dyn_value::{downcast_value, DynValue, Element},
  lock::lock_unpoisoned,
  protocol::{StageState, Subscriber, SubscriptionRef},
  stream_error::StreamError,
};

type PullResult<T> = Result<Option<T>, StreamError>;

struct QueueState<T> {
  stage:        StageState,
  subscription: Option<SubscriptionRef>,
  buffer:       VecDeque<T>,
  waiter:       Option<oneshot::Sender<PullResult<T>>>,
  terminal:     Option<Result<(), StreamError>>,
}

impl<T> QueueState<T> {
  fn new() -> Self {
    Self {
      stage:        StageState::new(),
      subscription: None,
      buffer:       VecDeque::new(),
      waiter:       None,
      terminal:     None,
    }
  }
}

/// Pull handle materialized by the queue sink.
///
/// `pull` resolves with `Some(element)` per element, `None` once the stream
/// completed and the error once it failed. At most one pull may be in flight.
pub struct SinkQueue<T> {
  state:        Arc<Mutex<QueueState<T>>>,
  buffer_size:  u64,
  pull_timeout: Duration,
}

impl<T: Element> SinkQueue<T> {
  /// Pulls the next element, waiting up to the configured timeout.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::PullInProgress` when another pull is outstanding,
  /// `StreamError::PullTimeout` when nothing arrived in time and the stream's
  /// failure cause once it failed.
  pub async fn pull(&self) -> PullResult<T> {
    self.pull_within(self.pull_timeout).await
  }

  /// Pulls the next element, waiting up to `timeout`.
  ///
  /// # Errors
  ///
  /// Same as [`SinkQueue::pull`].
  pub async fn pull_within(&self, timeout: Duration) -> PullResult<T> {
    let receiver = {
      let mut state = lock_unpoisoned(&self.state);
      if state.waiter.is_some() {
        return Err(StreamError::PullInProgress);
      }
      if let Some(element) = state.buffer.pop_front() {
        let subscription = if self.buffer_size > 0 { state.subscription.clone() } else { None };
        drop(state);
        if let Some(subscription) = subscription {
          subscription.request(1);
        }
        return Ok(Some(element));
      }
      match &state.terminal {
        | Some(Ok(())) => return Ok(None),
        | Some(Err(cause)) => return Err(cause.clone()),
        | None => {},
      }
      let (sender, receiver) = oneshot::channel();
      state.waiter = Some(sender);
      let subscription = if self.buffer_size == 0 { state.subscription.clone() } else { None };
      drop(state);
      // unbuffered queues request lazily, one element per pull
      if let Some(subscription) = subscription {
        subscription.request(1);
      }
      receiver
    };
    match tokio::time::timeout(timeout, receiver).await {
      | Ok(Ok(result)) => result,
      | Ok(Err(_closed)) => Err(StreamError::DownstreamClosed),
      | Err(_elapsed) => {
        let mut state = lock_unpoisoned(&self.state);
        state.waiter = None;
        Err(StreamError::PullTimeout)
      },
    }
  }
}

/// Buffers up to `buffer_size` elements and serves them to pulls on the
/// materialized [`SinkQueue`].
///
/// Each element consumed through the queue is acknowledged with one unit of
/// demand, so at most `buffer_size` elements (or one, for an unbuffered
/// queue) are ever outstanding.
pub(crate) struct QueueSink<T> {
  state:       Arc<Mutex<QueueState<T>>>,
  buffer_size: u64,
}

impl<T: Element> QueueSink<T> {
  pub(crate) fn new(buffer_size: u64, pull_timeout: Duration) -> (Self, SinkQueue<T>) {
    let state = Arc::new(Mutex::new(QueueState::new()));
    let queue = SinkQueue {
      state: state.clone(),
      buffer_size,
      pull_timeout,
    };
    (Self { state, buffer_size }, queue)
  }

  fn fail(&self, cause: StreamError) {
    let mut state = lock_unpoisoned(&self.state);
    let _ = state.stage.cancel();
    state.terminal = Some(Err(cause.clone()));
    let subscription = state.subscription.take();
    let waiter = state.waiter.take();
    drop(state);
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
    if let Some(waiter) = waiter {
      let _ = waiter.send(Err(cause));
    }
  }
}

impl<T: Element> Subscriber<DynValue> for QueueSink<T> {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    let mut state = lock_unpoisoned(&self.state);
    match state.stage.on_subscribe() {
      | Ok(()) => {
        state.subscription = Some(subscription.clone());
        let has_waiter = state.waiter.is_some();
        drop(state);
        if self.buffer_size > 0 {
          subscription.request(self.buffer_size);
        } else if has_waiter {
          subscription.request(1);
        }
      },
      | Err(cause) => {
        drop(state);
        tracing::error!(error = %cause, "queue sink rejected duplicate upstream");
        subscription.cancel();
      },
    }
  }

  fn on_next(&self, element: DynValue) {
    let mut state = lock_unpoisoned(&self.state);
    match state.stage.on_element() {
      | Ok(true) => {
        let value = match downcast_value::<T>(element) {
          | Ok(value) => value,
          | Err(cause) => {
            drop(state);
            tracing::error!(error = %cause, "queue sink aborted");
            self.fail(cause);
            return;
          },
        };
        if let Some(waiter) = state.waiter.take() {
          match waiter.send(Ok(Some(value))) {
            // an unbuffered pull issued its own unit of demand when it
            // registered the waiter; replenish only a prefetch window
            | Ok(()) if self.buffer_size > 0 => {
              let subscription = state.subscription.clone();
              drop(state);
              if let Some(subscription) = subscription {
                subscription.request(1);
              }
            },
            | Ok(()) => {},
            // the pull timed out between delivery and hand-off; keep the
            // element for the next pull
            | Err(Ok(Some(value))) => state.buffer.push_back(value),
            | Err(_) => {},
          }
        } else {
          state.buffer.push_back(value);
        }
      },
      | Ok(false) => {},
      | Err(cause) => {
        drop(state);
        tracing::error!(error = %cause, "queue sink aborted");
        self.fail(cause);
      },
    }
  }

  fn on_complete(&self) {
    let mut state = lock_unpoisoned(&self.state);
    match state.stage.on_complete() {
      | Ok(true) => {
        state.subscription = None;
        state.terminal = Some(Ok(()));
        let waiter = state.waiter.take();
        drop(state);
        if let Some(waiter) = waiter {
          let _ = waiter.send(Ok(None));
        }
      },
      | Ok(false) => {},
      | Err(cause) => tracing::error!(error = %cause, "queue sink received completion in invalid state"),
    }
  }

  fn on_error(&self, cause: StreamError) {
    let mut state = lock_unpoisoned(&self.state);
    match state.stage.on_error() {
      | Ok(true) => {
        state.subscription = None;
        state.terminal = Some(Err(cause.clone()));
        let waiter = state.waiter.take();
        drop(state);
        if let Some(waiter) = waiter {
          let _ = waiter.send(Err(cause));
        }
      },
      | Ok(false) => {},
      | Err(violation) => tracing::error!(error = %violation, "queue sink received failure in invalid state"),
    }
  }
}
