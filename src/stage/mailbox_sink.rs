use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;

use crate::{
  dyn_value::{downcast_value, DynValue, Element},
  lock::lock_unpoisoned,
  protocol::{StageState, Subscriber, SubscriptionRef},
  stream_error::StreamError,
};

/// Signal forwarded by a mailbox sink to its target channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxSignal<T, M> {
  /// A stream element.
  Element(T),
  /// The stream completed; carries the configured completion message.
  Completed(M),
  /// The stream failed.
  Failed(StreamError),
}

struct MailboxState {
  stage:        StageState,
  subscription: Option<SubscriptionRef>,
}

/// Forwards every element to an unbounded channel, keeping a sliding window
/// of `buffer` outstanding elements.
///
/// The initial request covers the whole window; each forwarded element is
/// acknowledged with one more unit of demand. When the channel's receiver is
/// gone the sink cancels its upstream.
pub(crate) struct MailboxSink<T, M> {
  inner:      Mutex<MailboxState>,
  target:     UnboundedSender<MailboxSignal<T, M>>,
  completion: Mutex<Option<M>>,
  buffer:     u64,
}

impl<T: Element, M: Send + 'static> MailboxSink<T, M> {
  pub(crate) fn new(target: UnboundedSender<MailboxSignal<T, M>>, on_complete: M, buffer: u64) -> Self {
    Self {
      inner: Mutex::new(MailboxState {
        stage:        StageState::new(),
        subscription: None,
      }),
      target,
      completion: Mutex::new(Some(on_complete)),
      buffer,
    }
  }

  fn cancel_upstream(&self) {
    let mut inner = lock_unpoisoned(&self.inner);
    let _ = inner.stage.cancel();
    let subscription = inner.subscription.take();
    drop(inner);
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }
}

impl<T: Element, M: Send + 'static> Subscriber<DynValue> for MailboxSink<T, M> {
  fn on_subscribe(&self, subscription: SubscriptionRef) {
    let mut inner = lock_unpoisoned(&self.inner);
    match inner.stage.on_subscribe() {
      | Ok(()) => {
        inner.subscription = Some(subscription.clone());
        let window = self.buffer;
        drop(inner);
        subscription.request(window);
      },
      | Err(cause) => {
        drop(inner);
        tracing::error!(error = %cause, "mailbox sink rejected duplicate upstream");
        subscription.cancel();
      },
    }
  }

  fn on_next(&self, element: DynValue) {
    let inner = lock_unpoisoned(&self.inner);
    match inner.stage.on_element() {
      | Ok(true) => {
        let subscription = inner.subscription.clone();
        drop(inner);
        let value = match downcast_value::<T>(element) {
          | Ok(value) => value,
          | Err(cause) => {
            tracing::error!(error = %cause, "mailbox sink aborted");
            self.cancel_upstream();
            let _ = self.target.send(MailboxSignal::Failed(cause));
            return;
          },
        };
        if self.target.send(MailboxSignal::Element(value)).is_err() {
          tracing::debug!("mailbox receiver dropped, cancelling upstream");
          self.cancel_upstream();
          return;
        }
        if let Some(subscription) = subscription {
          subscription.request(1);
        }
      },
      | Ok(false) => {},
      | Err(cause) => {
        drop(inner);
        tracing::error!(error = %cause, "mailbox sink aborted");
        self.cancel_upstream();
      },
    }
  }

  fn on_complete(&self) {
    let mut inner = lock_unpoisoned(&self.inner);
    match inner.stage.on_complete() {
      | Ok(true) => {
        inner.subscription = None;
        drop(inner);
        let message = lock_unpoisoned(&self.completion).take();
        if let Some(message) = message {
          let _ = self.target.send(MailboxSignal::Completed(message));
        }
      },
      | Ok(false) => {},
      | Err(cause) => tracing::error!(error = %cause, "mailbox sink received completion in invalid state"),
    }
  }

  fn on_error(&self, cause: StreamError) {
    let mut inner = lock_unpoisoned(&self.inner);
    match inner.stage.on_error() {
      | Ok(true) => {
        inner.subscription = None;
        drop(inner);
        let _ = self.target.send(MailboxSignal::Failed(cause));
      },
      | Ok(false) => {},
      | Err(violation) => tracing::error!(error = %violation, "mailbox sink received failure in invalid state"),
    }
  }
}
