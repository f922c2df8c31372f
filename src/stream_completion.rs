//! Shared one-shot completion cell for materialized futures.

#[cfg(test)]
mod tests;

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::{completion::Completion, lock::lock_unpoisoned, stream_error::StreamError};

struct CompletionState<T> {
  result: Option<Result<T, StreamError>>,
}

/// Handle used to observe the terminal result of a stage.
///
/// The first `complete` call wins; later calls are ignored so a terminal
/// result stays sticky.
pub struct StreamCompletion<T> {
  state:  Arc<Mutex<CompletionState<T>>>,
  notify: Arc<Notify>,
}

impl<T> Clone for StreamCompletion<T> {
  fn clone(&self) -> Self {
    Self { state: self.state.clone(), notify: self.notify.clone() }
  }
}

impl<T> StreamCompletion<T> {
  /// Creates a new pending completion handle.
  #[must_use]
  pub fn new() -> Self {
    Self {
      state:  Arc::new(Mutex::new(CompletionState { result: None })),
      notify: Arc::new(Notify::new()),
    }
  }

  /// Polls the completion state.
  #[must_use]
  pub fn poll(&self) -> Completion<T>
  where
    T: Clone, {
    let guard = lock_unpoisoned(&self.state);
    match guard.result.clone() {
      | Some(result) => Completion::Ready(result),
      | None => Completion::Pending,
    }
  }

  /// Attempts to take the completion result.
  #[must_use]
  pub fn try_take(&self) -> Option<Result<T, StreamError>> {
    let mut guard = lock_unpoisoned(&self.state);
    guard.result.take()
  }

  /// Waits until the completion is resolved and returns its result.
  pub async fn wait(&self) -> Result<T, StreamError>
  where
    T: Clone, {
    loop {
      let notified = self.notify.notified();
      if let Completion::Ready(result) = self.poll() {
        return result;
      }
      notified.await;
    }
  }

  pub(crate) fn complete(&self, result: Result<T, StreamError>) {
    let mut guard = lock_unpoisoned(&self.state);
    if guard.result.is_none() {
      guard.result = Some(result);
      drop(guard);
      self.notify.notify_waiters();
    }
  }
}

impl<T> Default for StreamCompletion<T> {
  fn default() -> Self {
    Self::new()
  }
}
