
use crate::stream_error::StreamError;

/// Protocol state machine for one producer-consumer link.
///
/// `Unsubscribed → Subscribed → {Completed | Errored | Cancelled}`; every
/// terminal state is sticky. Transition methods distinguish three outcomes:
/// perform the call, silently ignore it (races that the protocol permits,
/// e.g. an in-flight element after cancellation), or a protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
  /// No subscription has been issued yet.
  Unsubscribed,
  /// The link is live.
  Subscribed,
  /// The link ended with `on_complete`.
  Completed,
  /// The link ended with `on_error`.
  Errored,
  /// The link was cancelled by the consumer.
  Cancelled,
}

impl StageState {
  /// Creates the initial state.
  #[must_use]
  pub const fn new() -> Self {
    Self::Unsubscribed
  }

  /// Returns `true` once the link reached a terminal state.
  #[must_use]
  pub const fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Errored | Self::Cancelled)
  }

  /// Applies the `on_subscribe` transition.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::ProtocolViolation` when a subscription was already
  /// issued or the link already terminated.
  pub fn on_subscribe(&mut self) -> Result<(), StreamError> {
    match self {
      | Self::Unsubscribed => {
        *self = Self::Subscribed;
        Ok(())
      },
      | _ => Err(StreamError::ProtocolViolation("on_subscribe on an established link")),
    }
  }

  /// Applies the `on_next` transition.
  ///
  /// Returns `true` when the element must be delivered and `false` when it
  /// raced a cancellation and must be dropped.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::ProtocolViolation` for elements before the
  /// handshake or after a completion/error.
  pub fn on_element(&self) -> Result<bool, StreamError> {
    match self {
      | Self::Subscribed => Ok(true),
      | Self::Cancelled => Ok(false),
      | Self::Unsubscribed => Err(StreamError::ProtocolViolation("on_next before on_subscribe")),
      | Self::Completed | Self::Errored => Err(StreamError::ProtocolViolation("on_next after terminal signal")),
    }
  }

  /// Applies the `on_complete` transition.
  ///
  /// Returns `true` when the completion must be acted upon and `false` when
  /// it raced a cancellation.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::ProtocolViolation` when the link already received
  /// a terminal signal or never completed the handshake.
  pub fn on_complete(&mut self) -> Result<bool, StreamError> {
    match self {
      | Self::Subscribed => {
        *self = Self::Completed;
        Ok(true)
      },
      | Self::Cancelled => Ok(false),
      | Self::Unsubscribed => Err(StreamError::ProtocolViolation("on_complete before on_subscribe")),
      | Self::Completed | Self::Errored => Err(StreamError::ProtocolViolation("second terminal signal")),
    }
  }

  /// Applies the `on_error` transition with the same outcomes as
  /// [`StageState::on_complete`].
  ///
  /// # Errors
  ///
  /// Returns `StreamError::ProtocolViolation` when the link already received
  /// a terminal signal or never completed the handshake.
  pub fn on_error(&mut self) -> Result<bool, StreamError> {
    match self {
      | Self::Subscribed => {
        *self = Self::Errored;
        Ok(true)
      },
      | Self::Cancelled => Ok(false),
      | Self::Unsubscribed => Err(StreamError::ProtocolViolation("on_error before on_subscribe")),
      | Self::Completed | Self::Errored => Err(StreamError::ProtocolViolation("second terminal signal")),
    }
  }

  /// Applies the consumer-side `cancel` transition.
  ///
  /// Returns `true` on the first effective cancellation; repeated or
  /// post-terminal cancels are no-ops.
  pub fn cancel(&mut self) -> bool {
    match self {
      | Self::Subscribed | Self::Unsubscribed => {
        *self = Self::Cancelled;
        true
      },
      | Self::Completed | Self::Errored | Self::Cancelled => false,
    }
  }
}

impl Default for StageState {
  fn default() -> Self {
    Self::new()
  }
}
