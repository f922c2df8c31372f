//! Runtime stream error definitions.

/// Errors produced by running streams and the materializer.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StreamError {
  /// The materializer has not been started.
  #[error("materializer not started")]
  MaterializerNotStarted,
  /// The materializer has already been started.
  #[error("materializer already started")]
  MaterializerAlreadyStarted,
  /// The materializer has already been shut down.
  #[error("materializer already shut down")]
  MaterializerStopped,
  /// Connection between stages is invalid.
  #[error("invalid stream connection")]
  InvalidConnection,
  /// Demand request is invalid.
  #[error("invalid demand request")]
  InvalidDemand,
  /// The stream completed without producing an element.
  #[error("stream completed without an element")]
  NoElement,
  /// The publisher supports only a single subscriber.
  #[error("publisher already has a subscriber")]
  AlreadySubscribed,
  /// A pending queue pull timed out.
  #[error("queue pull timed out")]
  PullTimeout,
  /// A queue pull is already in progress.
  #[error("queue pull already in progress")]
  PullInProgress,
  /// Materialization was aborted before the stage could run.
  #[error("materialization aborted")]
  MaterializationAborted,
  /// Materialized value had an unexpected type.
  #[error("materialized value type mismatch")]
  MatTypeMismatch,
  /// A stream element had an unexpected type.
  #[error("stream element type mismatch")]
  ElementTypeMismatch,
  /// A protocol call arrived outside the permitted state transitions.
  #[error("stream protocol violation: {0}")]
  ProtocolViolation(&'static str),
  /// The downstream target is gone.
  #[error("downstream target closed")]
  DownstreamClosed,
  /// The stream failed with the recorded cause.
  #[error("stream failed: {0}")]
  Failure(String),
}

impl StreamError {
  /// Creates a failure error carrying the provided cause description.
  #[must_use]
  pub fn failure(cause: impl Into<String>) -> Self {
    Self::Failure(cause.into())
  }
}
