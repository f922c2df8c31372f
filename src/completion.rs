use crate::stream_error::StreamError;

/// Polling result for stream completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
  /// Completion is still pending.
  Pending,
  /// Completion is ready with the provided result.
  Ready(Result<T, StreamError>),
}

impl<T> Completion<T> {
  /// Returns `true` while the completion is pending.
  #[must_use]
  pub const fn is_pending(&self) -> bool {
    matches!(self, Self::Pending)
  }
}
