//! Construction-time validation errors.

/// Errors raised while describing a graph, before materialization.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StreamDslError {
  /// A construction argument was out of range.
  #[error("invalid argument `{name}` = {value}: {reason}")]
  InvalidArgument {
    /// Argument name.
    name:   &'static str,
    /// Rejected value.
    value:  usize,
    /// Why the value was rejected.
    reason: &'static str,
  },
}
