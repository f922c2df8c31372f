/// Materialized value of graph sides that materialize nothing useful.
///
/// Stages such as [`crate::Sink::cancelled`] have no handle worth returning;
/// they materialize this marker instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamNotUsed;

impl StreamNotUsed {
  /// Returns the marker value.
  #[must_use]
  pub const fn new() -> Self {
    Self
  }
}
