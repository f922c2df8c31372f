/// Completion token for sinks that consume a stream without producing a
/// value, such as [`crate::Sink::ignore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamDone;

impl StreamDone {
  /// Returns the completion token.
  #[must_use]
  pub const fn new() -> Self {
    Self
  }
}
