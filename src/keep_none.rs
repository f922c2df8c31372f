use crate::{mat_combine::MatCombine, mat_combine_rule::MatCombineRule, stream_not_used::StreamNotUsed};

/// Rule discarding both sides' materialized values.
pub struct KeepNone;

impl<Left, Right> MatCombineRule<Left, Right> for KeepNone {
  type Out = StreamNotUsed;

  fn kind() -> MatCombine {
    MatCombine::KeepNone
  }

  fn combine(_left: Left, _right: Right) -> Self::Out {
    StreamNotUsed
  }
}
