use crate::{mat_combine::MatCombine, mat_combine_rule::MatCombineRule};

/// Rule keeping the upstream side's materialized value.
pub struct KeepLeft;

impl<Left, Right> MatCombineRule<Left, Right> for KeepLeft {
  type Out = Left;

  fn kind() -> MatCombine {
    MatCombine::KeepLeft
  }

  fn combine(left: Left, _right: Right) -> Self::Out {
    left
  }
}
