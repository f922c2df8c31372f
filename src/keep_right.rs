use crate::{mat_combine::MatCombine, mat_combine_rule::MatCombineRule};

/// Rule keeping the downstream side's materialized value.
pub struct KeepRight;

impl<Left, Right> MatCombineRule<Left, Right> for KeepRight {
  type Out = Right;

  fn kind() -> MatCombine {
    MatCombine::KeepRight
  }

  fn combine(_left: Left, right: Right) -> Self::Out {
    right
  }
}
