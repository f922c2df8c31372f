use crate::mat_combine::MatCombine;

/// Compile-time selection of a materialized-value combination.
///
/// `to_mat` takes a rule as a type parameter so the joined graph's
/// materialized type is known statically; [`kind`](Self::kind) reports the
/// matching runtime tag for the module description.
pub trait MatCombineRule<Left, Right> {
  /// Materialized type of the joined graph.
  type Out;

  /// Runtime tag recorded in the module description.
  fn kind() -> MatCombine;

  /// Combines the two sides' values after materialization.
  fn combine(left: Left, right: Right) -> Self::Out;
}
