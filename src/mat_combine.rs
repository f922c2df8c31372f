/// Runtime tag for how a join combines the materialized values of its two
/// sides.
///
/// Carried inside composite module descriptions; the typed rules in
/// [`crate::mat_combine_rule`] pick the tag at the `to_mat` call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatCombine {
  /// Keep the upstream side's value.
  KeepLeft,
  /// Keep the downstream side's value.
  KeepRight,
  /// Keep both values as a pair.
  KeepBoth,
  /// Discard both values.
  KeepNone,
}
