use super::Attributes;

#[test]
fn empty_attributes_have_no_facets() {
  let attributes = Attributes::new();
  assert!(attributes.is_empty());
  assert_eq!(attributes.name(), None);
  assert_eq!(attributes.input_buffer_bounds(), None);
}

#[test]
fn innermost_name_wins_on_merge() {
  let merged = Attributes::named("outer").and(Attributes::named("inner"));
  assert_eq!(merged.name(), Some("inner"));
  assert_eq!(merged.entries().len(), 2);
}

#[test]
fn merge_keeps_unrelated_facets() {
  let merged = Attributes::named("stage").and(Attributes::input_buffer(4, 16));
  assert_eq!(merged.name(), Some("stage"));
  assert_eq!(merged.input_buffer_bounds(), Some((4, 16)));
}

#[test]
fn innermost_buffer_bounds_win_on_merge() {
  let merged = Attributes::input_buffer(1, 2).and(Attributes::input_buffer(8, 32));
  assert_eq!(merged.input_buffer_bounds(), Some((8, 32)));
}

#[test]
fn and_is_append_only() {
  let left = Attributes::named("a");
  let merged = left.and(Attributes::named("b")).and(Attributes::named("c"));
  assert_eq!(merged.entries().len(), 3);
  assert_eq!(merged.name(), Some("c"));
}
