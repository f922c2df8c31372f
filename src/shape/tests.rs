use super::{Inlet, Outlet, Shape, SinkShape, SourceShape, UniformFanOutShape};

#[test]
fn ports_get_distinct_identities() {
  let first = Inlet::<u32>::new("a.in");
  let second = Inlet::<u32>::new("a.in");
  assert_ne!(first.id(), second.id());
  assert_eq!(first.name(), second.name());
}

#[test]
fn source_shape_has_one_outlet_and_no_inlets() {
  let shape = SourceShape::new(Outlet::<u32>::new("src.out")).shape();
  assert!(shape.inlets().is_empty());
  assert_eq!(shape.outlets().len(), 1);
  assert_eq!(shape.outlets()[0].name(), "src.out");
  assert!(!shape.is_closed());
}

#[test]
fn sink_shape_has_one_inlet_and_no_outlets() {
  let shape = SinkShape::new(Inlet::<u32>::new("snk.in")).shape();
  assert_eq!(shape.inlets().len(), 1);
  assert!(shape.outlets().is_empty());
}

#[test]
fn uniform_fan_out_shape_exposes_numbered_outlets() {
  let shape = UniformFanOutShape::<u32, u32>::new("split", 3);
  assert_eq!(shape.outlets().len(), 3);
  assert_eq!(shape.outlets()[2].name(), "split.out2");
  assert_eq!(shape.shape().outlets().len(), 3);
}

#[test]
fn carbon_copy_issues_fresh_identities_and_keeps_names() {
  let original = SinkShape::new(Inlet::<u32>::new("snk.in")).shape();
  let (copy, mapping) = original.carbon_copy();

  assert_eq!(copy.inlets().len(), 1);
  assert_eq!(copy.inlets()[0].name(), "snk.in");
  assert_ne!(copy.inlets()[0].id(), original.inlets()[0].id());
  assert_eq!(mapping, vec![(copy.inlets()[0].id(), original.inlets()[0].id())]);
}

#[test]
fn closed_shape_reports_no_open_ports() {
  assert!(Shape::closed().is_closed());
}
