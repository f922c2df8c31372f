use std::sync::Arc;

use super::{MatCombiner, MaterializationContext, ModuleKind, StageFactory, StageParts, StreamModule};
use crate::{
  attributes::Attributes,
  dyn_value::DynValue,
  mat_combine::MatCombine,
  protocol::{DynSubscriber, Publisher, Subscriber, SubscriptionRef},
  shape::{Inlet, Outlet, SinkShape, SourceShape},
  stream_error::StreamError,
  stream_not_used::StreamNotUsed,
};

struct NoopPublisher;

impl Publisher<DynValue> for NoopPublisher {
  fn subscribe(&self, _subscriber: DynSubscriber) {}
}

struct NoopSubscriber;

impl Subscriber<DynValue> for NoopSubscriber {
  fn on_subscribe(&self, _subscription: SubscriptionRef) {}

  fn on_next(&self, _element: DynValue) {}

  fn on_complete(&self) {}

  fn on_error(&self, _cause: StreamError) {}
}

fn source_module(name: &str) -> StreamModule {
  let shape = SourceShape::new(Outlet::<u32>::new(format!("{name}.out"))).shape();
  let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
    Ok(StageParts::source(Arc::new(NoopPublisher), Box::new(StreamNotUsed)))
  });
  StreamModule::atomic(shape, Attributes::named(name), factory)
}

fn sink_module(name: &str) -> StreamModule {
  let shape = SinkShape::new(Inlet::<u32>::new(format!("{name}.in"))).shape();
  let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
    Ok(StageParts::sink(Arc::new(NoopSubscriber), Box::new(StreamNotUsed)))
  });
  StreamModule::atomic(shape, Attributes::named(name), factory)
}

fn keep_left_combiner() -> Arc<MatCombiner> {
  Arc::new(|left, _right| Ok(left))
}

#[test]
fn atomic_module_exposes_its_shape() {
  let module = source_module("numbers");
  assert_eq!(module.shape().outlets().len(), 1);
  assert!(module.shape().inlets().is_empty());
  assert!(!module.shape().is_closed());
  assert_eq!(module.attributes().name(), Some("numbers"));
}

#[test]
fn nest_issues_fresh_port_identities() {
  let module = source_module("numbers");
  let original = module.shape().outlets()[0].id();
  let nested = module.nest();
  let renamed = nested.shape().outlets()[0].id();
  assert_ne!(original, renamed);
  assert_eq!(nested.shape().outlets().len(), 1);
  match nested.kind() {
    | ModuleKind::Composite(composite) => {
      assert_eq!(composite.port_map.len(), 1);
      assert_eq!(composite.port_map[0], (renamed, original));
    },
    | ModuleKind::Atomic(_) => panic!("nesting must produce a composite"),
  }
}

#[test]
fn fuse_connects_open_ports_and_closes_the_shape() {
  let source = source_module("numbers");
  let sink = sink_module("drain");
  let from = source.shape().outlets()[0].id();
  let to = sink.shape().inlets()[0].id();
  let fused = source
    .fuse(sink, from, to, MatCombine::KeepLeft, keep_left_combiner())
    .expect("ports are open");
  assert!(fused.shape().is_closed());
}

#[test]
fn fuse_rejects_ports_the_children_do_not_expose() {
  let source = source_module("numbers");
  let sink = sink_module("drain");
  let stranger = source_module("other");
  let from = stranger.shape().outlets()[0].id();
  let to = sink.shape().inlets()[0].id();
  let result = source.fuse(sink, from, to, MatCombine::KeepLeft, keep_left_combiner());
  assert!(matches!(result, Err(StreamError::InvalidConnection)));
}

#[test]
fn fused_ports_cannot_be_reused() {
  let source = source_module("numbers");
  let other = source_module("letters");
  let sink = sink_module("drain");
  let from = source.shape().outlets()[0].id();
  let spare = other.shape().outlets()[0].id();
  let to = sink.shape().inlets()[0].id();
  let partial = source
    .fuse(sink, from, to, MatCombine::KeepLeft, keep_left_combiner())
    .expect("ports are open");
  let fused = partial
    .fuse(other, spare, to, MatCombine::KeepLeft, keep_left_combiner());
  // `to` was consumed by the first fuse, so the second wiring is invalid
  assert!(matches!(fused, Err(StreamError::InvalidConnection)));
}

#[test]
fn with_attributes_appends_innermost() {
  let module = source_module("numbers").with_attributes(Attributes::named("renamed"));
  assert_eq!(module.attributes().name(), Some("renamed"));
  assert_eq!(module.attributes().entries().len(), 2);
}

#[test]
fn transform_materialized_value_is_recorded() {
  let module = source_module("numbers").transform_materialized_value(|mat| Ok(mat));
  assert_eq!(module.transforms().len(), 1);
}
