use std::sync::{Arc, Mutex};

use super::StreamMaterializer;
use crate::{
  attributes::Attributes,
  completion::Completion,
  dyn_value::DynValue,
  lock::lock_unpoisoned,
  materializer::Materializer,
  module::{MaterializationContext, StageFactory, StageParts, StreamModule},
  protocol::{Subscriber, SubscriptionRef},
  runnable_graph::RunnableGraph,
  shape::{Inlet, SinkShape},
  stage::{Sink, Source},
  stream_done::StreamDone,
  stream_error::StreamError,
  stream_not_used::StreamNotUsed,
};

fn started() -> StreamMaterializer {
  let mut materializer = StreamMaterializer::new();
  materializer.start().expect("starts once");
  materializer
}

#[derive(Default)]
struct Recording {
  events: Mutex<Vec<String>>,
}

impl Recording {
  fn push(&self, event: impl Into<String>) {
    lock_unpoisoned(&self.events).push(event.into());
  }

  fn snapshot(&self) -> Vec<String> {
    lock_unpoisoned(&self.events).clone()
  }
}

struct RecordingSubscriber {
  recording: Arc<Recording>,
}

impl Subscriber<DynValue> for RecordingSubscriber {
  fn on_subscribe(&self, _subscription: SubscriptionRef) {
    self.recording.push("subscribe");
  }

  fn on_next(&self, _element: DynValue) {
    self.recording.push("next");
  }

  fn on_complete(&self) {
    self.recording.push("complete");
  }

  fn on_error(&self, cause: StreamError) {
    self.recording.push(format!("error: {cause}"));
  }
}

fn recording_sink_module(recording: Arc<Recording>) -> StreamModule {
  let shape = SinkShape::new(Inlet::<u32>::new("recording.in")).shape();
  let factory: Arc<dyn StageFactory> = Arc::new(move |_context: &MaterializationContext| -> Result<StageParts, StreamError> {
    Ok(StageParts::sink(
      Arc::new(RecordingSubscriber { recording: recording.clone() }),
      Box::new(StreamNotUsed),
    ))
  });
  StreamModule::atomic(shape, Attributes::named("recording"), factory)
}

fn failing_source_module() -> StreamModule {
  let shape = crate::shape::SourceShape::new(crate::shape::Outlet::<u32>::new("failing.out")).shape();
  let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
    Err(StreamError::failure("boom"))
  });
  StreamModule::atomic(shape, Attributes::named("failing"), factory)
}

#[test]
fn materialize_requires_start() {
  let mut materializer = StreamMaterializer::new();
  let graph = Source::<u32, _>::completed().to(Sink::cancelled());
  assert_eq!(graph.run(&mut materializer).err(), Some(StreamError::MaterializerNotStarted));
}

#[test]
fn start_is_not_reentrant() {
  let mut materializer = started();
  assert_eq!(materializer.start(), Err(StreamError::MaterializerAlreadyStarted));
}

#[test]
fn shutdown_requires_start() {
  let mut materializer = StreamMaterializer::new();
  assert_eq!(materializer.shutdown(), Err(StreamError::MaterializerNotStarted));
}

#[test]
fn shutdown_is_terminal() {
  let mut materializer = started();
  materializer.shutdown().expect("stops once");
  assert_eq!(materializer.shutdown(), Err(StreamError::MaterializerStopped));
  assert_eq!(materializer.start(), Err(StreamError::MaterializerStopped));
  let graph = Source::<u32, _>::completed().to(Sink::cancelled());
  assert_eq!(graph.run(&mut materializer).err(), Some(StreamError::MaterializerStopped));
}

#[test]
fn materializes_a_closed_graph_end_to_end() {
  let mut materializer = started();
  let completion = Source::<u32, _>::completed()
    .run_with(Sink::ignore(), &mut materializer)
    .expect("materializes");
  assert!(matches!(completion.poll(), Completion::Ready(Ok(StreamDone))));
}

#[test]
fn materialized_value_transforms_apply() {
  let mut materializer = started();
  let value = Source::<u32, _>::completed()
    .map_materialized_value(|_| 7u32)
    .to(Sink::cancelled())
    .run(&mut materializer)
    .expect("materializes");
  assert_eq!(value, 7);
}

#[test]
fn failing_stage_aborts_and_tears_down_built_stages() {
  let mut materializer = started();
  let recording = Arc::new(Recording::default());
  let sink = recording_sink_module(recording.clone());
  let source = failing_source_module();
  let from = source.shape().outlets()[0].id();
  let to = sink.shape().inlets()[0].id();
  let module = sink
    .fuse(source, from, to, crate::mat_combine::MatCombine::KeepLeft, Arc::new(|left, _| Ok(left)))
    .expect("ports are open");
  let graph = RunnableGraph::<StreamNotUsed>::from_module(module).expect("closed shape");
  assert_eq!(graph.run(&mut materializer).err(), Some(StreamError::failure("boom")));
  assert_eq!(recording.snapshot(), vec!["subscribe".to_string(), "error: materialization aborted".to_string()]);
}

#[test]
fn open_graphs_are_rejected_before_materialization() {
  let source = Source::<u32, StreamNotUsed>::completed();
  let result = RunnableGraph::<StreamNotUsed>::from_module(source.into_module());
  assert!(matches!(result, Err(StreamError::InvalidConnection)));
}
