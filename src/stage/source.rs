use core::marker::PhantomData;
use std::sync::Arc;

use super::Sink;
use crate::{
  attributes::Attributes,
  dyn_value::{downcast_mat, DynValue, Element, MatValue},
  keep_left::KeepLeft,
  keep_right::KeepRight,
  mat_combine_rule::MatCombineRule,
  materializer::Materializer,
  module::{MatCombiner, MaterializationContext, StageFactory, StageParts, StreamModule},
  protocol::{CompletedSubscription, DynPublisher, DynSubscriber, ErasingPublisher, FailedSubscription, Publisher, PublisherRef},
  runnable_graph::RunnableGraph,
  shape::{Outlet, SourceShape},
  stream_error::StreamError,
  stream_not_used::StreamNotUsed,
};

/// Producer endpoint of a stream of `Out` values, materializing a `Mat`.
///
/// A source is a description; nothing runs until a graph containing it is
/// handed to a materializer. Using a source in a composition consumes it.
pub struct Source<Out, Mat> {
  module: StreamModule,
  _pd:    PhantomData<fn() -> (Out, Mat)>,
}

struct CompletedPublisher;

impl Publisher<DynValue> for CompletedPublisher {
  fn subscribe(&self, subscriber: DynSubscriber) {
    subscriber.on_subscribe(Arc::new(CompletedSubscription::new(subscriber.clone())));
  }
}

struct FailedPublisher {
  cause: StreamError,
}

impl Publisher<DynValue> for FailedPublisher {
  fn subscribe(&self, subscriber: DynSubscriber) {
    subscriber.on_subscribe(Arc::new(FailedSubscription::new(subscriber.clone(), self.cause.clone())));
  }
}

impl<Out: Element, Mat> Source<Out, Mat> {
  pub(crate) fn from_factory(name: &str, factory: Arc<dyn StageFactory>) -> Self {
    let shape = SourceShape::new(Outlet::<Out>::new(format!("{name}.out"))).shape();
    Self {
      module: StreamModule::atomic(shape, Attributes::named(name), factory),
      _pd:    PhantomData,
    }
  }

  /// Returns the underlying module description.
  #[must_use]
  pub const fn module(&self) -> &StreamModule {
    &self.module
  }

  pub(crate) fn into_module(self) -> StreamModule {
    self.module
  }

  /// Returns a source with `attributes` merged in, innermost winning.
  #[must_use]
  pub fn with_attributes(self, attributes: Attributes) -> Self {
    Self { module: self.module.with_attributes(attributes), _pd: PhantomData }
  }

  /// Returns a source carrying `name` as its innermost name attribute.
  #[must_use]
  pub fn named(self, name: impl Into<String>) -> Self {
    self.with_attributes(Attributes::named(name))
  }

  /// Returns a source whose materialized value is `f` applied to this
  /// source's.
  #[must_use]
  pub fn map_materialized_value<Mat2, F>(self, f: F) -> Source<Out, Mat2>
  where
    Mat: Send + 'static,
    Mat2: Send + 'static,
    F: Fn(Mat) -> Mat2 + Send + Sync + 'static, {
    let module = self
      .module
      .transform_materialized_value(move |mat| Ok(Box::new(f(downcast_mat::<Mat>(mat)?)) as MatValue));
    Source { module, _pd: PhantomData }
  }

  /// Connects this source to `sink`, keeping this source's materialized
  /// value.
  #[must_use]
  pub fn to<SinkMat>(self, sink: Sink<Out, SinkMat>) -> RunnableGraph<Mat>
  where
    Mat: Send + 'static,
    SinkMat: Send + 'static, {
    self.to_mat::<SinkMat, KeepLeft>(sink)
  }

  /// Connects this source to `sink`, combining the materialized values with
  /// `Rule`.
  #[must_use]
  pub fn to_mat<SinkMat, Rule>(self, sink: Sink<Out, SinkMat>) -> RunnableGraph<Rule::Out>
  where
    Mat: Send + 'static,
    SinkMat: Send + 'static,
    Rule: MatCombineRule<Mat, SinkMat>,
    Rule::Out: Send + 'static, {
    let source_module = self.into_module();
    let from = source_module.shape().outlets()[0].id();
    let sink_module = sink.into_module();
    let to = sink_module.shape().inlets()[0].id();
    let combiner: Arc<MatCombiner> = Arc::new(|left: MatValue, right: MatValue| {
      let left = downcast_mat::<Mat>(left)?;
      let right = downcast_mat::<SinkMat>(right)?;
      Ok(Box::new(Rule::combine(left, right)) as MatValue)
    });
    RunnableGraph::new(source_module.fuse_ports(sink_module, from, to, Rule::kind(), combiner))
  }

  /// Connects this source to `sink` and materializes the closed graph,
  /// keeping the sink's materialized value.
  ///
  /// # Errors
  ///
  /// Propagates materializer lifecycle and stage construction errors.
  pub fn run_with<SinkMat>(self, sink: Sink<Out, SinkMat>, materializer: &mut impl Materializer) -> Result<SinkMat, StreamError>
  where
    Mat: Send + 'static,
    SinkMat: Send + 'static, {
    self.to_mat::<SinkMat, KeepRight>(sink).run(materializer)
  }
}

impl<Out: Element> Source<Out, StreamNotUsed> {
  /// Source that completes immediately on first demand, emitting nothing.
  #[must_use]
  pub fn completed() -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      Ok(StageParts::source(Arc::new(CompletedPublisher), Box::new(StreamNotUsed)))
    });
    Self::from_factory("completed-source", factory)
  }

  /// Source that fails immediately on first demand with `cause`.
  #[must_use]
  pub fn failed(cause: StreamError) -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(move |_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      Ok(StageParts::source(
        Arc::new(FailedPublisher { cause: cause.clone() }),
        Box::new(StreamNotUsed),
      ))
    });
    Self::from_factory("failed-source", factory)
  }

  /// Source backed by an externally provided publisher.
  ///
  /// Each materialization subscribes the graph's consumer to `publisher`.
  #[must_use]
  pub fn from_publisher(publisher: PublisherRef<Out>) -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(move |_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      let erased: DynPublisher = Arc::new(ErasingPublisher { inner: publisher.clone() });
      Ok(StageParts::source(erased, Box::new(StreamNotUsed)))
    });
    Self::from_factory("publisher-source", factory)
  }
}
