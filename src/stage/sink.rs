use core::marker::PhantomData;
use std::{sync::Arc, time::Duration};

use super::{CancelSink, FanoutPublisherSink, HeadSink, IgnoreSink, MailboxSignal, MailboxSink, PublisherSink, QueueSink, SinkQueue, Source};
use crate::{
  attributes::Attributes,
  dyn_value::{downcast_mat, Element, MatValue},
  keep_right::KeepRight,
  materializer::Materializer,
  module::{MaterializationContext, StageFactory, StageParts, StreamModule},
  protocol::{DynPublisher, PublisherRef, SubscriberRef, TypedPublisher, TypedSubscriber},
  shape::{Inlet, SinkShape},
  stream_completion::StreamCompletion,
  stream_done::StreamDone,
  stream_dsl_error::StreamDslError,
  stream_error::StreamError,
  stream_not_used::StreamNotUsed,
  validate_positive_argument::validate_positive_argument,
};

/// Default deadline applied to queue sink pulls.
pub const DEFAULT_PULL_TIMEOUT: Duration = Duration::from_secs(5);

/// Consumer endpoint of a stream of `In` values, materializing a `Mat`.
///
/// A sink is a description; nothing runs until a graph containing it is
/// handed to a materializer. Using a sink in a composition consumes it.
pub struct Sink<In, Mat> {
  module: StreamModule,
  _pd:    PhantomData<fn(In) -> Mat>,
}

impl<In: Element, Mat> Sink<In, Mat> {
  pub(crate) fn from_factory(name: &str, factory: Arc<dyn StageFactory>) -> Self {
    let shape = SinkShape::new(Inlet::<In>::new(format!("{name}.in"))).shape();
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

  /// Returns a sink with `attributes` merged in, innermost winning.
  #[must_use]
  pub fn with_attributes(self, attributes: Attributes) -> Self {
    Self { module: self.module.with_attributes(attributes), _pd: PhantomData }
  }

  /// Returns a sink carrying `name` as its innermost name attribute.
  #[must_use]
  pub fn named(self, name: impl Into<String>) -> Self {
    self.with_attributes(Attributes::named(name))
  }

  /// Returns a sink whose materialized value is `f` applied to this sink's.
  #[must_use]
  pub fn map_materialized_value<Mat2, F>(self, f: F) -> Sink<In, Mat2>
  where
    Mat: Send + 'static,
    Mat2: Send + 'static,
    F: Fn(Mat) -> Mat2 + Send + Sync + 'static, {
    let module = self
      .module
      .transform_materialized_value(move |mat| Ok(Box::new(f(downcast_mat::<Mat>(mat)?)) as MatValue));
    Sink { module, _pd: PhantomData }
  }

  /// Connects `source` to this sink and materializes the closed graph,
  /// keeping this sink's materialized value.
  ///
  /// # Errors
  ///
  /// Propagates materializer lifecycle and stage construction errors.
  pub fn run_with<SrcMat>(self, source: Source<In, SrcMat>, materializer: &mut impl Materializer) -> Result<Mat, StreamError>
  where
    Mat: Send + 'static,
    SrcMat: Send + 'static, {
    source.to_mat::<Mat, KeepRight>(self).run(materializer)
  }
}

impl<In: Element> Sink<In, StreamCompletion<StreamDone>> {
  /// Sink that requests unbounded demand and discards every element.
  ///
  /// Materializes a completion resolved when the stream ends.
  #[must_use]
  pub fn ignore() -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      let completion = StreamCompletion::new();
      let sink = Arc::new(IgnoreSink::new(completion.clone()));
      Ok(StageParts::sink(sink, Box::new(completion)))
    });
    Self::from_factory("ignore-sink", factory)
  }
}

impl<In: Element> Sink<In, StreamCompletion<In>> {
  /// Sink that requests one element, resolves its completion with it and
  /// cancels the rest of the stream.
  ///
  /// An empty stream resolves the completion with [`StreamError::NoElement`].
  #[must_use]
  pub fn head() -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      let completion = StreamCompletion::new();
      let sink = Arc::new(HeadSink::<In>::new(completion.clone()));
      Ok(StageParts::sink(sink, Box::new(completion)))
    });
    Self::from_factory("head-sink", factory)
  }
}

impl<In: Element> Sink<In, StreamNotUsed> {
  /// Sink that cancels its upstream during the handshake.
  #[must_use]
  pub fn cancelled() -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      Ok(StageParts::sink(Arc::new(CancelSink::new()), Box::new(StreamNotUsed)))
    });
    Self::from_factory("cancelled-sink", factory)
  }

  /// Sink that forwards every signal verbatim to an externally provided
  /// subscriber.
  ///
  /// The subscriber is driven by the stream's publisher side; demand and
  /// cancellation it signals flow upstream untouched.
  #[must_use]
  pub fn from_subscriber(subscriber: SubscriberRef<In>) -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(move |_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      Ok(StageParts::sink(
        Arc::new(TypedSubscriber::new(subscriber.clone())),
        Box::new(StreamNotUsed),
      ))
    });
    Self::from_factory("subscriber-sink", factory)
  }

  /// Sink that forwards elements and terminal signals to `target` as
  /// [`MailboxSignal`] values, completing with `on_complete`.
  ///
  /// Keeps a sliding window of `buffer` outstanding elements.
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError::InvalidArgument`] when `buffer` is zero.
  pub fn mailbox<M>(
    target: tokio::sync::mpsc::UnboundedSender<MailboxSignal<In, M>>,
    on_complete: M,
    buffer: usize,
  ) -> Result<Self, StreamDslError>
  where
    M: Clone + Send + Sync + 'static, {
    let buffer = validate_positive_argument("buffer", buffer)? as u64;
    let factory: Arc<dyn StageFactory> = Arc::new(move |_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      let sink = Arc::new(MailboxSink::new(target.clone(), on_complete.clone(), buffer));
      Ok(StageParts::sink(sink, Box::new(StreamNotUsed)))
    });
    Ok(Self::from_factory("mailbox-sink", factory))
  }
}

impl<In: Element> Sink<In, PublisherRef<In>> {
  /// Sink that materializes the consumed stream as a publisher accepting
  /// exactly one external subscriber.
  ///
  /// Demand from that subscriber is forwarded verbatim upstream; a second
  /// subscriber is rejected with [`StreamError::AlreadySubscribed`].
  #[must_use]
  pub fn publisher() -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(|_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      let sink = Arc::new(PublisherSink::new());
      let dyn_publisher: DynPublisher = sink.clone();
      let publisher: PublisherRef<In> = Arc::new(TypedPublisher::new(dyn_publisher));
      Ok(StageParts::sink(sink, Box::new(publisher)))
    });
    Self::from_factory("publisher-sink", factory)
  }

  /// Sink that materializes the consumed stream as a publisher accepting any
  /// number of external subscribers.
  ///
  /// Prefetches up to `initial` elements before the first subscriber and
  /// buffers at most `max` undelivered elements; upstream demand follows the
  /// slowest subscriber. The bounds can be overridden per materialization
  /// through [`Attributes::input_buffer`].
  ///
  /// # Errors
  ///
  /// Returns [`StreamDslError::InvalidArgument`] when `initial` is zero or
  /// `max` is below `initial`.
  pub fn fanout_publisher(initial: usize, max: usize) -> Result<Self, StreamDslError> {
    let initial = validate_positive_argument("initial", initial)?;
    if max < initial {
      return Err(StreamDslError::InvalidArgument {
        name:   "max",
        value:  max,
        reason: "must be at least the initial buffer size",
      });
    }
    let factory: Arc<dyn StageFactory> = Arc::new(move |context: &MaterializationContext| -> Result<StageParts, StreamError> {
      let (initial, max) = context.buffer_bounds_or(initial, max);
      if initial == 0 || max < initial {
        return Err(StreamError::failure("fan-out buffer attribute out of range"));
      }
      let sink = Arc::new(FanoutPublisherSink::new(initial as u64, max as u64));
      let dyn_publisher: DynPublisher = sink.clone();
      let publisher: PublisherRef<In> = Arc::new(TypedPublisher::new(dyn_publisher));
      Ok(StageParts::sink(sink, Box::new(publisher)))
    });
    Ok(Self::from_factory("fanout-publisher-sink", factory))
  }
}

impl<In: Element> Sink<In, SinkQueue<In>> {
  /// Sink that materializes a pull queue with the default pull timeout.
  ///
  /// `buffer_size` elements are prefetched and kept available; a zero buffer
  /// requests lazily, one element per pull.
  #[must_use]
  pub fn queue(buffer_size: usize) -> Self {
    Self::queue_within(buffer_size, DEFAULT_PULL_TIMEOUT)
  }

  /// Sink that materializes a pull queue whose pulls wait up to `timeout`.
  #[must_use]
  pub fn queue_within(buffer_size: usize, timeout: Duration) -> Self {
    let factory: Arc<dyn StageFactory> = Arc::new(move |_context: &MaterializationContext| -> Result<StageParts, StreamError> {
      let (sink, queue) = QueueSink::<In>::new(buffer_size as u64, timeout);
      Ok(StageParts::sink(Arc::new(sink), Box::new(queue)))
    });
    Self::from_factory("queue-sink", factory)
  }
}
