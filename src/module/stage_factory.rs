use super::MaterializationContext;
use crate::{
  dyn_value::MatValue,
  protocol::{DynPublisher, DynSubscriber},
  stream_error::StreamError,
};

/// Live endpoints and materialized value contributed by one leaf module.
///
/// Publishers are listed in the leaf shape's outlet order and subscribers in
/// its inlet order; the materializer zips them with the shape's ports.
pub struct StageParts {
  publishers:  Vec<DynPublisher>,
  subscribers: Vec<DynSubscriber>,
  mat:         MatValue,
}

impl StageParts {
  /// Creates parts with explicit endpoint lists.
  #[must_use]
  pub fn new(publishers: Vec<DynPublisher>, subscribers: Vec<DynSubscriber>, mat: MatValue) -> Self {
    Self { publishers, subscribers, mat }
  }

  /// Creates the parts of a single-outlet source leaf.
  #[must_use]
  pub fn source(publisher: DynPublisher, mat: MatValue) -> Self {
    Self::new(vec![publisher], Vec::new(), mat)
  }

  /// Creates the parts of a single-inlet sink leaf.
  #[must_use]
  pub fn sink(subscriber: DynSubscriber, mat: MatValue) -> Self {
    Self::new(Vec::new(), vec![subscriber], mat)
  }

  pub(crate) fn into_parts(self) -> (Vec<DynPublisher>, Vec<DynSubscriber>, MatValue) {
    (self.publishers, self.subscribers, self.mat)
  }
}

/// Stage construction hook of a leaf module.
///
/// Invoked once per materialization; must construct fresh runtime state every
/// time so independent materializations never share mutable state.
pub trait StageFactory: Send + Sync {
  /// Builds the leaf's live endpoints.
  ///
  /// # Errors
  ///
  /// Returns a [`StreamError`] when the stage cannot be constructed; the
  /// materializer then aborts and tears down every already-built stage.
  fn create(&self, context: &MaterializationContext) -> Result<StageParts, StreamError>;
}

impl<F> StageFactory for F
where
  F: Fn(&MaterializationContext) -> Result<StageParts, StreamError> + Send + Sync,
{
  fn create(&self, context: &MaterializationContext) -> Result<StageParts, StreamError> {
    self(context)
  }
}
