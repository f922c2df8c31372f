use core::marker::PhantomData;

use crate::{materializer::Materializer, module::StreamModule, stream_error::StreamError};

/// Fully-closed graph description ready to be materialized.
pub struct RunnableGraph<Mat> {
  module: StreamModule,
  _pd:    PhantomData<fn() -> Mat>,
}

impl<Mat: 'static> RunnableGraph<Mat> {
  pub(crate) const fn new(module: StreamModule) -> Self {
    Self { module, _pd: PhantomData }
  }

  /// Wraps a module as a runnable graph.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::InvalidConnection` when the module still has open
  /// ports.
  pub fn from_module(module: StreamModule) -> Result<Self, StreamError> {
    if !module.shape().is_closed() {
      return Err(StreamError::InvalidConnection);
    }
    Ok(Self::new(module))
  }

  /// Returns the underlying module description.
  #[must_use]
  pub const fn module(&self) -> &StreamModule {
    &self.module
  }

  pub(crate) fn into_module(self) -> StreamModule {
    self.module
  }

  /// Materializes the graph with `materializer`.
  ///
  /// # Errors
  ///
  /// Propagates materializer lifecycle and stage construction errors.
  pub fn run(self, materializer: &mut impl Materializer) -> Result<Mat, StreamError> {
    materializer.materialize(self)
  }
}
