//! Materializer trait for running stream graphs.

use crate::{runnable_graph::RunnableGraph, stream_error::StreamError};

/// Turns graph descriptions into live, wired stages.
pub trait Materializer {
  /// Starts the materializer.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::MaterializerAlreadyStarted` if it is already
  /// running, or `StreamError::MaterializerStopped` after shutdown.
  fn start(&mut self) -> Result<(), StreamError>;

  /// Materializes a runnable graph, returning its materialized value.
  ///
  /// Materialization is all-or-nothing: when any stage fails to construct,
  /// every already-built stage is torn down and the error is returned.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::MaterializerNotStarted` before `start`, or the
  /// error raised by a failing stage construction hook.
  fn materialize<Mat: 'static>(&mut self, graph: RunnableGraph<Mat>) -> Result<Mat, StreamError>;

  /// Shuts down the materializer.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::MaterializerStopped` if it was already stopped,
  /// or `StreamError::MaterializerNotStarted` if it never ran.
  fn shutdown(&mut self) -> Result<(), StreamError>;
}
