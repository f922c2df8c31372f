//! Type-erased element and materialized-value representations.
//!
//! The module graph is wired dynamically, so elements travel as shared
//! `DynValue`s (cheap to hand to several downstreams) and materialized values
//! as boxed `MatValue`s. Typed edges convert at the boundary.

use std::{any::Any, sync::Arc};

use crate::stream_error::StreamError;

/// Marker for element types usable at typed stream edges.
pub trait Element: Clone + Send + Sync + 'static {}

impl<T> Element for T where T: Clone + Send + Sync + 'static {}

/// Type-erased stream element, shared so fan-out stages can hand one element
/// to several downstreams.
pub type DynValue = Arc<dyn Any + Send + Sync>;

/// Type-erased materialized value.
pub type MatValue = Box<dyn Any + Send>;

/// Wraps a typed element for transport through the dynamic graph layer.
#[must_use]
pub fn dyn_value<T: Element>(value: T) -> DynValue {
  Arc::new(value)
}

/// Recovers a typed element from the dynamic representation.
///
/// # Errors
///
/// Returns `StreamError::ElementTypeMismatch` when the element is not a `T`.
pub fn downcast_value<T: Element>(value: DynValue) -> Result<T, StreamError> {
  match value.downcast::<T>() {
    | Ok(shared) => Ok(Arc::try_unwrap(shared).unwrap_or_else(|kept| (*kept).clone())),
    | Err(_) => Err(StreamError::ElementTypeMismatch),
  }
}

/// Recovers a typed materialized value from the dynamic representation.
///
/// # Errors
///
/// Returns `StreamError::MatTypeMismatch` when the value is not a `T`.
pub fn downcast_mat<T: 'static>(mat: MatValue) -> Result<T, StreamError> {
  match mat.downcast::<T>() {
    | Ok(boxed) => Ok(*boxed),
    | Err(_) => Err(StreamError::MatTypeMismatch),
  }
}
