use core::marker::PhantomData;

use super::PortRef;
use crate::port_id::PortId;

/// Typed inlet port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Inlet<T> {
  id:   PortId,
  name: String,
  _pd:  PhantomData<fn(T)>,
}

impl<T> Inlet<T> {
  /// Creates a new inlet with a debug name.
  #[must_use]
  pub fn new(name: impl Into<String>) -> Self {
    Self { id: PortId::next(), name: name.into(), _pd: PhantomData }
  }

  /// Returns the port identifier.
  #[must_use]
  pub const fn id(&self) -> PortId {
    self.id
  }

  /// Returns the debug name.
  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Returns the untyped port reference.
  #[must_use]
  pub fn port(&self) -> PortRef {
    PortRef::new(self.id, self.name.clone())
  }
}
