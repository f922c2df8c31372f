use super::{Inlet, Shape};

/// Shape with one inlet and zero outlets.
#[derive(Debug, Clone)]
pub struct SinkShape<T> {
  inlet: Inlet<T>,
}

impl<T> SinkShape<T> {
  /// Creates a sink shape around `inlet`.
  #[must_use]
  pub const fn new(inlet: Inlet<T>) -> Self {
    Self { inlet }
  }

  /// Returns the single inlet.
  #[must_use]
  pub const fn inlet(&self) -> &Inlet<T> {
    &self.inlet
  }

  /// Returns the dynamic shape.
  #[must_use]
  pub fn shape(&self) -> Shape {
    Shape::new(vec![self.inlet.port()], Vec::new())
  }
}
