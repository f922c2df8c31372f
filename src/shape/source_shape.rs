use super::{Outlet, Shape};

/// Shape with zero inlets and one outlet.
#[derive(Debug, Clone)]
pub struct SourceShape<T> {
  outlet: Outlet<T>,
}

impl<T> SourceShape<T> {
  /// Creates a source shape around `outlet`.
  #[must_use]
  pub const fn new(outlet: Outlet<T>) -> Self {
    Self { outlet }
  }

  /// Returns the single outlet.
  #[must_use]
  pub const fn outlet(&self) -> &Outlet<T> {
    &self.outlet
  }

  /// Returns the dynamic shape.
  #[must_use]
  pub fn shape(&self) -> Shape {
    Shape::new(Vec::new(), vec![self.outlet.port()])
  }
}
