use super::{Inlet, Outlet, Shape};

/// Shape with one inlet and N same-typed outlets.
#[derive(Debug, Clone)]
pub struct UniformFanOutShape<I, O> {
  inlet:   Inlet<I>,
  outlets: Vec<Outlet<O>>,
}

impl<I, O> UniformFanOutShape<I, O> {
  /// Creates a fan-out shape with `fan_out` outlets named after `name`.
  #[must_use]
  pub fn new(name: &str, fan_out: usize) -> Self {
    let inlet = Inlet::new(format!("{name}.in"));
    let outlets = (0 .. fan_out).map(|index| Outlet::new(format!("{name}.out{index}"))).collect();
    Self { inlet, outlets }
  }

  /// Returns the single inlet.
  #[must_use]
  pub const fn inlet(&self) -> &Inlet<I> {
    &self.inlet
  }

  /// Returns the outlets in port order.
  #[must_use]
  pub fn outlets(&self) -> &[Outlet<O>] {
    &self.outlets
  }

  /// Returns the dynamic shape.
  #[must_use]
  pub fn shape(&self) -> Shape {
    Shape::new(vec![self.inlet.port()], self.outlets.iter().map(Outlet::port).collect())
  }
}
