use crate::port_id::PortId;

/// Untyped reference to a port: its identity plus debug name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRef {
  id:   PortId,
  name: String,
}

impl PortRef {
  /// Creates a port reference.
  #[must_use]
  pub fn new(id: PortId, name: impl Into<String>) -> Self {
    Self { id, name: name.into() }
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
}

/// Ordered collections of the open inlets and outlets of a stage or
/// composite graph. Immutable once built; nesting copies it with fresh port
/// identities via [`Shape::carbon_copy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
  inlets:  Vec<PortRef>,
  outlets: Vec<PortRef>,
}

impl Shape {
  /// Creates a shape from explicit port lists.
  #[must_use]
  pub fn new(inlets: Vec<PortRef>, outlets: Vec<PortRef>) -> Self {
    Self { inlets, outlets }
  }

  /// Creates a shape without any open ports.
  #[must_use]
  pub const fn closed() -> Self {
    Self { inlets: Vec::new(), outlets: Vec::new() }
  }

  /// Returns the open inlets in declaration order.
  #[must_use]
  pub fn inlets(&self) -> &[PortRef] {
    &self.inlets
  }

  /// Returns the open outlets in declaration order.
  #[must_use]
  pub fn outlets(&self) -> &[PortRef] {
    &self.outlets
  }

  /// Returns `true` when the shape has no open ports.
  #[must_use]
  pub fn is_closed(&self) -> bool {
    self.inlets.is_empty() && self.outlets.is_empty()
  }

  /// Returns `true` when `id` is one of the open inlets.
  #[must_use]
  pub fn has_inlet(&self, id: PortId) -> bool {
    self.inlets.iter().any(|port| port.id() == id)
  }

  /// Returns `true` when `id` is one of the open outlets.
  #[must_use]
  pub fn has_outlet(&self, id: PortId) -> bool {
    self.outlets.iter().any(|port| port.id() == id)
  }

  /// Copies the shape with fresh port identities, keeping names.
  ///
  /// Returns the new shape together with the `(fresh, original)` identity
  /// pairs, so a nesting module can route its outer ports to the child's.
  #[must_use]
  pub fn carbon_copy(&self) -> (Self, Vec<(PortId, PortId)>) {
    let mut mapping = Vec::with_capacity(self.inlets.len() + self.outlets.len());
    let copy_ports = |ports: &[PortRef], mapping: &mut Vec<(PortId, PortId)>| {
      ports
        .iter()
        .map(|port| {
          let fresh = PortId::next();
          mapping.push((fresh, port.id()));
          PortRef::new(fresh, port.name())
        })
        .collect::<Vec<_>>()
    };
    let inlets = copy_ports(&self.inlets, &mut mapping);
    let outlets = copy_ports(&self.outlets, &mut mapping);
    (Self { inlets, outlets }, mapping)
  }
}
