use std::sync::Arc;

use super::StageFactory;
use crate::{
  attributes::Attributes,
  dyn_value::MatValue,
  mat_combine::MatCombine,
  port_id::PortId,
  shape::Shape,
  stream_error::StreamError,
};

/// Description-time transformation applied to a materialized value.
pub(crate) type MatTransform = dyn Fn(MatValue) -> Result<MatValue, StreamError> + Send + Sync;

/// Combines the materialized values of two fused children.
pub(crate) type MatCombiner = dyn Fn(MatValue, MatValue) -> Result<MatValue, StreamError> + Send + Sync;

/// One internal outlet-to-inlet wiring of a composite module.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Connection {
  pub(crate) from: PortId,
  pub(crate) to:   PortId,
}

/// Recipe for computing a composite's materialized value from its children.
pub(crate) enum MatRecipe {
  /// Single child, value passed through.
  Single,
  /// Two children, values combined left-to-right.
  Combine(MatCombine, Arc<MatCombiner>),
}

pub(crate) struct CompositeModule {
  pub(crate) children:    Vec<StreamModule>,
  pub(crate) connections: Vec<Connection>,
  /// Routes each outer port to the child port it stands for.
  pub(crate) port_map:    Vec<(PortId, PortId)>,
  pub(crate) mat:         MatRecipe,
}

pub(crate) enum ModuleKind {
  Atomic(Arc<dyn StageFactory>),
  Composite(CompositeModule),
}

/// Structural, side-effect-free description of a stage or composite graph.
///
/// Modules are moved, never shared: using one in a composition consumes it,
/// so two uses of the "same" subgraph can never alias runtime state. Nesting
/// issues fresh port identities on top of that.
pub struct StreamModule {
  shape:      Shape,
  attributes: Attributes,
  kind:       ModuleKind,
  transforms: Vec<Arc<MatTransform>>,
}

impl StreamModule {
  /// Creates a leaf module around a stage construction hook.
  #[must_use]
  pub fn atomic(shape: Shape, attributes: Attributes, factory: Arc<dyn StageFactory>) -> Self {
    Self { shape, attributes, kind: ModuleKind::Atomic(factory), transforms: Vec::new() }
  }

  /// Returns the open ports of this module.
  #[must_use]
  pub const fn shape(&self) -> &Shape {
    &self.shape
  }

  /// Returns the attributes attached to this module.
  #[must_use]
  pub const fn attributes(&self) -> &Attributes {
    &self.attributes
  }

  /// Returns a new module with `attributes` merged in; the new entries are
  /// innermost and win on conflicting facets.
  #[must_use]
  pub fn with_attributes(mut self, attributes: Attributes) -> Self {
    self.attributes = self.attributes.and(attributes);
    self
  }

  /// Wraps this module in a composite exposing the same ports under fresh
  /// identities, so reusing the description cannot alias ports.
  #[must_use]
  pub fn nest(self) -> Self {
    let (shape, port_map) = self.shape.carbon_copy();
    Self {
      shape,
      attributes: Attributes::new(),
      kind: ModuleKind::Composite(CompositeModule {
        children: vec![self],
        connections: Vec::new(),
        port_map,
        mat: MatRecipe::Single,
      }),
      transforms: Vec::new(),
    }
  }

  /// Records a transformation applied to the materialized value during
  /// materialization. Purely a description-time annotation.
  #[must_use]
  pub fn transform_materialized_value<F>(mut self, transform: F) -> Self
  where
    F: Fn(MatValue) -> Result<MatValue, StreamError> + Send + Sync + 'static, {
    self.transforms.push(Arc::new(transform));
    self
  }

  /// Combines two modules into a composite wired `from → to`, exposing the
  /// remaining open ports of both children.
  ///
  /// # Errors
  ///
  /// Returns `StreamError::InvalidConnection` when `from` is not an open
  /// outlet or `to` is not an open inlet of the children.
  pub fn fuse(
    self,
    other: Self,
    from: PortId,
    to: PortId,
    combine: MatCombine,
    combiner: Arc<MatCombiner>,
  ) -> Result<Self, StreamError> {
    let from_open = self.shape.has_outlet(from) || other.shape.has_outlet(from);
    let to_open = self.shape.has_inlet(to) || other.shape.has_inlet(to);
    if !from_open || !to_open {
      return Err(StreamError::InvalidConnection);
    }
    Ok(self.fuse_ports(other, from, to, combine, combiner))
  }

  /// Fuses without validating the ports; used by the typed combinators, whose
  /// shapes guarantee them.
  pub(crate) fn fuse_ports(
    self,
    other: Self,
    from: PortId,
    to: PortId,
    combine: MatCombine,
    combiner: Arc<MatCombiner>,
  ) -> Self {
    let mut inlets = Vec::new();
    let mut outlets = Vec::new();
    for child in [&self, &other] {
      inlets.extend(child.shape.inlets().iter().filter(|port| port.id() != to).cloned());
      outlets.extend(child.shape.outlets().iter().filter(|port| port.id() != from).cloned());
    }
    let port_map = inlets.iter().chain(outlets.iter()).map(|port| (port.id(), port.id())).collect();

    Self {
      shape:      Shape::new(inlets, outlets),
      attributes: Attributes::new(),
      kind:       ModuleKind::Composite(CompositeModule {
        children: vec![self, other],
        connections: vec![Connection { from, to }],
        port_map,
        mat: MatRecipe::Combine(combine, combiner),
      }),
      transforms: Vec::new(),
    }
  }

  pub(crate) const fn kind(&self) -> &ModuleKind {
    &self.kind
  }

  pub(crate) fn transforms(&self) -> &[Arc<MatTransform>] {
    &self.transforms
  }
}
