//! Stream topology shapes and connection points.

#[cfg(test)]
mod tests;

/// Typed inlet ports.
mod inlet;
/// Typed outlet ports.
mod outlet;
/// Dynamic port collections.
#[allow(clippy::module_inception)]
mod shape;
/// One-inlet shape.
mod sink_shape;
/// One-outlet shape.
mod source_shape;
/// One-inlet, N-outlet shape.
mod uniform_fan_out_shape;

pub use inlet::Inlet;
pub use outlet::Outlet;
pub use shape::{PortRef, Shape};
pub use sink_shape::SinkShape;
pub use source_shape::SourceShape;
pub use uniform_fan_out_shape::UniformFanOutShape;
