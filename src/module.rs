//! Immutable, composable descriptions of stages and subgraphs.
//!
//! Building a module never performs I/O or scheduling; every side effect is
//! deferred to materialization, so one description can be materialized many
//! times with independent runtime state.

#[cfg(test)]
mod tests;

/// Context handed to stage construction hooks.
mod materialization_context;
/// Stage construction hook and its output.
mod stage_factory;
/// The module tree itself.
mod stream_module;

pub use materialization_context::MaterializationContext;
pub use stage_factory::{StageFactory, StageParts};
pub use stream_module::StreamModule;

pub(crate) use stream_module::{MatCombiner, MatRecipe, ModuleKind};
