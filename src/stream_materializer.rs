//! Default materializer implementation.

#[cfg(test)]
mod tests;

use std::{collections::HashMap, sync::Arc};

use crate::{
  attributes::Attributes,
  dyn_value::{downcast_mat, MatValue},
  materializer::Materializer,
  module::{MatRecipe, MaterializationContext, ModuleKind, StreamModule},
  port_id::PortId,
  protocol::{CancelledSubscription, DynPublisher, DynSubscriber},
  runnable_graph::RunnableGraph,
  stream_error::StreamError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaterializerState {
  Idle,
  Running,
  Stopped,
}

/// Materializer that walks the module tree, constructs every leaf stage and
/// wires internal connections through the `subscribe` handshake.
///
/// Wiring happens only after the whole tree constructed successfully, so a
/// failing construction hook never leaves another stage subscribed.
pub struct StreamMaterializer {
  state: MaterializerState,
}

#[derive(Default)]
struct PendingWiring {
  links:       Vec<(DynPublisher, DynSubscriber)>,
  subscribers: Vec<DynSubscriber>,
}

struct BuiltModule {
  publishers:  HashMap<PortId, DynPublisher>,
  subscribers: HashMap<PortId, DynSubscriber>,
  mat:         MatValue,
}

impl StreamMaterializer {
  /// Creates a materializer in the idle state.
  #[must_use]
  pub const fn new() -> Self {
    Self { state: MaterializerState::Idle }
  }

  fn build(module: &StreamModule, inherited: &Attributes, pending: &mut PendingWiring) -> Result<BuiltModule, StreamError> {
    let effective = inherited.clone().and(module.attributes().clone());
    match module.kind() {
      | ModuleKind::Atomic(factory) => {
        let context = MaterializationContext::new(effective);
        tracing::debug!(stage = context.name_or("anonymous"), "materializing stage");
        let parts = factory.create(&context)?;
        let (publishers, subscribers, mat) = parts.into_parts();
        let shape = module.shape();
        if publishers.len() != shape.outlets().len() || subscribers.len() != shape.inlets().len() {
          tracing::error!(stage = context.name_or("anonymous"), "stage produced endpoints not matching its shape");
          return Err(StreamError::InvalidConnection);
        }
        pending.subscribers.extend(subscribers.iter().cloned());
        let publishers = shape.outlets().iter().map(|port| port.id()).zip(publishers).collect();
        let subscribers = shape.inlets().iter().map(|port| port.id()).zip(subscribers).collect();
        Self::apply_transforms(module, BuiltModule { publishers, subscribers, mat })
      },
      | ModuleKind::Composite(composite) => {
        let mut publishers: HashMap<PortId, DynPublisher> = HashMap::new();
        let mut subscribers: HashMap<PortId, DynSubscriber> = HashMap::new();
        let mut mats = Vec::with_capacity(composite.children.len());
        for child in &composite.children {
          let built = Self::build(child, &effective, pending)?;
          publishers.extend(built.publishers);
          subscribers.extend(built.subscribers);
          mats.push(built.mat);
        }
        for connection in &composite.connections {
          let publisher = publishers.get(&connection.from).ok_or(StreamError::InvalidConnection)?.clone();
          let subscriber = subscribers.get(&connection.to).ok_or(StreamError::InvalidConnection)?.clone();
          pending.links.push((publisher, subscriber));
        }
        let mat = Self::combine_mats(&composite.mat, mats)?;
        let mut outer_publishers = HashMap::with_capacity(composite.port_map.len());
        let mut outer_subscribers = HashMap::new();
        for (outer, inner) in &composite.port_map {
          if let Some(publisher) = publishers.get(inner) {
            outer_publishers.insert(*outer, publisher.clone());
          }
          if let Some(subscriber) = subscribers.get(inner) {
            outer_subscribers.insert(*outer, subscriber.clone());
          }
        }
        Self::apply_transforms(module, BuiltModule {
          publishers:  outer_publishers,
          subscribers: outer_subscribers,
          mat,
        })
      },
    }
  }

  fn combine_mats(recipe: &MatRecipe, mut mats: Vec<MatValue>) -> Result<MatValue, StreamError> {
    match recipe {
      | MatRecipe::Single => mats.pop().ok_or(StreamError::InvalidConnection),
      | MatRecipe::Combine(kind, combiner) => {
        if mats.len() != 2 {
          return Err(StreamError::InvalidConnection);
        }
        let right = mats.pop().ok_or(StreamError::InvalidConnection)?;
        let left = mats.pop().ok_or(StreamError::InvalidConnection)?;
        tracing::debug!(combine = ?kind, "combining materialized values");
        combiner(left, right)
      },
    }
  }

  fn apply_transforms(module: &StreamModule, mut built: BuiltModule) -> Result<BuiltModule, StreamError> {
    for transform in module.transforms() {
      built.mat = transform(built.mat)?;
    }
    Ok(built)
  }

  fn teardown(pending: PendingWiring, cause: &StreamError) {
    tracing::error!(error = %cause, "materialization aborted, tearing down constructed stages");
    for subscriber in pending.subscribers {
      subscriber.on_subscribe(Arc::new(CancelledSubscription::new()));
      subscriber.on_error(StreamError::MaterializationAborted);
    }
  }
}

impl Default for StreamMaterializer {
  fn default() -> Self {
    Self::new()
  }
}

impl Materializer for StreamMaterializer {
  fn start(&mut self) -> Result<(), StreamError> {
    match self.state {
      | MaterializerState::Running => Err(StreamError::MaterializerAlreadyStarted),
      | MaterializerState::Stopped => Err(StreamError::MaterializerStopped),
      | MaterializerState::Idle => {
        self.state = MaterializerState::Running;
        Ok(())
      },
    }
  }

  fn materialize<Mat: 'static>(&mut self, graph: RunnableGraph<Mat>) -> Result<Mat, StreamError> {
    match self.state {
      | MaterializerState::Idle => return Err(StreamError::MaterializerNotStarted),
      | MaterializerState::Stopped => return Err(StreamError::MaterializerStopped),
      | MaterializerState::Running => {},
    }
    let module = graph.into_module();
    let mut pending = PendingWiring::default();
    match Self::build(&module, &Attributes::new(), &mut pending) {
      | Ok(built) => {
        for (publisher, subscriber) in pending.links {
          publisher.subscribe(subscriber);
        }
        downcast_mat::<Mat>(built.mat)
      },
      | Err(cause) => {
        Self::teardown(pending, &cause);
        Err(cause)
      },
    }
  }

  fn shutdown(&mut self) -> Result<(), StreamError> {
    match self.state {
      | MaterializerState::Idle => Err(StreamError::MaterializerNotStarted),
      | MaterializerState::Stopped => Err(StreamError::MaterializerStopped),
      | MaterializerState::Running => {
        self.state = MaterializerState::Stopped;
        Ok(())
      },
    }
  }
}
