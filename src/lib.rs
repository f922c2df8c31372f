//! Demand-driven stream processing core.
//!
//! Streams are described as immutable blueprints ([`Source`]s, [`Sink`]s and
//! the [`module`] graph underneath them) and brought to life by a
//! [`Materializer`]. Running stages talk to each other exclusively through the
//! [`protocol`] handshake: cumulative demand flows upstream, elements and one
//! terminal signal flow downstream, and cancellation severs a link at any
//! time.
//!
//! ```
//! use rillflow::{Materializer, Source, StreamError, StreamMaterializer, testing};
//!
//! # fn main() -> Result<(), StreamError> {
//! let mut materializer = StreamMaterializer::new();
//! materializer.start()?;
//!
//! let probe = Source::<u32, _>::completed().run_with(testing::probe_sink(), &mut materializer)?;
//! probe.expect_subscription();
//! probe.request(1);
//! probe.expect_complete();
//!
//! materializer.shutdown()?;
//! # Ok(())
//! # }
//! ```

/// Stage and graph configuration attributes.
mod attributes;
/// Poll-or-ready view of a pending result.
mod completion;
/// Outstanding demand representation.
mod demand;
/// Cumulative demand accounting.
mod demand_tracker;
/// Type-erased element and materialized-value representations.
mod dyn_value;
/// Keep-both materialized value rule.
mod keep_both;
/// Keep-left materialized value rule.
mod keep_left;
/// Keep-none materialized value rule.
mod keep_none;
/// Keep-right materialized value rule.
mod keep_right;
/// Poison-tolerant locking helper.
mod lock;
/// Materialized value combination kinds.
mod mat_combine;
/// Type-level materialized value combination rules.
mod mat_combine_rule;
/// Materializer contract.
mod materializer;
/// Structural graph description layer.
pub mod module;
/// Port identity.
mod port_id;
/// The demand protocol between running stages.
pub mod protocol;
/// Closed graph descriptions.
mod runnable_graph;
/// Typed port topologies.
pub mod shape;
/// Built-in terminal stages.
mod stage;
/// One-shot completion cell for materialized futures.
mod stream_completion;
/// Completion marker value.
mod stream_done;
/// Graph construction errors.
mod stream_dsl_error;
/// Runtime stream errors.
mod stream_error;
/// Default materializer.
mod stream_materializer;
/// Absent materialized value marker.
mod stream_not_used;
/// Probe instrumentation for protocol-level tests.
pub mod testing;
/// Construction argument validation.
mod validate_positive_argument;

pub use attributes::{Attribute, Attributes};
pub use completion::Completion;
pub use demand::Demand;
pub use demand_tracker::DemandTracker;
pub use dyn_value::{downcast_mat, downcast_value, dyn_value, DynValue, Element, MatValue};
pub use keep_both::KeepBoth;
pub use keep_left::KeepLeft;
pub use keep_none::KeepNone;
pub use keep_right::KeepRight;
pub use mat_combine::MatCombine;
pub use mat_combine_rule::MatCombineRule;
pub use materializer::Materializer;
pub use port_id::PortId;
pub use runnable_graph::RunnableGraph;
pub use stage::{MailboxSignal, Sink, SinkQueue, Source, DEFAULT_PULL_TIMEOUT};
pub use stream_completion::StreamCompletion;
pub use stream_done::StreamDone;
pub use stream_dsl_error::StreamDslError;
pub use stream_error::StreamError;
pub use stream_materializer::StreamMaterializer;
pub use stream_not_used::StreamNotUsed;
pub use validate_positive_argument::validate_positive_argument;
