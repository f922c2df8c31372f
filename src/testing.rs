//! Probe instrumentation for protocol-level tests.
//!
//! Probes stand in for real producers and consumers and record every protocol
//! signal they see, so tests can assert on demand, cancellation and terminal
//! ordering. They are usable standalone against any [`crate::protocol`]
//! endpoint or as graph leaves through [`probe_source`] and [`probe_sink`].


use std::time::Duration;

/// Manually driven consumer probe.
mod sink_probe;
/// Manually driven producer probe.
mod source_probe;

pub use sink_probe::{probe_sink, TestSinkProbe};
pub use source_probe::{probe_source, SourceProbeSubscription, TestSourceProbe};

/// Default deadline probes wait for an expected signal.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
