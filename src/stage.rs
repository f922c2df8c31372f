//! Built-in terminal stages and their typed wrappers.

#[cfg(test)]
mod tests;

/// Immediate-cancel sink runtime.
mod cancel_sink;
/// Fan-out publisher sink runtime.
mod fanout_publisher_sink;
/// Single-value-future sink runtime.
mod head_sink;
/// Discarding sink runtime.
mod ignore_sink;
/// Mailbox-forwarding sink runtime.
mod mailbox_sink;
/// Single-downstream publisher sink runtime.
mod publisher_sink;
/// Pull-queue sink runtime.
mod queue_sink;
/// Typed sink catalogue.
mod sink;
/// Typed source catalogue.
mod source;

pub use mailbox_sink::MailboxSignal;
pub use queue_sink::SinkQueue;
pub use sink::{Sink, DEFAULT_PULL_TIMEOUT};
pub use source::Source;

pub(crate) use cancel_sink::CancelSink;
pub(crate) use fanout_publisher_sink::FanoutPublisherSink;
pub(crate) use head_sink::HeadSink;
pub(crate) use ignore_sink::IgnoreSink;
pub(crate) use mailbox_sink::MailboxSink;
pub(crate) use publisher_sink::PublisherSink;
pub(crate) use queue_sink::QueueSink;
