use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;

use super::{MailboxSignal, Sink, Source};
use crate::{
  attributes::Attributes,
  completion::Completion,
  keep_both::KeepBoth,
  materializer::Materializer,
  stream_done::StreamDone,
  stream_error::StreamError,
  stream_materializer::StreamMaterializer,
  testing::{probe_sink, probe_source, TestSinkProbe, TestSourceProbe},
};

fn started() -> StreamMaterializer {
  let mut materializer = StreamMaterializer::new();
  materializer.start().expect("starts once");
  materializer
}

#[test]
fn ignore_sink_discards_everything_and_completes() {
  let mut materializer = started();
  let (source, completion) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::ignore())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  assert_eq!(link.expect_request(), u64::MAX);
  link.send_next(1);
  link.send_next(2);
  assert!(matches!(completion.poll(), Completion::Pending));
  link.send_complete();
  assert!(matches!(completion.poll(), Completion::Ready(Ok(StreamDone))));
}

#[test]
fn ignore_sink_surfaces_upstream_failure() {
  let mut materializer = started();
  let (source, completion) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::ignore())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.send_error(StreamError::failure("boom"));
  assert!(matches!(completion.poll(), Completion::Ready(Err(StreamError::Failure(_)))));
}

#[test]
fn head_sink_takes_the_first_element_and_cancels() {
  let mut materializer = started();
  let (source, completion) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::head())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_request_of(1);
  link.send_next(42);
  link.expect_cancellation();
  assert!(matches!(completion.poll(), Completion::Ready(Ok(42))));
}

#[test]
fn head_sink_reports_empty_streams() {
  let mut materializer = started();
  let (source, completion) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::head())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.send_complete();
  assert!(matches!(completion.poll(), Completion::Ready(Err(StreamError::NoElement))));
}

#[test]
fn head_sink_resolves_with_the_upstream_failure() {
  let mut materializer = started();
  let (source, completion) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::head())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.send_error(StreamError::failure("boom"));
  assert!(matches!(completion.poll(), Completion::Ready(Err(StreamError::Failure(_)))));
}

#[test]
fn cancelled_sink_cancels_during_the_handshake() {
  let mut materializer = started();
  let source = probe_source::<u32>()
    .to(Sink::cancelled())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_cancellation();
}

#[test]
fn subscriber_sink_forwards_signals_verbatim() {
  let mut materializer = started();
  let (sink_probe, subscriber) = TestSinkProbe::<u32>::probe();
  let source = probe_source::<u32>()
    .to(Sink::from_subscriber(subscriber))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  sink_probe.expect_subscription();
  sink_probe.request(2);
  link.expect_request_of(2);
  link.send_next(5);
  assert_eq!(sink_probe.expect_next(), 5);
  link.send_complete();
  sink_probe.expect_complete();
}

#[test]
fn publisher_sink_serves_a_single_subscriber() {
  let mut materializer = started();
  let (source, publisher) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::publisher())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();

  let (sink_probe, subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(subscriber);
  sink_probe.expect_subscription();
  sink_probe.request(3);
  link.expect_request_of(3);
  link.send_next(7);
  assert_eq!(sink_probe.expect_next(), 7);
  link.send_complete();
  sink_probe.expect_complete();
}

#[test]
fn publisher_sink_rejects_a_second_subscriber() {
  let mut materializer = started();
  let (source, publisher) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::publisher())
    .run(&mut materializer)
    .expect("materializes");
  let _link = source.expect_subscription();

  let (first, first_subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(first_subscriber);
  first.expect_subscription();

  let (second, second_subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(second_subscriber);
  second.expect_subscription();
  assert_eq!(second.expect_error(), StreamError::AlreadySubscribed);
}

#[test]
fn publisher_sink_forwards_cancellation_upstream() {
  let mut materializer = started();
  let (source, publisher) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::publisher())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();

  let (sink_probe, subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(subscriber);
  sink_probe.expect_subscription();
  sink_probe.cancel();
  sink_probe.cancel();
  link.expect_cancellation();
}

#[test]
fn publisher_sink_fails_zero_demand() {
  let mut materializer = started();
  let (source, publisher) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::publisher())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();

  let (sink_probe, subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(subscriber);
  sink_probe.expect_subscription();
  sink_probe.request(0);
  assert_eq!(sink_probe.expect_error(), StreamError::InvalidDemand);
  link.expect_cancellation();
}

#[test]
fn publisher_sink_replays_a_stashed_terminal() {
  let mut materializer = started();
  let (source, publisher) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::publisher())
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.send_complete();

  let (sink_probe, subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(subscriber);
  sink_probe.expect_subscription();
  sink_probe.expect_complete();
}

#[test]
fn fanout_publisher_validates_its_buffer_bounds() {
  assert!(Sink::<u32, _>::fanout_publisher(0, 4).is_err());
  assert!(Sink::<u32, _>::fanout_publisher(4, 2).is_err());
}

#[test]
fn fanout_publisher_follows_the_slowest_subscriber() {
  let mut materializer = started();
  let (source, publisher) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::fanout_publisher(2, 4).expect("valid bounds"))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_request_of(2);
  link.send_next(1);
  link.send_next(2);

  let (fast, fast_subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(fast_subscriber);
  fast.expect_subscription();
  let (slow, slow_subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(slow_subscriber);
  slow.expect_subscription();

  fast.request(2);
  assert_eq!(fast.expect_next(), 1);
  assert_eq!(fast.expect_next(), 2);

  slow.request(1);
  assert_eq!(slow.expect_next(), 1);
  slow.request(2);
  assert_eq!(slow.expect_next(), 2);

  // demand only reaches upstream once every subscriber can absorb more
  fast.request(1);
  link.expect_request_of(1);
  link.send_next(3);
  assert_eq!(fast.expect_next(), 3);
  assert_eq!(slow.expect_next(), 3);

  fast.cancel();
  slow.cancel();
  link.expect_cancellation();
}

#[test]
fn fanout_publisher_flushes_the_terminal_after_buffered_elements() {
  let mut materializer = started();
  let (source, publisher) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::fanout_publisher(2, 4).expect("valid bounds"))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_request_of(2);
  link.send_next(9);
  link.send_complete();

  let (sink_probe, subscriber) = TestSinkProbe::<u32>::probe();
  publisher.subscribe(subscriber);
  sink_probe.expect_subscription();
  sink_probe.request(1);
  assert_eq!(sink_probe.expect_next(), 9);
  sink_probe.expect_complete();
}

#[test]
fn fanout_publisher_honours_buffer_attributes() {
  let mut materializer = started();
  let (source, _publisher) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(
      Sink::fanout_publisher(2, 4)
        .expect("valid bounds")
        .with_attributes(Attributes::input_buffer(1, 2)),
    )
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_request_of(1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queue_sink_serves_buffered_pulls() {
  let mut materializer = started();
  let (source, queue) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::queue(2))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_request_of(2);
  link.send_next(7);
  link.send_next(8);

  assert_eq!(queue.pull().await, Ok(Some(7)));
  link.expect_request_of(1);
  assert_eq!(queue.pull().await, Ok(Some(8)));
  link.expect_request_of(1);
  link.send_complete();
  assert_eq!(queue.pull().await, Ok(None));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queue_drains_buffered_elements_after_completion() {
  let mut materializer = started();
  let (source, queue) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::queue(2))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_request_of(2);
  link.send_next(1);
  link.send_next(2);

  assert_eq!(queue.pull().await, Ok(Some(1)));
  link.expect_request_of(1);
  link.send_next(3);
  link.send_complete();
  assert_eq!(queue.pull().await, Ok(Some(2)));
  assert_eq!(queue.pull().await, Ok(Some(3)));
  assert_eq!(queue.pull().await, Ok(None));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unbuffered_queue_requests_one_element_per_pull() {
  let mut materializer = started();
  let (source, queue) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::queue(0))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();

  let queue = Arc::new(queue);
  for value in [11_u32, 12, 13] {
    let waiting = queue.clone();
    let pulled = tokio::spawn(async move { waiting.pull().await });
    link.expect_request_of(1);
    link.send_next(value);
    assert_eq!(pulled.await.expect("join"), Ok(Some(value)));
  }
  source.expect_silence(Duration::from_millis(100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queue_pull_waits_for_the_next_element() {
  let mut materializer = started();
  let (source, queue) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::queue(0))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();

  let pulled = tokio::spawn(async move { queue.pull().await });
  link.expect_request_of(1);
  link.send_next(9);
  assert_eq!(pulled.await.expect("join"), Ok(Some(9)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queue_allows_a_single_pull_at_a_time() {
  let mut materializer = started();
  let (source, queue) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::queue(0))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();

  let queue = Arc::new(queue);
  let waiting = queue.clone();
  let pulled = tokio::spawn(async move { waiting.pull().await });
  tokio::time::sleep(Duration::from_millis(100)).await;
  assert_eq!(queue.pull().await, Err(StreamError::PullInProgress));
  link.send_next(1);
  assert_eq!(pulled.await.expect("join"), Ok(Some(1)));
}

#[tokio::test]
async fn queue_pull_times_out_without_elements() {
  let mut materializer = started();
  let (source, queue) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::queue_within(0, Duration::from_millis(50)))
    .run(&mut materializer)
    .expect("materializes");
  let _link = source.expect_subscription();
  assert_eq!(queue.pull().await, Err(StreamError::PullTimeout));
}

#[tokio::test]
async fn queue_failure_is_sticky() {
  let mut materializer = started();
  let (source, queue) = probe_source::<u32>()
    .to_mat::<_, KeepBoth>(Sink::queue(1))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.send_error(StreamError::failure("boom"));
  assert_eq!(queue.pull().await, Err(StreamError::failure("boom")));
  assert_eq!(queue.pull().await, Err(StreamError::failure("boom")));
}

#[test]
fn mailbox_sink_forwards_elements_and_completion() {
  let mut materializer = started();
  let (sender, mut receiver) = mpsc::unbounded_channel();
  let source = probe_source::<u32>()
    .to(Sink::mailbox(sender, "done", 2).expect("valid buffer"))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_request_of(2);
  link.send_next(1);
  assert_eq!(receiver.try_recv(), Ok(MailboxSignal::Element(1)));
  link.expect_request_of(1);
  link.send_complete();
  assert_eq!(receiver.try_recv(), Ok(MailboxSignal::Completed("done")));
}

#[test]
fn mailbox_sink_forwards_failure() {
  let mut materializer = started();
  let (sender, mut receiver) = mpsc::unbounded_channel();
  let source = probe_source::<u32>()
    .to(Sink::mailbox(sender, "done", 1).expect("valid buffer"))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.send_error(StreamError::failure("boom"));
  assert_eq!(receiver.try_recv(), Ok(MailboxSignal::Failed(StreamError::failure("boom"))));
}

#[test]
fn mailbox_sink_cancels_when_the_receiver_is_gone() {
  let mut materializer = started();
  let (sender, receiver) = mpsc::unbounded_channel::<MailboxSignal<u32, &'static str>>();
  let source = probe_source::<u32>()
    .to(Sink::mailbox(sender, "done", 1).expect("valid buffer"))
    .run(&mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  link.expect_request_of(1);
  drop(receiver);
  link.send_next(1);
  link.expect_cancellation();
}

#[test]
fn mailbox_sink_rejects_a_zero_buffer() {
  let (sender, _receiver) = mpsc::unbounded_channel::<MailboxSignal<u32, &'static str>>();
  assert!(Sink::mailbox(sender, "done", 0).is_err());
}

#[test]
fn completed_source_completes_on_first_demand() {
  let mut materializer = started();
  let sink_probe = Source::<u32, _>::completed()
    .run_with(probe_sink(), &mut materializer)
    .expect("materializes");
  sink_probe.expect_subscription();
  sink_probe.request(1);
  sink_probe.expect_complete();
}

#[test]
fn failed_source_fails_on_first_demand() {
  let mut materializer = started();
  let sink_probe = Source::<u32, _>::failed(StreamError::failure("boom"))
    .run_with(probe_sink(), &mut materializer)
    .expect("materializes");
  sink_probe.expect_subscription();
  sink_probe.request(1);
  assert_eq!(sink_probe.expect_error(), StreamError::failure("boom"));
}

#[test]
fn publisher_source_bridges_an_external_publisher() {
  let mut materializer = started();
  let (source, publisher) = TestSourceProbe::<u32>::probe();
  let sink_probe = Source::from_publisher(publisher)
    .run_with(probe_sink(), &mut materializer)
    .expect("materializes");
  let link = source.expect_subscription();
  sink_probe.expect_subscription();
  sink_probe.request(1);
  link.expect_request_of(1);
  link.send_next(3);
  assert_eq!(sink_probe.expect_next(), 3);
}

#[test]
fn sink_run_with_keeps_the_sink_value() {
  let mut materializer = started();
  let completion = Sink::ignore()
    .run_with(Source::<u32, _>::completed(), &mut materializer)
    .expect("materializes");
  assert!(matches!(completion.poll(), Completion::Ready(Ok(StreamDone))));
}
