use std::time::Duration;

use super::StreamCompletion;
use crate::{completion::Completion, stream_done::StreamDone, stream_error::StreamError};

#[test]
fn poll_reports_pending_until_completed() {
  let completion = StreamCompletion::<StreamDone>::new();
  assert!(completion.poll().is_pending());

  completion.complete(Ok(StreamDone));
  assert_eq!(completion.poll(), Completion::Ready(Ok(StreamDone)));
}

#[test]
fn first_result_is_sticky() {
  let completion = StreamCompletion::<u32>::new();
  completion.complete(Ok(1));
  completion.complete(Ok(2));
  completion.complete(Err(StreamError::NoElement));
  assert_eq!(completion.poll(), Completion::Ready(Ok(1)));
}

#[test]
fn try_take_consumes_the_result() {
  let completion = StreamCompletion::<u32>::new();
  completion.complete(Err(StreamError::NoElement));
  assert_eq!(completion.try_take(), Some(Err(StreamError::NoElement)));
  assert_eq!(completion.try_take(), None);
}

#[test]
fn clones_share_the_same_cell() {
  let completion = StreamCompletion::<u32>::new();
  let observer = completion.clone();
  completion.complete(Ok(7));
  assert_eq!(observer.poll(), Completion::Ready(Ok(7)));
}

#[tokio::test]
async fn wait_resolves_when_completed_from_another_task() {
  let completion = StreamCompletion::<u32>::new();
  let resolver = completion.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(10)).await;
    resolver.complete(Ok(42));
  });
  assert_eq!(completion.wait().await, Ok(42));
}

#[tokio::test]
async fn wait_returns_immediately_when_already_resolved() {
  let completion = StreamCompletion::<u32>::new();
  completion.complete(Ok(5));
  assert_eq!(completion.wait().await, Ok(5));
}
