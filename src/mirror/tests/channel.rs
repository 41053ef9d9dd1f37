use std::time::Duration;

use tokio::time::timeout;
use tokio_stream::StreamExt;

use crate::mirror::ValueChannel;

const PENDING: Duration = Duration::from_millis(50);

#[tokio::test]
async fn replays_current_value_to_new_subscriber() {
    let channel = ValueChannel::new(Some("bar".to_string()));

    let mut stream = channel.watch();

    assert_eq!(stream.next().await.unwrap().as_deref(), Some("bar"));
}

#[tokio::test]
async fn replays_absence_for_empty_channel() {
    let channel = ValueChannel::new(None);

    let mut stream = channel.watch();

    assert_eq!(stream.next().await.unwrap(), None);
}

#[tokio::test]
async fn push_reaches_active_subscriber() {
    let channel = ValueChannel::new(Some("bar".to_string()));
    let mut stream = channel.watch();
    assert_eq!(stream.next().await.unwrap().as_deref(), Some("bar"));

    channel.push(Some("bar2".to_string()));

    assert_eq!(stream.next().await.unwrap().as_deref(), Some("bar2"));
    assert_eq!(channel.get().as_deref(), Some("bar2"));
}

#[tokio::test]
async fn equal_push_is_still_delivered() {
    let channel = ValueChannel::new(Some("same".to_string()));
    let mut stream = channel.watch();
    assert_eq!(stream.next().await.unwrap().as_deref(), Some("same"));

    channel.push(Some("same".to_string()));

    assert_eq!(stream.next().await.unwrap().as_deref(), Some("same"));
}

#[tokio::test]
async fn buffered_pushes_are_delivered_in_order() {
    let channel = ValueChannel::new(Some("bar".to_string()));
    let mut stream = channel.watch();

    channel.push(Some("bar2".to_string()));
    channel.push(Some("bar3".to_string()));

    assert_eq!(stream.next().await.unwrap().as_deref(), Some("bar"));
    assert_eq!(stream.next().await.unwrap().as_deref(), Some("bar2"));
    assert_eq!(stream.next().await.unwrap().as_deref(), Some("bar3"));
}

#[tokio::test]
async fn late_subscriber_sees_latest_value_only() {
    let channel = ValueChannel::new(Some("first".to_string()));
    channel.push(Some("second".to_string()));
    channel.push(None);

    let mut stream = channel.watch();

    assert_eq!(stream.next().await.unwrap(), None);
    assert!(timeout(PENDING, stream.next()).await.is_err());
}

#[tokio::test]
async fn every_subscriber_receives_each_push() {
    let channel = ValueChannel::new(None);
    let mut first = channel.watch();
    let mut second = channel.watch();
    assert_eq!(first.next().await.unwrap(), None);
    assert_eq!(second.next().await.unwrap(), None);

    channel.push(Some("shared".to_string()));

    assert_eq!(first.next().await.unwrap().as_deref(), Some("shared"));
    assert_eq!(second.next().await.unwrap().as_deref(), Some("shared"));
}

#[tokio::test]
async fn orphaned_stream_pends_instead_of_ending() {
    let channel = ValueChannel::new(Some("bar".to_string()));
    let mut stream = channel.watch();
    assert_eq!(stream.next().await.unwrap().as_deref(), Some("bar"));

    drop(channel);

    // No terminal emission and no completion, just silence.
    assert!(timeout(PENDING, stream.next()).await.is_err());
}
