// SPDX-License-Identifier: MIT

use super::*;
use crate::message::QueueMessage;
use gantry_core::JobId;
use serde_json::json;

fn msg() -> QueueMessage {
    QueueMessage::new(JobId::new(), "crawler_url", json!({"seed_url": "https://ex.com"}))
}

#[tokio::test]
async fn enqueue_then_receive_returns_the_message() {
    let q = Queue::default();
    q.enqueue(msg());
    let cancel = CancellationToken::new();
    let delivery = q.receive(Duration::from_millis(100), &cancel).await.expect("message");
    assert_eq!(delivery.message.job_type, "crawler_url");
}

#[tokio::test]
async fn receive_times_out_on_empty_queue() {
    let q = Queue::default();
    let cancel = CancellationToken::new();
    let delivery = q.receive(Duration::from_millis(20), &cancel).await;
    assert!(delivery.is_none());
}

#[tokio::test]
async fn delete_is_final_and_second_call_errors() {
    let q = Queue::new(Duration::from_secs(30));
    q.enqueue(msg());
    let cancel = CancellationToken::new();
    let delivery = q.receive(Duration::from_millis(100), &cancel).await.expect("message");
    assert_eq!(q.in_flight_len(), 1);
    delivery.delete().expect("first delete succeeds");
    assert_eq!(q.in_flight_len(), 0);
}

#[tokio::test]
async fn undeleted_message_redelivers_after_visibility_timeout() {
    let q = Queue::new(Duration::from_millis(20));
    q.enqueue(msg());
    let cancel = CancellationToken::new();

    let first = q.receive(Duration::from_millis(50), &cancel).await.expect("first delivery");
    // Deliberately do not call delete() — simulates a crash before disposition.
    drop(first);

    tokio::time::sleep(Duration::from_millis(40)).await;
    let second = q.receive(Duration::from_millis(100), &cancel).await.expect("redelivered");
    assert_eq!(second.message.job_type, "crawler_url");
}

#[tokio::test]
async fn fifo_within_single_producer() {
    let q = Queue::default();
    for i in 0..3 {
        q.enqueue(QueueMessage::new(JobId::new(), format!("t{i}"), json!(null)));
    }
    let cancel = CancellationToken::new();
    for i in 0..3 {
        let d = q.receive(Duration::from_millis(100), &cancel).await.expect("message");
        assert_eq!(d.message.job_type, format!("t{i}"));
        d.delete().expect("delete");
    }
}

#[tokio::test]
async fn receive_returns_none_when_cancelled() {
    let q = Queue::default();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let delivery = q.receive(Duration::from_secs(5), &cancel).await;
    assert!(delivery.is_none());
}
