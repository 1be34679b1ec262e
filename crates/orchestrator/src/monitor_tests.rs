// SPDX-License-Identifier: MIT

use super::*;
use gantry_core::{Job, JobPhase, JsonMap};
use serde_json::Value;
use tempfile::tempdir;

fn store() -> (tempfile::TempDir, JobStore, EventBus) {
    let dir = tempdir().unwrap();
    let bus = EventBus::new();
    let store = JobStore::open(dir.path().join("jobs.wal"), None, bus.clone()).unwrap();
    (dir, store, bus)
}

fn child(parent: JobId, id: JobId, status: JobStatus) -> Job {
    Job {
        id,
        parent_id: Some(parent),
        job_type: "crawler_url".to_string(),
        name: "child".to_string(),
        phase: JobPhase::Execution,
        status,
        created_at_ms: 0,
        started_at_ms: None,
        finished_at_ms: None,
        progress_current: 0,
        progress_total: 0,
        payload: Value::Null,
        result: None,
        error: None,
        depth: 1,
        config: JsonMap::new(),
        metadata: JsonMap::new(),
    }
}

#[tokio::test]
async fn tick_leaves_parent_running_while_children_pending() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    let mut parent = Job::new_root(parent_id, "parent", "test", 0);
    parent.progress_total = 1;
    store.create_job_record(parent).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();

    let child_id = JobId::new();
    store.create_job_record(child(parent_id, child_id, JobStatus::Running)).unwrap();

    let monitor = Monitor::new(store.clone(), bus, parent_id);
    let finalized = monitor.tick().await;

    assert!(!finalized);
    assert_eq!(store.get_job(&parent_id).unwrap().status, JobStatus::Running);
}

#[tokio::test]
async fn tick_completes_parent_once_all_children_succeed() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    let parent = Job::new_root(parent_id, "parent", "test", 0);
    store.create_job_record(parent).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();

    let c1 = JobId::new();
    let c2 = JobId::new();
    store.create_job_record(child(parent_id, c1, JobStatus::Completed)).unwrap();
    store.create_job_record(child(parent_id, c2, JobStatus::Completed)).unwrap();

    let monitor = Monitor::new(store.clone(), bus, parent_id);
    let finalized = monitor.tick().await;

    assert!(finalized);
    let stored = store.get_job(&parent_id).unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert!(stored.finished_at_ms.is_some());
}

#[tokio::test]
async fn tick_fails_parent_if_any_child_failed() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    store.create_job_record(Job::new_root(parent_id, "parent", "test", 0)).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();

    let c1 = JobId::new();
    let c2 = JobId::new();
    store.create_job_record(child(parent_id, c1, JobStatus::Completed)).unwrap();
    store.create_job_record(child(parent_id, c2, JobStatus::Failed)).unwrap();

    let monitor = Monitor::new(store.clone(), bus, parent_id);
    assert!(monitor.tick().await);
    assert_eq!(store.get_job(&parent_id).unwrap().status, JobStatus::Failed);
}

#[tokio::test]
async fn tick_marks_parent_cancelled_if_all_children_cancelled() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    store.create_job_record(Job::new_root(parent_id, "parent", "test", 0)).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();

    let c1 = JobId::new();
    store.create_job_record(child(parent_id, c1, JobStatus::Cancelled)).unwrap();

    let monitor = Monitor::new(store.clone(), bus, parent_id);
    assert!(monitor.tick().await);
    assert_eq!(store.get_job(&parent_id).unwrap().status, JobStatus::Cancelled);
}

#[tokio::test]
async fn finalize_timeout_records_canonical_message() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    store.create_job_record(Job::new_root(parent_id, "parent", "test", 0)).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();

    let monitor = Monitor::new(store.clone(), bus, parent_id);
    monitor.finalize_timeout();

    let stored = store.get_job(&parent_id).unwrap();
    assert_eq!(stored.error.as_deref(), Some("Timed out waiting for child jobs to complete"));
}

#[tokio::test]
async fn finalize_cancelled_marks_parent_cancelled_and_finished() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    store.create_job_record(Job::new_root(parent_id, "parent", "test", 0)).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();

    let monitor = Monitor::new(store.clone(), bus, parent_id);
    monitor.finalize_cancelled();

    let stored = store.get_job(&parent_id).unwrap();
    assert_eq!(stored.status, JobStatus::Cancelled);
    assert!(stored.finished_at_ms.is_some());
}

#[tokio::test]
async fn run_finalizes_on_cancellation() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    store.create_job_record(Job::new_root(parent_id, "parent", "test", 0)).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();

    let monitor = Monitor::new(store.clone(), bus, parent_id)
        .with_intervals(Duration::from_millis(20), Duration::from_secs(30));
    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move { monitor.run(run_cancel).await });

    tokio::time::sleep(Duration::from_millis(30)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(store.get_job(&parent_id).unwrap().status, JobStatus::Cancelled);
}

#[tokio::test]
async fn run_wakes_on_document_saved_event_and_increments_count() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    store.create_job_record(Job::new_root(parent_id, "parent", "test", 0)).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();

    let c1 = JobId::new();
    store.create_job_record(child(parent_id, c1, JobStatus::Running)).unwrap();

    let monitor = Monitor::new(store.clone(), bus.clone(), parent_id)
        .with_intervals(Duration::from_secs(60), Duration::from_secs(60));
    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move { monitor.run(run_cancel).await });

    // Give the monitor time to install its subscriptions before publishing.
    tokio::time::sleep(Duration::from_millis(20)).await;
    bus.publish_sync(Event::DocumentSaved {
        parent_job_id: parent_id,
        job_id: c1,
        document_id: "doc-1".to_string(),
        source_type: "web".to_string(),
        timestamp_ms: 0,
    })
    .await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    cancel.cancel();
    handle.await.unwrap();

    let stats = store.get_child_job_stats(&parent_id);
    assert_eq!(stats.total, 1);
}

#[tokio::test]
async fn spawned_monitor_finalizes_terminal_parent_via_pool() {
    let (_dir, store, bus) = store();
    let parent_id = JobId::new();
    store.create_job_record(Job::new_root(parent_id, "parent", "test", 0)).unwrap();
    store.update_job_status(parent_id, JobStatus::Running).unwrap();
    store.create_job_record(child(parent_id, JobId::new(), JobStatus::Completed)).unwrap();

    let pool = MonitorPool::new(store.clone(), bus)
        .with_intervals(Duration::from_millis(10), Duration::from_secs(30));
    pool.spawn_monitor(parent_id).await;
    pool.join_all().await;

    assert_eq!(store.get_job(&parent_id).unwrap().status, JobStatus::Completed);
}
