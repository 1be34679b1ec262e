use super::*;
use crate::fakes::FakeMaintenanceStore;
use crate::worker::WorkerContext;
use gantry_bus::EventBus;
use gantry_core::{Job, JobId};
use gantry_store::JobStore;
use tempfile::tempdir;

fn build(store: JobStore, maintenance: FakeMaintenanceStore) -> DbMaintenanceWorker {
    DbMaintenanceWorker::new(store, Arc::new(maintenance))
}

fn make_job(operation: MaintenanceOperation) -> Job {
    Job::new_child(
        JobId::new(),
        JobId::new(),
        "database_maintenance_operation",
        "maintenance",
        1,
        serde_json::to_value(&MaintenancePayload { operation }).unwrap(),
        1_000,
    )
}

async fn assert_dispatches(operation: MaintenanceOperation, expected_call: &str) {
    let dir = tempdir().unwrap();
    let bus = EventBus::new();
    let store = JobStore::open(dir.path().join("wal.jsonl"), None, bus).unwrap();
    let maintenance = FakeMaintenanceStore::new(vec![], vec![]);
    let calls = maintenance.calls.clone();
    let worker = build(store.clone(), maintenance);
    let job = make_job(operation);
    store.create_job_record(job.clone()).unwrap();
    let ctx = WorkerContext::new(tokio_util::sync::CancellationToken::new());

    worker.execute(&ctx, &job).await.unwrap();

    assert_eq!(calls.lock().as_slice(), [expected_call.to_string()]);
}

#[tokio::test]
async fn execute_dispatches_vacuum() {
    assert_dispatches(MaintenanceOperation::Vacuum, "vacuum").await;
}

#[tokio::test]
async fn execute_dispatches_analyze() {
    assert_dispatches(MaintenanceOperation::Analyze, "analyze").await;
}

#[tokio::test]
async fn execute_dispatches_optimize() {
    assert_dispatches(MaintenanceOperation::Optimize, "optimize").await;
}

#[tokio::test]
async fn reindex_skips_failing_indexes_without_failing_the_job() {
    let dir = tempdir().unwrap();
    let bus = EventBus::new();
    let store = JobStore::open(dir.path().join("wal.jsonl"), None, bus).unwrap();
    let maintenance = FakeMaintenanceStore::new(
        vec!["idx_a".to_string(), "idx_b".to_string()],
        vec!["idx_a".to_string()],
    );
    let calls = maintenance.calls.clone();
    let worker = build(store.clone(), maintenance);
    let job = make_job(MaintenanceOperation::Reindex);
    store.create_job_record(job.clone()).unwrap();
    let ctx = WorkerContext::new(tokio_util::sync::CancellationToken::new());

    worker.execute(&ctx, &job).await.unwrap();

    assert_eq!(calls.lock().as_slice(), ["reindex:idx_a".to_string(), "reindex:idx_b".to_string()]);
    assert!(!store.job_logs(&job.id).is_empty());
}

#[test]
fn validate_rejects_malformed_payload() {
    let dir = tempdir().unwrap();
    let bus = EventBus::new();
    let store = JobStore::open(dir.path().join("wal.jsonl"), None, bus).unwrap();
    let worker = build(store, FakeMaintenanceStore::new(vec![], vec![]));
    let job = Job::new_child(
        JobId::new(),
        JobId::new(),
        "database_maintenance_operation",
        "maintenance",
        1,
        serde_json::json!({"operation": "not_a_real_op"}),
        1_000,
    );
    assert!(worker.validate(&job).is_err());
}
