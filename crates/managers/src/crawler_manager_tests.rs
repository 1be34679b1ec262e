// SPDX-License-Identifier: MIT

use super::*;
use crate::manager::MonitorSpawner;
use async_trait::async_trait;
use gantry_bus::EventBus;
use gantry_core::{JobDefinitionId, JsonMap};
use gantry_queue::Queue;
use gantry_store::JobStore;
use tempfile::tempdir;

struct NoopSpawner;

#[async_trait]
impl MonitorSpawner for NoopSpawner {
    async fn spawn_monitor(&self, _parent_id: JobId) {}
}

fn context() -> (ManagerContext, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let bus = EventBus::new();
    let store = JobStore::open(dir.path().join("wal.jsonl"), None, bus.clone()).unwrap();
    let queue = Queue::default();
    (ManagerContext { store, queue, bus, monitor_spawner: Arc::new(NoopSpawner) }, dir)
}

fn definition(base_url: Option<&str>, source_type: Option<&str>) -> JobDefinition {
    JobDefinition {
        id: JobDefinitionId::new(),
        name: "crawl-docs".to_string(),
        definition_type: "crawl".to_string(),
        steps: Vec::new(),
        pre_jobs: Vec::new(),
        post_jobs: Vec::new(),
        error_tolerance: None,
        source_type: source_type.map(str::to_string),
        base_url: base_url.map(str::to_string),
        auth_id: Some("auth-1".to_string()),
        tags: Vec::new(),
        schedule: None,
        timeout_secs: None,
        enabled: true,
    }
}

fn step(config: JsonMap) -> Step {
    Step {
        name: "crawl".to_string(),
        action: "crawl".to_string(),
        config,
        on_error: gantry_core::OnError::Continue,
        depends: Vec::new(),
        condition: None,
    }
}

#[tokio::test]
async fn enqueues_one_job_per_explicit_start_url() {
    let (ctx, _dir) = context();
    let mut config = JsonMap::new();
    config.insert(
        "start_urls".to_string(),
        serde_json::json!(["https://ex.com/a", "https://ex.com/b"]),
    );
    let manager = CrawlerManager;
    let definition = definition(Some("https://ex.com"), Some("docs"));
    let orchestrator_parent_id = JobId::new();

    let created =
        manager.create_parent_job(&ctx, &step(config), &definition, orchestrator_parent_id).await.unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(ctx.queue.ready_len(), 2);
    for child_id in &created {
        let job = ctx.store.get_job(child_id).unwrap();
        assert_eq!(job.parent_id, Some(orchestrator_parent_id));
        assert_eq!(job.job_type, "crawler_url");
    }
}

#[tokio::test]
async fn derives_single_seed_url_from_definition_when_no_start_urls_given() {
    let (ctx, _dir) = context();
    let manager = CrawlerManager;
    let definition = definition(Some("https://ex.com"), Some("articles"));
    let orchestrator_parent_id = JobId::new();

    let created = manager
        .create_parent_job(&ctx, &step(JsonMap::new()), &definition, orchestrator_parent_id)
        .await
        .unwrap();

    assert_eq!(created.len(), 1);
    let job = ctx.store.get_job(&created[0]).unwrap();
    let payload: gantry_workers::CrawlerPayload = serde_json::from_value(job.payload).unwrap();
    assert_eq!(payload.seed_url, "https://ex.com/articles");
    assert_eq!(payload.auth_id.as_deref(), Some("auth-1"));
}

#[tokio::test]
async fn missing_base_url_and_start_urls_errors() {
    let (ctx, _dir) = context();
    let manager = CrawlerManager;
    let definition = definition(None, Some("articles"));
    let err = manager
        .create_parent_job(&ctx, &step(JsonMap::new()), &definition, JobId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::MissingConfig(_, "base_url")));
}
