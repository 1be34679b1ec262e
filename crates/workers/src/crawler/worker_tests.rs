use super::*;
use crate::collaborators::{AuthStore, DocumentStore};
use crate::fakes::{
    FakeAuthStore, FakeBrowserFactory, FakeContentProcessor, FakeDocumentStore,
    FakeJobDefinitionStore, FakePage,
};
use crate::worker::{Worker, WorkerContext};
use gantry_bus::EventBus;
use gantry_core::{Job, JobId, JobStatus};
use gantry_queue::Queue;
use gantry_store::JobStore;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::tempdir;

fn build_worker(pages: HashMap<String, FakePage>) -> (CrawlerWorker, JobStore, Queue, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let wal_path = dir.path().join("wal.jsonl");
    let bus = EventBus::new();
    let store = JobStore::open(&wal_path, None, bus.clone()).unwrap();
    let queue = Queue::default();
    let worker = CrawlerWorker::new(
        store.clone(),
        queue.clone(),
        bus,
        Arc::new(FakeBrowserFactory::new(pages)),
        Arc::new(FakeContentProcessor),
        Arc::new(FakeDocumentStore::default()),
        Arc::new(FakeAuthStore::default()),
        Arc::new(FakeJobDefinitionStore::default()),
        Duration::from_millis(0),
    );
    (worker, store, queue, dir)
}

fn seed_job(store: &JobStore, url: &str, crawl_config: CrawlConfig) -> Job {
    let payload = CrawlerPayload {
        seed_url: url.to_string(),
        source_type: "docs".to_string(),
        entity_type: "page".to_string(),
        crawl_config,
        auth_id: None,
        discovered_by: None,
    };
    let job = Job::new_child(
        JobId::new(),
        JobId::new(),
        "crawler_url",
        url.to_string(),
        1,
        serde_json::to_value(&payload).unwrap(),
        1_000,
    );
    store.create_job_record(job.clone()).unwrap();
    job
}

#[tokio::test]
async fn execute_saves_document_and_marks_running() {
    let mut pages = HashMap::new();
    pages.insert(
        "https://example.com".to_string(),
        FakePage { html: "<title>Home</title>body".to_string(), status: 200 },
    );
    let (worker, store, _queue, _dir) = build_worker(pages);
    let job = seed_job(&store, "https://example.com", CrawlConfig::default());
    let ctx = WorkerContext::new(tokio_util::sync::CancellationToken::new());

    worker.execute(&ctx, &job).await.unwrap();

    let updated = store.get_job(&job.id).unwrap();
    assert_eq!(updated.status, JobStatus::Running);
}

#[tokio::test]
async fn execute_records_link_stats_even_when_not_following_links() {
    let dir = tempdir().unwrap();
    let wal_path = dir.path().join("wal.jsonl");
    let bus = EventBus::new();
    let store = JobStore::open(&wal_path, None, bus.clone()).unwrap();
    let document_store = Arc::new(FakeDocumentStore::default());
    let worker = CrawlerWorker::new(
        store.clone(),
        Queue::default(),
        bus,
        Arc::new(FakeBrowserFactory::new(HashMap::from([(
            "https://example.com".to_string(),
            FakePage {
                html: "<title>Home</title><a href=\"https://example.com/a\">a</a>".to_string(),
                status: 200,
            },
        )]))),
        Arc::new(FakeContentProcessor),
        document_store.clone(),
        Arc::new(FakeAuthStore::default()),
        Arc::new(FakeJobDefinitionStore::default()),
        Duration::from_millis(0),
    );
    // follow_links defaults to false, so no children should be spawned,
    // but the document's link stats must still be recorded (spec §4.E.1
    // step 8 runs regardless of whether links are followed).
    let job = seed_job(&store, "https://example.com", CrawlConfig::default());
    let ctx = WorkerContext::new(tokio_util::sync::CancellationToken::new());

    worker.execute(&ctx, &job).await.unwrap();

    let doc_id = document_id("docs", "https://example.com");
    let doc = document_store.get_document(&doc_id).await.unwrap().expect("document saved");
    let link_stats = doc.metadata.get("link_stats").expect("link_stats recorded");
    assert_eq!(link_stats["found"], 1);
    assert_eq!(link_stats["followed"], 0);
}

#[tokio::test]
async fn execute_spawns_children_for_followed_links() {
    let mut pages = HashMap::new();
    pages.insert(
        "https://example.com".to_string(),
        FakePage {
            html: "<title>Home</title><a href=\"https://example.com/a\">a</a>".to_string(),
            status: 200,
        },
    );
    let mut config = CrawlConfig { follow_links: true, max_pages: 5, max_depth: 2, ..Default::default() };
    config.follow_links = true;
    let (worker, store, queue, _dir) = build_worker(pages);
    let job = seed_job(&store, "https://example.com", config);
    let ctx = WorkerContext::new(tokio_util::sync::CancellationToken::new());

    worker.execute(&ctx, &job).await.unwrap();

    let children = store.list_child_jobs(&job.parent_id.unwrap());
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].parent_id, job.parent_id);
    assert_eq!(queue.ready_len(), 1);
}

#[tokio::test]
async fn execute_does_not_spawn_children_when_max_pages_zero() {
    let mut pages = HashMap::new();
    pages.insert(
        "https://example.com".to_string(),
        FakePage {
            html: "<title>Home</title><a href=\"https://example.com/a\">a</a>".to_string(),
            status: 200,
        },
    );
    let config = CrawlConfig { follow_links: true, max_pages: 0, ..Default::default() };
    let (worker, store, _queue, _dir) = build_worker(pages);
    let job = seed_job(&store, "https://example.com", config);
    let ctx = WorkerContext::new(tokio_util::sync::CancellationToken::new());

    worker.execute(&ctx, &job).await.unwrap();

    assert!(store.list_child_jobs(&job.parent_id.unwrap()).is_empty());
}

#[tokio::test]
async fn execute_fails_and_records_error_on_missing_page() {
    let pages = HashMap::new();
    let (worker, store, _queue, _dir) = build_worker(pages);
    let job = seed_job(&store, "https://example.com/missing", CrawlConfig::default());
    let ctx = WorkerContext::new(tokio_util::sync::CancellationToken::new());

    let result = worker.execute(&ctx, &job).await;

    assert!(result.is_err());
    let updated = store.get_job(&job.id).unwrap();
    assert!(updated.error.is_some());
}

#[tokio::test]
async fn execute_resolves_auth_id_from_root_parent_metadata() {
    let mut pages = HashMap::new();
    pages.insert(
        "https://example.com".to_string(),
        FakePage { html: "<title>Home</title>body".to_string(), status: 200 },
    );
    let dir = tempdir().unwrap();
    let wal_path = dir.path().join("wal.jsonl");
    let bus = EventBus::new();
    let store = JobStore::open(&wal_path, None, bus.clone()).unwrap();
    let queue = Queue::default();

    let mut creds = HashMap::new();
    creds.insert(
        "auth-1".to_string(),
        crate::collaborators::Credentials {
            site_domain: "example.com".to_string(),
            cookies: serde_json::to_vec(&Vec::<crate::collaborators::BrowserCookie>::new()).unwrap(),
            tokens: None,
            base_url: None,
            user_agent: None,
            updated_at_ms: 1_000,
        },
    );
    let auth_store = FakeAuthStore::new(creds);
    assert!(auth_store.get_credentials_by_id("auth-1").await.unwrap().is_some());

    let worker = CrawlerWorker::new(
        store.clone(),
        queue,
        bus,
        Arc::new(FakeBrowserFactory::new(pages)),
        Arc::new(FakeContentProcessor),
        Arc::new(FakeDocumentStore::default()),
        Arc::new(auth_store),
        Arc::new(FakeJobDefinitionStore::default()),
        Duration::from_millis(0),
    );

    let root = Job::new_root(JobId::new(), "crawler_url", "root", 1_000);
    let mut root = root;
    root.metadata.insert("auth_id".to_string(), serde_json::json!("auth-1"));
    store.create_job_record(root.clone()).unwrap();

    let payload = CrawlerPayload {
        seed_url: "https://example.com".to_string(),
        source_type: "docs".to_string(),
        entity_type: "page".to_string(),
        crawl_config: CrawlConfig::default(),
        auth_id: None,
        discovered_by: None,
    };
    let job = Job::new_child(
        JobId::new(),
        root.id,
        "crawler_url",
        "https://example.com",
        1,
        serde_json::to_value(&payload).unwrap(),
        1_000,
    );
    store.create_job_record(job.clone()).unwrap();
    let ctx = WorkerContext::new(tokio_util::sync::CancellationToken::new());

    worker.execute(&ctx, &job).await.unwrap();
}

#[test]
fn validate_rejects_empty_seed_url() {
    let dir = tempdir().unwrap();
    let wal_path = dir.path().join("wal.jsonl");
    let bus = EventBus::new();
    let store = JobStore::open(&wal_path, None, bus.clone()).unwrap();
    let worker = CrawlerWorker::new(
        store,
        Queue::default(),
        bus,
        Arc::new(FakeBrowserFactory::new(HashMap::new())),
        Arc::new(FakeContentProcessor),
        Arc::new(FakeDocumentStore::default()),
        Arc::new(FakeAuthStore::default()),
        Arc::new(FakeJobDefinitionStore::default()),
        Duration::from_millis(0),
    );
    let payload = CrawlerPayload {
        seed_url: String::new(),
        source_type: "docs".to_string(),
        entity_type: "page".to_string(),
        crawl_config: CrawlConfig::default(),
        auth_id: None,
        discovered_by: None,
    };
    let job = Job::new_child(
        JobId::new(),
        JobId::new(),
        "crawler_url",
        "x",
        0,
        serde_json::to_value(&payload).unwrap(),
        1_000,
    );
    assert!(worker.validate(&job).is_err());
}
