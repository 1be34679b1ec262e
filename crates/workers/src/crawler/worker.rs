// SPDX-License-Identifier: MIT

use super::config::CrawlerPayload;
use super::links::select_links;
use crate::collaborators::{
    AuthStore, BrowserCookie, BrowserFactory, ContentProcessor, Document, DocumentStore,
    JobDefinitionStore,
};
use crate::error::WorkerError;
use crate::worker::{Worker, WorkerContext};
use async_trait::async_trait;
use gantry_bus::EventBus;
use gantry_core::{Clock, Job, JobId, JobStatus, LogLevel};
use gantry_queue::{Queue, QueueMessage};
use gantry_store::JobStore;
use indexmap::IndexMap;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// `crawler_url`: renders a page, extracts content and links, persists a
/// document, and spawns depth-bounded child crawls for accepted links
///.
pub struct CrawlerWorker {
    store: JobStore,
    queue: Queue,
    bus: EventBus,
    browser_factory: Arc<dyn BrowserFactory>,
    content_processor: Arc<dyn ContentProcessor>,
    document_store: Arc<dyn DocumentStore>,
    auth_store: Arc<dyn AuthStore>,
    job_definition_store: Arc<dyn JobDefinitionStore>,
    render_delay: Duration,
}

impl CrawlerWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: JobStore,
        queue: Queue,
        bus: EventBus,
        browser_factory: Arc<dyn BrowserFactory>,
        content_processor: Arc<dyn ContentProcessor>,
        document_store: Arc<dyn DocumentStore>,
        auth_store: Arc<dyn AuthStore>,
        job_definition_store: Arc<dyn JobDefinitionStore>,
        render_delay: Duration,
    ) -> Self {
        Self {
            store,
            queue,
            bus,
            browser_factory,
            content_processor,
            document_store,
            auth_store,
            job_definition_store,
            render_delay,
        }
    }

    fn log(&self, job_id: JobId, root_parent_id: JobId, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        if let Err(err) = self.store.add_job_log(job_id, level, message.clone()) {
            warn!(%job_id, %err, "failed to persist crawler job log");
        }
        self.bus.publish(gantry_core::Event::CrawlerJobLog {
            job_id,
            root_parent_id,
            level: level.to_string(),
            message,
        });
    }

    fn fail(&self, job_id: JobId, root_parent_id: JobId, message: impl Into<String>) -> WorkerError {
        let message = message.into();
        self.log(job_id, root_parent_id, LogLevel::Error, message.clone());
        if let Err(err) = self.store.set_job_error(job_id, message.clone()) {
            warn!(%job_id, %err, "failed to record crawler job error");
        }
        WorkerError::Browser(message)
    }

    /// Resolve the auth id to use for cookie injection: the root parent's
    /// own metadata first, falling back to its job-definition's `auth_id`
    ///.
    async fn resolve_auth_id(&self, root_parent_id: JobId) -> Option<String> {
        let root = self.store.get_job(&root_parent_id)?;
        if let Some(auth_id) = root.metadata.get("auth_id").and_then(Value::as_str) {
            return Some(auth_id.to_string());
        }
        let definition_id = root.metadata.get("job_definition_id").and_then(Value::as_str)?;
        match self.job_definition_store.get_job_definition(definition_id).await {
            Ok(Some(def)) => def.auth_id,
            Ok(None) => None,
            Err(err) => {
                warn!(%definition_id, %err, "job definition lookup failed during auth resolution");
                None
            }
        }
    }

    async fn inject_cookies(
        &self,
        session: &dyn crate::collaborators::BrowserSession,
        job_id: JobId,
        root_parent_id: JobId,
        auth_id: &str,
        seed_url: &str,
    ) {
        let creds = match self.auth_store.get_credentials_by_id(auth_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                self.log(
                    job_id,
                    root_parent_id,
                    LogLevel::Warn,
                    format!("no credentials found for auth_id {auth_id}"),
                );
                return;
            }
            Err(err) => {
                self.log(
                    job_id,
                    root_parent_id,
                    LogLevel::Warn,
                    format!("credential lookup failed for auth_id {auth_id}: {err}"),
                );
                return;
            }
        };

        let cookies: Vec<BrowserCookie> = match serde_json::from_slice(&creds.cookies) {
            Ok(c) => c,
            Err(err) => {
                self.log(
                    job_id,
                    root_parent_id,
                    LogLevel::Warn,
                    format!("could not decode cookies for auth_id {auth_id}: {err}"),
                );
                return;
            }
        };

        let is_https = seed_url.starts_with("https://");
        let host = seed_url.trim_start_matches("https://").trim_start_matches("http://");
        let host = host.split('/').next().unwrap_or(host);

        for cookie in cookies {
            let domain = cookie.domain.trim_start_matches('.');
            if !host.ends_with(domain) {
                self.log(
                    job_id,
                    root_parent_id,
                    LogLevel::Warn,
                    format!("cookie domain {} does not match target host {host}", cookie.domain),
                );
                continue;
            }
            if cookie.secure && !is_https {
                self.log(
                    job_id,
                    root_parent_id,
                    LogLevel::Warn,
                    format!("secure cookie {} skipped: target is not https", cookie.name),
                );
                continue;
            }
            if let Err(err) = session.set_cookie(cookie).await {
                self.log(job_id, root_parent_id, LogLevel::Warn, format!("set_cookie failed: {err}"));
            }
        }

        match session.get_cookies(seed_url).await {
            Ok(verified) => self.log(
                job_id,
                root_parent_id,
                LogLevel::Info,
                format!("verified {} cookies scoped to target", verified.len()),
            ),
            Err(err) => {
                self.log(job_id, root_parent_id, LogLevel::Warn, format!("cookie verification failed: {err}"))
            }
        }
    }
}

fn document_id(source_type: &str, url: &str) -> String {
    let digest = Sha256::digest(format!("{source_type}:{url}").as_bytes());
    format!("doc-{:x}", digest)[..24].to_string()
}

#[async_trait]
impl Worker for CrawlerWorker {
    fn worker_type(&self) -> &str {
        "crawler_url"
    }

    fn validate(&self, job: &Job) -> Result<(), WorkerError> {
        let payload: CrawlerPayload = serde_json::from_value(job.payload.clone())
            .map_err(|e| WorkerError::InvalidConfig(job.id, "payload", e.to_string()))?;
        if payload.seed_url.is_empty() {
            return Err(WorkerError::MissingConfig(job.id, "seed_url"));
        }
        if payload.source_type.is_empty() {
            return Err(WorkerError::MissingConfig(job.id, "source_type"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &WorkerContext, job: &Job) -> Result<(), WorkerError> {
        let root_parent_id = job.parent_id.unwrap_or(job.id);
        let payload: CrawlerPayload = serde_json::from_value(job.payload.clone())
            .map_err(|e| WorkerError::InvalidConfig(job.id, "payload", e.to_string()))?;

        self.store.update_job_status(job.id, JobStatus::Running)?;
        self.log(job.id, root_parent_id, LogLevel::Info, format!("crawling {}", payload.seed_url));

        if ctx.cancel.is_cancelled() {
            return Err(self.fail(job.id, root_parent_id, "cancelled before navigation"));
        }

        let session = self
            .browser_factory
            .open_session()
            .await
            .map_err(|e| self.fail(job.id, root_parent_id, format!("failed to open browser session: {e}")))?;
        session
            .enable_network()
            .await
            .map_err(|e| self.fail(job.id, root_parent_id, format!("enable_network failed: {e}")))?;
        session
            .enable_log()
            .await
            .map_err(|e| self.fail(job.id, root_parent_id, format!("enable_log failed: {e}")))?;

        let auth_id = payload
            .auth_id
            .clone()
            .or(self.resolve_auth_id(root_parent_id).await);
        if let Some(auth_id) = &auth_id {
            self.inject_cookies(session.as_ref(), job.id, root_parent_id, auth_id, &payload.seed_url).await;
        }

        session
            .navigate(&payload.seed_url)
            .await
            .map_err(|e| self.fail(job.id, root_parent_id, format!("navigation failed: {e}")))?;
        session.sleep(self.render_delay).await;
        let html = session
            .outer_html("html")
            .await
            .map_err(|e| self.fail(job.id, root_parent_id, format!("outer_html failed: {e}")))?;
        let status = session.response_status().await;
        self.log(
            job.id,
            root_parent_id,
            LogLevel::Debug,
            format!("rendered {} (status {:?})", payload.seed_url, status),
        );

        let content = self
            .content_processor
            .process(&html, &payload.seed_url)
            .await
            .map_err(|e| self.fail(job.id, root_parent_id, format!("content processing failed: {e}")))?;

        let now_ms = gantry_core::SystemClock.epoch_ms();
        let doc_id = document_id(&payload.source_type, &payload.seed_url);
        let mut metadata: IndexMap<String, Value> = IndexMap::new();
        if !payload.crawl_config.tags.is_empty() {
            metadata.insert("tags".to_string(), json!(payload.crawl_config.tags));
        }
        let mut doc = Document {
            id: doc_id.clone(),
            source_type: payload.source_type.clone(),
            source_id: payload.seed_url.clone(),
            title: content.title.clone(),
            content_markdown: content.body_markdown.clone(),
            url: payload.seed_url.clone(),
            detail_level: "full".to_string(),
            metadata,
            tags: payload.crawl_config.tags.clone(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        self.document_store
            .save_document(doc.clone())
            .await
            .map_err(|e| self.fail(job.id, root_parent_id, format!("save_document failed: {e}")))?;

        self.bus
            .publish_sync(gantry_core::Event::DocumentSaved {
                parent_job_id: root_parent_id,
                job_id: job.id,
                document_id: doc_id.clone(),
                source_type: payload.source_type.clone(),
                timestamp_ms: now_ms,
            })
            .await;

        let link_urls: Vec<String> = content.links.iter().map(|l| l.url.clone()).collect();
        let mut spawned = 0u64;
        let should_follow = payload.crawl_config.follow_links && job.depth < payload.crawl_config.max_depth;
        let (accepted, stats) = if should_follow {
            select_links(
                &link_urls,
                &payload.crawl_config.include_patterns,
                &payload.crawl_config.exclude_patterns,
                payload.crawl_config.max_pages,
            )
        } else {
            (Vec::new(), super::links::LinkStats { found: link_urls.len() as u64, ..Default::default() })
        };
        self.log(
            job.id,
            root_parent_id,
            LogLevel::Info,
            format!(
                "links found={} filtered={} followed={} skipped={}",
                stats.found, stats.filtered, stats.followed, stats.skipped
            ),
        );

        if should_follow {
            for link in accepted {
                let already_seen = self
                    .store
                    .mark_url_seen(root_parent_id, link.clone())
                    .map_err(|e| self.fail(job.id, root_parent_id, format!("mark_url_seen failed: {e}")))?;
                if already_seen {
                    continue;
                }
                let child_payload = CrawlerPayload {
                    seed_url: link.clone(),
                    source_type: payload.source_type.clone(),
                    entity_type: payload.entity_type.clone(),
                    crawl_config: payload.crawl_config.clone(),
                    auth_id: auth_id.clone(),
                    discovered_by: Some(job.id.to_string()),
                };
                let child = Job::new_child(
                    JobId::new(),
                    root_parent_id,
                    "crawler_url",
                    link.clone(),
                    job.depth + 1,
                    serde_json::to_value(&child_payload).unwrap_or(Value::Null),
                    now_ms,
                );
                self.store
                    .create_job_record(child.clone())
                    .map_err(|e| self.fail(job.id, root_parent_id, format!("create_job_record failed: {e}")))?;
                self.queue.enqueue(QueueMessage::new(
                    child.id,
                    "crawler_url",
                    serde_json::to_value(&child).unwrap_or(Value::Null),
                ));
                self.bus.publish(gantry_core::Event::JobSpawn {
                    parent_job_id: root_parent_id,
                    child_job_id: child.id,
                    job_type: "crawler_url".to_string(),
                    discovered_by: job.id,
                });
                spawned += 1;
            }
        }

        doc.metadata.insert(
            "link_stats".to_string(),
            json!({
                "found": stats.found,
                "filtered": stats.filtered,
                "followed": stats.followed,
                "skipped": stats.skipped,
            }),
        );
        self.document_store
            .update_document(doc)
            .await
            .map_err(|e| self.fail(job.id, root_parent_id, format!("update_document failed: {e}")))?;

        self.bus.publish(gantry_core::Event::CrawlerJobProgress {
            job_id: job.id,
            pages_visited: 1,
            documents_saved: 1,
        });
        self.log(
            job.id,
            root_parent_id,
            LogLevel::Info,
            format!("completed crawl of {}, spawned {spawned} children", payload.seed_url),
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
