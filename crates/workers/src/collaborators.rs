// SPDX-License-Identifier: MIT

//! External-collaborator traits. The core does not implement a
//! real headless browser, HTML-to-markdown converter, credential store, or
//! document store — it only describes their contract and depends on it
//! through these traits. `gantry-workers` ships `Fake*` implementations
//! behind the `test-support` feature, the same shape the teacher crate
//! uses for its agent/notify adapters (`oj-adapters`).

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Other(String),
}

impl CollaboratorError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// `{id, source_type, source_id, title, content_markdown, url,
/// detail_level, metadata, tags, created_at, updated_at}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source_type: String,
    pub source_id: String,
    pub title: String,
    pub content_markdown: String,
    pub url: String,
    pub detail_level: String,
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save_document(&self, doc: Document) -> Result<(), CollaboratorError>;
    async fn get_document(&self, id: &str) -> Result<Option<Document>, CollaboratorError>;
    async fn update_document(&self, doc: Document) -> Result<(), CollaboratorError>;
    async fn get_document_by_source(
        &self,
        source_type: &str,
        url: &str,
    ) -> Result<Option<Document>, CollaboratorError>;
    async fn rebuild_fts5_index(&self) -> Result<(), CollaboratorError>;
}

/// A single cookie in the shape the headless browser accepts/returns
///.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub expires: Option<u64>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

/// `{site_domain, cookies (bytes), tokens, base_url, user_agent,
/// updated_at}`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub site_domain: String,
    pub cookies: Vec<u8>,
    pub tokens: Option<Value>,
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub updated_at_ms: u64,
}

#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn get_credentials_by_id(&self, auth_id: &str) -> Result<Option<Credentials>, CollaboratorError>;
}

/// A single rendered page, ready for the content processor.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), CollaboratorError>;
    async fn sleep(&self, d: Duration);
    async fn outer_html(&self, selector: &str) -> Result<String, CollaboratorError>;
    async fn evaluate(&self, js: &str) -> Result<Value, CollaboratorError>;
    async fn set_cookie(&self, cookie: BrowserCookie) -> Result<(), CollaboratorError>;
    async fn get_cookies(&self, url: &str) -> Result<Vec<BrowserCookie>, CollaboratorError>;
    async fn enable_network(&self) -> Result<(), CollaboratorError>;
    async fn enable_log(&self) -> Result<(), CollaboratorError>;
    /// Best-effort HTTP status of the last navigation, when observable.
    async fn response_status(&self) -> Option<u16>;
}

#[async_trait]
pub trait BrowserFactory: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, CollaboratorError>;
}

/// One extracted link plus enough of its anchor text to log usefully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedLink {
    pub url: String,
    #[serde(default)]
    pub text: String,
}

/// `{title, body_markdown, content_size, links[], process_time}`.
#[derive(Debug, Clone)]
pub struct ProcessedContent {
    pub title: String,
    pub body_markdown: String,
    pub content_size: usize,
    pub links: Vec<ExtractedLink>,
    pub process_time: Duration,
}

#[async_trait]
pub trait ContentProcessor: Send + Sync {
    async fn process(&self, html: &str, base_url: &str) -> Result<ProcessedContent, CollaboratorError>;
}

/// Merged into `document.metadata[agent_type]` by the agent worker (spec
/// §4.E.2).
#[async_trait]
pub trait AgentService: Send + Sync {
    async fn run(
        &self,
        document_id: &str,
        content: &str,
        extra_params: &Value,
    ) -> Result<IndexMap<String, Value>, CollaboratorError>;
}

/// Job-definition lookup, used only for the crawler worker's auth-id
/// fallback.
#[async_trait]
pub trait JobDefinitionStore: Send + Sync {
    async fn get_job_definition(
        &self,
        id: &str,
    ) -> Result<Option<gantry_core::JobDefinition>, CollaboratorError>;
}

/// Database-maintenance primitives.
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    async fn vacuum(&self) -> Result<(), CollaboratorError>;
    async fn analyze(&self) -> Result<(), CollaboratorError>;
    async fn optimize(&self) -> Result<(), CollaboratorError>;
    async fn list_indexes(&self) -> Result<Vec<String>, CollaboratorError>;
    async fn reindex(&self, index_name: &str) -> Result<(), CollaboratorError>;
}
