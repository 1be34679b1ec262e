// SPDX-License-Identifier: MIT

//! In-memory stand-ins for every external collaborator, gated
//! behind `test-support` the same way the teacher crate gates
//! `FakeNotifyAdapter`/`FakeAgentAdapter` in `oj-adapters`.

use crate::collaborators::*;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A scripted page: the HTML a [`FakeBrowserSession`] returns for a given
/// URL, plus the status code to report.
#[derive(Debug, Clone)]
pub struct FakePage {
    pub html: String,
    pub status: u16,
}

#[derive(Default)]
struct BrowserState {
    navigated_to: Vec<String>,
    cookies: HashMap<String, Vec<BrowserCookie>>,
    last_url: Option<String>,
}

/// Scripted browser: `pages` maps URL -> the HTML/status `outer_html`
/// should return after a `navigate` to that URL.
pub struct FakeBrowserSession {
    pages: HashMap<String, FakePage>,
    state: Mutex<BrowserState>,
}

impl FakeBrowserSession {
    pub fn new(pages: HashMap<String, FakePage>) -> Self {
        Self { pages, state: Mutex::new(BrowserState::default()) }
    }
}

#[async_trait]
impl BrowserSession for FakeBrowserSession {
    async fn navigate(&self, url: &str) -> Result<(), CollaboratorError> {
        let mut state = self.state.lock();
        state.navigated_to.push(url.to_string());
        state.last_url = Some(url.to_string());
        Ok(())
    }

    async fn sleep(&self, _d: Duration) {}

    async fn outer_html(&self, _selector: &str) -> Result<String, CollaboratorError> {
        let state = self.state.lock();
        let url = state.last_url.clone().ok_or_else(|| CollaboratorError::other("no navigation yet"))?;
        self.pages
            .get(&url)
            .map(|p| p.html.clone())
            .ok_or_else(|| CollaboratorError::other(format!("no scripted page for {url}")))
    }

    async fn evaluate(&self, _js: &str) -> Result<Value, CollaboratorError> {
        Ok(Value::Null)
    }

    async fn set_cookie(&self, cookie: BrowserCookie) -> Result<(), CollaboratorError> {
        self.state.lock().cookies.entry(cookie.domain.clone()).or_default().push(cookie);
        Ok(())
    }

    async fn get_cookies(&self, url: &str) -> Result<Vec<BrowserCookie>, CollaboratorError> {
        let state = self.state.lock();
        let domain = url.trim_start_matches("https://").trim_start_matches("http://");
        Ok(state
            .cookies
            .iter()
            .filter(|(d, _)| domain.ends_with(d.as_str()))
            .flat_map(|(_, c)| c.clone())
            .collect())
    }

    async fn enable_network(&self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn enable_log(&self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn response_status(&self) -> Option<u16> {
        let state = self.state.lock();
        let url = state.last_url.as_ref()?;
        self.pages.get(url).map(|p| p.status)
    }
}

/// Hands out a single shared [`FakeBrowserSession`] built from `pages`.
pub struct FakeBrowserFactory {
    pages: HashMap<String, FakePage>,
}

impl FakeBrowserFactory {
    pub fn new(pages: HashMap<String, FakePage>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl BrowserFactory for FakeBrowserFactory {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, CollaboratorError> {
        Ok(Box::new(FakeBrowserSession::new(self.pages.clone())))
    }
}

/// Minimal HTML "processor": treats `<title>` contents as the title, the
/// rest of the body as markdown verbatim, and extracts `href="..."` link
/// targets in document order. Good enough for deterministic tests; not a
/// real HTML parser.
pub struct FakeContentProcessor;

#[async_trait]
impl ContentProcessor for FakeContentProcessor {
    async fn process(&self, html: &str, base_url: &str) -> Result<ProcessedContent, CollaboratorError> {
        let title = extract_between(html, "<title>", "</title>").unwrap_or_else(|| base_url.to_string());
        let links = extract_links(html, base_url);
        Ok(ProcessedContent {
            title,
            body_markdown: html.to_string(),
            content_size: html.len(),
            links,
            process_time: Duration::from_millis(1),
        })
    }
}

fn extract_between(haystack: &str, start: &str, end: &str) -> Option<String> {
    let start_idx = haystack.find(start)? + start.len();
    let end_idx = haystack[start_idx..].find(end)? + start_idx;
    Some(haystack[start_idx..end_idx].to_string())
}

fn extract_links(html: &str, base_url: &str) -> Vec<ExtractedLink> {
    let mut links = Vec::new();
    let mut rest = html;
    while let Some(pos) = rest.find("href=\"") {
        rest = &rest[pos + 6..];
        let Some(end) = rest.find('"') else { break };
        let target = &rest[..end];
        let url = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}/{}", base_url.trim_end_matches('/'), target.trim_start_matches('/'))
        };
        links.push(ExtractedLink { url, text: String::new() });
        rest = &rest[end + 1..];
    }
    links
}

#[derive(Default)]
pub struct FakeDocumentStore {
    by_id: Mutex<HashMap<String, Document>>,
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn save_document(&self, doc: Document) -> Result<(), CollaboratorError> {
        self.by_id.lock().insert(doc.id.clone(), doc);
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, CollaboratorError> {
        Ok(self.by_id.lock().get(id).cloned())
    }

    async fn update_document(&self, doc: Document) -> Result<(), CollaboratorError> {
        self.by_id.lock().insert(doc.id.clone(), doc);
        Ok(())
    }

    async fn get_document_by_source(
        &self,
        source_type: &str,
        url: &str,
    ) -> Result<Option<Document>, CollaboratorError> {
        Ok(self.by_id.lock().values().find(|d| d.source_type == source_type && d.url == url).cloned())
    }

    async fn rebuild_fts5_index(&self) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAuthStore {
    by_id: HashMap<String, Credentials>,
}

impl FakeAuthStore {
    pub fn new(by_id: HashMap<String, Credentials>) -> Self {
        Self { by_id }
    }
}

#[async_trait]
impl AuthStore for FakeAuthStore {
    async fn get_credentials_by_id(&self, auth_id: &str) -> Result<Option<Credentials>, CollaboratorError> {
        Ok(self.by_id.get(auth_id).cloned())
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            site_domain: self.site_domain.clone(),
            cookies: self.cookies.clone(),
            tokens: self.tokens.clone(),
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            updated_at_ms: self.updated_at_ms,
        }
    }
}

/// Always returns `extra_params` merged with a fixed `{"ran": true}` —
/// enough to exercise the agent worker's merge-into-metadata path.
pub struct FakeAgentService;

#[async_trait]
impl AgentService for FakeAgentService {
    async fn run(
        &self,
        _document_id: &str,
        _content: &str,
        extra_params: &Value,
    ) -> Result<IndexMap<String, Value>, CollaboratorError> {
        let mut out = IndexMap::new();
        out.insert("ran".to_string(), Value::Bool(true));
        if let Some(obj) = extra_params.as_object() {
            for (k, v) in obj {
                out.insert(k.clone(), v.clone());
            }
        }
        Ok(out)
    }
}

#[derive(Default)]
pub struct FakeJobDefinitionStore {
    by_id: HashMap<String, gantry_core::JobDefinition>,
}

impl FakeJobDefinitionStore {
    pub fn new(by_id: HashMap<String, gantry_core::JobDefinition>) -> Self {
        Self { by_id }
    }
}

#[async_trait]
impl JobDefinitionStore for FakeJobDefinitionStore {
    async fn get_job_definition(
        &self,
        id: &str,
    ) -> Result<Option<gantry_core::JobDefinition>, CollaboratorError> {
        Ok(self.by_id.get(id).cloned())
    }
}

#[derive(Default)]
pub struct FakeMaintenanceStore {
    pub indexes: Vec<String>,
    pub failing_indexes: Vec<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeMaintenanceStore {
    pub fn new(indexes: Vec<String>, failing_indexes: Vec<String>) -> Self {
        Self { indexes, failing_indexes, calls: Arc::new(Mutex::new(Vec::new())) }
    }
}

#[async_trait]
impl MaintenanceStore for FakeMaintenanceStore {
    async fn vacuum(&self) -> Result<(), CollaboratorError> {
        self.calls.lock().push("vacuum".to_string());
        Ok(())
    }

    async fn analyze(&self) -> Result<(), CollaboratorError> {
        self.calls.lock().push("analyze".to_string());
        Ok(())
    }

    async fn optimize(&self) -> Result<(), CollaboratorError> {
        self.calls.lock().push("optimize".to_string());
        Ok(())
    }

    async fn list_indexes(&self) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.indexes.clone())
    }

    async fn reindex(&self, index_name: &str) -> Result<(), CollaboratorError> {
        self.calls.lock().push(format!("reindex:{index_name}"));
        if self.failing_indexes.contains(&index_name.to_string()) {
            return Err(CollaboratorError::other(format!("reindex failed for {index_name}")));
        }
        Ok(())
    }
}
