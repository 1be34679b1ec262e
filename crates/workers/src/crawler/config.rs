// SPDX-License-Identifier: MIT

//! `crawler_url` job payload and crawl configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Zero means no children are ever spawned.
    #[serde(default)]
    pub max_pages: u32,
    /// Advisory only — not enforced by this core.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    #[serde(default)]
    pub follow_links: bool,
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_max_depth() -> u32 {
    1
}

fn default_concurrency() -> u32 {
    1
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: 0,
            concurrency: default_concurrency(),
            follow_links: false,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// Required payload for a `crawler_url` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerPayload {
    pub seed_url: String,
    pub source_type: String,
    pub entity_type: String,
    #[serde(default)]
    pub crawl_config: CrawlConfig,
    /// Carried from the discovering job so a spawned child inherits it
    ///.
    #[serde(default)]
    pub auth_id: Option<String>,
    /// The job id that discovered this link, recorded on the spawned
    /// child. `None` for
    /// a seed job.
    #[serde(default)]
    pub discovered_by: Option<String>,
}
