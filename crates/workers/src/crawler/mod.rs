// SPDX-License-Identifier: MIT

//! The canonical child worker: `crawler_url`.

mod config;
mod links;
mod worker;

pub use config::{CrawlConfig, CrawlerPayload};
pub use links::{link_matches, select_links, LinkStats};
pub use worker::CrawlerWorker;
