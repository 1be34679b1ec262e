// SPDX-License-Identifier: MIT

//! Translates a `crawl` step into one or more root `crawler_url` jobs.

use crate::error::ManagerError;
use crate::manager::{ManagerContext, StepManager};
use async_trait::async_trait;
use gantry_core::{Clock, Event, Job, JobDefinition, JobId, Step, SystemClock};
use gantry_queue::QueueMessage;
use gantry_workers::{CrawlConfig, CrawlerPayload};
use serde_json::Value;

pub struct CrawlerManager;

impl CrawlerManager {
    /// Seed URLs, preferring `start_urls` from the step config; otherwise
    /// one URL derived from `source_type`/`entity_type`/`base_url`.
    fn seed_urls(step: &Step, definition: &JobDefinition) -> Result<Vec<String>, ManagerError> {
        if let Some(urls) = step.config.get("start_urls").and_then(Value::as_array) {
            let urls: Vec<String> =
                urls.iter().filter_map(Value::as_str).map(str::to_string).collect();
            if !urls.is_empty() {
                return Ok(urls);
            }
        }

        let base_url = definition
            .base_url
            .as_deref()
            .or_else(|| step.config.get("base_url").and_then(Value::as_str))
            .ok_or(ManagerError::MissingConfig(step.name.clone(), "base_url"))?;
        let entity_type = step
            .config
            .get("entity_type")
            .and_then(Value::as_str)
            .or(definition.source_type.as_deref())
            .ok_or(ManagerError::MissingConfig(step.name.clone(), "entity_type"))?;

        Ok(vec![format!("{}/{entity_type}", base_url.trim_end_matches('/'))])
    }

    fn crawl_config(step: &Step) -> Result<CrawlConfig, ManagerError> {
        match step.config.get("crawl_config") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ManagerError::InvalidConfig(step.name.clone(), "crawl_config", e.to_string())),
            None => Ok(CrawlConfig::default()),
        }
    }
}

#[async_trait]
impl StepManager for CrawlerManager {
    fn manager_type(&self) -> &str {
        "crawl"
    }

    fn returns_child_jobs(&self) -> bool {
        true
    }

    async fn create_parent_job(
        &self,
        ctx: &ManagerContext,
        step: &Step,
        definition: &JobDefinition,
        orchestrator_parent_id: JobId,
    ) -> Result<Vec<JobId>, ManagerError> {
        let seed_urls = Self::seed_urls(step, definition)?;
        let crawl_config = Self::crawl_config(step)?;
        let auth_id = step
            .config
            .get("auth_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| definition.auth_id.clone());
        let entity_type = step
            .config
            .get("entity_type")
            .and_then(Value::as_str)
            .unwrap_or("page")
            .to_string();
        let source_type = definition
            .source_type
            .clone()
            .unwrap_or_else(|| definition.definition_type.clone());

        let mut created = Vec::with_capacity(seed_urls.len());
        let now_ms = SystemClock.epoch_ms();
        for seed_url in seed_urls {
            let payload = CrawlerPayload {
                seed_url: seed_url.clone(),
                source_type: source_type.clone(),
                entity_type: entity_type.clone(),
                crawl_config: crawl_config.clone(),
                auth_id: auth_id.clone(),
                discovered_by: None,
            };
            let child = Job::new_child(
                JobId::new(),
                orchestrator_parent_id,
                "crawler_url",
                seed_url,
                1,
                serde_json::to_value(&payload).unwrap_or(Value::Null),
                now_ms,
            );
            ctx.store.create_job_record(child.clone())?;
            ctx.queue.enqueue(QueueMessage::new(
                child.id,
                "crawler_url",
                serde_json::to_value(&child).unwrap_or(Value::Null),
            ));
            ctx.bus.publish(Event::JobSpawn {
                parent_job_id: orchestrator_parent_id,
                child_job_id: child.id,
                job_type: "crawler_url".to_string(),
                discovered_by: orchestrator_parent_id,
            });
            created.push(child.id);
        }
        Ok(created)
    }
}

#[cfg(test)]
#[path = "crawler_manager_tests.rs"]
mod tests;
