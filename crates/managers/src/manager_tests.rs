// SPDX-License-Identifier: MIT

use super::*;

struct NoopManager(&'static str, bool);

#[async_trait]
impl StepManager for NoopManager {
    fn manager_type(&self) -> &str {
        self.0
    }

    fn returns_child_jobs(&self) -> bool {
        self.1
    }

    async fn create_parent_job(
        &self,
        _ctx: &ManagerContext,
        _step: &Step,
        _definition: &JobDefinition,
        _orchestrator_parent_id: JobId,
    ) -> Result<Vec<JobId>, ManagerError> {
        Ok(Vec::new())
    }
}

#[test]
fn register_and_get() {
    let mut registry = ManagerRegistry::new();
    registry.register(Arc::new(NoopManager("crawl", true))).expect("registers");
    assert!(registry.get("crawl").is_some());
    assert!(registry.get("missing").is_none());
}

#[test]
fn duplicate_registration_errors() {
    let mut registry = ManagerRegistry::new();
    registry.register(Arc::new(NoopManager("crawl", true))).expect("first registers");
    let err = registry.register(Arc::new(NoopManager("crawl", false))).unwrap_err();
    assert!(matches!(err, ManagerError::DuplicateManagerType(ref t) if t == "crawl"));
}
