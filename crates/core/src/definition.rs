// SPDX-License-Identifier: MIT

//! Job definition, step, and error-tolerance types. A definition is the immutable input to
//! orchestration — it is never itself a job.

use crate::job::JsonMap;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a job definition.
    pub struct JobDefinitionId("jdf-");
}

/// What a step manager should do when its `create_parent_job` call fails
///.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    Fail,
    Continue,
}

crate::simple_display! {
    OnError {
        Fail => "fail",
        Continue => "continue",
    }
}

/// One entry in a [`JobDefinition`]'s `steps` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    /// Key a [`crate`] consumer's manager registry is looked up by.
    pub action: String,
    #[serde(default)]
    pub config: JsonMap,
    #[serde(default = "default_on_error")]
    pub on_error: OnError,
    /// Reserved: step names this step depends on. Not interpreted by the
    /// orchestrator described here — steps run in list order regardless.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Reserved: a condition expression gating whether the step runs.
    /// Not evaluated by the core; carried through for forward-compat.
    #[serde(default)]
    pub condition: Option<String>,
}

fn default_on_error() -> OnError {
    OnError::Continue
}

/// What to do once `get_failed_child_count` meets or exceeds
/// `max_child_failures`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureAction {
    StopAll,
    MarkWarning,
    Continue,
}

crate::simple_display! {
    FailureAction {
        StopAll => "stop_all",
        MarkWarning => "mark_warning",
        Continue => "continue",
    }
}

/// Error-tolerance policy for a definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ErrorTolerance {
    pub max_child_failures: u64,
    pub failure_action: FailureAction,
}

/// Declarative input to orchestration. Not a
/// job — the orchestrator consumes one of these to produce a root parent
/// job plus however many descendants its steps spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    pub id: JobDefinitionId,
    pub name: String,
    /// Classification historically used to pick post-dispatch behavior;
    /// retained for display/filtering only.
    #[serde(rename = "type")]
    pub definition_type: String,
    pub steps: Vec<Step>,
    /// Reserved, not executed by the core described here.
    #[serde(default)]
    pub pre_jobs: Vec<String>,
    #[serde(default)]
    pub post_jobs: Vec<String>,
    #[serde(default)]
    pub error_tolerance: Option<ErrorTolerance>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub auth_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
