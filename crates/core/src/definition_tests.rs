// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn step_on_error_defaults_to_continue() {
    let json = serde_json::json!({
        "name": "crawl",
        "action": "crawler",
    });
    let step: Step = serde_json::from_value(json).expect("deserializes");
    assert_eq!(step.on_error, OnError::Continue);
}

#[test]
fn job_definition_round_trips() {
    let def = JobDefinition {
        id: JobDefinitionId::new(),
        name: "nightly crawl".to_string(),
        definition_type: "crawl".to_string(),
        steps: vec![Step {
            name: "seed".to_string(),
            action: "crawler".to_string(),
            config: JsonMap::new(),
            on_error: OnError::Fail,
            depends: vec![],
            condition: None,
        }],
        pre_jobs: vec![],
        post_jobs: vec![],
        error_tolerance: Some(ErrorTolerance {
            max_child_failures: 2,
            failure_action: FailureAction::StopAll,
        }),
        source_type: Some("confluence".to_string()),
        base_url: None,
        auth_id: Some("auth-1".to_string()),
        tags: vec!["nightly".to_string()],
        schedule: None,
        timeout_secs: Some(3600),
        enabled: true,
    };

    let json = serde_json::to_string(&def).expect("serializes");
    let parsed: JobDefinition = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(parsed.id, def.id);
    assert_eq!(parsed.steps.len(), 1);
    assert_eq!(parsed.steps[0].action, "crawler");
    assert_eq!(parsed.error_tolerance.unwrap().max_child_failures, 2);
}

#[test]
fn definition_enabled_defaults_true() {
    let json = serde_json::json!({
        "id": "jdf-abc",
        "name": "x",
        "type": "crawl",
        "steps": [],
    });
    let def: JobDefinition = serde_json::from_value(json).expect("deserializes");
    assert!(def.enabled);
}
