//! End-to-end specs for `gantry run`/`status`/`logs` against the
//! in-process engine's fake collaborators (spec §6): a
//! `database_maintenance` step needs nothing external to reach
//! `Completed`, so it's the cheapest full trip through the orchestrator,
//! queue, processor, and monitor.

use crate::prelude::*;

const MAINTENANCE_DEFINITION: &str = r#"{
    "id": "jdf-test-maintenance-0001",
    "name": "nightly maintenance",
    "type": "maintenance",
    "steps": [
        {
            "name": "tidy-up",
            "action": "database_maintenance",
            "config": { "operations": ["vacuum", "analyze", "optimize"] }
        }
    ]
}"#;

fn first_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or_default()
}

#[test]
fn run_completes_a_maintenance_job_and_prints_its_tree() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let definition = write_definition(workdir.path(), "maintenance.json", MAINTENANCE_DEFINITION);

    cli()
        .args(["run", definition.to_str().unwrap(), "--timeout-secs", "10"])
        .passes()
        .stdout_has("database_maintenance_parent")
        .stdout_has("status=completed");
}

#[test]
fn status_reflects_the_completed_job_after_run() {
    let state_dir = tempfile::tempdir().expect("tempdir");
    let definition = write_definition(state_dir.path(), "maintenance.json", MAINTENANCE_DEFINITION);

    let run_output = cli_in(state_dir.path())
        .args(["run", definition.to_str().unwrap(), "--timeout-secs", "10"])
        .passes();
    let root_id = first_word(run_output.stdout());
    assert!(root_id.starts_with("job-"), "unexpected root job id: {root_id:?}");

    cli_in(state_dir.path())
        .args(["status", root_id])
        .passes()
        .stdout_has(root_id)
        .stdout_has("database_maintenance_parent");
}

#[test]
fn logs_lists_entries_recorded_during_the_run() {
    let state_dir = tempfile::tempdir().expect("tempdir");
    let definition = write_definition(state_dir.path(), "maintenance.json", MAINTENANCE_DEFINITION);

    let run_output = cli_in(state_dir.path())
        .args(["run", definition.to_str().unwrap(), "--timeout-secs", "10"])
        .passes();
    let root_id = first_word(run_output.stdout());

    // The root parent itself never logs directly, but its maintenance
    // children do; a log listing on the root is valid and simply empty.
    cli_in(state_dir.path()).args(["logs", root_id]).passes();
}

#[test]
fn a_second_run_against_the_same_state_dir_is_rejected_while_the_first_holds_the_lock() {
    // `run` takes the same exclusive lock `gantryd` does, so two
    // concurrent writers against one state dir can't corrupt the WAL.
    // Here we simulate that by pre-holding the lock file ourselves.
    let state_dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(state_dir.path()).unwrap();
    let lock_path = state_dir.path().join("gantryd.lock");
    let lock_file = std::fs::OpenOptions::new().write(true).create(true).open(&lock_path).unwrap();
    fs2::FileExt::lock_exclusive(&lock_file).unwrap();

    let definition = write_definition(state_dir.path(), "maintenance.json", MAINTENANCE_DEFINITION);

    cli_in(state_dir.path())
        .args(["run", definition.to_str().unwrap()])
        .fails()
        .stderr_has("already running");

    fs2::FileExt::unlock(&lock_file).unwrap();
}
