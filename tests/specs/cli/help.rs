//! `gantry` help output specs.

use crate::prelude::*;

#[test]
fn gantry_help_shows_usage() {
    cli().args(["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn gantry_run_help_shows_usage() {
    cli().args(["run", "--help"]).passes().stdout_has("Usage:").stdout_has("definition");
}

#[test]
fn gantry_status_help_shows_usage() {
    cli().args(["status", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn gantry_logs_help_shows_usage() {
    cli().args(["logs", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn gantry_no_subcommand_fails_with_usage() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn gantry_status_of_unknown_job_fails() {
    cli().args(["status", "jid-nonexistent"]).fails().stderr_has("no such job");
}
