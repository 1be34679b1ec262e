//! Entry point for the workspace-level integration test binary. Each
//! `specs/**/*.rs` file is a module of `#[test]` functions exercising the
//! `gantry` binary end to end; `prelude` is the shared harness they all
//! `use crate::prelude::*;`.


#[path = "specs/cli/help.rs"]
mod cli_help;
#[path = "specs/cli/run.rs"]
mod cli_run;
