// SPDX-License-Identifier: MIT

//! `gantry`: a thin local-operation front end over `gantry-daemon`'s
//! `Engine`/`Config` — submit a job definition and drive it to completion,
//! or inspect a job tree/log stream already recorded in the store. Not a
//! client of a running `gantryd`: the durable queue is
//! in-process only, so `gantry run` builds its own engine against the same
//! on-disk state directory and takes the same exclusive lock `gantryd`
//! does.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use gantry_daemon::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gantry", about = "Local front end for the gantry job orchestration engine")]
struct Cli {
    /// Override the state directory (default: $GANTRY_STATE_DIR, else
    /// $XDG_STATE_HOME/gantry, else ~/.local/state/gantry).
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a job definition (JSON) and run it to completion.
    Run {
        /// Path to a JSON-encoded job definition.
        definition: PathBuf,
        /// Give up waiting after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Print a job and its children's current status.
    Status {
        job_id: String,
    },
    /// Print a job's log entries in insertion order.
    Logs {
        job_id: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gantry=info"));
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config =
        match cli.state_dir { Some(dir) => Config::from_state_dir(dir), None => Config::from_env()? };

    match cli.command {
        Command::Run { definition, timeout_secs } => {
            commands::run::execute(&config, &definition, timeout_secs).await
        }
        Command::Status { job_id } => commands::status::execute(&config, &job_id),
        Command::Logs { job_id } => commands::logs::execute(&config, &job_id),
    }
}
