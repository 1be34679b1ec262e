// SPDX-License-Identifier: MIT

use gantry_daemon::{acquire_lock, Config, DaemonError, Engine};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gantry=info"));
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    init_tracing();

    let config = Config::from_env()?;
    std::fs::create_dir_all(&config.state_dir)?;
    let _lock = acquire_lock(&config)?;

    info!(state_dir = %config.state_dir.display(), "starting gantry daemon");
    let engine = Engine::build(&config)?;

    let cancel = CancellationToken::new();
    let processor = engine.processor.clone();
    let processor_cancel = cancel.clone();
    let processor_task = tokio::spawn(async move { processor.run(processor_cancel).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    cancel.cancel();
    if let Err(err) = processor_task.await {
        warn!(%err, "processor task panicked during shutdown");
    }
    engine.monitors.cancel_all();
    engine.monitors.join_all().await;

    info!("gantry daemon stopped");
    Ok(())
}
