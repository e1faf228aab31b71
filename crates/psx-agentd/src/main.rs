use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use psx_agent::{Agent, TaskRef, Watchdog};
use psx_observe::init_logging;
use psx_platform::{Platform, PlatformClient};
use tracing::info;

mod config;
mod task;

use config::Cli;
use task::NoopTask;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_config()?)?;
    info!(version = env!("CARGO_PKG_VERSION"), "psx-agentd starting");

    let cfg = config::resolve(&cli)?;
    let platform: Arc<dyn Platform> =
        Arc::new(PlatformClient::new(&cfg.platform()).context("build platform client")?);

    let _watchdog = Watchdog::new(platform.clone(), cfg.timeout)
        .arm()
        .context("install shutdown signal handlers")?;

    let task: TaskRef = Arc::new(NoopTask);
    let worker = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());
    platform
        .report_log(&format!("Starting {} at worker {}.", task.name(), worker))
        .await
        .context("report start-up")?;

    Agent::new(platform, task).run().await?;
    info!(execution_id = %cfg.execution_id, "execution finished");
    Ok(())
}
