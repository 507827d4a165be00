use anyhow::Context;
use tracing_subscriber::EnvFilter;

use vigil::config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load().context("failed to load configuration")?;

    tracing::info!(
        listen = %cfg.listen_addr,
        deadline_secs = cfg.deadline.as_secs(),
        workers = cfg.workers,
        "Starting vigil"
    );

    vigil::start_server(&cfg);

    Ok(())
}
