mod api;
mod cli;
mod db;
mod pg_store;
mod router;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use upkeep_core::Config;
use upkeep_schedule::{ReferenceClock, SystemClock};

use crate::cli::{Cli, Command, PreviewArgs};
use crate::state::AppState;

fn load_config() -> Config {
    upkeep_core::config::load_dotenv();
    Config::from_env()
}

fn reference_clock(config: &Config) -> ReferenceClock {
    ReferenceClock::new(Arc::new(SystemClock), config.schedule.utc_offset())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();
    let clock = reference_clock(&config);

    let state = match db::init_pg_pool(&config.postgres).await? {
        Some(pool) => AppState::postgres(config.clone(), pool, clock),
        None => AppState::in_memory(config.clone(), clock),
    };
    info!(backend = state.backend, "Schedule store ready");

    let app = router::build_router(Arc::new(state));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://localhost:{}", config.server.port);
    axum::serve(listener, app).await?;

    Ok(())
}

fn preview(config: &Config, args: &PreviewArgs) -> anyhow::Result<()> {
    let today = reference_clock(config).today();
    let (from, dates) = args.run(today)?;
    println!("{} schedule, from {}:", args.frequency, from);
    for (i, date) in dates.iter().enumerate() {
        println!("  {:>3}. {} ({})", i + 1, date, date.format("%A"));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Preview(args) => preview(&config, &args),
    }
}
