use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};
use upkeep_core::config::PostgresConfig;

/// Create a PostgreSQL connection pool and run migrations.
///
/// Returns `Ok(None)` when PG_USERNAME is unset so the caller can fall back to
/// the in-memory store. A configured database that cannot be reached is an
/// error.
pub async fn init_pg_pool(config: &PostgresConfig) -> anyhow::Result<Option<PgPool>> {
    if !config.is_configured() {
        warn!("PG_USERNAME not configured, schedules are kept in memory");
        return Ok(None);
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await
        .with_context(|| format!("failed to connect to PostgreSQL at {}", config.host))?;
    info!("PostgreSQL connected: {}", config.host);

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("failed to apply database migrations")?;
    info!("Database migrations applied successfully");

    Ok(Some(pool))
}
