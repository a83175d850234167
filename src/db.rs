use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Applies the embedded migrations. A failure is logged, not fatal.
pub async fn migrate(pool: &PgPool) {
    match run_migrations(pool).await {
        Ok(()) => info!("database migrations applied"),
        Err(e) => warn!(error = ?e, "migration failed; continuing"),
    }
}
