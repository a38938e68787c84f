use std::time::Duration;

use lumina_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const MAX_CONNECTIONS: u32 = 20;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect to Postgres and run pending migrations.
pub async fn connect(config: &Config) -> Result<PgPool, anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await?;

    lumina_db::MIGRATOR.run(&pool).await?;

    tracing::info!("database connected and migrations applied");
    Ok(pool)
}
