use std::net::SocketAddr;
use std::sync::Arc;

use lumina_api::setup;
use lumina_api::state::AppState;
use lumina_core::Config;
use lumina_db::{PgRecordStore, RecordStore};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    setup::telemetry::init_telemetry().map_err(|e| anyhow::anyhow!("telemetry init: {}", e))?;

    let config = Config::from_env()?;
    let port = config.server_port;

    let pool = setup::database::connect(&config).await?;
    let objects = lumina_storage::create_object_store(&config).await?;
    let records: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool));

    let state = Arc::new(AppState::new(config, objects, records));
    let router = setup::routes::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "starting lumina-api");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
