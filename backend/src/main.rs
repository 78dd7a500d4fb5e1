use std::sync::Arc;
use backend::{
    build_rocket,
    config::{Config, StoreBackend},
    queries::PgStore,
    routes::AppState,
    store::{ElectionStore, MemoryStore},
    ticker::run_status_ticker,
};
use shared::SystemClock;
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::{info, warn};

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting election server");

    let config = Config::from_lookup(|key| secret_store.get(key)).map_err(CustomError::new)?;
    info!("⚙️ Loaded config: {:?}", config);

    let store: Arc<dyn ElectionStore> = match config.store_backend {
        StoreBackend::Postgres => {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(CustomError::new)?;
            info!("📋 Migrations complete");
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("STORE_BACKEND=memory - elections will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let status_tick = config.status_tick;
    let state = AppState::new(store, Arc::new(SystemClock), config);
    tokio::spawn(run_status_ticker(state.processor.clone(), status_tick));

    Ok(build_rocket(state).into())
}
