use std::sync::Arc;

use kabus_trader::api::{run_server, AppState};
use kabus_trader::config::AppConfig;
use kabus_trader::constants::app::EVENT_BUS_CAPACITY;
use kabus_trader::error::{AppError, LockError};
use kabus_trader::lock::InstanceLock;
use kabus_trader::store::{AccountStore, JsonlOrderStore, OrderSink};
use kabus_trader::EventBus;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // Setup Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting kabuS order desk...");

    let config = AppConfig::load()?;
    info!("Loaded Configuration: {:?}", config);

    let _lock = match InstanceLock::acquire(config.lock_path()) {
        Ok(lock) => lock,
        Err(e @ LockError::AlreadyRunning { .. }) => {
            error!("{}; exiting.", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let sink: Arc<dyn OrderSink> = Arc::new(JsonlOrderStore::new(&config.data_dir));
    let accounts = AccountStore::new(&config.data_dir);
    let bus = EventBus::new(EVENT_BUS_CAPACITY);

    let state = AppState::new(sink, accounts, config.orders.clone(), bus)
        .await
        .map_err(|e| AppError::Scheduler(e.to_string()))?;

    info!("Initializing API Server...");
    run_server(state, &config.server.bind_addr).await
}
