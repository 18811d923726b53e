use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::FileStore;
use crate::weather::WeatherClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: rentora_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upload storage below the static directory.
    pub files: Arc<FileStore>,
    /// Client for the third-party weather API.
    pub weather: Arc<WeatherClient>,
}

impl AppState {
    /// Assemble the state from a pool and a loaded configuration.
    pub fn new(pool: rentora_db::DbPool, config: ServerConfig) -> Self {
        let files = Arc::new(FileStore::new(config.static_dir.clone()));
        let weather = Arc::new(WeatherClient::new(config.weather.clone()));
        Self {
            pool,
            config: Arc::new(config),
            files,
            weather,
        }
    }
}
