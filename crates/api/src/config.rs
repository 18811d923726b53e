use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Default upload size limit: 20 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for in-flight requests after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory uploaded files are written to and served from under `/static`.
    pub static_dir: PathBuf,
    /// Maximum accepted request body size in bytes (default: 20 MiB).
    pub max_upload_bytes: usize,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Third-party weather API settings.
    pub weather: WeatherConfig,
}

/// Settings for the weather proxy.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_url: String,
    pub api_key: String,
    /// City used when the client does not pass `q`.
    pub default_city: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                        |
    /// |-------------------------|------------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                      |
    /// | `PORT`                  | `3000`                                         |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`                        |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                                           |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                                           |
    /// | `STATIC_DIR`            | `static`                                       |
    /// | `MAX_UPLOAD_BYTES`      | `20971520`                                     |
    /// | `WEATHER_API_URL`       | `https://api.weatherapi.com/v1/current.json`   |
    /// | `WEATHER_API_KEY`       | empty                                          |
    /// | `WEATHER_DEFAULT_CITY`  | `Palma de Mallorca`                            |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let static_dir =
            PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()));

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let weather = WeatherConfig {
            api_url: std::env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "https://api.weatherapi.com/v1/current.json".into()),
            api_key: std::env::var("WEATHER_API_KEY").unwrap_or_default(),
            default_city: std::env::var("WEATHER_DEFAULT_CITY")
                .unwrap_or_else(|_| "Palma de Mallorca".into()),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            static_dir,
            max_upload_bytes,
            jwt,
            weather,
        }
    }
}
