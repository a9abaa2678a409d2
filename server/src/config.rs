//! Process configuration.
//!
//! Values come from command-line flags, falling back to environment
//! variables, falling back to defaults. Outside production a `.env` file in
//! the working directory is loaded first, so its entries act as environment
//! variables.

use std::path::PathBuf;

use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderValue;
use clap::Parser;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid CORS origin `{origin}`: {source}")]
    InvalidOrigin {
        origin: String,
        #[source]
        source: InvalidHeaderValue,
    },
}

#[derive(Debug, Clone, Parser)]
#[command(name = "todo-server", version, about = "REST API for todos")]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// JSON file the store is loaded from and saved to. In-memory if unset.
    #[arg(long, env = "TODO_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Allowed CORS origins. Any origin is allowed when empty.
    #[arg(long = "cors-origin", env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load `.env` (unless `APP_ENV=production`), then parse flags and env.
    ///
    /// Exits the process with usage on invalid input, as clap does.
    pub fn load() -> Self {
        if std::env::var("APP_ENV").as_deref() != Ok("production") {
            if let Err(err) = dotenvy::dotenv() {
                if !err.not_found() {
                    tracing::warn!(error = %err, "ignoring unreadable .env file");
                }
            }
        }
        Self::parse()
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        if self.cors_origins.is_empty() {
            return Ok(CorsLayer::permissive());
        }
        let origins = self
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim()).map_err(|source| ConfigError::InvalidOrigin {
                    origin: origin.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any))
    }
}
