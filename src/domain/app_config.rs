//! Application configuration
//! Values are layered by the config service (defaults, TOML file, environment)

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,

    #[validate(nested)]
    pub model: ModelConfig,

    #[validate(nested)]
    pub loader: LoaderConfig,

    #[validate(nested)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,

    #[validate(range(min = 1))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Locations of the pre-trained classifier artifacts
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModelConfig {
    #[validate(length(min = 1))]
    pub model_path: String,

    #[validate(length(min = 1))]
    pub vectorizer_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: "model.json".to_string(),
            vectorizer_path: "vectorizer.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoaderConfig {
    /// Rows skipped on the second parse when the header is not on the first row
    #[validate(range(max = 50))]
    pub header_retry_skip_rows: usize,

    /// Largest accepted upload, in bytes
    #[validate(range(min = 1024))]
    pub max_upload_bytes: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            header_retry_skip_rows: 2,
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, `RUST_LOG` wins when set
    #[validate(length(min = 1))]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
