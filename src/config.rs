use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::app::{CONFIG_PATH_ENV, DEFAULT_BIND_ADDR, DEFAULT_CONFIG_PATH, LOCK_FILE_NAME};
use crate::constants::store::DEFAULT_DATA_DIR;
use crate::error::AppError;
use crate::orders::OrderDefaults;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Where orders, batch events and API accounts are kept
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Lock file path; defaults to the OS temp dir
    #[serde(default)]
    pub lock_file: Option<PathBuf>,

    /// Fixed order fields not taken from the form
    #[serde(default)]
    pub orders: OrderDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data_dir: default_data_dir(),
            lock_file: None,
            orders: OrderDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Load from `$KABUS_CONFIG`, or `config.yaml` in the working directory.
    pub fn load() -> Result<Self, AppError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    /// A missing file gives the defaults; a malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, AppError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: AppConfig = serde_yaml::from_str(content)?;
        if config.orders.qty == 0 {
            return Err(AppError::Config("orders.qty must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.lock_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(LOCK_FILE_NAME))
    }
}
