//! Process-wide configuration for the remote storage proxies
//!
//! The configuration is read once at startup and injected into both proxies.
//! Values come from built-in defaults, an optional `config/media` file and
//! `MEDIA_*` environment variables, in increasing order of precedence.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{StorageError, StorageResult};

/// Default simple-upload endpoint of the remote storage service
pub const DEFAULT_UPLOAD_URL: &str = "https://you.ittybit.net";
/// Default listing endpoint of the remote storage service
pub const DEFAULT_LISTING_URL: &str = "https://api.ittybit.com/media";
/// Default address the proxy binds to
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3001";
/// Default request body limit for uploads (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const ENV_PREFIX: &str = "MEDIA";

/// Remote storage configuration struct
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Bearer credential for the remote storage API
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL objects are PUT under
    pub upload_url: String,
    /// Paginated listing endpoint
    pub listing_url: String,
    /// Address the proxy listens on
    pub bind_address: String,
    /// Maximum accepted request body for uploads, in bytes
    pub max_upload_bytes: usize,
    /// Directory multipart uploads are spooled to (OS temp dir when unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Load the configuration from `config/media.*` and the process environment
    ///
    /// # Environment Variables
    /// - `MEDIA_API_KEY`: remote storage credential (required at request time)
    /// - `MEDIA_UPLOAD_URL`: upload base URL (default: "https://you.ittybit.net")
    /// - `MEDIA_LISTING_URL`: listing endpoint (default: "https://api.ittybit.com/media")
    /// - `MEDIA_BIND_ADDRESS`: listen address (default: "0.0.0.0:3001")
    /// - `MEDIA_MAX_UPLOAD_BYTES`: upload body limit (default: 52428800)
    /// - `MEDIA_TEMP_DIR`: spool directory for uploads (default: OS temp dir)
    pub fn load() -> StorageResult<Self> {
        Self::build(true, Environment::with_prefix(ENV_PREFIX))
    }

    /// Build the configuration from an explicit set of `MEDIA_*` variables
    /// instead of the process environment.
    pub fn from_env_map(vars: config::Map<String, String>) -> StorageResult<Self> {
        Self::build(false, Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn build(with_file: bool, env: Environment) -> StorageResult<Self> {
        let mut builder = Config::builder()
            .set_default("upload_url", DEFAULT_UPLOAD_URL)?
            .set_default("listing_url", DEFAULT_LISTING_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?;

        if with_file {
            builder = builder.add_source(File::with_name("config/media").required(false));
        }

        let config: StorageConfig = builder.add_source(env).build()?.try_deserialize()?;
        Ok(config)
    }

    /// The configured API key, or `NotConfigured` when it is absent or blank
    pub fn api_key(&self) -> StorageResult<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(StorageError::NotConfigured),
        }
    }

    /// Directory used to spool multipart uploads
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
