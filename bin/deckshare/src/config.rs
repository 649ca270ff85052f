//! Start-up configuration: built-in defaults overlaid with `DECKSHARE_*`
//! environment variables (a `.env` file is loaded into the environment
//! beforehand).

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use secrecy::SecretString;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "DECKSHARE";

#[derive(Debug)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    /// Public origin; image URLs are `<base_url>/uploads/...`.
    pub base_url: String,
    pub jwt_secret: SecretString,
    pub jwt_expiry_hours: i64,
    pub cors_origin: String,
    pub max_body_bytes: usize,
    /// `0` disables the expiry sweeper.
    pub sweep_interval_secs: u64,
    pub log_json: bool,
}

#[derive(Deserialize)]
struct RawSettings {
    host: String,
    port: u16,
    database_url: String,
    upload_dir: PathBuf,
    base_url: String,
    jwt_secret: String,
    jwt_expiry_hours: i64,
    cors_origin: String,
    max_body_bytes: usize,
    sweep_interval_secs: u64,
    log_json: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env_map(None)
    }

    /// `vars` replaces the process environment when given.
    pub fn from_env_map(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3001_i64)?
            .set_default("database_url", "sqlite:deckshare.db")?
            .set_default("upload_dir", "./uploads")?
            .set_default("base_url", "http://localhost:3001")?
            .set_default("jwt_expiry_hours", 24_i64)?
            .set_default("cors_origin", "http://localhost:5173")?
            .set_default("max_body_bytes", 50_i64 * 1024 * 1024)?
            .set_default("sweep_interval_secs", 300_i64)?
            .set_default("log_json", false)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;

        if raw.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt_secret must not be empty".into()));
        }
        if raw.jwt_expiry_hours <= 0 {
            return Err(ConfigError::Message("jwt_expiry_hours must be positive".into()));
        }

        Ok(Self {
            host: raw.host,
            port: raw.port,
            database_url: raw.database_url,
            upload_dir: raw.upload_dir,
            base_url: raw.base_url.trim_end_matches('/').to_string(),
            jwt_secret: SecretString::from(raw.jwt_secret),
            jwt_expiry_hours: raw.jwt_expiry_hours,
            cors_origin: raw.cors_origin,
            max_body_bytes: raw.max_body_bytes,
            sweep_interval_secs: raw.sweep_interval_secs,
            log_json: raw.log_json,
        })
    }

    pub fn upload_url_prefix(&self) -> String {
        format!("{}/uploads", self.base_url)
    }
}
