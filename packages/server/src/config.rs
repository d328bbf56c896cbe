use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding uploaded test images.
    pub uploads_dir: PathBuf,
    /// Upload size ceiling in bytes.
    pub max_upload_size: u64,
    /// Sniffed MIME types accepted for uploads.
    pub allowed_types: Vec<String>,
    /// Shared sentinel image assigned to tests without an upload.
    /// Never stored per-test and never deleted.
    pub default_image: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.uploads_dir", "./uploads")?
            .set_default("storage.max_upload_size", 5 * 1024 * 1024)?
            .set_default(
                "storage.allowed_types",
                vec![
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                    "image/webp".to_string(),
                ],
            )?
            .set_default("storage.default_image", "default.jpg")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., ETCHLAB__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("ETCHLAB").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
