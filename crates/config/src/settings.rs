use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub push: PushSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// External base URL used when building pagination links behind a proxy.
    /// Falls back to the request's Host header when unset.
    pub public_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

/// Verification settings for bearer tokens minted by the identity provider.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub issuer: String,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PushSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("BLOODLINK"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("app.public_url", None::<String>)?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "bloodlink")?
            .set_default("auth.secret", "change-me-in-production")?
            .set_default("auth.issuer", "bloodlink")?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("push.enabled", false)?
            .set_default("push.endpoint", "https://fcm.googleapis.com/fcm/send")?
            .set_default("push.api_key", "")?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
