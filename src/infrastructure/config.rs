use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub server_host: String,
    pub server_port: u16,
    pub max_db_connections: u32,

    // Exposes the unauthenticated demo-data endpoint
    pub demo_seed_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("GROWTH").try_parsing(true))
            .set_default("token_ttl_hours", 24)?
            .set_default("bcrypt_cost", 12)?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 5000)?
            .set_default("max_db_connections", 5)?
            .set_default("demo_seed_enabled", true)?
            .build()?;

        config.try_deserialize()
    }
}
