use serde::Deserialize;
use service_core::config::{default_port, get_env};
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct GreetingConfig {
    pub port: u16,
}

impl GreetingConfig {
    /// Port comes from `PORT`, defaulting to 8080.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let raw = get_env("PORT", Some(&default_port().to_string()), false)?;
        Ok(GreetingConfig {
            port: parse_port(&raw)?,
        })
    }
}

pub fn parse_port(raw: &str) -> Result<u16, AppError> {
    raw.trim().parse::<u16>().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Invalid PORT value {:?}: {}", raw, e))
    })
}
