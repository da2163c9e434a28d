use serde::Deserialize;
use service_core::config::{self as core_config, get_env};
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
}

/// Where raw uploads and converted documents are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub output_dir: String,
}

impl ConverterConfig {
    /// Storage directories default to `uploads` and `output` in every
    /// environment.
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        Ok(ConverterConfig {
            common: common_config,
            storage: StorageConfig {
                upload_dir: get_env("STORAGE_UPLOAD_DIR", Some("uploads"), false)?,
                output_dir: get_env("STORAGE_OUTPUT_DIR", Some("output"), false)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_defaults_apply_in_production() {
        std::env::set_var("ENVIRONMENT", "prod");
        std::env::remove_var("STORAGE_UPLOAD_DIR");
        std::env::remove_var("STORAGE_OUTPUT_DIR");

        let config = ConverterConfig::load();
        std::env::remove_var("ENVIRONMENT");

        let config = config.expect("defaults should satisfy production");
        assert_eq!(config.storage.upload_dir, "uploads");
        assert_eq!(config.storage.output_dir, "output");
    }
}
