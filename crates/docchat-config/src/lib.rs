//! docchat configuration system.
//!
//! TOML-based configuration with serde defaults so partial configs work
//! out of the box. The API key is deliberately not part of the file; it
//! comes from the `GEMINI_API_KEY` environment variable and is only
//! checked when the first remote call is made.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::DocChatConfig;

use docchat_common::ConfigError;

/// Load config from the platform default path.
///
/// Loads `config.toml` from the OS config directory, creating a default
/// file if none exists, and validates the result.
pub fn load_config() -> Result<DocChatConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = DocChatConfig::default();
        assert!(validation::validate(&config).is_ok());
    }
}
