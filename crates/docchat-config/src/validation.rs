//! Config value validation.

use docchat_common::ConfigError;

use crate::schema::DocChatConfig;

pub fn validate(config: &DocChatConfig) -> Result<(), ConfigError> {
    if config.api.model.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.model must not be empty".to_string(),
        ));
    }
    if config.api.max_output_tokens == 0 {
        return Err(ConfigError::ValidationError(
            "api.max_output_tokens must be at least 1".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&config.api.temperature) {
        return Err(ConfigError::ValidationError(format!(
            "api.temperature must be in [0.0, 2.0], got {}",
            config.api.temperature
        )));
    }
    if config.logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "logging.level must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(validate(&DocChatConfig::default()).is_ok());
    }

    #[test]
    fn empty_model_rejected() {
        let mut config = DocChatConfig::default();
        config.api.model = "  ".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("api.model"));
    }

    #[test]
    fn zero_max_output_tokens_rejected() {
        let mut config = DocChatConfig::default();
        config.api.max_output_tokens = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        let mut config = DocChatConfig::default();
        config.api.temperature = 2.5;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("temperature"));

        config.api.temperature = -0.1;
        assert!(validate(&config).is_err());
    }
}
