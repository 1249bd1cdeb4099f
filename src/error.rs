use thiserror::Error;

/// Errors from the fallible edges of the crate: configuration and history import/export.
/// Analysis and transition tracking themselves never fail.
#[derive(Error, Debug)]
pub enum RegimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {}", .0.join(", "))]
    InvalidConfig(Vec<String>),
}

pub type Result<T> = std::result::Result<T, RegimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = RegimeError::InvalidConfig(vec![
            "min_confidence must be between 0 and 1".to_string(),
            "scaling_steps must be > 0".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: min_confidence must be between 0 and 1, scaling_steps must be > 0"
        );
    }
}
