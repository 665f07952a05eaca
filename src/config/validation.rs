use super::models::Config;
use thiserror::Error;

/// Longest extension length we accept as a discovery cutoff
const MAX_EXTENSION_LEN_LIMIT: usize = 255;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("registry.lsregister_path must not be empty")]
    EmptyLsregisterPath,

    #[error("registry.max_extension_len must be between 1 and {limit}, got {actual}")]
    InvalidMaxExtensionLen { actual: usize, limit: usize },

    #[error("logging.filter must not be empty")]
    EmptyLogFilter,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_registry(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_registry(config: &Config) -> Result<(), ValidationError> {
    if config.registry.lsregister_path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyLsregisterPath);
    }

    let actual = config.registry.max_extension_len;
    if actual == 0 || actual > MAX_EXTENSION_LEN_LIMIT {
        return Err(ValidationError::InvalidMaxExtensionLen {
            actual,
            limit: MAX_EXTENSION_LEN_LIMIT,
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> Result<(), ValidationError> {
    if config.logging.filter.trim().is_empty() {
        return Err(ValidationError::EmptyLogFilter);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_lsregister_path() {
        let mut config = Config::default();
        config.registry.lsregister_path = PathBuf::new();

        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyLsregisterPath)
        ));
    }

    #[test]
    fn test_max_extension_len_bounds() {
        let mut config = Config::default();

        config.registry.max_extension_len = 0;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::InvalidMaxExtensionLen { actual: 0, .. })
        ));

        config.registry.max_extension_len = 256;
        assert!(validate(&config).is_err());

        config.registry.max_extension_len = 255;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_blank_log_filter() {
        let mut config = Config::default();
        config.logging.filter = "   ".to_string();

        assert!(matches!(validate(&config), Err(ValidationError::EmptyLogFilter)));
    }
}
