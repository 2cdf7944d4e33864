//! Configuration validator for Vola-Auto
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, ExecutionConfig, LoggingConfig, OutputConfig, ToolConfig};
use tracing::warn;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_tool(&config.tool)?;
        Self::validate_output(&config.output)?;
        Self::validate_execution(&config.execution)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates the memory image settings, which only a real run needs
    pub fn validate_image(config: &Config) -> Result<(), ConfigError> {
        if config.image.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "Memory image path cannot be empty".to_string(),
            ));
        }
        if !config.image.path.exists() {
            warn!(path = %config.image.path.display(), "Memory image does not exist");
        }
        Ok(())
    }

    fn validate_tool(tool: &ToolConfig) -> Result<(), ConfigError> {
        if tool.runner.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Tool runner cannot be empty".to_string(),
            ));
        }
        if tool.binary.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Tool binary cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_output(output: &OutputConfig) -> Result<(), ConfigError> {
        if output.folder.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "Output folder cannot be empty".to_string(),
            ));
        }

        let dirs = [&output.artifacts_dir, &output.scratch_dir, &output.analytics_dir];
        if dirs.iter().any(|dir| dir.is_empty()) {
            return Err(ConfigError::Invalid(
                "Output subdirectories cannot be empty".to_string(),
            ));
        }

        // The gate treats a non-empty directory as a finished run
        if output.artifacts_dir == output.scratch_dir {
            return Err(ConfigError::Invalid(
                "Artifacts and scratch directories must differ".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_execution(execution: &ExecutionConfig) -> Result<(), ConfigError> {
        if execution.workers == 0 {
            return Err(ConfigError::Invalid(
                "Worker count must be at least 1".to_string(),
            ));
        }

        if execution.workers > 128 {
            return Err(ConfigError::Invalid(
                "Worker count cannot exceed 128".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_tool() {
        let mut config = Config::default();
        config.tool.runner = " ".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("runner"));

        let mut config = Config::default();
        config.tool.binary = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_worker_count() {
        let mut config = Config::default();
        config.execution.workers = 0;
        assert!(validate_config(&config).is_err());

        config.execution.workers = 129;
        assert!(validate_config(&config).is_err());

        config.execution.workers = 128;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_output() {
        let mut config = Config::default();
        config.output.scratch_dir = config.output.artifacts_dir.clone();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.output.folder = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("log level"));
    }

    #[test]
    fn test_image_path_required() {
        let config = Config::default();
        assert!(ConfigValidator::validate_image(&config).is_err());

        let mut config = Config::default();
        config.image.path = PathBuf::from("/cases/not-here.mem");
        assert!(ConfigValidator::validate_image(&config).is_ok());
    }
}
