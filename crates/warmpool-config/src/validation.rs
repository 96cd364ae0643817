//! Configuration validation framework

use crate::{ConfigError, ConfigResult};

/// Tracing levels accepted by the subscriber filter
const TRACING_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Trait for validating configuration values
pub trait Validate {
    /// Validate this configuration object
    ///
    /// # Errors
    /// Returns validation errors if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Validate a value is within a range
///
/// # Errors
/// Returns `ConfigError::OutOfRange` if value is outside the specified range
pub fn validate_range(value: u64, min: u64, max: u64, field_name: &str) -> ConfigResult<()> {
    if value < min || value > max {
        Err(ConfigError::OutOfRange {
            field: field_name.to_string(),
            value,
            min,
            max,
        })
    } else {
        Ok(())
    }
}

/// Validate a string is not empty
///
/// # Errors
/// Returns `ConfigError::MissingField` if the string is empty or whitespace-only
pub fn validate_non_empty(value: &str, field_name: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField {
            field: field_name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validate a tracing level name (case-insensitive)
///
/// # Errors
/// Returns `ConfigError::Generic` if the level is not a known tracing level
pub fn validate_tracing_level(level: &str) -> ConfigResult<()> {
    let normalized = level.to_ascii_lowercase();
    if TRACING_LEVELS.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(ConfigError::Generic {
            message: format!("Invalid tracing level: {level}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_range_bounds_are_inclusive() {
        assert!(validate_range(1, 1, 10, "field").is_ok());
        assert!(validate_range(10, 1, 10, "field").is_ok());
        assert!(validate_range(0, 1, 10, "field").is_err());
        assert!(validate_range(11, 1, 10, "field").is_err());
    }

    #[test]
    fn test_validate_non_empty_rejects_whitespace() {
        let result = validate_non_empty("   ", "host");
        assert!(matches!(result, Err(ConfigError::MissingField { field }) if field == "host"));
    }

    #[test]
    fn test_validate_tracing_level() {
        assert!(validate_tracing_level("INFO").is_ok());
        assert!(validate_tracing_level("debug").is_ok());
        assert!(validate_tracing_level("loud").is_err());
    }
}
