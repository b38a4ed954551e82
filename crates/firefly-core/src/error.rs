//! Error types for the firefly engine

use thiserror::Error;

/// The main error type for firefly operations
///
/// Only construction and configuration paths return errors. Per-frame
/// updates degrade to no-ops instead.
#[derive(Debug, Error)]
pub enum FireflyError {
    #[error("Invalid config field `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Element not found in layout: {0}")]
    UnknownElement(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for firefly operations
pub type Result<T> = std::result::Result<T, FireflyError>;

impl FireflyError {
    /// Shorthand for an `InvalidConfig` error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FireflyError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check `value` lies in `[min, max]`, naming the field on failure
    pub fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
        if value.is_finite() && value >= min && value <= max {
            Ok(())
        } else {
            Err(FireflyError::ValueOutOfRange {
                field: field.to_string(),
                min,
                max,
                value,
            })
        }
    }
}

impl From<toml::de::Error> for FireflyError {
    fn from(err: toml::de::Error) -> Self {
        FireflyError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for FireflyError {
    fn from(err: toml::ser::Error) -> Self {
        FireflyError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_check_accepts_bounds() {
        assert!(FireflyError::check_range("x", 0.0, 0.0, 1.0).is_ok());
        assert!(FireflyError::check_range("x", 1.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_range_check_rejects_nan_and_outside() {
        assert!(FireflyError::check_range("x", f64::NAN, 0.0, 1.0).is_err());
        let err = FireflyError::check_range("damping", 1.5, 0.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("damping"));
    }

    #[test]
    fn test_toml_errors_convert() {
        let parsed: std::result::Result<toml::value::Table, _> = toml::from_str("x = [");
        let err: FireflyError = parsed.unwrap_err().into();
        assert!(matches!(err, FireflyError::TomlParseError(_)));
    }
}
