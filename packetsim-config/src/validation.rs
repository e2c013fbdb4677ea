//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::Invalid {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate that a value lies in an inclusive range
pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::Invalid {
            domain: domain.to_string(),
            message: format!(
                "{} must be between {} and {}, got {}",
                field_name, min, max, value
            ),
        });
    }
    Ok(())
}

/// Validate a port number
pub fn validate_port_range(port: u16, field_name: &str, domain: &str) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::Invalid {
            domain: domain.to_string(),
            message: format!("{} cannot be 0", field_name),
        });
    }

    // Port 1-1023 are typically reserved for system services
    if port <= 1023 {
        log::warn!("{} port {} is in the reserved range (1-1023)", field_name, port);
    }

    Ok(())
}

/// Validate a route prefix such as `/api/v1`
pub fn validate_route_prefix(prefix: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        return Err(ConfigError::Invalid {
            domain: domain.to_string(),
            message: format!(
                "{} must start with '/', must not end with '/' and cannot be the root, got '{}'",
                field_name, prefix
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_string() {
        assert!(validate_required_string("value", "field", "test").is_ok());
        assert!(validate_required_string("", "field", "test").is_err());
        assert!(validate_required_string("   ", "field", "test").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1, "field", "test").is_ok());
        assert!(validate_positive(0, "field", "test").is_err());
        assert!(validate_positive(-1, "field", "test").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(1, 1, 10, "field", "test").is_ok());
        assert!(validate_range(10, 1, 10, "field", "test").is_ok());
        assert!(validate_range(0, 1, 10, "field", "test").is_err());
        assert!(validate_range(11, 1, 10, "field", "test").is_err());
    }

    #[test]
    fn test_validate_port_range() {
        assert!(validate_port_range(8080, "port", "test").is_ok());
        assert!(validate_port_range(0, "port", "test").is_err());
    }

    #[test]
    fn test_validate_route_prefix() {
        assert!(validate_route_prefix("/api/v1", "api_prefix", "server").is_ok());
        assert!(validate_route_prefix("api/v1", "api_prefix", "server").is_err());
        assert!(validate_route_prefix("/api/", "api_prefix", "server").is_err());
        assert!(validate_route_prefix("/", "api_prefix", "server").is_err());
    }
}
