use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Clinic name is not empty
/// - Audit capacity is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.clinic.name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "clinic.name cannot be empty".to_string(),
        ));
    }

    if config.clinic.audit_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "clinic.audit_capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}
