use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::queue::ServiceMode;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub clinic: ClinicConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clinic: ClinicConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Clinic-level settings consumed by the queue engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClinicConfig {
    /// Display name, echoed in the config endpoint and startup log.
    #[serde(default = "default_clinic_name")]
    pub name: String,
    /// Whether the diagnostic stations (Lab, Imaging) exist in the
    /// topology. When false, attaching orders is rejected.
    #[serde(default = "default_diagnostics_enabled")]
    pub diagnostics_enabled: bool,
    /// Orchestration mode the engine starts in.
    #[serde(default)]
    pub default_mode: ServiceMode,
    /// Ring buffer capacity of the in-memory audit store.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            name: default_clinic_name(),
            diagnostics_enabled: default_diagnostics_enabled(),
            default_mode: ServiceMode::default(),
            audit_capacity: default_audit_capacity(),
        }
    }
}

fn default_clinic_name() -> String {
    "Clinicflow".to_string()
}

fn default_diagnostics_enabled() -> bool {
    true
}

fn default_audit_capacity() -> usize {
    1000
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Config view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub clinic: SanitizedClinicConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedClinicConfig {
    pub name: String,
    pub diagnostics_enabled: bool,
    pub default_mode: String,
    pub audit_capacity: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            clinic: SanitizedClinicConfig {
                name: config.clinic.name.clone(),
                diagnostics_enabled: config.clinic.diagnostics_enabled,
                default_mode: config.clinic.default_mode.to_string(),
                audit_capacity: config.clinic.audit_capacity,
            },
            server: config.server.clone(),
        }
    }
}
