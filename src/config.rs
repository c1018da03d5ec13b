//! Startup configuration.
//!
//! Everything comes from environment variables, with CLI flags taking
//! precedence. The API key is process-global and fatal when absent; port
//! resolution is per instance so one misconfigured instance cannot keep
//! the others from serving.

use std::env;

use thiserror::Error;

/// Environment variable holding the Google Maps API key.
pub const API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Google Maps API key not found: set {API_KEY_VAR} or pass --apikey")]
    MissingApiKey,

    #[error("[{instance}] port variable {var} is not set")]
    MissingPort {
        instance: &'static str,
        var: &'static str,
    },

    #[error("[{instance}] invalid port {value:?} in {var}")]
    InvalidPort {
        instance: &'static str,
        var: &'static str,
        value: String,
    },

    #[error("no server instance could be started")]
    NoInstances,
}

/// One configured HTTP server instance: a display name and the variable
/// its listen port comes from.
pub struct InstanceConfig {
    pub name: &'static str,
    pub port_var: &'static str,
}

impl InstanceConfig {
    /// Resolve this instance's listen port from the environment.
    pub fn resolve_port(&self) -> Result<u16, ConfigError> {
        let value = env::var(self.port_var).map_err(|_| ConfigError::MissingPort {
            instance: self.name,
            var: self.port_var,
        })?;
        value
            .parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .ok_or(ConfigError::InvalidPort {
                instance: self.name,
                var: self.port_var,
                value,
            })
    }
}

/// The instance table. A single entry today; more instances would each
/// name their own port variable.
pub fn instances() -> &'static [InstanceConfig] {
    const INSTANCES: &[InstanceConfig] = &[InstanceConfig {
        name: "MCP-Server",
        port_var: "MCP_SERVER_PORT",
    }];
    INSTANCES
}

/// Resolve every instance's port, skipping the misconfigured ones so a
/// bad instance cannot keep the others from serving. Skips are logged.
pub fn resolve_instances(instances: &[InstanceConfig]) -> Vec<(&'static str, u16)> {
    let mut resolved = Vec::new();
    for instance in instances {
        match instance.resolve_port() {
            Ok(port) => resolved.push((instance.name, port)),
            Err(e) => tracing::error!(error = %e, "skipping instance"),
        }
    }
    resolved
}

/// Resolve the API key: CLI override first, then the environment.
pub fn api_key(cli_override: Option<String>) -> Result<String, ConfigError> {
    cli_override
        .or_else(|| env::var(API_KEY_VAR).ok())
        .filter(|key| !key.is_empty())
        .ok_or(ConfigError::MissingApiKey)
}
