//! HTTP server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Default listen address
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Upper bound for the artificial per-request delay
pub const MAX_SIMULATED_LATENCY_MS: u64 = 10_000;

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

/// Configuration for the school service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable permissive CORS
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,

    /// Delay applied before listing and adding schools
    pub simulated_latency_ms: u64,

    /// Start with the built-in demo schools
    pub demo_data: bool,

    /// JSON file of schools to start with (takes precedence over demo data)
    pub seed_file: Option<PathBuf>,

    /// Seed for the geocoder fallback jitter, random when unset
    pub geocode_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            enable_cors: true,
            enable_request_logging: true,
            simulated_latency_ms: 0,
            demo_data: true,
            seed_file: None,
            geocode_seed: None,
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulated_latency_ms > MAX_SIMULATED_LATENCY_MS {
            return Err(ConfigError::InvalidValue {
                field: "simulated_latency_ms".to_string(),
                reason: format!("Must be at most {MAX_SIMULATED_LATENCY_MS}"),
            });
        }

        if let Some(path) = &self.seed_file {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "seed_file".to_string(),
                    reason: "Path is empty".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn simulated_latency(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.simulated_latency_ms)
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    bind_address: Option<SocketAddr>,
    enable_cors: Option<bool>,
    enable_request_logging: Option<bool>,
    simulated_latency_ms: Option<u64>,
    demo_data: Option<bool>,
    seed_file: Option<PathBuf>,
    geocode_seed: Option<u64>,
}

impl ServerConfigBuilder {
    /// Set bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = Some(addr);
        self
    }

    /// Set bind address from string
    pub fn bind_address_str(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind_address = Some(addr.parse().map_err(|_| ConfigError::InvalidValue {
            field: "bind_address".to_string(),
            reason: format!("Invalid address: {addr}"),
        })?);
        Ok(self)
    }

    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = Some(enable);
        self
    }

    pub fn enable_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = Some(enable);
        self
    }

    pub fn simulated_latency_ms(mut self, ms: u64) -> Self {
        self.simulated_latency_ms = Some(ms);
        self
    }

    pub fn demo_data(mut self, enable: bool) -> Self {
        self.demo_data = Some(enable);
        self
    }

    pub fn seed_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.seed_file = Some(path.into());
        self
    }

    pub fn geocode_seed(mut self, seed: u64) -> Self {
        self.geocode_seed = Some(seed);
        self
    }

    /// Build the config
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();
        let config = ServerConfig {
            bind_address: self.bind_address.unwrap_or(defaults.bind_address),
            enable_cors: self.enable_cors.unwrap_or(defaults.enable_cors),
            enable_request_logging: self
                .enable_request_logging
                .unwrap_or(defaults.enable_request_logging),
            simulated_latency_ms: self
                .simulated_latency_ms
                .unwrap_or(defaults.simulated_latency_ms),
            demo_data: self.demo_data.unwrap_or(defaults.demo_data),
            seed_file: self.seed_file,
            geocode_seed: self.geocode_seed,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
