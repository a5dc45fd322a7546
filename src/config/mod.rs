//! Configuration management for schoolfinder
//!
//! Settings come from a TOML file or from environment variables; command-line
//! flags are applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::server::ServerConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SCHOOLFINDER_HOST") {
            self.server.bind_address = resolve_host(&host, self.server.bind_address.port())?;
        }

        let port = std::env::var("SCHOOLFINDER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok();
        if let Some(port) = port {
            let port: u16 = port
                .parse()
                .with_context(|| format!("Invalid port: {port}"))?;
            self.server.bind_address.set_port(port);
        }

        if let Ok(ms) = std::env::var("SCHOOLFINDER_LATENCY_MS") {
            self.server.simulated_latency_ms = ms
                .parse()
                .with_context(|| format!("Invalid SCHOOLFINDER_LATENCY_MS: {ms}"))?;
        }

        if let Ok(path) = std::env::var("SCHOOLFINDER_SEED_FILE") {
            self.server.seed_file = Some(PathBuf::from(path));
        }

        if let Ok(level) = std::env::var("SCHOOLFINDER_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("SCHOOLFINDER_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.logging.validate()
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            anyhow::bail!(
                "logging.level must be one of {}, got {}",
                LOG_LEVELS.join(", "),
                self.level
            );
        }

        if !LOG_FORMATS.contains(&self.format.as_str()) {
            anyhow::bail!(
                "logging.format must be one of {}, got {}",
                LOG_FORMATS.join(", "),
                self.format
            );
        }

        Ok(())
    }

    /// Filter directives used when `RUST_LOG` is not set
    ///
    /// `verbose` raises the crate and HTTP layers to debug.
    pub fn filter_directives(&self, verbose: bool) -> String {
        let level = if verbose { "debug" } else { self.level.as_str() };
        format!("schoolfinder={level},tower_http={level},warn")
    }

    /// Build the subscriber filter, preferring `RUST_LOG` when present
    pub fn env_filter(&self, verbose: bool) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        EnvFilter::try_new(self.filter_directives(verbose))
            .with_context(|| format!("Invalid log level: {}", self.level))
    }
}

/// Resolve a host name or IP literal to a bind address
pub fn resolve_host(host: &str, port: u16) -> Result<SocketAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Invalid host address: {host}"))?
        .next()
        .with_context(|| format!("Host resolved to no addresses: {host}"))
}
