//! Unified error handling for the schoolfinder crate
//!
//! Each module owns a focused error type; [`Error`] wraps them for the entry
//! points that cross module boundaries, such as [`SchoolServer`].
//!
//! - [`ErrorCategory`] - Classification used when logging failures
//! - [`Error`] - Unified error enum wrapping the domain errors
//!
//! [`SchoolServer`]: crate::server::SchoolServer

use thiserror::Error;

pub use crate::models::ValidationError;
pub use crate::registry::RegistryError;
pub use crate::server::config::ConfigError;
pub use crate::server::ServerError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Caller supplied a missing or invalid value
    Validation,
    /// Configuration errors
    Config,
    /// Listener errors
    Network,
    /// Seed file errors
    Storage,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Config => "config",
            Self::Network => "network",
            Self::Storage => "storage",
        }
    }
}

/// Unified error type for the schoolfinder crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Registry(RegistryError::SeedFile { .. }) => ErrorCategory::Storage,
            Self::Registry(_) => ErrorCategory::Validation,
            Self::Config(_) => ErrorCategory::Config,
            Self::Server(_) => ErrorCategory::Network,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
