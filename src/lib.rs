//! schoolfinder - find nearby schools and register new ones
//!
//! A small web service that ranks schools by great-circle distance from a
//! query point, registers new schools in an in-memory registry, and resolves
//! free-text place names through a mock geocoder.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`geo`] - Haversine distance
//! - [`models`] - School and coordinate types, field validation
//! - [`registry`] - In-memory school registry
//! - [`ranking`] - Distance annotation and ordering
//! - [`geocode`] - Table-driven mock geocoder
//! - [`server`] - HTTP API, server and client
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```
//! use schoolfinder::models::{Coordinate, NewSchool};
//! use schoolfinder::registry::SchoolRegistry;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> schoolfinder::error::Result<()> {
//! let registry = SchoolRegistry::new();
//! registry.append(NewSchool::new("Central High School", "123 Main St", 40.7128, -74.006)).await?;
//! registry.append(NewSchool::new("Westside Elementary", "456 Park Ave", 40.73, -74.02)).await?;
//!
//! let ranked = registry.rank(Coordinate::new(40.73, -74.02)).await;
//! assert_eq!(ranked[0].name, "Westside Elementary");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod models;
pub mod ranking;
pub mod registry;
pub mod server;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::geocode::Geocoder;
    pub use crate::models::{Coordinate, NewSchool, School, ValidationError};
    pub use crate::registry::SchoolRegistry;
    pub use crate::server::{SchoolClient, SchoolServer, ServerConfig};
}

// Direct re-exports for convenience
pub use models::{Coordinate, NewSchool, School};
