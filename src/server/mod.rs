//! HTTP surface of the school service
//!
//! # Routes
//!
//! ```text
//! GET  /geocode?address=<text>              -> {latitude, longitude}
//! GET  /schools?latitude=<n>&longitude=<n>  -> {success, count, schools}
//! POST /schools {name, address, latitude, longitude}
//!                                           -> {success, message, schoolId}
//! GET  /health                              -> service health
//! GET  /stats                               -> registry statistics
//! ```
//!
//! Every route is also served under `/api`.
//!
//! # Usage
//!
//! ```ignore
//! use schoolfinder::server::{SchoolServer, ServerConfig};
//!
//! let server = SchoolServer::new(ServerConfig::default())?;
//! server.start().await?;
//! ```

pub mod api;
pub mod client;
pub mod config;
#[allow(clippy::module_inception)]
pub mod server;

// Re-export main types
pub use client::{ClientConfig, ClientError, SchoolClient};
pub use config::{ConfigError, ServerConfig};
pub use server::{AppState, SchoolServer, ServerError};
