//! School service implementation
//!
//! Builds the shared state from a [`ServerConfig`], wires the router with
//! its middleware and runs it on a Tokio listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::geocode::Geocoder;
use crate::registry::SchoolRegistry;

use super::api::{create_router, panic_response};
use super::config::ServerConfig;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// School registry
    pub registry: Arc<SchoolRegistry>,

    /// Place-name geocoder
    pub geocoder: Arc<Geocoder>,

    /// Jitter source for geocoder fallbacks
    pub jitter: Arc<Mutex<ChaCha8Rng>>,

    /// Server start time
    pub start_time: Instant,

    /// Configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Build state around an existing registry
    pub fn new(config: ServerConfig, registry: SchoolRegistry) -> Self {
        let rng = match config.geocode_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            registry: Arc::new(registry),
            geocoder: Arc::new(Geocoder::default()),
            jitter: Arc::new(Mutex::new(rng)),
            start_time: Instant::now(),
            config,
        }
    }

    /// Sleep for the configured artificial latency, if any
    pub async fn simulate_latency(&self) {
        let latency = self.config.simulated_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

// ============================================================================
// School Server
// ============================================================================

/// HTTP server for the school service
pub struct SchoolServer {
    config: ServerConfig,
    state: AppState,
}

impl SchoolServer {
    /// Create a server, loading the initial registry from the config
    pub fn new(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let registry = match (&config.seed_file, config.demo_data) {
            (Some(path), _) => SchoolRegistry::from_seed_file(path)?,
            (None, true) => SchoolRegistry::with_demo_data(),
            (None, false) => SchoolRegistry::new(),
        };

        Ok(Self::with_registry(config, registry))
    }

    /// Create a server around an existing registry
    pub fn with_registry(config: ServerConfig, registry: SchoolRegistry) -> Self {
        let state = AppState::new(config.clone(), registry);
        Self { config, state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router =
            create_router(self.state.clone()).layer(CatchPanicLayer::custom(panic_response));

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<()> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        tracing::info!(
            address = %addr,
            schools = self.state.registry.len().await,
            "School service listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("School service shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
            simulated_latency_ms: self.config.simulated_latency_ms,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
    pub simulated_latency_ms: u64,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "School Service\n\
             {:-<40}\n\
             Bind Address: {}\n\
             CORS: {}\n\
             Request Logging: {}\n\
             Simulated Latency: {}ms",
            "",
            self.bind_address,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" },
            self.simulated_latency_ms
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Error, Debug, Clone)]
pub enum ServerError {
    #[error("Failed to bind: {0}")]
    Bind(String),

    #[error("Server error: {0}")]
    Serve(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorCategory, RegistryError};
    use std::io::Write;

    #[test]
    fn test_server_creation() {
        let server = SchoolServer::new(ServerConfig::default());
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_info() {
        let config = ServerConfig::builder()
            .enable_cors(false)
            .simulated_latency_ms(500)
            .build()
            .unwrap();
        let info = SchoolServer::new(config).unwrap().info();

        assert!(!info.cors_enabled);
        assert_eq!(info.simulated_latency_ms, 500);
        assert!(info.display().contains("Simulated Latency: 500ms"));
    }

    #[tokio::test]
    async fn test_registry_source_follows_config() {
        let demo = SchoolServer::new(ServerConfig::default()).unwrap();
        assert_eq!(demo.state().registry.len().await, 5);

        let config = ServerConfig::builder().demo_data(false).build().unwrap();
        let empty = SchoolServer::new(config).unwrap();
        assert!(empty.state().registry.is_empty().await);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 3, "name": "Hill School", "address": "3 Hill Rd", "latitude": 10, "longitude": 20}}]"#
        )
        .unwrap();
        let config = ServerConfig::builder().seed_file(file.path()).build().unwrap();
        let seeded = SchoolServer::new(config).unwrap();
        assert_eq!(seeded.state().registry.len().await, 1);
    }

    #[test]
    fn test_missing_seed_file_fails() {
        let config = ServerConfig::builder()
            .seed_file("/nonexistent/schools.json")
            .build()
            .unwrap();
        let err = SchoolServer::new(config).err().unwrap();
        assert!(matches!(err, Error::Registry(RegistryError::SeedFile { .. })));
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ServerConfig {
            simulated_latency_ms: u64::MAX,
            ..Default::default()
        };
        let err = SchoolServer::new(config).err().unwrap();
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[tokio::test]
    async fn test_simulated_latency_disabled_by_default() {
        let state = SchoolServer::new(ServerConfig::default()).unwrap().state();
        let started = Instant::now();
        state.simulate_latency().await;
        assert!(started.elapsed() < std::time::Duration::from_millis(50));
    }
}
