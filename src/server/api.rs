//! REST API handlers for the school service
//!
//! Every route is served at the root and again under `/api`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Coordinate, NewSchool, School, ValidationError};
use crate::registry::RegistryStats;

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Error body returned for every non-2xx response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: None,
        }
    }
}

/// `GET /schools` response
#[derive(Debug, Serialize, Deserialize)]
pub struct SchoolsResponse {
    pub success: bool,
    pub count: usize,
    pub schools: Vec<School>,
}

/// `POST /schools` response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSchoolResponse {
    pub success: bool,
    pub message: String,
    pub school_id: u64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub timestamp: String,
    pub schools: usize,
}

/// Stats response
///
/// `closest` is present only when the request names a point.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub registry: RegistryStats,
    pub uptime_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest: Option<ClosestSchool>,
}

/// Nearest school with a directions link from the query point
#[derive(Debug, Serialize, Deserialize)]
pub struct ClosestSchool {
    #[serde(flatten)]
    pub school: School,
    pub directions_url: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: Option<String>,
}

/// Point query shared by `GET /schools` and `GET /stats`
#[derive(Debug, Deserialize)]
pub struct SchoolsQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl SchoolsQuery {
    /// Parse and range-check the query point
    pub fn origin(&self) -> Result<Coordinate, ValidationError> {
        let origin = Coordinate::new(
            parse_number("latitude", self.latitude.as_deref())?,
            parse_number("longitude", self.longitude.as_deref())?,
        );
        origin.validate()?;
        Ok(origin)
    }

    fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none()
    }
}

/// A coordinate field sent either as a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl NumericField {
    fn parse(field: &'static str, value: Option<&Self>) -> Result<f64, ValidationError> {
        match value {
            None => Err(ValidationError::MissingField(field)),
            Some(Self::Number(n)) => Ok(*n),
            Some(Self::Text(text)) => parse_number(field, Some(text.as_str())),
        }
    }
}

/// `POST /schools` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddSchoolRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<NumericField>,
    pub longitude: Option<NumericField>,
}

impl AddSchoolRequest {
    /// Check presence of every field and convert coordinates to numbers
    ///
    /// Range checks are left to the registry.
    pub fn into_new_school(self) -> Result<NewSchool, ValidationError> {
        let name = required_text("name", self.name)?;
        let address = required_text("address", self.address)?;
        let latitude = NumericField::parse("latitude", self.latitude.as_ref())?;
        let longitude = NumericField::parse("longitude", self.longitude.as_ref())?;

        Ok(NewSchool {
            name,
            address,
            latitude,
            longitude,
        })
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn parse_number(field: &'static str, value: Option<&str>) -> Result<f64, ValidationError> {
    let text = match value.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ValidationError::MissingField(field)),
    };

    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            value: text.to_string(),
        })
}

// ============================================================================
// API Errors
// ============================================================================

/// Errors surfaced to HTTP callers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Required query or body field absent
    #[error("{0}")]
    MissingParameter(String),

    /// Value present but unusable
    #[error("{0}")]
    InvalidValue(String),

    /// Anything else
    #[error("{error}: {details}")]
    Internal { error: String, details: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidValue(_) => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(_) => Self::MissingParameter(err.to_string()),
            _ => Self::InvalidValue(err.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidValue(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidValue(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::MissingParameter(message) | Self::InvalidValue(message) => {
                ErrorResponse::new(message)
            }
            Self::Internal { error, details } => ErrorResponse {
                error,
                details: Some(details),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Turn a handler panic into a `500 {error, details}` response
pub fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown error".to_string()
    };

    tracing::error!(details = %details, "Request handler panicked");

    ApiError::Internal {
        error: "Internal server error".to_string(),
        details,
    }
    .into_response()
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/geocode", get(geocode))
        .route("/schools", get(list_schools).post(add_school))
        .route("/health", get(health_check))
        .route("/stats", get(get_stats));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Resolve a free-text address
async fn geocode(
    State(state): State<AppState>,
    query: Result<Query<GeocodeQuery>, QueryRejection>,
) -> Result<Json<Coordinate>, ApiError> {
    let Query(query) = query?;

    let address = match query.address {
        Some(address) if !address.trim().is_empty() => address,
        _ => {
            return Err(ApiError::MissingParameter(
                "Address parameter is required".to_string(),
            ))
        }
    };

    let coordinate = {
        let mut jitter = state.jitter.lock().await;
        state.geocoder.geocode(&address, &mut *jitter)
    };

    tracing::info!(address = %address, %coordinate, "Geocoded address");
    Ok(Json(coordinate))
}

/// List schools nearest first
async fn list_schools(
    State(state): State<AppState>,
    query: Result<Query<SchoolsQuery>, QueryRejection>,
) -> Result<Json<SchoolsResponse>, ApiError> {
    let Query(query) = query?;
    let origin = query.origin()?;

    state.simulate_latency().await;

    let schools = state.registry.rank(origin).await;
    tracing::info!(%origin, count = schools.len(), "Listed schools");

    Ok(Json(SchoolsResponse {
        success: true,
        count: schools.len(),
        schools,
    }))
}

/// Register a new school
async fn add_school(
    State(state): State<AppState>,
    body: Result<Json<AddSchoolRequest>, JsonRejection>,
) -> Result<Json<AddSchoolResponse>, ApiError> {
    let Json(request) = body?;
    let school = request.into_new_school()?;

    state.simulate_latency().await;

    let name = school.name.clone();
    let school_id = state.registry.append(school).await.map_err(|e| {
        tracing::warn!(error = %e, "Rejected school");
        ApiError::from(e)
    })?;

    tracing::info!(school_id, name = %name, "School added");

    Ok(Json(AddSchoolResponse {
        success: true,
        message: "School added successfully".to_string(),
        school_id,
    }))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        schools: state.registry.len().await,
    })
}

/// Registry statistics, plus the closest school when a point is given
async fn get_stats(
    State(state): State<AppState>,
    query: Result<Query<SchoolsQuery>, QueryRejection>,
) -> Result<Json<StatsResponse>, ApiError> {
    let Query(query) = query?;

    let closest = if query.is_empty() {
        None
    } else {
        let origin = query.origin()?;
        state
            .registry
            .closest(origin)
            .await
            .map(|school| ClosestSchool {
                directions_url: school.directions_url(origin),
                school,
            })
    };

    Ok(Json(StatsResponse {
        registry: state.registry.stats().await,
        uptime_secs: state.start_time.elapsed().as_secs(),
        closest,
    }))
}

// ============================================================================
// Tests
// ============================================================================
