//! In-memory school registry
//!
//! The registry owns every [`School`] record for the lifetime of the
//! process. Records are appended, never updated or removed, and listing
//! returns them in insertion order.
//!
//! Identifier assignment happens under the same write guard as the insert,
//! so concurrent appends always receive distinct identifiers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Coordinate, NewSchool, School, ValidationError};
use crate::ranking;

// ============================================================================
// Demo data
// ============================================================================

/// Schools loaded when the registry starts with demo data
pub fn demo_schools() -> Vec<School> {
    [
        (1, "Central High School", "123 Main St, City Center", 40.7128, -74.006),
        (2, "Westside Elementary", "456 Park Ave, West District", 40.73, -74.02),
        (3, "Eastside Middle School", "789 Broadway, East District", 40.7, -73.98),
        (4, "North County Academy", "101 North Rd, North District", 40.75, -74.01),
        (5, "South Bay School", "202 South St, South District", 40.69, -74.0),
    ]
    .into_iter()
    .map(|(id, name, address, latitude, longitude)| School {
        id,
        name: name.to_string(),
        address: address.to_string(),
        latitude,
        longitude,
        distance: None,
    })
    .collect()
}

// ============================================================================
// Registry
// ============================================================================

/// Registry statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_schools: usize,
    pub next_id: u64,
}

/// Shared, lock-guarded list of schools
#[derive(Debug, Default)]
pub struct SchoolRegistry {
    schools: RwLock<Vec<School>>,
}

impl SchoolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with [`demo_schools`]
    pub fn with_demo_data() -> Self {
        Self {
            schools: RwLock::new(demo_schools()),
        }
    }

    /// Create a registry from existing records
    ///
    /// Every record must pass validation and identifiers must be unique.
    /// Any stored `distance` is discarded.
    pub fn with_schools(schools: Vec<School>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::with_capacity(schools.len());
        let mut records = Vec::with_capacity(schools.len());

        for school in schools {
            NewSchool::from(&school)
                .validate()
                .map_err(|source| RegistryError::InvalidRecord { id: school.id, source })?;

            if !seen.insert(school.id) {
                return Err(RegistryError::DuplicateId(school.id));
            }

            records.push(School {
                distance: None,
                ..school
            });
        }

        Ok(Self {
            schools: RwLock::new(records),
        })
    }

    /// Load records from a JSON array of schools
    pub fn from_seed_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::SeedFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let schools: Vec<School> =
            serde_json::from_str(&content).map_err(|e| RegistryError::SeedFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let registry = Self::with_schools(schools)?;
        tracing::info!(path = %path.display(), "Loaded school seed file");
        Ok(registry)
    }

    /// All schools in insertion order
    pub async fn list(&self) -> Vec<School> {
        self.schools.read().await.clone()
    }

    /// Validate and store a new school, returning its identifier
    pub async fn append(&self, school: NewSchool) -> Result<u64, ValidationError> {
        school.validate()?;

        let mut schools = self.schools.write().await;
        let id = next_id(&schools);
        schools.push(school.into_school(id));

        tracing::debug!(id, total = schools.len(), "School appended");
        Ok(id)
    }

    /// All schools annotated with distance from `origin`, nearest first
    pub async fn rank(&self, origin: Coordinate) -> Vec<School> {
        let schools = self.schools.read().await;
        ranking::rank_schools(&schools, origin)
    }

    /// Nearest school to `origin`, if the registry has any
    pub async fn closest(&self, origin: Coordinate) -> Option<School> {
        let schools = self.schools.read().await;
        ranking::closest(&schools, origin)
    }

    pub async fn len(&self) -> usize {
        self.schools.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.schools.read().await.is_empty()
    }

    pub async fn stats(&self) -> RegistryStats {
        let schools = self.schools.read().await;
        RegistryStats {
            total_schools: schools.len(),
            next_id: next_id(&schools),
        }
    }
}

fn next_id(schools: &[School]) -> u64 {
    schools.iter().map(|s| s.id).max().map_or(1, |max| max + 1)
}

// ============================================================================
// Errors
// ============================================================================

/// Errors building a registry from existing records
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("School {id} is invalid: {source}")]
    InvalidRecord {
        id: u64,
        #[source]
        source: ValidationError,
    },

    #[error("Duplicate school id: {0}")]
    DuplicateId(u64),

    #[error("Failed to load seed file {path}: {reason}")]
    SeedFile { path: String, reason: String },
}

// ============================================================================
// Tests
// ============================================================================
