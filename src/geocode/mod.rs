//! Mock geocoder
//!
//! Resolves free-text place names against a fixed table of US cities.
//! Input is lowercased and trimmed, then the table is scanned in definition
//! order; the first key that is a substring of the input, or that contains
//! the input, wins. Unknown places resolve to a point jittered around
//! [`DEFAULT_LOCATION`].
//!
//! # Example
//!
//! ```
//! use schoolfinder::geocode::Geocoder;
//! use schoolfinder::models::Coordinate;
//!
//! let geocoder = Geocoder::default();
//! let coord = geocoder.geocode("I live in San Francisco", &mut rand::thread_rng());
//! assert_eq!(coord, Coordinate::new(37.7749, -122.4194));
//! ```

use rand::Rng;

use crate::models::Coordinate;

/// Fallback centre for unknown places (New York City)
pub const DEFAULT_LOCATION: Coordinate = Coordinate::new(40.7128, -74.0060);

/// Maximum jitter applied to each axis of the fallback, in degrees
pub const DEFAULT_JITTER_DEGREES: f64 = 0.05;

/// Built-in place table, scanned in this order
pub const PLACES: &[(&str, Coordinate)] = &[
    ("new york", Coordinate::new(40.7128, -74.006)),
    ("los angeles", Coordinate::new(34.0522, -118.2437)),
    ("chicago", Coordinate::new(41.8781, -87.6298)),
    ("houston", Coordinate::new(29.7604, -95.3698)),
    ("phoenix", Coordinate::new(33.4484, -112.074)),
    ("philadelphia", Coordinate::new(39.9526, -75.1652)),
    ("san antonio", Coordinate::new(29.4241, -98.4936)),
    ("san diego", Coordinate::new(32.7157, -117.1611)),
    ("dallas", Coordinate::new(32.7767, -96.797)),
    ("san francisco", Coordinate::new(37.7749, -122.4194)),
    ("austin", Coordinate::new(30.2672, -97.7431)),
    ("seattle", Coordinate::new(47.6062, -122.3321)),
    ("denver", Coordinate::new(39.7392, -104.9903)),
    ("boston", Coordinate::new(42.3601, -71.0589)),
    ("miami", Coordinate::new(25.7617, -80.1918)),
];

// ============================================================================
// Randomness
// ============================================================================

/// Source of fallback jitter
///
/// Implemented for every [`rand::Rng`], so callers normally pass
/// `rand::thread_rng()` or a seeded generator.
pub trait JitterSource {
    /// Uniform offset in `[-max, max]`, or zero when `max` is not a
    /// positive finite number
    fn offset(&mut self, max: f64) -> f64;
}

impl<R: Rng> JitterSource for R {
    fn offset(&mut self, max: f64) -> f64 {
        if !max.is_finite() || max <= 0.0 {
            return 0.0;
        }
        self.gen_range(-max..=max)
    }
}

// ============================================================================
// Geocoder
// ============================================================================

/// How a query was resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Matched a table entry
    Known {
        place: &'static str,
        coordinate: Coordinate,
    },
    /// No entry matched, coordinate is the jittered fallback
    Fallback(Coordinate),
}

impl Resolution {
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Self::Known { coordinate, .. } => *coordinate,
            Self::Fallback(coordinate) => *coordinate,
        }
    }
}

/// Table-driven geocoder
#[derive(Debug, Clone)]
pub struct Geocoder {
    places: &'static [(&'static str, Coordinate)],
    fallback: Coordinate,
    jitter: f64,
}

impl Default for Geocoder {
    fn default() -> Self {
        Self {
            places: PLACES,
            fallback: DEFAULT_LOCATION,
            jitter: DEFAULT_JITTER_DEGREES,
        }
    }
}

impl Geocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different place table
    pub fn with_places(mut self, places: &'static [(&'static str, Coordinate)]) -> Self {
        self.places = places;
        self
    }

    /// Use a different fallback centre and jitter radius
    pub fn with_fallback(mut self, fallback: Coordinate, jitter: f64) -> Self {
        self.fallback = fallback;
        self.jitter = jitter.abs();
        self
    }

    /// Table lookup only
    pub fn lookup(&self, text: &str) -> Option<(&'static str, Coordinate)> {
        let normalized = text.trim().to_lowercase();

        self.places
            .iter()
            .find(|(key, _)| normalized.contains(key) || key.contains(normalized.as_str()))
            .copied()
    }

    /// Resolve `text`, falling back to a jittered default location
    pub fn resolve<J: JitterSource + ?Sized>(&self, text: &str, jitter: &mut J) -> Resolution {
        match self.lookup(text) {
            Some((place, coordinate)) => {
                tracing::debug!(query = %text, place, "Geocode table hit");
                Resolution::Known { place, coordinate }
            }
            None => {
                let latitude = self.fallback.latitude + jitter.offset(self.jitter);
                let longitude = self.fallback.longitude + jitter.offset(self.jitter);
                tracing::debug!(query = %text, latitude, longitude, "Geocode fallback");
                Resolution::Fallback(Coordinate::new(latitude, longitude))
            }
        }
    }

    /// Resolve `text` to a coordinate
    pub fn geocode<J: JitterSource + ?Sized>(&self, text: &str, jitter: &mut J) -> Coordinate {
        self.resolve(text, jitter).coordinate()
    }
}
