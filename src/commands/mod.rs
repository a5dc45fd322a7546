pub mod lookup;
pub mod serve;

// Re-export command functions for convenience
pub use lookup::{distance, geocode, rank};
pub use serve::{serve, ServeParams};
