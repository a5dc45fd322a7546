use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

use schoolfinder::geo;
use schoolfinder::geocode::{Geocoder, Resolution};
use schoolfinder::models::Coordinate;
use schoolfinder::registry::SchoolRegistry;

/// Print the coordinate for a place name as JSON
pub fn geocode(text: &str, seed: Option<u64>) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Address must not be empty");
    }

    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let resolution = Geocoder::default().resolve(text, &mut rng);
    match resolution {
        Resolution::Known { place, .. } => tracing::info!(place, "Matched known place"),
        Resolution::Fallback(_) => tracing::info!("No known place matched, using fallback"),
    }

    println!("{}", serde_json::to_string_pretty(&resolution.coordinate())?);
    Ok(())
}

/// Print the distance between two points
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<()> {
    Coordinate::new(lat1, lon1).validate()?;
    Coordinate::new(lat2, lon2).validate()?;

    println!("{:.2} km", geo::distance(lat1, lon1, lat2, lon2));
    Ok(())
}

/// Print schools ranked by distance from a point
pub async fn rank(
    latitude: f64,
    longitude: f64,
    seed_file: Option<PathBuf>,
    limit: Option<usize>,
) -> Result<()> {
    let origin = Coordinate::new(latitude, longitude);
    origin.validate()?;

    let registry = match seed_file {
        Some(path) => SchoolRegistry::from_seed_file(&path)
            .with_context(|| format!("Failed to load schools from {}", path.display()))?,
        None => SchoolRegistry::with_demo_data(),
    };

    let ranked = registry.rank(origin).await;
    if ranked.is_empty() {
        println!("No schools found in this area.");
        return Ok(());
    }

    println!("Schools near {origin}");
    println!("{:-<72}", "");
    for school in ranked.iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "{:>4}  {:<28} {:>12}  {}",
            school.id,
            school.name,
            school.distance_label(),
            school.address
        );
    }
    println!("{:-<72}", "");
    println!("Total schools: {}", ranked.len());

    Ok(())
}
