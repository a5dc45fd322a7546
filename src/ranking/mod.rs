//! Distance ranking
//!
//! Annotates school records with their distance from a query point and
//! orders them nearest first.

use crate::models::{Coordinate, School};

/// Copies of `schools` annotated with distance from `origin`, nearest first
///
/// The sort is stable: schools at equal distance keep their input order.
pub fn rank_schools(schools: &[School], origin: Coordinate) -> Vec<School> {
    let mut ranked: Vec<School> = schools
        .iter()
        .map(|school| school.with_distance_from(origin))
        .collect();

    ranked.sort_by(|a, b| {
        let a = a.distance.unwrap_or(f64::INFINITY);
        let b = b.distance.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });

    ranked
}

/// Nearest school to `origin`, if any
pub fn closest(schools: &[School], origin: Coordinate) -> Option<School> {
    schools
        .iter()
        .map(|school| school.with_distance_from(origin))
        .reduce(|best, candidate| {
            if candidate.distance < best.distance {
                candidate
            } else {
                best
            }
        })
}
