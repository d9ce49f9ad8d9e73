//! Geographic utilities shared by clustering, landmark resolution, and the
//! engine's spatial index.
//!
//! The service area is a single campus, small enough that ranking by squared
//! Euclidean distance in degree space is an accepted simplification: no
//! geodesic correction is applied when *comparing* distances. Geodesic
//! (haversine) distance is used only where a magnitude in meters is shown to
//! a person.

use geo::{Distance, Haversine, Point};

use crate::MapPoint;

/// Squared Euclidean distance between two points in degree space.
///
/// Cheap, monotone in true distance at campus scale, and free of
/// trigonometry. This is the comparison workhorse for clustering and
/// nearest-landmark ranking.
#[inline]
pub fn squared_degree_distance(a: &MapPoint, b: &MapPoint) -> f64 {
    let dlat = a.lat - b.lat;
    let dlng = a.lng - b.lng;
    dlat * dlat + dlng * dlng
}

/// Great-circle distance between two points in meters.
///
/// Used for human-readable magnitudes (e.g. "about 120 m from the Central
/// Library"), never for ranking.
///
/// # Example
///
/// ```rust
/// use marker_engine::{geo_utils, MapPoint};
///
/// let gate = MapPoint::new(35.7030, 51.3510);
/// let library = MapPoint::new(35.7042, 51.3516);
/// let dist = geo_utils::haversine_distance(&gate, &library);
/// assert!(dist > 100.0 && dist < 200.0);
/// ```
#[inline]
pub fn haversine_distance(a: &MapPoint, b: &MapPoint) -> f64 {
    let p1 = Point::new(a.lng, a.lat);
    let p2 = Point::new(b.lng, b.lat);
    Haversine::distance(p1, p2)
}
