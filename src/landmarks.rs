//! Static landmark index for human-readable location labels.
//!
//! The campus landmark list is loaded once at startup and never mutated.
//! Coordinates resolve to the nearest landmark by squared Euclidean
//! distance in degree space; at campus scale the ranking matches the
//! geodesic one, and ties break to the first landmark in the fixed
//! construction order so results are reproducible.

use crate::geo_utils::{haversine_distance, squared_degree_distance};
use crate::MapPoint;

/// Label returned when no landmarks are configured. There must always be
/// some displayable location string.
pub const UNKNOWN_LOCATION: &str = "unknown location";

/// A named static reference point on the campus map.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Landmark {
    pub name: String,
    pub position: MapPoint,
}

impl Landmark {
    pub fn new(name: &str, position: MapPoint) -> Self {
        Self {
            name: name.to_string(),
            position,
        }
    }
}

/// Fixed-order index over the campus landmark set.
#[derive(Debug, Clone, Default)]
pub struct LandmarkIndex {
    landmarks: Vec<Landmark>,
}

impl LandmarkIndex {
    /// Build an index. Iteration order is the given order, forever.
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// The nearest landmark and its geodesic distance in meters.
    ///
    /// Ranking uses squared degree distance; strict `<` comparison keeps
    /// the first-in-order landmark on ties. The returned meters value is
    /// haversine, suitable for display. `None` only when the set is empty.
    pub fn nearest(&self, point: &MapPoint) -> Option<(&Landmark, f64)> {
        let mut best: Option<(&Landmark, f64)> = None;

        for landmark in &self.landmarks {
            let dist = squared_degree_distance(&landmark.position, point);
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((landmark, dist)),
            }
        }

        best.map(|(landmark, _)| (landmark, haversine_distance(&landmark.position, point)))
    }

    /// Name of the nearest landmark, or [`UNKNOWN_LOCATION`] for an empty set.
    pub fn nearest_name(&self, point: &MapPoint) -> &str {
        self.nearest(point)
            .map(|(landmark, _)| landmark.name.as_str())
            .unwrap_or(UNKNOWN_LOCATION)
    }

    /// Owned location label for detail cards.
    pub fn locate_label(&self, point: &MapPoint) -> String {
        self.nearest_name(point).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campus_index() -> LandmarkIndex {
        LandmarkIndex::new(vec![
            Landmark::new("Main Gate", MapPoint::new(35.7030, 51.3510)),
            Landmark::new("Central Library", MapPoint::new(35.7042, 51.3516)),
            Landmark::new("Mechanical Engineering", MapPoint::new(35.7050, 51.3530)),
        ])
    }

    #[test]
    fn test_nearest_name_basic() {
        let index = campus_index();
        let near_library = MapPoint::new(35.7041, 51.3517);
        assert_eq!(index.nearest_name(&near_library), "Central Library");
    }

    #[test]
    fn test_nearest_is_deterministic() {
        let index = campus_index();
        let point = MapPoint::new(35.7045, 51.3520);
        assert_eq!(index.nearest_name(&point), index.nearest_name(&point));
    }

    #[test]
    fn test_equidistant_tie_breaks_to_first_in_order() {
        // Two landmarks placed symmetrically around the probe point; the
        // list order decides the winner.
        let index = LandmarkIndex::new(vec![
            Landmark::new("North Hall", MapPoint::new(35.7040, 51.3510)),
            Landmark::new("South Hall", MapPoint::new(35.7020, 51.3510)),
        ]);
        let midpoint = MapPoint::new(35.7030, 51.3510);
        assert_eq!(index.nearest_name(&midpoint), "North Hall");

        let reversed = LandmarkIndex::new(vec![
            Landmark::new("South Hall", MapPoint::new(35.7020, 51.3510)),
            Landmark::new("North Hall", MapPoint::new(35.7040, 51.3510)),
        ]);
        assert_eq!(reversed.nearest_name(&midpoint), "South Hall");
    }

    #[test]
    fn test_empty_set_returns_fallback() {
        let index = LandmarkIndex::new(vec![]);
        let point = MapPoint::new(35.7030, 51.3510);
        assert_eq!(index.nearest_name(&point), UNKNOWN_LOCATION);
        assert!(index.nearest(&point).is_none());
    }

    #[test]
    fn test_nearest_reports_meters() {
        let index = campus_index();
        // ~60 m north-west of the Main Gate
        let point = MapPoint::new(35.7035, 51.3508);
        let (landmark, meters) = index.nearest(&point).unwrap();
        assert_eq!(landmark.name, "Main Gate");
        assert!(meters > 40.0 && meters < 80.0, "got {}", meters);
    }
}
