//! # Marker Engine
//!
//! Interactive map annotation engine for a campus lost-and-found application.
//!
//! This library provides:
//! - Zoom-adaptive greedy clustering of geolocated item reports
//! - Nearest-landmark resolution for human-readable location labels
//! - Marker icon synthesis (color, badge, pin geometry) from cluster composition
//! - A selection state machine connecting marker clicks to a detail UI
//!
//! The engine is purely computational: item snapshots arrive from an external
//! provider, zoom changes arrive from the hosting map widget, and the engine
//! recomputes clusters and marker descriptors on demand.
//!
//! ## Quick Start
//!
//! ```rust
//! use marker_engine::{cluster, ClusterConfig, Item, ItemKind, MapPoint};
//!
//! let items = vec![
//!     Item::placed("report-1", ItemKind::Lost, MapPoint::new(35.7030, 51.3510)),
//!     Item::placed("report-2", ItemKind::Found, MapPoint::new(35.7031, 51.3511)),
//! ];
//!
//! let clusters = cluster(&items, 16.0, &ClusterConfig::default());
//! assert_eq!(clusters.len(), 1);
//! assert_eq!(clusters[0].members.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{MarkerError, OptionExt, Result};

// Geographic utilities (degree-space and geodesic distances, bounds)
pub mod geo_utils;

// Boundary adapter for raw snapshot records
pub mod adapter;
pub use adapter::{normalize_record, normalize_snapshot, parse_snapshot, RawItemRecord};

// Zoom-parameterized greedy clustering
pub mod clustering;
pub use clustering::{cluster, epsilon, ClusterConfig};

// Static landmark index for location labels
pub mod landmarks;
pub use landmarks::{Landmark, LandmarkIndex, UNKNOWN_LOCATION};

// Zoom-adaptive visual encoding (pin size, label font, badge cap)
pub mod visual;
pub use visual::{badge_text, label_font_size, pin_size, pin_visual, PinVisual, VisualConfig};

// Marker icon synthesis from cluster composition
pub mod icons;
pub use icons::{
    render_pin_svg, synthesize, ClusterComposition, IconDescriptor, MarkerColor, PinGeometry,
};

// Selection/interaction state machine
pub mod selection;
pub use selection::{SelectionController, SelectionState};

// Bounded memoization cache for synthesized icons
pub mod cache;
pub use cache::IconCache;

// Stateful marker engine (singleton with snapshot, zoom, and selection state)
pub mod engine;
pub use engine::{with_engine, EngineStats, MarkerDescriptor, MarkerEngine, ENGINE};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use marker_engine::MapPoint;
/// let point = MapPoint::new(35.7030, 51.3510); // Sharif campus
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lng: f64,
}

impl MapPoint {
    /// Create a new map point.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }
}

/// Whether a report concerns a lost or a found item.
///
/// Inferred at the snapshot boundary from the record's explicit `type` field
/// or, failing that, its free-text status label (see [`adapter`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Lost,
    Found,
}

/// Item category, mirroring the entry form's fixed choices.
///
/// Unknown category keys normalize to [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Documents,
    Wallets,
    Clothing,
    Accessories,
    Keys,
    Books,
    Other,
}

impl Category {
    /// Map a raw category key onto the enum, case-insensitively.
    pub fn from_key(key: &str) -> Self {
        match key.to_ascii_lowercase().as_str() {
            "electronics" => Category::Electronics,
            "documents" => Category::Documents,
            "wallets" => Category::Wallets,
            "clothing" => Category::Clothing,
            "accessories" => Category::Accessories,
            "keys" => Category::Keys,
            "books" => Category::Books,
            _ => Category::Other,
        }
    }
}

/// A normalized lost/found report.
///
/// `position` is `None` for reports without a usable coordinate; such items
/// are excluded from map placement entirely (never placed at origin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique report identifier
    pub id: String,
    /// Lost or found
    pub kind: ItemKind,
    /// Enumerated category tag
    pub category: Category,
    /// Free-text status label as entered (kept for display)
    pub status_label: String,
    /// Short display title
    pub title: String,
    /// Long-form description
    pub description: String,
    /// Optional photo URL
    pub image_url: Option<String>,
    /// Report coordinate, absent when the item is not mappable
    pub position: Option<MapPoint>,
}

impl Item {
    /// Create a minimal placed item. Useful for tests and fixtures.
    pub fn placed(id: &str, kind: ItemKind, position: MapPoint) -> Self {
        Self {
            id: id.to_string(),
            kind,
            category: Category::Other,
            status_label: String::new(),
            title: String::new(),
            description: String::new(),
            image_url: None,
            position: Some(position),
        }
    }

    /// Create a minimal item without a coordinate.
    pub fn unplaced(id: &str, kind: ItemKind) -> Self {
        Self {
            position: None,
            ..Self::placed(id, kind, MapPoint::new(0.0, 0.0))
        }
    }
}

/// An aggregate of one or more items grouped for display at a given zoom.
///
/// The anchor is the coordinate of the cluster's *first* member, not a
/// centroid, so that re-clicking a single-item cluster is stable across
/// recomputations. Member order is input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Coordinate of the first (anchor) member
    pub anchor: MapPoint,
    /// Members in input order
    pub members: Vec<Item>,
    /// Number of lost reports among the members
    pub lost_count: usize,
    /// Number of found reports among the members
    pub found_count: usize,
}

impl Cluster {
    /// Start a new cluster anchored at the given item's coordinate.
    pub(crate) fn seed(item: Item, anchor: MapPoint) -> Self {
        let mut cluster = Self {
            anchor,
            members: Vec::new(),
            lost_count: 0,
            found_count: 0,
        };
        cluster.push(item);
        cluster
    }

    /// Append a member, keeping the lost/found counts in sync.
    pub(crate) fn push(&mut self, item: Item) {
        match item.kind {
            ItemKind::Lost => self.lost_count += 1,
            ItemKind::Found => self.found_count += 1,
        }
        self.members.push(item);
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the cluster has no members. Clusters produced by
    /// [`cluster`] always have at least one.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True when more than one member is aggregated under this marker.
    pub fn is_aggregate(&self) -> bool {
        self.members.len() > 1
    }
}

/// Bounding box in degrees, used for viewport queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from map points. Returns `None` for empty input.
    pub fn from_points(points: &[MapPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
            min_lng = min_lng.min(p.lng);
            max_lng = max_lng.max(p.lng);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Check whether a point lies inside the box (inclusive).
    pub fn contains(&self, point: &MapPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

// ============================================================================
// Tests
// ============================================================================
