//! # Marker Engine
//!
//! Stateful facade that owns the item snapshot, the current zoom, the
//! landmark index, and the selection state, and hands the hosting UI
//! ready-to-render marker descriptors.
//!
//! ## Architecture
//!
//! The engine reacts to two inputs: snapshot replacement and zoom changes.
//! Either marks the cluster set dirty; clusters are recomputed lazily on
//! the next read, memoized on the (snapshot, zoom) pair, and the selection
//! controller is reconciled against every recomputation so a selection
//! never outlives its item. Icon descriptors are memoized per composition
//! in a bounded LRU. A spatial index over placed items serves viewport
//! queries without rescanning the snapshot.
//!
//! If multiple zoom events arrive between reads, only the latest matters:
//! computation is cheap and idempotent, so intermediate cluster sets are
//! simply never materialized.

use std::sync::Mutex;

use log::{debug, info};
use once_cell::sync::Lazy;
use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;

use crate::clustering::{cluster, ClusterConfig};
use crate::error::{OptionExt, Result};
use crate::icons::{IconDescriptor, PinGeometry};
use crate::landmarks::{Landmark, LandmarkIndex};
use crate::selection::{SelectionController, SelectionState};
use crate::visual::{pin_size, pin_visual, PinVisual, VisualConfig};
use crate::{Bounds, Cluster, IconCache, Item, MapPoint};

// ============================================================================
// Core Types
// ============================================================================

/// A placed item in the spatial index.
#[derive(Debug, Clone)]
struct PlacedItem {
    item_id: String,
    position: MapPoint,
}

impl RTreeObject for PlacedItem {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.lng, self.position.lat])
    }
}

/// Everything the hosting UI needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    /// Marker coordinate (the cluster anchor)
    pub anchor: MapPoint,
    /// Color, badge, aggregate flag
    pub icon: IconDescriptor,
    /// Pin drawing geometry at the current zoom
    pub geometry: PinGeometry,
    /// Ids of the aggregated items, input order
    pub member_ids: Vec<String>,
}

// ============================================================================
// Marker Engine
// ============================================================================

/// The stateful marker engine.
///
/// Single-threaded, synchronous computation; the [`ENGINE`] singleton wraps
/// it in a mutex for hosts that call in from more than one thread.
pub struct MarkerEngine {
    // Inputs
    items: Vec<Item>,
    landmarks: LandmarkIndex,
    zoom: f64,

    // Computed state
    clusters: Vec<Cluster>,
    clusters_dirty: bool,
    spatial_index: RTree<PlacedItem>,
    spatial_dirty: bool,

    // Caches
    icon_cache: IconCache,

    // Interaction
    selection: SelectionController,

    // Configuration
    cluster_config: ClusterConfig,
    visual_config: VisualConfig,
}

impl MarkerEngine {
    /// Create an engine with default configuration, an empty snapshot, and
    /// the map's initial zoom.
    pub fn new() -> Self {
        let cluster_config = ClusterConfig::default();
        Self {
            items: Vec::new(),
            landmarks: LandmarkIndex::default(),
            zoom: cluster_config.reference_zoom,
            clusters: Vec::new(),
            clusters_dirty: false,
            spatial_index: RTree::new(),
            spatial_dirty: false,
            icon_cache: IconCache::default(),
            selection: SelectionController::new(),
            cluster_config,
            visual_config: VisualConfig::default(),
        }
    }

    /// Create an engine with custom configuration.
    pub fn with_config(cluster_config: ClusterConfig, visual_config: VisualConfig) -> Result<Self> {
        cluster_config.validate()?;
        visual_config.validate()?;
        Ok(Self {
            zoom: cluster_config.reference_zoom,
            cluster_config,
            visual_config,
            ..Self::new()
        })
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Install the static landmark list. Normally called once at startup.
    pub fn set_landmarks(&mut self, landmarks: Vec<Landmark>) {
        info!("[MarkerEngine] Loaded {} landmarks", landmarks.len());
        self.landmarks = LandmarkIndex::new(landmarks);
    }

    /// Replace the item snapshot. The previous snapshot is discarded
    /// wholesale; clusters and the spatial index recompute lazily.
    pub fn set_snapshot(&mut self, items: Vec<Item>) {
        let placed = items.iter().filter(|i| i.position.is_some()).count();
        info!(
            "[MarkerEngine] Snapshot replaced: {} items, {} placed",
            items.len(),
            placed
        );

        self.items = items;
        self.clusters_dirty = true;
        self.spatial_dirty = true;
    }

    /// Parse and install a raw JSON snapshot. Returns the number of items
    /// accepted.
    pub fn set_snapshot_json(&mut self, json: &str) -> Result<usize> {
        let items = crate::adapter::parse_snapshot(json)?;
        let count = items.len();
        self.set_snapshot(items);
        Ok(count)
    }

    /// Update the zoom level, clamped to the configured range. A changed
    /// zoom marks the cluster set dirty; an unchanged one is a no-op.
    pub fn set_zoom(&mut self, zoom: f64) {
        let clamped = zoom.clamp(self.cluster_config.min_zoom, self.cluster_config.max_zoom);
        if clamped != self.zoom {
            debug!("[MarkerEngine] Zoom {} -> {}", self.zoom, clamped);
            self.zoom = clamped;
            self.clusters_dirty = true;
        }
    }

    /// Current (clamped) zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Number of items in the snapshot.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Look up an item in the snapshot by id.
    pub fn get_item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Clear the snapshot, caches, and selection.
    pub fn clear(&mut self) {
        self.items.clear();
        self.clusters.clear();
        self.clusters_dirty = false;
        self.spatial_index = RTree::new();
        self.spatial_dirty = false;
        self.icon_cache.clear();
        self.selection.close();
        info!("[MarkerEngine] Cleared");
    }

    // ========================================================================
    // Clustering
    // ========================================================================

    /// Ensure the cluster set matches the current (snapshot, zoom) pair.
    fn ensure_clusters(&mut self) {
        if !self.clusters_dirty {
            return;
        }

        let placed: Vec<Item> = self
            .items
            .iter()
            .filter(|i| i.position.is_some())
            .cloned()
            .collect();

        self.clusters = cluster(&placed, self.zoom, &self.cluster_config);
        self.clusters_dirty = false;

        debug!(
            "[MarkerEngine] Recomputed {} clusters from {} placed items at zoom {}",
            self.clusters.len(),
            placed.len(),
            self.zoom
        );

        // A recomputation may have regrouped or dropped the selected item.
        self.selection.reconcile(&self.clusters);
    }

    /// The cluster set for the current snapshot and zoom.
    pub fn clusters(&mut self) -> &[Cluster] {
        self.ensure_clusters();
        &self.clusters
    }

    /// Renderable marker descriptors for the current snapshot and zoom.
    pub fn markers(&mut self) -> Vec<MarkerDescriptor> {
        self.ensure_clusters();
        let base_size = pin_size(self.zoom, &self.visual_config);

        self.clusters
            .iter()
            .map(|c| MarkerDescriptor {
                anchor: c.anchor,
                icon: self.icon_cache.get_or_synthesize(c),
                geometry: PinGeometry::for_cluster(c.members.len(), base_size),
                member_ids: c.members.iter().map(|m| m.id.clone()).collect(),
            })
            .collect()
    }

    /// Pin size and label font size at the current zoom.
    pub fn pin_visual(&self) -> PinVisual {
        pin_visual(self.zoom, &self.visual_config)
    }

    // ========================================================================
    // Landmarks
    // ========================================================================

    /// Human-readable location label for a coordinate.
    pub fn landmark_label(&self, point: &MapPoint) -> String {
        self.landmarks.locate_label(point)
    }

    /// Nearest landmark and its distance in meters, if any are configured.
    pub fn nearest_landmark(&self, point: &MapPoint) -> Option<(&Landmark, f64)> {
        self.landmarks.nearest(point)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Apply a click on the marker at `index` (position in [`markers`]
    /// order).
    ///
    /// [`markers`]: Self::markers
    pub fn click_marker(&mut self, index: usize) -> Result<&SelectionState> {
        self.ensure_clusters();
        let clicked = self
            .clusters
            .get(index)
            .cloned()
            .ok_or_unknown_marker(index, self.clusters.len())?;

        self.selection.click_cluster(&clicked);
        Ok(self.selection.state())
    }

    /// Pick one member from the open disambiguation list.
    pub fn pick_member(&mut self, item_id: &str) -> Result<&SelectionState> {
        if !self.selection.pick_member(item_id) {
            return None.ok_or_unknown_item(item_id);
        }
        Ok(self.selection.state())
    }

    /// Close any open selection.
    pub fn close_selection(&mut self) {
        self.selection.close();
    }

    /// Current selection state.
    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    // ========================================================================
    // Spatial Queries
    // ========================================================================

    /// Ensure the spatial index matches the current snapshot.
    fn ensure_spatial_index(&mut self) {
        if !self.spatial_dirty {
            return;
        }

        let placed: Vec<PlacedItem> = self
            .items
            .iter()
            .filter_map(|i| {
                i.position.map(|position| PlacedItem {
                    item_id: i.id.clone(),
                    position,
                })
            })
            .collect();

        self.spatial_index = RTree::bulk_load(placed);
        self.spatial_dirty = false;
    }

    /// Ids of placed items within a viewport.
    pub fn query_viewport(&mut self, bounds: &Bounds) -> Vec<String> {
        self.ensure_spatial_index();

        let envelope = AABB::from_corners(
            [bounds.min_lng, bounds.min_lat],
            [bounds.max_lng, bounds.max_lat],
        );

        self.spatial_index
            .locate_in_envelope_intersecting(&envelope)
            .map(|p| p.item_id.clone())
            .collect()
    }

    /// Ids of placed items near a coordinate.
    pub fn find_nearby(&mut self, lat: f64, lng: f64, radius_degrees: f64) -> Vec<String> {
        self.query_viewport(&Bounds {
            min_lat: lat - radius_degrees,
            max_lat: lat + radius_degrees,
            min_lng: lng - radius_degrees,
            max_lng: lng + radius_degrees,
        })
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Engine statistics.
    pub fn stats(&mut self) -> EngineStats {
        self.ensure_clusters();
        EngineStats {
            item_count: self.items.len(),
            placed_count: self.items.iter().filter(|i| i.position.is_some()).count(),
            cluster_count: self.clusters.len(),
            cached_icon_count: self.icon_cache.len(),
            landmark_count: self.landmarks.len(),
        }
    }
}

impl Default for MarkerEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine statistics for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub item_count: usize,
    pub placed_count: usize,
    pub cluster_count: usize,
    pub cached_icon_count: usize,
    pub landmark_count: usize,
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Global engine instance for hosts that want a single shared map state.
pub static ENGINE: Lazy<Mutex<MarkerEngine>> = Lazy::new(|| Mutex::new(MarkerEngine::new()));

/// Run a closure against the global engine.
pub fn with_engine<F, R>(f: F) -> R
where
    F: FnOnce(&mut MarkerEngine) -> R,
{
    let mut engine = ENGINE.lock().unwrap();
    f(&mut engine)
}

// ============================================================================
// Tests
// ============================================================================
