//! Zoom-parameterized greedy clustering of placed items.
//!
//! Items are grouped under a shared marker when they fall within a
//! zoom-dependent radius of a cluster's anchor. The pass is single-sweep,
//! greedy, and order-stable: iterating items in input order, each item
//! joins the first existing cluster whose anchor is within epsilon, or
//! starts a new cluster anchored at its own coordinate. Anchors never move
//! once placed, so the output partition is deterministic for a given
//! (items, zoom) pair and cluster order follows anchor appearance order.

use crate::geo_utils::squared_degree_distance;
use crate::{Cluster, Item};

/// Configuration for the clustering pass.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Lowest zoom the map widget can reach. Zoom inputs are clamped here.
    /// Default: 14.0
    pub min_zoom: f64,

    /// Highest zoom the map widget can reach. Zoom inputs are clamped here.
    /// Default: 19.0
    pub max_zoom: f64,

    /// Zoom level at which `base_epsilon_deg` applies directly.
    /// Default: 17.0, the map's initial zoom
    pub reference_zoom: f64,

    /// Grouping radius in degrees at the reference zoom.
    /// Default: 6.0e-4 (~60 m), which merges same-courtyard reports at the
    /// initial zoom while keeping adjacent buildings apart at max zoom
    pub base_epsilon_deg: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_zoom: 14.0,
            max_zoom: 19.0,
            reference_zoom: 17.0,
            base_epsilon_deg: 6.0e-4,
        }
    }
}

impl ClusterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.min_zoom <= self.max_zoom) {
            return Err(crate::MarkerError::InvalidConfig {
                message: format!(
                    "min_zoom {} exceeds max_zoom {}",
                    self.min_zoom, self.max_zoom
                ),
            });
        }
        if !(self.base_epsilon_deg > 0.0) {
            return Err(crate::MarkerError::InvalidConfig {
                message: format!("base_epsilon_deg {} must be positive", self.base_epsilon_deg),
            });
        }
        Ok(())
    }
}

/// Grouping radius in degrees for a zoom level.
///
/// Follows the tile pyramid: each zoom step halves the ground distance a
/// screen pixel covers, so the radius halves with it as
/// `base * 2^(reference_zoom - zoom)`, with zoom clamped to the configured
/// range first. Monotonically non-increasing in zoom; at `max_zoom` the
/// default radius is ~15 m, small enough that distinct buildings never
/// merge.
pub fn epsilon(zoom: f64, config: &ClusterConfig) -> f64 {
    let z = zoom.clamp(config.min_zoom, config.max_zoom);
    config.base_epsilon_deg * (config.reference_zoom - z).exp2()
}

/// Group items into clusters for the given zoom level.
///
/// Items without a position are skipped (callers normally filter them out
/// beforehand; skipping keeps the function total either way). The result
/// partitions the placed items: every placed item lands in exactly one
/// cluster, members keep input order, and clusters are returned in the
/// order their anchor item first appeared.
///
/// # Example
/// ```
/// use marker_engine::{cluster, ClusterConfig, Item, ItemKind, MapPoint};
///
/// let spot = MapPoint::new(35.7030, 51.3510);
/// let items = vec![
///     Item::placed("a", ItemKind::Lost, spot),
///     Item::placed("b", ItemKind::Found, spot),
/// ];
///
/// let clusters = cluster(&items, 16.0, &ClusterConfig::default());
/// assert_eq!(clusters.len(), 1);
/// assert_eq!(clusters[0].lost_count, 1);
/// assert_eq!(clusters[0].found_count, 1);
/// ```
pub fn cluster(items: &[Item], zoom: f64, config: &ClusterConfig) -> Vec<Cluster> {
    let eps = epsilon(zoom, config);
    let eps_sq = eps * eps;

    let mut clusters: Vec<Cluster> = Vec::new();

    for item in items {
        let Some(position) = item.position else {
            continue;
        };

        let joined = clusters
            .iter()
            .position(|c| squared_degree_distance(&c.anchor, &position) <= eps_sq);

        match joined {
            Some(index) => clusters[index].push(item.clone()),
            None => clusters.push(Cluster::seed(item.clone(), position)),
        }
    }

    clusters
}
