//! Selection state machine for marker interaction.
//!
//! Marker clicks move between three states: nothing open, a single item's
//! detail view open, or a cluster's disambiguation list open. Transitions
//! come only from clicks and explicit close actions; zoom-driven cluster
//! recomputation goes through [`SelectionController::reconcile`], which
//! keeps the selection open when it still resolves and fails safe to idle
//! when it does not.

use serde::Serialize;

use crate::{Cluster, Item};

/// What the hosting UI should currently show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    /// Nothing open
    Idle,
    /// Detail view open for one item
    SingleItemOpen { item_id: String },
    /// Disambiguation list open for a multi-member marker
    ClusterOpen { members: Vec<Item> },
}

impl SelectionState {
    /// Id of the open single item, if any.
    pub fn open_item_id(&self) -> Option<&str> {
        match self {
            SelectionState::SingleItemOpen { item_id } => Some(item_id),
            _ => None,
        }
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::Idle
    }
}

/// Owns the selection state and applies the transition rules.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Apply a click on the marker rendering `cluster`.
    ///
    /// A single-member marker opens that item's detail view; clicking it
    /// again while open toggles back to idle. A multi-member marker opens
    /// the disambiguation list, with the same toggle on re-click. Clicking
    /// any other marker replaces the current selection.
    pub fn click_cluster(&mut self, cluster: &Cluster) {
        if cluster.is_empty() {
            return;
        }

        if cluster.members.len() == 1 {
            let clicked_id = &cluster.members[0].id;
            self.state = match &self.state {
                SelectionState::SingleItemOpen { item_id } if item_id == clicked_id => {
                    SelectionState::Idle
                }
                _ => SelectionState::SingleItemOpen {
                    item_id: clicked_id.clone(),
                },
            };
        } else {
            let clicked_anchor_id = &cluster.members[0].id;
            self.state = match &self.state {
                SelectionState::ClusterOpen { members }
                    if members.first().map(|m| m.id.as_str())
                        == Some(clicked_anchor_id.as_str()) =>
                {
                    SelectionState::Idle
                }
                _ => SelectionState::ClusterOpen {
                    members: cluster.members.clone(),
                },
            };
        }
    }

    /// Pick one member out of an open disambiguation list.
    ///
    /// Only meaningful in `ClusterOpen`; in other states, or for an id not
    /// in the open list, the click is ignored. Returns whether the state
    /// changed.
    pub fn pick_member(&mut self, item_id: &str) -> bool {
        match &self.state {
            SelectionState::ClusterOpen { members } if members.iter().any(|m| m.id == item_id) => {
                self.state = SelectionState::SingleItemOpen {
                    item_id: item_id.to_string(),
                };
                true
            }
            _ => false,
        }
    }

    /// Explicit close (backdrop click, close button, navigation).
    pub fn close(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// Re-resolve the selection against a freshly computed cluster set.
    ///
    /// An open single item survives as long as some cluster still contains
    /// it. An open disambiguation list follows its first member into the
    /// new clustering (member lists change when zoom regroups items). A
    /// selection that no longer resolves drops to idle instead of holding
    /// a reference to a vanished item.
    pub fn reconcile(&mut self, clusters: &[Cluster]) {
        match &self.state {
            SelectionState::Idle => {}
            SelectionState::SingleItemOpen { item_id } => {
                let still_present = clusters
                    .iter()
                    .any(|c| c.members.iter().any(|m| &m.id == item_id));
                if !still_present {
                    self.state = SelectionState::Idle;
                }
            }
            SelectionState::ClusterOpen { members } => {
                let anchor_id = members.first().map(|m| m.id.clone());
                let resolved = anchor_id.and_then(|id| {
                    clusters
                        .iter()
                        .find(|c| c.members.iter().any(|m| m.id == id))
                });
                self.state = match resolved {
                    Some(cluster) => SelectionState::ClusterOpen {
                        members: cluster.members.clone(),
                    },
                    None => SelectionState::Idle,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cluster, ClusterConfig, ItemKind, MapPoint};

    const GATE: MapPoint = MapPoint { lat: 35.7030, lng: 51.3510 };

    fn single_cluster(id: &str) -> Cluster {
        Cluster::seed(Item::placed(id, ItemKind::Lost, GATE), GATE)
    }

    fn multi_cluster(ids: &[&str]) -> Cluster {
        let mut c = single_cluster(ids[0]);
        for id in &ids[1..] {
            c.push(Item::placed(id, ItemKind::Found, GATE));
        }
        c
    }

    #[test]
    fn test_click_single_opens_detail() {
        let mut controller = SelectionController::new();
        controller.click_cluster(&single_cluster("a"));
        assert_eq!(controller.state().open_item_id(), Some("a"));
    }

    #[test]
    fn test_reclick_single_toggles_to_idle() {
        let mut controller = SelectionController::new();
        let marker = single_cluster("a");

        controller.click_cluster(&marker);
        controller.click_cluster(&marker);
        assert_eq!(*controller.state(), SelectionState::Idle);
    }

    #[test]
    fn test_click_other_single_replaces_selection() {
        let mut controller = SelectionController::new();
        controller.click_cluster(&single_cluster("a"));
        controller.click_cluster(&single_cluster("b"));
        assert_eq!(controller.state().open_item_id(), Some("b"));
    }

    #[test]
    fn test_click_multi_opens_disambiguation() {
        let mut controller = SelectionController::new();
        controller.click_cluster(&multi_cluster(&["a", "b", "c"]));

        match controller.state() {
            SelectionState::ClusterOpen { members } => assert_eq!(members.len(), 3),
            other => panic!("expected ClusterOpen, got {:?}", other),
        }
    }

    #[test]
    fn test_reclick_multi_toggles_to_idle() {
        let mut controller = SelectionController::new();
        let marker = multi_cluster(&["a", "b"]);

        controller.click_cluster(&marker);
        controller.click_cluster(&marker);
        assert_eq!(*controller.state(), SelectionState::Idle);
    }

    #[test]
    fn test_pick_member_from_open_cluster() {
        let mut controller = SelectionController::new();
        controller.click_cluster(&multi_cluster(&["a", "b", "c"]));

        assert!(controller.pick_member("b"));
        assert_eq!(controller.state().open_item_id(), Some("b"));
    }

    #[test]
    fn test_pick_member_ignored_outside_cluster_open() {
        let mut controller = SelectionController::new();
        assert!(!controller.pick_member("a"));
        assert_eq!(*controller.state(), SelectionState::Idle);

        controller.click_cluster(&multi_cluster(&["a", "b"]));
        assert!(!controller.pick_member("zzz"));
        match controller.state() {
            SelectionState::ClusterOpen { .. } => {}
            other => panic!("expected ClusterOpen, got {:?}", other),
        }
    }

    #[test]
    fn test_close_from_any_state() {
        let mut controller = SelectionController::new();

        controller.click_cluster(&single_cluster("a"));
        controller.close();
        assert_eq!(*controller.state(), SelectionState::Idle);

        controller.click_cluster(&multi_cluster(&["a", "b"]));
        controller.close();
        assert_eq!(*controller.state(), SelectionState::Idle);
    }

    #[test]
    fn test_reconcile_keeps_surviving_single_selection() {
        let mut controller = SelectionController::new();
        controller.click_cluster(&single_cluster("a"));

        // After a zoom change, "a" is now buried inside a bigger cluster.
        let recomputed = vec![multi_cluster(&["x", "a", "y"])];
        controller.reconcile(&recomputed);
        assert_eq!(controller.state().open_item_id(), Some("a"));
    }

    #[test]
    fn test_reconcile_drops_vanished_single_selection() {
        let mut controller = SelectionController::new();
        controller.click_cluster(&single_cluster("a"));

        let recomputed = vec![single_cluster("b")];
        controller.reconcile(&recomputed);
        assert_eq!(*controller.state(), SelectionState::Idle);
    }

    #[test]
    fn test_reconcile_refreshes_open_cluster_members() {
        let mut controller = SelectionController::new();
        controller.click_cluster(&multi_cluster(&["a", "b"]));

        // Zooming out merged more items under the same anchor.
        let recomputed = vec![multi_cluster(&["a", "b", "c", "d"])];
        controller.reconcile(&recomputed);

        match controller.state() {
            SelectionState::ClusterOpen { members } => assert_eq!(members.len(), 4),
            other => panic!("expected ClusterOpen, got {:?}", other),
        }
    }

    #[test]
    fn test_reconcile_against_real_clustering() {
        // End to end: open a marker, recompute at another zoom, reconcile.
        let config = ClusterConfig::default();
        let items = vec![
            Item::placed("a", ItemKind::Lost, GATE),
            Item::placed("b", ItemKind::Found, MapPoint::new(GATE.lat + 5.0e-4, GATE.lng)),
        ];

        let coarse = cluster(&items, config.reference_zoom, &config);
        assert_eq!(coarse.len(), 1);

        let mut controller = SelectionController::new();
        controller.click_cluster(&coarse[0]);
        controller.pick_member("a");

        let fine = cluster(&items, config.max_zoom, &config);
        assert_eq!(fine.len(), 2);
        controller.reconcile(&fine);
        assert_eq!(controller.state().open_item_id(), Some("a"));
    }
}
