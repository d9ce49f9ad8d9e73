//! Boundary adapter for raw item snapshots.
//!
//! The snapshot provider evolved through several schemas, so raw records
//! arrive with inconsistently populated fields: an optional explicit
//! `type` ("lost"/"found"), a free-text Persian status label, category
//! keys in varying case, and locations that may be missing or partial.
//! This module normalizes all of that into [`Item`] once, at the edge,
//! with defined defaults for every optional field, so the rest of the
//! crate never branches on record shape.

use log::debug;
use serde::Deserialize;

use crate::error::{MarkerError, Result};
use crate::{Category, Item, ItemKind, MapPoint};

/// Persian token marking a "lost" status label ("گم شده" = lost).
const LOST_STATUS_TOKEN: &str = "گم";

/// A raw record as supplied by the snapshot provider.
///
/// Every field is defaulted so that records from older schema versions
/// still deserialize; normalization decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItemRecord {
    pub id: String,
    /// Explicit kind ("lost"/"found") on newer records; empty on older ones
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text status label, e.g. "گم شده" or "پیدا شده"
    pub status: String,
    /// Category key; `category_key` on newer records, `category` on older
    #[serde(alias = "category_key")]
    pub category: String,
    #[serde(rename = "itemName")]
    pub item_name: String,
    pub title: String,
    pub tag: String,
    pub description: String,
    pub image_url: Option<String>,
    pub location: Option<RawLocation>,
}

/// Raw location with both coordinates optional, so partially-filled
/// location objects degrade to "not mappable" instead of failing the record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl RawLocation {
    /// Convert to a map point, rejecting partial or invalid coordinates.
    fn to_point(&self) -> Option<MapPoint> {
        let point = MapPoint::new(self.lat?, self.lng?);
        point.is_valid().then_some(point)
    }
}

/// Infer lost-vs-found for a record.
///
/// An explicit `type` field wins; otherwise the status label is sniffed
/// for the Persian "lost" token. Everything else counts as found.
fn infer_kind(record: &RawItemRecord) -> ItemKind {
    match record.kind.to_ascii_lowercase().as_str() {
        "lost" => ItemKind::Lost,
        "found" => ItemKind::Found,
        _ => {
            if record.status.contains(LOST_STATUS_TOKEN) {
                ItemKind::Lost
            } else {
                ItemKind::Found
            }
        }
    }
}

/// Normalize a single raw record.
///
/// Returns `None` for records without an id: there is nothing to anchor a
/// detail view or selection on, so they are skipped (and logged at debug
/// level by [`normalize_snapshot`]).
pub fn normalize_record(record: RawItemRecord) -> Option<Item> {
    if record.id.is_empty() {
        return None;
    }

    let kind = infer_kind(&record);
    let position = record.location.as_ref().and_then(RawLocation::to_point);
    let title = if record.item_name.is_empty() {
        record.title
    } else {
        record.item_name
    };

    Some(Item {
        id: record.id,
        kind,
        category: Category::from_key(&record.category),
        status_label: record.status,
        title,
        description: record.description,
        image_url: record.image_url,
        position,
    })
}

/// Normalize a full snapshot, skipping unusable records.
pub fn normalize_snapshot(records: Vec<RawItemRecord>) -> Vec<Item> {
    let total = records.len();
    let items: Vec<Item> = records.into_iter().filter_map(normalize_record).collect();

    if items.len() < total {
        debug!(
            "[adapter] Skipped {} of {} records without an id",
            total - items.len(),
            total
        );
    }

    items
}

/// Parse a raw JSON snapshot and normalize it.
pub fn parse_snapshot(json: &str) -> Result<Vec<Item>> {
    let records: Vec<RawItemRecord> =
        serde_json::from_str(json).map_err(|e| MarkerError::SnapshotParse {
            message: e.to_string(),
        })?;
    Ok(normalize_snapshot(records))
}
