//! Unified error handling for the marker-engine library.
//!
//! The core clustering, landmark, and visual-encoding operations are total
//! functions and never fail. This error type covers the boundary surfaces:
//! snapshot parsing, engine lookups by id or index, and configuration
//! validation.

use std::fmt;

/// Unified error type for marker-engine operations.
#[derive(Debug, Clone)]
pub enum MarkerError {
    /// Raw snapshot JSON could not be parsed
    SnapshotParse { message: String },
    /// Marker index out of range for the current cluster set
    UnknownMarker { index: usize, marker_count: usize },
    /// Item id not present in the referenced cluster or snapshot
    UnknownItem { item_id: String },
    /// Configuration failed validation
    InvalidConfig { message: String },
}

impl fmt::Display for MarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerError::SnapshotParse { message } => {
                write!(f, "Snapshot parse failed: {}", message)
            }
            MarkerError::UnknownMarker {
                index,
                marker_count,
            } => {
                write!(
                    f,
                    "Marker index {} out of range ({} markers)",
                    index, marker_count
                )
            }
            MarkerError::UnknownItem { item_id } => {
                write!(f, "Item '{}' not found", item_id)
            }
            MarkerError::InvalidConfig { message } => {
                write!(f, "Invalid configuration: {}", message)
            }
        }
    }
}

impl std::error::Error for MarkerError {}

/// Result type alias for marker-engine operations.
pub type Result<T> = std::result::Result<T, MarkerError>;

/// Extension trait for converting Option to MarkerError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an unknown-marker error.
    fn ok_or_unknown_marker(self, index: usize, marker_count: usize) -> Result<T>;

    /// Convert Option to Result with an unknown-item error.
    fn ok_or_unknown_item(self, item_id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_unknown_marker(self, index: usize, marker_count: usize) -> Result<T> {
        self.ok_or(MarkerError::UnknownMarker {
            index,
            marker_count,
        })
    }

    fn ok_or_unknown_item(self, item_id: &str) -> Result<T> {
        self.ok_or_else(|| MarkerError::UnknownItem {
            item_id: item_id.to_string(),
        })
    }
}
