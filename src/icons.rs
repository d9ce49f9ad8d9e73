//! Marker icon synthesis.
//!
//! Turns a cluster's composition into a renderable descriptor: a color
//! keyed to the lost/found mix, a capped badge label, and the pin geometry
//! the map widget draws. Synthesis is a pure function of the cluster;
//! memoization lives with the caller (see [`IconCache`](crate::IconCache)).

use serde::Serialize;

use crate::visual::badge_text;
use crate::Cluster;

/// Marker color, total over every composition with at least one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    /// Only lost reports
    Lost,
    /// Only found reports
    Found,
    /// Both kinds present
    Mixed,
}

impl MarkerColor {
    /// CSS color value for the marker fill.
    pub fn css(&self) -> &'static str {
        match self {
            MarkerColor::Lost => "#f43f5e",
            MarkerColor::Found => "#10b981",
            MarkerColor::Mixed => "#a78bfa",
        }
    }
}

/// Lost/found member counts of a cluster. Hashable, so it doubles as the
/// memoization key for synthesized icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClusterComposition {
    pub lost: usize,
    pub found: usize,
}

impl ClusterComposition {
    pub fn of(cluster: &Cluster) -> Self {
        Self {
            lost: cluster.lost_count,
            found: cluster.found_count,
        }
    }

    pub fn total(&self) -> usize {
        self.lost + self.found
    }

    /// Color for this composition. Exactly one of three values for any
    /// composition with `total() >= 1`.
    pub fn color(&self) -> MarkerColor {
        if self.lost > 0 && self.found == 0 {
            MarkerColor::Lost
        } else if self.found > 0 && self.lost == 0 {
            MarkerColor::Found
        } else {
            MarkerColor::Mixed
        }
    }
}

/// Renderable visual descriptor for a marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconDescriptor {
    pub color: MarkerColor,
    /// Empty for single items; capped count otherwise
    pub badge_text: String,
    /// True when the marker aggregates more than one item
    pub is_aggregate: bool,
}

/// Synthesize the icon descriptor for a cluster.
///
/// # Example
/// ```
/// use marker_engine::{synthesize, cluster, ClusterConfig, Item, ItemKind, MapPoint, MarkerColor};
///
/// let spot = MapPoint::new(35.7030, 51.3510);
/// let items = vec![
///     Item::placed("a", ItemKind::Lost, spot),
///     Item::placed("b", ItemKind::Found, spot),
/// ];
/// let clusters = cluster(&items, 16.0, &ClusterConfig::default());
///
/// let icon = synthesize(&clusters[0]);
/// assert_eq!(icon.color, MarkerColor::Mixed);
/// assert_eq!(icon.badge_text, "2");
/// assert!(icon.is_aggregate);
/// ```
pub fn synthesize(cluster: &Cluster) -> IconDescriptor {
    let composition = ClusterComposition::of(cluster);
    IconDescriptor {
        color: composition.color(),
        badge_text: badge_text(composition.total()),
        is_aggregate: composition.total() > 1,
    }
}

/// Pin drawing geometry, derived from member count and the zoom-adaptive
/// base size.
///
/// Single pins render at 0.7x the aggregate size so lone reports read as
/// quieter than groups; the badge circle and its font step down once the
/// count reaches two digits so "42" still fits inside the pin head. Radius
/// and font values are in the pin's 24x32 viewBox units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PinGeometry {
    /// Rendered width in pixels
    pub width: f64,
    /// Rendered height in pixels (4:3 head-to-tail ratio)
    pub height: f64,
    /// Badge circle radius in viewBox units
    pub circle_radius: f64,
    /// Badge font size in viewBox units
    pub badge_font: f64,
}

impl PinGeometry {
    /// Geometry for a marker with `member_count` members at the given base
    /// pin size (see [`pin_size`](crate::pin_size)).
    pub fn for_cluster(member_count: usize, base_size: f64) -> Self {
        let single = member_count <= 1;
        let double_digit = member_count >= 10;

        let width = if single {
            (base_size * 0.7).round()
        } else {
            base_size.round()
        };

        Self {
            width,
            height: (width * 1.33).round(),
            circle_radius: if single {
                4.0
            } else if double_digit {
                6.5
            } else {
                5.0
            },
            badge_font: if double_digit { 5.5 } else { 7.5 },
        }
    }
}

/// Render the marker as an SVG string for hosts that draw DOM icons.
pub fn render_pin_svg(icon: &IconDescriptor, geometry: &PinGeometry) -> String {
    let badge = if icon.is_aggregate && !icon.badge_text.is_empty() {
        format!(
            r#"<text x="12" y="{:.2}" text-anchor="middle" font-family="'Segoe UI',system-ui,sans-serif" font-size="{}" font-weight="800" fill="{}">{}</text>"#,
            11.0 + geometry.badge_font * 0.38,
            geometry.badge_font,
            icon.color.css(),
            icon.badge_text,
        )
    } else {
        String::new()
    };

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 24 32">"#,
            r#"<path d="M12 1C6.477 1 2 5.477 2 11c0 7 10 20 10 20s10-13 10-20c0-5.523-4.477-10-10-10z" fill="{color}" stroke="rgba(255,255,255,0.3)" stroke-width="1"/>"#,
            r#"<circle cx="12" cy="11" r="{r}" fill="rgba(255,255,255,0.92)"/>"#,
            "{badge}",
            "</svg>"
        ),
        w = geometry.width,
        h = geometry.height,
        color = icon.color.css(),
        r = geometry.circle_radius,
        badge = badge,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Item, ItemKind, MapPoint};

    fn cluster_of(lost: usize, found: usize) -> Cluster {
        let spot = MapPoint::new(35.7030, 51.3510);
        let mut members = Vec::new();
        for i in 0..lost {
            members.push(Item::placed(&format!("l{}", i), ItemKind::Lost, spot));
        }
        for i in 0..found {
            members.push(Item::placed(&format!("f{}", i), ItemKind::Found, spot));
        }
        let first = members.remove(0);
        let mut cluster = Cluster::seed(first, spot);
        for item in members {
            cluster.push(item);
        }
        cluster
    }

    #[test]
    fn test_color_totality() {
        // Every composition with at least one member gets exactly one of
        // the three colors.
        for lost in 0..4 {
            for found in 0..4 {
                if lost + found == 0 {
                    continue;
                }
                let composition = ClusterComposition { lost, found };
                let color = composition.color();
                match (lost, found) {
                    (l, 0) if l > 0 => assert_eq!(color, MarkerColor::Lost),
                    (0, f) if f > 0 => assert_eq!(color, MarkerColor::Found),
                    _ => assert_eq!(color, MarkerColor::Mixed),
                }
            }
        }
    }

    #[test]
    fn test_mixed_cluster_is_mixed_color() {
        let icon = synthesize(&cluster_of(1, 1));
        assert_eq!(icon.color, MarkerColor::Mixed);
    }

    #[test]
    fn test_single_item_has_no_badge() {
        let icon = synthesize(&cluster_of(1, 0));
        assert_eq!(icon.color, MarkerColor::Lost);
        assert_eq!(icon.badge_text, "");
        assert!(!icon.is_aggregate);
    }

    #[test]
    fn test_large_cluster_badge_is_capped() {
        let icon = synthesize(&cluster_of(80, 70));
        assert_eq!(icon.badge_text, "99+");
        assert!(icon.is_aggregate);
    }

    #[test]
    fn test_crowded_courtyard_renders_one_capped_marker() {
        // 150 reports inside the grouping radius collapse into a single
        // marker whose badge is capped.
        use crate::{cluster, ClusterConfig};

        let spot = MapPoint::new(35.7030, 51.3510);
        let items: Vec<Item> = (0..150)
            .map(|i| {
                let kind = if i % 2 == 0 { ItemKind::Lost } else { ItemKind::Found };
                Item::placed(
                    &format!("r{}", i),
                    kind,
                    MapPoint::new(spot.lat + (i % 5) as f64 * 1.0e-5, spot.lng),
                )
            })
            .collect();

        let clusters = cluster(&items, 17.0, &ClusterConfig::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 150);

        let icon = synthesize(&clusters[0]);
        assert_eq!(icon.badge_text, "99+");
        assert_eq!(icon.color, MarkerColor::Mixed);
        assert!(icon.is_aggregate);
    }

    #[test]
    fn test_color_css_values() {
        assert_eq!(MarkerColor::Lost.css(), "#f43f5e");
        assert_eq!(MarkerColor::Found.css(), "#10b981");
        assert_eq!(MarkerColor::Mixed.css(), "#a78bfa");
    }

    #[test]
    fn test_pin_geometry_single_vs_aggregate() {
        let single = PinGeometry::for_cluster(1, 40.0);
        let aggregate = PinGeometry::for_cluster(5, 40.0);

        assert_eq!(single.width, 28.0); // 0.7x base
        assert_eq!(aggregate.width, 40.0);
        assert_eq!(aggregate.height, 53.0);
        assert_eq!(single.circle_radius, 4.0);
        assert_eq!(aggregate.circle_radius, 5.0);
    }

    #[test]
    fn test_pin_geometry_double_digit_shrinks_badge_font() {
        let nine = PinGeometry::for_cluster(9, 40.0);
        let twelve = PinGeometry::for_cluster(12, 40.0);

        assert_eq!(nine.badge_font, 7.5);
        assert_eq!(twelve.badge_font, 5.5);
        assert!(twelve.circle_radius > nine.circle_radius);
    }

    #[test]
    fn test_render_pin_svg_aggregate() {
        let cluster = cluster_of(3, 0);
        let icon = synthesize(&cluster);
        let geometry = PinGeometry::for_cluster(cluster.len(), 40.0);
        let svg = render_pin_svg(&icon, &geometry);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("#f43f5e"));
        assert!(svg.contains(">3</text>"));
    }

    #[test]
    fn test_render_pin_svg_single_omits_badge() {
        let cluster = cluster_of(0, 1);
        let icon = synthesize(&cluster);
        let geometry = PinGeometry::for_cluster(cluster.len(), 40.0);
        let svg = render_pin_svg(&icon, &geometry);

        assert!(!svg.contains("<text"));
        assert!(svg.contains("#10b981"));
    }
}
