//! Raw venue record → renderable amenity marker.
//!
//! Wheelchair tags are matched exactly: `"yes"` and `"no"` only. Values such
//! as `"limited"`, `"Yes"` or `"designated"` classify as unknown.

use foundation::LatLon;
use streaming::RawAmenity;

pub const DEFAULT_DISPLAY_NAME: &str = "Unnamed Venue";
pub const DEFAULT_VENUE_TYPE: &str = "Unknown";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AccessibilityStatus {
    Accessible,
    Inaccessible,
    Unknown,
}

impl AccessibilityStatus {
    pub fn from_wheelchair_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("yes") => Self::Accessible,
            Some("no") => Self::Inaccessible,
            _ => Self::Unknown,
        }
    }
}

/// Recreated on every refresh, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AmenityMarkerDescriptor {
    pub position: LatLon,
    pub status: AccessibilityStatus,
    pub display_name: String,
    pub venue_type: String,
    /// The tag as received, kept for the popup.
    pub wheelchair_tag: Option<String>,
}

/// Returns `None` when the record has no usable position.
pub fn classify(raw: &RawAmenity) -> Option<AmenityMarkerDescriptor> {
    let position = resolve_position(raw)?;
    let tags = &raw.tags;
    Some(AmenityMarkerDescriptor {
        position,
        status: AccessibilityStatus::from_wheelchair_tag(tags.wheelchair.as_deref()),
        display_name: tags
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        venue_type: tags
            .amenity
            .clone()
            .unwrap_or_else(|| DEFAULT_VENUE_TYPE.to_string()),
        wheelchair_tag: tags.wheelchair.clone(),
    })
}

/// Classifies a batch, dropping records without a position.
///
/// Returns the descriptors and the number of dropped records.
pub fn classify_all(raw: &[RawAmenity]) -> (Vec<AmenityMarkerDescriptor>, usize) {
    let markers: Vec<_> = raw.iter().filter_map(classify).collect();
    let dropped = raw.len() - markers.len();
    (markers, dropped)
}

/// Direct `lat`/`lon` when both are present, else `center`.
fn resolve_position(raw: &RawAmenity) -> Option<LatLon> {
    let position = match (raw.lat, raw.lon) {
        (Some(lat), Some(lon)) => LatLon::new(lat, lon),
        _ => {
            let center = raw.center?;
            LatLon::new(center.lat?, center.lon?)
        }
    };
    position.is_valid().then_some(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use streaming::{AmenityTags, RawCenter};

    fn node(lat: f64, lon: f64, wheelchair: Option<&str>) -> RawAmenity {
        RawAmenity {
            lat: Some(lat),
            lon: Some(lon),
            center: None,
            tags: AmenityTags {
                amenity: Some("cafe".to_string()),
                name: Some("Joe's".to_string()),
                wheelchair: wheelchair.map(str::to_string),
            },
        }
    }

    #[test]
    fn wheelchair_tags_match_exactly() {
        let cases = [
            (Some("yes"), AccessibilityStatus::Accessible),
            (Some("no"), AccessibilityStatus::Inaccessible),
            (None, AccessibilityStatus::Unknown),
            (Some("limited"), AccessibilityStatus::Unknown),
            (Some("Yes"), AccessibilityStatus::Unknown),
            (Some("NO"), AccessibilityStatus::Unknown),
            (Some(""), AccessibilityStatus::Unknown),
            (Some(" yes"), AccessibilityStatus::Unknown),
        ];
        for (tag, expected) in cases {
            let d = classify(&node(1.0, 1.0, tag)).unwrap();
            assert_eq!(d.status, expected, "tag {tag:?}");
        }
    }

    #[test]
    fn prefers_direct_position_over_center() {
        let mut raw = node(40.71, -74.01, Some("yes"));
        raw.center = Some(RawCenter {
            lat: Some(1.0),
            lon: Some(1.0),
        });
        let d = classify(&raw).unwrap();
        assert_eq!(d.position, LatLon::new(40.71, -74.01));
    }

    #[test]
    fn falls_back_to_center_when_direct_pair_incomplete() {
        let raw = RawAmenity {
            lat: Some(5.0),
            lon: None,
            center: Some(RawCenter {
                lat: Some(40.72),
                lon: Some(-74.02),
            }),
            tags: AmenityTags::default(),
        };
        let d = classify(&raw).unwrap();
        assert_eq!(d.position, LatLon::new(40.72, -74.02));
        assert_eq!(d.display_name, DEFAULT_DISPLAY_NAME);
        assert_eq!(d.venue_type, DEFAULT_VENUE_TYPE);
        assert_eq!(d.status, AccessibilityStatus::Unknown);
    }

    #[test]
    fn drops_records_without_position() {
        let bank = RawAmenity {
            tags: AmenityTags {
                amenity: Some("bank".to_string()),
                ..AmenityTags::default()
            },
            ..RawAmenity::default()
        };
        assert_eq!(classify(&bank), None);

        let half_center = RawAmenity {
            center: Some(RawCenter {
                lat: Some(1.0),
                lon: None,
            }),
            ..RawAmenity::default()
        };
        assert_eq!(classify(&half_center), None);
    }

    #[test]
    fn zero_coordinates_are_a_real_position() {
        let d = classify(&node(0.0, 0.0, None)).unwrap();
        assert_eq!(d.position, LatLon::new(0.0, 0.0));
    }

    #[test]
    fn out_of_range_position_is_dropped() {
        assert_eq!(classify(&node(91.0, 0.0, None)), None);
        assert_eq!(classify(&node(f64::NAN, 0.0, None)), None);
    }

    #[test]
    fn classify_all_counts_dropped() {
        let raw = vec![
            node(40.71, -74.01, Some("yes")),
            RawAmenity::default(),
            node(40.70, -74.00, Some("no")),
        ];
        let (markers, dropped) = classify_all(&raw);
        assert_eq!(markers.len(), 2);
        assert_eq!(dropped, 1);
    }
}
