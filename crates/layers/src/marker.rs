use foundation::LatLon;
use streaming::ReportRecord;

use crate::classifier::AmenityMarkerDescriptor;
use crate::layer::MarkerCategory;
use crate::symbology::MarkerStyle;

/// Anything the registry can put on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerDescriptor {
    Amenity(AmenityMarkerDescriptor),
    Report(ReportRecord),
    User { position: LatLon },
}

impl MarkerDescriptor {
    pub fn category(&self) -> MarkerCategory {
        match self {
            Self::Amenity(_) => MarkerCategory::Amenity,
            Self::Report(_) => MarkerCategory::Report,
            Self::User { .. } => MarkerCategory::User,
        }
    }

    pub fn position(&self) -> LatLon {
        match self {
            Self::Amenity(a) => a.position,
            Self::Report(r) => r.position(),
            Self::User { position } => *position,
        }
    }

    pub fn style(&self) -> MarkerStyle {
        match self {
            Self::Amenity(a) => MarkerStyle::amenity(a.status, a.wheelchair_tag.as_deref()),
            Self::Report(_) => MarkerStyle::report(),
            Self::User { .. } => MarkerStyle::user(),
        }
    }

    /// Popup body, one line per row.
    pub fn popup(&self) -> Vec<String> {
        match self {
            Self::Amenity(a) => vec![
                a.display_name.clone(),
                format!("Type: {}", a.venue_type),
                format!(
                    "Wheelchair: {}",
                    a.wheelchair_tag.as_deref().unwrap_or("unknown")
                ),
            ],
            Self::Report(r) => {
                let mut lines = vec![
                    "Accessibility Issue".to_string(),
                    format!("Type: {}", r.issue_type),
                ];
                if let Some(desc) = r.description.as_deref().filter(|d| !d.is_empty()) {
                    lines.push(format!("Details: {desc}"));
                }
                lines
            }
            Self::User { .. } => vec!["You are here".to_string()],
        }
    }

    pub fn render(&self) -> RenderedMarker {
        RenderedMarker {
            category: self.category(),
            position: self.position(),
            style: self.style(),
            popup: self.popup(),
        }
    }
}

impl From<AmenityMarkerDescriptor> for MarkerDescriptor {
    fn from(d: AmenityMarkerDescriptor) -> Self {
        Self::Amenity(d)
    }
}

impl From<ReportRecord> for MarkerDescriptor {
    fn from(r: ReportRecord) -> Self {
        Self::Report(r)
    }
}

/// What a map surface draws for one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub category: MarkerCategory,
    pub position: LatLon,
    pub style: MarkerStyle,
    pub popup: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::MarkerDescriptor;
    use crate::classifier::{AccessibilityStatus, AmenityMarkerDescriptor};
    use foundation::LatLon;
    use pretty_assertions::assert_eq;
    use streaming::ReportRecord;

    #[test]
    fn amenity_popup_shows_raw_tag_or_unknown() {
        let mut a = AmenityMarkerDescriptor {
            position: LatLon::new(1.0, 2.0),
            status: AccessibilityStatus::Unknown,
            display_name: "Joe's".to_string(),
            venue_type: "cafe".to_string(),
            wheelchair_tag: Some("limited".to_string()),
        };
        assert_eq!(
            MarkerDescriptor::Amenity(a.clone()).popup(),
            vec!["Joe's", "Type: cafe", "Wheelchair: limited"]
        );
        a.wheelchair_tag = None;
        assert_eq!(
            MarkerDescriptor::Amenity(a).popup()[2],
            "Wheelchair: unknown"
        );
    }

    #[test]
    fn report_popup_omits_empty_details() {
        let mut r = ReportRecord {
            id: None,
            lat: 1.0,
            lon: 2.0,
            issue_type: "curb".to_string(),
            description: Some(String::new()),
            created: None,
        };
        assert_eq!(
            MarkerDescriptor::Report(r.clone()).popup(),
            vec!["Accessibility Issue", "Type: curb"]
        );
        r.description = Some("no ramp".to_string());
        assert_eq!(
            MarkerDescriptor::Report(r).popup().last().map(String::as_str),
            Some("Details: no ramp")
        );
    }
}
