use crate::classifier::AccessibilityStatus;

/// How a marker icon is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerStyle {
    pub icon: MarkerIcon,
    /// Icon box edge in pixels.
    pub size_px: u32,
    /// CSS class list applied to the icon element.
    pub class_name: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkerIcon {
    /// Filled circle with a white border.
    Dot { color: &'static str },
    Glyph(&'static str),
    /// The map widget's stock pin.
    Pin,
}

pub const AMENITY_ICON_PX: u32 = 16;
pub const REPORT_ICON_PX: u32 = 20;
pub const PIN_ICON_PX: u32 = 25;
pub const REPORT_GLYPH: &str = "\u{26a0}\u{fe0f}";

pub fn status_color(status: AccessibilityStatus) -> &'static str {
    match status {
        AccessibilityStatus::Accessible => "green",
        AccessibilityStatus::Inaccessible => "red",
        AccessibilityStatus::Unknown => "gray",
    }
}

impl MarkerStyle {
    /// `wheelchair_tag` only feeds the CSS class, mirroring the raw tag.
    pub fn amenity(status: AccessibilityStatus, wheelchair_tag: Option<&str>) -> Self {
        let class_name = match wheelchair_tag {
            Some(tag) => format!("amenity-marker {tag}"),
            None => "amenity-marker".to_string(),
        };
        Self {
            icon: MarkerIcon::Dot {
                color: status_color(status),
            },
            size_px: AMENITY_ICON_PX,
            class_name,
        }
    }

    pub fn report() -> Self {
        Self {
            icon: MarkerIcon::Glyph(REPORT_GLYPH),
            size_px: REPORT_ICON_PX,
            class_name: "report-marker".to_string(),
        }
    }

    pub fn user() -> Self {
        Self {
            icon: MarkerIcon::Pin,
            size_px: PIN_ICON_PX,
            class_name: "user-marker".to_string(),
        }
    }
}
