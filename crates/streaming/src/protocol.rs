//! Wire types for the venue and report endpoints.
//!
//! - `GET  {base}/amenities?lat=&lon=&radius=` → `[RawAmenity]`
//! - `GET  {base}/reports` → `[ReportRecord]`
//! - `POST {base}/reports` with [`NewReport`] → [`SubmitResponse`]
//!
//! Amenity records are Overpass `out center` elements passed through
//! verbatim, so every positional field is optional.

use foundation::{LatLon, Viewport};
use serde::{Deserialize, Serialize};

/// The `status` value the report service answers with on success.
pub const SUBMIT_SUCCESS: &str = "success";

/// Query string of the amenity endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmenityQuery {
    pub lat: f64,
    pub lon: f64,
    /// Search radius in meters.
    pub radius: u32,
}

impl From<Viewport> for AmenityQuery {
    fn from(v: Viewport) -> Self {
        Self {
            lat: v.center.lat,
            lon: v.center.lon,
            radius: v.radius_m,
        }
    }
}

/// Centroid Overpass attaches to ways and relations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCenter {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// The subset of OSM tags the map cares about. Everything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AmenityTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheelchair: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawAmenity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<RawCenter>,
    #[serde(default)]
    pub tags: AmenityTags,
}

/// A persisted accessibility report.
///
/// `id` and `created` are assigned by the store and only present on
/// records loaded back from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub lat: f64,
    pub lon: f64,
    pub issue_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl ReportRecord {
    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// Body of `POST /reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub lat: f64,
    pub lon: f64,
    pub issue_type: String,
    #[serde(default)]
    pub description: String,
}

impl NewReport {
    pub fn new(
        position: LatLon,
        issue_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            lat: position.lat,
            lon: position.lon,
            issue_type: issue_type.into(),
            description: description.into(),
        }
    }

    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    /// The record as it will look once the store has accepted it.
    pub fn into_record(self) -> ReportRecord {
        ReportRecord {
            id: None,
            lat: self.lat,
            lon: self.lon,
            issue_type: self.issue_type,
            description: Some(self.description),
            created: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub status: String,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUBMIT_SUCCESS
    }
}
