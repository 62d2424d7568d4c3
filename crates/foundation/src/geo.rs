use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validating constructor. Zero is a real coordinate and is accepted.
    pub fn checked(lat: f64, lon: f64) -> Result<Self, ViewportError> {
        let p = Self { lat, lon };
        p.validate()?;
        Ok(p)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> Result<(), ViewportError> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(ViewportError::NonFinite {
                lat: self.lat,
                lon: self.lon,
            });
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(ViewportError::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(ViewportError::LongitudeOutOfRange(self.lon));
        }
        Ok(())
    }
}

impl std::fmt::Display for LatLon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
    #[error("coordinate is not finite: lat={lat} lon={lon}")]
    NonFinite { lat: f64, lon: f64 },
    #[error("latitude out of range [-90, 90]: {0}")]
    LatitudeOutOfRange(f64),
    #[error("longitude out of range [-180, 180]: {0}")]
    LongitudeOutOfRange(f64),
    #[error("query radius must be positive")]
    ZeroRadius,
}

/// The region a venue query covers: a center and a radius in meters.
///
/// Produced by the map widget and read-only to everything downstream.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLon,
    pub radius_m: u32,
}

impl Viewport {
    pub const fn new(center: LatLon, radius_m: u32) -> Self {
        Self { center, radius_m }
    }

    pub fn validate(&self) -> Result<(), ViewportError> {
        self.center.validate()?;
        if self.radius_m == 0 {
            return Err(ViewportError::ZeroRadius);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LatLon, Viewport, ViewportError};

    #[test]
    fn accepts_zero_and_bounds() {
        assert!(LatLon::new(0.0, 0.0).is_valid());
        assert!(LatLon::new(90.0, -180.0).is_valid());
        assert!(LatLon::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn rejects_non_finite_and_out_of_range() {
        assert!(matches!(
            LatLon::checked(f64::NAN, 1.0),
            Err(ViewportError::NonFinite { .. })
        ));
        assert!(matches!(
            LatLon::checked(1.0, f64::INFINITY),
            Err(ViewportError::NonFinite { .. })
        ));
        assert_eq!(
            LatLon::checked(90.5, 0.0),
            Err(ViewportError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            LatLon::checked(0.0, -181.0),
            Err(ViewportError::LongitudeOutOfRange(-181.0))
        );
    }

    #[test]
    fn viewport_requires_positive_radius() {
        let v = Viewport::new(LatLon::new(40.7, -74.0), 0);
        assert_eq!(v.validate(), Err(ViewportError::ZeroRadius));
        assert!(Viewport::new(LatLon::new(40.7, -74.0), 1000).validate().is_ok());
    }

    #[test]
    fn serializes_as_plain_lat_lon() {
        let json = serde_json::to_string(&LatLon::new(1.5, -2.25)).unwrap();
        assert_eq!(json, r#"{"lat":1.5,"lon":-2.25}"#);
    }
}
