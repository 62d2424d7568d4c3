use std::time::Duration;

use engine::MapCamera;
use foundation::LatLon;
use streaming::HttpClientConfig;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_RADIUS_M: u32 = 1000;
pub const DEFAULT_TIMEOUT_S: u64 = 25;
pub const DEFAULT_CENTER: LatLon = LatLon::new(40.7128, -74.0060);
pub const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub http: HttpClientConfig,
    pub radius_m: u32,
    pub camera: MapCamera,
    /// Position reported by `locate`; `None` means location is denied.
    pub home: Option<LatLon>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            http: HttpClientConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_S),
            },
            radius_m: DEFAULT_RADIUS_M,
            camera: MapCamera::new(DEFAULT_CENTER, DEFAULT_ZOOM),
            home: None,
        }
    }
}

/// Parses `<lat>,<lon>` into a checked coordinate.
pub fn parse_lat_lon(value: &str) -> Result<LatLon, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected <lat>,<lon>, got {value:?}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude {lat:?}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude {lon:?}"))?;
    LatLon::checked(lat, lon).map_err(|e| e.to_string())
}
