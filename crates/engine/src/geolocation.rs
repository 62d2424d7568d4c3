use foundation::LatLon;
use futures_util::future::LocalBoxFuture;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("location access denied")]
    Denied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// One-shot position lookup (not a stream).
pub trait Geolocator {
    fn current_position(&self) -> LocalBoxFuture<'_, Result<LatLon, GeolocationError>>;
}

/// Always answers with the same position, or denies when built with `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocator {
    position: Option<LatLon>,
}

impl FixedGeolocator {
    pub fn new(position: Option<LatLon>) -> Self {
        Self { position }
    }
}

impl Geolocator for FixedGeolocator {
    fn current_position(&self) -> LocalBoxFuture<'_, Result<LatLon, GeolocationError>> {
        let result = self.position.ok_or(GeolocationError::Denied);
        Box::pin(async move { result })
    }
}
