use std::rc::Rc;

use foundation::Viewport;
use futures_util::future::LocalBoxFuture;
use layers::{MapSurface, classify_all};
use runtime::{FetchGeneration, Generation};
use streaming::{AmenitySource, FetchError, RawAmenity};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::SharedRegistry;

/// How one refresh ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was current and the amenity category now shows it.
    Applied {
        generation: Generation,
        markers: usize,
        dropped: usize,
    },
    /// A newer refresh was issued while this one was in flight.
    Stale {
        generation: Generation,
        latest: Generation,
    },
    /// The query failed; the markers on screen were left as they were.
    Failed {
        generation: Generation,
        error: FetchError,
    },
}

impl RefreshOutcome {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Applied { generation, .. }
            | Self::Stale { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Issues amenity queries and applies only the latest one's response.
///
/// Every refresh is stamped with the next [`Generation`]. In-flight requests
/// are never cancelled; when a response arrives the stamp is compared to the
/// counter and superseded responses are dropped without touching the map.
/// The amenity category therefore converges to the most recently *issued*
/// refresh, whatever order responses arrive in.
pub struct ViewportFetchCoordinator<S> {
    source: Rc<dyn AmenitySource>,
    registry: SharedRegistry<S>,
    generation: Rc<FetchGeneration>,
}

impl<S: MapSurface + 'static> ViewportFetchCoordinator<S> {
    pub fn new(source: Rc<dyn AmenitySource>, registry: SharedRegistry<S>) -> Self {
        Self {
            source,
            registry,
            generation: Rc::new(FetchGeneration::new()),
        }
    }

    /// Latest generation issued so far.
    pub fn generation(&self) -> Generation {
        self.generation.current()
    }

    /// Stamps a new generation and returns the future that completes it.
    ///
    /// Returns `None`, without consuming a generation, when the viewport is
    /// invalid.
    pub fn begin_refresh(
        &self,
        viewport: Viewport,
    ) -> Option<LocalBoxFuture<'static, RefreshOutcome>> {
        if let Err(err) = viewport.validate() {
            debug!(%err, "invalid viewport, skipping refresh");
            return None;
        }

        let generation = self.generation.advance();
        debug!(
            %generation,
            lat = viewport.center.lat,
            lon = viewport.center.lon,
            radius = viewport.radius_m,
            "refreshing amenities"
        );

        let source = Rc::clone(&self.source);
        let registry = Rc::clone(&self.registry);
        let counter = Rc::clone(&self.generation);
        Some(Box::pin(async move {
            let result = source.fetch_amenities(viewport).await;
            apply_response(&counter, &registry, generation, result)
        }))
    }

    /// Supersedes every refresh in flight without issuing a new one. Their
    /// responses come back as [`RefreshOutcome::Stale`].
    pub fn invalidate(&self) -> Generation {
        let generation = self.generation.advance();
        debug!(%generation, "invalidated in-flight refreshes");
        generation
    }

    /// Fire-and-forget refresh on the current `LocalSet`.
    ///
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn refresh(&self, viewport: Viewport) -> Option<JoinHandle<RefreshOutcome>> {
        self.begin_refresh(viewport).map(tokio::task::spawn_local)
    }
}

fn apply_response<S: MapSurface>(
    counter: &FetchGeneration,
    registry: &SharedRegistry<S>,
    generation: Generation,
    result: Result<Vec<RawAmenity>, FetchError>,
) -> RefreshOutcome {
    if !counter.is_current(generation) {
        let latest = counter.current();
        debug!(%generation, %latest, "discarding stale amenity response");
        return RefreshOutcome::Stale { generation, latest };
    }

    let raw = match result {
        Ok(raw) => raw,
        Err(error) => {
            warn!(%generation, %error, "amenity query failed, keeping current markers");
            return RefreshOutcome::Failed { generation, error };
        }
    };

    let (descriptors, dropped) = classify_all(&raw);
    let markers = descriptors.len();
    registry.borrow_mut().replace_amenities(descriptors);
    info!(%generation, markers, dropped, "amenity markers updated");

    RefreshOutcome::Applied {
        generation,
        markers,
        dropped,
    }
}
