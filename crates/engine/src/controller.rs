use std::cell::{Cell, RefCell};
use std::rc::Rc;

use foundation::{LatLon, MarkerHandle, Viewport};
use layers::MapSurface;
use runtime::{Notice, NoticeBus};
use streaming::{AmenitySource, FetchError, NewReport, ReportService, SubmitError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    GeolocationError, Geolocator, RefreshOutcome, ReportLifecycleManager, SharedRegistry,
    ViewportFetchCoordinator, shared_registry,
};

/// Zoom applied when the map recenters on the user's location.
pub const LOCATE_ZOOM: u8 = 16;

pub const LOCATION_DENIED_NOTICE: &str = "Location access denied or unavailable";
pub const REPORT_SUBMITTED_NOTICE: &str = "Report submitted successfully!";
pub const REPORT_FAILED_NOTICE: &str = "Error submitting report";

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapCamera {
    pub center: LatLon,
    pub zoom: u8,
}

impl MapCamera {
    pub const fn new(center: LatLon, zoom: u8) -> Self {
        Self { center, zoom }
    }
}

/// The external services a controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub amenities: Rc<dyn AmenitySource>,
    pub reports: Rc<dyn ReportService>,
    pub geolocator: Rc<dyn Geolocator>,
}

/// Owns the map context and turns viewport events into refreshes.
///
/// Every settle event refreshes; there is no debouncing. Rapid events are
/// made safe by the coordinator's generation check, not by dropping events.
pub struct ViewportController<S> {
    camera: Cell<MapCamera>,
    radius_m: u32,
    registry: SharedRegistry<S>,
    coordinator: ViewportFetchCoordinator<S>,
    reports: ReportLifecycleManager<S>,
    geolocator: Rc<dyn Geolocator>,
    notices: RefCell<NoticeBus>,
}

impl<S: MapSurface + 'static> ViewportController<S> {
    pub fn new(surface: S, collaborators: Collaborators, camera: MapCamera, radius_m: u32) -> Self {
        let registry = shared_registry(surface);
        Self {
            camera: Cell::new(camera),
            radius_m,
            coordinator: ViewportFetchCoordinator::new(collaborators.amenities, registry.clone()),
            reports: ReportLifecycleManager::new(collaborators.reports, registry.clone()),
            registry,
            geolocator: collaborators.geolocator,
            notices: RefCell::new(NoticeBus::new()),
        }
    }

    pub fn camera(&self) -> MapCamera {
        self.camera.get()
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.camera.get().center, self.radius_m)
    }

    pub fn registry(&self) -> &SharedRegistry<S> {
        &self.registry
    }

    pub fn coordinator(&self) -> &ViewportFetchCoordinator<S> {
        &self.coordinator
    }

    pub fn reports(&self) -> &ReportLifecycleManager<S> {
        &self.reports
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().notices().to_vec()
    }

    pub fn drain_notices(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain()
    }

    /// Initial map load: refreshes the starting viewport and loads the
    /// persisted reports while that refresh is in flight.
    ///
    /// A failed report load is logged and returned; the refresh goes ahead
    /// regardless.
    pub async fn start(&self) -> (Option<JoinHandle<RefreshOutcome>>, Result<usize, FetchError>) {
        info!(center = %self.camera.get().center, radius = self.radius_m, "starting");
        let refresh = self.coordinator.refresh(self.viewport());
        let loaded = self.reports.load_all().await;
        (refresh, loaded)
    }

    /// Pan or zoom finished. An invalid center leaves the camera alone and
    /// issues nothing.
    pub fn on_viewport_settled(
        &self,
        center: LatLon,
        zoom: Option<u8>,
    ) -> Option<JoinHandle<RefreshOutcome>> {
        if let Err(error) = center.validate() {
            debug!(%error, "ignoring settle with invalid center");
            return None;
        }
        let mut camera = self.camera.get();
        camera.center = center;
        if let Some(zoom) = zoom {
            camera.zoom = zoom;
        }
        self.camera.set(camera);
        self.coordinator.refresh(self.viewport())
    }

    /// Zoom changed without moving the center.
    pub fn on_zoom_settled(&self, zoom: u8) -> Option<JoinHandle<RefreshOutcome>> {
        self.on_viewport_settled(self.camera.get().center, Some(zoom))
    }

    /// Asks for the user's position once. On success the camera recenters,
    /// the "you are here" marker moves there and the new viewport is
    /// refreshed. On failure a notice is raised and nothing else changes.
    pub async fn locate(&self) -> Result<Option<JoinHandle<RefreshOutcome>>, GeolocationError> {
        let position = self
            .geolocator
            .current_position()
            .await
            .and_then(|position| {
                position
                    .validate()
                    .map(|()| position)
                    .map_err(|e| GeolocationError::Unavailable(e.to_string()))
            });

        match position {
            Ok(position) => {
                info!(lat = position.lat, lon = position.lon, "located");
                self.camera.set(MapCamera::new(position, LOCATE_ZOOM));
                self.registry.borrow_mut().place_user(position);
                Ok(self.coordinator.refresh(self.viewport()))
            }
            Err(error) => {
                warn!(%error, "geolocation failed");
                self.notices
                    .borrow_mut()
                    .error("geolocation", LOCATION_DENIED_NOTICE);
                Err(error)
            }
        }
    }

    /// A report form pre-filled with the current map center.
    pub fn report_draft(
        &self,
        issue_type: impl Into<String>,
        description: impl Into<String>,
    ) -> NewReport {
        NewReport::new(self.camera.get().center, issue_type, description)
    }

    /// Submits `report` and tells the user how it went.
    pub async fn submit_report(&self, report: NewReport) -> Result<MarkerHandle, SubmitError> {
        let result = self.reports.submit(report).await;
        let mut notices = self.notices.borrow_mut();
        match &result {
            Ok(_) => notices.info("report", REPORT_SUBMITTED_NOTICE),
            Err(_) => notices.error("report", REPORT_FAILED_NOTICE),
        }
        result
    }

    /// Releases every marker in every category. Refreshes still in flight
    /// are superseded first, so none of them can repopulate the map.
    pub fn shutdown(&self) -> usize {
        self.coordinator.invalidate();
        let removed = self.registry.borrow_mut().clear_all();
        info!(removed, "controller shut down");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Collaborators, LOCATE_ZOOM, LOCATION_DENIED_NOTICE, MapCamera, REPORT_FAILED_NOTICE,
        REPORT_SUBMITTED_NOTICE, ViewportController,
    };
    use crate::{FixedGeolocator, GeolocationError, RefreshOutcome};
    use foundation::{LatLon, Viewport};
    use futures_util::future::LocalBoxFuture;
    use layers::{MarkerCategory, MarkerDescriptor, RecordingSurface};
    use pretty_assertions::assert_eq;
    use runtime::NoticeLevel;
    use std::cell::{Cell, RefCell};
    use std::future::Future;
    use std::rc::Rc;
    use streaming::{
        AmenitySource, AmenityTags, FetchError, NewReport, RawAmenity, ReportRecord,
        ReportService, SubmitError,
    };
    use tokio::sync::oneshot;
    use tokio::task::LocalSet;

    const HOME: LatLon = LatLon::new(40.7128, -74.0060);

    /// Answers every query with one accessible venue at the query center.
    /// A gate, when set, holds the next reply until it is released.
    #[derive(Default)]
    struct EchoSource {
        calls: RefCell<Vec<Viewport>>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    impl AmenitySource for EchoSource {
        fn fetch_amenities(
            &self,
            viewport: Viewport,
        ) -> LocalBoxFuture<'_, Result<Vec<RawAmenity>, FetchError>> {
            self.calls.borrow_mut().push(viewport);
            let venue = RawAmenity {
                lat: Some(viewport.center.lat),
                lon: Some(viewport.center.lon),
                center: None,
                tags: AmenityTags {
                    amenity: Some("cafe".to_string()),
                    name: Some("Joe's".to_string()),
                    wheelchair: Some("yes".to_string()),
                },
            };
            let gate = self.gate.borrow_mut().take();
            Box::pin(async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok(vec![venue])
            })
        }
    }

    #[derive(Default)]
    struct MemoryReports {
        stored: RefCell<Vec<ReportRecord>>,
        reject: Cell<bool>,
    }

    impl ReportService for MemoryReports {
        fn list_reports(&self) -> LocalBoxFuture<'_, Result<Vec<ReportRecord>, FetchError>> {
            let stored = self.stored.borrow().clone();
            Box::pin(async move { Ok(stored) })
        }

        fn submit_report<'a>(
            &'a self,
            report: &'a NewReport,
        ) -> LocalBoxFuture<'a, Result<(), SubmitError>> {
            Box::pin(async move {
                if self.reject.get() {
                    return Err(SubmitError::Status(500));
                }
                self.stored.borrow_mut().push(report.clone().into_record());
                Ok(())
            })
        }
    }

    struct Harness {
        controller: ViewportController<RecordingSurface>,
        source: Rc<EchoSource>,
        reports: Rc<MemoryReports>,
    }

    fn harness(home: Option<LatLon>) -> Harness {
        let source = Rc::new(EchoSource::default());
        let reports = Rc::new(MemoryReports::default());
        reports.stored.borrow_mut().push(
            NewReport::new(LatLon::new(40.71, -74.0), "stairs", "no ramp").into_record(),
        );
        let collaborators = Collaborators {
            amenities: source.clone(),
            reports: reports.clone(),
            geolocator: Rc::new(FixedGeolocator::new(home)),
        };
        let controller = ViewportController::new(
            RecordingSurface::new(),
            collaborators,
            MapCamera::new(LatLon::new(40.7, -74.0), 13),
            1000,
        );
        Harness {
            controller,
            source,
            reports,
        }
    }

    fn run<F: Future>(fut: F) -> F::Output {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(LocalSet::new().run_until(fut))
    }

    fn amenity_positions(controller: &ViewportController<RecordingSurface>) -> Vec<LatLon> {
        controller
            .registry()
            .borrow()
            .descriptors(MarkerCategory::Amenity)
            .map(MarkerDescriptor::position)
            .collect()
    }

    #[test]
    fn start_refreshes_and_loads_reports() {
        let h = harness(None);
        run(async {
            let (refresh, loaded) = h.controller.start().await;
            assert_eq!(loaded, Ok(1));
            assert!(refresh.unwrap().await.unwrap().is_applied());
        });

        let registry = h.controller.registry().borrow();
        assert_eq!(registry.len(MarkerCategory::Amenity), 1);
        assert_eq!(registry.len(MarkerCategory::Report), 1);
        assert_eq!(h.source.calls.borrow().len(), 1);
    }

    #[test]
    fn every_settle_issues_a_refresh() {
        let h = harness(None);
        run(async {
            let handles: Vec<_> = [1.0, 2.0, 3.0]
                .into_iter()
                .filter_map(|lat| h.controller.on_viewport_settled(LatLon::new(lat, 0.0), None))
                .collect();
            assert_eq!(handles.len(), 3);
            for handle in handles {
                handle.await.unwrap();
            }
        });

        assert_eq!(h.source.calls.borrow().len(), 3);
        assert_eq!(h.controller.coordinator().generation().0, 3);
        assert_eq!(amenity_positions(&h.controller), vec![LatLon::new(3.0, 0.0)]);
    }

    #[test]
    fn zoom_settle_keeps_center() {
        let h = harness(None);
        run(async {
            h.controller.on_zoom_settled(15).unwrap().await.unwrap();
        });
        assert_eq!(
            h.controller.camera(),
            MapCamera::new(LatLon::new(40.7, -74.0), 15)
        );
        assert_eq!(h.source.calls.borrow().len(), 1);
    }

    #[test]
    fn invalid_settle_is_ignored() {
        let h = harness(None);
        let before = h.controller.camera();
        assert!(h
            .controller
            .on_viewport_settled(LatLon::new(f64::NAN, 0.0), Some(3))
            .is_none());
        assert_eq!(h.controller.camera(), before);
        assert!(h.source.calls.borrow().is_empty());
    }

    #[test]
    fn locate_recenters_and_places_user() {
        let h = harness(Some(HOME));
        run(async {
            let refresh = h.controller.locate().await.unwrap();
            refresh.unwrap().await.unwrap();
            // A second fix moves the one pin rather than adding another.
            h.controller.locate().await.unwrap();
        });

        assert_eq!(h.controller.camera(), MapCamera::new(HOME, LOCATE_ZOOM));
        let registry = h.controller.registry().borrow();
        let users: Vec<_> = registry
            .descriptors(MarkerCategory::User)
            .map(MarkerDescriptor::position)
            .collect();
        assert_eq!(users, vec![HOME]);
        assert_eq!(h.source.calls.borrow()[0].center, HOME);
        assert!(h.controller.notices().is_empty());
    }

    #[test]
    fn denied_location_only_raises_notice() {
        let h = harness(None);
        let before = h.controller.camera();
        let result = run(h.controller.locate());

        assert!(matches!(result, Err(GeolocationError::Denied)));
        assert_eq!(h.controller.camera(), before);
        assert!(h.controller.registry().borrow().is_empty(MarkerCategory::User));
        assert!(h.source.calls.borrow().is_empty());

        let notices = h.controller.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, LOCATION_DENIED_NOTICE);
    }

    #[test]
    fn out_of_range_fix_is_treated_as_unavailable() {
        let h = harness(Some(LatLon::new(120.0, 0.0)));
        let before = h.controller.camera();
        let result = run(h.controller.locate());

        assert!(matches!(result, Err(GeolocationError::Unavailable(_))));
        assert_eq!(h.controller.camera(), before);
        assert!(h.controller.registry().borrow().is_empty(MarkerCategory::User));
        assert!(h.source.calls.borrow().is_empty());

        let notices = h.controller.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, LOCATION_DENIED_NOTICE);
    }

    #[test]
    fn draft_uses_map_center() {
        let h = harness(None);
        let draft = h.controller.report_draft("curb", "");
        assert_eq!(draft.position(), LatLon::new(40.7, -74.0));
        assert_eq!(draft.issue_type, "curb");
    }

    #[test]
    fn submit_reports_outcome_as_notice() {
        let h = harness(None);
        run(async {
            let draft = h.controller.report_draft("curb", "");
            h.controller.submit_report(draft).await.unwrap();

            h.reports.reject.set(true);
            let draft = h.controller.report_draft("curb", "again");
            assert_eq!(
                h.controller.submit_report(draft).await,
                Err(SubmitError::Status(500))
            );
        });

        let messages: Vec<_> = h
            .controller
            .notices()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(messages, vec![REPORT_SUBMITTED_NOTICE, REPORT_FAILED_NOTICE]);
        assert_eq!(
            h.controller.registry().borrow().len(MarkerCategory::Report),
            1
        );
    }

    #[test]
    fn shutdown_clears_every_category() {
        let h = harness(Some(HOME));
        run(async {
            let (refresh, _) = h.controller.start().await;
            refresh.unwrap().await.unwrap();
            h.controller.locate().await.unwrap().unwrap().await.unwrap();
        });

        assert_eq!(h.controller.shutdown(), 3);
        let registry = h.controller.registry().borrow();
        assert_eq!(registry.total_len(), 0);
        assert_eq!(registry.surface().live_count(), 0);
    }

    #[test]
    fn refresh_landing_after_shutdown_is_discarded() {
        let h = harness(None);
        let (release, gate) = oneshot::channel();
        *h.source.gate.borrow_mut() = Some(gate);

        let outcome = run(async {
            let refresh = h
                .controller
                .on_viewport_settled(LatLon::new(2.0, 2.0), None)
                .unwrap();
            while h.source.calls.borrow().is_empty() {
                tokio::task::yield_now().await;
            }

            h.controller.shutdown();
            release.send(()).unwrap();
            refresh.await.unwrap()
        });

        assert!(matches!(outcome, RefreshOutcome::Stale { .. }), "got {outcome:?}");
        let registry = h.controller.registry().borrow();
        assert_eq!(registry.total_len(), 0);
        assert_eq!(registry.surface().live_count(), 0);
    }
}
