use std::cell::Cell;
use std::rc::Rc;

use foundation::MarkerHandle;
use layers::MapSurface;
use streaming::{FetchError, NewReport, ReportService, SubmitError};
use tracing::{debug, info, warn};

use crate::SharedRegistry;

/// Lifecycle of one submission: `Idle → Pending → {Succeeded, Failed}`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// A single report submission. Pending is entered at most once; there is no
/// retry, re-submitting means creating a new `Submission`.
#[derive(Debug, Clone)]
pub struct Submission {
    report: NewReport,
    state: SubmissionState,
}

impl Submission {
    pub fn new(report: NewReport) -> Self {
        Self {
            report,
            state: SubmissionState::Idle,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    fn begin(&mut self) -> Result<(), SubmitError> {
        if self.state != SubmissionState::Idle {
            return Err(SubmitError::Invalid(format!(
                "submission already {:?}",
                self.state
            )));
        }
        validate(&self.report)?;
        self.state = SubmissionState::Pending;
        Ok(())
    }

    fn finish(&mut self, succeeded: bool) {
        debug_assert_eq!(self.state, SubmissionState::Pending);
        self.state = if succeeded {
            SubmissionState::Succeeded
        } else {
            SubmissionState::Failed
        };
    }
}

fn validate(report: &NewReport) -> Result<(), SubmitError> {
    report
        .position()
        .validate()
        .map_err(|e| SubmitError::Invalid(e.to_string()))?;
    if report.issue_type.trim().is_empty() {
        return Err(SubmitError::Invalid("issue type is required".to_string()));
    }
    Ok(())
}

/// Counts one outstanding submission until dropped, so a submit future that
/// is abandoned mid-request still releases its slot.
struct InFlight<'a>(&'a Cell<usize>);

impl<'a> InFlight<'a> {
    fn enter(count: &'a Cell<usize>) -> Self {
        count.set(count.get() + 1);
        Self(count)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

/// Loads persisted reports once and appends a marker per confirmed
/// submission. Reports are never removed from the map by this type.
pub struct ReportLifecycleManager<S> {
    service: Rc<dyn ReportService>,
    registry: SharedRegistry<S>,
    loaded: Cell<bool>,
    in_flight: Cell<usize>,
}

impl<S: MapSurface> ReportLifecycleManager<S> {
    pub fn new(service: Rc<dyn ReportService>, registry: SharedRegistry<S>) -> Self {
        Self {
            service,
            registry,
            loaded: Cell::new(false),
            in_flight: Cell::new(0),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// Submissions currently waiting on the service.
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Fetches the persisted reports and appends one marker each.
    ///
    /// Only the first successful call does anything; later calls return
    /// `Ok(0)`. A failed load can be retried.
    pub async fn load_all(&self) -> Result<usize, FetchError> {
        if self.loaded.get() {
            debug!("reports already loaded");
            return Ok(0);
        }

        let reports = self.service.list_reports().await.inspect_err(|error| {
            warn!(%error, "loading reports failed");
        })?;

        // Checked again: another load may have finished while this one waited.
        if self.loaded.replace(true) {
            return Ok(0);
        }

        let count = reports.len();
        let mut registry = self.registry.borrow_mut();
        for report in reports {
            registry.append_report(report);
        }
        info!(count, "loaded reports");
        Ok(count)
    }

    /// Sends `report` and, once the service confirms, appends its marker.
    ///
    /// On any failure nothing on the map changes.
    pub async fn submit(&self, report: NewReport) -> Result<MarkerHandle, SubmitError> {
        let mut submission = Submission::new(report);
        self.submit_tracked(&mut submission).await
    }

    /// Like [`submit`](Self::submit), driving a caller-owned [`Submission`]
    /// so its state can be observed.
    pub async fn submit_tracked(
        &self,
        submission: &mut Submission,
    ) -> Result<MarkerHandle, SubmitError> {
        submission.begin()?;

        let result = {
            let _in_flight = InFlight::enter(&self.in_flight);
            self.service.submit_report(&submission.report).await
        };

        match result {
            Ok(()) => {
                submission.finish(true);
                let record = submission.report.clone().into_record();
                let handle = self.registry.borrow_mut().append_report(record);
                info!(issue_type = %submission.report.issue_type, "report submitted");
                Ok(handle)
            }
            Err(error) => {
                submission.finish(false);
                warn!(%error, "report submission failed");
                Err(error)
            }
        }
    }
}
