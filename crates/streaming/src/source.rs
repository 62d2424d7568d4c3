//! Seams to the external services the map talks to.
//!
//! Both traits hand back boxed local futures: the map runs on a single
//! cooperative event loop, so nothing here has to be `Send`, and test
//! doubles can script response timing freely.

use foundation::Viewport;
use futures_util::future::LocalBoxFuture;

use crate::protocol::{NewReport, RawAmenity, ReportRecord};

/// Failure to read venue or report data. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("response could not be decoded: {0}")]
    Decode(String),
}

/// Failure to persist a report. Surfaced to the user; no marker is added.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid report: {0}")]
    Invalid(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("report service returned HTTP {0}")]
    Status(u16),
    #[error("report service rejected the report (status {status:?})")]
    Rejected { status: String },
    #[error("response could not be decoded: {0}")]
    Decode(String),
}

/// Venue lookup for a viewport. Reads are idempotent.
pub trait AmenitySource {
    fn fetch_amenities(
        &self,
        viewport: Viewport,
    ) -> LocalBoxFuture<'_, Result<Vec<RawAmenity>, FetchError>>;
}

/// The external report store.
pub trait ReportService {
    fn list_reports(&self) -> LocalBoxFuture<'_, Result<Vec<ReportRecord>, FetchError>>;

    /// Resolves to `Ok(())` only when the store confirmed the write.
    fn submit_report<'a>(
        &'a self,
        report: &'a NewReport,
    ) -> LocalBoxFuture<'a, Result<(), SubmitError>>;
}
