use std::time::Duration;

use foundation::Viewport;
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::protocol::{AmenityQuery, NewReport, RawAmenity, ReportRecord, SubmitResponse};
use crate::source::{AmenitySource, FetchError, ReportService, SubmitError};

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// API root, e.g. `http://127.0.0.1:5000/api`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".to_string(),
            timeout: Duration::from_secs(25),
        }
    }
}

/// reqwest-backed client for the amenity and report endpoints.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &HttpClientConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: Option<&AmenityQuery>,
    ) -> Result<T, FetchError> {
        let mut req = self.client.get(url);
        if let Some(query) = query {
            req = req.query(query);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl AmenitySource for HttpBackend {
    fn fetch_amenities(
        &self,
        viewport: Viewport,
    ) -> LocalBoxFuture<'_, Result<Vec<RawAmenity>, FetchError>> {
        let url = self.endpoint("amenities");
        let query = AmenityQuery::from(viewport);
        Box::pin(async move {
            debug!(%url, lat = query.lat, lon = query.lon, radius = query.radius, "GET amenities");
            self.get_json(&url, Some(&query)).await
        })
    }
}

impl ReportService for HttpBackend {
    fn list_reports(&self) -> LocalBoxFuture<'_, Result<Vec<ReportRecord>, FetchError>> {
        let url = self.endpoint("reports");
        Box::pin(async move { self.get_json(&url, None).await })
    }

    fn submit_report<'a>(
        &'a self,
        report: &'a NewReport,
    ) -> LocalBoxFuture<'a, Result<(), SubmitError>> {
        let url = self.endpoint("reports");
        Box::pin(async move {
            let resp = self
                .client
                .post(&url)
                .json(report)
                .send()
                .await
                .map_err(|e| SubmitError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(SubmitError::Status(status.as_u16()));
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| SubmitError::Transport(e.to_string()))?;
            let body: SubmitResponse =
                serde_json::from_slice(&bytes).map_err(|e| SubmitError::Decode(e.to_string()))?;

            if !body.is_success() {
                return Err(SubmitError::Rejected {
                    status: body.status,
                });
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpBackend, HttpClientConfig};

    #[test]
    fn endpoint_joins_without_double_slash() {
        let cfg = HttpClientConfig {
            base_url: "http://localhost:5000/api/".to_string(),
            ..HttpClientConfig::default()
        };
        let backend = HttpBackend::new(&cfg).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000/api");
        assert_eq!(
            backend.endpoint("amenities"),
            "http://localhost:5000/api/amenities"
        );
    }
}
