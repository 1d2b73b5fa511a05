//! reqwest implementation of [`BackendClient`].

use std::time::Duration;

use reqwest::multipart::Form;
use tracing::{debug, trace, warn};

use super::types::{BackendError, JobParams, TaskStatusReply, TileRequest, TileResponse};
use super::BackendClient;
use crate::coord::GeoPoint;

/// Default timeout applied to every backend request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend client talking HTTP to the tile server.
#[derive(Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestBackend {
    /// Creates a client for `base_url` with the default 30 second timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn form(fields: Vec<(&'static str, String)>) -> Form {
        fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
    }

    /// Sends a request and returns the body of a 2xx response.
    async fn send(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, BackendError> {
        let response = request.send().await.map_err(|e| BackendError::Transport {
            endpoint,
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| BackendError::Transport {
                endpoint,
                reason: format!("failed to read response: {}", e),
            })
    }

    async fn post_job(
        &self,
        endpoint: &'static str,
        params: &JobParams,
    ) -> Result<(), BackendError> {
        let request = self
            .client
            .post(self.url(endpoint))
            .multipart(Self::form(params.form_fields()));
        let body = self.send(endpoint, request).await?;
        trace!(endpoint, body = %String::from_utf8_lossy(&body), "Job call answered");
        Ok(())
    }
}

impl BackendClient for ReqwestBackend {
    async fn update_point(&self, point: GeoPoint) -> Result<(), BackendError> {
        let endpoint = "/update-point";
        let request = self.client.post(self.url(endpoint)).json(&point);
        let body = self.send(endpoint, request).await?;
        debug!(%point, reply = %String::from_utf8_lossy(&body), "Launch point updated");
        Ok(())
    }

    async fn start_download(&self, params: &JobParams) -> Result<(), BackendError> {
        self.post_job("/start-download", params).await
    }

    async fn download_tile(&self, request: &TileRequest<'_>) -> TileResponse {
        let endpoint = "/download-tile";
        let builder = self
            .client
            .post(self.url(endpoint))
            .multipart(Self::form(request.form_fields()));

        match self.send(endpoint, builder).await {
            Ok(body) => TileResponse::from_json(&body),
            Err(e) => {
                warn!(tile = %request.coord, error = %e, "Tile request failed");
                TileResponse::TransportError(e.to_string())
            }
        }
    }

    async fn end_download(&self, params: &JobParams) -> Result<(), BackendError> {
        self.post_job("/end-download", params).await
    }

    async fn task_status(&self) -> Result<TaskStatusReply, BackendError> {
        let endpoint = "/task-status";
        let body = self
            .send(endpoint, self.client.get(self.url(endpoint)))
            .await?;
        TaskStatusReply::from_json(&body)
    }
}
