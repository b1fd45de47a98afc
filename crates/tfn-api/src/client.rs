//! Request machinery: envelope decoding and the 401 refresh-retry.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use tfn_schemas::Envelope;

use crate::config::ApiConfig;
use crate::endpoints;
use crate::error::ApiError;

/// One authenticated session against the ordering backend.
///
/// Owns the cookie jar and the refresh guard; clones of the inner
/// `reqwest::Client` share both, which is what the watch endpoints rely on
/// to reuse the session credentials.
pub struct ApiClient {
    cfg: ApiConfig,
    http: reqwest::Client,
    // Serializes session refreshes: concurrent 401s collapse into one
    // refresh instead of a stampede. Owned here, not process-wide.
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    pub fn new(cfg: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            cfg,
            http,
            refresh_gate: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.cfg
    }

    /// The cookie'd transport, shared with the event-stream client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Issue a request and decode the enveloped JSON response.
    ///
    /// A 401 triggers exactly one session refresh followed by one retry;
    /// a 401 on the retry (or a failed refresh) is an auth error. A 2xx
    /// body with `success: false`, or any other non-2xx status, surfaces
    /// the backend's display message as [`ApiError::Rejected`].
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let url = self.cfg.url(path);
        debug!(%method, %url, "api request");

        let mut resp = self.execute(method.clone(), &url, body).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            self.refresh_session().await?;
            resp = self.execute(method, &url, body).await?;
            if resp.status() == StatusCode::UNAUTHORIZED {
                return Err(ApiError::Auth);
            }
        }

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(ApiError::from)?;

        if !status.is_success() {
            // Best effort: pull a display message out of the error body.
            let envelope: Envelope = serde_json::from_slice(&bytes).unwrap_or_default();
            let message = envelope
                .display_message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Request failed with status {status}"));
            warn!(%status, %url, "api request rejected");
            return Err(ApiError::Rejected { message });
        }

        let envelope: Envelope = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        if !envelope.success {
            let message = envelope
                .display_message()
                .unwrap_or("Request failed")
                .to_string();
            return Err(ApiError::Rejected { message });
        }

        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut req = self.http.request(method, url);
        if let Some(b) = body {
            req = req.json(b);
        }
        req.send().await.map_err(ApiError::from)
    }

    /// `POST /users/refresh`: the browser-style cookie refresh, at most one
    /// in flight per client.
    async fn refresh_session(&self) -> Result<(), ApiError> {
        let _gate = self.refresh_gate.lock().await;
        debug!("session expired, refreshing");
        let resp = self
            .execute(Method::POST, &self.cfg.url(endpoints::session_refresh()), None)
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            warn!(status = %resp.status(), "session refresh failed");
            Err(ApiError::Auth)
        }
    }
}
