//! # HTTP Metadata API
//!
//! [`MetadataApi`] over the backend's JSON-LD REST endpoints.
//!
//! ## Endpoints
//!
//! - `GET   /api/v1/metadata/?subject=S&includeObjectProperties=true`
//! - `PATCH /api/v1/metadata/` (body: single-node JSON-LD document)
//! - `GET   /api/v1/vocabulary/`
//! - `GET   /api/v1/metadata/entities/?type=T[&type=U...]`
//! - `GET   /api/v1/metadata/pid?value=PATH` → `{"id": IRI}`

use super::MetadataApi;
use crate::ClientError;
use mercury_core::LinkedValue;
use mercury_core::jsonld::update_document;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

const JSON_LD: &str = "application/ld+json";

const METADATA_PATH: &str = "/api/v1/metadata/";
const VOCABULARY_PATH: &str = "/api/v1/vocabulary/";
const ENTITIES_PATH: &str = "/api/v1/metadata/entities/";
const PID_PATH: &str = "/api/v1/metadata/pid";

#[derive(Debug, Deserialize)]
struct PidResponse {
    id: String,
}

/// HTTP client for the backend metadata API.
#[derive(Clone)]
pub struct HttpMetadataApi {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpMetadataApi {
    /// Create a client for the backend at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url).header(ACCEPT, JSON_LD);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Check status codes, leaving the body unread on success.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(resp.url().to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ServerError(status.as_u16(), body));
        }
        Ok(resp)
    }

    /// Check status codes and parse the JSON body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        Self::check_status(resp)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }
}

impl MetadataApi for HttpMetadataApi {
    async fn get(&self, subject: &str) -> Result<Vec<JsonValue>, ClientError> {
        let req = self
            .request(reqwest::Method::GET, METADATA_PATH)
            .query(&[("subject", subject), ("includeObjectProperties", "true")]);
        let resp = self.send(req).await?;
        Self::handle_response(resp).await
    }

    async fn update(
        &self,
        subject: &str,
        predicate: &str,
        values: &[LinkedValue],
    ) -> Result<(), ClientError> {
        let body = serde_json::to_vec(&update_document(subject, predicate, values))
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        let req = self
            .request(reqwest::Method::PATCH, METADATA_PATH)
            .header(CONTENT_TYPE, JSON_LD)
            .body(body);
        let resp = self.send(req).await?;
        Self::check_status(resp).await.map(|_| ())
    }

    async fn vocabulary(&self) -> Result<Vec<JsonValue>, ClientError> {
        let req = self.request(reqwest::Method::GET, VOCABULARY_PATH);
        let resp = self.send(req).await?;
        Self::handle_response(resp).await
    }

    async fn entities_by_type(&self, class: &str) -> Result<Vec<JsonValue>, ClientError> {
        let req = self
            .request(reqwest::Method::GET, ENTITIES_PATH)
            .query(&[("type", class)]);
        let resp = self.send(req).await?;
        Self::handle_response(resp).await
    }

    async fn entities_by_types(&self, classes: &[String]) -> Result<Vec<JsonValue>, ClientError> {
        // An empty type filter matches no entities.
        if classes.is_empty() {
            return Ok(Vec::new());
        }
        let query: Vec<(&str, &str)> = classes.iter().map(|c| ("type", c.as_str())).collect();
        let req = self
            .request(reqwest::Method::GET, ENTITIES_PATH)
            .query(&query);
        let resp = self.send(req).await?;
        Self::handle_response(resp).await
    }

    async fn subject_by_path(&self, path: &str) -> Result<String, ClientError> {
        let req = self
            .request(reqwest::Method::GET, PID_PATH)
            .query(&[("value", path)]);
        let resp = self.send(req).await?;
        let pid: PidResponse = Self::handle_response(resp).await?;
        Ok(pid.id)
    }
}
