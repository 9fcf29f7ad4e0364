//! `reqwest` adapter for [`NoteApi`].
//!
//! # Responsibility
//! - Encode requests exactly as the backend expects (JSON register/create,
//!   form-encoded login, bearer auth on note calls).
//! - Turn non-success responses into [`ApiError`] with the server detail.
//!
//! # Invariants
//! - Request logs carry method, path, status and duration only.

use super::{extract_detail, ApiError, ApiResult, NoteApi, RegisterRequest};
use crate::config::{parse_base_url, ClientConfig, ConfigError};
use crate::model::credential::BearerToken;
use crate::model::note::{Note, NoteId};
use crate::model::user::UserProfile;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// HTTP client bound to one API base URL (e.g. `http://localhost:8000/api/v1`).
///
/// Requests run on `reqwest`'s hyper transport, so every call must be awaited
/// inside a Tokio runtime; awaiting one on another executor panics. The stores
/// and [`NoteApi`] themselves carry no runtime requirement.
#[derive(Debug, Clone)]
pub struct HttpNoteApi {
    client: Client,
    base_url: Url,
    health_url: Url,
}

impl HttpNoteApi {
    /// Builds a client for `base_url`; `/health` resolves against its origin.
    ///
    /// # Errors
    /// - `InvalidBaseUrl` when `base_url` is not an absolute http(s) URL.
    /// - `HttpClient` when the TLS backend cannot be initialized.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        let health_url = base_url
            .join("/health")
            .map_err(|err| ConfigError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            health_url,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, method: &'static str, url: &Url, request: RequestBuilder) -> ApiResult<Response> {
        let path = url.path();
        let started_at = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(
                    "event=http_request module=api status=error method={} path={} duration_ms={} error_code=network",
                    method,
                    path,
                    started_at.elapsed().as_millis()
                );
                return Err(ApiError::Network(err.to_string()));
            }
        };
        debug!(
            "event=http_request module=api status=ok method={} path={} http_status={} duration_ms={}",
            method,
            path,
            response.status().as_u16(),
            started_at.elapsed().as_millis()
        );
        ensure_success(response).await
    }
}

#[async_trait]
impl NoteApi for HttpNoteApi {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        let url = self.endpoint(&["auth", "register"]);
        let builder = self.client.post(url.clone()).json(request);
        self.send("POST", &url, builder).await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<BearerToken> {
        let url = self.endpoint(&["auth", "login"]);
        let builder = self
            .client
            .post(url.clone())
            .form(&[("username", email), ("password", password)]);
        let response = self.send("POST", &url, builder).await?;
        let body: TokenResponse = decode_json(response).await?;
        BearerToken::new(body.access_token)
            .ok_or_else(|| ApiError::Decode("empty access_token".to_string()))
    }

    async fn list_notes(&self, token: &BearerToken) -> ApiResult<Vec<Note>> {
        let url = self.endpoint(&["notes"]);
        let builder = self.client.get(url.clone()).bearer_auth(token.as_str());
        let response = self.send("GET", &url, builder).await?;
        decode_json(response).await
    }

    async fn create_note(&self, token: &BearerToken, content: &str) -> ApiResult<()> {
        let url = self.endpoint(&["notes"]);
        let builder = self
            .client
            .post(url.clone())
            .bearer_auth(token.as_str())
            .json(&json!({ "content": content }));
        self.send("POST", &url, builder).await?;
        Ok(())
    }

    async fn delete_note(&self, token: &BearerToken, id: &NoteId) -> ApiResult<()> {
        let url = self.endpoint(&["notes", id.as_str()]);
        let builder = self.client.delete(url.clone()).bearer_auth(token.as_str());
        self.send("DELETE", &url, builder).await?;
        Ok(())
    }

    async fn current_user(&self, token: &BearerToken) -> ApiResult<UserProfile> {
        let url = self.endpoint(&["users", "me"]);
        let builder = self.client.get(url.clone()).bearer_auth(token.as_str());
        let response = self.send("GET", &url, builder).await?;
        decode_json(response).await
    }

    async fn health(&self) -> ApiResult<()> {
        let builder = self.client.get(self.health_url.clone());
        self.send("GET", &self.health_url, builder).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response
        .json::<Value>()
        .await
        .ok()
        .as_ref()
        .and_then(extract_detail);
    if status == StatusCode::UNAUTHORIZED {
        Err(ApiError::Unauthorized { detail })
    } else {
        Err(ApiError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response.json::<T>().await.map_err(|err| {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    })
}
