//! HTTP transport shared by the port adapters
//!
//! A thin wrapper over `reqwest` that attaches the bearer header, maps
//! response statuses onto `PortError`, and logs every round trip. There is
//! intentionally no retry or backoff here: each request is submitted exactly
//! once and the outcome is surfaced as-is.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use core_kernel::PortError;

use crate::config::HttpConfig;
use crate::envelope::probe_error_message;
use crate::session::SessionStore;

pub struct Transport {
    client: reqwest::Client,
    base_url: String,
    login_path: String,
    session: Arc<SessionStore>,
}

impl Transport {
    pub fn new(config: &HttpConfig, session: Arc<SessionStore>) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::Connection {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            login_path: config.login_path.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// GET returning a deserialized body
    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        action: &str,
    ) -> Result<R, PortError> {
        let response = self.send(Method::GET, path, |r| r).await?;
        self.read_json(response, path, action).await
    }

    /// GET with query parameters
    pub async fn get_json_query<Q: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
        action: &str,
    ) -> Result<R, PortError> {
        let response = self.send(Method::GET, path, |r| r.query(query)).await?;
        self.read_json(response, path, action).await
    }

    /// GET where 404 is a valid absent outcome, not an error
    pub async fn get_optional_json<R: DeserializeOwned>(
        &self,
        path: &str,
        action: &str,
    ) -> Result<Option<R>, PortError> {
        let response = self.send(Method::GET, path, |r| r).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(self.read_json(response, path, action).await?))
    }

    /// GET returning the raw body bytes (PDF/XLSX downloads)
    pub async fn get_bytes(&self, path: &str, action: &str) -> Result<Vec<u8>, PortError> {
        let response = self.send(Method::GET, path, |r| r).await?;
        let response = self.check(response, path, action).await?;
        let bytes = response.bytes().await.map_err(|e| PortError::Connection {
            message: format!("failed reading body of GET {path}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }

    /// GET bytes with query parameters
    pub async fn get_bytes_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        action: &str,
    ) -> Result<Vec<u8>, PortError> {
        let response = self.send(Method::GET, path, |r| r.query(query)).await?;
        let response = self.check(response, path, action).await?;
        let bytes = response.bytes().await.map_err(|e| PortError::Connection {
            message: format!("failed reading body of GET {path}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }

    /// POST with a JSON body, returning a deserialized body
    pub async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<R, PortError> {
        let response = self.send(Method::POST, path, |r| r.json(body)).await?;
        self.read_json(response, path, action).await
    }

    /// POST with a JSON body and no response body of interest
    pub async fn post_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<(), PortError> {
        let response = self.send(Method::POST, path, |r| r.json(body)).await?;
        self.check(response, path, action).await?;
        Ok(())
    }

    /// PUT with a JSON body, returning a deserialized body
    pub async fn put_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<R, PortError> {
        let response = self.send(Method::PUT, path, |r| r.json(body)).await?;
        self.read_json(response, path, action).await
    }

    /// PUT with a JSON body and no response body of interest
    pub async fn put_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<(), PortError> {
        let response = self.send(Method::PUT, path, |r| r.json(body)).await?;
        self.check(response, path, action).await?;
        Ok(())
    }

    /// DELETE with no response body of interest
    pub async fn delete(&self, path: &str, action: &str) -> Result<(), PortError> {
        let response = self.send(Method::DELETE, path, |r| r).await?;
        self.check(response, path, action).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, PortError> {
        let token = self.session.bearer_token(&self.login_path)?;
        let url = format!("{}{}", self.base_url, path);
        let started = Instant::now();

        let request = build(self.client.request(method.clone(), &url)).bearer_auth(token);
        let result = request.send().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                info!(
                    method = %method,
                    path,
                    status = response.status().as_u16(),
                    elapsed_ms,
                    "backend request"
                );
                Ok(response)
            }
            Err(e) if e.is_timeout() => {
                warn!(method = %method, path, elapsed_ms, "backend request timed out");
                Err(PortError::Timeout {
                    operation: format!("{method} {path}"),
                    duration_ms: elapsed_ms,
                })
            }
            Err(e) => {
                warn!(method = %method, path, error = %e, "backend request failed");
                Err(PortError::Connection {
                    message: format!("{method} {path} failed"),
                    source: Some(Box::new(e)),
                })
            }
        }
    }

    async fn check(
        &self,
        response: Response,
        path: &str,
        action: &str,
    ) -> Result<Response, PortError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => {
                // The backend rejected the token; the stored session is dead
                self.session.clear();
                warn!(path, "backend rejected bearer token; session cleared");
                Err(PortError::Unauthorized {
                    message: probe_error_message(&body, action),
                })
            }
            StatusCode::NOT_FOUND => Err(PortError::not_found("Resource", path)),
            StatusCode::CONFLICT => Err(PortError::conflict(probe_error_message(&body, action))),
            _ => Err(PortError::Remote {
                status: status.as_u16(),
                message: probe_error_message(&body, action),
            }),
        }
    }

    async fn read_json<R: DeserializeOwned>(
        &self,
        response: Response,
        path: &str,
        action: &str,
    ) -> Result<R, PortError> {
        let response = self.check(response, path, action).await?;
        let body = response.text().await.map_err(|e| PortError::Connection {
            message: format!("failed reading body of {path}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| {
            PortError::transformation(format!("unexpected response shape from {path}: {e}"))
        })
    }
}
