//! Session API client
//!
//! Thin wrapper over `reqwest` that joins paths onto the configured base URL,
//! keeps cookies across requests, and attaches `Authorization: Bearer <token>`
//! from the shared [`TokenStore`] to every request that has a token.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::credential::{token_from_response, AccessToken, CredentialError, TokenStore};
use crate::config::RoomConfig;

/// Errors returned by API calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or protocol failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        /// Request method
        method: &'static str,
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body (possibly empty)
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("failed to decode response from {url}: {reason}")]
    Decode {
        /// Request URL
        url: String,
        /// Decoder message
        reason: String,
    },
}

impl ApiError {
    /// HTTP status, if the server answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode { .. } => None,
        }
    }
}

/// HTTP client for the booking/treatment API
#[derive(Clone, Debug)]
pub struct ApiClient {
    /// Base URL every path is joined onto
    base_url: String,
    /// HTTP client (cookie store enabled)
    http: reqwest::Client,
    /// Source of the bearer token
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &RoomConfig, tokens: Arc<TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            tokens,
        })
    }

    /// Token store shared with this client
    #[must_use]
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Full URL for an API path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Attach the bearer token, if one is stored
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.current() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    /// GET a path and decode the JSON body
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that does not decode into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        let response = self.authorize(self.http.get(&url)).send().await?;
        decode(check_status("GET", &url, response).await?, &url).await
    }

    /// POST a JSON body to a path and decode the JSON response
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that does not decode into `T`.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");
        let response = self.authorize(self.http.post(&url)).json(body).send().await?;
        decode(check_status("POST", &url, response).await?, &url).await
    }

    /// Call the cookie-exchange endpoint and read the access-token cookie
    ///
    /// The request is sent with credentials (cookie store) so the endpoint
    /// can see the web app's session cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the endpoint answers with an
    /// error status, or the cookie is not set.
    pub async fn exchange_cookie(
        &self,
        url: &str,
        cookie_name: &str,
    ) -> Result<AccessToken, CredentialError> {
        tracing::debug!(url = %url, "Exchanging session cookie for access token");
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CredentialError::ExchangeStatus(response.status().as_u16()));
        }
        token_from_response(&response, cookie_name)
            .ok_or_else(|| CredentialError::CookieMissing(cookie_name.to_string()))
    }
}

async fn check_status(
    method: &'static str,
    url: &str,
    response: Response,
) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        method,
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    // Empty success bodies decode as JSON null
    let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(bytes).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
