//! HTTP fetch with classified errors.
//!
//! One GET per call, fixed timeout, no retry. Error display strings are
//! part of the report surface: they appear verbatim in the Connection
//! Errors section and the per-endpoint result records.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Fixed per-request timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Characters of a non-2xx response body kept for the report.
const BODY_SNIPPET_LEN: usize = 100;

/// Classified failure of a single endpoint fetch.
///
/// Never fatal: the run loop records the message on the endpoint result
/// and proceeds to the next endpoint.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server is not listening.
    #[error("Connection refused")]
    ConnectionRefused,

    /// The endpoint does not exist on the server.
    #[error("404 Not Found")]
    NotFound,

    /// The server is up but no game is loaded.
    #[error("503 Game Not Available")]
    Unavailable,

    /// Any other non-200 status, with a body snippet.
    #[error("{status} {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Leading characters of the response body.
        body: String,
    },

    /// The request exceeded the fixed timeout.
    #[error("request timed out after {}s", FETCH_TIMEOUT.as_secs())]
    Timeout,

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("response is not valid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

/// GET client for the game server API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client for the given base URL with the fixed timeout.
    pub fn new(base_url: Url) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self { http, base_url })
    }

    /// The base URL this client targets.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch one endpoint and decode the JSON body.
    ///
    /// `path` is appended to the base URL and may carry a query string
    /// (e.g. `/tiles?limit=10`). Only a 200 status is treated as success;
    /// everything else classifies into a [`FetchError`].
    pub async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        tracing::debug!(%url, "fetching endpoint");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(classify_transport)?;

        match resp.status() {
            StatusCode::OK => resp.json().await.map_err(FetchError::Decode),
            StatusCode::NOT_FOUND => Err(FetchError::NotFound),
            StatusCode::SERVICE_UNAVAILABLE => Err(FetchError::Unavailable),
            status => {
                let body = resp.text().await.unwrap_or_default();
                let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
                Err(FetchError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: snippet,
                })
            }
        }
    }
}

fn classify_transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::ConnectionRefused
    } else {
        FetchError::Transport(err)
    }
}
