//! Error type definitions for the HLS relay

use thiserror::Error;

/// Upstream fetch failures
///
/// Produced by an [`UpstreamFetcher`](crate::utils::http_client::UpstreamFetcher)
/// when no complete response could be obtained. A non-2xx status is *not* a
/// fetch error; the relay forwards it.
#[derive(Error, Debug)]
pub enum FetchError {
    /// TCP/TLS connection to the origin failed
    #[error("Connection failed: {url} - {message}")]
    Connect { url: String, message: String },

    /// Connect or total request timeout elapsed
    #[error("Upstream timed out: {url}")]
    Timeout { url: String },

    /// Response headers arrived but the body could not be read
    #[error("Failed to read upstream body: {url} - {message}")]
    Body { url: String, message: String },

    /// Any other request failure (invalid request, redirect loop, ...)
    #[error("Upstream request failed: {url} - {message}")]
    Request { url: String, message: String },
}

/// Errors returned by the relay interceptor
#[derive(Error, Debug)]
pub enum RelayError {
    /// The requested resource path could not be joined onto the upstream base URL
    #[error("Invalid resource path: {path} - {message}")]
    InvalidPath { path: String, message: String },

    /// Upstream fetch failed; no response was relayed
    #[error("Upstream fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The outgoing response could not be assembled
    #[error("Failed to build response: {message}")]
    Response { message: String },
}

impl FetchError {
    /// Whether this failure was caused by a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Classify a reqwest error raised while sending a request to `url`
    pub fn from_reqwest<S: Into<String>>(url: S, error: &reqwest::Error) -> Self {
        let url = url.into();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() {
            Self::Connect {
                url,
                message: error.to_string(),
            }
        } else if error.is_body() || error.is_decode() {
            Self::Body {
                url,
                message: error.to_string(),
            }
        } else {
            Self::Request {
                url,
                message: error.to_string(),
            }
        }
    }
}

impl RelayError {
    /// Create an invalid path error
    pub fn invalid_path<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a response construction error
    pub fn response<S: Into<String>>(message: S) -> Self {
        Self::Response {
            message: message.into(),
        }
    }
}
