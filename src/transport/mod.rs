//! 传输层：单次网络交换（简单模式 / 进度模式）。
//!
//! # Transport
//!
//! One network exchange per call. The mode is decided once per request before dispatch:
//! [`TransportMode::Simple`] sends and buffers the body, [`TransportMode::Progress`]
//! streams the upload and download and reports [`Progress`](crate::types::Progress)
//! events. Both modes honor a cancellation token and surface low-level failures as
//! [`TransportError`], distinct from HTTP-status failures.

mod http;

pub use http::{HttpTransport, TransportSettings};

use crate::types::{FormData, ProgressCallback};
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Simple,
    Progress,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingBody {
    Empty,
    Bytes(Bytes),
    Form(FormData),
}

/// A fully resolved exchange: final URL, merged headers, encoded body.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: OutgoingBody,
}

#[derive(Clone, Default)]
pub struct ProgressHooks {
    pub on_upload: Option<ProgressCallback>,
    pub on_download: Option<ProgressCallback>,
}

impl std::fmt::Debug for ProgressHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressHooks")
            .field("on_upload", &self.on_upload.is_some())
            .field("on_download", &self.on_download.is_some())
            .finish()
    }
}

/// A completed exchange with its body fully read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> &str {
        self.header(CONTENT_TYPE.as_str()).unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
