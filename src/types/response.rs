//! Decoded response data and the envelope returned to callers.

use crate::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Response body decoded by content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `application/json`
    Json(serde_json::Value),
    /// `text/*`
    Text(String),
    /// Anything else, kept opaque.
    Binary(Bytes),
}

impl Payload {
    /// Decode a raw body according to its `content-type` header value.
    pub fn decode(content_type: &str, body: Bytes) -> Result<Self> {
        if content_type.contains("application/json") {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Payload::Json(serde_json::Value::Null));
            }
            serde_json::from_slice(&body)
                .map(Payload::Json)
                .map_err(|e| Error::decode(content_type, e))
        } else if content_type.contains("text/") {
            String::from_utf8(body.to_vec())
                .map(Payload::Text)
                .map_err(|e| Error::decode(content_type, e))
        } else {
            Ok(Payload::Binary(body))
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Deserialize a JSON payload into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Payload::Json(v) => {
                T::deserialize(v).map_err(|e| Error::decode("application/json", e))
            }
            Payload::Text(_) => Err(Error::decode("text/*", "payload is not JSON")),
            Payload::Binary(_) => Err(Error::decode(
                "application/octet-stream",
                "payload is not JSON",
            )),
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self {
        Payload::Json(v)
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Payload::Binary(b)
    }
}

/// Response envelope: `{data, cacheKey?, fromCache}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
    pub from_cache: bool,
}

impl<T> ApiResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            cache_key: self.cache_key,
            from_cache: self.from_cache,
        }
    }
}

impl ApiResponse<Payload> {
    /// Deserialize the JSON payload, keeping the envelope.
    pub fn json<T: DeserializeOwned>(self) -> Result<ApiResponse<T>> {
        let data = self.data.json()?;
        Ok(ApiResponse {
            data,
            cache_key: self.cache_key,
            from_cache: self.from_cache,
        })
    }
}
