use crate::transport::{ProgressHooks, TransportMode};
use crate::types::{Body, ParamValue, Progress, ProgressCallback, QueryParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call cache behavior. Only GET requests are ever cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    pub enabled: bool,
    /// Entry TTL. `None` keeps the entry until it is evicted or removed.
    pub revalidate: Option<Duration>,
}

impl CacheOptions {
    /// Caching on, no TTL.
    pub fn enable() -> Self {
        Self {
            enabled: true,
            revalidate: None,
        }
    }

    pub fn revalidate_after(mut self, ttl: Duration) -> Self {
        self.revalidate = Some(ttl);
        self
    }
}

/// Per-call settings shared by `request` and the `get/post/put/patch/delete` helpers.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    pub params: Option<QueryParams>,
    pub cache: CacheOptions,
    /// Retries after the first attempt.
    pub retry: u32,
    pub signal: Option<CancellationToken>,
    pub on_upload: Option<ProgressCallback>,
    pub on_download: Option<ProgressCallback>,
    /// Selects the progress-instrumented transport. Set automatically by
    /// [`on_upload`](Self::on_upload) and [`on_download`](Self::on_download).
    pub progress_tracking: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params
            .get_or_insert_with(QueryParams::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn cache(mut self, cache: CacheOptions) -> Self {
        self.cache = cache;
        self
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn signal(mut self, token: CancellationToken) -> Self {
        self.signal = Some(token);
        self
    }

    pub fn on_upload(mut self, f: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.on_upload = Some(Arc::new(f));
        self.progress_tracking = true;
        self
    }

    pub fn on_download(mut self, f: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.on_download = Some(Arc::new(f));
        self.progress_tracking = true;
        self
    }

    pub fn progress_tracking(mut self, enabled: bool) -> Self {
        self.progress_tracking = enabled;
        self
    }

    pub fn transport_mode(&self) -> TransportMode {
        if self.progress_tracking {
            TransportMode::Progress
        } else {
            TransportMode::Simple
        }
    }

    pub(crate) fn progress_hooks(&self) -> ProgressHooks {
        ProgressHooks {
            on_upload: self.on_upload.clone(),
            on_download: self.on_download.clone(),
        }
    }
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("headers", &self.headers)
            .field("params", &self.params)
            .field("cache", &self.cache)
            .field("retry", &self.retry)
            .field("signal", &self.signal.is_some())
            .field("on_upload", &self.on_upload.is_some())
            .field("on_download", &self.on_download.is_some())
            .field("progress_tracking", &self.progress_tracking)
            .finish()
    }
}

/// Full configuration of one call.
///
/// Interceptors receive it by value and hand back a new one; the caller's value is
/// never mutated in place.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    /// Absolute, or relative to the client's base URL.
    pub url: String,
    pub body: Option<Body>,
    pub options: RequestOptions,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_cacheable(&self) -> bool {
        self.method == Method::Get && self.options.cache.enabled
    }
}
