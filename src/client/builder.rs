use crate::cache::{CacheKeyGenerator, CacheStore, DEFAULT_MAX_CACHE_SIZE};
use crate::client::core::HttpClient;
use crate::client::options::ClientOptions;
use crate::interceptors::Interceptor;
use crate::resilience::DEFAULT_BACKOFF_BASE;
use crate::transport::{HttpTransport, TransportSettings};
use crate::{Error, ErrorContext, Result};
use arc_swap::ArcSwapOption;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SOURCE: &str = "default";

/// Builder for creating clients with custom configuration.
///
/// Connection settings default to the `TRADE_HTTP_*` environment variables; values set
/// here take precedence.
pub struct HttpClientBuilder {
    base_url: Option<String>,
    headers: BTreeMap<String, String>,
    source: Option<String>,
    max_cache_size: Option<usize>,
    timeout: Option<Duration>,
    backoff_base: Duration,
    interceptor: Option<Box<dyn Interceptor>>,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            headers: BTreeMap::new(),
            source: None,
            max_cache_size: None,
            timeout: None,
            backoff_base: DEFAULT_BACKOFF_BASE,
            interceptor: None,
        }
    }

    /// Start from construction options (e.g. loaded from YAML).
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.base_url = options.base_url;
        self.headers.extend(options.headers);
        self.source = options.source;
        self.max_cache_size = options.max_cache_size;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Cache scope tag; clients with different sources never share keys.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn max_cache_size(mut self, n: usize) -> Self {
        self.max_cache_size = Some(n);
        self
    }

    /// Per-exchange timeout. Overrides `TRADE_HTTP_TIMEOUT_SECS`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base of the exponential retry backoff (default 200ms).
    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptor = Some(Box::new(interceptor));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient> {
        let base_url = self.base_url.unwrap_or_default();
        if !base_url.is_empty() {
            url::Url::parse(&base_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid base URL: {}", e),
                    ErrorContext::new()
                        .with_field_path("options.base_url")
                        .with_details(base_url.clone())
                        .with_source("client_builder"),
                )
            })?;
        }

        let mut settings = TransportSettings::from_env();
        if let Some(t) = self.timeout {
            settings.timeout = t;
        }
        let transport = HttpTransport::new(&settings)?;

        let source = self
            .source
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
        let max_cache_size = self
            .max_cache_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_CACHE_SIZE);

        Ok(HttpClient {
            base_url,
            default_headers: self.headers,
            keys: CacheKeyGenerator::new(source),
            cache: CacheStore::new(max_cache_size),
            interceptor: ArcSwapOption::new(self.interceptor.map(Arc::new)),
            transport,
            backoff_base: self.backoff_base,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
