use crate::cache::{CacheEntry, CacheKeyGenerator, CacheStore};
use crate::client::builder::HttpClientBuilder;
use crate::client::options::ClientOptions;
use crate::client::request::{Method, RequestConfig, RequestOptions};
use crate::interceptors::Interceptor;
use crate::transport::HttpTransport;
use crate::types::{ApiResponse, Body, Payload};
use crate::Result;
use arc_swap::ArcSwapOption;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client with a private response cache, retry, interceptors and dual transport.
///
/// Each instance is an independent cache/config scope; nothing is process-global.
/// Calls on one instance are independent: there is no request coalescing, and two
/// concurrent misses for the same key both go to the network.
pub struct HttpClient {
    pub(crate) base_url: String,
    pub(crate) default_headers: BTreeMap<String, String>,
    pub(crate) keys: CacheKeyGenerator,
    pub(crate) cache: CacheStore<Payload>,
    pub(crate) interceptor: ArcSwapOption<Box<dyn Interceptor>>,
    pub(crate) transport: HttpTransport,
    pub(crate) backoff_base: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn new(options: ClientOptions) -> Result<Self> {
        HttpClientBuilder::new().options(options).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn source(&self) -> &str {
        self.keys.source()
    }

    pub fn max_cache_size(&self) -> usize {
        self.cache.max_size()
    }

    /// Replace the registered interceptor. Calls already in flight keep the one they started with.
    pub fn set_interceptors<I: Interceptor + 'static>(&self, interceptor: I) {
        self.interceptor.store(Some(Arc::new(Box::new(interceptor))));
    }

    pub fn clear_interceptors(&self) {
        self.interceptor.store(None);
    }

    /// Cache key a GET for `url` + `params` would use on this instance (before request hooks).
    pub fn cache_key_for(&self, url: &str, options: &RequestOptions) -> String {
        self.keys.generate(url, options.params.as_ref())
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<ApiResponse<Payload>> {
        self.request(RequestConfig::new(Method::Get, url).options(options))
            .await
    }

    /// GET and deserialize the JSON payload into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>> {
        self.get(url, options).await?.json()
    }

    pub async fn post(
        &self,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse<Payload>> {
        self.send_with_body(Method::Post, url, body, options).await
    }

    pub async fn put(
        &self,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse<Payload>> {
        self.send_with_body(Method::Put, url, body, options).await
    }

    pub async fn patch(
        &self,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse<Payload>> {
        self.send_with_body(Method::Patch, url, body, options).await
    }

    pub async fn delete(
        &self,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse<Payload>> {
        self.send_with_body(Method::Delete, url, body, options).await
    }

    async fn send_with_body(
        &self,
        method: Method,
        url: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse<Payload>> {
        let config = RequestConfig {
            method,
            url: url.to_string(),
            body,
            options,
        };
        self.request(config).await
    }

    /// Cached data for `key`, promoting it to most-recently-used. TTL is not checked here.
    pub fn get_cache(&self, key: &str) -> Option<Payload> {
        self.cache.get(key).map(|e| e.data)
    }

    /// Prime the cache out of band.
    pub fn set_cache(&self, key: impl Into<String>, data: impl Into<Payload>, ttl: Option<Duration>) {
        self.cache.set(key, CacheEntry::new(data.into(), ttl));
    }

    pub fn remove_cache(&self, key: &str) {
        self.cache.remove(key);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Cached keys, most-recently-used first.
    pub fn cached_keys(&self) -> Vec<String> {
        self.cache.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(max: usize) -> HttpClient {
        HttpClient::builder().max_cache_size(max).build().unwrap()
    }

    #[test]
    fn test_cache_passthroughs() {
        let c = client(10);
        c.set_cache("user:1", json!({"id": 1}), Some(Duration::from_secs(5)));
        assert_eq!(c.get_cache("user:1"), Some(Payload::Json(json!({"id": 1}))));
        c.remove_cache("user:1");
        assert!(c.get_cache("user:1").is_none());

        c.set_cache("a", "x", None);
        c.set_cache("b", "y", None);
        assert_eq!(c.cache_len(), 2);
        c.clear_cache();
        assert_eq!(c.cache_len(), 0);
    }

    #[test]
    fn test_get_cache_promotes() {
        let c = client(2);
        c.set_cache("a", "1", None);
        c.set_cache("b", "2", None);
        assert!(c.get_cache("a").is_some());
        c.set_cache("c", "3", None);
        assert_eq!(c.cached_keys(), vec!["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_cache_key_scoped_by_source() {
        let a = HttpClient::builder().source("a").build().unwrap();
        let b = HttpClient::builder().source("b").build().unwrap();
        let opts = RequestOptions::new().param("ids", vec!["x", "y"]);
        assert_ne!(a.cache_key_for("/assets", &opts), b.cache_key_for("/assets", &opts));
        assert!(a.cache_key_for("/assets", &opts).starts_with("a:"));
    }
}
