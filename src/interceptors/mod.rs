//! Interceptor hooks around the request lifecycle.
//!
//! Three independently optional extension points, all asynchronous:
//! - `on_request` rewrites the configuration before the cache key and URL are derived,
//!   so a hook that changes the URL or params changes what gets cached under.
//! - `on_response` sees the raw response after the (possibly retried) exchange and
//!   before status and content-type handling.
//! - `on_error` is the last step for any failure on the network path. Returning `Ok`
//!   recovers: the request resolves with the substitute payload.
//!
//! Cache hits never reach `on_response` or `on_error`.

use async_trait::async_trait;

use crate::client::RequestConfig;
use crate::transport::RawResponse;
use crate::types::Payload;
use crate::{Error, Result};

/// Request/response/error hooks. Every method defaults to a pass-through.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn on_request(&self, config: RequestConfig) -> Result<RequestConfig> {
        Ok(config)
    }

    async fn on_response(&self, response: RawResponse) -> Result<RawResponse> {
        Ok(response)
    }

    /// Default re-raises the error unchanged.
    async fn on_error(&self, error: Error) -> Result<Payload> {
        Err(error)
    }
}

/// Runs several interceptors as one registration.
///
/// Request and response hooks run in insertion order, each seeing the previous output.
/// Error hooks run in order until one recovers.
pub struct InterceptorPipeline {
    pub(crate) interceptors: Vec<Box<dyn Interceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl Default for InterceptorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interceptor for InterceptorPipeline {
    async fn on_request(&self, mut config: RequestConfig) -> Result<RequestConfig> {
        for ic in &self.interceptors {
            config = ic.on_request(config).await?;
        }
        Ok(config)
    }

    async fn on_response(&self, mut response: RawResponse) -> Result<RawResponse> {
        for ic in &self.interceptors {
            response = ic.on_response(response).await?;
        }
        Ok(response)
    }

    async fn on_error(&self, mut error: Error) -> Result<Payload> {
        for ic in &self.interceptors {
            match ic.on_error(error).await {
                Ok(recovered) => return Ok(recovered),
                Err(e) => error = e,
            }
        }
        Err(error)
    }
}
