use super::{OutgoingBody, OutgoingRequest, ProgressHooks, RawResponse, TransportError, TransportMode};
use crate::types::Progress;
use crate::{Error, ErrorContext, Result};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_LENGTH};
use reqwest::Proxy;
use std::env;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Upload bodies are fed to the connection in chunks of this size so progress can be reported.
const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Connection-level settings for the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy_url: None,
        }
    }
}

impl TransportSettings {
    /// Defaults overridden by `TRADE_HTTP_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timeout = env::var("TRADE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let pool_max_idle_per_host = env::var("TRADE_HTTP_POOL_MAX_IDLE_PER_HOST")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.pool_max_idle_per_host);
        let pool_idle_timeout = env::var("TRADE_HTTP_POOL_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.pool_idle_timeout);
        let proxy_url = env::var("TRADE_HTTP_PROXY_URL").ok().filter(|s| !s.is_empty());
        Self {
            timeout,
            pool_max_idle_per_host,
            pool_idle_timeout,
            proxy_url,
        }
    }
}

/// Performs one network exchange, in simple or progress-tracked mode.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: &TransportSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(settings.timeout)
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .pool_idle_timeout(Some(settings.pool_idle_timeout));

        if let Some(proxy_url) = &settings.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy: {}", e),
                    ErrorContext::new()
                        .with_field_path("TRADE_HTTP_PROXY_URL")
                        .with_details(proxy_url.clone())
                        .with_source("transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(client_build_error)?;

        Ok(Self { client })
    }

    /// Execute `request` once. Cancellation drops the in-flight exchange and yields
    /// [`Error::Cancelled`].
    pub async fn execute(
        &self,
        request: &OutgoingRequest,
        mode: TransportMode,
        hooks: &ProgressHooks,
        cancel: Option<&CancellationToken>,
    ) -> Result<RawResponse> {
        match mode {
            TransportMode::Simple => with_cancel(cancel, self.send_simple(request)).await,
            TransportMode::Progress => {
                with_cancel(cancel, self.send_with_progress(request, hooks)).await
            }
        }
    }

    fn prepare(&self, request: &OutgoingRequest) -> Result<reqwest::RequestBuilder> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        // Registered one at a time; a bad name or value is a configuration error, not a network one.
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid header name: {}", e),
                    ErrorContext::new()
                        .with_field_path(format!("headers[{}]", name))
                        .with_source("transport"),
                )
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid header value: {}", e),
                    ErrorContext::new()
                        .with_field_path(format!("headers[{}]", name))
                        .with_source("transport"),
                )
            })?;
            builder = builder.header(header_name, header_value);
        }
        Ok(builder)
    }

    async fn send_simple(&self, request: &OutgoingRequest) -> Result<RawResponse> {
        let mut builder = self.prepare(request)?;
        builder = match &request.body {
            OutgoingBody::Empty => builder,
            OutgoingBody::Bytes(b) => builder.body(b.clone()),
            OutgoingBody::Form(form) => builder.multipart(form.to_multipart()?),
        };
        let resp = builder.send().await.map_err(network)?;
        let (status, status_text, headers) = head_of(&resp);
        let body = resp.bytes().await.map_err(network)?;
        Ok(RawResponse {
            status,
            status_text,
            headers,
            body,
        })
    }

    async fn send_with_progress(
        &self,
        request: &OutgoingRequest,
        hooks: &ProgressHooks,
    ) -> Result<RawResponse> {
        let mut builder = self.prepare(request)?;
        let mut form_upload: Option<u64> = None;
        builder = match (&request.body, &hooks.on_upload) {
            (OutgoingBody::Empty, _) => builder,
            (OutgoingBody::Bytes(b), Some(on_upload)) => {
                let total = b.len() as u64;
                let chunks: Vec<Bytes> = chunked(b.clone(), UPLOAD_CHUNK_SIZE);
                let on_upload = on_upload.clone();
                let mut loaded = 0u64;
                let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
                    loaded += chunk.len() as u64;
                    on_upload(Progress::new(loaded, Some(total)));
                    Ok::<Bytes, std::io::Error>(chunk)
                }));
                builder
                    .header(CONTENT_LENGTH, total)
                    .body(reqwest::Body::wrap_stream(stream))
            }
            (OutgoingBody::Bytes(b), None) => builder.body(b.clone()),
            (OutgoingBody::Form(form), on_upload) => {
                if on_upload.is_some() {
                    form_upload = Some(form.payload_len());
                }
                builder.multipart(form.to_multipart()?)
            }
        };

        let resp = builder.send().await.map_err(network)?;

        // Multipart framing is produced inside reqwest, so a form upload reports once on completion.
        if let (Some(len), Some(on_upload)) = (form_upload, &hooks.on_upload) {
            on_upload(Progress::new(len, Some(len)));
        }

        let (status, status_text, headers) = head_of(&resp);
        let body = match &hooks.on_download {
            Some(on_download) => {
                let total = resp.content_length();
                let mut stream = resp.bytes_stream();
                // Content-Length is only reported, never trusted for allocation.
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(network)?;
                    buf.extend_from_slice(&chunk);
                    on_download(Progress::new(buf.len() as u64, total));
                }
                buf.freeze()
            }
            None => resp.bytes().await.map_err(network)?,
        };

        Ok(RawResponse {
            status,
            status_text,
            headers,
            body,
        })
    }
}

async fn with_cancel<T>(
    cancel: Option<&CancellationToken>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match cancel {
        Some(token) => {
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("in-flight exchange aborted by cancellation");
                    Err(Error::Cancelled)
                }
                res = fut => res,
            }
        }
        None => fut.await,
    }
}

fn head_of(resp: &reqwest::Response) -> (u16, String, reqwest::header::HeaderMap) {
    let status = resp.status();
    (
        status.as_u16(),
        status.canonical_reason().unwrap_or_default().to_string(),
        resp.headers().clone(),
    )
}

fn client_build_error(e: impl std::fmt::Display) -> Error {
    Error::configuration_with_context(
        format!("failed to build HTTP client: {}", e),
        ErrorContext::new().with_source("transport"),
    )
}

fn network(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Network(TransportError::Timeout(e))
    } else {
        Error::Network(TransportError::Http(e))
    }
}

fn chunked(mut data: Bytes, size: usize) -> Vec<Bytes> {
    let mut out = Vec::with_capacity(data.len() / size + 1);
    while data.len() > size {
        out.push(data.split_to(size));
    }
    if !data.is_empty() {
        out.push(data);
    }
    out
}
