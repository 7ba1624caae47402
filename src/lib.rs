//! # trade-http
//!
//! 交易看板的 HTTP 请求层：带 LRU 响应缓存、退避重试、可取消、进度上报与拦截器的异步客户端。
//!
//! HTTP request layer for a trading dashboard: an async client with an in-memory LRU
//! response cache, retry with exponential backoff, cancellation, progress-tracked
//! transfers and request/response/error interceptors.
//!
//! ## Overview
//!
//! Every call goes through the same sequence: request interceptor, cache lookup (GET
//! only, opt-in), URL building, transport with retry, status check, response
//! interceptor, body decoding, cache store. Failures on the network path can be
//! recovered by an error interceptor.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use trade_http::{CacheOptions, HttpClient, RequestOptions};
//!
//! #[tokio::main]
//! async fn main() -> trade_http::Result<()> {
//!     let client = HttpClient::builder()
//!         .base_url("https://api.example.com")
//!         .source("markets")
//!         .build()?;
//!
//!     let resp = client
//!         .get(
//!             "/assets",
//!             RequestOptions::new()
//!                 .param("ids", vec!["BTC", "ETH"])
//!                 .cache(CacheOptions::enable().revalidate_after(Duration::from_secs(30)))
//!                 .retry(2),
//!         )
//!         .await?;
//!
//!     println!("from cache: {}, data: {:?}", resp.from_cache, resp.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | `HttpClient`, its builder and per-call options |
//! | [`cache`] | Cache key generation and the LRU store |
//! | [`transport`] | Simple and progress-instrumented transports |
//! | [`resilience`] | Retry with exponential backoff |
//! | [`interceptors`] | Request/response/error hooks |
//! | [`types`] | Bodies, query params, payloads, progress events |
//! | [`utils`] | URL building |

pub mod cache;
pub mod client;
pub mod interceptors;
pub mod resilience;
pub mod transport;
pub mod types;
pub mod utils;

pub use client::{
    CacheOptions, ClientOptions, HttpClient, HttpClientBuilder, Method, RequestConfig,
    RequestOptions,
};
pub use interceptors::{Interceptor, InterceptorPipeline};
pub use transport::RawResponse;
pub use types::{ApiResponse, Body, FormData, ParamValue, Payload, Progress, QueryParams, Scalar};

pub use tokio_util::sync::CancellationToken;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{ApiMeta, Error, ErrorContext};
