//! Client interface for the trade HTTP layer.
//!
//! Keep the public surface small: one [`HttpClient`] with per-call [`RequestOptions`].
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod execution;
pub mod options;
pub mod request;

pub use builder::{HttpClientBuilder, DEFAULT_SOURCE};
pub use core::HttpClient;
pub use options::ClientOptions;
pub use request::{CacheOptions, Method, RequestConfig, RequestOptions};
