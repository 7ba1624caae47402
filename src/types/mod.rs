//! 类型模块：请求参数、请求体、响应载荷与进度事件。
//!
//! # Types Module
//!
//! Plain data shared by the URL builder, the cache, the transport and the client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ParamValue`] | Query value: a primitive or a list joined into one segment |
//! | [`Body`] | JSON or multipart form request payload |
//! | [`Payload`] | Response body decoded by content type |
//! | [`ApiResponse`] | Envelope returned to callers (`data`, `cache_key`, `from_cache`) |
//! | [`Progress`] | Upload/download progress event |

pub mod body;
pub mod params;
pub mod progress;
pub mod response;

pub use body::{Body, FormData, FormPart};
pub use params::{ParamValue, QueryParams, Scalar};
pub use progress::{Progress, ProgressCallback};
pub use response::{ApiResponse, Payload};
