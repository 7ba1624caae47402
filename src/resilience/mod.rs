//! 弹性模块：带指数退避的重试引擎。
//!
//! # Resilience Module
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`retry`] | Bounded retry with exponential backoff and cooperative cancellation |
//!
//! ```rust
//! use trade_http::resilience::retry::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(2, Duration::from_millis(200));
//! assert_eq!(policy.backoff(0), Duration::from_millis(200));
//! assert_eq!(policy.backoff(1), Duration::from_millis(400));
//! ```

pub mod retry;

pub use retry::{RetryPolicy, DEFAULT_BACKOFF_BASE};
