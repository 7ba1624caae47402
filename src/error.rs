use crate::transport::TransportError;
use serde::Serialize;
use thiserror::Error;

/// Structured error context for configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Field path or option key that caused the error (e.g., "options.base_url", "headers[x-token]")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_builder", "request_headers")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Error payload of a completed exchange whose status was not successful.
///
/// `structured` is true when the server answered with the known
/// `{code|meta, message, status}` shape. Otherwise `code` is the HTTP status,
/// `message` the raw body text (or the reason phrase when the body is empty)
/// and `body` carries the raw JSON body if it parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiMeta {
    pub code: i64,
    pub message: String,
    pub status: String,
    pub http_status: u16,
    pub structured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl std::fmt::Display for ApiMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.code, self.status, self.message)
    }
}

/// Unified error type for the request layer.
///
/// The set is closed: every raise site constructs one of these variants
/// explicitly, and the retry engine decides on retryability from the variant.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller's cancellation token fired. Never retried.
    #[error("request was cancelled")]
    Cancelled,

    #[error("Network transport error: {0}")]
    Network(#[from] TransportError),

    #[error("HTTP status error: {0}")]
    HttpStatus(ApiMeta),

    /// The body did not parse as its declared content type. Never retried.
    #[error("Failed to decode `{content_type}` body: {message}")]
    Decode {
        content_type: String,
        message: String,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn decode(content_type: impl Into<String>, msg: impl ToString) -> Self {
        Error::Decode {
            content_type: content_type.into(),
            message: msg.to_string(),
        }
    }

    /// Whether the retry engine may attempt the exchange again after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::HttpStatus(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Network(TransportError::Timeout(_)))
    }

    /// Error payload when the failure came from a non-success HTTP status.
    pub fn api_meta(&self) -> Option<&ApiMeta> {
        match self {
            Error::HttpStatus(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ApiMeta {
        ApiMeta {
            code: 404,
            message: "not found".into(),
            status: "NOT_FOUND".into(),
            http_status: 404,
            structured: true,
            body: None,
        }
    }

    #[test]
    fn test_retryability_by_kind() {
        assert!(Error::HttpStatus(meta()).is_retryable());
        assert!(Error::Network(TransportError::Other("reset".into())).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
        assert!(!Error::decode("application/json", "eof").is_retryable());
        assert!(!Error::configuration("bad").is_retryable());
    }

    #[test]
    fn test_configuration_display_includes_context() {
        let err = Error::configuration_with_context(
            "invalid base URL",
            ErrorContext::new()
                .with_field_path("options.base_url")
                .with_source("client_builder"),
        );
        let text = err.to_string();
        assert!(text.contains("invalid base URL"));
        assert!(text.contains("field: options.base_url"));
        assert!(text.contains("source: client_builder"));
    }

    #[test]
    fn test_api_meta_accessor() {
        let err = Error::HttpStatus(meta());
        let m = err.api_meta().expect("meta");
        assert_eq!(m.code, 404);
        assert_eq!(m.status, "NOT_FOUND");
        assert!(Error::Cancelled.api_meta().is_none());
    }
}
