use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Construction options for an [`HttpClient`](super::HttpClient).
///
/// Accepts both snake_case and the camelCase names used by front-end configs
/// (`baseURL`, `maxCacheSize`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    #[serde(alias = "baseURL", alias = "baseUrl")]
    pub base_url: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Cache scope tag. Defaults to `"default"`.
    pub source: Option<String>,
    #[serde(alias = "maxCacheSize")]
    pub max_cache_size: Option<usize>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid client options: {}", e),
                ErrorContext::new().with_source("client_options"),
            )
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_max_cache_size(mut self, n: usize) -> Self {
        self.max_cache_size = Some(n);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_camel_case_aliases() {
        let opts = ClientOptions::from_yaml_str(
            "baseURL: https://api.x\nsource: markets\nmaxCacheSize: 20\nheaders:\n  x-app: dashboard\n",
        )
        .unwrap();
        assert_eq!(opts.base_url.as_deref(), Some("https://api.x"));
        assert_eq!(opts.source.as_deref(), Some("markets"));
        assert_eq!(opts.max_cache_size, Some(20));
        assert_eq!(opts.headers.get("x-app").map(String::as_str), Some("dashboard"));
    }

    #[test]
    fn test_yaml_empty_is_default() {
        let opts = ClientOptions::from_yaml_str("{}").unwrap();
        assert_eq!(opts, ClientOptions::default());
    }

    #[test]
    fn test_yaml_invalid_is_configuration_error() {
        let err = ClientOptions::from_yaml_str("maxCacheSize: lots").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
