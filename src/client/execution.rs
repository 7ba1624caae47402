//! 请求编排：拦截器 → 缓存 → URL → 重试/传输 → 状态检查 → 解码 → 写缓存。
//!
//! Request orchestration (one call, strictly sequential steps).

use crate::cache::CacheEntry;
use crate::client::core::HttpClient;
use crate::client::request::RequestConfig;
use crate::error::ApiMeta;
use crate::interceptors::Interceptor;
use crate::resilience::RetryPolicy;
use crate::transport::{OutgoingBody, OutgoingRequest, RawResponse};
use crate::types::{ApiResponse, Body, Payload};
use crate::utils::url_builder;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

impl HttpClient {
    /// Execute one call.
    ///
    /// Any failure on the network path goes to the registered error hook, which may
    /// recover with a substitute payload; without a hook the error is returned unchanged.
    pub async fn request(&self, config: RequestConfig) -> Result<ApiResponse<Payload>> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "http_request",
            request_id = request_id.as_str(),
            method = config.method.as_str(),
            url = config.url.as_str()
        );

        async move {
            // Snapshot the registration so a concurrent `set_interceptors` cannot split one call.
            let registered = self.interceptor.load_full();
            let hooks: Option<&dyn Interceptor> = registered.as_ref().map(|ic| &***ic);

            let mut cache_key = None;
            match self.run(config, hooks, &mut cache_key).await {
                Ok(resp) => Ok(resp),
                Err(err) => match hooks {
                    Some(h) => {
                        debug!(error = %err, "passing failure to error interceptor");
                        let data = h.on_error(err).await?;
                        Ok(ApiResponse {
                            data,
                            cache_key,
                            from_cache: false,
                        })
                    }
                    None => Err(err),
                },
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        config: RequestConfig,
        hooks: Option<&dyn Interceptor>,
        cache_key_out: &mut Option<String>,
    ) -> Result<ApiResponse<Payload>> {
        let config = match hooks {
            Some(h) => h.on_request(config).await?,
            None => config,
        };

        let cache_key = self.keys.generate(&config.url, config.options.params.as_ref());
        *cache_key_out = Some(cache_key.clone());

        let cacheable = config.is_cacheable();
        if cacheable {
            match self.cache.get(&cache_key) {
                Some(entry) if !entry.is_expired() => {
                    debug!(cache_key = cache_key.as_str(), "cache hit");
                    return Ok(ApiResponse {
                        data: entry.data,
                        cache_key: Some(cache_key),
                        from_cache: true,
                    });
                }
                Some(_) => {
                    debug!(cache_key = cache_key.as_str(), "cache entry expired");
                    self.cache.remove(&cache_key);
                }
                None => debug!(cache_key = cache_key.as_str(), "cache miss"),
            }
        }

        let url = url_builder::build(
            &url_builder::join_base(&self.base_url, &config.url),
            config.options.params.as_ref(),
        );
        url::Url::parse(&url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid request URL: {}", e),
                ErrorContext::new()
                    .with_field_path("request.url")
                    .with_details(url.clone())
                    .with_source("request_orchestrator"),
            )
        })?;

        let outgoing = self.outgoing_request(&config, url)?;
        let mode = config.options.transport_mode();
        let progress = config.options.progress_hooks();
        let signal = config.options.signal.as_ref();
        let policy = RetryPolicy::new(config.options.retry, self.backoff_base);

        let attempts = AtomicU32::new(0);
        let start = std::time::Instant::now();
        let outgoing_ref = &outgoing;
        let progress_ref = &progress;
        let attempts_ref = &attempts;
        let response = policy
            .execute(signal, move |attempt| async move {
                attempts_ref.store(attempt + 1, Ordering::Relaxed);
                let resp = self
                    .transport
                    .execute(outgoing_ref, mode, progress_ref, signal)
                    .await?;
                ensure_success(resp)
            })
            .await?;

        info!(
            http_status = response.status,
            attempts = attempts.load(Ordering::Relaxed),
            duration_ms = start.elapsed().as_millis() as u64,
            "exchange completed"
        );

        let response = match hooks {
            Some(h) => h.on_response(response).await?,
            None => response,
        };
        let response = ensure_success(response)?;

        let content_type = response.content_type().to_string();
        let data = Payload::decode(&content_type, response.body)?;

        if cacheable {
            self.cache.set(
                cache_key.clone(),
                CacheEntry::new(data.clone(), config.options.cache.revalidate),
            );
        }

        Ok(ApiResponse {
            data,
            cache_key: Some(cache_key),
            from_cache: false,
        })
    }

    /// Resolve headers and body encoding for the exchange.
    ///
    /// Header precedence: JSON content type (non-form bodies only), then instance
    /// defaults, then per-call headers. Names compare case-insensitively.
    fn outgoing_request(&self, config: &RequestConfig, url: String) -> Result<OutgoingRequest> {
        let is_form = config.body.as_ref().map(Body::is_form).unwrap_or(false);

        let mut headers: Vec<(String, String)> = Vec::new();
        if !is_form {
            merge_header(&mut headers, "Content-Type", "application/json");
        }
        for (k, v) in &self.default_headers {
            merge_header(&mut headers, k, v);
        }
        for (k, v) in &config.options.headers {
            merge_header(&mut headers, k, v);
        }

        let body = match &config.body {
            None => OutgoingBody::Empty,
            Some(Body::Form(form)) => OutgoingBody::Form(form.clone()),
            Some(Body::Json(value)) => {
                let bytes = serde_json::to_vec(value).map_err(|e| {
                    Error::configuration_with_context(
                        format!("failed to serialize body: {}", e),
                        ErrorContext::new().with_field_path("request.body"),
                    )
                })?;
                OutgoingBody::Bytes(Bytes::from(bytes))
            }
        };

        Ok(OutgoingRequest {
            method: config.method.to_reqwest(),
            url,
            headers,
            body,
        })
    }
}

fn merge_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}

/// Turn a non-success response into [`Error::HttpStatus`].
pub(crate) fn ensure_success(resp: RawResponse) -> Result<RawResponse> {
    if resp.is_success() {
        return Ok(resp);
    }
    let meta = api_meta_from(&resp);
    warn!(
        http_status = resp.status,
        code = meta.code,
        status = meta.status.as_str(),
        structured = meta.structured,
        "request failed with HTTP status"
    );
    Err(Error::HttpStatus(meta))
}

/// Parse `{code|meta, message, status}` error bodies, falling back to the raw text.
pub(crate) fn api_meta_from(resp: &RawResponse) -> ApiMeta {
    let json: Option<Value> = serde_json::from_slice(&resp.body).ok();

    if let Some(Value::Object(obj)) = &json {
        if obj.contains_key("meta") || obj.contains_key("status") {
            let meta = obj.get("meta");
            let from_meta = |field: &str| meta.and_then(|m| m.get(field));

            let code = obj
                .get("code")
                .and_then(value_as_code)
                .or_else(|| from_meta("code").and_then(value_as_code))
                .unwrap_or(resp.status as i64);
            let message = obj
                .get("message")
                .and_then(value_as_text)
                .or_else(|| from_meta("message").and_then(value_as_text))
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string());
            let status = obj
                .get("status")
                .and_then(value_as_text)
                .or_else(|| from_meta("status").and_then(value_as_text))
                .unwrap_or_else(|| resp.status_text.clone());

            return ApiMeta {
                code,
                message,
                status,
                http_status: resp.status,
                structured: true,
                body: json,
            };
        }
    }

    let text = String::from_utf8_lossy(&resp.body).trim().to_string();
    ApiMeta {
        code: resp.status as i64,
        message: if text.is_empty() {
            resp.status_text.clone()
        } else {
            text
        },
        status: resp.status_text.clone(),
        http_status: resp.status,
        structured: false,
        body: json,
    }
}

fn value_as_code(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().filter(|c| *c != 0),
        Value::String(s) => s.parse::<i64>().ok().filter(|c| *c != 0),
        _ => None,
    }
}

fn value_as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn raw(status: u16, status_text: &str, body: &str) -> RawResponse {
        RawResponse {
            status,
            status_text: status_text.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_structured_error_body() {
        let meta = api_meta_from(&raw(
            404,
            "Not Found",
            r#"{"code":404,"message":"not found","status":"NOT_FOUND"}"#,
        ));
        assert!(meta.structured);
        assert_eq!(meta.code, 404);
        assert_eq!(meta.message, "not found");
        assert_eq!(meta.status, "NOT_FOUND");
    }

    #[test]
    fn test_meta_wrapped_error_body() {
        let meta = api_meta_from(&raw(
            400,
            "Bad Request",
            r#"{"meta":{"code":4001,"message":"bad symbol","status":"INVALID"}}"#,
        ));
        assert!(meta.structured);
        assert_eq!(meta.code, 4001);
        assert_eq!(meta.message, "bad symbol");
        assert_eq!(meta.status, "INVALID");
        assert_eq!(meta.http_status, 400);
    }

    #[test]
    fn test_structured_without_message_serializes_body() {
        let meta = api_meta_from(&raw(500, "Internal Server Error", r#"{"status":"DOWN"}"#));
        assert!(meta.structured);
        assert_eq!(meta.code, 500);
        assert_eq!(meta.message, r#"{"status":"DOWN"}"#);
        assert_eq!(meta.status, "DOWN");
    }

    #[test]
    fn test_unstructured_json_keeps_raw_body() {
        let meta = api_meta_from(&raw(422, "Unprocessable Entity", r#"{"error":"bad"}"#));
        assert!(!meta.structured);
        assert_eq!(meta.code, 422);
        assert_eq!(meta.status, "Unprocessable Entity");
        assert_eq!(meta.body, Some(serde_json::json!({"error": "bad"})));
    }

    #[test]
    fn test_unstructured_text_and_empty_bodies() {
        let meta = api_meta_from(&raw(502, "Bad Gateway", "upstream down"));
        assert_eq!(meta.message, "upstream down");
        assert!(meta.body.is_none());

        let meta = api_meta_from(&raw(503, "Service Unavailable", ""));
        assert_eq!(meta.message, "Service Unavailable");
    }

    #[test]
    fn test_ensure_success_passes_2xx() {
        assert!(ensure_success(raw(204, "No Content", "")).is_ok());
        let err = ensure_success(raw(404, "Not Found", "")).unwrap_err();
        assert!(matches!(err, Error::HttpStatus(_)));
    }

    #[test]
    fn test_merge_header_case_insensitive() {
        let mut h = Vec::new();
        merge_header(&mut h, "Content-Type", "application/json");
        merge_header(&mut h, "content-type", "text/plain");
        merge_header(&mut h, "x-token", "abc");
        assert_eq!(
            h,
            vec![
                ("content-type".to_string(), "text/plain".to_string()),
                ("x-token".to_string(), "abc".to_string())
            ]
        );
    }
}
