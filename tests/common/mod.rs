//! Mock HTTP server setup for integration tests

#![allow(dead_code)]

use mockito::{Server, ServerGuard};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trade_http::{HttpClient, HttpClientBuilder, Progress};

/// Test fixture that owns a mock server.
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        init_tracing();
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Builder pointed at the mock server, with a short backoff so retry tests stay fast.
    pub fn builder(&self) -> HttpClientBuilder {
        HttpClient::builder()
            .base_url(&self.base_url)
            .backoff_base(Duration::from_millis(5))
    }

    pub fn client(&self) -> HttpClient {
        self.builder().build().expect("client")
    }
}

/// Route library logs to the test writer. Set `RUST_LOG=trade_http=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Collects progress events from a callback.
#[derive(Clone, Default)]
pub struct ProgressLog(pub Arc<Mutex<Vec<Progress>>>);

impl ProgressLog {
    pub fn recorder(&self) -> impl Fn(Progress) + Send + Sync + 'static {
        let events = self.0.clone();
        move |p| events.lock().unwrap().push(p)
    }

    pub fn events(&self) -> Vec<Progress> {
        self.0.lock().unwrap().clone()
    }
}
