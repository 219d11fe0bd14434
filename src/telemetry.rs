use std::{fmt, sync::Arc, time::Duration};

use crate::RetryMetadata;

/// Hooks for exporting request metrics to the application's own backend.
#[derive(Clone, Default)]
pub struct MetricsCallbacks {
    /// Called once per logical call, after the last attempt.
    pub http_request: Option<Arc<dyn Fn(HttpRequestMetrics) + Send + Sync>>,
}

impl MetricsCallbacks {
    pub fn on_http_request(callback: impl Fn(HttpRequestMetrics) + Send + Sync + 'static) -> Self {
        Self {
            http_request: Some(Arc::new(callback)),
        }
    }
}

impl fmt::Debug for MetricsCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCallbacks")
            .field(
                "http_request",
                &self.http_request.as_ref().map(|_| "callback"),
            )
            .finish()
    }
}

/// Identifies the call a metric belongs to.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        if let Some(id) = request_id.filter(|id| !id.trim().is_empty()) {
            self.request_id = Some(id);
        }
        self
    }
}

/// Outcome of one logical call, retries included.
#[derive(Clone, Debug)]
pub struct HttpRequestMetrics {
    /// From the first attempt to the final response.
    pub latency: Duration,
    /// `None` when no response was received.
    pub status: Option<u16>,
    pub error: Option<String>,
    pub retries: Option<RetryMetadata>,
    pub context: RequestContext,
}

impl HttpRequestMetrics {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

#[derive(Clone, Default)]
pub(crate) struct Telemetry {
    callbacks: MetricsCallbacks,
}

impl Telemetry {
    pub fn new(callbacks: Option<MetricsCallbacks>) -> Self {
        Self {
            callbacks: callbacks.unwrap_or_default(),
        }
    }

    pub fn http_enabled(&self) -> bool {
        self.callbacks.http_request.is_some()
    }

    pub fn record_http(&self, metrics: HttpRequestMetrics) {
        if let Some(cb) = &self.callbacks.http_request {
            cb(metrics);
        }
    }
}
