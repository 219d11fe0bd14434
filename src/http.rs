use std::time::Duration;

use reqwest::{header::HeaderMap, Method, StatusCode};
use serde_json::Value;

use crate::{
    errors::{APIError, Error, FieldError, RetryMetadata},
    REQUEST_ID_HEADER,
};

/// Optional per-call overrides.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub request_id: Option<String>,
    pub headers: HeaderList,
    pub timeout: Option<Duration>,
    pub retry: Option<RetryConfig>,
}

impl RequestOptions {
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .push(HeaderEntry::new(key.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the client-wide retry policy for this call only.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn disable_retry(self) -> Self {
        self.with_retry(RetryConfig::disabled())
    }
}

/// Retry policy for failed calls.
///
/// The default makes up to 3 attempts, doubling `base_backoff` between them
/// (capped at `max_backoff`, with jitter). POST and PATCH are only replayed
/// when `retry_non_idempotent` is set: replaying a create or an action call
/// can duplicate documents on the server.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub retry_non_idempotent: bool,
}

impl RetryConfig {
    /// A single attempt.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// 408, 429 and 5xx are transient.
    pub fn should_retry_status(&self, method: &Method, status: StatusCode) -> bool {
        let transient = status == StatusCode::REQUEST_TIMEOUT
            || status == StatusCode::TOO_MANY_REQUESTS
            || status.is_server_error();
        transient && self.replayable(method)
    }

    pub fn should_retry_error(&self, method: &Method, err: &reqwest::Error) -> bool {
        (err.is_timeout() || err.is_connect() || err.is_request()) && self.replayable(method)
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(10);
        let ceiling = self
            .base_backoff
            .saturating_mul(1 << doublings)
            .min(self.max_backoff);
        // Spread between half and one and a half times the ceiling.
        let factor = fastrand::f64() + 0.5;
        ceiling.mul_f64(factor).min(self.max_backoff)
    }

    fn replayable(&self, method: &Method) -> bool {
        if method == Method::POST || method == Method::PATCH {
            return self.retry_non_idempotent;
        }
        true
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(300),
            max_backoff: Duration::from_secs(5),
            retry_non_idempotent: false,
        }
    }
}

/// Extra headers, sent in insertion order after the built-in ones.
#[derive(Clone, Debug, Default)]
pub struct HeaderList(Vec<HeaderEntry>);

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    /// When the name or the value is blank.
    pub fn push(&mut self, entry: HeaderEntry) {
        assert!(
            entry.is_valid(),
            "Invalid header: blank name or value ({:?}: {:?})",
            entry.key,
            entry.value
        );
        self.0.push(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (key, value) in iter {
            list.push(HeaderEntry::new(key.into(), value.into()));
        }
        list
    }
}

#[derive(Clone, Debug)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: String, value: String) -> Self {
        Self { key, value }
    }

    pub fn is_valid(&self) -> bool {
        !self.key.trim().is_empty() && !self.value.trim().is_empty()
    }
}

pub(crate) fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?;
    (!value.is_empty()).then(|| value.to_string())
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Field errors come either as `fields: [{field, message}]` or as the
/// `errors: {field: [messages]}` map of 422 responses.
fn field_errors(value: &Value) -> Vec<FieldError> {
    if let Some(Ok(parsed)) = value
        .get("fields")
        .map(|fields| serde_json::from_value::<Vec<FieldError>>(fields.clone()))
    {
        return parsed;
    }
    let Some(errors) = value.get("errors").and_then(Value::as_object) else {
        return Vec::new();
    };
    let entry = |field: &str, message: &str| FieldError {
        field: Some(field.to_string()),
        message: message.to_string(),
    };
    errors
        .iter()
        .flat_map(|(field, messages)| match messages {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(|message| entry(field.as_str(), message))
                .collect::<Vec<_>>(),
            Value::String(message) => vec![entry(field.as_str(), message.as_str())],
            _ => Vec::new(),
        })
        .collect()
}

/// Maps a non-2xx response to [`Error::Api`].
///
/// Recognized bodies: `{"error": {code, message, fields}, "request_id"}` and
/// `{"message", "code", "errors"}`. Anything else becomes the message verbatim.
pub(crate) fn parse_api_error_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: String,
    retries: Option<RetryMetadata>,
) -> Error {
    let reason = status.canonical_reason().unwrap_or("request failed");
    let mut api = APIError::new(status.as_u16(), reason);
    api.request_id = request_id_from_headers(headers);
    api.retries = retries;

    if body.trim().is_empty() {
        return api.into();
    }

    let parsed = serde_json::from_str::<Value>(&body).ok();
    let envelope = parsed.as_ref().and_then(|value| {
        match value.get("error").filter(|err| err.is_object()) {
            Some(err) => Some((value, err)),
            None => value.get("message").and_then(Value::as_str).map(|_| (value, value)),
        }
    });

    match envelope {
        Some((root, err)) => {
            api.code = str_field(err, "code");
            if let Some(message) = str_field(err, "message") {
                api.message = message;
            }
            if let Some(request_id) = str_field(root, "request_id") {
                api.request_id = Some(request_id);
            }
            api.fields = field_errors(err);
        }
        None => api.message = body.clone(),
    }
    api.raw_body = Some(body);
    api.into()
}
