use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use reqwest::{
    header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::time::sleep;
use uuid::Uuid;

use crate::{
    absence_types::AbsenceTypesClient,
    absences::AbsencesClient,
    clients::ClientsClient,
    common::{Page, Paged},
    companies::CompaniesClient,
    core::RetryState,
    delivery_receipts::DeliveryReceiptsClient,
    errors::{
        Error, Result, RetryMetadata, TransportError, TransportErrorKind, ValidationError,
    },
    http::{parse_api_error_parts, request_id_from_headers, HeaderList, RequestOptions, RetryConfig},
    invoices::InvoicesClient,
    model::Model,
    payment_methods::PaymentMethodsClient,
    product_categories::ProductCategoriesClient,
    products::ProductsClient,
    purchases::PurchasesClient,
    quotes::QuotesClient,
    telemetry::{HttpRequestMetrics, MetricsCallbacks, RequestContext, Telemetry},
    users::UsersClient,
    API_TOKEN_ENV, BASE_URL_ENV, CLIENT_HEADER, COMPANY_HEADER, COMPANY_ID_ENV, DEFAULT_BASE_URL,
    DEFAULT_CLIENT_HEADER, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, REQUEST_ID_HEADER,
};

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub base_url: Option<String>,
    /// Personal or application API token, sent as a bearer token.
    pub api_token: Option<String>,
    /// Company to act on for accounts that manage several companies.
    pub company_id: Option<u64>,
    pub client_header: Option<String>,
    pub http_client: Option<reqwest::Client>,
    /// Override the connect timeout (defaults to 5s).
    pub connect_timeout: Option<Duration>,
    /// Override the request timeout (defaults to 30s).
    pub timeout: Option<Duration>,
    /// Retry/backoff policy (defaults to 3 attempts for idempotent methods).
    pub retry: Option<RetryConfig>,
    /// Default extra headers applied to all requests.
    pub default_headers: Option<HeaderList>,
    /// Optional metrics callbacks (HTTP latency and outcome).
    pub metrics: Option<MetricsCallbacks>,
}

impl Config {
    /// Reads `BIZDESK_API_TOKEN`, `BIZDESK_BASE_URL` and `BIZDESK_COMPANY_ID`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_token = lookup(API_TOKEN_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{API_TOKEN_ENV} is not set")))?;
        let company_id = match lookup(COMPANY_ID_ENV).filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|err| {
                Error::Config(format!("{COMPANY_ID_ENV} must be a numeric id: {err}"))
            })?),
            None => None,
        };
        Ok(Self {
            base_url: lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()),
            api_token: Some(api_token),
            company_id,
            ..Default::default()
        })
    }

    pub fn with_company(mut self, company_id: u64) -> Self {
        self.company_id = Some(company_id);
        self
    }
}

/// Entry point of the SDK; cheap to clone and shareable across tasks.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    base_url: String,
    api_token: String,
    company_id: Option<u64>,
    client_header: String,
    http: reqwest::Client,
    request_timeout: Duration,
    pub(crate) retry: RetryConfig,
    default_headers: Option<HeaderList>,
    telemetry: Telemetry,
}

/// Request payload prepared before the retry loop so every attempt can clone it.
pub(crate) enum Body {
    Empty,
    Json(Vec<u8>),
    Text {
        content_type: &'static str,
        content: String,
    },
}

impl Body {
    pub(crate) fn json<B: Serialize + ?Sized>(value: &B) -> Result<Self> {
        Ok(Body::Json(serde_json::to_vec(value)?))
    }

    fn apply(self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Body::Empty => builder,
            Body::Json(bytes) => builder.header(CONTENT_TYPE, "application/json").body(bytes),
            Body::Text {
                content_type,
                content,
            } => builder.header(CONTENT_TYPE, content_type).body(content),
        }
    }
}

/// Placeholder for calls without query parameters.
pub(crate) const NO_QUERY: Option<&()> = None;

const JSON: &str = "application/json";

impl Client {
    pub fn new(cfg: Config) -> Result<Self> {
        let base = cfg
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        reqwest::Url::parse(&base)
            .map_err(|err| Error::Config(format!("invalid base url: {err}")))?;

        let api_token = cfg
            .api_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Config("api token is required".to_string()))?;

        let connect_timeout = cfg.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let request_timeout = cfg.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let retry = cfg.retry.unwrap_or_default();

        let http = match cfg.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .build()
                .map_err(|err| TransportError {
                    kind: TransportErrorKind::Connect,
                    message: "failed to build http client".to_string(),
                    source: Some(err),
                    retries: None,
                })?,
        };

        let client_header = cfg
            .client_header
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_HEADER.to_string());

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url: base,
                api_token,
                company_id: cfg.company_id,
                client_header,
                http,
                request_timeout,
                retry,
                default_headers: cfg.default_headers,
                telemetry: Telemetry::new(cfg.metrics),
            }),
        })
    }

    /// Builds a client from `BIZDESK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn absences(&self) -> AbsencesClient {
        AbsencesClient::new(self.inner.clone())
    }

    pub fn absence_types(&self) -> AbsenceTypesClient {
        AbsenceTypesClient::new(self.inner.clone())
    }

    pub fn clients(&self) -> ClientsClient {
        ClientsClient::new(self.inner.clone())
    }

    pub fn companies(&self) -> CompaniesClient {
        CompaniesClient::new(self.inner.clone())
    }

    pub fn users(&self) -> UsersClient {
        UsersClient::new(self.inner.clone())
    }

    pub fn products(&self) -> ProductsClient {
        ProductsClient::new(self.inner.clone())
    }

    pub fn product_categories(&self) -> ProductCategoriesClient {
        ProductCategoriesClient::new(self.inner.clone())
    }

    pub fn invoices(&self) -> InvoicesClient {
        InvoicesClient::new(self.inner.clone())
    }

    pub fn quotes(&self) -> QuotesClient {
        QuotesClient::new(self.inner.clone())
    }

    pub fn purchases(&self) -> PurchasesClient {
        PurchasesClient::new(self.inner.clone())
    }

    pub fn delivery_receipts(&self) -> DeliveryReceiptsClient {
        DeliveryReceiptsClient::new(self.inner.clone())
    }

    pub fn payment_methods(&self) -> PaymentMethodsClient {
        PaymentMethodsClient::new(self.inner.clone())
    }
}

fn apply_header_list(
    mut builder: reqwest::RequestBuilder,
    headers: &HeaderList,
) -> Result<reqwest::RequestBuilder> {
    for entry in headers.iter() {
        if !entry.is_valid() {
            continue;
        }
        let name = HeaderName::from_bytes(entry.key.trim().as_bytes())
            .map_err(|err| Error::Config(format!("invalid header name: {err}")))?;
        let val = HeaderValue::from_str(entry.value.trim())
            .map_err(|err| Error::Config(format!("invalid header value: {err}")))?;
        builder = builder.header(name, val);
    }
    Ok(builder)
}

impl ClientInner {
    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };
        let url = reqwest::Url::parse(&raw)
            .map_err(|err| Error::Config(format!("invalid path: {err}")))?;
        Ok(self.http.request(method, url))
    }

    fn with_headers(
        &self,
        mut builder: reqwest::RequestBuilder,
        request_id: &str,
        headers: &HeaderList,
        accept: &str,
    ) -> Result<reqwest::RequestBuilder> {
        builder = builder
            .header(ACCEPT, accept)
            .header(REQUEST_ID_HEADER, request_id)
            .header(CLIENT_HEADER, self.client_header.as_str());
        if let Some(company_id) = self.company_id {
            builder = builder.header(COMPANY_HEADER, company_id.to_string());
        }
        builder = self.apply_auth(builder);

        if let Some(defaults) = &self.default_headers {
            builder = apply_header_list(builder, defaults)?;
        }
        builder = apply_header_list(builder, headers)?;

        Ok(builder)
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.api_token.as_str();
        let bearer = token
            .strip_prefix("Bearer ")
            .or_else(|| token.strip_prefix("bearer "))
            .unwrap_or(token);
        builder.bearer_auth(bearer)
    }

    fn make_context(&self, method: &Method, path: &str, request_id: &str) -> RequestContext {
        RequestContext::new(method.as_str(), path).with_request_id(Some(request_id.to_string()))
    }

    /// Sends one logical call (with retries) and returns the successful response.
    pub(crate) async fn execute<Q: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Body,
        accept: &str,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        let request_id = options
            .request_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut builder = self.request(method.clone(), path)?;
        if let Some(query) = query {
            builder = builder.query(query);
        }
        builder = body.apply(builder);
        builder = self.with_headers(builder, &request_id, &options.headers, accept)?;
        builder = builder.timeout(options.timeout.unwrap_or(self.request_timeout));

        let retry = options.retry.clone().unwrap_or_else(|| self.retry.clone());
        let ctx = self.make_context(&method, path, &request_id);
        self.send_with_retry(builder, method, retry, ctx).await
    }

    async fn read_bytes(&self, resp: reqwest::Response) -> Result<Vec<u8>> {
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| transport_error(err, None))?;
        Ok(bytes.to_vec())
    }

    pub(crate) async fn execute_json<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Body,
        options: &RequestOptions,
    ) -> Result<T> {
        let resp = self.execute(method, path, query, body, JSON, options).await?;
        let bytes = self.read_bytes(resp).await?;
        serde_json::from_slice::<T>(&bytes).map_err(Error::Serialization)
    }

    /// Like [`execute_json`](Self::execute_json), decoding through [`Model`] so
    /// required fields and enum values are checked.
    pub(crate) async fn execute_model<M: Model, Q: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Body,
        options: &RequestOptions,
    ) -> Result<M> {
        let resp = self.execute(method, path, query, body, JSON, options).await?;
        let bytes = self.read_bytes(resp).await?;
        M::from_slice(&bytes)
    }

    pub(crate) async fn execute_page<M: Model, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
        options: &RequestOptions,
    ) -> Result<Page<M>> {
        let page: Page<Value> = self
            .execute_json(Method::GET, path, query, Body::Empty, options)
            .await?;
        let data = page
            .data
            .into_iter()
            .map(M::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            data,
            meta: page.meta,
        })
    }

    /// Follows `meta.last_page` and concatenates every page. Each answer must
    /// move past the page before it, and a page announcing more must not be empty.
    pub(crate) async fn collect_pages<M: Model, P: Paged>(
        &self,
        path: &str,
        mut params: P,
        options: &RequestOptions,
    ) -> Result<Vec<M>> {
        params.validate_filters()?;
        let mut items = Vec::new();
        let mut previous: Option<u32> = None;
        loop {
            let page: Page<M> = self.execute_page(path, Some(&params), options).await?;
            let current = page.meta.current_page;
            if previous.is_some_and(|seen| current <= seen) {
                return Err(ValidationError::new(format!(
                    "{path} did not advance past page {current}"
                ))
                .into());
            }
            let next = page.next_page();
            if next.is_some() && page.is_empty() {
                return Err(ValidationError::new(format!(
                    "{path} returned an empty page {current} of {}",
                    page.meta.last_page
                ))
                .into());
            }
            items.extend(page.data);
            match next {
                Some(page_number) => params.list_params_mut().page = Some(page_number),
                None => break,
            }
            previous = Some(current);
        }
        Ok(items)
    }

    pub(crate) async fn execute_empty(
        &self,
        method: Method,
        path: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<()> {
        self.execute(method, path, NO_QUERY, body, JSON, options)
            .await
            .map(|_| ())
    }

    pub(crate) async fn execute_bytes(
        &self,
        path: &str,
        accept: &str,
        options: &RequestOptions,
    ) -> Result<Vec<u8>> {
        let resp = self
            .execute(Method::GET, path, NO_QUERY, Body::Empty, accept, options)
            .await?;
        self.read_bytes(resp).await
    }

    async fn send_with_retry(
        &self,
        builder: reqwest::RequestBuilder,
        method: Method,
        retry: RetryConfig,
        ctx: RequestContext,
    ) -> Result<reqwest::Response> {
        let max_attempts = retry.max_attempts.max(1);
        let mut state = RetryState::new();
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = self.send_once(&builder, &ctx, attempt, max_attempts).await?;
            let replay = match &outcome {
                Ok(resp) if resp.status().is_success() => false,
                Ok(resp) => {
                    state.record_attempt(attempt);
                    state.record_status(resp.status());
                    retry.should_retry_status(&method, resp.status())
                }
                Err(err) => {
                    state.record_attempt(attempt);
                    state.record_error(err);
                    retry.should_retry_error(&method, err)
                }
            };
            if replay && attempt < max_attempts {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %ctx.path, attempt, "retrying");
                sleep(retry.backoff_delay(attempt)).await;
                continue;
            }
            return self.finish(outcome, &ctx, start, state.metadata()).await;
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    async fn send_once(
        &self,
        builder: &reqwest::RequestBuilder,
        ctx: &RequestContext,
        attempt: u32,
        max_attempts: u32,
    ) -> Result<std::result::Result<reqwest::Response, reqwest::Error>> {
        // Text and JSON bodies are buffered, so this only fails for streams.
        let request = builder
            .try_clone()
            .ok_or_else(|| Error::Config("request body cannot be replayed".into()))?;

        let sending = request.send();
        #[cfg(feature = "tracing")]
        let sending = {
            use tracing::Instrument;
            sending.instrument(tracing::debug_span!(
                "bizdesk.http",
                method = %ctx.method,
                path = %ctx.path,
                request_id = ctx.request_id.as_deref().unwrap_or_default(),
                attempt,
                max_attempts
            ))
        };
        Ok(sending.await)
    }

    /// Turns the last attempt into the call's result and reports it.
    async fn finish(
        &self,
        outcome: std::result::Result<reqwest::Response, reqwest::Error>,
        ctx: &RequestContext,
        start: Instant,
        retries: Option<RetryMetadata>,
    ) -> Result<reqwest::Response> {
        let resp = match outcome {
            Ok(resp) => resp,
            Err(err) => {
                self.observe(ctx.clone(), start, None, Some(err.to_string()), retries.clone());
                #[cfg(feature = "tracing")]
                tracing::warn!(path = %ctx.path, error = %err, "transport error");
                return Err(transport_error(err, retries));
            }
        };

        let status = resp.status();
        if status.is_success() {
            self.observe(ctx.clone(), start, Some(status), None, retries);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                method = %ctx.method,
                path = %ctx.path,
                status = status.as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "request completed"
            );
            return Ok(resp);
        }

        let headers = resp.headers().clone();
        let mut observed = ctx.clone();
        if let Some(server_id) = request_id_from_headers(&headers) {
            observed.request_id = Some(server_id);
        }
        self.observe(
            observed,
            start,
            Some(status),
            Some(format!("http {}", status.as_u16())),
            retries.clone(),
        );
        #[cfg(feature = "tracing")]
        tracing::warn!(
            method = %ctx.method,
            path = %ctx.path,
            status = status.as_u16(),
            "request failed"
        );

        let body = resp.text().await.unwrap_or_default();
        let mut err = parse_api_error_parts(status, &headers, body, retries);
        if let Error::Api(api) = &mut err {
            if api.request_id.is_none() {
                api.request_id = ctx.request_id.clone();
            }
        }
        Err(err)
    }

    fn observe(
        &self,
        context: RequestContext,
        start: Instant,
        status: Option<StatusCode>,
        error: Option<String>,
        retries: Option<RetryMetadata>,
    ) {
        if !self.telemetry.http_enabled() {
            return;
        }
        self.telemetry.record_http(HttpRequestMetrics {
            latency: start.elapsed(),
            status: status.map(|s| s.as_u16()),
            error,
            retries,
            context,
        });
    }
}

fn transport_error(err: reqwest::Error, retries: Option<RetryMetadata>) -> Error {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_request() {
        TransportErrorKind::Request
    } else {
        TransportErrorKind::Other
    };
    Error::Transport(TransportError {
        kind,
        message: err.to_string(),
        source: Some(err),
        retries,
    })
}
