//! GET-only HTTP client shared by the answer sources.
//!
//! Every outbound call IntelliBot makes is a GET: the MediaWiki API (JSON),
//! the search result pages (HTML) and render-time thumbnails (bytes). They
//! all go through [`HttpClient::get_bytes`] so timeouts, the retry policy and
//! logging behave the same for each.
//!
//! - No retries unless a budget is configured; when it is, 429/5xx and
//!   transport errors back off exponentially or honour `Retry-After`
//! - Secret-looking query params and auth/cookie headers never reach the logs
//! - `INTELLIBOT_HTTP_RAW=1` adds a curl line and the (capped) response body
//!   on target `http.raw`
//!
//! ```no_run
//! # async fn demo() -> Result<(), intellibot_http::HttpError> {
//! let client = intellibot_http::HttpClient::new("https://www.example.com/")?;
//! let html = client
//!     .get_text("search", intellibot_http::RequestOpts::default())
//!     .await?;
//! # let _ = html;
//! # Ok(()) }
//! ```

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

const RAW_ENV: &str = "INTELLIBOT_HTTP_RAW";
const RAW_BODY_LIMIT: usize = 64 * 1024;
const SNIPPET_CHARS: usize = 500;
const BACKOFF_BASE: Duration = Duration::from_millis(200);
const RATE_LIMIT_FLOOR: Duration = Duration::from_millis(1100);
const REDACTED: &str = "<redacted>";

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use intellibot_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
///     query: Some(vec![("q", Cow::Borrowed("rust"))]),
///     ..Default::default()
/// }
/// .with_user_agent("Mozilla/5.0");
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 5);
/// assert!(opts.headers.is_some());
/// assert!(!opts.allow_absolute);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
    /// Use `path` as-is when it parses as an absolute URL, even on an
    /// anchored client.
    pub allow_absolute: bool,
}

impl<'a> RequestOpts<'a> {
    /// Attach a `User-Agent` header. Values that are not valid header text
    /// are dropped with a warning rather than failing the request.
    pub fn with_user_agent(mut self, agent: &str) -> Self {
        match HeaderValue::from_str(agent) {
            Ok(value) => {
                self.headers
                    .get_or_insert_with(HeaderMap::new)
                    .insert(USER_AGENT, value);
            }
            Err(e) => tracing::warn!(error = %e, "http.user_agent.invalid"),
        }
        self
    }
}

/// One failed attempt and whether the retry policy may try again.
struct AttemptError {
    error: HttpError,
    retryable: bool,
    rate_limited: bool,
    retry_after: Option<Duration>,
}

impl AttemptError {
    fn transport(error: HttpError) -> Self {
        Self {
            error,
            retryable: true,
            rate_limited: false,
            retry_after: None,
        }
    }

    /// Delay before retry number `retry` (1-based).
    fn backoff(&self, retry: usize) -> Duration {
        if let Some(wait) = self.retry_after {
            return wait;
        }
        let shift = u32::try_from(retry.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        let exp = BACKOFF_BASE.saturating_mul(1u32 << shift);
        if self.rate_limited { exp.max(RATE_LIMIT_FLOOR) } else { exp }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use intellibot_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://www.example.com/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 0);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        Ok(Self {
            base: Some(base),
            ..Self::unanchored()?
        })
    }

    /// Construct a client without a base; every path must be an absolute URL.
    pub fn unanchored() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base: None,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 0,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the default retry budget (zero).
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// GET a body as text (lossy UTF-8).
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let bytes = self.get_bytes(path, opts).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.get_bytes(path, opts).await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            let snippet = snip_body(&bytes);
            tracing::warn!(
                line = e.line(),
                column = e.column(),
                error = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    /// GET a body as raw bytes, applying the retry policy.
    pub async fn get_bytes(&self, path: &str, opts: RequestOpts<'_>) -> Result<Vec<u8>, HttpError> {
        let mut url = self.resolve(path, opts.allow_absolute)?;
        if let Some(query) = &opts.query {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_ref())));
        }
        let headers = opts.headers.clone().unwrap_or_default();
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let budget = opts.retries.unwrap_or(self.max_retries);

        let mut retry = 0usize;
        loop {
            let req_id = format!("r{}", NEXT_REQUEST.fetch_add(1, Ordering::Relaxed));
            match self.attempt(&req_id, &url, &headers, timeout).await {
                Ok(body) => return Ok(body),
                Err(failed) if failed.retryable && retry < budget => {
                    retry += 1;
                    let delay = failed.backoff(retry);
                    tracing::warn!(
                        req_id = %req_id,
                        retry,
                        budget,
                        backoff_ms = delay.as_millis() as u64,
                        error = %failed.error,
                        "http.retrying"
                    );
                    sleep(delay).await;
                }
                Err(failed) => {
                    tracing::warn!(
                        req_id = %req_id,
                        host_path = %host_path(&url),
                        error = %failed.error,
                        "http.error"
                    );
                    return Err(failed.error);
                }
            }
        }
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        let parsed = match &self.base {
            Some(base) if allow_absolute => Url::parse(path).or_else(|_| base.join(path)),
            Some(base) => base.join(path),
            None => Url::parse(path),
        };
        parsed.map_err(|e| HttpError::Url(e.to_string()))
    }

    async fn attempt(
        &self,
        req_id: &str,
        url: &Url,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<Vec<u8>, AttemptError> {
        tracing::debug!(
            req_id = %req_id,
            host_path = %host_path(url),
            query = ?redacted_query(url),
            timeout_ms = timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            tracing::debug!(target: "http.raw", req_id = %req_id, curl = %curl_line(url, headers), "request");
        }

        let started = Instant::now();
        let resp = self
            .inner
            .get(url.clone())
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AttemptError::transport(HttpError::Network(e.to_string())))?;
        let status = resp.status();
        let resp_headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| AttemptError::transport(HttpError::Network(e.to_string())))?;

        let server_id = header_str(&resp_headers, "x-request-id")
            .or_else(|| header_str(&resp_headers, "x-correlation-id"))
            .unwrap_or("-")
            .to_string();
        tracing::debug!(
            req_id = %req_id,
            %status,
            duration_ms = started.elapsed().as_millis() as u64,
            body_len = body.len(),
            content_type = header_str(&resp_headers, CONTENT_TYPE.as_str()).unwrap_or("-"),
            x_request_id = %server_id,
            "http.response.headers"
        );
        if raw_enabled() {
            let shown = &body[..body.len().min(RAW_BODY_LIMIT)];
            tracing::info!(
                target: "http.raw",
                req_id = %req_id,
                %status,
                headers = ?redacted_headers(&resp_headers),
                body = %String::from_utf8_lossy(shown),
                truncated = body.len() > RAW_BODY_LIMIT,
                "response"
            );
        }

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let rate_limited = status == StatusCode::TOO_MANY_REQUESTS;
        Err(AttemptError {
            error: HttpError::Api {
                status,
                message: extract_error_message(&body),
                request_id: server_id,
            },
            retryable: rate_limited || status.is_server_error(),
            rate_limited,
            retry_after: header_str(&resp_headers, RETRY_AFTER.as_str())
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        })
    }
}

fn raw_enabled() -> bool {
    matches!(
        std::env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "access_token" | "api_key" | "auth" | "authorization" | "client_secret" | "key" | "secret"
            | "token"
    )
}

fn is_secret_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization") || name.eq_ignore_ascii_case("cookie")
}

fn host_path(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or("-"), url.path())
}

fn redacted_query(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) { REDACTED.into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect()
}

fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            let v = if is_secret_header(k.as_str()) {
                REDACTED.to_string()
            } else {
                v.to_str().unwrap_or_default().to_string()
            };
            (k.as_str().to_string(), v)
        })
        .collect()
}

/// Copy-pasteable GET for reproducing a request, secrets replaced.
fn curl_line(url: &Url, headers: &HeaderMap) -> String {
    let mut line = String::from("curl");
    for (name, value) in redacted_headers(headers) {
        line.push_str(&format!(" -H '{name}: {}'", value.replace('\'', r"'\''")));
    }
    let query = redacted_query(url)
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let target = format!("{}://{}", url.scheme(), host_path(url));
    if query.is_empty() {
        line.push_str(&format!(" '{target}'"));
    } else {
        line.push_str(&format!(" '{target}?{query}'"));
    }
    line
}

/// Human-readable reason from an error body. MediaWiki puts it under
/// `error.info`; HTML block pages fall back to a snippet.
fn extract_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|val| {
            ["/error/info", "/error/message", "/message", "/detail", "/error"]
                .iter()
                .filter_map(|ptr| val.pointer(ptr).and_then(|v| v.as_str()))
                .find(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| snip_body(body))
}

fn snip_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut chars = text.chars();
    let mut snip: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        snip.push_str("...");
    }
    snip
}
