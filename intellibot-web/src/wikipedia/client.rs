use super::types::{ApiError, Page, PageResponse, ParseResponse, SearchResponse};
use crate::extract::extract_disambiguation_options;
use crate::traits::ReferenceLookup;
use crate::types::ReferenceResult;
use async_trait::async_trait;
use intellibot_http::{HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use std::time::Instant;

pub const DEFAULT_USER_AGENT: &str =
    concat!("IntelliBot/", env!("CARGO_PKG_VERSION"), " (terminal search assistant)");

#[derive(Debug, thiserror::Error)]
enum LookupFault {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("{0}")]
    Api(String),
    #[error("{0}")]
    Extraction(#[from] intellibot_common::IntellibotError),
}

impl From<ApiError> for LookupFault {
    fn from(e: ApiError) -> Self {
        if e.info.is_empty() {
            LookupFault::Api(e.code)
        } else {
            LookupFault::Api(e.info)
        }
    }
}

/// Summary lookups against a MediaWiki action API endpoint.
///
/// The flow is search → page → (disambiguation links), one GET each.
#[derive(Clone)]
pub struct WikipediaClient {
    http: HttpClient,
    endpoint: String,
    user_agent: String,
    sentences: u32,
    max_options: usize,
}

impl WikipediaClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::unanchored()?,
            endpoint: endpoint.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sentences: 2,
            max_options: 5,
        })
    }

    /// Replace the underlying HTTP client (timeouts, retries).
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    /// Agent sent on every API call. Wikimedia answers 403 without one.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_sentences(mut self, sentences: u32) -> Self {
        self.sentences = sentences.max(1);
        self
    }

    pub fn with_max_options(mut self, max_options: usize) -> Self {
        self.max_options = max_options;
        self
    }

    fn opts<'a>(&self, params: Vec<(&'a str, Cow<'a, str>)>) -> RequestOpts<'a> {
        let mut query = vec![
            ("format", Cow::Borrowed("json")),
            ("formatversion", Cow::Borrowed("2")),
        ];
        query.extend(params);
        RequestOpts {
            query: Some(query),
            allow_absolute: true,
            ..Default::default()
        }
        .with_user_agent(&self.user_agent)
    }

    /// Best title for a free-text query: the spelling suggestion when the
    /// search offers one, else the first hit.
    async fn resolve_title(&self, query: &str) -> Result<Option<String>, LookupFault> {
        let resp: SearchResponse = self
            .http
            .get_json(
                &self.endpoint,
                self.opts(vec![
                    ("action", "query".into()),
                    ("list", "search".into()),
                    ("srsearch", query.into()),
                    ("srprop", "".into()),
                    ("srlimit", "1".into()),
                    ("srinfo", "suggestion".into()),
                ]),
            )
            .await?;
        if let Some(err) = resp.error {
            return Err(err.into());
        }
        let q = resp.query.unwrap_or_default();
        let suggestion = q
            .searchinfo
            .and_then(|i| i.suggestion)
            .filter(|s| !s.trim().is_empty());
        Ok(suggestion.or_else(|| q.search.into_iter().next().map(|hit| hit.title)))
    }

    async fn fetch_page(&self, title: &str) -> Result<Option<Page>, LookupFault> {
        let sentences = self.sentences.to_string();
        let resp: PageResponse = self
            .http
            .get_json(
                &self.endpoint,
                self.opts(vec![
                    ("action", "query".into()),
                    ("prop", "extracts|pageprops".into()),
                    ("ppprop", "disambiguation".into()),
                    ("explaintext", "1".into()),
                    ("exsentences", sentences.as_str().into()),
                    ("redirects", "1".into()),
                    ("titles", title.into()),
                ]),
            )
            .await?;
        if let Some(err) = resp.error {
            return Err(err.into());
        }
        Ok(resp.query.unwrap_or_default().pages.into_iter().next())
    }

    async fn disambiguation_options(&self, title: &str) -> Result<Vec<String>, LookupFault> {
        let resp: ParseResponse = self
            .http
            .get_json(
                &self.endpoint,
                self.opts(vec![
                    ("action", "parse".into()),
                    ("page", title.into()),
                    ("prop", "text".into()),
                    ("redirects", "1".into()),
                ]),
            )
            .await?;
        if let Some(err) = resp.error {
            return Err(err.into());
        }
        let html = resp.parse.map(|p| p.text).unwrap_or_default();
        Ok(extract_disambiguation_options(&html, self.max_options)?)
    }

    async fn try_lookup(&self, query: &str) -> Result<ReferenceResult, LookupFault> {
        let Some(title) = self.resolve_title(query).await? else {
            return Ok(ReferenceResult::NotFound);
        };

        let Some(page) = self.fetch_page(&title).await? else {
            return Ok(ReferenceResult::NotFound);
        };
        if page.missing || page.invalid {
            return Ok(ReferenceResult::NotFound);
        }

        if page.is_disambiguation() {
            let page_title = if page.title.is_empty() {
                title
            } else {
                page.title
            };
            let mut options = self.disambiguation_options(&page_title).await?;
            if options.is_empty() {
                // nothing linked on the page; offer the ambiguous title itself
                options.push(page_title);
            }
            return Ok(ReferenceResult::Disambiguation(options));
        }

        let summary = page.extract.unwrap_or_default().trim().to_string();
        Ok(ReferenceResult::Summary(summary))
    }
}

#[async_trait]
impl ReferenceLookup for WikipediaClient {
    async fn lookup(&self, query: &str) -> ReferenceResult {
        let started = Instant::now();
        tracing::info!(target: "web.wikipedia", query = %query, "reference.lookup.start");

        match self.try_lookup(query).await {
            Ok(result) => {
                let outcome = match &result {
                    ReferenceResult::Summary(_) => "summary",
                    ReferenceResult::Disambiguation(_) => "disambiguation",
                    ReferenceResult::NotFound => "not_found",
                    ReferenceResult::Error(_) => "error",
                };
                tracing::info!(
                    target: "web.wikipedia",
                    query = %query,
                    outcome,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "reference.lookup.done"
                );
                result
            }
            Err(e) => {
                tracing::warn!(
                    target: "web.wikipedia",
                    query = %query,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "reference.lookup.error"
                );
                ReferenceResult::Error(e.to_string())
            }
        }
    }
}
