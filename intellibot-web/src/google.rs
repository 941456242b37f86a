use crate::extract::{extract_image_urls, extract_snippets};
use crate::traits::WebSearcher;
use crate::types::SearchResult;
use async_trait::async_trait;
use intellibot_common::{IntellibotError, Result};
use intellibot_http::{HttpClient, HttpError, RequestOpts};
use std::borrow::Cow;
use std::time::Instant;

const SEARCH_PATH: &str = "search";

/// Screen-scrapes a search engine's HTML result pages.
///
/// Two GETs per query: the generic results page (snippets) and the
/// image-mode page (`tbm=isch`, thumbnails). A browser-like `User-Agent`
/// is sent on both.
#[derive(Clone)]
pub struct GoogleScraper {
    http: HttpClient,
    user_agent: String,
    max_snippets: usize,
    max_images: usize,
}

impl GoogleScraper {
    pub fn new(endpoint: &str, user_agent: impl Into<String>) -> std::result::Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(endpoint)?,
            user_agent: user_agent.into(),
            max_snippets: 3,
            max_images: 3,
        })
    }

    /// Replace the underlying HTTP client (timeouts, retries). Its base URL
    /// becomes the search endpoint.
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    pub fn with_limits(mut self, max_snippets: usize, max_images: usize) -> Self {
        self.max_snippets = max_snippets;
        self.max_images = max_images;
        self
    }

    async fn fetch_page(&self, query: &str, images: bool) -> Result<String> {
        let mut params = vec![("q", Cow::Borrowed(query))];
        if images {
            params.push(("tbm", Cow::Borrowed("isch")));
        }
        let opts = RequestOpts {
            query: Some(params),
            ..Default::default()
        }
        .with_user_agent(&self.user_agent);

        self.http
            .get_text(SEARCH_PATH, opts)
            .await
            .map_err(|e| IntellibotError::Http(e.to_string()))
    }
}

#[async_trait]
impl WebSearcher for GoogleScraper {
    async fn search(&self, query: &str) -> Result<SearchResult> {
        let started = Instant::now();

        let text_page = self.fetch_page(query, false).await.inspect_err(|e| {
            tracing::warn!(target: "web.google", query = %query, error = %e, "search.text.error");
        })?;
        let snippets = extract_snippets(&text_page, self.max_snippets)?;
        tracing::debug!(
            target: "web.google",
            query = %query,
            page_len = text_page.len(),
            snippet_count = snippets.len(),
            "search.text.done"
        );

        let image_page = self.fetch_page(query, true).await.inspect_err(|e| {
            tracing::warn!(target: "web.google", query = %query, error = %e, "search.images.error");
        })?;
        let image_urls = extract_image_urls(&image_page, self.max_images)?;
        tracing::debug!(
            target: "web.google",
            query = %query,
            page_len = image_page.len(),
            image_count = image_urls.len(),
            "search.images.done"
        );

        let result = SearchResult {
            snippets,
            image_urls,
        };
        if result.is_empty() {
            // A 2xx page with nothing we recognise, e.g. a consent or CAPTCHA interstitial.
            tracing::warn!(
                target: "web.google",
                query = %query,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "search.empty"
            );
        } else {
            tracing::info!(
                target: "web.google",
                query = %query,
                snippets = result.snippets.len(),
                images = result.image_urls.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "search.done"
            );
        }
        Ok(result)
    }
}
