use anyhow::{Context, Result};
use intellibot_chat::{Responder, Session};
use intellibot_common::IntellibotError;
use intellibot_config::IntellibotConfig;
use intellibot_http::HttpClient;
use intellibot_web::{GoogleScraper, ImageFetcher, WikipediaClient};
use std::sync::Arc;
use std::time::Duration;

/// Reject settings that would only fail on the first query.
fn validate(cfg: &IntellibotConfig) -> Result<(), IntellibotError> {
    for (key, endpoint) in [
        ("reference.endpoint", &cfg.reference.endpoint),
        ("search.endpoint", &cfg.search.endpoint),
    ] {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(IntellibotError::Config(format!(
                "{key} must be an http(s) URL, got {endpoint:?}"
            )));
        }
    }
    if cfg.reference.user_agent.trim().is_empty() {
        return Err(IntellibotError::Config("reference.user_agent must not be empty".into()));
    }
    if cfg.images.timeout_secs == 0 {
        return Err(IntellibotError::Config("images.timeout_secs must be positive".into()));
    }
    Ok(())
}

/// Build the session and the render-time image fetcher from config.
pub fn build_from_config(cfg: &IntellibotConfig) -> Result<(Session, ImageFetcher)> {
    validate(cfg)?;
    let timeout = Duration::from_secs(cfg.http.timeout_secs);

    let wiki_http = HttpClient::unanchored()
        .context("building reference HTTP client")?
        .with_timeout(timeout)
        .with_retries(cfg.http.retries);
    let reference = WikipediaClient::new(cfg.reference.endpoint.clone())
        .context("building reference client")?
        .with_http(wiki_http)
        .with_user_agent(cfg.reference.user_agent.clone())
        .with_sentences(cfg.reference.sentences)
        .with_max_options(cfg.reference.max_options);

    let search_http = HttpClient::new(&cfg.search.endpoint)
        .context("building search HTTP client")?
        .with_timeout(timeout)
        .with_retries(cfg.http.retries);
    let search = GoogleScraper::new(&cfg.search.endpoint, cfg.search.user_agent.clone())
        .context("building search client")?
        .with_http(search_http)
        .with_limits(cfg.search.max_snippets, cfg.search.max_images);

    let images = ImageFetcher::new(Duration::from_secs(cfg.images.timeout_secs), cfg.images.cache)
        .context("building image fetcher")?;

    tracing::info!(
        target: "app",
        reference = %cfg.reference.endpoint,
        search = %cfg.search.endpoint,
        image_cache = cfg.images.cache,
        "app.wired"
    );

    let responder = Responder::new(Arc::new(reference), Arc::new(search));
    Ok((Session::new(responder), images))
}
