//! Render-time image re-fetch.
//!
//! Transcript turns only store URLs; the shell downloads and decodes each one
//! when it draws the turn. Successful fetches are cached by URL for the life
//! of the fetcher so a redraw does not download the same thumbnail again.
//! Failures are never cached.

use image::GenericImageView;
use intellibot_common::{IntellibotError, Result};
use intellibot_http::{HttpClient, HttpError, RequestOpts};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// A downloaded image that decoded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Lower-case container name (`png`, `jpeg`, ...), when recognised.
    pub format: Option<String>,
    pub byte_len: usize,
}

pub struct ImageFetcher {
    http: HttpClient,
    cache: Option<HashMap<String, FetchedImage>>,
}

impl ImageFetcher {
    pub fn new(timeout: Duration, cache: bool) -> std::result::Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::unanchored()?.with_timeout(timeout),
            cache: cache.then(HashMap::new),
        })
    }

    /// Number of cached images.
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, HashMap::len)
    }

    pub async fn fetch(&mut self, url: &str) -> Result<FetchedImage> {
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(url)) {
            tracing::debug!(target: "web.images", url = %url, "image.fetch.cache_hit");
            return Ok(hit.clone());
        }

        let bytes = self
            .http
            .get_bytes(url, RequestOpts::default())
            .await
            .map_err(|e| {
                tracing::warn!(target: "web.images", url = %url, error = %e, "image.fetch.error");
                IntellibotError::Image(e.to_string())
            })?;

        let fetched = decode(url, &bytes).inspect_err(|e| {
            tracing::warn!(target: "web.images", url = %url, error = %e, "image.fetch.decode_error");
        })?;
        tracing::debug!(
            target: "web.images",
            url = %url,
            width = fetched.width,
            height = fetched.height,
            bytes = fetched.byte_len,
            "image.fetch.done"
        );

        if let Some(cache) = self.cache.as_mut() {
            cache.insert(url.to_string(), fetched.clone());
        }
        Ok(fetched)
    }
}

fn decode(url: &str, bytes: &[u8]) -> Result<FetchedImage> {
    if bytes.is_empty() {
        return Err(IntellibotError::Image("empty response body".into()));
    }
    let format = image::guess_format(bytes)
        .ok()
        .map(|f| format!("{f:?}").to_lowercase());
    let img = image::load_from_memory(bytes).map_err(|e| IntellibotError::Image(e.to_string()))?;
    let (width, height) = img.dimensions();
    Ok(FetchedImage {
        url: url.to_string(),
        width,
        height,
        format,
        byte_len: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bodies_are_rejected() {
        let err = decode("https://x/a.png", &[]).unwrap_err();
        assert!(matches!(err, IntellibotError::Image(_)));
    }

    #[test]
    fn html_is_not_an_image() {
        let err = decode("https://x/a.png", b"<html>nope</html>").unwrap_err();
        assert!(matches!(err, IntellibotError::Image(_)));
    }

    #[test]
    fn cache_can_be_disabled() {
        let fetcher = ImageFetcher::new(DEFAULT_IMAGE_TIMEOUT, false).unwrap();
        assert!(fetcher.cache.is_none());
        assert_eq!(fetcher.cached(), 0);
    }
}
