//! Answer sources and render-time helpers.
//!
//! - Encyclopedia summaries from the MediaWiki action API (`wikipedia`)
//! - Scraped search-engine snippets and thumbnails (`google`)
//! - Markup extraction shared by both (`extract`)
//! - Render-time image re-fetch with a per-session cache (`images`)
//!
//! The aggregator only sees the [`traits::ReferenceLookup`] and
//! [`traits::WebSearcher`] seams, so either source can be swapped or faked.
//!
//! Note: the search-page scrape is a best-effort read of markup we do not
//! control. Selectors are deliberately generic (`span`, `img`).

pub mod extract;
pub mod google;
pub mod images;
pub mod traits;
pub mod types;
pub mod wikipedia;

pub use google::GoogleScraper;
pub use images::{FetchedImage, ImageFetcher};
pub use traits::{ReferenceLookup, WebSearcher};
pub use types::{ReferenceResult, SearchResult};
pub use wikipedia::WikipediaClient;
