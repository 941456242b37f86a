//! Markup extraction for scraped pages.
//!
//! These are plain functions over an HTML string so they can be exercised
//! without a network. `scraper::Html` is not `Send`; keep every parse inside
//! a synchronous call and hand back owned strings.

use intellibot_common::{IntellibotError, Result};
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| IntellibotError::Extraction(format!("bad selector {css:?}: {e:?}")))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Visible text of inline `<span>` elements, in document order.
///
/// Blank spans are skipped; duplicates are kept. At most `limit` entries.
pub fn extract_snippets(html: &str, limit: usize) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let spans = selector("span")?;
    Ok(document
        .select(&spans)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .take(limit)
        .collect())
}

/// `src` of every `<img>` that is already an absolute http(s) URL.
///
/// Relative paths and inline `data:` thumbnails are dropped. At most `limit`.
pub fn extract_image_urls(html: &str, limit: usize) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let imgs = selector("img[src]")?;
    Ok(document
        .select(&imgs)
        .filter_map(|el| el.value().attr("src"))
        .filter(|src| src.starts_with("http"))
        .take(limit)
        .map(str::to_string)
        .collect())
}

/// Alternatives listed on a rendered disambiguation page.
///
/// Each list item contributes the text of its first link; table-of-contents
/// entries are ignored.
pub fn extract_disambiguation_options(html: &str, limit: usize) -> Result<Vec<String>> {
    let document = Html::parse_fragment(html);
    let items = selector("li")?;
    let links = selector("a")?;
    Ok(document
        .select(&items)
        .filter(|li| !li.value().classes().any(|c| c.contains("tocsection")))
        .filter_map(|li| li.select(&links).next())
        .map(|a| element_text(&a))
        .filter(|text| !text.is_empty())
        .take(limit)
        .collect())
}
