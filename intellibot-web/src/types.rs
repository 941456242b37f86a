/// Outcome of one reference lookup. Every variant renders to exactly one
/// response segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceResult {
    Summary(String),
    /// The title matches several entries; holds at most the configured
    /// number of alternatives, in page order.
    Disambiguation(Vec<String>),
    NotFound,
    /// Service or network fault, carried as display text.
    Error(String),
}

/// Snippets and absolute image URLs scraped for one query cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub snippets: Vec<String>,
    pub image_urls: Vec<String>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty() && self.image_urls.is_empty()
    }
}
