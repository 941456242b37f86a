//! MediaWiki action API payloads (`format=json&formatversion=2`).
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// `action=query&list=search`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
    #[serde(default)]
    pub query: Option<SearchQuery>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub searchinfo: Option<SearchInfo>,
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchInfo {
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    pub title: String,
}

/// `action=query&prop=extracts|pageprops`
#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
    #[serde(default)]
    pub query: Option<PageQuery>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub pageprops: Option<PageProps>,
    #[serde(default)]
    pub extract: Option<String>,
}

impl Page {
    pub fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|p| p.disambiguation.is_some())
    }
}

#[derive(Debug, Deserialize)]
pub struct PageProps {
    /// Present (as an empty string) only on disambiguation pages.
    #[serde(default)]
    pub disambiguation: Option<serde_json::Value>,
}

/// `action=parse&prop=text`
#[derive(Debug, Deserialize)]
pub struct ParseResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
    #[serde(default)]
    pub parse: Option<ParsedPage>,
}

#[derive(Debug, Deserialize)]
pub struct ParsedPage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}
