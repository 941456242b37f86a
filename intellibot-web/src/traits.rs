use crate::types::{ReferenceResult, SearchResult};
use async_trait::async_trait;
use intellibot_common::Result;

#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Look up a short summary for the raw (case-preserved) query.
    ///
    /// Never fails: service faults come back as [`ReferenceResult::Error`].
    async fn lookup(&self, query: &str) -> ReferenceResult;
}

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Fetch text and image results for the query.
    ///
    /// Any fetch or parse fault aborts the whole contribution.
    async fn search(&self, query: &str) -> Result<SearchResult>;
}
