use async_trait::async_trait;
use intellibot_chat::{Responder, Session};
use intellibot_common::Result;
use intellibot_web::{ReferenceLookup, ReferenceResult, SearchResult, WebSearcher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct FakeReference {
    result: ReferenceResult,
    seen: Mutex<Vec<String>>,
}

impl FakeReference {
    pub fn new(result: ReferenceResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            seen: Mutex::new(Vec::new()),
        })
    }

    #[allow(dead_code)]
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReferenceLookup for FakeReference {
    async fn lookup(&self, query: &str) -> ReferenceResult {
        self.seen.lock().unwrap().push(query.to_string());
        self.result.clone()
    }
}

pub struct FakeSearch {
    result: Result<SearchResult>,
    calls: AtomicUsize,
}

impl FakeSearch {
    pub fn new(result: Result<SearchResult>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    #[allow(dead_code)]
    pub fn found(snippets: &[&str], images: &[&str]) -> Arc<Self> {
        Self::new(Ok(SearchResult {
            snippets: snippets.iter().map(|s| s.to_string()).collect(),
            image_urls: images.iter().map(|s| s.to_string()).collect(),
        }))
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearcher for FakeSearch {
    async fn search(&self, _query: &str) -> Result<SearchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[allow(dead_code)]
pub fn session_with(reference: &Arc<FakeReference>, search: &Arc<FakeSearch>) -> Session {
    Session::new(Responder::new(reference.clone(), search.clone()))
}
