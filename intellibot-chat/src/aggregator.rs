use crate::classifier::Classifier;
use intellibot_common::IntellibotError;
use intellibot_web::{ReferenceLookup, ReferenceResult, WebSearcher};
use std::sync::Arc;

/// Ordered response segments and image URLs for one query cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotReply {
    pub segments: Vec<String>,
    pub images: Vec<String>,
}

/// The web search aborted after the reference segment was produced.
#[derive(thiserror::Error, Debug)]
#[error("web search failed: {source}")]
pub struct SearchFailure {
    /// Segments produced before the fault; never carries images.
    pub partial: BotReply,
    pub source: IntellibotError,
}

pub const NOT_FOUND: &str = "❌ No Wikipedia results found.";

/// The one segment a reference lookup contributes.
pub fn format_reference(result: &ReferenceResult) -> String {
    match result {
        ReferenceResult::Summary(text) => format!("📖 **Wikipedia**:\n\n{text}"),
        ReferenceResult::Disambiguation(options) => {
            format!("⚠️ Too broad. Did you mean: {}?", options.join(", "))
        }
        ReferenceResult::NotFound => NOT_FOUND.to_string(),
        ReferenceResult::Error(msg) => format!("⚠️ Wiki error: {msg}"),
    }
}

pub fn format_snippets(snippets: &[String]) -> String {
    format!("🔎 **Google says**:\n- {}", snippets.join("\n- "))
}

/// Runs the answer sources in precedence order.
///
/// 1. classifier on the lower-cased input; a match short-circuits
/// 2. reference lookup on the raw input, always exactly one segment
/// 3. web search on the raw input; one bulleted segment when it found
///    snippets, images collected separately
pub struct Responder {
    classifier: Classifier,
    reference: Arc<dyn ReferenceLookup>,
    search: Arc<dyn WebSearcher>,
}

impl Responder {
    pub fn new(reference: Arc<dyn ReferenceLookup>, search: Arc<dyn WebSearcher>) -> Self {
        Self {
            classifier: Classifier::default(),
            reference,
            search,
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub async fn respond(&self, input: &str) -> Result<BotReply, SearchFailure> {
        let normalized = input.to_lowercase();
        if let Some(text) = self.classifier.classify(&normalized) {
            return Ok(BotReply {
                segments: vec![text],
                images: Vec::new(),
            });
        }

        let mut reply = BotReply::default();

        let reference = self.reference.lookup(input).await;
        reply.segments.push(format_reference(&reference));

        let found = match self.search.search(input).await {
            Ok(found) => found,
            Err(source) => {
                return Err(SearchFailure {
                    partial: reply,
                    source,
                });
            }
        };
        if !found.snippets.is_empty() {
            reply.segments.push(format_snippets(&found.snippets));
        }
        reply.images = found.image_urls;
        Ok(reply)
    }
}
