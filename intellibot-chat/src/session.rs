use crate::aggregator::{BotReply, Responder, SearchFailure};
use crate::transcript::Transcript;
use intellibot_common::{IntellibotError, Result};
use std::time::Instant;

pub const IMAGES_MARKER: &str = "🖼️ Images:";

/// Everything one conversation owns: the responder, the transcript and the
/// replay slot the shell fills when a prior query is re-invoked.
pub struct Session {
    responder: Responder,
    transcript: Transcript,
    selected_query: Option<String>,
}

impl Session {
    pub fn new(responder: Responder) -> Self {
        Self {
            responder,
            transcript: Transcript::default(),
            selected_query: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn selected_query(&self) -> Option<&str> {
        self.selected_query.as_deref()
    }

    /// Put the `index`-th prior user query (0-based, oldest first) in the
    /// replay slot.
    pub fn select_query(&mut self, index: usize) -> Result<()> {
        let query = self
            .transcript
            .user_queries()
            .get(index)
            .map(|q| q.to_string())
            .ok_or(IntellibotError::HistoryIndex(index))?;
        self.selected_query = Some(query);
        Ok(())
    }

    /// The next query to process. A pending replay wins over typed text and
    /// is consumed; blank typed text yields nothing.
    pub fn next_input(&mut self, typed: Option<&str>) -> Option<String> {
        if let Some(replay) = self.selected_query.take() {
            return Some(replay);
        }
        typed
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Run one query cycle and record it.
    ///
    /// On a search failure the partial reply is still recorded before the
    /// error is returned.
    pub async fn submit(&mut self, input: &str) -> std::result::Result<BotReply, SearchFailure> {
        let started = Instant::now();
        self.transcript.push_user(input);

        match self.responder.respond(input).await {
            Ok(reply) => {
                self.record(&reply);
                tracing::info!(
                    target: "chat.session",
                    segments = reply.segments.len(),
                    images = reply.images.len(),
                    turns = self.transcript.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "session.submit.done"
                );
                Ok(reply)
            }
            Err(failure) => {
                self.record(&failure.partial);
                tracing::warn!(
                    target: "chat.session",
                    error = %failure.source,
                    segments = failure.partial.segments.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "session.submit.search_failed"
                );
                Err(failure)
            }
        }
    }

    fn record(&mut self, reply: &BotReply) {
        for segment in &reply.segments {
            self.transcript.push_bot(segment.as_str());
        }
        if !reply.images.is_empty() {
            self.transcript.push_images(IMAGES_MARKER, reply.images.clone());
        }
    }
}
