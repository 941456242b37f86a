//! Query dispatch and conversation state.
//!
//! A [`Session`] owns a [`Responder`] (classifier, reference lookup, web
//! search in that order) and the append-only [`Transcript`] it produces.

pub mod aggregator;
pub mod classifier;
pub mod session;
pub mod transcript;

pub use aggregator::{BotReply, Responder, SearchFailure};
pub use classifier::{Classifier, Predicate, Rule};
pub use session::{IMAGES_MARKER, Session};
pub use transcript::{Role, Transcript, Turn};
