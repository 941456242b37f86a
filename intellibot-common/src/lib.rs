//! Common types and utilities shared across IntelliBot crates.
//!
//! This crate holds the shared error type and the observability helpers used
//! by every other crate in the workspace. It stays dependency-light so that
//! the leaf crates (`intellibot-web`, `intellibot-chat`) can depend on it
//! without pulling in the HTTP or configuration stacks.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`IntellibotError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use intellibot_common::IntellibotError;
//!
//! let err = IntellibotError::HistoryIndex(4);
//! assert_eq!(err.to_string(), "No prior query at history index 4");
//! ```

pub mod observability;

/// Error types used across the IntelliBot system.
///
/// Reference lookups never surface these: their faults are folded into a
/// display segment before reaching the aggregator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IntellibotError {
    /// An outbound request failed (network, status, decode).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Markup could not be turned into results.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A render-time image could not be fetched or decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A replay was requested for a user turn that does not exist.
    #[error("No prior query at history index {0}")]
    HistoryIndex(usize),
}

/// Convenient alias for results that use [`IntellibotError`].
pub type Result<T> = std::result::Result<T, IntellibotError>;
