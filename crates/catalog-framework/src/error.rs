//! # Framework Errors
//!
//! Common error types returned by every `TableClient`, whatever record it serves.

/// Errors that can occur within the table framework itself.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Table actor closed")]
    ActorClosed,
    #[error("Table actor dropped response channel")]
    ActorDropped,
    #[error("Record rejected: {0}")]
    Rejected(Box<dyn std::error::Error + Send + Sync>),
}
