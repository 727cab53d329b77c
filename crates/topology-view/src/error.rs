//! Error types for the topology view
//!
//! Persistence and session errors are returned, never thrown past the widget,
//! so the host can show them without losing the current view.

use thiserror::Error;

/// Errors from saved-view storage
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("No site selected - saved views are scoped to a site")]
    NoSiteSelected,

    #[error("Saved view not found: {0}")]
    SnapshotNotFound(String),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Stored views are corrupt: {0}")]
    Corrupt(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors surfaced by [`crate::session::ViewSession`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("Topology data unavailable: {0}")]
    DataUnavailable(String),

    #[error("No site selected")]
    NoSiteSelected,

    /// Switching layout would discard manual placements; re-issue with confirmation
    #[error("Changing layout discards {manual_count} manually placed device(s)")]
    DestructiveLayoutChange { manual_count: usize },

    /// Deleting a saved view needs explicit confirmation
    #[error("Confirmation required to delete saved view: {0}")]
    ConfirmationRequired(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    /// Errors that the host should resolve with a confirm dialog
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            SessionError::DestructiveLayoutChange { .. } | SessionError::ConfirmationRequired(_)
        )
    }
}
