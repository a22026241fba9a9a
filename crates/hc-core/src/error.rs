//! Unified error type for the clip pipeline.
//!
//! All crates funnel their fatal failures into [`Error`]. Recoverable
//! anomalies (malformed tags, missing coverage, short sources) are not errors;
//! they travel as [`Notice`](crate::Notice) values instead.

use std::fmt;
use std::time::Duration;

use crate::media::ClipKind;

/// Unified error type covering all fatal failure modes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A playlist or segment could not be retrieved.
    #[error("Fetch error [{locator}]: {message}")]
    Fetch {
        /// The URL or path that was requested.
        locator: String,
        /// Human-readable error description.
        message: String,
    },

    /// A network fetch or the external trimmer exceeded its time budget.
    #[error("Timed out after {after:?}: {operation}")]
    Timeout {
        /// What was being waited on.
        operation: String,
        /// The budget that was exceeded.
        after: Duration,
    },

    /// The playlist produced zero segments, so no window can be selected.
    #[error("Timeline is empty: no segments were parsed from the playlist")]
    EmptyTimeline,

    /// The external trim-and-encode step failed.
    #[error("Trim error: {message}")]
    Trim {
        /// Human-readable error description (usually includes stderr).
        message: String,
    },

    /// An external tool could not be located or started.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// A playlist or segment locator could not be parsed or resolved.
    #[error("Invalid locator '{locator}': {message}")]
    InvalidLocator {
        /// The offending input.
        locator: String,
        /// Why it was rejected.
        message: String,
    },

    /// Configuration or request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A clip operation failed; names the operation and window it was
    /// working on.
    #[error("{kind} clip for window {window} failed: {source}")]
    Clip {
        /// Which of the two clips failed.
        kind: ClipKind,
        /// Rendered target window.
        window: String,
        /// The underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to a process exit code so scripts can distinguish
    /// failure kinds.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Fetch { .. } => 3,
            Error::EmptyTimeline => 4,
            Error::Trim { .. } => 5,
            Error::Timeout { .. } => 6,
            Error::Clip { source, .. } => source.exit_code(),
            _ => 1,
        }
    }

    /// Convenience constructor for [`Error::Fetch`].
    pub fn fetch(locator: impl fmt::Display, message: impl Into<String>) -> Self {
        Error::Fetch {
            locator: locator.to_string(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Timeout`].
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Convenience constructor for [`Error::Trim`].
    pub fn trim(message: impl Into<String>) -> Self {
        Error::Trim {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::InvalidLocator`].
    pub fn invalid_locator(locator: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::InvalidLocator {
            locator: locator.into(),
            message: message.to_string(),
        }
    }

    /// Wrap this error with the clip operation and window it belongs to.
    pub fn in_clip(self, kind: ClipKind, window: impl fmt::Display) -> Self {
        Error::Clip {
            kind,
            window: window.to_string(),
            source: Box::new(self),
        }
    }

    /// Whether this error (or the cause it wraps) is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Clip { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
