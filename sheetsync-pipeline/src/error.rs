//! Error types for sheetsync-pipeline.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use sheetsync_core::{RangeError, SettingsError};

/// Failure reported by a [`SheetsClient`](crate::client::SheetsClient) call.
///
/// Carries every error message the service returned plus an optional raw
/// detail payload for diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", .messages.join("; "))]
pub struct ServiceError {
    pub messages: Vec<String>,
    pub details: Option<Value>,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// All errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The channel identifier is not one of the registered channels.
    #[error("Channel '{channel}' is not registered. Allowed channels are {allowed}.")]
    UnknownChannel { channel: String, allowed: String },

    /// A raw message could not be decoded into the channel's message type.
    #[error("message #{index} is not a valid update message: {source}")]
    InvalidMessage {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A coordinate string failed to parse or the arithmetic precondition failed.
    #[error("range error: {0}")]
    Range(#[from] RangeError),

    /// An external service call failed; the run stops here.
    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: ServiceError,
    },

    /// The spreadsheet has no sheet with the title the range points at.
    #[error("spreadsheet has no sheet titled '{title}'")]
    SheetNotFound { title: String },

    /// An error from the settings layer.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (local workbook).
    #[error("workbook JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`PipelineError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`PipelineError::Service`].
pub(crate) fn service_err(operation: &'static str, source: ServiceError) -> PipelineError {
    PipelineError::Service { operation, source }
}
