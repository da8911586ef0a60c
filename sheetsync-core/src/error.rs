//! Error types for sheetsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading or saving connector settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Underlying I/O failure, with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The settings file did not exist at the expected path.
    #[error("settings not found at {path}")]
    SettingsNotFound { path: PathBuf },
}

/// A coordinate string that does not describe a usable single-column range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// No `!` separating the sheet title from the cells, or an empty title.
    #[error("range '{0}' has no sheet title (expected 'Sheet!A1:A10')")]
    MissingSheet(String),

    /// A cell address lacks a row number, or the row is 0.
    #[error("range '{0}' has a cell address without a row number")]
    MissingRow(String),

    /// Column letters missing, non-alphabetic or beyond the addressable range.
    #[error("range '{0}' has an invalid column in cell address '{1}'")]
    InvalidColumn(String, String),

    /// Start and end cell name different columns.
    #[error("range '{range}' spans columns {first}..{last}; only single-column ranges are supported")]
    MultiColumn {
        range: String,
        first: String,
        last: String,
    },

    /// End row above start row.
    #[error("range '{0}' ends before it starts")]
    InvertedRows(String),

    /// An insert of zero rows was requested.
    #[error("range '{0}': refusing to compute an insert range for zero rows")]
    EmptyInsert(String),

    /// The insert range would end past row `u32::MAX`.
    #[error("range '{0}': insert range exceeds the addressable row limit")]
    RowOverflow(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SettingsError {
    SettingsError::Io {
        path: path.into(),
        source,
    }
}
