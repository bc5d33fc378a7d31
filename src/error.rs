// src/error.rs

use std::{io, path::PathBuf};
use thiserror::Error;

/// Result alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Everything that can abort a pipeline run.
///
/// Malformed cell values are deliberately absent: they are recovered in place
/// with the numeric sentinel and never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The local data folder could not be created.
    #[error("cannot create data folder {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading or writing a storage key failed.
    #[error("storage I/O on `{key}`: {source}")]
    Storage {
        key: String,
        #[source]
        source: io::Error,
    },

    /// A network request failed or returned a non-success status.
    #[error("GET {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// A required archive is missing locally and not offered by the listing.
    #[error("archive {archive} is not linked from {url}")]
    ArchiveNotListed { archive: String, url: String },

    /// An archive or one of its entries is missing or unreadable.
    #[error("archive {archive}: {reason}")]
    Archive { archive: String, reason: String },

    /// An on-disk cache file could not be decoded or does not match the schema.
    #[error("cache file `{key}` is unusable: {reason}")]
    CacheCorruption { key: String, reason: String },

    #[error("dataset for region `{region}` does not fit the schema: {reason}")]
    SchemaMismatch { region: String, reason: String },

    #[error("unknown region code `{0}`")]
    UnknownRegion(String),

    #[error("region `{0}` requested more than once")]
    DuplicateRegion(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl PipelineError {
    pub(crate) fn storage(key: impl Into<String>, source: io::Error) -> Self {
        PipelineError::Storage {
            key: key.into(),
            source,
        }
    }

    pub(crate) fn archive(archive: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::Archive {
            archive: archive.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
