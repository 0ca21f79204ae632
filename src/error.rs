//! Error types for thesis conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a conversion run.
///
/// Every variant is fatal: segmentation either finds all of its markers or
/// the run stops before any output file is touched.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find boundary for {marker}")]
    BoundaryNotFound { marker: String },

    #[error("Missing appendix headings: {}", .0.join(", "))]
    MissingAppendices(Vec<String>),

    #[error("Expected chapter set 1..13, detected {0:?}")]
    ChapterSetMismatch(Vec<u32>),

    #[error("Boundary for {second} (block {second_index}) does not follow {first} (block {first_index})")]
    BoundaryOrder {
        first: String,
        first_index: usize,
        second: String,
        second_index: usize,
    },
}

impl Error {
    pub(crate) fn not_found(marker: impl Into<String>) -> Self {
        Error::BoundaryNotFound {
            marker: marker.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
