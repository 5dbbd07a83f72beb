//! Custom error types for fits-metrics.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the fits-metrics library.
#[derive(Error, Debug)]
pub enum Error {
    /// Ground truth and prediction arrays differ in shape.
    #[error("image dimensions do not match: ground truth {expected}, prediction {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// A metric was requested over arrays with no samples.
    #[error("cannot compute metrics over an empty array")]
    EmptyArray,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The bytes are not a readable FITS primary HDU.
    #[error("malformed FITS data: {reason}")]
    FitsFormat { reason: String },

    /// The primary HDU carries no data array (NAXIS = 0).
    #[error("FITS primary HDU contains no data array")]
    FitsNoData,

    /// Failed to read a FITS file from disk.
    #[error("failed to read FITS file {path}: {source}")]
    FitsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference image could not be loaded.
    #[error("error reading ground truth file {path}: {source}")]
    GroundTruth {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// An upload arrived without a file name.
    #[error("no file selected, please select a FITS file to upload")]
    NoFileSelected,

    /// The upload's extension is not on the allow list.
    #[error("invalid file type {filename:?}, please upload a .fits file")]
    InvalidFileType { filename: String },

    /// The upload's name has no usable characters once sanitized.
    #[error("invalid file name {filename:?}")]
    InvalidFilename { filename: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::ShapeMismatch`] from two array shapes.
    #[must_use]
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}

/// Result type alias for fits-metrics operations.
pub type Result<T> = std::result::Result<T, Error>;
