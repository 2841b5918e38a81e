//! Error types for the query engine.
//!
//! One closed enum covers every failure a query can surface. Front ends
//! match on it exhaustively instead of comparing exception classes, and
//! validation variants carry the offending value so the message can be
//! shown to the user verbatim.

use std::path::Path;

use pscan_types::Position;
use thiserror::Error;

/// Errors that can occur while loading, validating, filtering, or
/// exporting probe annotation data.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Input file does not exist.
    #[error("Unable to find file: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Access to a file was denied.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// The path that could not be accessed.
        path: String,
    },

    /// A file could not be read as CSV text.
    #[error("Unable to decode {path}: {detail}")]
    Decode {
        /// The file that failed to decode.
        path: String,
        /// What went wrong while decoding.
        detail: String,
    },

    /// Gene symbol not present in the reference table.
    #[error("Gene {gene} does not exist in the reference table")]
    UnknownGene {
        /// The normalized gene symbol that was requested.
        gene: String,
    },

    /// rsID does not match the rs-number pattern.
    #[error("Incorrect format for rsID {value}: must be in the form rs1234")]
    RsidFormat {
        /// The value that failed the format check.
        value: String,
    },

    /// rsID has no corresponding probe in the reference table.
    #[error("rsID {rsid} does not have a corresponding probe")]
    UnknownRsid {
        /// The normalized rsID that was requested.
        rsid: String,
    },

    /// Position is not a plain unsigned integer.
    #[error("Incorrect format for position {value}: must be in the form 123456789")]
    PositionFormat {
        /// The value that failed to parse.
        value: String,
    },

    /// Position has no corresponding probe in the reference table.
    #[error("Position {pos} does not have a corresponding probe")]
    UnknownPosition {
        /// The position that was requested.
        pos: Position,
    },

    /// Both freeform text and a file were supplied for one query.
    #[error("Supply either entered text or a file, not both")]
    ConflictingInput,

    /// No usable identifiers were supplied.
    #[error("No query data supplied")]
    NoInputSupplied,

    /// Output directory does not exist.
    #[error("Output file path is not valid: {path}")]
    ExportPath {
        /// The destination that could not be used.
        path: String,
    },

    /// Result table could not be written.
    #[error("Unable to write results to {path}: {source}")]
    ExportWrite {
        /// The destination that failed.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// I/O error with no more specific kind.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error with no more specific kind.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for query engine operations.
pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    /// Maps an I/O error on `path` to its typed kind.
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => QueryError::FileNotFound {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::PermissionDenied => QueryError::PermissionDenied {
                path: path.display().to_string(),
            },
            std::io::ErrorKind::InvalidData => QueryError::Decode {
                path: path.display().to_string(),
                detail: err.to_string(),
            },
            _ => QueryError::Io(err),
        }
    }

    /// Maps a CSV error on `path` to its typed kind.
    pub(crate) fn from_csv(path: &Path, err: csv::Error) -> Self {
        let detail = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => QueryError::from_io(path, io_err),
            _ => QueryError::Decode {
                path: path.display().to_string(),
                detail,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_io_error_mapping() {
        let path = PathBuf::from("missing.csv");

        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            QueryError::from_io(&path, not_found),
            QueryError::FileNotFound { .. }
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "locked");
        assert!(matches!(
            QueryError::from_io(&path, denied),
            QueryError::PermissionDenied { .. }
        ));

        let interrupted = io::Error::new(io::ErrorKind::Interrupted, "later");
        assert!(matches!(
            QueryError::from_io(&path, interrupted),
            QueryError::Io(_)
        ));
    }

    #[test]
    fn test_messages_carry_offending_value() {
        let err = QueryError::UnknownGene {
            gene: "NOTAGENE".to_string(),
        };
        assert!(err.to_string().contains("NOTAGENE"));

        let err = QueryError::RsidFormat {
            value: "snp42".to_string(),
        };
        assert!(err.to_string().contains("snp42"));
    }
}
