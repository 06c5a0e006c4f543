//! # Status List Errors

use thiserror::Error;

/// Errors raised while building or reading a status sequence.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A credential's index does not fit in the status list.
    #[error("status index {index} is outside a status list of length {length}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The configured status list length.
        length: usize,
    },

    /// A `statusListIndex` value is not a non-negative integer.
    #[error("invalid status list index: {0}")]
    InvalidIndex(String),

    /// The encoded list is not valid base64url or gzip data.
    #[error("invalid encoded status list: {0}")]
    Encoding(String),
}
