//! Error types and result types for query building and execution.
//!
//! This module provides the error taxonomy shared by every builder and by the
//! driver layer. Use [`MongaResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Represents all possible errors raised while building or executing a query.
///
/// Argument errors are programmer errors surfaced synchronously by the builders.
/// Backend errors come from the database driver and are only produced by the
/// driver layer.
#[derive(Error, Debug)]
pub enum MongaError {
    /// A builder was handed malformed input: a non-document clause or options
    /// document, an unknown type name, an unparsable identifier or regex.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Serialization/deserialization error when converting to or from BSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during client initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// An error occurred in the underlying database driver.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for query building and execution.
pub type MongaResult<T> = Result<T, MongaError>;

impl MongaError {
    /// Returns `true` for errors caused by malformed builder input.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, MongaError::InvalidArgument(_))
    }
}

impl From<BsonError> for MongaError {
    fn from(err: BsonError) -> Self {
        MongaError::Serialization(err.to_string())
    }
}
