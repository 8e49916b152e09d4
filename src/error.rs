use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed matrix: {0}")]
    MalformedMatrix(String),

    #[error("Malformed record on line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("FASTQ error: {0}")]
    Fastq(String),
}

/// Type alias for Result with PrepError
pub type Result<T> = std::result::Result<T, PrepError>;

impl PrepError {
    /// Create a new MalformedMatrix error
    pub fn malformed_matrix(message: impl Into<String>) -> Self {
        PrepError::MalformedMatrix(message.into())
    }

    /// Create a new MalformedRecord error for a 1-based line number
    pub fn malformed_record(line: usize, message: impl Into<String>) -> Self {
        PrepError::MalformedRecord {
            line,
            message: message.into(),
        }
    }
}
