//! Error types for dynela-io

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("snapshot window invalid: start {start} > end {end}")]
    InvalidSnapshotWindow { start: f64, end: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
