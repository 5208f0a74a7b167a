use std::io;
use thiserror::Error;

/// Errors produced while loading or querying a `.DAT` export.
#[derive(Error, Debug)]
pub enum DatError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed DAT file: {0}")]
    MalformedFile(String),

    #[error("invalid data row at line {line}: '{content}'")]
    DataRow { line: usize, content: String },

    #[error("trace index {index} out of range (file has {count} traces)")]
    TraceIndexOutOfRange { index: usize, count: usize },

    #[error("scan index {index} out of range (file has {count} scans)")]
    ScanIndexOutOfRange { index: usize, count: usize },

    #[error("traces {first} and {second} cannot be combined: {reason}")]
    IncompatibleTraces {
        first: usize,
        second: usize,
        reason: String,
    },

    #[cfg(feature = "dataframe")]
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, DatError>;
