use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown cell code {code:?} at ({x}, {y})")]
    UnknownCode { code: char, x: usize, y: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
    #[error("invalid value for {key}: {value:?}")]
    InvalidOverride { key: String, value: String },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
}
