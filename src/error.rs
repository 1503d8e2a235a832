use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// User supplied text that is not a finite number.
#[derive(Error, Debug)]
#[error("Invalid sort value: {input:?} is not a number")]
pub struct ParseError {
    pub input: String,
}

/// A note file could not be read or written.
#[derive(Error, Debug)]
#[error("Store error for {}: {source}", path.display())]
pub struct StoreError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl StoreError {
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self { path: path.into(), source }
    }
}

#[derive(Error, Debug)]
pub enum SortError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No entry at position {0}")]
    OutOfRange(usize),
}

pub type Result<T> = std::result::Result<T, SortError>;
