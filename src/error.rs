// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CaliperError {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("metric store error: {0}")]
    Store(#[from] StoreError),

    #[error("{pass} pass failed: {source}")]
    Pass {
        pass: &'static str,
        source: Box<CaliperError>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("fact base error: {0}")]
    Facts(String),
}

impl CaliperError {
    /// Wraps an error with the name of the metric pass it aborted.
    #[must_use]
    pub fn in_pass(self, pass: &'static str) -> Self {
        CaliperError::Pass {
            pass,
            source: Box::new(self),
        }
    }

    /// Builds an I/O error carrying the offending path.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        CaliperError::Io {
            source,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CaliperError>;

// Allow `?` on std::io::Error by converting with an unknown path.
impl From<std::io::Error> for CaliperError {
    fn from(source: std::io::Error) -> Self {
        CaliperError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
