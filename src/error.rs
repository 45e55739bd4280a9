//! Error handling for the track replay library
//!
//! This module defines the error type and a Result alias used throughout
//! the crate. Per-record parse failures are not errors: the loader counts
//! and skips them (see [`crate::dataset::LoadReport`]).

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for track replay operations
#[derive(Error, Debug)]
pub enum ReplayError {
    /// A data or config file could not be read or written
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Nothing usable was found for a load request
    #[error("No data: {0}")]
    NoData(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReplayError>,
    },
}

impl ReplayError {
    /// Build an IO error tagged with the offending path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReplayError::Io {
            path: path.into(),
            source,
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReplayError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for track replay operations
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
