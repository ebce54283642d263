//! Error type for the linkage pipeline.
//!
//! Only unrecoverable failures surface here: unreadable sources, a failing
//! output sink, or a bad configuration. Malformed rows are logged and counted
//! by the stage that meets them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// The three input datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Government gazetteer CSV (provinces, regencies, districts)
    Primary,
    /// Statistics-agency code/coordinate table
    Secondary,
    /// Global geographic-names dump
    Gazetteer,
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSource::Primary => write!(f, "primary gazetteer"),
            InputSource::Secondary => write!(f, "statistics-agency table"),
            InputSource::Gazetteer => write!(f, "geonames dump"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open {input} at {}: {error}", path.display())]
    Open {
        input: InputSource,
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("failed to read {input} at {}: {error}", path.display())]
    Read {
        input: InputSource,
        path: PathBuf,
        #[source]
        error: csv::Error,
    },

    #[error("output sink failed: {0}")]
    Sink(#[source] io::Error),

    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("namespace `{name}` is not an absolute IRI: {value}")]
    InvalidNamespace { name: String, value: String },
}

impl PipelineError {
    /// Input source the error came from, if any
    pub fn input(&self) -> Option<InputSource> {
        match self {
            PipelineError::Open { input, .. } | PipelineError::Read { input, .. } => Some(*input),
            _ => None,
        }
    }
}
