//! # Errors
//!
//! One error type for every failure the bindings can report.

use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

use super::export::Export;
use super::step::NodeId;

/// Root error type for sapf bindings
#[derive(Error, Debug)]
pub enum SapfError {
    /// The shared object could not be loaded
    #[error("failed to load library {}: {source}", .path.display())]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The library does not export a symbol that was called or required
    #[error("library does not export `{0}`")]
    MissingSymbol(Export),

    /// An argument cannot cross the FFI boundary
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A native call returned a null string pointer
    #[error("`{0}` returned a null string")]
    NullString(Export),

    /// A native call returned bytes that are not UTF-8
    #[error("`{export}` returned invalid UTF-8: {source}")]
    InvalidUtf8 {
        export: Export,
        #[source]
        source: Utf8Error,
    },

    /// `step` was called before any `reset`
    #[error("no episode in progress, call reset first")]
    NoEpisode,

    /// `step` was called after the episode reported done
    #[error("episode finished at node {node}, call reset first")]
    EpisodeDone { node: NodeId },

    /// The configured step bound was reached
    #[error("step limit of {limit} reached")]
    StepLimit { limit: u64 },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// The graph string is not valid JSON
    #[error("graph is not valid JSON: {0}")]
    GraphJson(#[source] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SapfResult<T> = Result<T, SapfError>;
