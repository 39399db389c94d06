//! Error types for the core pipeline.
//!
//! Only [`ConfigError`] is fatal. Everything that can go wrong inside a
//! documentation block is reported as a [`crate::diagnostics::Diagnostic`]
//! and the run continues.

use crate::version::VersionError;

/// Invalid package configuration. Reported before any file is scanned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid defaultVersion `{value}`: {source}")]
    InvalidDefaultVersion {
        value: String,
        #[source]
        source: VersionError,
    },

    #[error("sampleUrl is set but empty")]
    EmptySampleUrl,
}

/// A tag's content could not be interpreted by its parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParameterError {
    pub message: String,
    /// Expected syntax, e.g. `@apiDefine name`.
    pub usage: &'static str,
}

impl ParameterError {
    pub fn new(message: impl Into<String>, usage: &'static str) -> Self {
        Self {
            message: message.into(),
            usage,
        }
    }
}

/// A parsed fragment could not be written into the block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    #[error("`{path}` already holds a value that conflicts with {method}")]
    PathConflict { path: String, method: &'static str },

    #[error("fragment for `{path}` must be an object")]
    NotAnObject { path: String },

    #[error("only one definition is allowed per block")]
    GlobalAlreadyDefined,
}
