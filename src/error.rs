//! Error types for span correction.
//!
//! Data-quality problems (empty spans, unknown labels, unclassifiable
//! digits) never surface here: they degrade to sentinel values inside the
//! pipeline. What remains are caller mistakes and configuration problems.

use crate::classify::VariableType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorrectionError {
    /// A variable-specific grammar was asked to handle a variable it has no rules for.
    #[error("{operation} is not defined for variable '{variable}'")]
    UnsupportedVariable {
        operation: &'static str,
        variable: VariableType,
    },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Could not read {field} from '{name}'")]
    MissingMetadata { field: &'static str, name: String },

    #[error("Dictionary directory not found: {path}")]
    DictionaryNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CorrectionError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CorrectionError>;
