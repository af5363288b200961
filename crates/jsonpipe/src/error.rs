//! Error types for the jsonpipe library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for jsonpipe operations.
#[derive(Debug, Error)]
pub enum JsonPipeError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of JSONL input that is not a JSON object.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Configuration error (malformed arguments, preset files, templates).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation name not in the catalog.
    #[error("Unknown operation: '{0}'")]
    UnknownOperation(String),

    /// Regex flag name that does not map to a known flag.
    #[error("Unknown regex flag: '{0}'")]
    UnknownRegexFlag(String),

    /// An operation was invoked without an argument it needs.
    #[error("Operation '{operation}' requires the '{argument}' argument")]
    MissingArgument {
        operation: String,
        argument: &'static str,
    },

    /// A record is missing a field the operation cannot do without.
    #[error("Record has no field '{field}'")]
    MissingField { field: String },

    /// A dotted reference without a module separator.
    #[error("Error loading object '{0}': not a full path")]
    InvalidReference(String),

    /// The module part of a reference does not exist.
    #[error("No module named '{0}'")]
    ModuleNotFound(String),

    /// The module exists but does not define the requested object.
    #[error("Module '{module}' doesn't define any object named '{name}'")]
    AttributeNotFound { module: String, name: String },

    /// `preset` was run with neither a pipeline reference nor a default table.
    #[error("A pipeline must be defined")]
    NoPipeline,

    /// The pipeline table has no entry for the requested preset.
    #[error("Unknown preset: '{0}'")]
    UnknownPreset(String),

    /// A record function reported a failure.
    #[error("Function error: {0}")]
    Function(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for jsonpipe operations.
pub type Result<T> = std::result::Result<T, JsonPipeError>;
