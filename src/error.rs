use thiserror::Error;

use crate::parse::ParseError;
use crate::CompileError;

/// Unified error type covering parsing, compilation, schema reading, and
/// I/O.
///
/// Returned by convenience methods like
/// [`RuleSet::from_schema_str()`](crate::RuleSet::from_schema_str) and
/// [`RuleSet::from_schema_file()`](crate::RuleSet::from_schema_file).
#[derive(Debug, Error)]
pub enum XvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("invalid schema document: {0}")]
    Schema(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
