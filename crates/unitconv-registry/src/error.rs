//! Error types for registry loading.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use unitconv_model::ModelError;

/// One problem found in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Slash-separated location in the document, `<root>` for the top level.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() {
                ROOT_PATH.to_string()
            } else {
                path
            },
            message: message.into(),
        }
    }
}

pub(crate) const ROOT_PATH: &str = "<root>";

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

struct ViolationList<'a>(&'a [Violation]);

impl fmt::Display for ViolationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in self.0 {
            write!(f, "\n- {violation}")?;
        }
        Ok(())
    }
}

/// Errors that abort registry construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The schema document is not a valid Draft-07 schema.
    #[error("schema is not a valid Draft-07 schema: {message}")]
    SchemaInvalid { message: String },

    /// The configuration does not validate against the schema.
    #[error("configuration does not validate against schema:{}", ViolationList(.violations))]
    SchemaValidation { violations: Vec<Violation> },

    #[error("configuration entries must be unique for 'field_name': '{field_name}' is repeated")]
    DuplicateField { field_name: String },

    /// Entries reference units that are not declared in their own unit list.
    #[error("configuration has unresolved references:{}", ViolationList(.violations))]
    UnresolvedReferences { violations: Vec<Violation> },

    #[error("invalid entry '{field_name}': {source}")]
    Model {
        field_name: String,
        #[source]
        source: ModelError,
    },
}

impl RegistryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            origin: origin.into(),
            source,
        }
    }

    /// Every violation carried by this error, if it is a validation failure.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaValidation { violations } | Self::UnresolvedReferences { violations } => {
                violations
            }
            _ => &[],
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
