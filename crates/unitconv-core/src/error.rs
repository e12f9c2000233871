//! Error types for conversion operations.
//!
//! Only caller or configuration mismatches are errors. Records that cannot
//! be converted are reported through [`ConvertedValue::converted`](crate::ConvertedValue)
//! and an undefined value instead.

use polars::prelude::PolarsError;
use thiserror::Error;
use unitconv_model::{ModelError, UnitKey};
use unitconv_registry::RegistryError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A column does not share the index of the values being converted.
    #[error("column '{column}' has {found} rows, expected {expected}")]
    IndexMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A rule needs a denominator but no denominator column was supplied for its source unit.
    #[error("conversion of '{field_name}' from {unit} requires a denominator column")]
    MissingDenominatorColumn { field_name: String, unit: UnitKey },

    /// A coded-value field's preferred unit has no coded value.
    #[error("preferred unit '{label}' of '{field_name}' has no coded value")]
    MissingCodedValue { field_name: String, label: String },

    #[error("unit lookup failed for '{field_name}': {source}")]
    Lookup {
        field_name: String,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
