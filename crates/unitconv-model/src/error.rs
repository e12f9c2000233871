//! Error types for the unit conversion data model.

use thiserror::Error;

use crate::unit::UnitKey;

/// Errors raised while building or querying model types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Two units in one set share a label, coded value, or source column.
    #[error("units have non-unique {attribute}: '{value}'")]
    DuplicateUnitAttribute {
        attribute: &'static str,
        value: String,
    },

    /// A unit was requested by label or coded value and is not in the set.
    #[error("unit {key} not found")]
    UnitNotFound { key: UnitKey },

    /// Two rules convert between the same pair of unit labels.
    #[error("duplicate conversion rule from '{from}' to '{to}'")]
    DuplicateRule { from: String, to: String },

    /// A rule references a unit that is not a member of the entry's unit set.
    #[error("rule unit '{label}' is not a member of the units for '{field_name}'")]
    RuleUnitNotMember { field_name: String, label: String },

    /// The preferred unit is not a member of the entry's unit set.
    #[error("preferred unit '{label}' is not a member of the units for '{field_name}'")]
    PreferredUnitNotMember { field_name: String, label: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
