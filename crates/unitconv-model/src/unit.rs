//! Units and unit sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One admissible measurement unit for a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Display label, unique within its unit set.
    #[serde(rename = "unit_label")]
    pub label: String,
    /// Integer code for systems that store units as codes rather than labels.
    #[serde(rename = "unit_value", default)]
    pub coded_value: Option<i64>,
    /// Column holding values already expressed in this unit.
    #[serde(rename = "unit_field_name", default)]
    pub source_column: Option<String>,
}

impl Unit {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            coded_value: None,
            source_column: None,
        }
    }

    #[must_use]
    pub fn with_coded_value(mut self, value: i64) -> Self {
        self.coded_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_source_column(mut self, column: impl Into<String>) -> Self {
        self.source_column = Some(column.into());
        self
    }

    /// The identifier of this unit under the given representation mode.
    ///
    /// Returns `None` in coded-value mode when the unit carries no code.
    pub fn key(&self, mode: UnitMode) -> Option<UnitKey> {
        match mode {
            UnitMode::Label => Some(UnitKey::Label(self.label.clone())),
            UnitMode::CodedValue => self.coded_value.map(UnitKey::Code),
        }
    }
}

/// How a field's records refer to their units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMode {
    /// Units are referenced by their label (e.g. `"cm"`).
    #[default]
    Label,
    /// Units are referenced by their integer code (e.g. `1`).
    CodedValue,
}

/// A unit identifier as it appears in a record: a label or a coded value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitKey {
    Code(i64),
    Label(String),
}

impl UnitKey {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Label(label) => Some(label),
            Self::Code(_) => None,
        }
    }

    pub fn as_code(&self) -> Option<i64> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Label(_) => None,
        }
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "'{label}'"),
            Self::Code(code) => write!(f, "{code}"),
        }
    }
}

impl From<&str> for UnitKey {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

impl From<String> for UnitKey {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

impl From<i64> for UnitKey {
    fn from(code: i64) -> Self {
        Self::Code(code)
    }
}

/// Ordered units for one field.
///
/// No two units share a label, a coded value, or a source column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UnitSet {
    units: Vec<Unit>,
}

impl UnitSet {
    /// Build a unit set, rejecting duplicate labels, coded values, or source columns.
    pub fn new(units: Vec<Unit>) -> Result<Self> {
        let mut labels = BTreeSet::new();
        let mut codes = BTreeSet::new();
        let mut columns = BTreeSet::new();
        for unit in &units {
            if !labels.insert(unit.label.as_str()) {
                return Err(ModelError::DuplicateUnitAttribute {
                    attribute: "unit_label",
                    value: unit.label.clone(),
                });
            }
            if let Some(code) = unit.coded_value
                && !codes.insert(code)
            {
                return Err(ModelError::DuplicateUnitAttribute {
                    attribute: "unit_value",
                    value: code.to_string(),
                });
            }
            if let Some(column) = unit.source_column.as_deref()
                && !columns.insert(column)
            {
                return Err(ModelError::DuplicateUnitAttribute {
                    attribute: "unit_field_name",
                    value: column.to_string(),
                });
            }
        }
        Ok(Self { units })
    }

    pub fn find_by_label(&self, label: &str) -> Result<&Unit> {
        self.units
            .iter()
            .find(|unit| unit.label == label)
            .ok_or_else(|| ModelError::UnitNotFound {
                key: UnitKey::Label(label.to_string()),
            })
    }

    pub fn find_by_coded_value(&self, code: i64) -> Result<&Unit> {
        self.units
            .iter()
            .find(|unit| unit.coded_value == Some(code))
            .ok_or(ModelError::UnitNotFound {
                key: UnitKey::Code(code),
            })
    }

    /// Resolve a record's unit identifier to a unit in this set.
    pub fn find(&self, key: &UnitKey) -> Result<&Unit> {
        match key {
            UnitKey::Label(label) => self.find_by_label(label),
            UnitKey::Code(code) => self.find_by_coded_value(*code),
        }
    }

    pub fn contains(&self, unit: &Unit) -> bool {
        self.units.iter().any(|member| member == unit)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|unit| unit.label.as_str())
    }
}

impl<'a> IntoIterator for &'a UnitSet {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}
