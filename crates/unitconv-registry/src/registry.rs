//! The conversion registry: entries indexed by field name.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde_json::Value;
use unitconv_model::{ConversionEntry, LinearRule, UnitKey, UnitMode};

use crate::embedded;
use crate::error::{RegistryError, Result};
use crate::record::{EntryRecord, check_references};
use crate::schema::ConfigSchema;

/// Read-only collection of conversion entries keyed by field name.
///
/// Built once from a configuration document and a schema; a new
/// configuration requires a new registry.
#[derive(Debug, Clone, Default)]
pub struct ConversionRegistry {
    entries: BTreeMap<String, ConversionEntry>,
}

impl ConversionRegistry {
    /// Load a registry from parsed configuration and schema documents.
    ///
    /// # Errors
    ///
    /// Fails if the schema is invalid, the configuration violates it, two
    /// entries share a `field_name`, or an entry references undeclared units.
    pub fn load(config: &Value, schema: &Value) -> Result<Self> {
        let schema = ConfigSchema::compile(schema)?;
        schema.validate(config)?;

        let records: Vec<EntryRecord> = serde_json::from_value(config.clone())
            .map_err(|source| RegistryError::json("configuration", source))?;

        let mut seen = BTreeSet::new();
        for record in &records {
            if !seen.insert(record.field_name.as_str()) {
                return Err(RegistryError::DuplicateField {
                    field_name: record.field_name.clone(),
                });
            }
        }

        let violations = check_references(&records);
        if !violations.is_empty() {
            return Err(RegistryError::UnresolvedReferences { violations });
        }

        let mut entries = BTreeMap::new();
        for (index, record) in records.into_iter().enumerate() {
            let entry = record.into_entry(index)?;
            entries.insert(entry.field_name().to_string(), entry);
        }
        tracing::info!(entry_count = entries.len(), "loaded conversion registry");
        Ok(Self { entries })
    }

    /// Load from JSON strings.
    pub fn from_json_str(config: &str, schema: &str) -> Result<Self> {
        let config: Value = serde_json::from_str(config)
            .map_err(|source| RegistryError::json("configuration", source))?;
        let schema: Value =
            serde_json::from_str(schema).map_err(|source| RegistryError::json("schema", source))?;
        Self::load(&config, &schema)
    }

    /// Load from a configuration string using the bundled schema.
    pub fn from_json_str_default_schema(config: &str) -> Result<Self> {
        Self::from_json_str(config, embedded::UNIT_CONVERSION_SCHEMA)
    }

    /// Load from configuration and schema files.
    pub fn from_paths(config_path: &Path, schema_path: &Path) -> Result<Self> {
        let schema = read_to_string(schema_path)?;
        let config = read_to_string(config_path)?;
        let schema: Value = serde_json::from_str(&schema)
            .map_err(|source| RegistryError::json(schema_path.display().to_string(), source))?;
        let config: Value = serde_json::from_str(&config)
            .map_err(|source| RegistryError::json(config_path.display().to_string(), source))?;
        Self::load(&config, &schema)
    }

    /// Load from a configuration file, validating with the given schema file
    /// or the bundled schema when none is given.
    pub fn from_config_path(config_path: &Path, schema_path: Option<&Path>) -> Result<Self> {
        match schema_path {
            Some(schema_path) => Self::from_paths(config_path, schema_path),
            None => Self::from_json_str_default_schema(&read_to_string(config_path)?),
        }
    }

    pub fn get(&self, field_name: &str) -> Option<&ConversionEntry> {
        self.entries.get(field_name)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.entries.contains_key(field_name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConversionEntry> {
        self.entries.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the rule converting `from` to `to` for a field.
    ///
    /// Returns `Ok(None)` when the field is unknown or no rule is declared
    /// between the two units. In coded-value mode both codes are resolved
    /// first, and an unknown code is a lookup error.
    pub fn get_rule(
        &self,
        field_name: &str,
        from: &UnitKey,
        to: &UnitKey,
        mode: UnitMode,
    ) -> unitconv_model::Result<Option<&LinearRule>> {
        let Some(entry) = self.entries.get(field_name) else {
            return Ok(None);
        };
        match mode {
            UnitMode::Label => Ok(match (from.as_label(), to.as_label()) {
                (Some(from), Some(to)) => entry.rule(from, to),
                _ => None,
            }),
            UnitMode::CodedValue => {
                let from = entry.units().find(from)?;
                let to = entry.units().find(to)?;
                Ok(entry.rule(&from.label, &to.label))
            }
        }
    }

    /// The unit-indicator column for a field.
    pub fn unit_field_name(&self, field_name: &str) -> Option<&str> {
        self.entries
            .get(field_name)
            .map(ConversionEntry::units_field_name)
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| RegistryError::io(path, source))
}
