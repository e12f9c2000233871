//! Raw configuration records and their conversion into model entries.
//!
//! Records are deserialized only after the document has passed schema
//! validation; reference checks then run over every record so that all
//! unresolved labels are reported together.

use serde::Deserialize;
use unitconv_model::{Conversion, ConversionEntry, LinearRule, LinearTransform, Unit, UnitSet};

use crate::error::{RegistryError, Result, Violation};

const DENOMINATOR_REQUIRED: &str =
    "'denominator_field_name' is required for 'linear_with_denominator' rules";

#[derive(Debug, Clone, Deserialize)]
pub struct EntryRecord {
    pub field_name: String,
    pub units_field_name: String,
    pub units: Vec<Unit>,
    #[serde(default)]
    pub conversion_rules: Vec<RuleRecord>,
    pub preferred_unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    #[default]
    None,
    Linear,
    LinearWithDenominator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleRecord {
    pub from_unit: String,
    pub to_unit: String,
    #[serde(rename = "type", default)]
    pub rule_type: RuleType,
    pub multiplier: Option<f64>,
    pub offset: Option<f64>,
    pub denominator_field_name: Option<String>,
    pub note: Option<String>,
}

impl RuleRecord {
    fn conversion(&self) -> Option<Conversion> {
        let transform = LinearTransform::new(
            self.multiplier.unwrap_or(1.0),
            self.offset.unwrap_or(0.0),
        );
        match self.rule_type {
            RuleType::None => Some(Conversion::None),
            RuleType::Linear => Some(Conversion::Linear(transform)),
            RuleType::LinearWithDenominator => self.denominator_field_name.clone().map(
                |denominator_field_name| Conversion::LinearWithDenominator {
                    transform,
                    denominator_field_name,
                },
            ),
        }
    }
}

/// Collect every reference that cannot be resolved within its own entry.
pub fn check_references(records: &[EntryRecord]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let declared = |label: &str| record.units.iter().any(|unit| unit.label == label);
        if !declared(&record.preferred_unit) {
            violations.push(Violation::new(
                format!("{index}/preferred_unit"),
                format!(
                    "'{}' is not one of the units declared for '{}'",
                    record.preferred_unit, record.field_name
                ),
            ));
        }
        for (rule_index, rule) in record.conversion_rules.iter().enumerate() {
            for (attribute, label) in [("from_unit", &rule.from_unit), ("to_unit", &rule.to_unit)]
            {
                if !declared(label) {
                    violations.push(Violation::new(
                        format!("{index}/conversion_rules/{rule_index}/{attribute}"),
                        format!(
                            "'{label}' is not one of the units declared for '{}'",
                            record.field_name
                        ),
                    ));
                }
            }
            if rule.rule_type == RuleType::LinearWithDenominator
                && rule.denominator_field_name.is_none()
            {
                violations.push(Violation::new(
                    format!("{index}/conversion_rules/{rule_index}"),
                    DENOMINATOR_REQUIRED,
                ));
            }
        }
    }
    violations
}

impl EntryRecord {
    /// Build the model entry for the record at `index` in its document.
    ///
    /// A rule that [`check_references`] would reject is an error here too.
    pub fn into_entry(self, index: usize) -> Result<ConversionEntry> {
        let field_name = self.field_name;
        let model_error = |source| RegistryError::Model {
            field_name: field_name.clone(),
            source,
        };
        let units = UnitSet::new(self.units).map_err(model_error)?;
        let mut rules = Vec::with_capacity(self.conversion_rules.len());
        for (rule_index, record) in self.conversion_rules.iter().enumerate() {
            let from_unit = units.find_by_label(&record.from_unit).map_err(model_error)?;
            let to_unit = units.find_by_label(&record.to_unit).map_err(model_error)?;
            let Some(conversion) = record.conversion() else {
                return Err(RegistryError::UnresolvedReferences {
                    violations: vec![Violation::new(
                        format!("{index}/conversion_rules/{rule_index}"),
                        DENOMINATOR_REQUIRED,
                    )],
                });
            };
            let mut rule = LinearRule::new(from_unit.clone(), to_unit.clone(), conversion);
            rule.note = record.note.clone();
            rules.push(rule);
        }
        let preferred_unit = units
            .find_by_label(&self.preferred_unit)
            .map_err(model_error)?
            .clone();
        ConversionEntry::new(
            field_name.clone(),
            self.units_field_name,
            units,
            rules,
            preferred_unit,
        )
        .map_err(model_error)
    }
}
