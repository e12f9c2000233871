//! Conversion entries: all units and rules owned by one field.

use std::collections::BTreeMap;

use crate::error::{ModelError, Result};
use crate::rule::LinearRule;
use crate::unit::{Unit, UnitSet};

/// Units, rules, and preferred unit for one field.
///
/// The preferred unit and every rule's units are members of `units`, and
/// rules are unique per `(from, to)` label pair. Rules are indexed by source
/// label, then target label.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionEntry {
    field_name: String,
    units_field_name: String,
    units: UnitSet,
    rules: BTreeMap<String, BTreeMap<String, LinearRule>>,
    preferred_unit: Unit,
}

impl ConversionEntry {
    pub fn new(
        field_name: impl Into<String>,
        units_field_name: impl Into<String>,
        units: UnitSet,
        rules: Vec<LinearRule>,
        preferred_unit: Unit,
    ) -> Result<Self> {
        let field_name = field_name.into();
        if !units.contains(&preferred_unit) {
            return Err(ModelError::PreferredUnitNotMember {
                field_name,
                label: preferred_unit.label,
            });
        }
        let mut table: BTreeMap<String, BTreeMap<String, LinearRule>> = BTreeMap::new();
        for rule in rules {
            for unit in [&rule.from_unit, &rule.to_unit] {
                if !units.contains(unit) {
                    return Err(ModelError::RuleUnitNotMember {
                        field_name,
                        label: unit.label.clone(),
                    });
                }
            }
            let targets = table.entry(rule.from_unit.label.clone()).or_default();
            if targets.contains_key(&rule.to_unit.label) {
                return Err(ModelError::DuplicateRule {
                    from: rule.from_unit.label,
                    to: rule.to_unit.label,
                });
            }
            targets.insert(rule.to_unit.label.clone(), rule);
        }
        Ok(Self {
            field_name,
            units_field_name: units_field_name.into(),
            units,
            rules: table,
            preferred_unit,
        })
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Column holding each record's unit indicator.
    pub fn units_field_name(&self) -> &str {
        &self.units_field_name
    }

    pub fn units(&self) -> &UnitSet {
        &self.units
    }

    pub fn preferred_unit(&self) -> &Unit {
        &self.preferred_unit
    }

    /// The rule converting `from` to `to`, by unit label.
    pub fn rule(&self, from: &str, to: &str) -> Option<&LinearRule> {
        self.rules.get(from)?.get(to)
    }

    /// Every rule, ordered by source label then target label.
    pub fn rules(&self) -> impl Iterator<Item = &LinearRule> {
        self.rules.values().flat_map(BTreeMap::values)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(BTreeMap::len).sum()
    }
}
