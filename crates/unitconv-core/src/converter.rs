//! The unit converter and scalar conversion.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unitconv_model::{Conversion, LinearRule, UnitKey, UnitMode};
use unitconv_registry::ConversionRegistry;

use crate::error::{ConvertError, Result};

/// Note for a value whose source and target units are the same.
pub const NOTE_IDENTITY: &str = "identity";
/// Note for a scalar value with no declared rule between its units.
pub const NOTE_NO_MATCHING_RULE: &str = "no matching rule";
/// Note for column rows whose source unit has no declared rule.
pub const NOTE_NO_CONVERSION: &str = "no conversion";

/// How each field's records refer to their units.
///
/// Fields not listed in `field_modes` use `default_mode`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default)]
    pub default_mode: UnitMode,
    #[serde(default)]
    pub field_modes: BTreeMap<String, UnitMode>,
}

impl ConverterConfig {
    /// Every field uses the same mode.
    pub fn uniform(mode: UnitMode) -> Self {
        Self {
            default_mode: mode,
            field_modes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field_mode(mut self, field_name: impl Into<String>, mode: UnitMode) -> Self {
        self.field_modes.insert(field_name.into(), mode);
        self
    }

    pub fn mode_for(&self, field_name: &str) -> UnitMode {
        self.field_modes
            .get(field_name)
            .copied()
            .unwrap_or(self.default_mode)
    }
}

/// Result of converting one value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedValue {
    /// The converted or passed-through value. `None` when the conversion is
    /// numerically undefined (zero or missing denominator).
    pub value: Option<f64>,
    pub unit: UnitKey,
    pub converted: bool,
    pub note: Option<String>,
}

impl ConvertedValue {
    fn passed_through(value: f64, unit: &UnitKey, note: Option<&str>) -> Self {
        Self {
            value: Some(value),
            unit: unit.clone(),
            converted: false,
            note: note.map(str::to_string),
        }
    }
}

/// Converts values between units using a shared, read-only registry.
///
/// Conversion calls never mutate the converter or the registry, so one
/// converter may be used from many threads at once.
#[derive(Debug, Clone)]
pub struct UnitConverter<'r> {
    registry: &'r ConversionRegistry,
    config: ConverterConfig,
}

impl<'r> UnitConverter<'r> {
    /// A converter that references every field's units by label.
    pub fn new(registry: &'r ConversionRegistry) -> Self {
        Self::with_config(registry, ConverterConfig::default())
    }

    pub fn with_config(registry: &'r ConversionRegistry, config: ConverterConfig) -> Self {
        for field_name in config.field_modes.keys() {
            if !registry.contains(field_name) {
                tracing::warn!(
                    field = %field_name,
                    "unit mode configured for a field with no conversion entry"
                );
            }
        }
        Self { registry, config }
    }

    pub fn registry(&self) -> &'r ConversionRegistry {
        self.registry
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn mode_for(&self, field_name: &str) -> UnitMode {
        self.config.mode_for(field_name)
    }

    pub(crate) fn find_rule(
        &self,
        field_name: &str,
        from: &UnitKey,
        to: &UnitKey,
    ) -> Result<Option<&'r LinearRule>> {
        self.registry
            .get_rule(field_name, from, to, self.mode_for(field_name))
            .map_err(|source| ConvertError::Lookup {
                field_name: field_name.to_string(),
                source,
            })
    }

    /// Convert one value from `from` to `to`.
    ///
    /// Values that cannot be converted are returned with `converted = false`:
    /// unchanged when no rule applies or a required denominator is not
    /// supplied, and with an undefined value when the denominator is zero or NaN.
    ///
    /// # Errors
    ///
    /// Fails only when a coded-value field is given a code that is not one of its units.
    pub fn convert(
        &self,
        field_name: &str,
        value: f64,
        from: &UnitKey,
        to: &UnitKey,
        denominator: Option<f64>,
    ) -> Result<ConvertedValue> {
        let Some(rule) = self.find_rule(field_name, from, to)? else {
            let note = if from == to {
                NOTE_IDENTITY
            } else {
                NOTE_NO_MATCHING_RULE
            };
            tracing::debug!(field = %field_name, from = %from, to = %to, note, "value not converted");
            return Ok(ConvertedValue::passed_through(value, from, Some(note)));
        };
        let note = rule.note.as_deref();

        let converted = match &rule.conversion {
            Conversion::None => return Ok(ConvertedValue::passed_through(value, from, note)),
            Conversion::Linear(transform) => Some(transform.apply(value)),
            Conversion::LinearWithDenominator { transform, .. } => {
                let Some(denominator) = denominator else {
                    tracing::debug!(
                        field = %field_name,
                        from = %from,
                        "conversion requires a denominator, none provided"
                    );
                    return Ok(ConvertedValue::passed_through(value, from, note));
                };
                transform.apply_with_denominator(value, denominator)
            }
        };

        Ok(ConvertedValue {
            value: converted,
            unit: to.clone(),
            converted: converted.is_some(),
            note: note.map(str::to_string),
        })
    }
}
