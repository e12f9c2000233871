//! Dataset-wide normalization of every convertible column to its preferred unit.

use std::path::Path;

use polars::prelude::DataFrame;
use unitconv_model::ConversionEntry;
use unitconv_registry::ConversionRegistry;

use crate::column::{ColumnConversion, DenominatorColumns};
use crate::converter::{ConverterConfig, UnitConverter};
use crate::error::{ConvertError, Result};
use crate::polars::{has_column, numeric_column, set_f64_column, set_unit_column, unit_column};

/// Per-field outcome of a dataset conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSummary {
    pub field_name: String,
    pub units_field_name: String,
    pub preferred_unit: String,
    pub rows: usize,
    pub converted: usize,
}

/// Fields converted by one dataset call, in dataset column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub fields: Vec<FieldSummary>,
}

impl DatasetSummary {
    pub fn converted_rows(&self) -> usize {
        self.fields.iter().map(|field| field.converted).sum()
    }
}

impl UnitConverter<'_> {
    /// Normalize a copy of `df`, leaving the input untouched.
    pub fn convert_dataframe(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut output = df.clone();
        self.convert_dataframe_in_place(&mut output)?;
        Ok(output)
    }

    /// Normalize every column of `df` that has a conversion entry and whose
    /// unit-indicator column is also present.
    ///
    /// Value and unit columns are overwritten with the converted values and
    /// units. Columns without an entry are left untouched. Every field is
    /// converted from the frame as it was passed in, denominators included,
    /// and nothing is written unless every field converts.
    pub fn convert_dataframe_in_place(&self, df: &mut DataFrame) -> Result<DatasetSummary> {
        let mut planned = Vec::new();
        for name in df.get_column_names() {
            let Some(entry) = self.registry().get(name.as_str()) else {
                continue;
            };
            if !has_column(df, entry.units_field_name()) {
                tracing::debug!(
                    field = %name,
                    units_field = %entry.units_field_name(),
                    "unit column absent, field left untouched"
                );
                continue;
            }
            planned.push((entry, self.convert_entry_columns(df, entry)?));
        }

        let mut summary = DatasetSummary::default();
        for (entry, result) in planned {
            let mode = self.mode_for(entry.field_name());
            summary.fields.push(FieldSummary {
                field_name: entry.field_name().to_string(),
                units_field_name: entry.units_field_name().to_string(),
                preferred_unit: entry.preferred_unit().label.clone(),
                rows: result.len(),
                converted: result.converted_count(),
            });
            set_unit_column(df, entry.units_field_name(), &result.units, mode)?;
            set_f64_column(df, entry.field_name(), result.values)?;
        }

        tracing::info!(
            fields = summary.fields.len(),
            converted_rows = summary.converted_rows(),
            "dataset conversion complete"
        );
        Ok(summary)
    }

    fn convert_entry_columns(
        &self,
        df: &DataFrame,
        entry: &ConversionEntry,
    ) -> Result<ColumnConversion> {
        let field_name = entry.field_name();
        let mode = self.mode_for(field_name);
        let target =
            entry
                .preferred_unit()
                .key(mode)
                .ok_or_else(|| ConvertError::MissingCodedValue {
                    field_name: field_name.to_string(),
                    label: entry.preferred_unit().label.clone(),
                })?;

        let values = numeric_column(df, field_name)?;
        let units = unit_column(df, entry.units_field_name(), mode)?;

        let mut denominators = DenominatorColumns::new();
        for rule in entry.rules() {
            let Some(column) = rule.denominator_field_name() else {
                continue;
            };
            if !has_column(df, column) {
                continue;
            }
            match rule.from_unit.key(mode) {
                Some(key) => {
                    denominators.insert(key, numeric_column(df, column)?);
                }
                None => tracing::warn!(
                    field = %field_name,
                    unit = %rule.from_unit.label,
                    "unit has no coded value, denominator column not used"
                ),
            }
        }

        self.convert_column(field_name, &values, &units, &target, &denominators)
    }
}

/// Load a registry and normalize a dataset in one step.
///
/// Uses the bundled schema when `schema_path` is `None`.
pub fn convert_units(
    df: &DataFrame,
    config_path: &Path,
    schema_path: Option<&Path>,
    config: ConverterConfig,
) -> Result<DataFrame> {
    let registry = ConversionRegistry::from_config_path(config_path, schema_path)?;
    UnitConverter::with_config(&registry, config).convert_dataframe(df)
}
