//! Columnar conversion: one rule per distinct source unit.
//!
//! Rows are grouped by source unit before any rule is resolved, so every
//! row that shares a source unit within one call receives the same rule.

use std::collections::BTreeMap;

use unitconv_model::{Conversion, ModelError, UnitKey, UnitMode};

use crate::converter::{NOTE_NO_CONVERSION, UnitConverter};
use crate::error::{ConvertError, Result};

/// Denominator values per source unit, aligned with the value column.
pub type DenominatorColumns = BTreeMap<UnitKey, Vec<Option<f64>>>;

/// Converted column, aligned row-for-row with the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnConversion {
    pub values: Vec<Option<f64>>,
    pub units: Vec<Option<UnitKey>>,
    pub converted: Vec<bool>,
    pub notes: Vec<Option<String>>,
}

impl ColumnConversion {
    fn passthrough(values: &[Option<f64>], units: &[Option<UnitKey>]) -> Self {
        Self {
            values: values.to_vec(),
            units: units.to_vec(),
            converted: vec![false; values.len()],
            notes: vec![None; values.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn converted_count(&self) -> usize {
        self.converted.iter().filter(|flag| **flag).count()
    }
}

/// Partition row indices by source unit. Rows without a unit are left out.
pub(crate) fn group_rows(units: &[Option<UnitKey>]) -> BTreeMap<&UnitKey, Vec<usize>> {
    let mut groups: BTreeMap<&UnitKey, Vec<usize>> = BTreeMap::new();
    for (idx, unit) in units.iter().enumerate() {
        if let Some(unit) = unit {
            groups.entry(unit).or_default().push(idx);
        }
    }
    groups
}

fn check_len(column: &str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(ConvertError::IndexMismatch {
            column: column.to_string(),
            expected,
            found,
        })
    }
}

impl UnitConverter<'_> {
    /// Convert a column of values whose source unit may vary per row.
    ///
    /// Rows whose source unit has no rule to `target` are passed through with
    /// the note `"no conversion"`, including coded-value rows whose code is
    /// not one of the field's units. Rows without a source unit are passed
    /// through with no note.
    ///
    /// # Errors
    ///
    /// Fails if `values`, `source_units`, or a denominator column differ in
    /// length, if a rule requires a denominator and `denominators` has no
    /// column for its source unit, or if a coded-value `target` is not one
    /// of the field's units.
    pub fn convert_column(
        &self,
        field_name: &str,
        values: &[Option<f64>],
        source_units: &[Option<UnitKey>],
        target: &UnitKey,
        denominators: &DenominatorColumns,
    ) -> Result<ColumnConversion> {
        check_len("source_units", values.len(), source_units.len())?;

        self.check_coded_target(field_name, target)?;

        let mut output = ColumnConversion::passthrough(values, source_units);

        for (source, rows) in group_rows(source_units) {
            let rule = match self.find_rule(field_name, source, target) {
                Ok(rule) => rule,
                // The target is known, so the unresolved code is the source.
                Err(ConvertError::Lookup {
                    source: ModelError::UnitNotFound { .. },
                    ..
                }) => {
                    tracing::warn!(
                        field = %field_name,
                        unit = %source,
                        rows = rows.len(),
                        "coded value is not a unit of the field, rows not converted"
                    );
                    None
                }
                Err(error) => return Err(error),
            };
            let Some(rule) = rule else {
                for &idx in &rows {
                    output.notes[idx] = Some(NOTE_NO_CONVERSION.to_string());
                }
                tracing::debug!(
                    field = %field_name,
                    from = %source,
                    to = %target,
                    rows = rows.len(),
                    "no conversion for group"
                );
                continue;
            };

            for &idx in &rows {
                output.notes[idx] = rule.note.clone();
            }

            match &rule.conversion {
                Conversion::None => {}
                Conversion::Linear(transform) => {
                    for &idx in &rows {
                        let converted = values[idx].map(|value| transform.apply(value));
                        output.values[idx] = converted;
                        output.units[idx] = Some(target.clone());
                        output.converted[idx] = converted.is_some();
                    }
                }
                Conversion::LinearWithDenominator { transform, .. } => {
                    let denominator = denominators.get(source).ok_or_else(|| {
                        ConvertError::MissingDenominatorColumn {
                            field_name: field_name.to_string(),
                            unit: source.clone(),
                        }
                    })?;
                    check_len(
                        rule.denominator_field_name().unwrap_or("denominator"),
                        values.len(),
                        denominator.len(),
                    )?;
                    let mut undefined = 0usize;
                    for &idx in &rows {
                        let converted = match (values[idx], denominator[idx]) {
                            (Some(value), Some(denominator)) => {
                                transform.apply_with_denominator(value, denominator)
                            }
                            _ => None,
                        };
                        if converted.is_none() {
                            undefined += 1;
                        }
                        output.values[idx] = converted;
                        output.units[idx] = Some(target.clone());
                        output.converted[idx] = converted.is_some();
                    }
                    if undefined > 0 {
                        tracing::warn!(
                            field = %field_name,
                            from = %source,
                            rows = undefined,
                            "conversion undefined for rows with missing or zero denominator"
                        );
                    }
                }
            }

            tracing::debug!(
                field = %field_name,
                from = %source,
                to = %target,
                kind = rule.conversion.kind_name(),
                rows = rows.len(),
                "converted group"
            );
        }

        Ok(output)
    }

    fn check_coded_target(&self, field_name: &str, target: &UnitKey) -> Result<()> {
        if self.mode_for(field_name) != UnitMode::CodedValue {
            return Ok(());
        }
        let Some(entry) = self.registry().get(field_name) else {
            return Ok(());
        };
        entry
            .units()
            .find(target)
            .map(|_| ())
            .map_err(|source| ConvertError::Lookup {
                field_name: field_name.to_string(),
                source,
            })
    }
}
