//! Reading and writing conversion columns on Polars DataFrames.

use polars::prelude::*;
use unitconv_model::{UnitKey, UnitMode};

use crate::error::Result;

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
///
/// Strings are parsed after trimming; NaN is treated as missing.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let parsed = match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_trimmed(s),
        AnyValue::StringOwned(ref s) => parse_trimmed(s),
        _ => None,
    };
    parsed.filter(|v| !v.is_nan())
}

/// Reads a unit indicator as a label or coded value, depending on `mode`.
///
/// Empty strings and nulls yield `None`. In coded-value mode, integral
/// floats and numeric strings are accepted as codes.
pub fn any_to_unit_key(value: AnyValue<'_>, mode: UnitMode) -> Option<UnitKey> {
    match mode {
        UnitMode::Label => match value {
            AnyValue::Null => None,
            AnyValue::String(s) => non_empty_label(s),
            AnyValue::StringOwned(ref s) => non_empty_label(s),
            other => Some(UnitKey::Label(other.to_string())),
        },
        UnitMode::CodedValue => match value {
            AnyValue::Int8(v) => Some(UnitKey::Code(i64::from(v))),
            AnyValue::Int16(v) => Some(UnitKey::Code(i64::from(v))),
            AnyValue::Int32(v) => Some(UnitKey::Code(i64::from(v))),
            AnyValue::Int64(v) => Some(UnitKey::Code(v)),
            AnyValue::UInt8(v) => Some(UnitKey::Code(i64::from(v))),
            AnyValue::UInt16(v) => Some(UnitKey::Code(i64::from(v))),
            AnyValue::UInt32(v) => Some(UnitKey::Code(i64::from(v))),
            AnyValue::UInt64(v) => i64::try_from(v).ok().map(UnitKey::Code),
            other => any_to_f64(other)
                .filter(|v| v.fract() == 0.0)
                .map(|v| UnitKey::Code(v as i64)),
        },
    }
}

fn parse_trimmed(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn non_empty_label(value: &str) -> Option<UnitKey> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(UnitKey::Label(trimmed.to_string()))
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_f64(series.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

pub fn unit_column(df: &DataFrame, name: &str, mode: UnitMode) -> Result<Vec<Option<UnitKey>>> {
    let series = df.column(name)?;
    let mut units = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        units.push(any_to_unit_key(
            series.get(idx).unwrap_or(AnyValue::Null),
            mode,
        ));
    }
    Ok(units)
}

pub fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

/// Write unit keys back in the representation the field uses.
pub fn set_unit_column(
    df: &mut DataFrame,
    name: &str,
    units: &[Option<UnitKey>],
    mode: UnitMode,
) -> Result<()> {
    let series = match mode {
        UnitMode::Label => {
            let labels: Vec<Option<String>> = units
                .iter()
                .map(|unit| unit.as_ref().and_then(UnitKey::as_label).map(str::to_string))
                .collect();
            Series::new(name.into(), labels)
        }
        UnitMode::CodedValue => {
            let codes: Vec<Option<i64>> = units
                .iter()
                .map(|unit| unit.as_ref().and_then(UnitKey::as_code))
                .collect();
            Series::new(name.into(), codes)
        }
    };
    df.with_column(series)?;
    Ok(())
}
