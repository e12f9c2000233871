//! Unit conversion engine.
//!
//! A [`UnitConverter`] applies the rules of a [`ConversionRegistry`] at three
//! granularities:
//!
//! - **Scalar**: [`UnitConverter::convert`] for one value and an explicit unit pair
//! - **Columnar**: [`UnitConverter::convert_column`] for values whose unit varies
//!   per row, grouped by source unit
//! - **Dataset**: [`UnitConverter::convert_dataframe`] for every column of a
//!   DataFrame that has a conversion entry, normalized to the preferred unit
//!
//! # Example
//!
//! ```rust,ignore
//! use unitconv_core::UnitConverter;
//! use unitconv_model::UnitKey;
//! use unitconv_registry::ConversionRegistry;
//!
//! let registry = ConversionRegistry::from_paths(&config_path, &schema_path)?;
//! let converter = UnitConverter::new(&registry);
//!
//! let result = converter.convert("height", 60.0, &"in".into(), &"cm".into(), None)?;
//! assert_eq!(result.value, Some(152.4));
//!
//! let normalized = converter.convert_dataframe(&df)?;
//! ```
//!
//! # Design Principles
//!
//! - **Errors for mismatches only**: index mismatches and missing denominator
//!   columns are errors; records that cannot be converted are flagged instead
//! - **Read-only**: conversion never mutates the registry or converter

mod column;
mod converter;
mod dataset;
mod error;

pub mod polars;

pub use column::{ColumnConversion, DenominatorColumns};
pub use converter::{
    ConvertedValue, ConverterConfig, NOTE_IDENTITY, NOTE_NO_CONVERSION, NOTE_NO_MATCHING_RULE,
    UnitConverter,
};
pub use dataset::{DatasetSummary, FieldSummary, convert_units};
pub use error::{ConvertError, Result};

pub use unitconv_model::{UnitKey, UnitMode};
pub use unitconv_registry::ConversionRegistry;
