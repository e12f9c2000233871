//! Data model for field-keyed unit conversion.
//!
//! - [`Unit`] / [`UnitSet`]: admissible units for one field
//! - [`LinearRule`] / [`Conversion`]: directed affine conversions
//! - [`ConversionEntry`]: a field with its units, rules, and preferred unit

pub mod entry;
pub mod error;
pub mod rule;
pub mod unit;

pub use entry::ConversionEntry;
pub use error::{ModelError, Result};
pub use rule::{Conversion, LinearRule, LinearTransform};
pub use unit::{Unit, UnitKey, UnitMode, UnitSet};
