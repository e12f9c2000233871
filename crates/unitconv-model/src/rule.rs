//! Directed conversion rules between two units of one field.

use serde::{Deserialize, Serialize};

use crate::unit::Unit;

/// Affine transform `y = multiplier * x + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTransform {
    pub multiplier: f64,
    pub offset: f64,
}

impl Default for LinearTransform {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            offset: 0.0,
        }
    }
}

impl LinearTransform {
    pub fn new(multiplier: f64, offset: f64) -> Self {
        Self { multiplier, offset }
    }

    pub fn apply(&self, value: f64) -> f64 {
        self.multiplier * value + self.offset
    }

    /// Apply `multiplier * value / denominator + offset`.
    ///
    /// Returns `None` when the denominator is zero or NaN, or when the
    /// result is not finite.
    pub fn apply_with_denominator(&self, value: f64, denominator: f64) -> Option<f64> {
        if denominator.is_nan() || denominator == 0.0 {
            return None;
        }
        let converted = self.multiplier * value / denominator + self.offset;
        converted.is_finite().then_some(converted)
    }
}

/// The numeric action a rule performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Conversion {
    /// Declared equivalence with no numeric action (e.g. unit aliases).
    None,
    Linear(LinearTransform),
    /// Linear transform applied to `value / denominator`, where the
    /// denominator is read from `denominator_field_name` per record.
    LinearWithDenominator {
        #[serde(flatten)]
        transform: LinearTransform,
        denominator_field_name: String,
    },
}

impl Conversion {
    pub fn transform(&self) -> Option<&LinearTransform> {
        match self {
            Self::None => None,
            Self::Linear(transform) | Self::LinearWithDenominator { transform, .. } => {
                Some(transform)
            }
        }
    }

    pub fn requires_denominator(&self) -> bool {
        matches!(self, Self::LinearWithDenominator { .. })
    }

    pub fn denominator_field_name(&self) -> Option<&str> {
        match self {
            Self::LinearWithDenominator {
                denominator_field_name,
                ..
            } => Some(denominator_field_name),
            _ => None,
        }
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Linear(_) => "linear",
            Self::LinearWithDenominator { .. } => "linear_with_denominator",
        }
    }
}

/// A one-directional conversion from `from_unit` to `to_unit`.
///
/// The reverse direction must be declared as its own rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRule {
    pub from_unit: Unit,
    pub to_unit: Unit,
    pub conversion: Conversion,
    pub note: Option<String>,
}

impl LinearRule {
    pub fn new(from_unit: Unit, to_unit: Unit, conversion: Conversion) -> Self {
        Self {
            from_unit,
            to_unit,
            conversion,
            note: None,
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn requires_denominator(&self) -> bool {
        self.conversion.requires_denominator()
    }

    pub fn denominator_field_name(&self) -> Option<&str> {
        self.conversion.denominator_field_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_transform_applies_multiplier_then_offset() {
        let fahrenheit = LinearTransform::new(1.8, 32.0);
        assert!((fahrenheit.apply(100.0) - 212.0).abs() < 1e-9);
        assert_eq!(LinearTransform::default().apply(7.5), 7.5);
    }

    #[test]
    fn zero_or_nan_denominator_is_undefined() {
        let per_kg = LinearTransform::new(1.0, 0.0);
        assert_eq!(per_kg.apply_with_denominator(10.0, 0.0), None);
        assert_eq!(per_kg.apply_with_denominator(10.0, f64::NAN), None);
        assert_eq!(per_kg.apply_with_denominator(10.0, 4.0), Some(2.5));
    }

    #[test]
    fn non_finite_denominator_result_is_undefined() {
        let per_kg = LinearTransform::new(1.0, 0.0);
        assert_eq!(per_kg.apply_with_denominator(1e308, 1e-10), None);
        assert_eq!(per_kg.apply_with_denominator(f64::INFINITY, 2.0), None);
        assert_eq!(per_kg.apply_with_denominator(1e308, f64::INFINITY), Some(0.0));
    }

    #[test]
    fn only_denominator_variant_requires_denominator() {
        let with_denominator = Conversion::LinearWithDenominator {
            transform: LinearTransform::default(),
            denominator_field_name: "weight".to_string(),
        };
        assert!(with_denominator.requires_denominator());
        assert_eq!(with_denominator.denominator_field_name(), Some("weight"));
        assert!(!Conversion::Linear(LinearTransform::default()).requires_denominator());
        assert_eq!(Conversion::None.transform(), None);
    }
}
