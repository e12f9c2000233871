//! Configuration documents embedded at compile time.

/// Draft-07 schema for unit conversion configuration files.
pub const UNIT_CONVERSION_SCHEMA: &str = include_str!("../schemas/unit_conversion.schema.json");

/// Sample configuration covering linear, denominator, and alias rules.
pub const SAMPLE_UNIT_CONVERSION: &str = include_str!("../schemas/unit_conversion.json");
