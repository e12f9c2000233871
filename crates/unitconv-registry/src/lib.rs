//! Registry of unit conversion entries loaded from JSON configuration.
//!
//! Loading runs in stages, each of which aborts construction:
//!
//! 1. the schema is compiled and checked against the Draft-07 meta-schema
//! 2. the configuration is validated against the schema, collecting every violation
//! 3. `field_name` uniqueness is checked across entries
//! 4. unit references (`preferred_unit`, rule `from_unit`/`to_unit`) are resolved
//! 5. unit sets and rules are built into [`ConversionEntry`] values
//!
//! # Example
//!
//! ```rust,ignore
//! use unitconv_registry::ConversionRegistry;
//!
//! let registry = ConversionRegistry::from_paths(
//!     Path::new("units/unit_conversion.json"),
//!     Path::new("units/unit_conversion.schema.json"),
//! )?;
//! assert_eq!(registry.unit_field_name("demog_height"), Some("demog_height_units"));
//! ```

pub mod embedded;
pub mod error;
pub mod record;
pub mod registry;
pub mod schema;

pub use error::{RegistryError, Result, Violation};
pub use registry::ConversionRegistry;
pub use schema::ConfigSchema;
pub use unitconv_model::ConversionEntry;
