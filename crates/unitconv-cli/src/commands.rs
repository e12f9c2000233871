//! Subcommand implementations.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use tracing::{info, info_span};

use unitconv_core::{ConverterConfig, DatasetSummary, UnitConverter};
use unitconv_model::UnitMode;
use unitconv_registry::{ConversionRegistry, RegistryError, Violation};

/// Where to find a registry configuration and its schema.
#[derive(Debug, Clone)]
pub struct RegistrySource {
    pub config: PathBuf,
    /// Bundled schema when `None`.
    pub schema: Option<PathBuf>,
}

impl RegistrySource {
    pub fn load(&self) -> std::result::Result<ConversionRegistry, RegistryError> {
        ConversionRegistry::from_config_path(&self.config, self.schema.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub registry: RegistrySource,
    pub output: Option<PathBuf>,
    pub coded_values: Vec<String>,
    pub all_coded: bool,
    pub dry_run: bool,
}

impl ConvertOptions {
    pub fn converter_config(&self) -> ConverterConfig {
        let default_mode = if self.all_coded {
            UnitMode::CodedValue
        } else {
            UnitMode::Label
        };
        self.coded_values
            .iter()
            .fold(ConverterConfig::uniform(default_mode), |config, field| {
                config.with_field_mode(field.as_str(), UnitMode::CodedValue)
            })
    }

    /// Output path, defaulting to `<stem>_converted.csv` beside the input.
    pub fn output_path(&self) -> PathBuf {
        if let Some(path) = &self.output {
            return path.clone();
        }
        let stem = self
            .input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        self.input.with_file_name(format!("{stem}_converted.csv"))
    }
}

#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub input: PathBuf,
    /// `None` on a dry run.
    pub output: Option<PathBuf>,
    pub rows: usize,
    pub summary: DatasetSummary,
}

pub fn run_convert(options: &ConvertOptions) -> Result<ConvertReport> {
    let span = info_span!("convert", input = %options.input.display());
    let _guard = span.enter();

    let registry = options
        .registry
        .load()
        .with_context(|| format!("load registry {}", options.registry.config.display()))?;
    let converter = UnitConverter::with_config(&registry, options.converter_config());

    let mut df = read_csv(&options.input)?;
    info!(rows = df.height(), columns = df.width(), "read dataset");
    let summary = converter
        .convert_dataframe_in_place(&mut df)
        .with_context(|| format!("convert {}", options.input.display()))?;

    let output = if options.dry_run {
        info!("dry run, output not written");
        None
    } else {
        let path = options.output_path();
        write_csv(&mut df, &path)?;
        info!(output = %path.display(), "wrote dataset");
        Some(path)
    };

    Ok(ConvertReport {
        input: options.input.clone(),
        output,
        rows: df.height(),
        summary,
    })
}

/// Outcome of validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReport {
    Valid {
        entries: usize,
    },
    Invalid {
        message: String,
        violations: Vec<Violation>,
    },
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Load the registry and report why it is rejected, if it is.
///
/// Unreadable or unparsable files are errors rather than reports.
pub fn run_validate(source: &RegistrySource) -> Result<ValidationReport> {
    let _guard = info_span!("validate", config = %source.config.display()).entered();
    match source.load() {
        Ok(registry) => Ok(ValidationReport::Valid {
            entries: registry.len(),
        }),
        Err(error @ (RegistryError::Io { .. } | RegistryError::Json { .. })) => {
            Err(error).context("read configuration")
        }
        Err(error) => {
            let rendered = error.to_string();
            let message = rendered.lines().next().unwrap_or_default().to_string();
            Ok(ValidationReport::Invalid {
                message,
                violations: error.violations().to_vec(),
            })
        }
    }
}

pub fn run_fields(source: &RegistrySource) -> Result<ConversionRegistry> {
    source
        .load()
        .with_context(|| format!("load registry {}", source.config.display()))
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("open csv {}", path.display()))?
        .finish()
        .with_context(|| format!("read csv {}", path.display()))
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write csv {}", path.display()))
}
