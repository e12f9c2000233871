//! Unit conversion CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;
use unitconv_cli::commands::{
    ConvertOptions, RegistrySource, run_convert, run_fields, run_validate,
};
use unitconv_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod summary;

use crate::cli::{Cli, Command, ConvertArgs, LogFormatArg, LogLevelArg, RegistryArgs};
use crate::summary::{print_convert_summary, print_fields, print_validation};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Convert(args) => match run_convert(&convert_options(args)) {
            Ok(report) => {
                print_convert_summary(&report);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Validate(args) => match run_validate(&registry_source(args)) {
            Ok(report) => {
                print_validation(&report);
                if report.is_valid() { 0 } else { 1 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Fields(args) => match run_fields(&registry_source(args)) {
            Ok(registry) => {
                print_fields(&registry);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn registry_source(args: RegistryArgs) -> RegistrySource {
    RegistrySource {
        config: args.config,
        schema: args.schema,
    }
}

fn convert_options(args: ConvertArgs) -> ConvertOptions {
    ConvertOptions {
        input: args.input,
        registry: registry_source(args.registry),
        output: args.output,
        coded_values: args.coded_values,
        all_coded: args.all_coded,
        dry_run: args.dry_run,
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
