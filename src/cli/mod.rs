//! The tokensmith Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, TokensArgs};
use crate::config::BuildConfig;
use crate::engine::{BuildMode, BuildPipeline};
use crate::formats::FormatRegistry;
use crate::parser::TokenParser;
use crate::reference::ReferenceQualifier;
use crate::tree::TokenPath;
use crate::{err_msg, TokensError};

pub mod args;
pub mod output;

/// Environment variable holding the log filter, e.g. `TOKENSMITH_LOG=tokensmith=debug`.
pub const LOG_ENV: &str = "TOKENSMITH_LOG";

/// The main entry point for the CLI.
pub fn run() {
    let args = TokensArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Build { config, check } => handle_build(config, check),
        Command::Normalize { file, no_qualify } => handle_normalize(&file, !no_qualify),
        Command::Qualify { value, path } => {
            handle_qualify(&value, &path);
            Ok(true)
        }
        Command::Init { config, force } => handle_init(&config, force),
        Command::ListFormats => {
            output::print_formats(&FormatRegistry::standard().names());
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            output::print_error(e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// COMMAND HANDLERS - each returns Ok(false) for a clean "failed" exit
// ============================================================================

fn handle_build(config: Option<PathBuf>, check: bool) -> Result<bool, TokensError> {
    let config_path = match config {
        Some(path) => path,
        None => BuildConfig::discover(Path::new(".")).ok_or_else(|| {
            err_msg!(Config, "no tokens.config.yaml, tokens.config.yml or tokens.config.json found")
                .with_help("run `tokensmith init` to create one")
        })?,
    };
    let config = BuildConfig::load(&config_path)?;
    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let formats = FormatRegistry::standard();
    let mode = if check { BuildMode::Check } else { BuildMode::Write };
    let report = BuildPipeline::new(&formats).with_mode(mode).run(&config, root)?;
    output::print_build_report(&report);
    Ok(report.is_up_to_date())
}

fn handle_normalize(file: &Path, qualify: bool) -> Result<bool, TokensError> {
    let tree = TokenParser::new(qualify).parse_file(file)?;
    let json = serde_json::to_string_pretty(&tree)
        .map_err(|e| err_msg!(Internal, "failed to serialize tree: {}", e).caused_by(e))?;
    println!("{json}");
    Ok(true)
}

fn handle_qualify(value: &str, path: &str) {
    let qualified = ReferenceQualifier::default().qualify_str(value, &TokenPath::parse(path));
    println!("{qualified}");
}

fn handle_init(path: &Path, force: bool) -> Result<bool, TokensError> {
    if path.exists() && !force {
        return Err(err_msg!(Config, "'{}' already exists", path.display())
            .with_help("pass --force to overwrite it"));
    }
    let yaml = BuildConfig::default_config().to_yaml()?;
    std::fs::write(path, yaml)
        .map_err(|e| err_msg!(Io, "failed to write '{}'", path.display()).caused_by(e))?;
    println!("Wrote {}", path.display());
    Ok(true)
}
