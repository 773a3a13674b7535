//! Defines the command-line arguments and subcommands for the tokensmith CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "tokensmith",
    version,
    about = "Build CSS variables, JS modules and flat JSON from DTCG design-token files."
)]
pub struct TokensArgs {
    /// Log debug output (overrides TOKENSMITH_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover sources, normalize and merge them, then write every platform's files.
    Build {
        /// Config file; defaults to tokens.config.{yaml,yml,json} in the current directory.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Do not write anything; fail if any output is missing or out of date.
        #[arg(long)]
        check: bool,
    },
    /// Print the normalized tree of a single token file as JSON.
    Normalize {
        /// The token file to normalize.
        #[arg(required = true)]
        file: PathBuf,
        /// Leave shorthand references as written.
        #[arg(long)]
        no_qualify: bool,
    },
    /// Qualify the references in a value as if it belonged to the token at --path.
    Qualify {
        /// The value, e.g. "{primary.700}".
        #[arg(required = true)]
        value: String,
        /// Dotted path of the owning token, e.g. colors.semantic.brand.
        #[arg(short, long)]
        path: String,
    },
    /// Write the default config file.
    Init {
        /// Where to write the config.
        #[arg(short, long, default_value = "tokens.config.yaml")]
        config: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// List all available output formats.
    ListFormats,
}
