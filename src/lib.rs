//! tokensmith: design-token build tool.
//!
//! Reads DTCG-style JSON token files (`$value` / `$type` / `$description`), normalizes them
//! into a [`TokenTree`] while qualifying shorthand references inside the `colors` namespace,
//! and renders the merged result through named [`formats`](crate::formats).
//!
//! - [`normalize()`] / [`Normalizer`]: metadata stripping and token/group classification
//! - [`ReferenceQualifier`]: `{primary.700}` -> `{colors.primary.700}`
//! - [`TokenParser`]: JSON parsing with file-aware diagnostics
//! - [`BuildPipeline`]: config-driven discovery, merge, resolution and output

pub use crate::diagnostics::{ErrorContext, ErrorType, TokensError};

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod dictionary;
pub mod discovery;
pub mod engine;
pub mod formats;
pub mod normalize;
pub mod parser;
pub mod reference;
pub mod transforms;
pub mod tree;

pub use config::BuildConfig;
pub use dictionary::Dictionary;
pub use engine::{BuildMode, BuildPipeline, BuildReport};
pub use normalize::{normalize, Normalizer};
pub use parser::TokenParser;
pub use reference::{ReferenceQualifier, ValueTransform};
pub use tree::{Token, TokenNode, TokenPath, TokenTree};
