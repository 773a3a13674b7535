//! Output formats.
//!
//! A [`Format`] turns a resolved [`Dictionary`] into the contents of one output file. Formats
//! are looked up by name (`css/variables`, `javascript/es6`, `json/flat`) in a
//! [`FormatRegistry`], which is built once at the entry point and passed by reference.

use std::collections::BTreeMap;

use crate::config::{FormatOptions, TransformGroup};
use crate::dictionary::Dictionary;
use crate::TokensError;

pub mod css;
pub mod javascript;
pub mod json;

pub use css::CssVariables;
pub use javascript::JavascriptEs6;
pub use json::JsonFlat;

/// Everything a format needs besides the dictionary.
#[derive(Debug, Clone)]
pub struct FormatContext<'a> {
    pub destination: &'a str,
    pub transform_group: TransformGroup,
    pub options: &'a FormatOptions,
}

pub trait Format {
    fn name(&self) -> &'static str;

    fn render(&self, dictionary: &Dictionary, ctx: &FormatContext<'_>) -> Result<String, TokensError>;
}

#[derive(Default)]
pub struct FormatRegistry {
    formats: BTreeMap<&'static str, Box<dyn Format>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the three built-in formats.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CssVariables));
        registry.register(Box::new(JavascriptEs6));
        registry.register(Box::new(JsonFlat));
        registry
    }

    pub fn register(&mut self, format: Box<dyn Format>) {
        self.formats.insert(format.name(), format);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Format> {
        self.formats.get(name).map(|f| f.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.formats.keys().copied().collect()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

pub(crate) const HEADER_LINES: [&str; 2] = [
    "Do not edit directly, this file was auto-generated.",
    "Generated by tokensmith.",
];

/// `/** ... */` banner used by the CSS and JS formats.
pub(crate) fn block_comment_header(options: &FormatOptions) -> String {
    if !options.file_header {
        return String::new();
    }
    let mut header = String::from("/**\n");
    for line in HEADER_LINES {
        header.push_str(" * ");
        header.push_str(line);
        header.push('\n');
    }
    header.push_str(" */\n\n");
    header
}
