//! Token source parsing.
//!
//! A [`TokenParser`] is registered against a file-name pattern (`\.json$` by default). It
//! parses matching files with `serde_json` and hands the document to the [`Normalizer`],
//! optionally with the [`ReferenceQualifier`] as the leaf transform.

use std::path::Path;

use regex::Regex;
use serde_json::Value;

use crate::diagnostics::{to_error_source, Span};
use crate::normalize::Normalizer;
use crate::reference::ReferenceQualifier;
use crate::tree::TokenTree;
use crate::{err_msg, err_src, TokensError};

pub const DEFAULT_SOURCE_PATTERN: &str = r"\.json$";

/// Parses token source files into normalized trees.
#[derive(Debug, Clone)]
pub struct TokenParser {
    pattern: Regex,
    qualifier: Option<ReferenceQualifier>,
}

impl Default for TokenParser {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TokenParser {
    pub fn new(qualify: bool) -> Self {
        Self {
            pattern: default_pattern(),
            qualifier: qualify.then(ReferenceQualifier::default),
        }
    }

    /// Parser that qualifies references with a custom qualifier.
    pub fn with_qualifier(qualifier: ReferenceQualifier) -> Self {
        Self {
            pattern: default_pattern(),
            qualifier: Some(qualifier),
        }
    }

    pub fn without_qualifier() -> Self {
        Self::new(false)
    }

    /// Replaces the file-name pattern this parser is registered against.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, TokensError> {
        self.pattern = Regex::new(pattern)
            .map_err(|e| err_msg!(Config, "invalid source pattern '{}'", pattern).caused_by(e))?;
        Ok(self)
    }

    pub fn qualifies(&self) -> bool {
        self.qualifier.is_some()
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.pattern.is_match(&path.to_string_lossy())
    }

    /// Parses `contents` (named `name` in diagnostics) and normalizes it.
    pub fn parse(&self, name: &str, contents: &str) -> Result<TokenTree, TokensError> {
        let document = parse_document(name, contents)?;
        Ok(self.normalize(&document))
    }

    /// Reads and parses a file from disk.
    pub fn parse_file(&self, path: &Path) -> Result<TokenTree, TokensError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            err_msg!(Io, "failed to read token file '{}'", path.display()).caused_by(e)
        })?;
        self.parse(&path.display().to_string(), &contents)
    }

    pub fn normalize(&self, document: &Value) -> TokenTree {
        match &self.qualifier {
            Some(qualifier) => Normalizer::with_transform(qualifier.clone()).normalize(document),
            None => Normalizer::new().normalize(document),
        }
    }
}

fn default_pattern() -> Regex {
    Regex::new(DEFAULT_SOURCE_PATTERN).expect("default source pattern is a valid regex")
}

/// Parses raw JSON, mapping syntax errors to a diagnostic that points into the file.
pub fn parse_document(name: &str, contents: &str) -> Result<Value, TokensError> {
    serde_json::from_str(contents).map_err(|e| {
        let source = to_error_source(name, contents);
        let span = Span::from_line_col(contents, e.line(), e.column());
        let message = format!("invalid JSON in '{}': {}", name, describe(&e));
        err_src!(Parse, message, &source, span)
            .with_help("token files must be valid JSON; check for trailing commas or comments")
            .caused_by(e)
    })
}

fn describe(error: &serde_json::Error) -> &'static str {
    use serde_json::error::Category;

    match error.classify() {
        Category::Syntax => "syntax error",
        Category::Eof => "unexpected end of file",
        Category::Data => "unexpected data",
        Category::Io => "read failure",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::diagnostics::ErrorType;

    #[test]
    fn parses_and_qualifies() {
        let tree = TokenParser::default()
            .parse(
                "colors.json",
                r#"{"colors": {"brand": {"$value": "{primary.700}", "$type": "color"}}}"#,
            )
            .unwrap();
        assert_eq!(
            tree.to_value(),
            json!({"colors": {"brand": {"value": "{colors.primary.700}", "type": "color"}}})
        );
    }

    #[test]
    fn unqualified_variant_keeps_shorthand() {
        let tree = TokenParser::without_qualifier()
            .parse("colors.json", r#"{"colors": {"brand": {"$value": "{primary.700}"}}}"#)
            .unwrap();
        assert_eq!(tree.to_value(), json!({"colors": {"brand": {"value": "{primary.700}"}}}));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let err = TokenParser::default()
            .parse("tokens/broken.json", "{\n  \"colors\": {,\n}")
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert_eq!(err.source_name(), Some("tokens/broken.json"));
        assert!(err.message().contains("tokens/broken.json"));
    }

    #[test]
    fn pattern_matching() {
        let parser = TokenParser::default();
        assert!(parser.matches(Path::new("tokens/colors.json")));
        assert!(!parser.matches(Path::new("tokens/colors.yaml")));
        assert!(!parser.matches(Path::new("tokens/colors.json.bak")));

        let custom = TokenParser::default().with_pattern(r"\.tokens\.json$").unwrap();
        assert!(custom.matches(Path::new("brand.tokens.json")));
        assert!(!custom.matches(Path::new("brand.json")));
        assert!(TokenParser::default().with_pattern("(").is_err());
    }
}
