//! Shorthand reference qualification.
//!
//! Token sources exported from design tools refer to sibling primitives with shorthand such as
//! `{primary.700}`. The formatting stage resolves references from the document root, so inside
//! the `colors` subtree those shorthands are rewritten to `{colors.primary.700}`. References
//! that already start with a known root are left alone, which makes the rewrite idempotent.
//! Only the `colors` namespace is qualified; other roots are expected to be written in full.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::tree::TokenPath;

/// Root namespaces whose references are already fully qualified.
pub const QUALIFIED_ROOTS: [&str; 6] = [
    "colors",
    "typography",
    "spacing",
    "borderRadius",
    "shadows",
    "transitions",
];

/// The only namespace whose shorthand references are expanded.
pub const DEFAULT_NAMESPACE_ROOT: &str = "colors";

lazy_static! {
    /// `{...}` with no braces inside. An unmatched `{` stays literal and for `{a{b}}` only
    /// the innermost `{b}` is a reference.
    pub static ref REFERENCE_PATTERN: Regex =
        Regex::new(r"\{([^{}]+)\}").expect("reference pattern is a valid regex");
}

/// Returns the inner content of every reference in `text`, in order of appearance.
pub fn references(text: &str) -> impl Iterator<Item = &str> + '_ {
    REFERENCE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// True when `text` consists of exactly one reference and nothing else.
pub fn single_reference(text: &str) -> Option<&str> {
    let caps = REFERENCE_PATTERN.captures(text)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 && whole.end() == text.len() {
        caps.get(1).map(|m| m.as_str())
    } else {
        None
    }
}

// ============================================================================
// VALUE TRANSFORMS
// ============================================================================

/// Leaf-value hook run by the normalizer before a token's value is copied.
pub trait ValueTransform {
    fn transform(&self, value: Value, path: &TokenPath) -> Value;
}

/// Copies values through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ValueTransform for Identity {
    fn transform(&self, value: Value, _path: &TokenPath) -> Value {
        value
    }
}

impl<F> ValueTransform for F
where
    F: Fn(Value, &TokenPath) -> Value,
{
    fn transform(&self, value: Value, path: &TokenPath) -> Value {
        self(value, path)
    }
}

// ============================================================================
// QUALIFIER
// ============================================================================

/// Rewrites shorthand references to fully qualified ones.
#[derive(Debug, Clone)]
pub struct ReferenceQualifier {
    namespace_root: String,
    qualified_roots: Vec<String>,
}

impl Default for ReferenceQualifier {
    fn default() -> Self {
        Self {
            namespace_root: DEFAULT_NAMESPACE_ROOT.to_string(),
            qualified_roots: QUALIFIED_ROOTS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl ReferenceQualifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualifier for a different namespace root and root list. The namespace root is always
    /// treated as qualified itself.
    pub fn with_roots(
        namespace_root: impl Into<String>,
        qualified_roots: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let namespace_root = namespace_root.into();
        let mut qualified_roots: Vec<String> =
            qualified_roots.into_iter().map(Into::into).collect();
        if !qualified_roots.contains(&namespace_root) {
            qualified_roots.push(namespace_root.clone());
        }
        Self {
            namespace_root,
            qualified_roots,
        }
    }

    pub fn namespace_root(&self) -> &str {
        &self.namespace_root
    }

    /// Whether reference content such as `colors.primary.700` already starts with a known root.
    pub fn is_qualified(&self, reference: &str) -> bool {
        self.qualified_roots.iter().any(|root| {
            reference
                .strip_prefix(root.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Qualifies a token value owned by the token at `path`. Non-string values pass through.
    pub fn qualify(&self, value: Value, path: &TokenPath) -> Value {
        match value {
            Value::String(text) => {
                let rewritten = match self.qualify_str(&text, path) {
                    Cow::Borrowed(_) => None,
                    Cow::Owned(rewritten) => Some(rewritten),
                };
                Value::String(rewritten.unwrap_or(text))
            }
            other => other,
        }
    }

    pub fn qualify_str<'t>(&self, text: &'t str, path: &TokenPath) -> Cow<'t, str> {
        if path.first() != Some(self.namespace_root.as_str()) {
            return Cow::Borrowed(text);
        }
        REFERENCE_PATTERN.replace_all(text, |caps: &Captures<'_>| {
            let reference = &caps[1];
            if self.is_qualified(reference) {
                caps[0].to_string()
            } else {
                format!("{{{}.{}}}", self.namespace_root, reference)
            }
        })
    }
}

impl ValueTransform for ReferenceQualifier {
    fn transform(&self, value: Value, path: &TokenPath) -> Value {
        self.qualify(value, path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn qualify(value: Value, path: &str) -> Value {
        ReferenceQualifier::new().qualify(value, &TokenPath::parse(path))
    }

    #[test]
    fn shorthand_inside_colors_is_qualified() {
        assert_eq!(
            qualify(json!("{primary.700}"), "colors.semantic.brand"),
            json!("{colors.primary.700}")
        );
    }

    #[test]
    fn semantic_shorthand_is_qualified_too() {
        assert_eq!(
            qualify(json!("{semantic.brand.primary}"), "colors.action.default"),
            json!("{colors.semantic.brand.primary}")
        );
    }

    #[test]
    fn already_qualified_is_untouched() {
        for reference in [
            "{colors.primary.700}",
            "{typography.body.size}",
            "{spacing.md}",
            "{borderRadius.sm}",
            "{shadows.lg}",
            "{transitions.fast}",
        ] {
            assert_eq!(qualify(json!(reference), "colors.x"), json!(reference));
        }
    }

    #[test]
    fn qualification_is_idempotent() {
        let once = qualify(json!("{primary.700}"), "colors.semantic.brand");
        let twice = qualify(once.clone(), "colors.semantic.brand");
        assert_eq!(once, twice);
        assert_eq!(twice, json!("{colors.primary.700}"));
    }

    #[test]
    fn other_roots_are_left_alone() {
        assert_eq!(
            qualify(json!("{primary.700}"), "typography.heading"),
            json!("{primary.700}")
        );
        assert_eq!(
            qualify(json!("{fontSizes.lg}"), "typography.heading"),
            json!("{fontSizes.lg}")
        );
    }

    #[test]
    fn prefix_must_end_with_dot() {
        // `colorsExtra` is not the `colors` root.
        assert_eq!(
            qualify(json!("{colorsExtra.red}"), "colors.alias"),
            json!("{colors.colorsExtra.red}")
        );
    }

    #[test]
    fn every_reference_in_a_string_is_rewritten() {
        assert_eq!(
            qualify(
                json!("0 1px 2px {neutral.900} / {colors.alpha.50}"),
                "colors.shadow"
            ),
            json!("0 1px 2px {colors.neutral.900} / {colors.alpha.50}")
        );
    }

    #[test]
    fn non_strings_pass_through() {
        assert_eq!(qualify(json!(16), "colors.size"), json!(16));
        assert_eq!(qualify(json!(null), "colors.size"), json!(null));
        assert_eq!(
            qualify(json!({"x": "{a.b}"}), "colors.composite"),
            json!({"x": "{a.b}"})
        );
    }

    #[test]
    fn malformed_braces() {
        assert_eq!(qualify(json!("{primary.700"), "colors.a"), json!("{primary.700"));
        assert_eq!(qualify(json!("{}"), "colors.a"), json!("{}"));
        assert_eq!(qualify(json!("{a{b}}"), "colors.a"), json!("{a{colors.b}}"));
    }

    #[test]
    fn custom_roots() {
        let qualifier = ReferenceQualifier::with_roots("palette", ["sizes"]);
        let path = TokenPath::parse("palette.brand");
        assert_eq!(
            qualifier.qualify(json!("{blue.500}"), &path),
            json!("{palette.blue.500}")
        );
        assert_eq!(
            qualifier.qualify(json!("{palette.blue.500}"), &path),
            json!("{palette.blue.500}")
        );
        assert_eq!(
            qualifier.qualify(json!("{colors.blue}"), &path),
            json!("{palette.colors.blue}")
        );
    }

    #[test]
    fn reference_helpers() {
        assert_eq!(
            references("{a.b} and {c}").collect::<Vec<_>>(),
            vec!["a.b", "c"]
        );
        assert_eq!(single_reference("{a.b}"), Some("a.b"));
        assert_eq!(single_reference(" {a.b}"), None);
        assert_eq!(single_reference("{a}{b}"), None);
    }
}
