//! `css/variables`: one custom property per token under `:root`.

use serde_json::Value;

use super::{block_comment_header, Format, FormatContext};
use crate::dictionary::{Dictionary, FlatToken};
use crate::reference::REFERENCE_PATTERN;
use crate::transforms::token_name;
use crate::tree::TokenPath;
use crate::TokensError;

#[derive(Debug, Clone, Copy, Default)]
pub struct CssVariables;

impl Format for CssVariables {
    fn name(&self) -> &'static str {
        "css/variables"
    }

    fn render(&self, dictionary: &Dictionary, ctx: &FormatContext<'_>) -> Result<String, TokensError> {
        let mut out = block_comment_header(ctx.options);
        out.push_str(":root {\n");
        for token in dictionary.tokens() {
            let name = token_name(ctx.transform_group, &token.path);
            let value = if ctx.options.output_references {
                referenced_value(token, ctx)
            } else {
                css_value(&token.value)
            };
            out.push_str(&format!("  --{name}: {value};"));
            if let Some(description) = token.description_str() {
                out.push_str(&format!(" /* {} */", description.replace("*/", "* /")));
            }
            out.push('\n');
        }
        out.push_str("}\n");
        Ok(out)
    }
}

/// The original value with every reference rewritten to `var(--target)`. Values without
/// references fall back to the resolved value.
fn referenced_value(token: &FlatToken, ctx: &FormatContext<'_>) -> String {
    match &token.original_value {
        Value::String(text) if REFERENCE_PATTERN.is_match(text) => REFERENCE_PATTERN
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let target = TokenPath::parse(&caps[1]);
                format!("var(--{})", token_name(ctx.transform_group, &target))
            })
            .into_owned(),
        _ => css_value(&token.value),
    }
}

fn css_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(css_value).collect::<Vec<_>>().join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
