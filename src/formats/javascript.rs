//! `javascript/es6`: one `export const` per token.

use super::{block_comment_header, Format, FormatContext};
use crate::dictionary::Dictionary;
use crate::transforms::token_name;
use crate::{err_msg, TokensError};

#[derive(Debug, Clone, Copy, Default)]
pub struct JavascriptEs6;

impl Format for JavascriptEs6 {
    fn name(&self) -> &'static str {
        "javascript/es6"
    }

    fn render(&self, dictionary: &Dictionary, ctx: &FormatContext<'_>) -> Result<String, TokensError> {
        let mut out = block_comment_header(ctx.options);
        for token in dictionary.tokens() {
            let name = token_name(ctx.transform_group, &token.path);
            let value = serde_json::to_string(&token.value).map_err(|e| {
                err_msg!(Format, "cannot serialize '{}' for {}", token.path, ctx.destination)
                    .caused_by(e)
            })?;
            if let Some(description) = token.description_str() {
                out.push_str(&format!("// {}\n", description.replace('\n', " ")));
            }
            out.push_str(&format!("export const {name} = {value};\n"));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::{FormatOptions, TransformGroup};
    use crate::normalize::normalize;

    #[test]
    fn exports_resolved_values() {
        let doc = json!({
            "colors": {"primary": {"700": {"$value": "#ff0000", "$description": "Brand red"}},
                       "brand": {"$value": "{primary.700}"}},
            "spacing": {"md": {"$value": 8}}
        });
        let dictionary = Dictionary::from_tree(&normalize(&doc, true)).unwrap();
        let options = FormatOptions::default();
        let ctx = FormatContext {
            destination: "tokens.js",
            transform_group: TransformGroup::Js,
            options: &options,
        };
        let js = JavascriptEs6.render(&dictionary, &ctx).unwrap();
        assert!(js.starts_with("/**\n * Do not edit directly"));
        assert!(js.contains("// Brand red\nexport const ColorsPrimary700 = \"#ff0000\";\n"));
        assert!(js.contains("export const ColorsBrand = \"#ff0000\";\n"));
        assert!(js.contains("export const SpacingMd = 8;\n"));
    }
}
