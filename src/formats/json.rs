//! `json/flat`: a single object mapping dotted token paths to resolved values.

use serde_json::{Map, Value};

use super::{Format, FormatContext};
use crate::dictionary::Dictionary;
use crate::{err_msg, TokensError};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFlat;

impl Format for JsonFlat {
    fn name(&self) -> &'static str {
        "json/flat"
    }

    fn render(&self, dictionary: &Dictionary, ctx: &FormatContext<'_>) -> Result<String, TokensError> {
        let flat: Map<String, Value> = dictionary
            .tokens()
            .iter()
            .map(|token| (token.path.dotted(), token.value.clone()))
            .collect();
        let mut out = serde_json::to_string_pretty(&Value::Object(flat)).map_err(|e| {
            err_msg!(Format, "cannot serialize {}", ctx.destination).caused_by(e)
        })?;
        out.push('\n');
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
    fn maps_dotted_paths_to_resolved_values() {
        let doc = json!({
            "colors": {"primary": {"700": {"$value": "#ff0000"}}, "brand": {"$value": "{primary.700}"}},
            "spacing": {"md": {"$value": 8}}
        });
        let dictionary = Dictionary::from_tree(&normalize(&doc, true)).unwrap();
        let options = FormatOptions::default();
        let ctx = FormatContext {
            destination: "tokens.flat.json",
            transform_group: TransformGroup::Js,
            options: &options,
        };
        let rendered = JsonFlat.render(&dictionary, &ctx).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            parsed,
            json!({"colors.primary.700": "#ff0000", "colors.brand": "#ff0000", "spacing.md": 8})
        );
        let keys: Vec<_> = parsed.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["colors.primary.700", "colors.brand", "spacing.md"]);
    }
}
