//! Flattened, reference-resolved view of a normalized token tree.
//!
//! Formats work on a [`Dictionary`]: one [`FlatToken`] per leaf, in tree order, with both the
//! value as written (`original_value`, references intact) and the fully resolved `value`.

use std::collections::HashMap;

use serde_json::Value;

use crate::reference::{references, single_reference, REFERENCE_PATTERN};
use crate::tree::{TokenNode, TokenPath, TokenTree};
use crate::{err_msg, TokensError};

#[derive(Debug, Clone, PartialEq)]
pub struct FlatToken {
    pub path: TokenPath,
    pub value: Value,
    pub original_value: Value,
    pub token_type: Option<Value>,
    pub description: Option<Value>,
}

impl FlatToken {
    pub fn description_str(&self) -> Option<&str> {
        self.description.as_ref().and_then(Value::as_str)
    }

    /// Reference targets in the original value, when it is a string.
    pub fn references(&self) -> Vec<&str> {
        match &self.original_value {
            Value::String(text) => references(text).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    tokens: Vec<FlatToken>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    /// Flattens `tree` and resolves every reference. Dangling and circular references fail, as
    /// do two tokens whose keys flatten onto the same dotted path (`{"a.b": ..}` next to
    /// `{"a": {"b": ..}}`).
    pub fn from_tree(tree: &TokenTree) -> Result<Self, TokensError> {
        let mut dictionary = Dictionary::default();
        flatten(tree, &TokenPath::root(), &mut dictionary)?;

        let resolved = {
            let mut resolver = Resolver::new(&dictionary);
            dictionary
                .tokens
                .iter()
                .map(|token| resolver.resolve_token(token))
                .collect::<Result<Vec<_>, _>>()?
        };
        for (token, value) in dictionary.tokens.iter_mut().zip(resolved) {
            token.value = value;
        }
        Ok(dictionary)
    }

    pub fn tokens(&self) -> &[FlatToken] {
        &self.tokens
    }

    pub fn get(&self, dotted: &str) -> Option<&FlatToken> {
        self.index.get(dotted).map(|&i| &self.tokens[i])
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolves references against a flattened dictionary. Every token is resolved at most once;
/// later references to it reuse the cached value.
struct Resolver<'d> {
    dictionary: &'d Dictionary,
    resolved: HashMap<String, Value>,
}

impl<'d> Resolver<'d> {
    fn new(dictionary: &'d Dictionary) -> Self {
        Self {
            dictionary,
            resolved: HashMap::new(),
        }
    }

    fn resolve_token(&mut self, token: &FlatToken) -> Result<Value, TokensError> {
        let dotted = token.path.dotted();
        if let Some(value) = self.resolved.get(&dotted) {
            return Ok(value.clone());
        }
        let mut chain = vec![dotted.clone()];
        let value = self.resolve_value(&token.original_value, &mut chain)?;
        self.resolved.insert(dotted, value.clone());
        Ok(value)
    }

    fn resolve_value(
        &mut self,
        value: &Value,
        chain: &mut Vec<String>,
    ) -> Result<Value, TokensError> {
        match value {
            Value::String(text) => self.resolve_str(text, chain),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, chain))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| self.resolve_value(v, chain).map(|resolved| (k.clone(), resolved)))
                .collect::<Result<serde_json::Map<_, _>, _>>()
                .map(Value::Object),
            other => Ok(other.clone()),
        }
    }

    /// A string that is exactly one reference takes the target's value as-is, so numbers stay
    /// numbers. Otherwise each reference is interpolated as text.
    fn resolve_str(&mut self, text: &str, chain: &mut Vec<String>) -> Result<Value, TokensError> {
        if let Some(reference) = single_reference(text) {
            return self.resolve_reference(reference, chain);
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in REFERENCE_PATTERN.captures_iter(text) {
            let (Some(whole), Some(reference)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            match self.resolve_reference(reference.as_str(), chain)? {
                Value::String(s) => out.push_str(&s),
                other => out.push_str(&other.to_string()),
            }
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(Value::String(out))
    }

    fn resolve_reference(
        &mut self,
        reference: &str,
        chain: &mut Vec<String>,
    ) -> Result<Value, TokensError> {
        if chain.iter().any(|seen| seen == reference) {
            let mut cycle = chain.clone();
            cycle.push(reference.to_string());
            return Err(err_msg!(Reference, "circular reference: {}", cycle.join(" -> ")));
        }
        if let Some(value) = self.resolved.get(reference) {
            return Ok(value.clone());
        }

        let dictionary = self.dictionary;
        let Some(target) = dictionary.get(reference) else {
            let owner = chain.first().map(String::as_str).unwrap_or_default();
            return Err(err_msg!(
                Reference,
                "token '{}' references '{{{}}}', which is not a token",
                owner,
                reference
            ));
        };

        chain.push(reference.to_string());
        let resolved = self.resolve_value(&target.original_value, chain);
        chain.pop();
        let resolved = resolved?;
        self.resolved.insert(reference.to_string(), resolved.clone());
        Ok(resolved)
    }
}

fn flatten(
    tree: &TokenTree,
    path: &TokenPath,
    dictionary: &mut Dictionary,
) -> Result<(), TokensError> {
    for (key, node) in tree.iter() {
        let child_path = path.child(key);
        match node {
            TokenNode::Token(token) => {
                let dotted = child_path.dotted();
                if dictionary.index.contains_key(&dotted) {
                    return Err(err_msg!(
                        Reference,
                        "two tokens flatten to '{}'; references to it would be ambiguous",
                        dotted
                    )
                    .with_help("rename the key that contains '.' or nest it as a group instead"));
                }
                dictionary.index.insert(dotted, dictionary.tokens.len());
                dictionary.tokens.push(FlatToken {
                    path: child_path,
                    value: token.value.clone(),
                    original_value: token.value.clone(),
                    token_type: token.token_type.clone(),
                    description: token.description.clone(),
                });
            }
            TokenNode::Group(group) => flatten(group, &child_path, dictionary)?,
        }
    }
    Ok(())
}
