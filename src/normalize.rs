//! Normalization of raw DTCG token documents.
//!
//! Walks a parsed document, skips `$`-prefixed metadata keys and classifies every structured
//! child: a node carrying `$value` becomes a [`Token`], anything else is recursed into as a
//! group. Scalars sitting next to groups are dropped.

use serde_json::Value;

use crate::reference::{Identity, ReferenceQualifier, ValueTransform};
use crate::tree::{Token, TokenNode, TokenPath, TokenTree};

/// Prefix that marks a key as metadata of its parent.
pub const METADATA_SENTINEL: char = '$';

pub const VALUE_KEY: &str = "$value";
pub const TYPE_KEY: &str = "$type";
pub const DESCRIPTION_KEY: &str = "$description";

pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with(METADATA_SENTINEL)
}

/// Recursive normalizer, parameterized by the transform applied to each leaf value.
#[derive(Debug, Clone, Default)]
pub struct Normalizer<T = Identity> {
    transform: T,
}

impl Normalizer<Identity> {
    pub fn new() -> Self {
        Self {
            transform: Identity,
        }
    }
}

impl Normalizer<ReferenceQualifier> {
    pub fn qualifying() -> Self {
        Self::with_transform(ReferenceQualifier::default())
    }
}

impl<T: ValueTransform> Normalizer<T> {
    pub fn with_transform(transform: T) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Normalizes a whole document. An array root is keyed by index; a scalar root yields an
    /// empty tree.
    pub fn normalize(&self, document: &Value) -> TokenTree {
        self.normalize_at(document, &TokenPath::root())
    }

    /// Normalizes `node` as if it sat at `path`.
    pub fn normalize_at(&self, node: &Value, path: &TokenPath) -> TokenTree {
        let mut tree = TokenTree::new();
        for (key, child) in structured_children(node) {
            if is_metadata_key(&key) {
                continue;
            }
            let child_path = path.child(&key);
            let normalized = match child.get(VALUE_KEY) {
                Some(value) => TokenNode::Token(self.token(child, value, &child_path)),
                None => TokenNode::Group(self.normalize_at(child, &child_path)),
            };
            tree.insert(key, normalized);
        }
        tree
    }

    fn token(&self, node: &Value, value: &Value, path: &TokenPath) -> Token {
        Token {
            value: self.transform.transform(value.clone(), path),
            token_type: node.get(TYPE_KEY).cloned(),
            description: node.get(DESCRIPTION_KEY).cloned(),
        }
    }
}

/// Children of an object or array that are themselves objects or arrays. Array elements are
/// keyed by their index.
fn structured_children(node: &Value) -> Vec<(String, &Value)> {
    let is_structured = |v: &Value| v.is_object() || v.is_array();
    match node {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| is_structured(v))
            .map(|(k, v)| (k.clone(), v))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| is_structured(v))
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalizes `document`, optionally running the reference qualifier over every leaf value.
pub fn normalize(document: &Value, qualify: bool) -> TokenTree {
    if qualify {
        Normalizer::qualifying().normalize(document)
    } else {
        Normalizer::new().normalize(document)
    }
}
