//! Normalized token tree and the path type used while walking it.
//!
//! A [`TokenTree`] is an order-preserving mapping from key to [`TokenNode`]. Leaves are
//! [`Token`] records that serialize to exactly `value`, `type` and `description`; the optional
//! fields are omitted when the source file did not carry them.

use std::collections::HashMap;
use std::fmt;

use im::Vector;
use serde::Serialize;
use serde_json::{Map, Value};

// ============================================================================
// PATHS
// ============================================================================

/// Chain of keys from the document root to a node.
///
/// Backed by a persistent vector so that [`TokenPath::child`] can hand out a fresh path for
/// every sibling without copying or mutating the parent's segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TokenPath {
    segments: Vector<String>,
}

impl TokenPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended by `key`; `self` is left untouched.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push_back(key.to_string());
        Self { segments }
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.front().map(String::as_str)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Joins the segments with `.`, the separator used inside references.
    pub fn dotted(&self) -> String {
        self.segments().collect::<Vec<_>>().join(".")
    }

    /// Parses a dotted path such as `colors.primary.700`. Empty input yields the root path.
    pub fn parse(dotted: &str) -> Self {
        dotted
            .split('.')
            .filter(|s| !s.is_empty())
            .fold(Self::root(), |path, segment| path.child(segment))
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl<'a> FromIterator<&'a str> for TokenPath {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

// ============================================================================
// NODES
// ============================================================================

/// A leaf of the normalized tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub value: Value,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
}

impl Token {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            token_type: None,
            description: None,
        }
    }

    pub fn with_type(mut self, token_type: impl Into<Value>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<Value>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The `$type` as a string, when the source used one.
    pub fn type_str(&self) -> Option<&str> {
        self.token_type.as_ref().and_then(Value::as_str)
    }

    pub fn description_str(&self) -> Option<&str> {
        self.description.as_ref().and_then(Value::as_str)
    }
}

/// Either a token or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenNode {
    Token(Token),
    Group(TokenTree),
}

impl TokenNode {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            TokenNode::Token(token) => Some(token),
            TokenNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&TokenTree> {
        match self {
            TokenNode::Group(group) => Some(group),
            TokenNode::Token(_) => None,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

/// Order-preserving group of named nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenTree {
    entries: Vec<(String, TokenNode)>,
    /// Position of each key in `entries`.
    index: HashMap<String, usize>,
}

impl TokenTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`. A replaced key keeps its original position, and the previous
    /// node is returned.
    pub fn insert(&mut self, key: impl Into<String>, node: TokenNode) -> Option<TokenNode> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, node)),
            None => {
                self.push(key, node);
                None
            }
        }
    }

    fn push(&mut self, key: String, node: TokenNode) {
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, node));
    }

    pub fn get(&self, key: &str) -> Option<&TokenNode> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TokenNode> {
        self.index
            .get(key)
            .map(|&position| &mut self.entries[position].1)
    }

    /// Follows `path` down the tree.
    pub fn lookup(&self, path: &TokenPath) -> Option<&TokenNode> {
        let mut segments = path.segments();
        let mut node = self.get(segments.next()?)?;
        for segment in segments {
            node = node.as_group()?.get(segment)?;
        }
        Some(node)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenNode)> + '_ {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of leaf tokens at any depth.
    pub fn token_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, node)| match node {
                TokenNode::Token(_) => 1,
                TokenNode::Group(group) => group.token_count(),
            })
            .sum()
    }

    /// Deep-merges `other` into `self`. Groups merge recursively; anywhere else the node from
    /// `other` wins. Returns the paths where an existing node was overwritten.
    pub fn merge(&mut self, other: TokenTree) -> Vec<TokenPath> {
        let mut collisions = Vec::new();
        self.merge_at(other, &TokenPath::root(), &mut collisions);
        collisions
    }

    fn merge_at(&mut self, other: TokenTree, path: &TokenPath, collisions: &mut Vec<TokenPath>) {
        for (key, incoming) in other.entries {
            let child_path = path.child(&key);
            let Some(&position) = self.index.get(&key) else {
                self.push(key, incoming);
                continue;
            };
            match (&mut self.entries[position].1, incoming) {
                (TokenNode::Group(existing), TokenNode::Group(group)) => {
                    existing.merge_at(group, &child_path, collisions);
                }
                (slot, incoming) => {
                    *slot = incoming;
                    collisions.push(child_path);
                }
            }
        }
    }

    /// Plain JSON rendering, in the shape handed to the formatting stage.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, node)| {
                let value = match node {
                    TokenNode::Token(token) => {
                        serde_json::to_value(token).unwrap_or(Value::Null)
                    }
                    TokenNode::Group(group) => group.to_value(),
                };
                (key.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

impl Serialize for TokenTree {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl FromIterator<(String, TokenNode)> for TokenTree {
    fn from_iter<I: IntoIterator<Item = (String, TokenNode)>>(iter: I) -> Self {
        let mut tree = TokenTree::new();
        for (key, node) in iter {
            tree.insert(key, node);
        }
        tree
    }
}
