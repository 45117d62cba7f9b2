//! Recursive locale tree.
//!
//! A locale file is an arbitrarily nested JSON object whose leaves are, by
//! convention, strings. `LocaleTree` keeps the keys in file order so that the
//! depth-first walk used by the differ, and the file written back to disk,
//! follow the order the authors wrote.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Separator used when a key path is displayed (`home.hero.title`).
pub const PATH_SEPARATOR: char = '.';

/// Location of a node inside a locale tree, one segment per nesting level.
///
/// Keys may themselves contain the separator (`"errors.notFound"`), so paths
/// are carried as segments and only joined for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// This path extended by one key.
    pub fn child(&self, key: &str) -> KeyPath {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        KeyPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Splits on the separator; only for keys known not to contain one.
impl From<&str> for KeyPath {
    fn from(dotted: &str) -> Self {
        KeyPath(dotted.split(PATH_SEPARATOR).map(str::to_string).collect())
    }
}

impl PartialEq<&str> for KeyPath {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

/// A value stored under a key of a locale tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocaleNode {
    /// Translatable string.
    Leaf(String),
    /// Nested object.
    Branch(LocaleTree),
    /// Anything else (numbers, booleans, arrays, null), kept verbatim.
    Other(Value),
}

impl LocaleNode {
    /// The string value, if this node is a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LocaleNode::Leaf(s) => Some(s),
            _ => None,
        }
    }

    /// The nested tree, if this node is a branch.
    pub fn as_tree(&self) -> Option<&LocaleTree> {
        match self {
            LocaleNode::Branch(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, LocaleNode::Branch(_))
    }
}

impl From<&str> for LocaleNode {
    fn from(value: &str) -> Self {
        LocaleNode::Leaf(value.to_string())
    }
}

impl From<String> for LocaleNode {
    fn from(value: String) -> Self {
        LocaleNode::Leaf(value)
    }
}

impl From<LocaleTree> for LocaleNode {
    fn from(value: LocaleTree) -> Self {
        LocaleNode::Branch(value)
    }
}

/// Ordered mapping from keys to locale nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleTree {
    entries: Vec<(String, LocaleNode)>,
}

impl LocaleTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate direct children in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LocaleNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&LocaleNode> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Insert a child. An existing key keeps its position and its old value is returned.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<LocaleNode>) -> Option<LocaleNode> {
        let key = key.into();
        let node = node.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, node)),
            None => {
                self.entries.push((key, node));
                None
            }
        }
    }

    /// Look up a node by key path.
    pub fn get_path(&self, path: &KeyPath) -> Option<&LocaleNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.get(first)?;
        for segment in rest {
            node = node.as_tree()?.get(segment)?;
        }
        Some(node)
    }

    /// Write a string leaf at `path`, creating intermediate objects as needed.
    ///
    /// An intermediate key that currently holds a non-object value is replaced by an object.
    pub fn set_path(&mut self, path: &KeyPath, value: impl Into<String>) {
        self.set_segments(path.segments(), LocaleNode::Leaf(value.into()));
    }

    fn set_segments(&mut self, segments: &[String], node: LocaleNode) {
        match segments {
            [] => {}
            [last] => {
                self.insert(last.as_str(), node);
            }
            [head, rest @ ..] => {
                let idx = self.ensure_branch(head);
                if let LocaleNode::Branch(child) = &mut self.entries[idx].1 {
                    child.set_segments(rest, node);
                }
            }
        }
    }

    fn ensure_branch(&mut self, key: &str) -> usize {
        match self.position(key) {
            Some(i) => {
                if !self.entries[i].1.is_branch() {
                    self.entries[i].1 = LocaleNode::Branch(LocaleTree::new());
                }
                i
            }
            None => {
                self.entries
                    .push((key.to_string(), LocaleNode::Branch(LocaleTree::new())));
                self.entries.len() - 1
            }
        }
    }

    /// The object that directly contains the key at `path`.
    ///
    /// Top-level keys have the tree itself as parent.
    pub fn parent_of(&self, path: &KeyPath) -> Option<&LocaleTree> {
        match path.segments().split_last()? {
            (_, []) => Some(self),
            (_, parent) => self.get_path(&KeyPath::new(parent.to_vec()))?.as_tree(),
        }
    }

    /// Every non-object node with its path, depth-first in key order.
    pub fn flatten(&self) -> Vec<(KeyPath, &LocaleNode)> {
        let mut out = Vec::new();
        self.flatten_into(&KeyPath::default(), &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, prefix: &KeyPath, out: &mut Vec<(KeyPath, &'a LocaleNode)>) {
        for (key, node) in &self.entries {
            let path = prefix.child(key);
            match node {
                LocaleNode::Branch(child) => child.flatten_into(&path, out),
                other => out.push((path, other)),
            }
        }
    }

    /// Paths of every leaf, depth-first in key order.
    pub fn leaf_paths(&self) -> Vec<KeyPath> {
        self.flatten().into_iter().map(|(path, _)| path).collect()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl Serialize for LocaleTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LocaleTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LocaleTreeVisitor)
    }
}

struct LocaleTreeVisitor;

impl<'de> Visitor<'de> for LocaleTreeVisitor {
    type Value = LocaleTree;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object of translation keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<LocaleTree, A::Error> {
        let mut tree = LocaleTree::new();
        while let Some((key, node)) = access.next_entry::<String, LocaleNode>()? {
            tree.insert(key, node);
        }
        Ok(tree)
    }
}
