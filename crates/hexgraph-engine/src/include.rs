//! Inclusion trees: which relationships to expand, recursively.

use std::collections::BTreeMap;
use std::fmt;

/// Matches any relationship name at its level.
pub const WILDCARD: &str = "*";

/// Errors from parsing include or field selection input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("invalid include entry: {0}")]
    Include(String),
    #[error("invalid field selection: {0}")]
    Fields(String),
}

/// Relationship name → nested tree. An empty nested tree means "expand this
/// relationship's members but nothing below them".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeTree {
    children: BTreeMap<String, IncludeTree>,
}

impl IncludeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Parse comma-separated dotted paths: `"comments,author.bio"`.
    pub fn parse(paths: &str) -> Self {
        let mut tree = Self::new();
        for path in paths.split(',') {
            let segments: Vec<&str> = path
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            tree.insert_path(&segments);
        }
        tree
    }

    /// Parse the nested JSON form: strings are dotted paths, arrays merge
    /// their elements, objects map names to nested trees.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SelectionError> {
        let mut tree = Self::new();
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::String(s) => tree = Self::parse(s),
            serde_json::Value::Array(items) => {
                for item in items {
                    tree.merge(&Self::from_json(item)?);
                }
            }
            serde_json::Value::Object(map) => {
                for (name, nested) in map {
                    let mut child = Self::from_json(nested)?;
                    if let Some(existing) = tree.children.remove(name) {
                        child.merge(&existing);
                    }
                    tree.children.insert(name.clone(), child);
                }
            }
            other => return Err(SelectionError::Include(other.to_string())),
        }
        Ok(tree)
    }

    pub fn insert_path(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        self.children
            .entry((*first).to_string())
            .or_default()
            .insert_path(rest);
    }

    /// Nested tree for a relationship, if it is on the include path. An exact
    /// entry and a wildcard entry are merged.
    pub fn child(&self, name: &str) -> Option<IncludeTree> {
        match (self.children.get(name), self.children.get(WILDCARD)) {
            (Some(exact), Some(any)) => {
                let mut merged = exact.clone();
                merged.merge(any);
                Some(merged)
            }
            (Some(tree), None) | (None, Some(tree)) => Some(tree.clone()),
            (None, None) => None,
        }
    }

    pub fn includes(&self, name: &str) -> bool {
        self.children.contains_key(name) || self.children.contains_key(WILDCARD)
    }

    /// Union `other` into `self`, recursively.
    pub fn merge(&mut self, other: &IncludeTree) {
        for (name, nested) in &other.children {
            self.children.entry(name.clone()).or_default().merge(nested);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }
}

impl fmt::Display for IncludeTree {
    /// Dotted-path form; leaves only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(tree: &IncludeTree, prefix: &str, out: &mut Vec<String>) {
            for (name, nested) in &tree.children {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                if nested.is_empty() {
                    out.push(path);
                } else {
                    walk(nested, &path, out);
                }
            }
        }
        let mut paths = Vec::new();
        walk(self, "", &mut paths);
        f.write_str(&paths.join(","))
    }
}
