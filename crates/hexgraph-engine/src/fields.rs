//! Per-type field allow-lists.

use crate::include::SelectionError;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Type name → allowed attribute and relationship names.
///
/// A type without an entry allows everything; an empty entry allows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    types: BTreeMap<String, BTreeSet<String>>,
}

impl FieldSelection {
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict `type_name` to exactly `fields`.
    pub fn only<I, S>(mut self, type_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types
            .insert(type_name.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn allows(&self, type_name: &str, field: &str) -> bool {
        self.types
            .get(type_name)
            .is_none_or(|fields| fields.contains(field))
    }

    /// Stable description of what is selected for one type.
    pub fn fingerprint(&self, type_name: &str) -> String {
        self.types.get(type_name).map_or_else(
            || "*".to_string(),
            |fields| fields.iter().cloned().collect::<Vec<_>>().join(","),
        )
    }

    /// Parse a JSON object of `type → [names]` or `type → "a,b"`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SelectionError> {
        let serde_json::Value::Object(map) = value else {
            if value.is_null() {
                return Ok(Self::all());
            }
            return Err(SelectionError::Fields(format!("expected an object, found {value}")));
        };
        let mut selection = Self::all();
        for (type_name, fields) in map {
            let names: Vec<String> = match fields {
                serde_json::Value::String(s) => split_names(s),
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            SelectionError::Fields(format!("`{type_name}` lists non-string {item}"))
                        })
                    })
                    .collect::<Result<_, _>>()?,
                other => {
                    return Err(SelectionError::Fields(format!(
                        "`{type_name}` must map to a list, found {other}"
                    )));
                }
            };
            selection = selection.only(type_name.clone(), names);
        }
        Ok(selection)
    }
}

fn split_names(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

impl FromStr for FieldSelection {
    type Err = SelectionError;

    /// `post=title,body;author=` (an empty list selects nothing).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut selection = Self::all();
        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (type_name, fields) = entry
                .split_once('=')
                .ok_or_else(|| SelectionError::Fields(format!("`{entry}` is missing `=`")))?;
            let type_name = type_name.trim();
            if type_name.is_empty() {
                return Err(SelectionError::Fields(format!("`{entry}` has no type name")));
            }
            selection = selection.only(type_name, split_names(fields));
        }
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_type_allows_all() {
        let fields = FieldSelection::all().only("post", ["title"]);
        assert!(fields.allows("post", "title"));
        assert!(!fields.allows("post", "body"));
        assert!(fields.allows("author", "name"));
    }

    #[test]
    fn test_empty_list_allows_nothing() {
        let fields: FieldSelection = "post=title,body;author=".parse().unwrap();
        assert!(fields.allows("post", "body"));
        assert!(!fields.allows("author", "name"));
        assert_eq!(fields.fingerprint("post"), "body,title");
        assert_eq!(fields.fingerprint("author"), "");
        assert_eq!(fields.fingerprint("comment"), "*");
    }

    #[test]
    fn test_parse_errors() {
        assert!("post".parse::<FieldSelection>().is_err());
        assert!("=title".parse::<FieldSelection>().is_err());
    }

    #[test]
    fn test_from_json() {
        let fields =
            FieldSelection::from_json(&json!({"post": ["title"], "author": "name, bio"})).unwrap();
        assert_eq!(fields, "post=title;author=name,bio".parse().unwrap());
        assert!(FieldSelection::from_json(&json!({"post": [1]})).is_err());
        assert!(FieldSelection::from_json(&json!(["post"])).is_err());
    }
}
