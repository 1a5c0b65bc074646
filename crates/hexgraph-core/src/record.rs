//! Domain records as seen by the projection engine.

use crate::term::Iri;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Caller-supplied parameters handed to computed accessors, conditions and
/// statement producers.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// A record that can be projected into statements.
pub trait Record: Send + Sync + fmt::Debug {
    /// Type name used for schema lookup and field selection (e.g. `post`).
    fn type_name(&self) -> &str;

    /// Module-style namespace of the record type (e.g. `spam`), if any.
    fn namespace(&self) -> Option<&str> {
        None
    }

    /// Subject identifier of this record.
    fn iri(&self) -> Option<Iri>;

    /// Read a named attribute. Unknown names read as [`Value::Nil`].
    fn read_attribute(&self, name: &str) -> Value;

    /// Read a named relationship. Unknown names read as [`Records::Empty`].
    fn related(&self, name: &str) -> Records;

    /// Key for the tuple cache. Records without one are never cached.
    fn cache_key(&self) -> Option<String> {
        None
    }
}

pub type RecordRef = Arc<dyn Record>;

/// Zero, one or many records, or an identifier standing in for a record.
#[derive(Debug, Clone, Default)]
pub enum Records {
    #[default]
    Empty,
    Single(RecordRef),
    /// Nested collections flatten; `Empty` members are dropped.
    Collection(Vec<Records>),
    /// A precomputed identifier with no live record behind it.
    Virtual(Iri),
}

/// One resolved member of a [`Records`] value.
#[derive(Debug, Clone)]
pub enum Member {
    Record(RecordRef),
    Virtual(Iri),
}

impl Member {
    pub fn iri(&self) -> Option<Iri> {
        match self {
            Member::Record(r) => r.iri(),
            Member::Virtual(iri) => Some(iri.clone()),
        }
    }
}

impl Records {
    pub fn one(record: impl Record + 'static) -> Self {
        Records::Single(Arc::new(record))
    }

    pub fn many(records: impl IntoIterator<Item = RecordRef>) -> Self {
        Records::Collection(records.into_iter().map(Records::Single).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Records::Empty => true,
            Records::Collection(items) => items.iter().all(Records::is_empty),
            Records::Single(_) | Records::Virtual(_) => false,
        }
    }

    /// Flatten into members, in order.
    pub fn members(&self) -> Vec<Member> {
        let mut out = Vec::new();
        self.collect_members(&mut out);
        out
    }

    fn collect_members(&self, out: &mut Vec<Member>) {
        match self {
            Records::Empty => {}
            Records::Single(r) => out.push(Member::Record(Arc::clone(r))),
            Records::Virtual(iri) => out.push(Member::Virtual(iri.clone())),
            Records::Collection(items) => {
                for item in items {
                    item.collect_members(out);
                }
            }
        }
    }
}

impl From<RecordRef> for Records {
    fn from(record: RecordRef) -> Self {
        Records::Single(record)
    }
}

impl From<Option<RecordRef>> for Records {
    fn from(record: Option<RecordRef>) -> Self {
        record.map_or(Records::Empty, Records::Single)
    }
}

impl From<Vec<RecordRef>> for Records {
    fn from(records: Vec<RecordRef>) -> Self {
        Records::many(records)
    }
}

/// A general-purpose record: attribute map plus relationship map.
///
/// Relationships sit behind a lock so that cyclic graphs (author ↔ post) can
/// be wired after the records are shared.
#[derive(Debug)]
pub struct Model {
    type_name: String,
    namespace: Option<String>,
    id: Value,
    iri: Option<Iri>,
    attributes: BTreeMap<String, Value>,
    relationships: RwLock<BTreeMap<String, Records>>,
    cache_key: Option<String>,
}

impl Model {
    /// A model whose IRI is `https://<namespace/>type/id`.
    pub fn new(type_name: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            namespace: None,
            id: id.into(),
            iri: None,
            attributes: BTreeMap::new(),
            relationships: RwLock::new(BTreeMap::new()),
            cache_key: None,
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Override the derived IRI.
    pub fn with_iri(mut self, iri: impl Into<Iri>) -> Self {
        self.iri = Some(iri.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn shared(self) -> Arc<Model> {
        Arc::new(self)
    }

    /// Set or replace a relationship. Works on shared models.
    pub fn relate(&self, name: impl Into<String>, records: impl Into<Records>) {
        let mut rels = self
            .relationships
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rels.insert(name.into(), records.into());
    }

    fn derived_iri(&self) -> Option<Iri> {
        let id = match &self.id {
            Value::Nil => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::String(s) | Value::Token(s) => s.clone(),
            other => format!("{other:?}"),
        };
        let prefix = self
            .namespace
            .as_deref()
            .map(|ns| format!("{ns}/"))
            .unwrap_or_default();
        Some(Iri::new(format!("https://{prefix}{}/{id}", self.type_name)))
    }
}

impl Record for Model {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn iri(&self) -> Option<Iri> {
        self.iri.clone().or_else(|| self.derived_iri())
    }

    fn read_attribute(&self, name: &str) -> Value {
        if name == "id" {
            return self.id.clone();
        }
        self.attributes.get(name).cloned().unwrap_or(Value::Nil)
    }

    fn related(&self, name: &str) -> Records {
        self.relationships
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn cache_key(&self) -> Option<String> {
        self.cache_key.clone()
    }
}
