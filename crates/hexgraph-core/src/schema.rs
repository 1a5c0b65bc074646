//! Per-type schemas: attributes, relationships and statement producers.
//!
//! A [`Schema`] is built once and shared behind an `Arc`; the engine never
//! mutates it.

use crate::record::{Params, Record, Records};
use crate::term::{Iri, Subject};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub type Condition = Arc<dyn Fn(&dyn Record, &Params) -> bool + Send + Sync>;
pub type StatementFn = Arc<dyn Fn(&dyn Record, &Params) -> Vec<Statement> + Send + Sync>;

/// How a value is read off a record.
pub enum Accessor<T> {
    /// Read by name through the [`Record`] trait.
    Static(String),
    Computed(Arc<dyn Fn(&dyn Record, &Params) -> T + Send + Sync>),
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Accessor::Static(name) => Accessor::Static(name.clone()),
            Accessor::Computed(f) => Accessor::Computed(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Static(name) => f.debug_tuple("Static").field(name).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl Accessor<Value> {
    pub fn read(&self, record: &dyn Record, params: &Params) -> Value {
        match self {
            Accessor::Static(name) => record.read_attribute(name),
            Accessor::Computed(f) => f(record, params),
        }
    }
}

impl Accessor<Records> {
    pub fn read(&self, record: &dyn Record, params: &Params) -> Records {
        match self {
            Accessor::Static(name) => record.related(name),
            Accessor::Computed(f) => f(record, params),
        }
    }
}

fn check(condition: Option<&Condition>, record: &dyn Record, params: &Params) -> bool {
    condition.is_none_or(|c| c(record, params))
}

/// A scalar attribute of a record type.
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    /// Name used by field selection, when it differs from `name`.
    pub key: Option<String>,
    /// Attributes without a predicate emit nothing.
    pub predicate: Option<Iri>,
    pub accessor: Accessor<Value>,
    pub condition: Option<Condition>,
    /// Re-type every coerced literal with this datatype.
    pub datatype: Option<Iri>,
    pub graph: Option<Iri>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            accessor: Accessor::Static(name.clone()),
            name,
            key: None,
            predicate: None,
            condition: None,
            datatype: None,
            graph: None,
        }
    }

    pub fn predicate(mut self, predicate: impl Into<Iri>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn datatype(mut self, datatype: impl Into<Iri>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn graph(mut self, graph: impl Into<Iri>) -> Self {
        self.graph = Some(graph.into());
        self
    }

    pub fn computed(
        mut self,
        f: impl Fn(&dyn Record, &Params) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.accessor = Accessor::Computed(Arc::new(f));
        self
    }

    pub fn when(
        mut self,
        f: impl Fn(&dyn Record, &Params) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(Arc::new(f));
        self
    }

    pub fn field_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    pub fn applies(&self, record: &dyn Record, params: &Params) -> bool {
        check(self.condition.as_ref(), record, params)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("predicate", &self.predicate)
            .field("accessor", &self.accessor)
            .field("datatype", &self.datatype)
            .finish_non_exhaustive()
    }
}

/// Predicate of a relationship link statement.
#[derive(Clone)]
pub enum PredicateSource {
    Fixed(Iri),
    /// Called with the member's position in the list.
    Indexed(Arc<dyn Fn(usize) -> Iri + Send + Sync>),
}

impl PredicateSource {
    pub fn resolve(&self, index: usize) -> Iri {
        match self {
            PredicateSource::Fixed(iri) => iri.clone(),
            PredicateSource::Indexed(f) => f(index),
        }
    }
}

impl fmt::Debug for PredicateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateSource::Fixed(iri) => f.debug_tuple("Fixed").field(iri).finish(),
            PredicateSource::Indexed(_) => f.write_str("Indexed(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A relationship from a record type to other records.
#[derive(Clone)]
pub struct Relationship {
    pub name: String,
    pub key: Option<String>,
    pub predicate: Option<PredicateSource>,
    pub cardinality: Cardinality,
    /// Emit members as an `rdf:Seq` instead of independent links.
    pub sequence: bool,
    /// Only link members when the relationship is on the include path.
    pub lazy: bool,
    pub accessor: Accessor<Records>,
    /// Schema for the related records, bypassing the resolver.
    pub schema: Option<Arc<Schema>>,
    pub cacheable: bool,
    pub condition: Option<Condition>,
    pub graph: Option<Iri>,
}

impl Relationship {
    fn new(name: impl Into<String>, cardinality: Cardinality) -> Self {
        let name = name.into();
        Self {
            accessor: Accessor::Static(name.clone()),
            name,
            key: None,
            predicate: None,
            cardinality,
            sequence: false,
            lazy: false,
            schema: None,
            cacheable: true,
            condition: None,
            graph: None,
        }
    }

    pub fn one(name: impl Into<String>) -> Self {
        Self::new(name, Cardinality::One)
    }

    pub fn many(name: impl Into<String>) -> Self {
        Self::new(name, Cardinality::Many)
    }

    pub fn predicate(mut self, predicate: impl Into<Iri>) -> Self {
        self.predicate = Some(PredicateSource::Fixed(predicate.into()));
        self
    }

    pub fn indexed_predicate(mut self, f: impl Fn(usize) -> Iri + Send + Sync + 'static) -> Self {
        self.predicate = Some(PredicateSource::Indexed(Arc::new(f)));
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn sequence(mut self) -> Self {
        self.sequence = true;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn schema(mut self, schema: Arc<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn uncacheable(mut self) -> Self {
        self.cacheable = false;
        self
    }

    pub fn graph(mut self, graph: impl Into<Iri>) -> Self {
        self.graph = Some(graph.into());
        self
    }

    pub fn computed(
        mut self,
        f: impl Fn(&dyn Record, &Params) -> Records + Send + Sync + 'static,
    ) -> Self {
        self.accessor = Accessor::Computed(Arc::new(f));
        self
    }

    pub fn when(
        mut self,
        f: impl Fn(&dyn Record, &Params) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(Arc::new(f));
        self
    }

    pub fn field_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    pub fn applies(&self, record: &dyn Record, params: &Params) -> bool {
        check(self.condition.as_ref(), record, params)
    }

    /// Related records. A to-one relationship keeps at most its first member.
    pub fn read(&self, record: &dyn Record, params: &Params) -> Records {
        let records = self.accessor.read(record, params);
        match self.cardinality {
            Cardinality::Many => records,
            Cardinality::One => match records {
                Records::Collection(_) => records
                    .members()
                    .into_iter()
                    .next()
                    .map_or(Records::Empty, |m| match m {
                        crate::record::Member::Record(r) => Records::Single(r),
                        crate::record::Member::Virtual(iri) => Records::Virtual(iri),
                    }),
                other => other,
            },
        }
    }
}

impl fmt::Debug for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("name", &self.name)
            .field("predicate", &self.predicate)
            .field("cardinality", &self.cardinality)
            .field("sequence", &self.sequence)
            .field("lazy", &self.lazy)
            .field("cacheable", &self.cacheable)
            .finish_non_exhaustive()
    }
}

/// A statement produced outside the attribute table: custom statements of a
/// schema and caller meta statements. The object goes through coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub subject: Subject,
    pub predicate: Iri,
    pub object: Value,
    pub graph: Option<Iri>,
}

impl Statement {
    pub fn new(
        subject: impl Into<Subject>,
        predicate: impl Into<Iri>,
        object: impl Into<Value>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph: None,
        }
    }

    pub fn in_graph(mut self, graph: impl Into<Iri>) -> Self {
        self.graph = Some(graph.into());
        self
    }
}

/// Cache settings for a schema's tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub race_condition_ttl: Duration,
}

impl CachePolicy {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            race_condition_ttl: Duration::ZERO,
        }
    }

    pub fn race_condition_ttl(mut self, grace: Duration) -> Self {
        self.race_condition_ttl = grace;
        self
    }
}

/// Description of one record type.
#[derive(Clone, Default)]
pub struct Schema {
    pub type_name: String,
    pub attributes: Vec<Attribute>,
    pub relationships: Vec<Relationship>,
    pub statements: Vec<StatementFn>,
    pub cache: Option<CachePolicy>,
}

impl Schema {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn statements(
        mut self,
        f: impl Fn(&dyn Record, &Params) -> Vec<Statement> + Send + Sync + 'static,
    ) -> Self {
        self.statements.push(Arc::new(f));
        self
    }

    pub fn cache(mut self, policy: CachePolicy) -> Self {
        self.cache = Some(policy);
        self
    }

    pub fn shared(self) -> Arc<Schema> {
        Arc::new(self)
    }

    pub fn find_relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name == name)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("attributes", &self.attributes)
            .field("relationships", &self.relationships)
            .field("statements", &self.statements.len())
            .field("cache", &self.cache)
            .finish()
    }
}
