//! Include-tree driven traversal over a record graph.
//!
//! One [`Projector::project`] call owns its visited set, work queue and
//! output list; nothing is shared between calls except the optional cache.

use crate::cache::TupleCache;
use crate::expand::{ExpandContext, WorkItem, expand};
use crate::fields::FieldSelection;
use crate::include::IncludeTree;
use crate::policy::{LinkAll, LinkPolicy};
use crate::resolver::SchemaResolver;
use hexgraph_core::config::CacheConfig;
use hexgraph_core::error::{Error, Result};
use hexgraph_core::record::{Member, Params, Record, Records};
use hexgraph_core::schema::{CachePolicy, Schema, Statement};
use hexgraph_core::term::{BlankNodeAllocator, Iri, Subject};
use hexgraph_core::tuple::{Hextuple, ObjectKind};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Work queue keyed by subject IRI. Entries reached twice before being
/// visited have their include trees merged.
#[derive(Default)]
struct WorkQueue {
    order: VecDeque<Iri>,
    pending: HashMap<Iri, WorkItem>,
}

impl WorkQueue {
    fn push(&mut self, item: WorkItem) {
        if let Some(queued) = self.pending.get_mut(&item.iri) {
            queued.include.merge(&item.include);
            if queued.schema.is_none() {
                queued.schema = item.schema;
            }
            return;
        }
        self.order.push_back(item.iri.clone());
        self.pending.insert(item.iri.clone(), item);
    }

    fn pop(&mut self) -> Option<WorkItem> {
        while let Some(iri) = self.order.pop_front() {
            if let Some(item) = self.pending.remove(&iri) {
                return Some(item);
            }
        }
        None
    }
}

/// Projects records into hextuples.
pub struct Projector<'a> {
    resolver: &'a dyn SchemaResolver,
    include: IncludeTree,
    fields: FieldSelection,
    params: Params,
    meta: Vec<Statement>,
    policy: Arc<dyn LinkPolicy>,
    cache: Option<&'a dyn TupleCache>,
    /// Policy for schemas that do not carry their own.
    default_cache_policy: Option<CachePolicy>,
}

impl<'a> Projector<'a> {
    pub fn new(resolver: &'a dyn SchemaResolver) -> Self {
        Self {
            resolver,
            include: IncludeTree::new(),
            fields: FieldSelection::all(),
            params: Params::new(),
            meta: Vec::new(),
            policy: Arc::new(LinkAll),
            cache: None,
            default_cache_policy: None,
        }
    }

    pub fn include(mut self, include: IncludeTree) -> Self {
        self.include = include;
        self
    }

    pub fn fields(mut self, fields: FieldSelection) -> Self {
        self.fields = fields;
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Statements appended after everything projected from the records.
    pub fn meta(mut self, meta: Vec<Statement>) -> Self {
        self.meta = meta;
        self
    }

    pub fn link_policy(mut self, policy: Arc<dyn LinkPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache(mut self, cache: &'a dyn TupleCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach `cache` the way the `[cache]` section says: not at all when
    /// disabled, otherwise with the configured ttls as the policy of every
    /// schema that has none.
    pub fn cache_config(mut self, cache: &'a dyn TupleCache, config: &CacheConfig) -> Self {
        if !config.enabled {
            tracing::debug!("tuple cache disabled by config");
            return self;
        }
        self.cache = Some(cache);
        self.default_cache_policy = Some(config.policy());
        self
    }

    fn cache_policy<'s>(&'s self, schema: &'s Schema) -> Option<&'s CachePolicy> {
        schema.cache.as_ref().or(self.default_cache_policy.as_ref())
    }

    /// Project `roots` and everything reachable through the include tree.
    /// Any error aborts the whole projection.
    pub fn project(&self, roots: &Records) -> Result<Vec<Hextuple>> {
        let mut queue = WorkQueue::default();
        let mut visited: HashSet<Iri> = HashSet::new();
        let mut blank_nodes = BlankNodeAllocator::new();
        let mut tuples = Vec::new();

        for member in roots.members() {
            match member {
                Member::Record(record) => {
                    let iri = record.iri().ok_or_else(|| Error::MissingIri {
                        type_name: record.type_name().to_string(),
                    })?;
                    queue.push(WorkItem {
                        iri,
                        record,
                        include: self.include.clone(),
                        schema: None,
                    });
                }
                Member::Virtual(iri) => {
                    tracing::debug!(%iri, "skipping virtual root without a record");
                }
            }
        }

        while let Some(item) = queue.pop() {
            if !visited.insert(item.iri.clone()) {
                continue;
            }
            let record = item.record.as_ref();
            let schema = match item.schema {
                Some(schema) => schema,
                None => self
                    .resolver
                    .resolve(record.type_name(), record.namespace())
                    .ok_or_else(|| Error::UnresolvedSchema {
                        type_name: record.type_name().to_string(),
                        namespace: record.namespace().map(str::to_string),
                    })?,
            };
            tracing::debug!(iri = %item.iri, type_name = record.type_name(), "visiting");

            let subject = Subject::Iri(item.iri.clone());
            tuples.extend(self.own_tuples(
                record,
                &subject,
                &schema,
                &item.include,
                &mut blank_nodes,
            )?);

            let mut ctx = ExpandContext {
                params: &self.params,
                fields: &self.fields,
                policy: self.policy.as_ref(),
                blank_nodes: &mut blank_nodes,
            };
            for relationship in &schema.relationships {
                let nested = item.include.child(&relationship.name);
                if nested.is_none() && self.cached_relationship(record, &schema, relationship) {
                    continue;
                }
                let expansion = expand(record, &subject, relationship, nested.as_ref(), &mut ctx)?;
                tuples.extend(expansion.tuples);
                for next in expansion.next {
                    if !visited.contains(&next.iri) {
                        queue.push(next);
                    }
                }
            }
        }

        for statement in &self.meta {
            tuples.extend(statement_tuples(statement, "meta")?);
        }
        Ok(tuples)
    }

    /// Whether a relationship's links are part of the record's cached block.
    /// Sequences allocate per-pass blank nodes and are never cached.
    fn cached_relationship(
        &self,
        record: &dyn Record,
        schema: &Schema,
        relationship: &hexgraph_core::schema::Relationship,
    ) -> bool {
        self.cache.is_some()
            && self.cache_policy(schema).is_some()
            && record.cache_key().is_some()
            && relationship.cacheable
            && !relationship.sequence
    }

    /// Attribute and custom-statement tuples, plus cacheable links that are
    /// not on the include path. Served from the cache when the schema opts in.
    fn own_tuples(
        &self,
        record: &dyn Record,
        subject: &Subject,
        schema: &Schema,
        include: &IncludeTree,
        blank_nodes: &mut BlankNodeAllocator,
    ) -> Result<Vec<Hextuple>> {
        let (Some(cache), Some(policy), Some(key)) =
            (self.cache, self.cache_policy(schema), record.cache_key())
        else {
            return self.attribute_tuples(record, subject, schema, blank_nodes);
        };

        let included: Vec<&str> = schema
            .relationships
            .iter()
            .filter(|r| include.includes(&r.name))
            .map(|r| r.name.as_str())
            .collect();
        let key = format!(
            "{key}|fields={}|include={}",
            self.fields.fingerprint(record.type_name()),
            included.join(",")
        );

        let block = cache.fetch(&key, policy, &mut || {
            let mut blank_nodes = BlankNodeAllocator::new();
            let mut tuples = self.attribute_tuples(record, subject, schema, &mut blank_nodes)?;
            let mut ctx = ExpandContext {
                params: &self.params,
                fields: &self.fields,
                policy: self.policy.as_ref(),
                blank_nodes: &mut blank_nodes,
            };
            for relationship in &schema.relationships {
                if include.includes(&relationship.name)
                    || !self.cached_relationship(record, schema, relationship)
                {
                    continue;
                }
                tuples.extend(expand(record, subject, relationship, None, &mut ctx)?.tuples);
            }
            Ok(tuples)
        })?;
        Ok(relabel(&block, blank_nodes))
    }

    fn attribute_tuples(
        &self,
        record: &dyn Record,
        subject: &Subject,
        schema: &Schema,
        blank_nodes: &mut BlankNodeAllocator,
    ) -> Result<Vec<Hextuple>> {
        let mut tuples = Vec::new();
        for attribute in &schema.attributes {
            let Some(predicate) = &attribute.predicate else {
                continue;
            };
            if !self.fields.allows(record.type_name(), attribute.field_key())
                || !attribute.applies(record, &self.params)
            {
                continue;
            }
            let graph = attribute.graph.as_ref();
            let value = attribute.accessor.read(record, &self.params);

            let datatype = attribute.datatype.as_ref();
            if let Some(chain) = value.rdf_list(&attribute.name, datatype, blank_nodes)? {
                tuples.push(Hextuple::encode(subject, predicate, &chain.head, graph));
                for (node, link, object) in chain.statements {
                    tuples.push(Hextuple::encode(&node, &link, &object, graph));
                }
                continue;
            }

            let terms = match datatype {
                Some(datatype) => value.terms_as(&attribute.name, datatype)?,
                None => value.terms(&attribute.name)?,
            };
            tuples.extend(terms.iter().map(|term| {
                Hextuple::encode(subject, predicate, term, graph).escape_blank_labels()
            }));
        }

        for producer in &schema.statements {
            for statement in producer(record, &self.params) {
                tuples.extend(statement_tuples(&statement, "statement")?);
            }
        }
        Ok(tuples)
    }
}

/// Caller statements never share blank nodes with the allocator.
fn statement_tuples(statement: &Statement, source: &str) -> Result<Vec<Hextuple>> {
    Ok(Hextuple::from_value(
        &statement.subject,
        &statement.predicate,
        &statement.object,
        statement.graph.as_ref(),
        source,
    )?
    .into_iter()
    .map(Hextuple::escape_blank_labels)
    .collect())
}

/// Re-issue the allocator labels of a cached block from this pass's
/// allocator. Blocks are filled with their own allocator, so two cached
/// records would otherwise share `hg_0`.
fn relabel(block: &[Hextuple], blank_nodes: &mut BlankNodeAllocator) -> Vec<Hextuple> {
    let mut renamed: HashMap<String, String> = HashMap::new();
    let mut rename = |field: &mut String| {
        let Some(label) = field.strip_prefix("_:") else {
            return;
        };
        if !BlankNodeAllocator::is_allocated(label) {
            return;
        }
        let fresh = renamed
            .entry(label.to_string())
            .or_insert_with(|| blank_nodes.fresh().to_string());
        field.clone_from(fresh);
    };

    let mut out = block.to_vec();
    for tuple in &mut out {
        rename(&mut tuple.subject);
        if tuple.kind == ObjectKind::BlankNode {
            rename(&mut tuple.value);
        }
    }
    out
}
