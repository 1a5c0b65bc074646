//! Relationship expansion: one relationship of one record becomes link
//! statements plus the members that still need visiting.

use crate::fields::FieldSelection;
use crate::include::IncludeTree;
use crate::policy::LinkPolicy;
use hexgraph_core::error::{Error, Result};
use hexgraph_core::record::{Member, Params, Record, RecordRef};
use hexgraph_core::schema::{Cardinality, Relationship, Schema};
use hexgraph_core::term::{BlankNodeAllocator, Iri, Subject, Term, vocab};
use hexgraph_core::tuple::Hextuple;
use std::sync::Arc;

/// A member to visit next, with the include tree it was reached under.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub iri: Iri,
    pub record: RecordRef,
    pub include: IncludeTree,
    /// Schema bound by the relationship, bypassing the resolver.
    pub schema: Option<Arc<Schema>>,
}

#[derive(Debug, Default)]
pub struct Expansion {
    pub tuples: Vec<Hextuple>,
    pub next: Vec<WorkItem>,
}

/// Per-pass state shared by every expansion.
pub struct ExpandContext<'a> {
    pub params: &'a Params,
    pub fields: &'a FieldSelection,
    pub policy: &'a dyn LinkPolicy,
    pub blank_nodes: &'a mut BlankNodeAllocator,
}

fn member_iri(member: &Member) -> Result<Iri> {
    match member {
        Member::Record(record) => record.iri().ok_or_else(|| Error::MissingIri {
            type_name: record.type_name().to_string(),
        }),
        Member::Virtual(iri) => Ok(iri.clone()),
    }
}

/// Expand `relationship` of `parent`.
///
/// `nested` is the include tree below this relationship, or `None` when the
/// relationship is not on the include path: members are then linked but not
/// queued for expansion. Lazy relationships emit nothing off the path.
pub fn expand(
    parent: &dyn Record,
    subject: &Subject,
    relationship: &Relationship,
    nested: Option<&IncludeTree>,
    ctx: &mut ExpandContext<'_>,
) -> Result<Expansion> {
    let mut out = Expansion::default();
    if !ctx.fields.allows(parent.type_name(), relationship.field_key())
        || !relationship.applies(parent, ctx.params)
        || (relationship.lazy && nested.is_none())
    {
        return Ok(out);
    }

    let mut members = relationship.read(parent, ctx.params).members();
    if relationship.cardinality == Cardinality::One {
        members.truncate(1);
    }
    if members.is_empty() {
        return Ok(out);
    }

    let iris = members.iter().map(member_iri).collect::<Result<Vec<_>>>()?;
    let graph = relationship.graph.as_ref();

    if relationship.sequence {
        if let Some(predicate) = &relationship.predicate {
            let seq = Subject::BlankNode(ctx.blank_nodes.fresh());
            out.tuples.push(Hextuple::encode(
                subject,
                &predicate.resolve(0),
                &Term::from(seq.clone()),
                graph,
            ));
            out.tuples.push(Hextuple::encode(
                &seq,
                &Iri::new(vocab::RDF_TYPE),
                &Term::iri(vocab::RDF_SEQ),
                graph,
            ));
            for (idx, iri) in iris.iter().enumerate() {
                out.tuples.push(Hextuple::encode(
                    &seq,
                    &Iri::new(vocab::rdf_member(idx)),
                    &Term::Iri(iri.clone()),
                    graph,
                ));
            }
        }
    } else if let Some(predicate) = &relationship.predicate {
        for (idx, iri) in iris.iter().enumerate() {
            if ctx.policy.should_link(subject, iri, nested.is_some()) {
                out.tuples.push(Hextuple::encode(
                    subject,
                    &predicate.resolve(idx),
                    &Term::Iri(iri.clone()),
                    graph,
                ));
            }
        }
    }

    if let Some(nested) = nested {
        for (member, iri) in members.into_iter().zip(iris) {
            if let Member::Record(record) = member {
                out.next.push(WorkItem {
                    iri,
                    record,
                    include: nested.clone(),
                    schema: relationship.schema.clone(),
                });
            }
        }
    }

    Ok(out)
}
