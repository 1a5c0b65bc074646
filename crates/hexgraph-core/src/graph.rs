//! In-memory quad store assembled from decoded tuples.

use crate::error::{Error, Result};
use crate::term::{BlankNode, Iri, Quad, Subject, Term};
use crate::tuple::{self, Hextuple};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// A deduplicating, insertion-ordered set of quads.
#[derive(Debug, Clone, Default)]
pub struct QuadStore {
    quads: Vec<Quad>,
    seen: HashSet<Quad>,
}

/// Aggregate counts over a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub quads: usize,
    pub subjects: usize,
    pub predicates: usize,
    /// Named graphs only; the default graph is not counted.
    pub named_graphs: usize,
    pub blank_nodes: usize,
}

impl QuadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode tuples with one blank-node session and insert them.
    /// Tuples with an empty graph field land in `default_graph`.
    pub fn from_tuples(tuples: &[Hextuple], default_graph: Option<Iri>) -> Result<Self> {
        Ok(tuple::decode_tuples(tuples, default_graph)?.into_iter().collect())
    }

    /// Insert a quad. Returns `false` if the store already held it.
    pub fn insert(&mut self, quad: Quad) -> bool {
        if self.seen.contains(&quad) {
            return false;
        }
        self.seen.insert(quad.clone());
        self.quads.push(quad);
        true
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.seen.contains(quad)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn into_quads(self) -> Vec<Quad> {
        self.quads
    }

    pub fn has_named_graphs(&self) -> bool {
        self.quads.iter().any(|q| q.graph.is_some())
    }

    /// Move every quad to the default graph, merging statements that only
    /// differed by graph.
    pub fn project_default_graph(&self) -> QuadStore {
        self.quads.iter().map(Quad::in_default_graph).collect()
    }

    pub fn stats(&self) -> StoreStats {
        let mut subjects = HashSet::new();
        let mut predicates = HashSet::new();
        let mut graphs = HashSet::new();
        let mut blanks: HashSet<&BlankNode> = HashSet::new();

        for quad in &self.quads {
            subjects.insert(&quad.subject);
            predicates.insert(&quad.predicate);
            if let Some(g) = &quad.graph {
                graphs.insert(g);
            }
            if let Some(node) = quad.subject.as_blank_node() {
                blanks.insert(node);
            }
            if let Some(node) = quad.object.as_blank_node() {
                blanks.insert(node);
            }
        }

        StoreStats {
            quads: self.quads.len(),
            subjects: subjects.len(),
            predicates: predicates.len(),
            named_graphs: graphs.len(),
            blank_nodes: blanks.len(),
        }
    }

    /// Predicates whose object is a blank node that never appears as a
    /// subject. Sorted and unique.
    pub fn dangling_references(&self) -> Vec<String> {
        let subjects: HashSet<&BlankNode> = self
            .quads
            .iter()
            .filter_map(|q| match &q.subject {
                Subject::BlankNode(node) => Some(node),
                Subject::Iri(_) => None,
            })
            .collect();

        self.quads
            .iter()
            .filter_map(|q| match &q.object {
                Term::BlankNode(node) if !subjects.contains(node) => {
                    Some(q.predicate.to_string())
                }
                _ => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Run the dangling-reference diagnostic. In strict mode any finding is
    /// an error; otherwise the offending predicates are returned.
    pub fn check_dangling(&self, strict: bool) -> Result<Vec<String>> {
        let predicates = self.dangling_references();
        if strict && !predicates.is_empty() {
            return Err(Error::DanglingReference { predicates });
        }
        Ok(predicates)
    }
}

impl FromIterator<Quad> for QuadStore {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        let mut store = QuadStore::new();
        store.extend(iter);
        store
    }
}

impl Extend<Quad> for QuadStore {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        for quad in iter {
            self.insert(quad);
        }
    }
}

impl<'a> IntoIterator for &'a QuadStore {
    type Item = &'a Quad;
    type IntoIter = std::slice::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}
