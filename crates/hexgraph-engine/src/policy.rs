//! Link-locality policies: whether a relationship arc to a member is emitted.

use hexgraph_core::term::{Iri, Subject};
use std::fmt;

/// Decides whether a `(parent, predicate, member)` link statement is emitted
/// in non-sequence mode.
pub trait LinkPolicy: Send + Sync + fmt::Debug {
    /// `expanded` is true when the member is on the include path.
    fn should_link(&self, parent: &Subject, member: &Iri, expanded: bool) -> bool;
}

/// Emit every link.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkAll;

impl LinkPolicy for LinkAll {
    fn should_link(&self, _parent: &Subject, _member: &Iri, _expanded: bool) -> bool {
        true
    }
}

/// Suppress links to members that are not expanded and live in a different
/// document (the IRI part before `#`) than the parent. Blank-node parents are
/// exempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameDocument;

impl LinkPolicy for SameDocument {
    fn should_link(&self, parent: &Subject, member: &Iri, expanded: bool) -> bool {
        if expanded {
            return true;
        }
        match parent {
            Subject::BlankNode(_) => true,
            Subject::Iri(parent) => parent.document() == member.document(),
        }
    }
}
