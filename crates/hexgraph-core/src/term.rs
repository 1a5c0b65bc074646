//! RDF term model: IRIs, blank nodes, literals and quads.
//!
//! Terms are what tuples decode into and what writers print. A literal always
//! carries an explicit datatype; untyped values use `xsd:string` and
//! language-tagged values use `rdf:langString`.

use std::fmt;
use std::sync::Arc;

/// Well-known vocabulary IRIs.
pub mod vocab {
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const RDF_SEQ: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Seq";
    pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
    /// Object-kind marker for IRI objects in the tuple format.
    pub const RDF_NAMED_NODE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#namedNode";
    /// Object-kind marker for blank node objects in the tuple format.
    pub const RDF_BLANK_NODE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#blankNode";

    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const XSD_TIME: &str = "http://www.w3.org/2001/XMLSchema#time";
    pub const XSD_TOKEN: &str = "http://www.w3.org/2001/XMLSchema#token";
    pub const XSD_ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";

    /// Container membership property `rdf:_i`.
    pub fn rdf_member(index: usize) -> String {
        format!("{RDF}_{index}")
    }
}

/// An absolute IRI. Cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(Arc<str>);

impl Iri {
    pub fn new(iri: impl AsRef<str>) -> Self {
        Self(Arc::from(iri.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the IRI starts with a URI scheme (`scheme:`).
    pub fn is_absolute(&self) -> bool {
        has_scheme(&self.0)
    }

    /// The part of the IRI before any `#` fragment.
    pub fn document(&self) -> &str {
        self.0.split_once('#').map_or(&self.0, |(doc, _)| doc)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(s: &str) -> Self {
        Iri::new(s)
    }
}

impl From<String> for Iri {
    fn from(s: String) -> Self {
        Iri(Arc::from(s))
    }
}

pub(crate) fn has_scheme(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Blank node with session-local identity.
///
/// The label never includes the `_:` sigil. Two nodes are the same node only
/// when both label and scope match: every decode batch gets its own scope, so
/// equal labels from independent batches stay distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankNode {
    label: Arc<str>,
    scope: u64,
}

impl BlankNode {
    /// Create an unscoped blank node. A leading `_:` is stripped.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self::scoped(label, 0)
    }

    pub(crate) fn scoped(label: impl AsRef<str>, scope: u64) -> Self {
        let label = label.as_ref();
        Self {
            label: Arc::from(label.strip_prefix("_:").unwrap_or(label)),
            scope,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn scope(&self) -> u64 {
        self.scope
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.label)
    }
}

/// A literal: lexical form plus datatype, and a language tag for `rdf:langString`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: String,
    datatype: Iri,
    language: Option<String>,
}

impl Literal {
    /// A literal with an explicit datatype.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<Iri>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// A plain (simple) literal, i.e. `xsd:string`.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self::typed(lexical, vocab::XSD_STRING)
    }

    /// A language-tagged string. The datatype is always `rdf:langString`.
    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Iri::new(vocab::RDF_LANG_STRING),
            language: Some(language.into()),
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> &Iri {
        &self.datatype
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// True for `xsd:string` literals, which writers print without a datatype.
    pub fn is_plain(&self) -> bool {
        self.language.is_none() && self.datatype.as_str() == vocab::XSD_STRING
    }
}

/// Any RDF term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(Iri),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Iri::new(iri))
    }

    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::BlankNode(BlankNode::new(label))
    }

    pub fn as_blank_node(&self) -> Option<&BlankNode> {
        match self {
            Term::BlankNode(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(i) => Some(i),
            _ => None,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::BlankNode(node)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl From<Subject> for Term {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Iri(i) => Term::Iri(i),
            Subject::BlankNode(b) => Term::BlankNode(b),
        }
    }
}

/// Statement subject: an IRI or a blank node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Iri(Iri),
    BlankNode(BlankNode),
}

impl Subject {
    /// Parse the textual form used in tuples: `_:label` is a blank node,
    /// anything else an IRI.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("_:") {
            Subject::BlankNode(BlankNode::new(s))
        } else {
            Subject::Iri(Iri::new(s))
        }
    }

    pub fn as_blank_node(&self) -> Option<&BlankNode> {
        match self {
            Subject::BlankNode(b) => Some(b),
            Subject::Iri(_) => None,
        }
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Subject::Iri(i) => Some(i),
            Subject::BlankNode(_) => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Iri(i) => i.fmt(f),
            Subject::BlankNode(b) => b.fmt(f),
        }
    }
}

impl From<Iri> for Subject {
    fn from(iri: Iri) -> Self {
        Subject::Iri(iri)
    }
}

impl From<BlankNode> for Subject {
    fn from(node: BlankNode) -> Self {
        Subject::BlankNode(node)
    }
}

/// A statement in a graph. `graph == None` is the default graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    pub subject: Subject,
    pub predicate: Iri,
    pub object: Term,
    pub graph: Option<Iri>,
}

impl Quad {
    pub fn new(
        subject: impl Into<Subject>,
        predicate: impl Into<Iri>,
        object: impl Into<Term>,
        graph: Option<Iri>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            graph,
        }
    }

    /// The same statement moved to the default graph.
    pub fn in_default_graph(&self) -> Self {
        Self {
            graph: None,
            ..self.clone()
        }
    }
}

/// Hands out fresh blank nodes (`hg_0`, `hg_1`, ...) for one projection pass.
///
/// Labels under [`BlankNodeAllocator::PREFIX`] belong to the allocator.
/// Caller-supplied nodes are moved out of that namespace with
/// [`BlankNodeAllocator::escape`] so the two can never merge.
#[derive(Debug, Default)]
pub struct BlankNodeAllocator {
    next: usize,
}

impl BlankNodeAllocator {
    pub const PREFIX: &'static str = "hg_";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> BlankNode {
        let node = BlankNode::new(format!("{}{}", Self::PREFIX, self.next));
        self.next += 1;
        node
    }

    /// True for labels of the form `hg_<digits>`.
    pub fn is_allocated(label: &str) -> bool {
        label
            .strip_prefix(Self::PREFIX)
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    }

    /// The label a caller node must use instead of `label`, or `None` when
    /// `label` is already outside the allocator namespace.
    ///
    /// Prefixed labels get the prefix once more, which keeps the mapping
    /// injective and never yields `hg_<digits>`.
    pub fn escape(label: &str) -> Option<String> {
        label
            .starts_with(Self::PREFIX)
            .then(|| format!("{}{label}", Self::PREFIX))
    }

    /// [`BlankNodeAllocator::escape`] applied to a caller term.
    pub fn escape_term(term: Term) -> Term {
        match term {
            Term::BlankNode(node) => match Self::escape(node.label()) {
                Some(label) => Term::BlankNode(BlankNode::scoped(label, node.scope())),
                None => Term::BlankNode(node),
            },
            other => other,
        }
    }
}
