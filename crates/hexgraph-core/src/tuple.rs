//! The six-field statement tuple and its line-delimited JSON encoding.
//!
//! Field order is fixed: subject, predicate, object value, object kind,
//! language, graph. Every statement the engine emits passes through this
//! form before it becomes a [`Quad`].

use crate::error::{Error, Result};
use crate::term::{
    BlankNode, BlankNodeAllocator, Iri, Literal, Quad, Subject, Term, has_scheme, vocab,
};
use crate::value::Value;
use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub const HEX_SUBJECT: usize = 0;
pub const HEX_PREDICATE: usize = 1;
pub const HEX_OBJECT: usize = 2;
pub const HEX_DATATYPE: usize = 3;
pub const HEX_LANGUAGE: usize = 4;
pub const HEX_GRAPH: usize = 5;

const FIELD_COUNT: usize = 6;

/// How the object value of a tuple must be read back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    NamedNode,
    BlankNode,
    Datatype(Iri),
}

impl ObjectKind {
    /// Parse the object-kind field. Both the full RDF marker IRIs and the
    /// short `namedNode` / `blankNode` spellings are accepted; anything else
    /// must be an absolute datatype IRI.
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            vocab::RDF_NAMED_NODE | "namedNode" => Some(ObjectKind::NamedNode),
            vocab::RDF_BLANK_NODE | "blankNode" => Some(ObjectKind::BlankNode),
            other if has_scheme(other) => Some(ObjectKind::Datatype(Iri::new(other))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ObjectKind::NamedNode => vocab::RDF_NAMED_NODE,
            ObjectKind::BlankNode => vocab::RDF_BLANK_NODE,
            ObjectKind::Datatype(iri) => iri.as_str(),
        }
    }
}

/// One statement in flattened, string-only form.
///
/// An empty `graph` means the default graph, an empty `language` means no tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hextuple {
    pub subject: String,
    pub predicate: String,
    pub value: String,
    pub kind: ObjectKind,
    pub language: String,
    pub graph: String,
}

impl Hextuple {
    /// Flatten one statement. Always yields all six fields.
    pub fn encode(subject: &Subject, predicate: &Iri, object: &Term, graph: Option<&Iri>) -> Self {
        let (value, kind, language) = match object {
            Term::Iri(iri) => (iri.to_string(), ObjectKind::NamedNode, String::new()),
            Term::BlankNode(node) => (node.to_string(), ObjectKind::BlankNode, String::new()),
            Term::Literal(lit) => (
                lit.lexical().to_string(),
                ObjectKind::Datatype(lit.datatype().clone()),
                lit.language().unwrap_or_default().to_string(),
            ),
        };
        Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            value,
            kind,
            language,
            graph: graph.map(ToString::to_string).unwrap_or_default(),
        }
    }

    /// Coerce a native value and flatten it; lists fan out into one tuple
    /// per element and `Nil` yields nothing.
    pub fn from_value(
        subject: &Subject,
        predicate: &Iri,
        value: &Value,
        graph: Option<&Iri>,
        attribute: &str,
    ) -> Result<Vec<Self>> {
        Ok(value
            .terms(attribute)?
            .iter()
            .map(|term| Self::encode(subject, predicate, term, graph))
            .collect())
    }

    /// Rename caller blank nodes that fall in the allocator namespace, so
    /// they cannot merge with nodes the engine allocates in the same pass.
    #[must_use]
    pub fn escape_blank_labels(mut self) -> Self {
        if let Some(label) = self.subject.strip_prefix("_:").and_then(BlankNodeAllocator::escape) {
            self.subject = format!("_:{label}");
        }
        if self.kind == ObjectKind::BlankNode
            && let Some(label) =
                BlankNodeAllocator::escape(self.value.strip_prefix("_:").unwrap_or(&self.value))
        {
            self.value = format!("_:{label}");
        }
        self
    }

    pub fn from_quad(quad: &Quad) -> Self {
        Self::encode(&quad.subject, &quad.predicate, &quad.object, quad.graph.as_ref())
    }

    /// Encode as one JSON array line (no trailing newline).
    pub fn to_line(&self) -> String {
        // Six plain strings always serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse one JSON array line. Does not resolve terms; see [`DecodeSession`].
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedTuple {
            line: line_no,
            reason,
        };
        let fields: Vec<serde_json::Value> =
            serde_json::from_str(line).map_err(|e| malformed(e.to_string()))?;
        if fields.len() != FIELD_COUNT {
            return Err(malformed(format!(
                "expected {FIELD_COUNT} fields, found {}",
                fields.len()
            )));
        }

        let mut strings = Vec::with_capacity(FIELD_COUNT);
        for (idx, field) in fields.into_iter().enumerate() {
            match field {
                serde_json::Value::String(s) => strings.push(s),
                serde_json::Value::Null if idx == HEX_LANGUAGE || idx == HEX_GRAPH => {
                    strings.push(String::new());
                }
                other => {
                    return Err(malformed(format!(
                        "field {idx} must be a string, found {other}"
                    )));
                }
            }
        }

        let kind = ObjectKind::parse(&strings[HEX_DATATYPE]).ok_or_else(|| {
            Error::UnsupportedObjectKind {
                line: line_no,
                kind: strings[HEX_DATATYPE].clone(),
            }
        })?;
        let mut fields = strings.into_iter();
        let mut next = || fields.next().unwrap_or_default();
        let subject = next();
        let predicate = next();
        let value = next();
        let _kind = next();
        let language = next();
        let graph = next();

        if subject.is_empty() {
            return Err(malformed("empty subject".to_string()));
        }
        if predicate.is_empty() {
            return Err(malformed("empty predicate".to_string()));
        }

        Ok(Self {
            subject,
            predicate,
            value,
            kind,
            language,
            graph,
        })
    }
}

impl Serialize for Hextuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(FIELD_COUNT)?;
        tup.serialize_element(&self.subject)?;
        tup.serialize_element(&self.predicate)?;
        tup.serialize_element(&self.value)?;
        tup.serialize_element(self.kind.as_str())?;
        tup.serialize_element(&self.language)?;
        tup.serialize_element(&self.graph)?;
        tup.end()
    }
}

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// Decoding state for one batch of tuples.
///
/// Holds the blank-node table: a label seen twice within the session maps to
/// the identical node, while nodes from two sessions never compare equal.
#[derive(Debug)]
pub struct DecodeSession {
    scope: u64,
    default_graph: Option<Iri>,
    blank_nodes: HashMap<String, BlankNode>,
}

impl Default for DecodeSession {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DecodeSession {
    /// `default_graph` is used for tuples whose graph field is empty.
    pub fn new(default_graph: Option<Iri>) -> Self {
        Self {
            scope: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed),
            default_graph,
            blank_nodes: HashMap::new(),
        }
    }

    fn blank_node(&mut self, raw: &str) -> BlankNode {
        let label = raw.strip_prefix("_:").unwrap_or(raw);
        let scope = self.scope;
        self.blank_nodes
            .entry(label.to_string())
            .or_insert_with(|| BlankNode::scoped(label, scope))
            .clone()
    }

    /// Resolve a parsed tuple into a quad.
    pub fn decode(&mut self, tuple: &Hextuple, line_no: usize) -> Result<Quad> {
        let subject = if tuple.subject.starts_with("_:") {
            Subject::BlankNode(self.blank_node(&tuple.subject))
        } else {
            Subject::Iri(Iri::new(&tuple.subject))
        };
        let predicate = Iri::new(&tuple.predicate);

        let object = match &tuple.kind {
            ObjectKind::NamedNode => Term::Iri(Iri::new(&tuple.value)),
            ObjectKind::BlankNode => Term::BlankNode(self.blank_node(&tuple.value)),
            ObjectKind::Datatype(datatype) => {
                let lang_string = datatype.as_str() == vocab::RDF_LANG_STRING;
                let literal = match (lang_string, tuple.language.is_empty()) {
                    (true, false) => Literal::lang(&tuple.value, &tuple.language),
                    (false, true) => Literal::typed(&tuple.value, datatype.clone()),
                    (true, true) => {
                        return Err(Error::MalformedTuple {
                            line: line_no,
                            reason: "rdf:langString literal without a language".to_string(),
                        });
                    }
                    (false, false) => {
                        return Err(Error::MalformedTuple {
                            line: line_no,
                            reason: format!(
                                "language `{}` on a literal typed {datatype}",
                                tuple.language
                            ),
                        });
                    }
                };
                Value::from_literal(&literal).map_err(|reason| Error::MalformedTuple {
                    line: line_no,
                    reason,
                })?;
                Term::Literal(literal)
            }
        };

        let graph = if tuple.graph.is_empty() {
            self.default_graph.clone()
        } else {
            Some(Iri::new(&tuple.graph))
        };

        Ok(Quad {
            subject,
            predicate,
            object,
            graph,
        })
    }

    /// Parse and resolve one text line.
    pub fn decode_line(&mut self, line: &str, line_no: usize) -> Result<Quad> {
        let tuple = Hextuple::parse_line(line, line_no)?;
        self.decode(&tuple, line_no)
    }
}

/// Parse one line into a tuple (line number 1 in errors).
pub fn decode_line(line: &str) -> Result<Hextuple> {
    Hextuple::parse_line(line, 1)
}

/// Decode a batch of text lines into quads with one shared blank-node table.
/// Empty lines are skipped.
pub fn decode_batch<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    default_graph: Option<Iri>,
) -> Result<Vec<Quad>> {
    let mut session = DecodeSession::new(default_graph);
    let mut quads = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        quads.push(session.decode_line(line, idx + 1)?);
    }
    Ok(quads)
}

/// Decode already-parsed tuples with one shared blank-node table.
pub fn decode_tuples(tuples: &[Hextuple], default_graph: Option<Iri>) -> Result<Vec<Quad>> {
    let mut session = DecodeSession::new(default_graph);
    tuples
        .iter()
        .enumerate()
        .map(|(idx, tuple)| session.decode(tuple, idx + 1))
        .collect()
}

/// Render tuples as newline-separated JSON arrays.
pub fn encode_lines(tuples: &[Hextuple]) -> String {
    tuples
        .iter()
        .map(Hextuple::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}
