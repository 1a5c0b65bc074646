//! Serialize quads as N-Triples, N-Quads or hextuple lines.
//!
//! The RDF line formats go through oxttl's serializers; quads are mapped
//! onto oxrdf terms first, which also validates IRIs and language tags.

use crate::format::RdfFormat;
use hexgraph_core::term::{BlankNode, Iri, Literal, Quad, Subject, Term};
use hexgraph_core::tuple::Hextuple;
use oxttl::{NQuadsSerializer, NTriplesSerializer};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

/// Turns a quad list into bytes in a given format.
pub trait QuadWriter {
    fn write(&self, quads: &[Quad], format: RdfFormat, out: &mut dyn Write) -> io::Result<()>;
}

/// The built-in line-based writer.
///
/// N-Triples output silently drops graph names; callers decide beforehand
/// whether that is acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineWriter;

impl QuadWriter for LineWriter {
    fn write(&self, quads: &[Quad], format: RdfFormat, out: &mut dyn Write) -> io::Result<()> {
        match format {
            RdfFormat::NTriples => {
                let mut terms = TermMapper::default();
                let mut serializer = NTriplesSerializer::new().for_writer(out);
                for quad in quads {
                    serializer.serialize_triple(&terms.triple(quad)?)?;
                }
                serializer.finish();
                Ok(())
            }
            RdfFormat::NQuads => {
                let mut terms = TermMapper::default();
                let mut serializer = NQuadsSerializer::new().for_writer(out);
                for quad in quads {
                    serializer.serialize_quad(&terms.quad(quad)?)?;
                }
                serializer.finish();
                Ok(())
            }
            RdfFormat::Hndjson => {
                for quad in quads {
                    writeln!(out, "{}", Hextuple::from_quad(quad).to_line())?;
                }
                Ok(())
            }
        }
    }
}

/// Write with the default [`LineWriter`] into a byte buffer.
pub fn write_quads(quads: &[Quad], format: RdfFormat) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    LineWriter.write(quads, format, &mut buf)?;
    Ok(buf)
}

pub fn write_to_string(quads: &[Quad], format: RdfFormat) -> io::Result<String> {
    String::from_utf8(write_quads(quads, format)?)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn invalid(what: &str, value: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("cannot write {what} `{value}`: {err}"),
    )
}

/// Maps hexgraph terms onto oxrdf terms for one output document.
///
/// Blank nodes that share a label but come from different decode batches
/// get distinct output labels.
#[derive(Default)]
struct TermMapper<'a> {
    assigned: HashMap<&'a BlankNode, oxrdf::BlankNode>,
    used: HashSet<String>,
}

impl<'a> TermMapper<'a> {
    fn triple(&mut self, quad: &'a Quad) -> io::Result<oxrdf::Triple> {
        Ok(oxrdf::Triple::new(
            self.subject(&quad.subject)?,
            named_node(&quad.predicate)?,
            self.object(&quad.object)?,
        ))
    }

    fn quad(&mut self, quad: &'a Quad) -> io::Result<oxrdf::Quad> {
        let graph = match &quad.graph {
            Some(graph) => oxrdf::GraphName::NamedNode(named_node(graph)?),
            None => oxrdf::GraphName::DefaultGraph,
        };
        Ok(oxrdf::Quad::new(
            self.subject(&quad.subject)?,
            named_node(&quad.predicate)?,
            self.object(&quad.object)?,
            graph,
        ))
    }

    fn subject(&mut self, subject: &'a Subject) -> io::Result<oxrdf::NamedOrBlankNode> {
        Ok(match subject {
            Subject::Iri(iri) => named_node(iri)?.into(),
            Subject::BlankNode(node) => self.blank_node(node)?.into(),
        })
    }

    fn object(&mut self, object: &'a Term) -> io::Result<oxrdf::Term> {
        Ok(match object {
            Term::Iri(iri) => named_node(iri)?.into(),
            Term::BlankNode(node) => self.blank_node(node)?.into(),
            Term::Literal(lit) => literal(lit)?.into(),
        })
    }

    fn blank_node(&mut self, node: &'a BlankNode) -> io::Result<oxrdf::BlankNode> {
        if let Some(assigned) = self.assigned.get(node) {
            return Ok(assigned.clone());
        }
        let base: String = node
            .label()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        let base = match base.chars().next() {
            None => "b".to_string(),
            Some('-') => format!("b{base}"),
            Some(_) => base,
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        let id = oxrdf::BlankNode::new(candidate.as_str())
            .map_err(|e| invalid("blank node", node.label(), e))?;
        self.used.insert(candidate);
        self.assigned.insert(node, id.clone());
        Ok(id)
    }
}

fn named_node(iri: &Iri) -> io::Result<oxrdf::NamedNode> {
    oxrdf::NamedNode::new(iri.as_str()).map_err(|e| invalid("IRI", iri.as_str(), e))
}

fn literal(lit: &Literal) -> io::Result<oxrdf::Literal> {
    if let Some(lang) = lit.language() {
        return oxrdf::Literal::new_language_tagged_literal(lit.lexical(), lang)
            .map_err(|e| invalid("language tag", lang, e));
    }
    if lit.is_plain() {
        return Ok(oxrdf::Literal::new_simple_literal(lit.lexical()));
    }
    Ok(oxrdf::Literal::new_typed_literal(
        lit.lexical(),
        named_node(lit.datatype())?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexgraph_core::term::vocab;

    fn post(object: impl Into<Term>) -> Vec<Quad> {
        vec![Quad::new(
            Subject::Iri(Iri::new("https://post/1")),
            "http://test.org/p",
            object,
            None,
        )]
    }

    #[test]
    fn test_literal_forms() {
        let nt = |object: Term| write_to_string(&post(object), RdfFormat::NTriples).unwrap();
        assert_eq!(
            nt(Literal::plain("say \"hi\"\n").into()),
            "<https://post/1> <http://test.org/p> \"say \\\"hi\\\"\\n\" .\n"
        );
        assert_eq!(
            nt(Literal::lang("hallo", "de").into()),
            "<https://post/1> <http://test.org/p> \"hallo\"@de .\n"
        );
        assert_eq!(
            nt(Literal::typed("1", vocab::XSD_INTEGER).into()),
            "<https://post/1> <http://test.org/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n"
        );
    }

    #[test]
    fn test_invalid_iri_is_an_error() {
        let err = write_quads(&post(Term::iri("https://a/b c")), RdfFormat::NTriples).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("https://a/b c"));
    }

    #[test]
    fn test_invalid_language_tag_is_an_error() {
        let quads = post(Literal::lang("hallo", "not a tag"));
        let err = write_quads(&quads, RdfFormat::NQuads).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_blank_labels_disambiguate_scopes() {
        let a = hexgraph_core::tuple::decode_batch(
            [r#"["_:x","http://p","1","http://www.w3.org/2001/XMLSchema#integer","",""]"#],
            None,
        )
        .unwrap();
        let b = hexgraph_core::tuple::decode_batch(
            [r#"["_:x","http://p","2","http://www.w3.org/2001/XMLSchema#integer","",""]"#],
            None,
        )
        .unwrap();
        let quads: Vec<Quad> = a.into_iter().chain(b).collect();
        let text = write_to_string(&quads, RdfFormat::NTriples).unwrap();
        assert!(text.contains("_:x <http://p>"));
        assert!(text.contains("_:x_1 <http://p>"));
    }

    #[test]
    fn test_blank_labels_are_sanitized() {
        let text = write_to_string(&post(Term::blank("-a.b")), RdfFormat::NTriples).unwrap();
        assert_eq!(text, "<https://post/1> <http://test.org/p> _:b-a_b .\n");
    }
}
