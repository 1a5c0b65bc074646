//! Native attribute values and their coercion into RDF terms.
//!
//! Coercion follows one precedence table (term passthrough, boolean, integer,
//! double, decimal, date, date-time, time, token, string). The same table run
//! backwards validates typed literals when tuples are decoded.

use crate::error::{Error, Result};
use crate::term::{BlankNode, BlankNodeAllocator, Iri, Literal, Subject, Term, vocab};
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use std::str::FromStr;

/// A native value read from a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value; yields no statement.
    Nil,
    /// Already a term; passed through unchanged.
    Term(Term),
    Bool(bool),
    Integer(i64),
    Double(f64),
    Decimal(BigDecimal),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Time(NaiveTime),
    /// Symbol-like scalar, typed `xsd:token`.
    Token(String),
    String(String),
    /// Fans out into one statement per element.
    List(Vec<Value>),
    /// An ordered RDF collection: one link to the head of an
    /// `rdf:first`/`rdf:rest` chain ending in `rdf:nil`.
    RdfList(Vec<Value>),
}

/// Statements laid out for an [`Value::RdfList`]: the object to link to and
/// the chain hanging off it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListChain {
    pub head: Term,
    pub statements: Vec<(Subject, Iri, Term)>,
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn token(s: impl Into<String>) -> Self {
        Value::Token(s.into())
    }

    /// Coerce a scalar into a term. `Nil` yields `None`.
    ///
    /// Lists are rejected: callers fan them out with [`Value::terms`].
    pub fn coerce(&self) -> Result<Option<Term>, String> {
        let term = match self {
            Value::Nil => return Ok(None),
            Value::Term(t) => t.clone(),
            Value::Bool(b) => Literal::typed(b.to_string(), vocab::XSD_BOOLEAN).into(),
            Value::Integer(i) => Literal::typed(i.to_string(), vocab::XSD_INTEGER).into(),
            Value::Double(d) => Literal::typed(double_lexical(*d), vocab::XSD_DOUBLE).into(),
            Value::Decimal(d) => Literal::typed(decimal_lexical(d), vocab::XSD_DECIMAL).into(),
            Value::Date(d) => {
                Literal::typed(d.format("%Y-%m-%d").to_string(), vocab::XSD_DATE).into()
            }
            Value::DateTime(dt) => Literal::typed(
                dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                vocab::XSD_DATE_TIME,
            )
            .into(),
            Value::Time(t) => {
                Literal::typed(t.format("%H:%M:%S%.f").to_string(), vocab::XSD_TIME).into()
            }
            Value::Token(s) => Literal::typed(s.clone(), vocab::XSD_TOKEN).into(),
            Value::String(s) => Literal::plain(s.clone()).into(),
            Value::List(_) => return Err("a list must be fanned out, not coerced".to_string()),
            Value::RdfList(_) => {
                return Err("an RDF list must be laid out as a chain, not coerced".to_string());
            }
        };
        Ok(Some(term))
    }

    /// Coerce into zero or more terms: `Nil` gives none, a list gives one
    /// term per non-nil element, anything else exactly one.
    ///
    /// `attribute` names the source for error messages.
    pub fn terms(&self, attribute: &str) -> Result<Vec<Term>> {
        let coerce_err = |reason: String| Error::Coercion {
            attribute: attribute.to_string(),
            reason,
        };
        match self {
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if matches!(item, Value::List(_) | Value::RdfList(_)) {
                        return Err(coerce_err("nested lists cannot be coerced".to_string()));
                    }
                    if let Some(term) = item.coerce().map_err(coerce_err)? {
                        out.push(term);
                    }
                }
                Ok(out)
            }
            other => Ok(other.coerce().map_err(coerce_err)?.into_iter().collect()),
        }
    }

    /// Coerce and re-type with an explicit datatype. Terms that are not
    /// literals are left alone.
    pub fn terms_as(&self, attribute: &str, datatype: &Iri) -> Result<Vec<Term>> {
        Ok(self
            .terms(attribute)?
            .into_iter()
            .map(|term| match term {
                Term::Literal(lit) => Literal::typed(lit.lexical(), datatype.clone()).into(),
                other => other,
            })
            .collect())
    }

    /// Lay out an [`Value::RdfList`] with fresh nodes from `blank_nodes`.
    /// `None` for any other value. An empty list is `rdf:nil` itself.
    ///
    /// Members are coerced like list elements and re-typed with `datatype`
    /// when given; `Nil` members are dropped. Member blank nodes are moved
    /// out of the allocator namespace.
    pub fn rdf_list(
        &self,
        attribute: &str,
        datatype: Option<&Iri>,
        blank_nodes: &mut BlankNodeAllocator,
    ) -> Result<Option<ListChain>> {
        let Value::RdfList(items) = self else {
            return Ok(None);
        };
        let members = Value::List(items.clone());
        let members = match datatype {
            Some(datatype) => members.terms_as(attribute, datatype)?,
            None => members.terms(attribute)?,
        };

        let nodes: Vec<BlankNode> = members.iter().map(|_| blank_nodes.fresh()).collect();
        let nil = || Term::iri(vocab::RDF_NIL);
        let mut statements = Vec::with_capacity(members.len() * 2);
        for (idx, (node, first)) in nodes.iter().zip(members).enumerate() {
            let first = BlankNodeAllocator::escape_term(first);
            let subject = Subject::BlankNode(node.clone());
            let rest = nodes
                .get(idx + 1)
                .map_or_else(nil, |next| Term::BlankNode(next.clone()));
            statements.push((subject.clone(), Iri::new(vocab::RDF_FIRST), first));
            statements.push((subject, Iri::new(vocab::RDF_REST), rest));
        }
        Ok(Some(ListChain {
            head: nodes
                .first()
                .map_or_else(nil, |node| Term::BlankNode(node.clone())),
            statements,
        }))
    }

    /// Inverse of [`Value::coerce`] for literals: parse a lexical form by its
    /// datatype. Datatypes outside the table come back as strings.
    pub fn from_literal(literal: &Literal) -> Result<Value, String> {
        let lexical = literal.lexical();
        let invalid = || format!("`{lexical}` is not a valid {}", literal.datatype());
        match literal.datatype().as_str() {
            vocab::XSD_BOOLEAN => match lexical {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            vocab::XSD_INTEGER => {
                if !is_integer_lexical(lexical) {
                    return Err(invalid());
                }
                // Out-of-range integers are still valid xsd:integer; keep the text.
                Ok(lexical
                    .parse::<i64>()
                    .map_or_else(|_| Value::String(lexical.to_string()), Value::Integer))
            }
            vocab::XSD_DOUBLE => match lexical {
                "INF" | "+INF" => Ok(Value::Double(f64::INFINITY)),
                "-INF" => Ok(Value::Double(f64::NEG_INFINITY)),
                "NaN" => Ok(Value::Double(f64::NAN)),
                _ if lexical.trim() == lexical => {
                    lexical.parse::<f64>().map(Value::Double).map_err(|_| invalid())
                }
                _ => Err(invalid()),
            },
            vocab::XSD_DECIMAL => BigDecimal::from_str(lexical)
                .map(Value::Decimal)
                .map_err(|_| invalid()),
            vocab::XSD_DATE => without_timezone(lexical)
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
                .map(Value::Date)
                .ok_or_else(invalid),
            vocab::XSD_DATE_TIME => DateTime::parse_from_rfc3339(lexical)
                .map(Value::DateTime)
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(lexical, "%Y-%m-%dT%H:%M:%S%.f")
                        .map(|naive| Value::DateTime(naive.and_utc().fixed_offset()))
                })
                .map_err(|_| invalid()),
            vocab::XSD_TIME => without_timezone(lexical)
                .and_then(|time| NaiveTime::parse_from_str(time, "%H:%M:%S%.f").ok())
                .map(Value::Time)
                .ok_or_else(invalid),
            vocab::XSD_TOKEN => {
                if is_token_lexical(lexical) {
                    Ok(Value::Token(lexical.to_string()))
                } else {
                    Err(invalid())
                }
            }
            _ => Ok(Value::String(lexical.to_string())),
        }
    }
}

/// Canonical-ish double lexical form: always carries a fraction or exponent.
fn double_lexical(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_string();
    }
    if d.is_infinite() {
        return if d.is_sign_positive() { "INF" } else { "-INF" }.to_string();
    }
    let s = d.to_string();
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}

fn decimal_lexical(d: &BigDecimal) -> String {
    let s = d.to_string();
    if s.contains('.') || s.contains(['e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}

/// The lexical form without its optional timezone (`Z` or `±hh:mm`).
/// `None` when the timezone is out of range.
fn without_timezone(lexical: &str) -> Option<&str> {
    if let Some(rest) = lexical.strip_suffix('Z') {
        return Some(rest);
    }
    let bytes = lexical.as_bytes();
    let Some(start) = bytes.len().checked_sub(6) else {
        return Some(lexical);
    };
    let zone = &bytes[start..];
    let shaped = matches!(zone[0], b'+' | b'-')
        && zone[3] == b':'
        && [1, 2, 4, 5].iter().all(|&i| zone[i].is_ascii_digit());
    if !shaped {
        return Some(lexical);
    }
    let hours = (zone[1] - b'0') * 10 + (zone[2] - b'0');
    let minutes = (zone[4] - b'0') * 10 + (zone[5] - b'0');
    (minutes < 60 && (hours < 14 || (hours == 14 && minutes == 0))).then(|| &lexical[..start])
}

fn is_integer_lexical(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_token_lexical(s: &str) -> bool {
    !s.starts_with(' ')
        && !s.ends_with(' ')
        && !s.contains("  ")
        && !s.contains(['\n', '\r', '\t'])
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTime<chrono::Utc>> for Value {
    fn from(dt: DateTime<chrono::Utc>) -> Self {
        Value::DateTime(dt.fixed_offset())
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Term> for Value {
    fn from(t: Term) -> Self {
        Value::Term(t)
    }
}

impl From<Iri> for Value {
    fn from(iri: Iri) -> Self {
        Value::Term(Term::Iri(iri))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
