mod common;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, TimeZone, Utc};
use common::*;
use hexgraph_core::record::{Model, Records};
use hexgraph_core::schema::{Attribute, Schema};
use hexgraph_core::{Literal, Term, Value};
use hexgraph_engine::{FieldSelection, Registry};

fn dump(value: impl Into<Value>) -> Vec<String> {
    let mut registry = Registry::new();
    registry.register(
        Schema::new("resource")
            .attribute(Attribute::new("attr").predicate(p("attr")))
            .shared(),
    );
    let resource = Model::new("resource", 1).attr("attr", value);
    ntriples(&registry, &Records::one(resource), "", FieldSelection::all())
}

fn line(object: &str) -> Vec<String> {
    vec![format!("<https://resource/1> <http://test.org/attr> {object} .")]
}

#[test]
fn test_boolean() {
    assert_eq!(
        dump(true),
        line(r#""true"^^<http://www.w3.org/2001/XMLSchema#boolean>"#)
    );
}

#[test]
fn test_integer() {
    assert_eq!(
        dump(1),
        line(r#""1"^^<http://www.w3.org/2001/XMLSchema#integer>"#)
    );
}

#[test]
fn test_double() {
    assert_eq!(
        dump(1.0),
        line(r#""1.0"^^<http://www.w3.org/2001/XMLSchema#double>"#)
    );
}

#[test]
fn test_decimal() {
    assert_eq!(
        dump(BigDecimal::from(1)),
        line(r#""1.0"^^<http://www.w3.org/2001/XMLSchema#decimal>"#)
    );
}

#[test]
fn test_date() {
    let date = NaiveDate::from_ymd_opt(2019, 3, 14).unwrap();
    assert_eq!(
        dump(date),
        line(r#""2019-03-14"^^<http://www.w3.org/2001/XMLSchema#date>"#)
    );
}

#[test]
fn test_date_time_in_utc() {
    let at = Utc.with_ymd_and_hms(2019, 3, 14, 15, 9, 26).unwrap();
    assert_eq!(
        dump(at),
        line(r#""2019-03-14T15:09:26Z"^^<http://www.w3.org/2001/XMLSchema#dateTime>"#)
    );
}

#[test]
fn test_symbol_is_token() {
    assert_eq!(
        dump(Value::token("symbol")),
        line(r#""symbol"^^<http://www.w3.org/2001/XMLSchema#token>"#)
    );
}

#[test]
fn test_string_is_plain() {
    assert_eq!(dump("plain"), line(r#""plain""#));
}

#[test]
fn test_nil_yields_nothing() {
    assert!(dump(Value::Nil).is_empty());
}

#[test]
fn test_terms_pass_through() {
    assert_eq!(
        dump(Term::iri("https://example.com/thing")),
        line("<https://example.com/thing>")
    );
    assert_eq!(
        dump(Term::from(Literal::lang("hallo", "de"))),
        line(r#""hallo"@de"#)
    );
}

#[test]
fn test_array_fans_out() {
    assert_eq!(
        dump(vec![Value::from(1), Value::from("2")]),
        sorted(&[
            r#"<https://resource/1> <http://test.org/attr> "1"^^<http://www.w3.org/2001/XMLSchema#integer> ."#,
            r#"<https://resource/1> <http://test.org/attr> "2" ."#,
        ])
    );
}
