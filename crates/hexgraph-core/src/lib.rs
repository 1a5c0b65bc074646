//! Core data model for hexgraph: terms and literals, native value coercion,
//! the six-field tuple codec, record schemas and the quad store.

pub mod config;
pub mod error;
pub mod graph;
pub mod record;
pub mod schema;
pub mod storage;
pub mod term;
pub mod tuple;
pub mod value;

pub use error::{Error, Result};
pub use term::{BlankNode, Iri, Literal, Quad, Subject, Term};
pub use tuple::Hextuple;
pub use value::{ListChain, Value};
