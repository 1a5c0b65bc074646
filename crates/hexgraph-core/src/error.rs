//! Error kinds shared by the codec, the store and the projection engine.

/// Errors raised while projecting records or decoding tuples.
///
/// Every variant is fatal to the call that produced it: a projection either
/// returns the complete statement list or fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no schema resolves record type `{type_name}`{}", namespace_suffix(.namespace))]
    UnresolvedSchema {
        type_name: String,
        namespace: Option<String>,
    },
    #[error("malformed tuple on line {line}: {reason}")]
    MalformedTuple { line: usize, reason: String },
    #[error("unsupported object kind `{kind}` on line {line}")]
    UnsupportedObjectKind { line: usize, kind: String },
    #[error("dangling references through predicate(s): {}", .predicates.join(", "))]
    DanglingReference { predicates: Vec<String> },
    #[error("cannot coerce value of `{attribute}`: {reason}")]
    Coercion { attribute: String, reason: String },
    #[error("record of type `{type_name}` has no IRI")]
    MissingIri { type_name: String },
}

fn namespace_suffix(namespace: &Option<String>) -> String {
    namespace
        .as_deref()
        .map(|ns| format!(" in namespace `{ns}`"))
        .unwrap_or_default()
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
