//! Output format table.

use std::fmt;
use std::str::FromStr;

/// Output format for projected statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    NTriples,
    NQuads,
    /// One hextuple JSON array per line.
    Hndjson,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format `{0}` (expected one of: nt, ntriples, nq, nquads, hndjson, hextuples)")]
pub struct UnknownFormat(pub String);

impl RdfFormat {
    pub const ALL: [RdfFormat; 3] = [RdfFormat::NTriples, RdfFormat::NQuads, RdfFormat::Hndjson];

    /// Canonical short symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            RdfFormat::NTriples => "ntriples",
            RdfFormat::NQuads => "nquads",
            RdfFormat::Hndjson => "hndjson",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::NQuads => "application/n-quads",
            RdfFormat::Hndjson => "application/hex+x-ndjson",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            RdfFormat::NTriples => "nt",
            RdfFormat::NQuads => "nq",
            RdfFormat::Hndjson => "hndjson",
        }
    }

    /// Whether the format can carry named graphs.
    pub fn supports_quads(self) -> bool {
        matches!(self, RdfFormat::NQuads | RdfFormat::Hndjson)
    }

    /// Guess a format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension().eq_ignore_ascii_case(ext))
    }
}

impl FromStr for RdfFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nt" | "ntriples" | "n-triples" => Ok(RdfFormat::NTriples),
            "nq" | "nquads" | "n-quads" => Ok(RdfFormat::NQuads),
            "hndjson" | "hextuples" => Ok(RdfFormat::Hndjson),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
