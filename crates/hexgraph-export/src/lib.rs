//! Quad writers for hexgraph output formats.

pub mod format;
pub mod writer;

pub use format::{RdfFormat, UnknownFormat};
pub use writer::{LineWriter, QuadWriter, write_quads, write_to_string};
