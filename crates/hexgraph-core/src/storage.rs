//! Read/write line-delimited tuple files (`.hndjson`) from disk.

use crate::graph::QuadStore;
use crate::term::Iri;
use crate::tuple::{DecodeSession, Hextuple};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const HEXGRAPH_DIR: &str = ".hexgraph";
pub const TUPLE_EXTENSION: &str = "hndjson";

/// Get the path to the hexgraph directory for a given project root.
pub fn hexgraph_dir(project_root: &Path) -> PathBuf {
    project_root.join(HEXGRAPH_DIR)
}

fn is_skipped(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Read tuples from a file. Blank lines and `#` comments are skipped; errors
/// report the 1-based line number in the file.
pub fn read_tuples(path: &Path) -> Result<Vec<Hextuple>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuples from {}", path.display()))?;

    let mut tuples = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if is_skipped(line) {
            continue;
        }
        let tuple = Hextuple::parse_line(line, idx + 1)
            .with_context(|| format!("in {}", path.display()))?;
        tuples.push(tuple);
    }
    Ok(tuples)
}

/// Read and decode a file into a store, sharing one blank-node table across
/// the whole file.
pub fn load_store(path: &Path, default_graph: Option<Iri>) -> Result<QuadStore> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuples from {}", path.display()))?;

    let mut session = DecodeSession::new(default_graph);
    let mut store = QuadStore::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if is_skipped(line) {
            continue;
        }
        let quad = session
            .decode_line(line, idx + 1)
            .with_context(|| format!("in {}", path.display()))?;
        store.insert(quad);
    }
    Ok(store)
}

/// Write tuples, one JSON array per line, creating parent directories.
pub fn write_tuples(path: &Path, tuples: &[Hextuple]) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    let mut out = String::new();
    for tuple in tuples {
        out.push_str(&tuple.to_line());
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("failed to write tuples to {}", path.display()))?;
    Ok(())
}
