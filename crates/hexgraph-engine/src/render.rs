//! Render hooks: project records and hand the result to a writer.

use crate::traverse::Projector;
use hexgraph_core::config::HexgraphConfig;
use hexgraph_core::graph::QuadStore;
use hexgraph_core::record::Records;
use hexgraph_core::term::{Iri, Quad};
use hexgraph_core::tuple;
use hexgraph_export::{LineWriter, QuadWriter, RdfFormat};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Projection(#[from] hexgraph_core::Error),
    #[error("failed to write {format} output")]
    Write {
        format: RdfFormat,
        #[source]
        source: std::io::Error,
    },
}

/// Graph assembly options.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Keep named graphs even for formats that cannot carry them.
    pub always_include_named_graphs: bool,
    pub default_graph: Option<Iri>,
    pub check_dangling: bool,
    pub strict: bool,
}

impl RenderOptions {
    pub fn from_config(config: &HexgraphConfig) -> Self {
        Self {
            always_include_named_graphs: config.graph.always_include_named_graphs,
            default_graph: config.graph.default_graph_iri(),
            check_dangling: config.diagnostics.check_dangling || config.diagnostics.strict,
            strict: config.diagnostics.strict,
        }
    }
}

/// Assemble tuples into a store, run the dangling-reference diagnostic and
/// apply the named-graph policy for `format`.
pub fn assemble(
    tuples: &[tuple::Hextuple],
    format: RdfFormat,
    options: &RenderOptions,
) -> Result<QuadStore, RenderError> {
    let store = QuadStore::from_tuples(tuples, options.default_graph.clone())?;
    finish_store(store, format, options)
}

/// The store half of [`assemble`], for quads decoded elsewhere (e.g. a file).
pub fn finish_store(
    store: QuadStore,
    format: RdfFormat,
    options: &RenderOptions,
) -> Result<QuadStore, RenderError> {
    if options.check_dangling || options.strict {
        let predicates = store.check_dangling(options.strict)?;
        if !predicates.is_empty() {
            tracing::warn!(
                predicates = %predicates.join(", "),
                "blank nodes referenced but never described; include the missing relationships"
            );
        }
    }

    if !format.supports_quads() && !options.always_include_named_graphs {
        return Ok(store.project_default_graph());
    }
    Ok(store)
}

/// The externally callable entry points: `triples` and `dump`.
pub struct Renderer<'a> {
    projector: Projector<'a>,
    options: RenderOptions,
    writer: &'a dyn QuadWriter,
}

impl<'a> Renderer<'a> {
    pub fn new(projector: Projector<'a>, options: RenderOptions) -> Self {
        Self {
            projector,
            options,
            writer: &LineWriter,
        }
    }

    pub fn writer(mut self, writer: &'a dyn QuadWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Project and assemble into quads ready for `format`.
    pub fn triples(&self, records: &Records, format: RdfFormat) -> Result<Vec<Quad>, RenderError> {
        let tuples = self.projector.project(records)?;
        Ok(assemble(&tuples, format, &self.options)?.into_quads())
    }

    /// Project and serialize. Tuple output skips store assembly but still
    /// names the configured default graph in empty graph fields.
    pub fn dump(&self, records: &Records, format: RdfFormat) -> Result<Vec<u8>, RenderError> {
        if format == RdfFormat::Hndjson {
            let mut tuples = self.projector.project(records)?;
            if let Some(graph) = &self.options.default_graph {
                for tuple in tuples.iter_mut().filter(|t| t.graph.is_empty()) {
                    tuple.graph = graph.to_string();
                }
            }
            return Ok(tuple::encode_lines(&tuples).into_bytes());
        }

        let quads = self.triples(records, format)?;
        let mut buf = Vec::new();
        self.writer
            .write(&quads, format, &mut buf)
            .map_err(|source| RenderError::Write { format, source })?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Registry;
    use hexgraph_core::record::Model;
    use hexgraph_core::schema::{Attribute, Schema};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            Schema::new("post")
                .attribute(
                    Attribute::new("title")
                        .predicate("http://test.org/title")
                        .graph("http://test.org/g"),
                )
                .shared(),
        );
        registry
    }

    fn post() -> Records {
        Records::one(Model::new("post", 1).attr("title", "Hello"))
    }

    #[test]
    fn test_triples_project_named_graphs() {
        let registry = registry();
        let renderer = Renderer::new(Projector::new(&registry), RenderOptions::default());
        let quads = renderer.triples(&post(), RdfFormat::NTriples).unwrap();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].graph, None);

        let quads = renderer.triples(&post(), RdfFormat::NQuads).unwrap();
        assert_eq!(quads[0].graph, Some(Iri::new("http://test.org/g")));
    }

    #[test]
    fn test_always_include_named_graphs() {
        let registry = registry();
        let options = RenderOptions {
            always_include_named_graphs: true,
            ..RenderOptions::default()
        };
        let renderer = Renderer::new(Projector::new(&registry), options);
        let quads = renderer.triples(&post(), RdfFormat::NTriples).unwrap();
        assert_eq!(quads[0].graph, Some(Iri::new("http://test.org/g")));
    }

    #[test]
    fn test_dump_formats() {
        let registry = registry();
        let renderer = Renderer::new(Projector::new(&registry), RenderOptions::default());

        let nt = String::from_utf8(renderer.dump(&post(), RdfFormat::NTriples).unwrap()).unwrap();
        assert_eq!(nt, "<https://post/1> <http://test.org/title> \"Hello\" .\n");

        let hex = String::from_utf8(renderer.dump(&post(), RdfFormat::Hndjson).unwrap()).unwrap();
        assert!(hex.starts_with("[\"https://post/1\",\"http://test.org/title\",\"Hello\""));
        assert!(hex.ends_with("\"http://test.org/g\"]"));
    }

    #[test]
    fn test_hndjson_dump_fills_default_graph() {
        let mut registry = Registry::new();
        registry.register(
            Schema::new("post")
                .attribute(Attribute::new("title").predicate("http://test.org/title"))
                .attribute(
                    Attribute::new("body")
                        .predicate("http://test.org/text")
                        .graph("http://test.org/g"),
                )
                .shared(),
        );
        let options = RenderOptions {
            default_graph: Some(Iri::new("http://test.org/default")),
            ..RenderOptions::default()
        };
        let renderer = Renderer::new(Projector::new(&registry), options);
        let post = Records::one(Model::new("post", 1).attr("title", "Hello").attr("body", "Hi"));

        let hex = String::from_utf8(renderer.dump(&post, RdfFormat::Hndjson).unwrap()).unwrap();
        let graphs: Vec<String> = hex
            .lines()
            .map(|line| tuple::decode_line(line).unwrap().graph)
            .collect();
        assert_eq!(graphs, vec!["http://test.org/default", "http://test.org/g"]);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = HexgraphConfig::default();
        config.diagnostics.strict = true;
        let options = RenderOptions::from_config(&config);
        assert!(options.check_dangling);
        assert!(options.strict);
    }
}
