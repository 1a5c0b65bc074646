//! CLI binary for hexgraph: convert, check and inspect hextuple files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hexgraph_core::config::HexgraphConfig;
use hexgraph_core::storage;
use hexgraph_engine::{RenderOptions, finish_store};
use hexgraph_export::{LineWriter, QuadWriter, RdfFormat};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hexgraph", about = "Hextuple graph toolkit")]
struct Cli {
    /// Project root holding `.hexgraph/config.toml` (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a tuple file to N-Triples, N-Quads or tuples
    Convert {
        /// Input `.hndjson` file
        file: PathBuf,

        /// Output format: nt, nq, hndjson
        #[arg(short, long, default_value = "nt")]
        format: RdfFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep named graphs even when the format cannot carry them
        #[arg(long)]
        keep_graphs: bool,
    },

    /// Report blank nodes that are referenced but never described
    Check {
        /// Input `.hndjson` file
        file: PathBuf,

        /// Fail when any dangling reference is found
        #[arg(long)]
        strict: bool,
    },

    /// Show store statistics
    Info {
        /// Input `.hndjson` file
        file: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let config = HexgraphConfig::load(&project_root)?;

    match cli.command {
        Commands::Convert {
            file,
            format,
            output,
            keep_graphs,
        } => cmd_convert(&config, &file, format, output.as_deref(), keep_graphs),
        Commands::Check { file, strict } => cmd_check(&config, &file, strict),
        Commands::Info { file, json } => cmd_info(&config, &file, json),
    }
}

fn cmd_convert(
    config: &HexgraphConfig,
    file: &Path,
    format: RdfFormat,
    output: Option<&Path>,
    keep_graphs: bool,
) -> Result<()> {
    let mut options = RenderOptions::from_config(config);
    options.always_include_named_graphs |= keep_graphs;

    let store = storage::load_store(file, options.default_graph.clone())?;
    let decoded = store.len();
    let store = finish_store(store, format, &options)?;

    let mut buf = Vec::new();
    LineWriter
        .write(store.quads(), format, &mut buf)
        .with_context(|| format!("failed to render {format}"))?;

    match output {
        Some(path) => {
            if let Some(dir) = path.parent()
                && !dir.as_os_str().is_empty()
            {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create directory {}", dir.display()))?;
            }
            std::fs::write(path, &buf)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} statements ({} decoded) to {}",
                store.len(),
                decoded,
                path.display()
            );
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(&buf)
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}

fn cmd_check(config: &HexgraphConfig, file: &Path, strict: bool) -> Result<()> {
    let store = storage::load_store(file, config.graph.default_graph_iri())?;
    let dangling = store.dangling_references();

    if dangling.is_empty() {
        println!("OK: {} statements, no dangling references", store.len());
        return Ok(());
    }

    for predicate in &dangling {
        println!("WARN: dangling reference through {predicate}");
    }
    if strict || config.diagnostics.strict {
        anyhow::bail!(
            "{} predicate(s) reference undescribed blank nodes",
            dangling.len()
        );
    }
    Ok(())
}

fn cmd_info(config: &HexgraphConfig, file: &Path, json: bool) -> Result<()> {
    let store = storage::load_store(file, config.graph.default_graph_iri())?;
    let stats = store.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    println!("Statements: {}", stats.quads);
    println!("Subjects: {}", stats.subjects);
    println!("Predicates: {}", stats.predicates);
    println!("Named graphs: {}", stats.named_graphs);
    println!("Blank nodes: {}", stats.blank_nodes);
    Ok(())
}
