//! Configuration for projection, lookup, diagnostics and caching.
//!
//! Load order: `.hexgraph/config.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::schema::CachePolicy;
use crate::term::Iri;

/// Top-level hexgraph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HexgraphConfig {
    pub graph: GraphConfig,
    pub lookup: LookupConfig,
    pub diagnostics: DiagnosticsConfig,
    pub cache: CacheConfig,
}

/// Named-graph handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Keep named graphs even when the output format cannot carry them.
    pub always_include_named_graphs: bool,
    /// Graph for tuples whose graph field is empty. `None` is the default graph.
    pub default_graph: Option<String>,
}

/// One step of the schema lookup chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStep {
    /// `<request namespace>::<type>`
    ByNamespace,
    /// `<record namespace>::<type>`
    ByResourceNamespace,
    /// `<type>`
    ByResource,
}

/// Schema lookup chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub enabled: bool,
    /// First match wins.
    pub chain: Vec<LookupStep>,
}

/// Dangling-reference diagnostic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub check_dangling: bool,
    /// Turn findings into errors. Implies `check_dangling`.
    pub strict: bool,
}

/// Tuple cache. `enabled` gates whether a cache is attached at all; the
/// ttls build the policy for schemas configured from this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    /// How long an expired entry keeps being served while it is recomputed.
    pub race_condition_ttl_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            chain: vec![
                LookupStep::ByNamespace,
                LookupStep::ByResourceNamespace,
                LookupStep::ByResource,
            ],
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            race_condition_ttl_secs: 10,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn race_condition_ttl(&self) -> Duration {
        Duration::from_secs(self.race_condition_ttl_secs)
    }

    pub fn policy(&self) -> CachePolicy {
        CachePolicy::new(self.ttl()).race_condition_ttl(self.race_condition_ttl())
    }
}

impl GraphConfig {
    pub fn default_graph_iri(&self) -> Option<Iri> {
        self.default_graph.as_deref().map(Iri::new)
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl HexgraphConfig {
    /// Load config from `.hexgraph/config.toml` in the project root, with env
    /// var overrides. Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".hexgraph").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config {}", config_path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("invalid config {}", config_path.display()))?
        } else {
            Self::default()
        };

        if let Ok(graph) = std::env::var("HEXGRAPH_DEFAULT_GRAPH") {
            config.graph.default_graph = (!graph.is_empty()).then_some(graph);
        }
        env_override(
            "HEXGRAPH_ALWAYS_INCLUDE_NAMED_GRAPHS",
            &mut config.graph.always_include_named_graphs,
        );
        env_override(
            "HEXGRAPH_CHECK_DANGLING",
            &mut config.diagnostics.check_dangling,
        );
        env_override("HEXGRAPH_STRICT", &mut config.diagnostics.strict);
        env_override("HEXGRAPH_CACHE_TTL", &mut config.cache.ttl_secs);

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check invariants and normalize implied settings.
    pub fn validate(&mut self) -> Result<()> {
        if let Some(graph) = &self.graph.default_graph
            && !Iri::new(graph).is_absolute()
        {
            anyhow::bail!("default_graph must be an absolute IRI, got `{graph}`");
        }
        if self.lookup.enabled && self.lookup.chain.is_empty() {
            anyhow::bail!("lookup.chain must name at least one step when lookup is enabled");
        }
        if self.diagnostics.strict {
            self.diagnostics.check_dangling = true;
        }
        Ok(())
    }
}
