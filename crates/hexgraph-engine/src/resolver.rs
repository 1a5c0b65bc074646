//! Schema lookup: which schema describes a record type.

use hexgraph_core::config::{LookupConfig, LookupStep};
use hexgraph_core::schema::Schema;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Resolves the schema for a record type.
pub trait SchemaResolver: Send + Sync {
    /// `namespace` is the record's own namespace.
    fn resolve(&self, type_name: &str, namespace: Option<&str>) -> Option<Arc<Schema>>;
}

/// Input to a lookup strategy.
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    pub type_name: &'a str,
    pub namespace: Option<&'a str>,
    /// Namespace the caller is serializing in, if any.
    pub request_namespace: Option<&'a str>,
}

/// Produces a candidate registration name for a request.
pub type LookupStrategy = Arc<dyn Fn(&LookupRequest<'_>) -> Option<String> + Send + Sync>;

fn qualified(namespace: &str, type_name: &str) -> String {
    format!("{namespace}::{type_name}")
}

fn builtin(step: LookupStep) -> LookupStrategy {
    match step {
        LookupStep::ByNamespace => Arc::new(|req: &LookupRequest<'_>| {
            req.request_namespace.map(|ns| qualified(ns, req.type_name))
        }),
        LookupStep::ByResourceNamespace => Arc::new(|req: &LookupRequest<'_>| {
            req.namespace.map(|ns| qualified(ns, req.type_name))
        }),
        LookupStep::ByResource => {
            Arc::new(|req: &LookupRequest<'_>| Some(req.type_name.to_string()))
        }
    }
}

type MemoKey = (Option<String>, Option<String>, String);

/// Schemas registered by name, resolved through a configurable chain.
/// Results, including misses, are memoized.
pub struct Registry {
    schemas: HashMap<String, Arc<Schema>>,
    enabled: bool,
    chain: Vec<LookupStrategy>,
    memo: Mutex<HashMap<MemoKey, Option<Arc<Schema>>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::from_config(&LookupConfig::default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.schemas.keys().collect();
        names.sort();
        f.debug_struct("Registry")
            .field("schemas", &names)
            .field("enabled", &self.enabled)
            .field("chain", &self.chain.len())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LookupConfig) -> Self {
        Self {
            schemas: HashMap::new(),
            enabled: config.enabled,
            chain: config.chain.iter().copied().map(builtin).collect(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Register under the schema's type name.
    pub fn register(&mut self, schema: Arc<Schema>) -> &mut Self {
        let name = schema.type_name.clone();
        self.register_as(name, schema)
    }

    /// Register under an explicit name such as `spam::unrelated_link`.
    pub fn register_as(&mut self, name: impl Into<String>, schema: Arc<Schema>) -> &mut Self {
        self.schemas.insert(name.into(), schema);
        self.clear_memo();
        self
    }

    /// Append a strategy after the configured chain.
    pub fn push_strategy(&mut self, strategy: LookupStrategy) -> &mut Self {
        self.chain.push(strategy);
        self.clear_memo();
        self
    }

    /// View of this registry that resolves within a request namespace.
    pub fn scoped<'a>(&'a self, request_namespace: &'a str) -> Scoped<'a> {
        Scoped {
            registry: self,
            request_namespace,
        }
    }

    fn clear_memo(&mut self) {
        self.memo
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn lookup(&self, request: &LookupRequest<'_>) -> Option<Arc<Schema>> {
        if !self.enabled {
            return None;
        }
        let key = (
            request.request_namespace.map(str::to_string),
            request.namespace.map(str::to_string),
            request.type_name.to_string(),
        );
        if let Some(hit) = self
            .memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return hit.clone();
        }

        let found = self
            .chain
            .iter()
            .filter_map(|strategy| strategy(request))
            .find_map(|name| self.schemas.get(&name).cloned());
        if found.is_none() {
            tracing::debug!(
                type_name = request.type_name,
                namespace = ?request.namespace,
                "no schema registered"
            );
        }

        self.memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, found.clone());
        found
    }
}

impl SchemaResolver for Registry {
    fn resolve(&self, type_name: &str, namespace: Option<&str>) -> Option<Arc<Schema>> {
        self.lookup(&LookupRequest {
            type_name,
            namespace,
            request_namespace: None,
        })
    }
}

/// A [`Registry`] bound to a request namespace.
#[derive(Debug, Clone, Copy)]
pub struct Scoped<'a> {
    registry: &'a Registry,
    request_namespace: &'a str,
}

impl SchemaResolver for Scoped<'_> {
    fn resolve(&self, type_name: &str, namespace: Option<&str>) -> Option<Arc<Schema>> {
        self.registry.lookup(&LookupRequest {
            type_name,
            namespace,
            request_namespace: Some(self.request_namespace),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(Schema::new("unrelated_link").shared())
            .register_as("spam::unrelated_link", Schema::new("spam_link").shared())
            .register_as("admin::post", Schema::new("admin_post").shared())
            .register(Schema::new("post").shared());
        registry
    }

    #[test]
    fn test_chain_order() {
        let registry = registry();
        let resolved = registry.resolve("unrelated_link", Some("spam")).unwrap();
        assert_eq!(resolved.type_name, "spam_link");

        let resolved = registry.resolve("unrelated_link", None).unwrap();
        assert_eq!(resolved.type_name, "unrelated_link");
    }

    #[test]
    fn test_request_namespace_wins() {
        let registry = registry();
        let admin = registry.scoped("admin");
        assert_eq!(admin.resolve("post", None).unwrap().type_name, "admin_post");
        assert_eq!(registry.resolve("post", None).unwrap().type_name, "post");
    }

    #[test]
    fn test_miss_and_disabled() {
        let registry = registry();
        assert!(registry.resolve("tag", None).is_none());

        let mut disabled = Registry::from_config(&LookupConfig {
            enabled: false,
            ..LookupConfig::default()
        });
        disabled.register(Schema::new("post").shared());
        assert!(disabled.resolve("post", None).is_none());
    }

    #[test]
    fn test_custom_strategy() {
        let mut registry = registry();
        registry.push_strategy(Arc::new(|req: &LookupRequest<'_>| {
            req.type_name.strip_suffix("_v2").map(str::to_string)
        }));
        assert_eq!(registry.resolve("post_v2", None).unwrap().type_name, "post");
    }

    #[test]
    fn test_registration_clears_memo() {
        let mut registry = Registry::new();
        assert!(registry.resolve("tag", None).is_none());
        registry.register(Schema::new("tag").shared());
        assert!(registry.resolve("tag", None).is_some());
    }
}
