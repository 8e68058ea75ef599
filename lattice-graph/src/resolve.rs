//! Module ownership and alias resolution.

use crate::schema::CompiledSchema;
use lattice_core::{LatticeError, ModuleJoinerConfig, ModuleRegistry, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of resolving the module that owns an entity.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub module: Arc<ModuleJoinerConfig>,
    pub alias: String,
}

/// Resolves entity ownership against the module registry.
///
/// Ownership goes to the first module in registry order whose own schema
/// declares the entity. Compiled module schemas are memoized for the lifetime
/// of the resolver, which is one build.
#[derive(Debug)]
pub struct ModuleResolver {
    modules: Vec<Arc<ModuleJoinerConfig>>,
    compiled: HashMap<String, CompiledSchema>,
}

impl ModuleResolver {
    /// Create a resolver over a registry snapshot
    pub fn new(registry: &ModuleRegistry) -> Self {
        Self {
            modules: registry.iter().cloned().collect(),
            compiled: HashMap::new(),
        }
    }

    /// Resolve the owning module and externally-facing alias for an entity.
    ///
    /// Fails with [`LatticeError::Resolution`] when no module declares the
    /// entity, or [`LatticeError::Configuration`] when the owning module has
    /// no matching alias.
    pub fn resolve(&mut self, entity: &str) -> Result<ResolvedModule> {
        for i in 0..self.modules.len() {
            let config = self.modules[i].clone();
            if config.schema.is_none() {
                continue;
            }

            if !self.module_schema(&config)?.contains(entity) {
                continue;
            }

            tracing::debug!(entity, module = %config.service_name, "resolved entity owner");

            let alias = alias_for_entity(&config, entity).ok_or_else(|| {
                LatticeError::configuration(format!(
                    "the module {} owns the entity {entity} but does not declare a matching alias; \
                     add an alias to the module configuration, with the entity named in its args \
                     when the alias name differs",
                    config.service_name
                ))
            })?;

            return Ok(ResolvedModule {
                module: config,
                alias,
            });
        }

        Err(LatticeError::resolution(format!(
            "unable to retrieve the module that corresponds to the entity {entity}; \
             add the entity to the owning module's schema"
        )))
    }

    /// Compiled schema of a module, memoized per build.
    pub fn module_schema(&mut self, config: &Arc<ModuleJoinerConfig>) -> Result<&CompiledSchema> {
        let Some(sdl) = config.schema.as_deref() else {
            return Err(LatticeError::configuration(format!(
                "the module {} has no schema to search",
                config.service_name
            )));
        };

        if !self.compiled.contains_key(&config.service_name) {
            let schema = match CompiledSchema::compile(sdl) {
                Ok(schema) => schema,
                Err(LatticeError::Schema(msg)) => {
                    return Err(LatticeError::schema(format!(
                        "module {}: {msg}",
                        config.service_name
                    )));
                }
                Err(e) => return Err(e),
            };
            self.compiled.insert(config.service_name.clone(), schema);
        }

        Ok(&self.compiled[&config.service_name])
    }
}

/// Find the alias name a module exposes an entity under.
///
/// Alias declarations are flattened to (name, entity-override) pairs; the
/// first pair whose override (or, absent one, whose name) equals the entity
/// case-insensitively wins.
pub fn alias_for_entity(config: &ModuleJoinerConfig, entity: &str) -> Option<String> {
    for alias in &config.alias {
        for name in &alias.name {
            let candidate = alias.entity.as_deref().unwrap_or(name);
            if candidate.eq_ignore_ascii_case(entity) {
                return Some(name.clone());
            }
        }
    }
    None
}
