//! Link module resolution between entities owned by different modules.
//!
//! When the flattened catalog schema declares a parent/child relationship
//! across two modules, the relationship is actually persisted by a link
//! module. This module finds every link module joining the two sides and,
//! when the link lands on an ancestor of the child inside the child's own
//! module schema, the intermediate entities bridging the two.

use crate::resolve::ModuleResolver;
use crate::schema::{self, CompiledSchema};
use lattice_core::{LatticeError, ModuleJoinerConfig, ModuleRegistry, Result};
use std::sync::Arc;

/// The two entities a link is being resolved between, with their owning
/// modules.
#[derive(Debug, Clone)]
pub struct LinkQuery<'a> {
    /// Parent side of the schema-declared relationship
    pub primary_entity: &'a str,
    pub primary_module: &'a Arc<ModuleJoinerConfig>,

    /// Child side
    pub foreign_entity: &'a str,
    pub foreign_module: &'a Arc<ModuleJoinerConfig>,
}

/// One link module joining the queried pair.
#[derive(Debug, Clone)]
pub struct LinkMetadata {
    /// Entity name the link module persists
    pub entity_name: String,

    /// Alias the link is exposed under
    pub alias: String,

    pub link_module: Arc<ModuleJoinerConfig>,

    /// Entities between the foreign entity and the linked ancestor, innermost
    /// first, the ancestor last; empty for a direct link
    pub intermediate_entities: Vec<String>,
}

/// Find every link module joining the queried module pair.
///
/// All qualifying matches are returned, one per link module with matching
/// relationship service names (distinct relationship roles may join the same
/// pair more than once). None found is a [`LatticeError::Resolution`].
pub fn resolve_links(
    query: &LinkQuery<'_>,
    registry: &ModuleRegistry,
    resolver: &mut ModuleResolver,
) -> Result<Vec<LinkMetadata>> {
    let mut matches = Vec::new();

    for link in registry.links() {
        if link.relationships.len() != 2 {
            return Err(LatticeError::configuration(format!(
                "the link module {} must declare exactly two relationships, found {}",
                link.service_name,
                link.relationships.len()
            )));
        }

        let link_primary = &link.relationships[0];
        let link_foreign = &link.relationships[1];

        if link_primary.service_name != query.primary_module.service_name
            || link_foreign.service_name != query.foreign_module.service_name
        {
            continue;
        }

        let primary_key = &link_primary.foreign_key;
        let primary_matches = query
            .primary_module
            .linkable_keys
            .get(primary_key)
            .is_some_and(|entity| entity.as_str() == query.primary_entity);

        let foreign_key = &link_foreign.foreign_key;
        let foreign_matches = query
            .foreign_module
            .linkable_keys
            .get(foreign_key)
            .is_some_and(|entity| entity.as_str() == query.foreign_entity);

        // The extends declarations must surface the link under the primary
        // module through the same linkable key.
        let extends = link.extends.iter().find(|extend| {
            extend.service_name == query.primary_module.service_name
                && extend.relationship.primary_key == *primary_key
        });
        if extends.is_none() {
            return Err(LatticeError::configuration(format!(
                "unable to retrieve the link module name for the services {} - {}; \
                 check that the extends relationship service name of {} is set correctly",
                query.primary_module.service_name,
                query.foreign_module.service_name,
                link.service_name
            )));
        }

        let first_alias = link.alias.first();
        let entity_name = first_alias.and_then(|a| a.entity.clone()).ok_or_else(|| {
            LatticeError::configuration(format!(
                "unable to retrieve the link module entity name for the services {} - {}; \
                 the link module alias of {} must name an entity in its args",
                query.primary_module.service_name,
                query.foreign_module.service_name,
                link.service_name
            ))
        })?;
        let alias = first_alias
            .and_then(|a| a.name.first().cloned())
            .ok_or_else(|| {
                LatticeError::configuration(format!(
                    "the link module {} declares an alias without a name",
                    link.service_name
                ))
            })?;

        let intermediate_entities = if primary_matches && foreign_matches {
            Vec::new()
        } else {
            resolve_intermediates(query, link, foreign_key, resolver)?
        };

        tracing::debug!(
            link = %link.service_name,
            entity = %entity_name,
            intermediates = intermediate_entities.len(),
            "matched link module"
        );

        matches.push(LinkMetadata {
            entity_name,
            alias,
            link_module: link.clone(),
            intermediate_entities,
        });
    }

    if matches.is_empty() {
        return Err(LatticeError::resolution(format!(
            "unable to retrieve the link module that corresponds to the entities {} - {}",
            query.primary_entity, query.foreign_entity
        )));
    }

    Ok(matches)
}

/// Resolve the intermediate entities for an indirect link: the foreign side's
/// linkable key lands on an ancestor of the foreign entity inside the foreign
/// module's own schema.
fn resolve_intermediates(
    query: &LinkQuery<'_>,
    link: &Arc<ModuleJoinerConfig>,
    foreign_key: &str,
    resolver: &mut ModuleResolver,
) -> Result<Vec<String>> {
    let ancestor = query
        .foreign_module
        .linkable_keys
        .get(foreign_key)
        .cloned()
        .ok_or_else(|| {
            LatticeError::configuration(format!(
                "unable to retrieve the entity name for the linkable key {foreign_key} \
                 of the module {}, required by the link module {}",
                query.foreign_module.service_name, link.service_name
            ))
        })?;

    if query.foreign_module.schema.is_none() {
        return Err(LatticeError::configuration(format!(
            "unable to retrieve the intermediate entities for the services {} - {}; \
             the foreign module {} must have a schema",
            query.primary_module.service_name,
            query.foreign_module.service_name,
            query.foreign_module.service_name
        )));
    }

    let compiled = resolver.module_schema(query.foreign_module)?;
    let (found, mut path) = find_intermediate_path(compiled, query.foreign_entity, &ancestor);

    if found != 1 {
        return Err(LatticeError::ambiguous_path(format!(
            "unable to retrieve the intermediate entities for the services {} - {} \
             between {} and {ancestor}: {found} paths found in the schema of {}",
            query.primary_module.service_name,
            query.foreign_module.service_name,
            query.foreign_entity,
            query.foreign_module.service_name
        )));
    }

    path.push(ancestor);
    Ok(path)
}

/// Search a module schema for the nested path from `entity` up to `ancestor`.
///
/// Returns how many distinct upward paths reach the ancestor, together with
/// the entities strictly between the two on the last path found, innermost
/// first. The caller requires exactly one path.
pub(crate) fn find_intermediate_path(
    compiled: &CompiledSchema,
    entity: &str,
    ancestor: &str,
) -> (usize, Vec<String>) {
    let mut trail = Vec::new();
    search_upward(compiled, entity, ancestor, &mut trail)
}

fn search_upward(
    compiled: &CompiledSchema,
    entity: &str,
    ancestor: &str,
    trail: &mut Vec<String>,
) -> (usize, Vec<String>) {
    trail.push(entity.to_string());

    let mut found = 0;
    let mut path = Vec::new();

    for object in compiled.objects() {
        let declares_entity = object
            .fields
            .iter()
            .any(|field| schema::element_type_name(&field.field_type) == entity);
        if !declares_entity || trail.iter().any(|seen| *seen == object.name) {
            continue;
        }

        if object.name == ancestor {
            found += 1;
            path = Vec::new();
        } else {
            let (count, upper) = search_upward(compiled, &object.name, ancestor, trail);
            if count > 0 {
                found += count;
                path = Vec::with_capacity(upper.len() + 1);
                path.push(object.name.clone());
                path.extend(upper);
            }
        }
    }

    trail.pop();
    (found, path)
}
