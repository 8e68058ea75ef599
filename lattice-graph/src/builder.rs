//! Entity graph construction over the compiled catalog schema.
//!
//! One pass over every object type declared in the catalog schema. Nodes are
//! created by name on first access, so the pass is order-independent: a
//! parent touched before its own declaration is materialized (and its module
//! resolved) immediately, then filled in when its declaration is reached.

use crate::directives;
use crate::link::{self, LinkQuery};
use crate::paths;
use crate::resolve::{ModuleResolver, ResolvedModule};
use crate::schema::{self, CompiledSchema};
use crate::types::{ParentLink, SchemaObjectRepresentation};
use graphql_parser::schema::ObjectType;
use lattice_core::{EntityId, ModuleJoinerConfig, ModuleRegistry, Result};
use std::sync::Arc;

/// Builds the [`SchemaObjectRepresentation`] for one catalog schema.
///
/// A builder is a pure function of its two inputs: the schema text passed to
/// [`EntityGraphBuilder::build`] and the registry it was created over.
/// Failure at any step aborts the whole build; no partial graph is returned.
pub struct EntityGraphBuilder<'a> {
    registry: &'a ModuleRegistry,
    resolver: ModuleResolver,
    rep: SchemaObjectRepresentation,
}

impl<'a> EntityGraphBuilder<'a> {
    /// Create a builder over a module registry
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self {
            registry,
            resolver: ModuleResolver::new(registry),
            rep: SchemaObjectRepresentation::default(),
        }
    }

    /// Build the full representation from the catalog schema text.
    pub fn build(mut self, schema_text: &str) -> Result<SchemaObjectRepresentation> {
        let sdl = format!("{}{}", directives::directive_definitions(), schema_text);
        let compiled = CompiledSchema::compile(&sdl)?;

        for object in compiled.objects() {
            self.process_entity(object, &compiled)?;
        }

        let alias_map = paths::build_alias_map(&self.rep);
        tracing::debug!(
            entities = self.rep.len(),
            paths = alias_map.len(),
            "built schema object representation"
        );

        let mut rep = self.rep;
        rep.schema_properties_map = alias_map;
        Ok(rep)
    }

    fn process_entity(
        &mut self,
        object: &ObjectType<'static, String>,
        compiled: &CompiledSchema,
    ) -> Result<()> {
        let entity = object.name.as_str();
        let id = self.rep.get_or_insert(entity);

        let listeners = directives::extract_listeners(entity, &object.directives)?;
        let fields: Vec<String> = object.fields.iter().map(|f| f.name.clone()).collect();
        let resolved = self.resolver.resolve(entity)?;

        {
            let node = self.rep.get_mut(id);
            node.listeners = listeners;
            node.fields = fields;
            node.alias = resolved.alias.clone();
            node.module = Some(resolved.module.clone());
        }

        for parent_object in compiled.objects() {
            let Some(field) = parent_object
                .fields
                .iter()
                .find(|f| schema::element_type_name(&f.field_type) == entity)
            else {
                continue;
            };

            let target_prop = field.name.clone();
            let is_list = schema::is_list_type(&field.field_type);

            let parent_id = self.rep.get_or_insert(&parent_object.name);
            let parent_module = self.ensure_resolved(parent_id)?;

            if parent_module.service_name == resolved.module.service_name || parent_module.is_link
            {
                let parent_alias = self.rep.get(parent_id).alias.clone();
                let node = self.rep.get_mut(id);
                node.parents.push(ParentLink {
                    parent: parent_id,
                    target_prop,
                    is_list,
                    in_schema_parent: None,
                });
                node.fields.push(format!("{parent_alias}.id"));
            } else {
                self.attach_link_parents(
                    id,
                    parent_id,
                    &parent_module,
                    &resolved,
                    &target_prop,
                    is_list,
                )?;
            }
        }

        Ok(())
    }

    /// Module and alias for a node, resolved on first touch.
    fn ensure_resolved(&mut self, id: EntityId) -> Result<Arc<ModuleJoinerConfig>> {
        if let Some(module) = self.rep.get(id).module.clone() {
            return Ok(module);
        }

        let entity = self.rep.get(id).entity.clone();
        let ResolvedModule { module, alias } = self.resolver.resolve(&entity)?;

        let node = self.rep.get_mut(id);
        node.module = Some(module.clone());
        node.alias = alias;
        Ok(module)
    }

    /// Wire a cross-module parent through its link module(s): one synthetic
    /// link node per qualifying link module, plus the intermediate chain when
    /// the link lands on an ancestor of the current entity.
    fn attach_link_parents(
        &mut self,
        id: EntityId,
        parent_id: EntityId,
        parent_module: &Arc<ModuleJoinerConfig>,
        resolved: &ResolvedModule,
        target_prop: &str,
        is_list: bool,
    ) -> Result<()> {
        let parent_entity = self.rep.get(parent_id).entity.clone();
        let child_entity = self.rep.get(id).entity.clone();

        let query = LinkQuery {
            primary_entity: &parent_entity,
            primary_module: parent_module,
            foreign_entity: &child_entity,
            foreign_module: &resolved.module,
        };
        let metadatas = link::resolve_links(&query, self.registry, &mut self.resolver)?;

        for meta in metadatas {
            let parent_alias = self.rep.get(parent_id).alias.clone();
            let link_id = self.rep.get_or_insert(&meta.entity_name);

            {
                let node = self.rep.get_mut(link_id);
                node.parents = vec![ParentLink {
                    parent: parent_id,
                    target_prop: meta.alias.clone(),
                    is_list: false,
                    in_schema_parent: None,
                }];
                node.alias = meta.alias.clone();
                node.listeners = vec![
                    format!("{}.attached", meta.entity_name),
                    format!("{}.detached", meta.entity_name),
                ];
                node.module = Some(meta.link_module.clone());
                node.fields = meta
                    .link_module
                    .relationships
                    .iter()
                    .filter(|r| {
                        r.service_name == parent_module.service_name
                            || r.service_name == resolved.module.service_name
                    })
                    .map(|r| r.foreign_key.clone())
                    .collect();
                node.fields.push(format!("{parent_alias}.id"));
            }

            // Materialize the intermediate chain ancestor end first, each
            // node hanging off the previous one towards the link.
            let chain = &meta.intermediate_entities;
            for i in (0..chain.len()).rev() {
                let name = chain[i].clone();
                let upstream_id = if i + 1 == chain.len() {
                    link_id
                } else {
                    self.rep.get_or_insert(&chain[i + 1])
                };

                let inter_id = self.rep.get_or_insert(&name);
                self.ensure_resolved(inter_id)?;

                let inter_alias = self.rep.get(inter_id).alias.clone();
                let upstream_alias = self.rep.get(upstream_id).alias.clone();
                let node = self.rep.get_mut(inter_id);
                node.parents.push(ParentLink {
                    parent: upstream_id,
                    target_prop: inter_alias,
                    is_list: true,
                    in_schema_parent: None,
                });
                node.listeners = vec![format!("{name}.created"), format!("{name}.updated")];
                node.fields = vec!["id".to_string(), format!("{upstream_alias}.id")];
            }

            let outer_id = match chain.first() {
                Some(first) => self.rep.get_or_insert(first),
                None => link_id,
            };
            let outer_alias = self.rep.get(outer_id).alias.clone();
            let node = self.rep.get_mut(id);
            node.parents.push(ParentLink {
                parent: outer_id,
                target_prop: target_prop.to_string(),
                is_list,
                in_schema_parent: Some(parent_id),
            });
            node.fields.push(format!("{outer_alias}.id"));
        }

        Ok(())
    }
}
