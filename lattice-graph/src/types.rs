//! Entity graph representation types.

use lattice_core::{EntityId, ModuleJoinerConfig};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// A resolved parent relationship of an entity.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ParentLink {
    /// The parent node actually used for graph traversal
    pub parent: EntityId,

    /// Property name under which the parent exposes this child
    pub target_prop: String,

    /// Whether that property is a collection
    pub is_list: bool,

    /// The parent as originally declared in the flattened schema, kept only
    /// when a link chain was inferred between the two, to reconstruct the
    /// human-facing shortcut path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_schema_parent: Option<EntityId>,
}

/// One node of the entity graph.
#[derive(Debug, Clone, Serialize)]
pub struct EntityRepresentation {
    /// Entity name as declared in the schema
    pub entity: String,

    /// Externally-facing root path segment; non-empty once the build
    /// completes
    pub alias: String,

    pub parents: Vec<ParentLink>,

    /// Event names subscribing this entity to change feeds
    pub listeners: Vec<String>,

    /// Owning module descriptor, shared with the registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<Arc<ModuleJoinerConfig>>,

    /// Field and foreign-key names used to compute flattened projections
    pub fields: Vec<String>,
}

impl EntityRepresentation {
    pub(crate) fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            alias: String::new(),
            parents: Vec::new(),
            listeners: Vec::new(),
            module: None,
            fields: Vec::new(),
        }
    }

    /// Service name of the owning module, if resolved
    pub fn service_name(&self) -> Option<&str> {
        self.module.as_deref().map(|m| m.service_name.as_str())
    }
}

/// One entry of the dotted alias path index.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PathEntry {
    /// Node the path addresses
    pub entity: EntityId,

    /// Canonical path this entry is a shortcut of, when the shortcut and
    /// canonical chains share the same root alias segment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_cut_of: Option<String>,
}

/// The finished build output: an arena of entity nodes plus the dotted alias
/// path index addressing them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaObjectRepresentation {
    entities: Vec<EntityRepresentation>,
    by_name: HashMap<String, EntityId>,

    /// Dotted alias path to the node it addresses
    pub schema_properties_map: HashMap<String, PathEntry>,
}

impl SchemaObjectRepresentation {
    /// Get the node for an entity name, creating an empty one on first
    /// access.
    pub fn get_or_insert(&mut self, entity: &str) -> EntityId {
        if let Some(&id) = self.by_name.get(entity) {
            return id;
        }
        let id = EntityId::from_index(self.entities.len());
        self.entities.push(EntityRepresentation::new(entity));
        self.by_name.insert(entity.to_string(), id);
        id
    }

    /// Id of an entity by name
    pub fn id_of(&self, entity: &str) -> Option<EntityId> {
        self.by_name.get(entity).copied()
    }

    /// Node by id
    pub fn get(&self, id: EntityId) -> &EntityRepresentation {
        &self.entities[id.index()]
    }

    /// Mutable node by id
    pub fn get_mut(&mut self, id: EntityId) -> &mut EntityRepresentation {
        &mut self.entities[id.index()]
    }

    /// Node by entity name
    pub fn get_by_name(&self, entity: &str) -> Option<&EntityRepresentation> {
        self.id_of(entity).map(|id| self.get(id))
    }

    /// Iterate nodes in creation order
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &EntityRepresentation)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, rep)| (EntityId::from_index(i), rep))
    }

    /// Number of nodes in the graph
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the graph holds no nodes
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Resolve a dotted alias path to the node it addresses
    pub fn resolve_path(&self, path: &str) -> Option<&EntityRepresentation> {
        self.schema_properties_map
            .get(path)
            .map(|entry| self.get(entry.entity))
    }
}
