//! Module-join configuration model.
//!
//! A [`ModuleJoinerConfig`] describes how one domain module exposes its
//! entities to the rest of the system: the aliases they are addressed by, the
//! foreign-key slots other modules may link against, and (for link modules)
//! the pair of relationships being joined. The full, ordered set of
//! configurations forms the [`ModuleRegistry`] that every build receives as
//! an explicit input.

use crate::error::{LatticeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An externally-facing alias under which a module exposes one of its
/// entities.
///
/// A single declaration may carry several names (singular/plural forms). When
/// `entity` is set it overrides name-based matching during alias resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinerAlias {
    #[serde(default)]
    pub name: Vec<String>,

    /// Explicit entity override; matched case-insensitively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl JoinerAlias {
    /// Create an alias declaration from one or more names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: names.into_iter().map(Into::into).collect(),
            entity: None,
        }
    }

    /// Set the explicit entity this alias addresses
    pub fn for_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

/// One side of a link module's join: the service it points at and the
/// foreign-key slot used to reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinerRelationship {
    pub service_name: String,
    pub foreign_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

impl JoinerRelationship {
    /// Create a relationship descriptor
    pub fn new(service_name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            foreign_key: foreign_key.into(),
            primary_key: None,
        }
    }
}

/// The relationship half of an `extends` declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtendsRelationship {
    /// Registered service name of the link surfacing under the parent
    pub service_name: String,
    pub primary_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

/// Declaration of how a link module surfaces under a parent module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinerExtends {
    /// Service the link extends
    pub service_name: String,
    pub relationship: ExtendsRelationship,
}

impl JoinerExtends {
    /// Create an extends declaration
    pub fn new(
        service_name: impl Into<String>,
        link_service_name: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            relationship: ExtendsRelationship {
                service_name: link_service_name.into(),
                primary_key: primary_key.into(),
                foreign_key: None,
            },
        }
    }
}

/// Descriptor of a domain module's entities, aliases, and relationships.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleJoinerConfig {
    pub service_name: String,

    /// The module's own nested schema, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<JoinerAlias>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<JoinerRelationship>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<JoinerExtends>,

    /// Foreign-key slot name to the entity it references
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub linkable_keys: BTreeMap<String, String>,

    /// Whether this module's sole purpose is persisting a many-to-many
    /// association between two other modules' entities
    #[serde(default)]
    pub is_link: bool,
}

impl ModuleJoinerConfig {
    /// Create an empty configuration for a service
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            schema: None,
            alias: Vec::new(),
            relationships: Vec::new(),
            extends: Vec::new(),
            linkable_keys: BTreeMap::new(),
            is_link: false,
        }
    }

    /// Set the module's own schema text
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Add an alias declaration
    pub fn with_alias(mut self, alias: JoinerAlias) -> Self {
        self.alias.push(alias);
        self
    }

    /// Add a relationship descriptor
    pub fn with_relationship(mut self, relationship: JoinerRelationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Add an extends declaration
    pub fn with_extends(mut self, extends: JoinerExtends) -> Self {
        self.extends.push(extends);
        self
    }

    /// Map a linkable foreign-key slot to the entity it references
    pub fn with_linkable_key(
        mut self,
        foreign_key: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        self.linkable_keys.insert(foreign_key.into(), entity.into());
        self
    }

    /// Mark this module as a link module
    pub fn as_link(mut self) -> Self {
        self.is_link = true;
        self
    }
}

/// The full, ordered list of module-join configurations for one build.
///
/// Registry order is significant: when two modules both declare an entity,
/// the first module wins ownership, deterministically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleRegistry {
    modules: Vec<Arc<ModuleJoinerConfig>>,
}

impl ModuleRegistry {
    /// Create a registry from an ordered list of configurations
    pub fn new<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = ModuleJoinerConfig>,
    {
        Self {
            modules: modules.into_iter().map(Arc::new).collect(),
        }
    }

    /// Load a registry from a JSON array of configurations
    pub fn from_json(json: &str) -> Result<Self> {
        let modules: Vec<ModuleJoinerConfig> = serde_json::from_str(json).map_err(|e| {
            LatticeError::configuration(format!("invalid module registry JSON: {e}"))
        })?;
        tracing::debug!(modules = modules.len(), "loaded module registry");
        Ok(Self::new(modules))
    }

    /// Iterate configurations in registry order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModuleJoinerConfig>> {
        self.modules.iter()
    }

    /// Iterate only the link modules, in registry order
    pub fn links(&self) -> impl Iterator<Item = &Arc<ModuleJoinerConfig>> {
        self.modules.iter().filter(|m| m.is_link)
    }

    /// Find a configuration by service name
    pub fn get(&self, service_name: &str) -> Option<&Arc<ModuleJoinerConfig>> {
        self.modules.iter().find(|m| m.service_name == service_name)
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
