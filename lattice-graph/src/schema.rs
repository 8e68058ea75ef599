//! Schema compilation: SDL text into a queryable, declaration-ordered type
//! map.
//!
//! Compilation is deliberately shallow. The builder only needs to discover
//! custom directives and structural relationships, so a successful parse plus
//! an object-type index is all a [`CompiledSchema`] provides.

use graphql_parser::schema::{Definition, ObjectType, Type, TypeDefinition};
use lattice_core::{LatticeError, Result};
use std::collections::HashMap;

/// A parsed schema with its object types indexed by name.
///
/// Declaration order is preserved: [`CompiledSchema::objects`] iterates types
/// in the order they appear in the source text, which keeps every downstream
/// pass deterministic.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    objects: Vec<ObjectType<'static, String>>,
    index: HashMap<String, usize>,
}

impl CompiledSchema {
    /// Compile SDL text into a type map.
    ///
    /// Fails with [`LatticeError::Schema`] when the text does not parse.
    pub fn compile(sdl: &str) -> Result<Self> {
        let document = graphql_parser::parse_schema::<String>(sdl)
            .map_err(|e| LatticeError::schema(format!("failed to parse schema: {e}")))?
            .into_static();

        let mut objects = Vec::new();
        let mut index = HashMap::new();

        for definition in document.definitions {
            if let Definition::TypeDefinition(TypeDefinition::Object(object)) = definition {
                index.insert(object.name.clone(), objects.len());
                objects.push(object);
            }
        }

        tracing::trace!(types = objects.len(), "compiled schema");

        Ok(Self { objects, index })
    }

    /// Whether the schema declares an object type with this name
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up an object type declaration by name
    pub fn object(&self, name: &str) -> Option<&ObjectType<'static, String>> {
        self.index.get(name).map(|&i| &self.objects[i])
    }

    /// Iterate object types in declaration order
    pub fn objects(&self) -> impl Iterator<Item = &ObjectType<'static, String>> {
        self.objects.iter()
    }

    /// Number of declared object types
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the schema declares no object types
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Innermost named type of a field, with list and non-null wrappers stripped.
pub fn element_type_name<'a>(ty: &'a Type<'static, String>) -> &'a str {
    match ty {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => element_type_name(inner),
    }
}

/// Whether a field type is a collection at any wrapping depth.
pub fn is_list_type(ty: &Type<'static, String>) -> bool {
    match ty {
        Type::NamedType(_) => false,
        Type::ListType(_) => true,
        Type::NonNullType(inner) => is_list_type(inner),
    }
}
