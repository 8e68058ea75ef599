//! Lattice Graph - schema-object-representation builder.
//!
//! This crate consumes a composite catalog schema (GraphQL SDL text) together
//! with a registry of module-join configurations and produces an in-memory
//! graph of entities annotated with their owning module, externally-facing
//! alias, parent relationships (direct or link-mediated), and the dotted
//! alias paths that address them.
//!
//! # Examples
//!
//! ```
//! use lattice_core::{JoinerAlias, ModuleJoinerConfig, ModuleRegistry};
//! use lattice_graph::build_schema_object_representation;
//!
//! let registry = ModuleRegistry::new([ModuleJoinerConfig::new("productService")
//!     .with_schema(
//!         "type Product { id: ID, variants: [ProductVariant] }\n\
//!          type ProductVariant { id: ID }",
//!     )
//!     .with_alias(JoinerAlias::new(["product", "products"]))
//!     .with_alias(JoinerAlias::new(["variant", "variants"]).for_entity("ProductVariant"))]);
//!
//! let schema = r#"
//!     type Product @Listeners(values: ["product.created", "product.updated"]) {
//!         id: ID
//!         title: String
//!         variants: [ProductVariant]
//!     }
//!
//!     type ProductVariant @Listeners(values: ["variant.created", "variant.updated"]) {
//!         id: ID
//!         sku: String
//!     }
//! "#;
//!
//! let rep = build_schema_object_representation(schema, &registry)?;
//!
//! let variant = rep.resolve_path("product.variants").unwrap();
//! assert_eq!(variant.entity, "ProductVariant");
//! assert!(variant.fields.contains(&"product.id".to_string()));
//! # Ok::<(), lattice_core::LatticeError>(())
//! ```

pub mod builder;
pub mod directives;
pub mod link;
pub mod paths;
pub mod resolve;
pub mod schema;
pub mod types;

// Re-export main types
pub use builder::EntityGraphBuilder;
pub use link::{LinkMetadata, LinkQuery};
pub use resolve::{ModuleResolver, ResolvedModule};
pub use schema::CompiledSchema;
pub use types::{EntityRepresentation, ParentLink, PathEntry, SchemaObjectRepresentation};

pub use lattice_core::{LatticeError, Result};

use lattice_core::ModuleRegistry;

/// Build the schema object representation for one catalog schema.
///
/// A pure function of its two inputs: independent builds share no mutable
/// state. Any failure aborts the whole build with no partial output.
pub fn build_schema_object_representation(
    schema: &str,
    registry: &ModuleRegistry,
) -> Result<SchemaObjectRepresentation> {
    EntityGraphBuilder::new(registry).build(schema)
}
