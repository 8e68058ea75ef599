//! End-to-end build scenarios over the full pipeline.

mod common;

use common::*;
use lattice_core::{JoinerAlias, ModuleJoinerConfig};
use lattice_graph::link::{self, LinkQuery};
use lattice_graph::resolve::ModuleResolver;
use lattice_graph::build_schema_object_representation;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lattice_graph=debug")
        .try_init();
}

// ============================================================================
// Same-module parents
// ============================================================================

#[test]
fn test_same_module_parent() {
    init_tracing();

    let registry = registry([product_module()]);
    let schema = r#"
        type Product @Listeners(values: ["product.created", "product.updated"]) {
            id: ID
            title: String
            variants: [ProductVariant]
        }

        type ProductVariant @Listeners(values: ["variant.created", "variant.updated"]) {
            id: ID
            sku: String
        }
    "#;

    let rep = build_schema_object_representation(schema, &registry).unwrap();
    assert_eq!(rep.len(), 2);

    let product = rep.get_by_name("Product").unwrap();
    assert_eq!(product.alias, "product");
    assert_eq!(product.service_name(), Some("productService"));
    assert_eq!(product.listeners, vec!["product.created", "product.updated"]);
    assert!(product.parents.is_empty());
    assert_eq!(product.fields, vec!["id", "title", "variants"]);

    let variant = rep.get_by_name("ProductVariant").unwrap();
    assert_eq!(variant.alias, "variant");
    assert_eq!(variant.parents.len(), 1);

    let parent = &variant.parents[0];
    assert_eq!(rep.get(parent.parent).entity, "Product");
    assert_eq!(parent.target_prop, "variants");
    assert!(parent.is_list);
    assert!(parent.in_schema_parent.is_none());
    assert!(variant.fields.contains(&"product.id".to_string()));
}

#[test]
fn test_alias_paths_for_same_module_parent() {
    let registry = registry([product_module()]);
    let schema = r#"
        type Product @Listeners(values: ["product.created"]) {
            id: ID
            variants: [ProductVariant]
        }

        type ProductVariant @Listeners(values: ["variant.created"]) {
            id: ID
        }
    "#;

    let rep = build_schema_object_representation(schema, &registry).unwrap();

    assert_eq!(rep.resolve_path("product").unwrap().entity, "Product");
    assert_eq!(rep.resolve_path("variant").unwrap().entity, "ProductVariant");
    assert_eq!(
        rep.resolve_path("product.variants").unwrap().entity,
        "ProductVariant"
    );
    assert!(rep.resolve_path("product.promotions").is_none());
}

#[test]
fn test_self_referencing_entity_builds() {
    let category = ModuleJoinerConfig::new("categoryService")
        .with_schema("type Category { id: ID, children: [Category] }")
        .with_alias(JoinerAlias::new(["category", "categories"]));
    let registry = registry([category]);
    let schema = r#"
        type Category @Listeners(values: ["category.created"]) {
            id: ID
            children: [Category]
        }
    "#;

    let rep = build_schema_object_representation(schema, &registry).unwrap();

    assert_eq!(rep.len(), 1);
    let node = rep.get_by_name("Category").unwrap();
    assert_eq!(node.parents.len(), 1);
    assert_eq!(rep.get(node.parents[0].parent).entity, "Category");
    assert!(node.fields.contains(&"category.id".to_string()));

    // The self edge closes a cycle and yields no dotted path of its own.
    assert_eq!(rep.resolve_path("category").unwrap().entity, "Category");
    assert_eq!(rep.schema_properties_map.len(), 1);
}

// ============================================================================
// Direct link between two modules
// ============================================================================

const DIRECT_LINK_SCHEMA: &str = r#"
    type Product @Listeners(values: ["product.created"]) {
        id: ID
        title: String
        promotions: [Promotion]
    }

    type Promotion @Listeners(values: ["promotion.created"]) {
        id: ID
        code: String
    }
"#;

#[test]
fn test_direct_link_resolution() {
    let registry = registry([product_module(), promotion_module(), product_promotion_link()]);
    let mut resolver = ModuleResolver::new(&registry);

    let primary_module = registry.get("productService").unwrap();
    let foreign_module = registry.get("promotionService").unwrap();
    let query = LinkQuery {
        primary_entity: "Product",
        primary_module,
        foreign_entity: "Promotion",
        foreign_module,
    };

    let metadatas = link::resolve_links(&query, &registry, &mut resolver).unwrap();
    assert_eq!(metadatas.len(), 1);

    let meta = &metadatas[0];
    assert_eq!(meta.entity_name, "LinkProductPromotion");
    assert_eq!(meta.alias, "product_promotion");
    assert_eq!(meta.link_module.service_name, "productPromotionLinkService");
    assert!(meta.intermediate_entities.is_empty());
}

#[test]
fn test_direct_link_build() {
    let registry = registry([product_module(), promotion_module(), product_promotion_link()]);
    let rep = build_schema_object_representation(DIRECT_LINK_SCHEMA, &registry).unwrap();

    // Product, Promotion, plus the synthetic link node.
    assert_eq!(rep.len(), 3);

    let link_node = rep.get_by_name("LinkProductPromotion").unwrap();
    assert_eq!(link_node.alias, "product_promotion");
    assert_eq!(
        link_node.listeners,
        vec!["LinkProductPromotion.attached", "LinkProductPromotion.detached"]
    );
    assert_eq!(link_node.fields, vec!["product_id", "promotion_id", "product.id"]);
    assert_eq!(link_node.service_name(), Some("productPromotionLinkService"));
    assert_eq!(link_node.parents.len(), 1);
    assert_eq!(rep.get(link_node.parents[0].parent).entity, "Product");
    assert_eq!(link_node.parents[0].target_prop, "product_promotion");

    let promotion = rep.get_by_name("Promotion").unwrap();
    assert_eq!(promotion.parents.len(), 1);

    let parent = &promotion.parents[0];
    assert_eq!(rep.get(parent.parent).entity, "LinkProductPromotion");
    assert_eq!(parent.target_prop, "promotions");
    assert!(parent.is_list);
    let in_schema = parent.in_schema_parent.unwrap();
    assert_eq!(rep.get(in_schema).entity, "Product");
    assert!(promotion.fields.contains(&"product_promotion.id".to_string()));
}

#[test]
fn test_direct_link_alias_paths() {
    let registry = registry([product_module(), promotion_module(), product_promotion_link()]);
    let rep = build_schema_object_representation(DIRECT_LINK_SCHEMA, &registry).unwrap();

    assert_eq!(
        rep.resolve_path("product.product_promotion.promotions").unwrap().entity,
        "Promotion"
    );
    assert_eq!(
        rep.resolve_path("product_promotion.promotions").unwrap().entity,
        "Promotion"
    );

    // The declared relationship becomes a shortcut of the canonical chain.
    let shortcut = rep.schema_properties_map.get("product.promotions").unwrap();
    assert_eq!(rep.get(shortcut.entity).entity, "Promotion");
    assert_eq!(
        shortcut.short_cut_of.as_deref(),
        Some("product.product_promotion.promotions")
    );
}

// ============================================================================
// Indirect link through an intermediate entity
// ============================================================================

const INDIRECT_LINK_SCHEMA: &str = r#"
    type Product @Listeners(values: ["product.created"]) {
        id: ID
        line_items: [LineItem]
    }

    type LineItem @Listeners(values: ["line_item.created"]) {
        id: ID
        quantity: Int
    }
"#;

#[test]
fn test_indirect_link_build() {
    init_tracing();

    let registry = registry([product_module(), order_module(), product_order_link()]);
    let rep = build_schema_object_representation(INDIRECT_LINK_SCHEMA, &registry).unwrap();

    // Product, LineItem, link node, synthesized Order.
    assert_eq!(rep.len(), 4);

    let link_node = rep.get_by_name("LinkProductOrder").unwrap();
    assert_eq!(link_node.alias, "product_order");
    assert_eq!(link_node.fields, vec!["product_id", "order_id", "product.id"]);

    let order = rep.get_by_name("Order").unwrap();
    assert_eq!(order.alias, "order");
    assert_eq!(order.service_name(), Some("orderService"));
    assert_eq!(order.listeners, vec!["Order.created", "Order.updated"]);
    assert_eq!(order.fields, vec!["id", "product_order.id"]);
    assert_eq!(order.parents.len(), 1);
    assert_eq!(rep.get(order.parents[0].parent).entity, "LinkProductOrder");
    assert_eq!(order.parents[0].target_prop, "order");
    assert!(order.parents[0].is_list);

    let line_item = rep.get_by_name("LineItem").unwrap();
    assert_eq!(line_item.parents.len(), 1);

    let parent = &line_item.parents[0];
    assert_eq!(rep.get(parent.parent).entity, "Order");
    assert_eq!(parent.target_prop, "line_items");
    assert_eq!(
        rep.get(parent.in_schema_parent.unwrap()).entity,
        "Product"
    );
    assert!(line_item.fields.contains(&"order.id".to_string()));
}

#[test]
fn test_indirect_link_alias_paths() {
    let registry = registry([product_module(), order_module(), product_order_link()]);
    let rep = build_schema_object_representation(INDIRECT_LINK_SCHEMA, &registry).unwrap();

    assert_eq!(
        rep.resolve_path("product.product_order.order.line_items").unwrap().entity,
        "LineItem"
    );
    assert_eq!(rep.resolve_path("order.line_items").unwrap().entity, "LineItem");

    let shortcut = rep.schema_properties_map.get("product.line_items").unwrap();
    assert_eq!(
        shortcut.short_cut_of.as_deref(),
        Some("product.product_order.order.line_items")
    );
}

#[test]
fn test_indirect_link_with_intermediate_chain() {
    // Two hops between the linked ancestor and the catalog entity: the order
    // module nests LineItem under Shipment under Order.
    let order = ModuleJoinerConfig::new("orderService")
        .with_schema(
            "type Order { id: ID, shipments: [Shipment] }\n\
             type Shipment { id: ID, line_items: [LineItem] }\n\
             type LineItem { id: ID }",
        )
        .with_alias(JoinerAlias::new(["order", "orders"]))
        .with_alias(JoinerAlias::new(["shipment", "shipments"]).for_entity("Shipment"))
        .with_alias(JoinerAlias::new(["line_item", "line_items"]).for_entity("LineItem"))
        .with_linkable_key("order_id", "Order");

    let registry = registry([product_module(), order, product_order_link()]);
    let rep = build_schema_object_representation(INDIRECT_LINK_SCHEMA, &registry).unwrap();

    // Product, LineItem, link node, synthesized Order and Shipment.
    assert_eq!(rep.len(), 5);

    let order = rep.get_by_name("Order").unwrap();
    assert_eq!(order.fields, vec!["id", "product_order.id"]);
    assert_eq!(rep.get(order.parents[0].parent).entity, "LinkProductOrder");

    // Every node of the chain hangs off the previous one and carries its
    // upstream join key.
    let shipment = rep.get_by_name("Shipment").unwrap();
    assert_eq!(shipment.alias, "shipment");
    assert_eq!(shipment.listeners, vec!["Shipment.created", "Shipment.updated"]);
    assert_eq!(shipment.fields, vec!["id", "order.id"]);
    assert_eq!(shipment.parents.len(), 1);
    assert_eq!(rep.get(shipment.parents[0].parent).entity, "Order");
    assert_eq!(shipment.parents[0].target_prop, "shipment");
    assert!(shipment.parents[0].is_list);

    let line_item = rep.get_by_name("LineItem").unwrap();
    assert_eq!(rep.get(line_item.parents[0].parent).entity, "Shipment");
    assert!(line_item.fields.contains(&"shipment.id".to_string()));

    assert_eq!(
        rep.resolve_path("product.product_order.order.shipment.line_items")
            .unwrap()
            .entity,
        "LineItem"
    );
    let shortcut = rep.schema_properties_map.get("product.line_items").unwrap();
    assert_eq!(
        shortcut.short_cut_of.as_deref(),
        Some("product.product_order.order.shipment.line_items")
    );
}

// ============================================================================
// Determinism and idempotence
// ============================================================================

#[test]
fn test_first_module_in_registry_order_owns_contested_entity() {
    let copycat = lattice_core::ModuleJoinerConfig::new("copycatService")
        .with_schema("type Product { id: ID }")
        .with_alias(lattice_core::JoinerAlias::new(["copycat_product"]).for_entity("Product"));

    let schema = r#"type Product @Listeners(values: ["product.created"]) { id: ID }"#;

    for _ in 0..3 {
        let registry = registry([copycat.clone(), product_module()]);
        let rep = build_schema_object_representation(schema, &registry).unwrap();
        let product = rep.get_by_name("Product").unwrap();
        assert_eq!(product.service_name(), Some("copycatService"));
        assert_eq!(product.alias, "copycat_product");
    }
}

#[test]
fn test_repeated_builds_are_structurally_identical() -> anyhow::Result<()> {
    let modules = [product_module(), promotion_module(), product_promotion_link()];

    let first = build_schema_object_representation(
        DIRECT_LINK_SCHEMA,
        &registry(modules.clone()),
    )?;
    let second = build_schema_object_representation(
        DIRECT_LINK_SCHEMA,
        &registry(modules),
    )?;

    assert_eq!(
        serde_json::to_value(&first)?,
        serde_json::to_value(&second)?
    );
    Ok(())
}

#[test]
fn test_one_node_per_declared_entity() {
    let registry = registry([product_module(), promotion_module(), product_promotion_link()]);
    let rep = build_schema_object_representation(DIRECT_LINK_SCHEMA, &registry).unwrap();

    for name in ["Product", "Promotion", "LinkProductPromotion"] {
        let id = rep.id_of(name).unwrap();
        assert_eq!(rep.get(id).entity, name);
    }
    assert_eq!(rep.entities().count(), 3);
}

// ============================================================================
// Path map consistency
// ============================================================================

#[test]
fn test_every_path_resolves_to_a_node_with_matching_root_alias() {
    let registry = registry([product_module(), order_module(), product_order_link()]);
    let rep = build_schema_object_representation(INDIRECT_LINK_SCHEMA, &registry).unwrap();

    for (path, entry) in &rep.schema_properties_map {
        let node = rep.get(entry.entity);
        assert!(!node.alias.is_empty(), "node for path {path} has no alias");

        // A shortcut must address the same node as its canonical path.
        if let Some(canonical) = &entry.short_cut_of {
            let canonical_entry = rep.schema_properties_map.get(canonical).unwrap();
            assert_eq!(canonical_entry.entity, entry.entity);
        }
    }
}
