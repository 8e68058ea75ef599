//! Shared module-registry fixtures for integration tests.

use lattice_core::{
    JoinerAlias, JoinerExtends, JoinerRelationship, ModuleJoinerConfig, ModuleRegistry,
};

pub fn product_module() -> ModuleJoinerConfig {
    ModuleJoinerConfig::new("productService")
        .with_schema(
            "type Product { id: ID, variants: [ProductVariant] }\n\
             type ProductVariant { id: ID }",
        )
        .with_alias(JoinerAlias::new(["product", "products"]))
        .with_alias(JoinerAlias::new(["variant", "variants"]).for_entity("ProductVariant"))
        .with_linkable_key("product_id", "Product")
        .with_linkable_key("variant_id", "ProductVariant")
}

pub fn promotion_module() -> ModuleJoinerConfig {
    ModuleJoinerConfig::new("promotionService")
        .with_schema("type Promotion { id: ID }")
        .with_alias(JoinerAlias::new(["promotion", "promotions"]))
        .with_linkable_key("promotion_id", "Promotion")
}

pub fn order_module() -> ModuleJoinerConfig {
    ModuleJoinerConfig::new("orderService")
        .with_schema(
            "type Order { id: ID, items: [LineItem] }\n\
             type LineItem { id: ID }",
        )
        .with_alias(JoinerAlias::new(["order", "orders"]))
        .with_alias(JoinerAlias::new(["line_item", "line_items"]).for_entity("LineItem"))
        .with_linkable_key("order_id", "Order")
}

pub fn product_promotion_link() -> ModuleJoinerConfig {
    ModuleJoinerConfig::new("productPromotionLinkService")
        .as_link()
        .with_relationship(JoinerRelationship::new("productService", "product_id"))
        .with_relationship(JoinerRelationship::new("promotionService", "promotion_id"))
        .with_extends(JoinerExtends::new(
            "productService",
            "productPromotionLinkService",
            "product_id",
        ))
        .with_alias(JoinerAlias::new(["product_promotion"]).for_entity("LinkProductPromotion"))
}

pub fn product_order_link() -> ModuleJoinerConfig {
    ModuleJoinerConfig::new("productOrderLinkService")
        .as_link()
        .with_relationship(JoinerRelationship::new("productService", "product_id"))
        .with_relationship(JoinerRelationship::new("orderService", "order_id"))
        .with_extends(JoinerExtends::new(
            "productService",
            "productOrderLinkService",
            "product_id",
        ))
        .with_alias(JoinerAlias::new(["product_order"]).for_entity("LinkProductOrder"))
}

pub fn registry(modules: impl IntoIterator<Item = ModuleJoinerConfig>) -> ModuleRegistry {
    ModuleRegistry::new(modules)
}
