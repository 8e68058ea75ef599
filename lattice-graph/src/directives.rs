//! Custom directive configuration and extraction.

use graphql_parser::schema::{Directive, Value};
use lattice_core::{LatticeError, Result};

/// A custom directive the catalog schema may (or must) carry on its object
/// types.
#[derive(Debug, Clone, Copy)]
pub struct CustomDirective {
    pub name: &'static str,
    pub definition: &'static str,
    pub is_required: bool,
}

/// The `@Listeners` directive: event names that subscribe an entity to
/// change feeds.
pub const LISTENERS: CustomDirective = CustomDirective {
    name: "Listeners",
    definition: "directive @Listeners (values: [String!]) on OBJECT",
    is_required: true,
};

/// All configured custom directives.
pub fn custom_directives() -> &'static [CustomDirective] {
    &[LISTENERS]
}

/// Declarations to prepend to the catalog schema before compiling it.
pub fn directive_definitions() -> String {
    let mut out = String::new();
    for directive in custom_directives() {
        out.push_str(directive.definition);
        out.push('\n');
    }
    out
}

/// Extract the `@Listeners` values declared on an entity.
///
/// Fails with [`LatticeError::Configuration`] naming the entity when a
/// required directive is absent.
pub fn extract_listeners(
    entity: &str,
    directives: &[Directive<'static, String>],
) -> Result<Vec<String>> {
    let mut listeners = Vec::new();

    for configured in custom_directives() {
        let found = directives.iter().find(|d| d.name == configured.name);

        let Some(directive) = found else {
            if configured.is_required {
                return Err(LatticeError::configuration(format!(
                    "the type {entity} defined in the schema is missing the @{} directive which is required",
                    configured.name
                )));
            }
            continue;
        };

        // Only array-valued arguments are supported
        listeners = directive
            .arguments
            .first()
            .map(|(_, value)| string_list(value))
            .unwrap_or_default();
    }

    Ok(listeners)
}

fn string_list(value: &Value<'static, String>) -> Vec<String> {
    match value {
        Value::List(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Enum(s) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}
