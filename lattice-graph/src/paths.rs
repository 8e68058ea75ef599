//! Dotted alias path indexing over the finished graph.
//!
//! Walks every node's parent chains leaf-to-root, prepending each ancestor's
//! target property to produce the dotted paths that address the node. A
//! parent link carrying an `in_schema_parent` is walked twice: once along the
//! actual chain (canonical path, through the synthetic link and intermediate
//! nodes) and once along the chain as declared in the flattened schema
//! (shortcut path).

use crate::types::{PathEntry, SchemaObjectRepresentation};
use lattice_core::EntityId;
use std::collections::HashMap;

/// Build the dotted alias path index for a finished graph.
///
/// Diamond relationships yield multiple valid paths per entity; all are
/// kept. Later writes to the same path key overwrite earlier ones. A parent
/// edge back onto the current walk is a cycle and contributes no path.
pub fn build_alias_map(rep: &SchemaObjectRepresentation) -> HashMap<String, PathEntry> {
    let mut map = HashMap::new();
    let mut trail = Vec::new();

    for (id, _) in rep.entities() {
        for alias in collect_alias_paths(rep, id, "", &mut trail) {
            map.insert(
                alias.path,
                PathEntry {
                    entity: id,
                    short_cut_of: alias.short_cut_of,
                },
            );
        }
    }

    map
}

struct AliasPath {
    path: String,
    short_cut_of: Option<String>,
}

fn collect_alias_paths(
    rep: &SchemaObjectRepresentation,
    current: EntityId,
    suffix: &str,
    trail: &mut Vec<EntityId>,
) -> Vec<AliasPath> {
    let node = rep.get(current);
    let mut out = Vec::new();
    trail.push(current);

    for parent in &node.parents {
        // A parent already on the walk closes a cycle; skip the edge.
        if trail.contains(&parent.parent) {
            continue;
        }

        // Built child-to-parent so the finished path reads parent-to-child.
        let prefixed = join(&parent.target_prop, suffix);

        let canonical: Vec<String> = collect_alias_paths(rep, parent.parent, &prefixed, trail)
            .into_iter()
            .map(|alias| alias.path)
            .collect();
        let shortcut_target = canonical.first().cloned();

        out.extend(canonical.into_iter().map(|path| AliasPath {
            path,
            short_cut_of: None,
        }));

        // An in-schema parent means a link chain was inferred; the declared
        // chain becomes the shortcut of the canonical path above, provided
        // both enter the graph through the same root alias.
        if let Some(in_schema) = parent.in_schema_parent {
            for declared in collect_alias_paths(rep, in_schema, &prefixed, trail) {
                let short_cut_of = shortcut_target
                    .as_ref()
                    .filter(|target| root_segment(target) == root_segment(&declared.path))
                    .cloned();
                out.push(AliasPath {
                    path: declared.path,
                    short_cut_of,
                });
            }
        }
    }

    out.push(AliasPath {
        path: join(&node.alias, suffix),
        short_cut_of: None,
    });

    trail.pop();
    out
}

fn join(prefix: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}.{suffix}")
    }
}

fn root_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}
