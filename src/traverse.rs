//! Keyword-aware walk over the schema positions of a document.
//!
//! Visits each object node reachable through a schema-valued keyword exactly
//! once (identity-guarded), parents before children.
use std::collections::HashSet;
use once_cell::sync::Lazy;

use crate::schema::{Node, NodeId, SchemaGraph};

/// Keywords whose values are either handled explicitly below or never hold schemas.
static SKIPPED_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "id", "$defs", "$id", "$schema", "title", "description", "default",
        "multipleOf", "maximum", "exclusiveMaximum", "minimum", "exclusiveMinimum",
        "maxLength", "minLength", "pattern", "additionalItems", "items", "maxItems",
        "minItems", "uniqueItems", "maxProperties", "minProperties", "required",
        "additionalProperties", "definitions", "properties", "patternProperties",
        "dependencies", "enum", "type", "allOf", "anyOf", "oneOf", "not",
        "const", "tsEnumNames", "tsType", "$ref", "extends",
    ]
    .into_iter()
    .collect()
});

/// Call `visit(node, key)` for every schema node under `root`. `key` is the
/// property name or array index the node was found under (`None` for the root
/// and for single-schema keywords such as `items`).
pub fn traverse(graph: &SchemaGraph, root: NodeId, mut visit: impl FnMut(NodeId, Option<&str>)) {
    let mut seen = HashSet::new();
    walk(graph, root, None, &mut seen, &mut visit);
}

/// Every schema node under `root`, in visiting order.
pub fn collect(graph: &SchemaGraph, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    traverse(graph, root, |id, _| out.push(id));
    out
}

fn walk(
    graph: &SchemaGraph,
    id: NodeId,
    key: Option<&str>,
    seen: &mut HashSet<NodeId>,
    visit: &mut impl FnMut(NodeId, Option<&str>),
) {
    let Some(map) = graph.entries(id) else { return };
    if !seen.insert(id) {
        return;
    }
    visit(id, key);

    for keyword in ["anyOf", "allOf", "oneOf"] {
        if let Some(list) = map.get(keyword) {
            walk_array(graph, *list, seen, visit);
        }
    }
    for keyword in ["properties", "patternProperties"] {
        if let Some(props) = map.get(keyword) {
            walk_members(graph, *props, seen, visit);
        }
    }
    for keyword in ["additionalProperties", "additionalItems", "not"] {
        if let Some(child) = map.get(keyword) {
            walk(graph, *child, None, seen, visit);
        }
    }
    for keyword in ["items", "extends"] {
        if let Some(child) = map.get(keyword) {
            match graph.node(*child) {
                Node::Array(_) => walk_array(graph, *child, seen, visit),
                _ => walk(graph, *child, None, seen, visit),
            }
        }
    }
    for keyword in ["dependencies", "definitions", "$defs"] {
        if let Some(child) = map.get(keyword) {
            walk_members(graph, *child, seen, visit);
        }
    }

    // definitions may hang off any unknown keyword
    for (k, child) in map {
        if !SKIPPED_KEYS.contains(k.as_str()) {
            walk_members(graph, *child, seen, visit);
        }
    }
}

fn walk_array(
    graph: &SchemaGraph,
    id: NodeId,
    seen: &mut HashSet<NodeId>,
    visit: &mut impl FnMut(NodeId, Option<&str>),
) {
    let Some(items) = graph.items(id) else { return };
    for (i, child) in items.iter().enumerate() {
        walk(graph, *child, Some(&i.to_string()), seen, visit);
    }
}

/// Object values keyed by name, or array members keyed by index.
fn walk_members(
    graph: &SchemaGraph,
    id: NodeId,
    seen: &mut HashSet<NodeId>,
    visit: &mut impl FnMut(NodeId, Option<&str>),
) {
    match graph.node(id) {
        Node::Object(map) => {
            for (k, child) in map {
                walk(graph, *child, Some(k), seen, visit);
            }
        }
        Node::Array(_) => walk_array(graph, id, seen, visit),
        Node::Leaf(_) => {}
    }
}
