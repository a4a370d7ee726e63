//! Structural defaults applied before parsing, plus the category classifier.
//!
//! The parser relies on what happens here: keyword aliases are canonical,
//! object schemas carry an explicit `additionalProperties`, and array schemas
//! carry their bounds (and, when bounded, a positional `items` list).
pub mod classify;

use serde_json::{json, Value};
use tracing::{debug, trace, warn};

use crate::options::Options;
use crate::schema::{NodeId, SchemaGraph};
use crate::traverse;

pub use classify::{classify, Category};

/// Longest positional `items` list the normalizer will materialize.
pub const MAX_TUPLE_LENGTH: u64 = 65_535;

/// Rewrite every schema node reachable from `root` in place.
pub fn normalize(graph: &mut SchemaGraph, root: NodeId, name: Option<&str>, options: &Options) {
    // `extends` and keyword aliases change what the walk can reach
    for id in traverse::collect(graph, root) {
        canonical_keywords(graph, id);
        wrap_extends(graph, id);
    }
    let nodes = traverse::collect(graph, root);
    for &id in &nodes {
        const_to_enum(graph, id);
        escape_description(graph, id);
        if id == root {
            default_root_id(graph, id, name);
        }
        default_additional_properties(graph, id, options);
        default_array_bounds(graph, id, options);
    }
    debug!(nodes = nodes.len(), ?name, "normalized schema");
}

fn canonical_keywords(graph: &mut SchemaGraph, id: NodeId) {
    if graph.str_of(id, "id").is_some() && !graph.has(id, "$id") {
        graph.rename(id, "id", "$id");
    }
    if graph.has(id, "definitions") && !graph.has(id, "$defs") {
        graph.rename(id, "definitions", "$defs");
    }
}

fn wrap_extends(graph: &mut SchemaGraph, id: NodeId) {
    let Some(extends) = graph.get(id, "extends") else { return };
    match graph.items(extends).map(<[NodeId]>::len) {
        Some(0) => {
            graph.remove(id, "extends");
        }
        Some(_) => {}
        None => {
            let list = graph.array(vec![extends]);
            graph.link_new(list, id);
            graph.set(id, "extends", list);
        }
    }
}

fn const_to_enum(graph: &mut SchemaGraph, id: NodeId) {
    if graph.has(id, "enum") {
        return;
    }
    let Some(value) = graph.remove(id, "const") else { return };
    let list = graph.array(vec![value]);
    graph.link_new(list, id);
    graph.set(id, "enum", list);
    trace!(node = id.index(), "const rewritten as single-value enum");
}

fn escape_description(graph: &mut SchemaGraph, id: NodeId) {
    let Some(description) = graph.str_of(id, "description") else { return };
    if description.contains("*/") {
        let escaped = description.replace("*/", "* /");
        graph.set_value(id, "description", Value::String(escaped));
    }
}

fn default_root_id(graph: &mut SchemaGraph, id: NodeId, name: Option<&str>) {
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        if !graph.has(id, "$id") {
            graph.set_value(id, "$id", Value::String(name.to_string()));
        }
    }
}

/// `type` equals `wanted`, or is a list containing it.
fn has_type(graph: &SchemaGraph, id: NodeId, wanted: &str) -> bool {
    if graph.str_of(id, "type") == Some(wanted) {
        return true;
    }
    graph
        .get(id, "type")
        .and_then(|t| graph.items(t))
        .is_some_and(|ts| ts.iter().any(|&t| graph.leaf_value(t).and_then(Value::as_str) == Some(wanted)))
}

fn default_additional_properties(graph: &mut SchemaGraph, id: NodeId, options: &Options) {
    let is_object = has_type(graph, id, "object") || graph.has(id, "properties");
    if is_object && !graph.has(id, "additionalProperties") && !graph.has(id, "patternProperties") {
        graph.set_value(id, "additionalProperties", json!(options.additional_properties));
    }
}

/// Array bound as a length, saturated at `u64::MAX`.
pub(crate) fn bound(graph: &SchemaGraph, id: NodeId, key: &str) -> Option<u64> {
    graph.f64_of(id, key).map(|v| v.clamp(0.0, u64::MAX as f64) as u64)
}

fn default_array_bounds(graph: &mut SchemaGraph, id: NodeId, options: &Options) {
    if !(has_type(graph, id, "array") || graph.has(id, "items")) {
        return;
    }
    if options.ignore_min_and_max_items {
        graph.remove(id, "minItems");
        graph.remove(id, "maxItems");
        return;
    }
    if !graph.has(id, "minItems") {
        graph.set_value(id, "minItems", json!(0));
    }
    let min = bound(graph, id, "minItems").unwrap_or(0);
    let mut max = bound(graph, id, "maxItems");
    if let (Some(m), Some(ceiling)) = (max, options.max_items_ceiling()) {
        if m.saturating_sub(min) > ceiling {
            trace!(node = id.index(), max = m, min, ceiling, "maxItems dropped above ceiling");
            graph.remove(id, "maxItems");
            max = None;
        }
    }
    if let Some(m) = max.filter(|&m| m > MAX_TUPLE_LENGTH) {
        trace!(node = id.index(), max = m, "maxItems dropped above tuple limit");
        graph.remove(id, "maxItems");
        max = None;
    }
    if min > MAX_TUPLE_LENGTH {
        warn!(node = id.index(), min, "minItems above tuple limit; items left unexpanded");
        return;
    }

    let Some(items) = graph.get(id, "items") else { return };
    if graph.is_object(items) {
        if max.is_some() || min > 0 {
            let len = usize::try_from(max.unwrap_or(0).max(min)).unwrap_or(usize::MAX);
            let list = graph.array(vec![items; len]);
            graph.link_new(list, id);
            graph.set(id, "items", list);
            if max.is_none() {
                graph.set(id, "additionalItems", items);
            }
        }
    } else if let (Some(list), Some(m)) = (graph.items(items).map(<[NodeId]>::to_vec), max) {
        let m = usize::try_from(m).unwrap_or(usize::MAX);
        if list.len() > m {
            let truncated = graph.array(list[..m].to_vec());
            graph.link_new(truncated, id);
            graph.set(id, "items", truncated);
        }
    }
}
