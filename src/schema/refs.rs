//! Document-local `$ref` resolution.
//!
//! `{"$ref": "#/..."}` nodes whose JSON pointer resolves inside the document are
//! replaced, at every slot that holds them, by the node they point to. Other
//! references are left in place and lowered as named references later.
use std::collections::HashSet;
use tracing::{trace, warn};

use super::{Node, NodeId, SchemaGraph};

/// Resolve a `#`-prefixed JSON pointer against `root`.
pub fn resolve_pointer(graph: &SchemaGraph, root: NodeId, pointer: &str) -> Option<NodeId> {
    let path = pointer.strip_prefix('#')?;
    if path.is_empty() {
        return Some(root);
    }
    let path = path.strip_prefix('/')?;
    let mut current = root;
    for raw in path.split('/') {
        let token = raw.replace("~1", "/").replace("~0", "~");
        current = match graph.node(current) {
            Node::Object(map) => *map.get(&token)?,
            Node::Array(items) => *items.get(token.parse::<usize>().ok()?)?,
            Node::Leaf(_) => return None,
        };
    }
    Some(current)
}

fn local_ref(graph: &SchemaGraph, id: NodeId) -> Option<&str> {
    graph.str_of(id, "$ref").filter(|r| r.starts_with('#'))
}

/// Follow a chain of local refs to the first non-ref node.
fn follow(graph: &SchemaGraph, root: NodeId, start: NodeId) -> Option<NodeId> {
    let mut current = start;
    let mut hops = HashSet::new();
    while let Some(pointer) = local_ref(graph, current) {
        if !hops.insert(current) {
            warn!(pointer, "circular $ref chain left unresolved");
            return None;
        }
        current = resolve_pointer(graph, root, pointer)?;
    }
    Some(current)
}

#[derive(Debug)]
enum Slot {
    Key(String),
    Index(usize),
}

pub fn resolve_local_refs(graph: &mut SchemaGraph, root: NodeId) {
    let mut rewrites: Vec<(NodeId, Slot, NodeId)> = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let children: Vec<(Slot, NodeId)> = match graph.node(id) {
            Node::Object(map) => map.iter().map(|(k, v)| (Slot::Key(k.clone()), *v)).collect(),
            Node::Array(items) => items.iter().enumerate().map(|(i, v)| (Slot::Index(i), *v)).collect(),
            Node::Leaf(_) => continue,
        };
        for (slot, child) in children {
            match local_ref(graph, child) {
                Some(pointer) => match follow(graph, root, child) {
                    Some(target) => {
                        trace!(pointer, "resolved local $ref");
                        rewrites.push((id, slot, target));
                        stack.push(target);
                    }
                    None => warn!(pointer, "local $ref does not resolve; kept as a named reference"),
                },
                None => stack.push(child),
            }
        }
    }

    for (owner, slot, target) in rewrites {
        match slot {
            Slot::Key(key) => {
                graph.set(owner, key, target);
            }
            Slot::Index(i) => {
                graph.set_item(owner, i, target);
            }
        }
    }
}
