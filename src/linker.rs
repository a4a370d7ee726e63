//! Parent links for upward lookups (document root, definitions).
use tracing::debug;

use crate::schema::{Node, NodeId, SchemaGraph};

/// Give every container node under `node` a back-reference to the first
/// container that reached it. Already-linked nodes are left untouched, which
/// also stops the walk on cycles.
pub fn link(graph: &SchemaGraph, node: NodeId, parent: Option<NodeId>) -> NodeId {
    let mut linked = 0usize;
    link_inner(graph, node, parent, &mut linked);
    debug!(linked, "linked schema graph");
    node
}

fn link_inner(graph: &SchemaGraph, node: NodeId, parent: Option<NodeId>, linked: &mut usize) {
    let children: &[NodeId] = match graph.node(node) {
        Node::Leaf(_) => return,
        Node::Array(items) => items,
        Node::Object(_) => &[],
    };
    if !graph.try_link(node, parent) {
        return;
    }
    *linked += 1;
    for &child in children {
        link_inner(graph, child, Some(node), linked);
    }
    if let Some(map) = graph.entries(node) {
        for &child in map.values() {
            link_inner(graph, child, Some(node), linked);
        }
    }
}
