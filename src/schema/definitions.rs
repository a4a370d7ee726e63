//! Named definitions (`$defs` / `definitions`) reachable from a document root.
use std::collections::HashMap;
use indexmap::IndexMap;

use super::{NodeId, SchemaGraph};
use crate::traverse;

#[derive(Debug, Clone, Default)]
pub struct Definitions {
    by_name: IndexMap<String, NodeId>,
    by_node: HashMap<NodeId, String>,
}

impl Definitions {
    /// Gather every definitions map found at a schema position under `root`.
    /// The first registration of a name wins, and a node answers to the first
    /// name it was registered under.
    pub fn collect(graph: &SchemaGraph, root: NodeId) -> Self {
        let mut out = Self::default();
        traverse::traverse(graph, root, |id, _| {
            for keyword in ["$defs", "definitions"] {
                let Some(defs) = graph.get(id, keyword).and_then(|d| graph.entries(d)) else {
                    continue;
                };
                for (name, &node) in defs {
                    if out.by_name.contains_key(name) {
                        continue;
                    }
                    out.by_name.insert(name.clone(), node);
                    out.by_node.entry(node).or_insert_with(|| name.clone());
                }
            }
        });
        out
    }

    /// The definition key a node was registered under, if any.
    pub fn key_of(&self, node: NodeId) -> Option<&str> {
        self.by_node.get(&node).map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize { self.by_name.len() }

    pub fn is_empty(&self) -> bool { self.by_name.is_empty() }
}
