//! Schema graph: an arena of JSON Schema nodes addressed by identity.
//!
//! Two slots holding the same [`NodeId`] share one node; that is how `$ref`
//! targets and self-references are expressed. Every pass keys its visited
//! sets and caches on `NodeId`, never on structural equality.
pub mod definitions;
pub mod refs;

use std::collections::HashSet;
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde_json::{Map, Value};

pub use definitions::Definitions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize { self.0 }
}

#[derive(Debug, Clone)]
pub enum Node {
    /// JSON primitive (null, bool, number, string).
    Leaf(Value),
    Array(Vec<NodeId>),
    /// Keyword map, in document order.
    Object(IndexMap<String, NodeId>),
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    /// Written once by the linker; `Some(None)` marks a linked root.
    parent: OnceCell<Option<NodeId>>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    slots: Vec<Slot>,
}

impl SchemaGraph {
    pub fn new() -> Self { Self::default() }

    /// Build a graph from a JSON document and resolve its document-local
    /// `$ref`s into shared identities.
    pub fn from_value(value: &Value) -> (Self, NodeId) {
        let mut graph = Self::new();
        let root = graph.insert_value(value);
        refs::resolve_local_refs(&mut graph, root);
        (graph, root)
    }

    pub fn len(&self) -> usize { self.slots.len() }

    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    // ---------------------------- Builders ----------------------------- //

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot { node, parent: OnceCell::new() });
        id
    }

    pub fn array(&mut self, items: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Array(items))
    }

    pub fn object(&mut self) -> NodeId {
        self.alloc(Node::Object(IndexMap::new()))
    }

    /// Deep-copy a JSON value into fresh nodes (no sharing).
    pub fn insert_value(&mut self, value: &Value) -> NodeId {
        match value {
            Value::Array(xs) => {
                let items = xs.iter().map(|x| self.insert_value(x)).collect();
                self.alloc(Node::Array(items))
            }
            Value::Object(map) => self.insert_object(map),
            primitive => self.alloc(Node::Leaf(primitive.clone())),
        }
    }

    fn insert_object(&mut self, map: &Map<String, Value>) -> NodeId {
        let entries = map
            .iter()
            .map(|(k, v)| (k.clone(), self.insert_value(v)))
            .collect();
        self.alloc(Node::Object(entries))
    }

    /// Set `key` on an object node. Returns `false` if `object` is not an object.
    pub fn set(&mut self, object: NodeId, key: impl Into<String>, child: NodeId) -> bool {
        match &mut self.slots[object.0].node {
            Node::Object(map) => {
                map.insert(key.into(), child);
                true
            }
            _ => false,
        }
    }

    /// Set `key` to a freshly inserted JSON value.
    pub fn set_value(&mut self, object: NodeId, key: impl Into<String>, value: Value) -> bool {
        let child = self.insert_value(&value);
        self.link_new(child, object);
        self.set(object, key, child)
    }

    pub fn push(&mut self, array: NodeId, child: NodeId) -> bool {
        match &mut self.slots[array.0].node {
            Node::Array(items) => {
                items.push(child);
                true
            }
            _ => false,
        }
    }

    pub fn set_item(&mut self, array: NodeId, index: usize, child: NodeId) -> bool {
        match &mut self.slots[array.0].node {
            Node::Array(items) if index < items.len() => {
                items[index] = child;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, object: NodeId, key: &str) -> Option<NodeId> {
        match &mut self.slots[object.0].node {
            Node::Object(map) => map.shift_remove(key),
            _ => None,
        }
    }

    /// Rename a keyword in place, keeping its position.
    pub fn rename(&mut self, object: NodeId, from: &str, to: &str) -> bool {
        let Node::Object(map) = &mut self.slots[object.0].node else { return false };
        let Some(index) = map.get_index_of(from) else { return false };
        if map.contains_key(to) {
            return false;
        }
        let Some((_, child)) = map.shift_remove_index(index) else { return false };
        map.shift_insert(index, to.to_string(), child);
        true
    }

    /// Shallow copy of an object node without `without`; children are shared,
    /// and the copy reports the same parent as the original.
    pub fn derive(&mut self, object: NodeId, without: &[&str]) -> NodeId {
        let node = match &self.slots[object.0].node {
            Node::Object(map) => Node::Object(
                map.iter()
                    .filter(|(k, _)| !without.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), *v))
                    .collect(),
            ),
            other => other.clone(),
        };
        let parent = self.parent(object);
        let id = self.alloc(node);
        let _ = self.slots[id.0].parent.set(parent);
        id
    }

    /// Give a node created after linking the parent it was attached under.
    pub(crate) fn link_new(&self, child: NodeId, parent: NodeId) {
        let _ = self.slots[child.0].parent.set(Some(parent));
    }

    // ----------------------------- Access ------------------------------ //

    pub fn node(&self, id: NodeId) -> &Node { &self.slots[id.0].node }

    pub fn entries(&self, id: NodeId) -> Option<&IndexMap<String, NodeId>> {
        match self.node(id) {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn items(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.node(id) {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn leaf_value(&self, id: NodeId) -> Option<&Value> {
        match self.node(id) {
            Node::Leaf(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_object(&self, id: NodeId) -> bool { matches!(self.node(id), Node::Object(_)) }

    pub fn is_array(&self, id: NodeId) -> bool { matches!(self.node(id), Node::Array(_)) }

    pub fn get(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.entries(id)?.get(key).copied()
    }

    pub fn has(&self, id: NodeId, key: &str) -> bool { self.get(id, key).is_some() }

    pub fn str_of(&self, id: NodeId, key: &str) -> Option<&str> {
        self.leaf_value(self.get(id, key)?)?.as_str()
    }

    pub fn f64_of(&self, id: NodeId, key: &str) -> Option<f64> {
        self.leaf_value(self.get(id, key)?)?.as_f64()
    }

    pub fn bool_of(&self, id: NodeId, key: &str) -> Option<bool> {
        self.leaf_value(self.get(id, key)?)?.as_bool()
    }

    /// String members of an array keyword (e.g. `required`); other members are skipped.
    pub fn strings_of(&self, id: NodeId, key: &str) -> Vec<String> {
        let Some(items) = self.get(id, key).and_then(|k| self.items(k)) else { return Vec::new() };
        items
            .iter()
            .filter_map(|&i| self.leaf_value(i)?.as_str().map(str::to_string))
            .collect()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent.get().copied().flatten()
    }

    pub fn is_linked(&self, id: NodeId) -> bool { self.slots[id.0].parent.get().is_some() }

    /// Attach `parent` unless the node is already linked (first writer wins).
    pub fn try_link(&self, id: NodeId, parent: Option<NodeId>) -> bool {
        self.slots[id.0].parent.set(parent).is_ok()
    }

    /// Follow parent links up to the enclosing document root.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut seen = HashSet::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(current) {
                break;
            }
            current = parent;
        }
        current
    }

    /// Reassemble a JSON value; a node already on the current path becomes `null`.
    pub fn to_value(&self, id: NodeId) -> Value {
        fn go(graph: &SchemaGraph, id: NodeId, path: &mut HashSet<NodeId>) -> Value {
            if !path.insert(id) {
                return Value::Null;
            }
            let out = match graph.node(id) {
                Node::Leaf(v) => v.clone(),
                Node::Array(items) => Value::Array(items.iter().map(|&i| go(graph, i, path)).collect()),
                Node::Object(map) => Value::Object(
                    map.iter().map(|(k, &v)| (k.clone(), go(graph, v, path))).collect(),
                ),
            };
            path.remove(&id);
            out
        }
        go(self, id, &mut HashSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_value_roundtrips_in_document_order() {
        let doc = json!({"b": 1, "a": [true, null, "x"], "c": {"d": 2.5}});
        let (graph, root) = SchemaGraph::from_value(&doc);
        assert_eq!(graph.to_value(root), doc);
        let keys: Vec<_> = graph.entries(root).unwrap().keys().cloned().collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn shared_children_keep_identity() {
        let mut graph = SchemaGraph::new();
        let shared = graph.insert_value(&json!({"type": "string"}));
        let root = graph.object();
        graph.set(root, "a", shared);
        graph.set(root, "b", shared);
        assert_eq!(graph.get(root, "a"), graph.get(root, "b"));
    }

    #[test]
    fn to_value_cuts_cycles() {
        let mut graph = SchemaGraph::new();
        let root = graph.object();
        graph.set(root, "self", root);
        assert_eq!(graph.to_value(root), json!({"self": null}));
    }

    #[test]
    fn derive_drops_keys_and_keeps_parent() {
        let mut graph = SchemaGraph::new();
        let root = graph.insert_value(&json!({"p": {"title": "T", "type": "string"}}));
        let child = graph.get(root, "p").unwrap();
        assert!(graph.try_link(root, None));
        assert!(graph.try_link(child, Some(root)));
        let copy = graph.derive(child, &["title"]);
        assert_ne!(copy, child);
        assert!(!graph.has(copy, "title"));
        assert_eq!(graph.str_of(copy, "type"), Some("string"));
        assert_eq!(graph.parent(copy), Some(root));
    }

    #[test]
    fn rename_keeps_position() {
        let mut graph = SchemaGraph::new();
        let root = graph.insert_value(&json!({"a": 1, "definitions": {}, "z": 2}));
        assert!(graph.rename(root, "definitions", "$defs"));
        let keys: Vec<_> = graph.entries(root).unwrap().keys().cloned().collect();
        assert_eq!(keys, ["a", "$defs", "z"]);
    }
}
