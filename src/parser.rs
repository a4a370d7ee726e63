//! Lowering of normalized schema nodes into the type AST.
//!
//! Every lowering goes through [`Parser::parse_as`], which reserves the AST
//! slot and records it in the memo table *before* descending. A schema that
//! reaches itself again gets the reserved id back, so cycles in the schema
//! graph become cycles in the AST instead of unbounded recursion.
mod record;

use std::collections::HashMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::ast::{Ast, AstId, AstKind, AstNode, EnumMember, Tuple};
use crate::naming::NameRegistry;
use crate::normalizer::{self, classify, Category, MAX_TUPLE_LENGTH};
use crate::options::Options;
use crate::schema::{Definitions, Node, NodeId, SchemaGraph};

/// Memo key: the node plus the category it was lowered as. `None` marks the
/// intersection wrapper of a node that matched several categories.
type MemoKey = (NodeId, Option<Category>);

pub struct Parser<'a> {
    graph: &'a mut SchemaGraph,
    options: &'a Options,
    ast: Ast,
    names: NameRegistry,
    memo: HashMap<MemoKey, AstId>,
    /// Definitions per document root, collected on first use.
    definitions: HashMap<NodeId, Definitions>,
}

impl<'a> Parser<'a> {
    pub fn new(graph: &'a mut SchemaGraph, options: &'a Options) -> Self {
        Self {
            graph,
            options,
            ast: Ast::new(),
            names: NameRegistry::new(),
            memo: HashMap::new(),
            definitions: HashMap::new(),
        }
    }

    pub fn finish(self) -> Ast { self.ast }

    /// Lower `node`, found under `key_name` in its parent.
    pub fn parse(&mut self, node: NodeId, key_name: Option<&str>) -> AstId {
        if !self.graph.is_object(node) {
            return self.literal(node, key_name);
        }
        let categories = classify(self.graph, node);
        trace!(node = node.index(), ?categories, ?key_name, "classified schema node");
        match categories.as_slice() {
            [single] => self.parse_as(node, *single, key_name),
            _ => self.parse_intersection(node, categories, key_name),
        }
    }

    fn literal(&mut self, node: NodeId, key_name: Option<&str>) -> AstId {
        let value = match self.graph.node(node) {
            Node::Leaf(v) => v.clone(),
            _ => self.graph.to_value(node),
        };
        let mut literal = AstNode::new(AstKind::Literal(value));
        literal.key_name = key_name.map(str::to_string);
        self.ast.alloc(literal)
    }

    /// A node matching several categories becomes an intersection that owns
    /// the node's name and comment; its members are lowered from a copy
    /// without naming hints so they do not claim a second name.
    fn parse_intersection(&mut self, node: NodeId, categories: Vec<Category>, key_name: Option<&str>) -> AstId {
        let key = (node, None);
        if let Some(&id) = self.memo.get(&key) {
            return id;
        }
        let id = self.ast.reserve();
        self.memo.insert(key, id);

        let name = self.standalone_name(node, None);
        let stripped = self.graph.derive(node, &["$id", "title", "description", "name"]);
        let params = categories
            .into_iter()
            .map(|category| self.parse_as(stripped, category, key_name))
            .collect();
        let wrapper = self.node(node, AstKind::Intersection(params), key_name, name);
        self.ast.fill(id, wrapper);
        id
    }

    fn parse_as(&mut self, node: NodeId, category: Category, key_name: Option<&str>) -> AstId {
        let key = (node, Some(category));
        if let Some(&id) = self.memo.get(&key) {
            return id;
        }
        let id = self.ast.reserve();
        self.memo.insert(key, id);

        // the name is claimed before any child can claim it
        let fallback = if category == Category::NamedEnum { key_name } else { None };
        let name = self.standalone_name(node, fallback);
        let kind = self.lower(node, category, name.as_deref());
        let lowered = self.node(node, kind, key_name, name);
        self.ast.fill(id, lowered);
        id
    }

    fn lower(&mut self, node: NodeId, category: Category, name: Option<&str>) -> AstKind {
        match category {
            Category::AllOf => AstKind::Intersection(self.parse_list(node, "allOf")),
            Category::Any => AstKind::top(self.options.unknown_any),
            Category::AnyOf => AstKind::Union(self.parse_list(node, "anyOf")),
            Category::OneOf => AstKind::Union(self.parse_list(node, "oneOf")),
            Category::Boolean => AstKind::Boolean,
            Category::Null => AstKind::Null,
            Category::Number => AstKind::Number,
            Category::Object => AstKind::Object,
            Category::String => AstKind::String,
            Category::CustomType => {
                AstKind::CustomType(self.graph.str_of(node, "tsType").unwrap_or_default().to_string())
            }
            Category::Reference => {
                let reference = self.graph.str_of(node, "$ref").unwrap_or_default();
                AstKind::CustomType(self.options.ref_to_name.resolve(reference))
            }
            Category::NamedEnum => self.named_enum(node),
            Category::UnnamedEnum => AstKind::Union(self.parse_list(node, "enum")),
            Category::NamedSchema | Category::UnnamedSchema => self.interface(node, name),
            Category::TypedArray => self.typed_array(node),
            Category::UntypedArray => self.untyped_array(node),
            Category::Union => self.type_union(node),
        }
    }

    fn node(&self, schema: NodeId, kind: AstKind, key_name: Option<&str>, name: Option<String>) -> AstNode {
        AstNode {
            kind,
            comment: self.graph.str_of(schema, "description").map(str::to_string),
            key_name: key_name.map(str::to_string),
            standalone_name: name,
        }
    }

    fn top(&mut self, key_name: Option<&str>) -> AstId {
        let mut node = AstNode::new(AstKind::top(self.options.unknown_any));
        node.key_name = key_name.map(str::to_string);
        self.ast.alloc(node)
    }

    fn list_of(&self, node: NodeId, keyword: &str) -> Vec<NodeId> {
        self.graph
            .get(node, keyword)
            .and_then(|list| self.graph.items(list))
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default()
    }

    fn parse_list(&mut self, node: NodeId, keyword: &str) -> Vec<AstId> {
        self.list_of(node, keyword)
            .into_iter()
            .map(|member| self.parse(member, None))
            .collect()
    }

    // ---------------------------- Naming ------------------------------ //

    fn definition_key(&mut self, node: NodeId) -> Option<String> {
        let root = self.graph.root_of(node);
        let graph = &*self.graph;
        let definitions = self
            .definitions
            .entry(root)
            .or_insert_with(|| Definitions::collect(graph, root));
        definitions.key_of(node).map(str::to_string)
    }

    /// Title, then `$id`, then the definitions key, then `fallback`.
    fn standalone_name(&mut self, node: NodeId, fallback: Option<&str>) -> Option<String> {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let hint = self
            .graph
            .str_of(node, "title")
            .and_then(non_empty)
            .or_else(|| self.graph.str_of(node, "$id").and_then(non_empty))
            .or_else(|| self.definition_key(node))
            .or_else(|| fallback.and_then(non_empty))?;
        Some(self.names.allocate(&hint))
    }

    // --------------------------- Categories --------------------------- //

    fn named_enum(&mut self, node: NodeId) -> AstKind {
        let labels = self.graph.strings_of(node, "tsEnumNames");
        let values = self.list_of(node, "enum");
        let members = values
            .into_iter()
            .zip(labels)
            .map(|(value, label)| EnumMember { label, value: self.parse(value, None) })
            .collect();
        AstKind::Enum(members)
    }

    fn bound(&self, node: NodeId, key: &str) -> Option<usize> {
        normalizer::bound(self.graph, node, key).map(|v| v.min(MAX_TUPLE_LENGTH) as usize)
    }

    fn typed_array(&mut self, node: NodeId) -> AstKind {
        let Some(items) = self.graph.get(node, "items") else {
            return AstKind::Array(self.top(None));
        };
        if self.graph.is_array(items) {
            let params = self.parse_list(node, "items");
            let spread = match self.graph.get(node, "additionalItems") {
                Some(extra) if self.graph.is_object(extra) => Some(self.parse(extra, None)),
                Some(extra) if self.graph.leaf_value(extra) == Some(&Value::Bool(true)) => Some(self.top(None)),
                _ => None,
            };
            return AstKind::Tuple(Tuple {
                params,
                min_items: self.bound(node, "minItems").unwrap_or(0),
                max_items: self.bound(node, "maxItems"),
                spread,
            });
        }
        if self.graph.is_object(items) {
            return AstKind::Array(self.parse(items, None));
        }
        // `items: true` constrains nothing
        AstKind::Array(self.top(None))
    }

    fn untyped_array(&mut self, node: NodeId) -> AstKind {
        let min_items = self.bound(node, "minItems").unwrap_or(0);
        let max_items = self.bound(node, "maxItems");
        let top = self.top(None);
        if min_items == 0 && max_items.is_none() {
            return AstKind::Array(top);
        }
        let len = max_items.unwrap_or(0).max(min_items);
        AstKind::Tuple(Tuple {
            params: vec![top; len],
            min_items,
            max_items,
            spread: max_items.is_none().then_some(top),
        })
    }

    /// `type: [a, b]`: one member per listed type, each lowered from a copy
    /// carrying that single type.
    fn type_union(&mut self, node: NodeId) -> AstKind {
        let types: Vec<String> = self.graph.strings_of(node, "type");
        let mut members = Vec::with_capacity(types.len());
        for ty in types {
            let copy = self.graph.derive(node, &["$id", "description", "title"]);
            self.graph.set_value(copy, "type", Value::String(ty.clone()));
            if !self.default_fits(copy, &ty) {
                self.graph.remove(copy, "default");
            }
            members.push(self.parse(copy, None));
        }
        AstKind::Union(members)
    }

    fn default_fits(&self, node: NodeId, ty: &str) -> bool {
        let Some(default) = self.graph.get(node, "default") else { return true };
        match self.graph.node(default) {
            Node::Array(_) => ty == "array",
            Node::Object(_) => ty == "object",
            Node::Leaf(v) => match ty {
                "boolean" => v.is_boolean(),
                "integer" | "number" => v.is_number(),
                "string" => v.is_string(),
                "null" => v.is_null(),
                _ => false,
            },
        }
    }
}

/// Lower a normalized document into a fresh AST.
pub fn parse(graph: &mut SchemaGraph, root: NodeId, options: &Options) -> (Ast, AstId) {
    let mut parser = Parser::new(graph, options);
    let id = parser.parse(root, None);
    let names = parser.names.len();
    let ast = parser.finish();
    debug!(nodes = ast.len(), names, "parsed schema into AST");
    (ast, id)
}
