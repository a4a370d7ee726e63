// Type AST for declaration emission. Nodes live in an arena and refer to each
// other by `AstId`, so cyclic schemas become cyclic index graphs.
use serde_json::Value;

/// Key text of the index-signature field of a record.
pub const INDEX_SIGNATURE: &str = "[k: string]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstId(usize);

impl AstId {
    pub fn index(self) -> usize { self.0 }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstKind {
    Any,
    Unknown,
    Null,
    Boolean,
    Number,
    String,
    Object,                  // the bare `object` type
    Literal(Value),          // JSON primitive, rendered as its JSON text
    Array(AstId),            // element type
    Tuple(Tuple),
    Interface(Interface),
    Union(Vec<AstId>),
    Intersection(Vec<AstId>),
    Enum(Vec<EnumMember>),   // labelled members, declared standalone
    CustomType(String),      // opaque text or a reference target name
    Placeholder,             // reserved by the parser, filled before `finish`
}

impl AstKind {
    /// The configured top type.
    pub fn top(unknown_any: bool) -> Self {
        if unknown_any { AstKind::Unknown } else { AstKind::Any }
    }

    pub fn is_top(&self) -> bool {
        matches!(self, AstKind::Any | AstKind::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub params: Vec<AstId>,
    pub min_items: usize,
    pub max_items: Option<usize>,
    pub spread: Option<AstId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Interface {
    pub fields: Vec<Field>,
    pub super_types: Vec<AstId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key_name: String,
    pub required: bool,
    pub pattern_property: bool,
    pub unreachable_definition: bool,
    pub ast: AstId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub label: String,
    pub value: AstId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: AstKind,
    pub comment: Option<String>,
    /// Property name the node was found under.
    pub key_name: Option<String>,
    /// Unique declaration name; a node with one is emitted on its own.
    pub standalone_name: Option<String>,
}

impl AstNode {
    pub fn new(kind: AstKind) -> Self {
        Self { kind, comment: None, key_name: None, standalone_name: None }
    }

    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().is_some_and(|c| !c.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.standalone_name.as_deref().filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<AstNode>,
}

impl Ast {
    pub fn new() -> Self { Self::default() }

    pub fn alloc(&mut self, node: AstNode) -> AstId {
        let id = AstId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Reserve an id before its contents are known. Cycles that reach the
    /// node while it is being built point at this slot.
    pub fn reserve(&mut self) -> AstId {
        self.alloc(AstNode::new(AstKind::Placeholder))
    }

    pub fn fill(&mut self, id: AstId, node: AstNode) {
        self.nodes[id.0] = node;
    }

    pub fn get(&self, id: AstId) -> &AstNode { &self.nodes[id.0] }

    pub fn get_mut(&mut self, id: AstId) -> &mut AstNode { &mut self.nodes[id.0] }

    pub fn kind(&self, id: AstId) -> &AstKind { &self.nodes[id.0].kind }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Direct children in declaration order: fields, then super-types.
    pub fn children(&self, id: AstId) -> Vec<AstId> {
        match self.kind(id) {
            AstKind::Array(el) => vec![*el],
            AstKind::Tuple(t) => t.params.iter().copied().chain(t.spread).collect(),
            AstKind::Interface(i) => i
                .fields
                .iter()
                .map(|f| f.ast)
                .chain(i.super_types.iter().copied())
                .collect(),
            AstKind::Union(xs) | AstKind::Intersection(xs) => xs.clone(),
            AstKind::Enum(members) => members.iter().map(|m| m.value).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_slot_can_point_at_itself() {
        let mut ast = Ast::new();
        let id = ast.reserve();
        assert_eq!(ast.kind(id), &AstKind::Placeholder);
        let mut node = AstNode::new(AstKind::Array(id));
        node.standalone_name = Some("Nested".into());
        ast.fill(id, node);
        assert_eq!(ast.children(id), vec![id]);
        assert_eq!(ast.get(id).name(), Some("Nested"));
    }

    #[test]
    fn empty_names_and_comments_do_not_count() {
        let mut node = AstNode::new(AstKind::String);
        node.standalone_name = Some(String::new());
        node.comment = Some(String::new());
        assert_eq!(node.name(), None);
        assert!(!node.has_comment());
        assert!(AstKind::top(true).is_top());
        assert_eq!(AstKind::top(false), AstKind::Any);
    }
}
