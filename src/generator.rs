//! Declaration emission.
//!
//! Three independent passes over the optimized AST, each with its own visited
//! set: type aliases, then records, then enums.
pub mod render;
pub mod tuple;

use std::collections::HashSet;
use tracing::debug;

use crate::ast::{Ast, AstId, AstKind};
use crate::naming::to_safe_string;
use crate::options::Options;
use render::{comment_block, Renderer};

struct Generator<'a> {
    ast: &'a Ast,
    options: &'a Options,
    renderer: Renderer<'a>,
    root_name: &'a str,
}

impl<'a> Generator<'a> {
    fn with_comment(&self, id: AstId, declaration: String) -> String {
        match self.ast.get(id).comment.as_deref().filter(|c| !c.is_empty()) {
            Some(comment) => format!("{}\n{declaration}", comment_block(comment)),
            None => declaration,
        }
    }

    fn declared_name(&self, id: AstId) -> String {
        to_safe_string(self.ast.get(id).name().unwrap_or_default())
    }

    fn is_exported(&self, id: AstId) -> bool {
        self.options.declare_externally_referenced || self.ast.get(id).name() == Some(self.root_name)
    }

    // ------------------------- Standalone forms ------------------------ //

    fn standalone_type(&mut self, id: AstId) -> String {
        let text = self.renderer.render_raw(id);
        let declaration = format!("export type {} = {text}", self.declared_name(id));
        self.with_comment(id, declaration)
    }

    fn standalone_interface(&mut self, id: AstId) -> String {
        let ast = self.ast;
        let AstKind::Interface(record) = ast.kind(id) else {
            return self.standalone_type(id);
        };
        let name = self.declared_name(id);
        let declaration = if record.super_types.iter().all(|&s| ast.get(s).name().is_some()) {
            let extends = if record.super_types.is_empty() {
                String::new()
            } else {
                let supers: Vec<String> = record.super_types.iter().map(|&s| self.renderer.render(s)).collect();
                format!(" extends {}", supers.join(", "))
            };
            format!("export interface {name}{extends} {}", self.renderer.record_body(&record.fields))
        } else {
            format!("export type {name} = {}", self.renderer.extended_record(id))
        };
        self.with_comment(id, declaration)
    }

    fn standalone_enum(&mut self, id: AstId) -> String {
        let ast = self.ast;
        let AstKind::Enum(members) = ast.kind(id) else {
            return self.standalone_type(id);
        };
        let members: Vec<String> = members
            .iter()
            .map(|m| format!("{} = {}", m.label, self.renderer.render(m.value)))
            .collect();
        let declaration = format!(
            "export {}enum {} {{\n{}\n}}",
            if self.options.enable_const_enums { "const " } else { "" },
            self.declared_name(id),
            members.join(",\n"),
        );
        self.with_comment(id, declaration)
    }

    // ------------------------------ Passes ------------------------------ //

    /// Aliases for every named node that is neither a record nor an enum.
    fn declare_named_types(&mut self, id: AstId, visited: &mut HashSet<AstId>, out: &mut Vec<String>) {
        if !visited.insert(id) {
            return;
        }
        let ast = self.ast;
        let named = ast.get(id).name().is_some();
        match ast.kind(id) {
            AstKind::Enum(_) => {}
            AstKind::Array(element) => {
                self.declare_named_types(*element, visited, out);
                if named {
                    out.push(self.standalone_type(id));
                }
            }
            AstKind::Interface(_) => {
                for child in ast.children(id) {
                    if self.is_exported(child) {
                        self.declare_named_types(child, visited, out);
                    }
                }
            }
            AstKind::Union(_) | AstKind::Intersection(_) | AstKind::Tuple(_) => {
                if named {
                    out.push(self.standalone_type(id));
                }
                for child in ast.children(id) {
                    self.declare_named_types(child, visited, out);
                }
            }
            _ => {
                if named {
                    out.push(self.standalone_type(id));
                }
            }
        }
    }

    fn declare_named_interfaces(&mut self, id: AstId, visited: &mut HashSet<AstId>, out: &mut Vec<String>) {
        if !visited.insert(id) {
            return;
        }
        let ast = self.ast;
        match ast.kind(id) {
            AstKind::Interface(_) => {
                if ast.get(id).name().is_some() && self.is_exported(id) {
                    out.push(self.standalone_interface(id));
                }
                for child in ast.children(id) {
                    self.declare_named_interfaces(child, visited, out);
                }
            }
            AstKind::Array(_) | AstKind::Union(_) | AstKind::Intersection(_) | AstKind::Tuple(_) => {
                for child in ast.children(id) {
                    self.declare_named_interfaces(child, visited, out);
                }
            }
            _ => {}
        }
    }

    fn declare_enums(&mut self, id: AstId, visited: &mut HashSet<AstId>, out: &mut Vec<String>) {
        if !visited.insert(id) {
            return;
        }
        let ast = self.ast;
        match ast.kind(id) {
            AstKind::Enum(_) => {
                // unnamed enums are inlined as unions of their values
                if ast.get(id).name().is_some() {
                    out.push(self.standalone_enum(id));
                }
            }
            AstKind::Array(_)
            | AstKind::Union(_)
            | AstKind::Intersection(_)
            | AstKind::Tuple(_)
            | AstKind::Interface(_) => {
                for child in ast.children(id) {
                    self.declare_enums(child, visited, out);
                }
            }
            _ => {}
        }
    }
}

/// Render the document rooted at `root`. A root without a standalone name
/// yields only its inline type text.
pub fn generate(ast: &Ast, root: AstId, options: &Options) -> String {
    let mut renderer = Renderer::new(ast, options);
    let Some(root_name) = ast.get(root).name() else {
        return renderer.render_raw(root);
    };
    let mut generator = Generator { ast, options, renderer, root_name };

    let mut declarations = Vec::new();
    if !options.banner_comment.is_empty() {
        declarations.push(options.banner_comment.clone());
    }
    generator.declare_named_types(root, &mut HashSet::new(), &mut declarations);
    generator.declare_named_interfaces(root, &mut HashSet::new(), &mut declarations);
    generator.declare_enums(root, &mut HashSet::new(), &mut declarations);
    declarations.retain(|d| !d.is_empty());

    debug!(root = root_name, declarations = declarations.len(), "generated declarations");
    format!("{}\n", declarations.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, EnumMember, Field, Interface};
    use serde_json::json;

    fn named(kind: AstKind, name: &str) -> AstNode {
        let mut node = AstNode::new(kind);
        node.standalone_name = Some(name.to_string());
        node
    }

    fn field(key: &str, ast: AstId) -> Field {
        Field { key_name: key.into(), required: true, pattern_property: false, unreachable_definition: false, ast }
    }

    fn sample() -> (Ast, AstId) {
        let mut ast = Ast::new();
        let red = ast.alloc(AstNode::new(AstKind::Literal(json!("r"))));
        let color = ast.alloc(named(
            AstKind::Enum(vec![EnumMember { label: "Red".into(), value: red }]),
            "Color",
        ));
        let s = ast.alloc(AstNode::new(AstKind::String));
        let null = ast.alloc(AstNode::new(AstKind::Null));
        let tag = ast.alloc(named(AstKind::Union(vec![s, null]), "Tag"));
        let owner = ast.reserve();
        let pet = ast.reserve();
        ast.fill(owner, named(AstKind::Interface(Interface { fields: vec![field("pet", pet)], super_types: vec![] }), "Owner"));
        let mut pet_node = named(
            AstKind::Interface(Interface {
                fields: vec![field("color", color), field("tag", tag), field("owner", owner)],
                super_types: vec![],
            }),
            "Pet",
        );
        pet_node.comment = Some("A pet.".into());
        ast.fill(pet, pet_node);
        (ast, pet)
    }

    #[test]
    fn passes_emit_aliases_records_then_enums() {
        let (ast, root) = sample();
        let options = Options { banner_comment: "/* generated */".into(), ..Options::default() };
        let out = generate(&ast, root, &options);
        assert_eq!(
            out,
            "/* generated */\n\n\
             export type Tag = (string | null)\n\n\
             /**\n * A pet.\n */\n\
             export interface Pet {\ncolor: Color;\ntag: Tag;\nowner: Owner\n}\n\n\
             export interface Owner {\npet: Pet\n}\n\n\
             export enum Color {\nRed = \"r\"\n}\n"
        );
    }

    #[test]
    fn external_records_can_be_left_undeclared() {
        let (ast, root) = sample();
        let options = Options { declare_externally_referenced: false, enable_const_enums: true, ..Options::default() };
        let out = generate(&ast, root, &options);
        assert!(!out.contains("interface Owner"));
        assert!(!out.contains("export type Tag"));
        assert!(out.contains("export const enum Color {"));
    }

    #[test]
    fn unnamed_root_renders_inline() {
        let mut ast = Ast::new();
        let s = ast.alloc(AstNode::new(AstKind::String));
        let root = ast.alloc(AstNode::new(AstKind::Array(s)));
        assert_eq!(generate(&ast, root, &Options::default()), "string[]");
    }

    #[test]
    fn records_with_anonymous_super_types_become_intersections() {
        let mut ast = Ast::new();
        let s = ast.alloc(AstNode::new(AstKind::String));
        let base = ast.alloc(named(AstKind::Interface(Interface { fields: vec![field("id", s)], super_types: vec![] }), "Base"));
        let anon = ast.alloc(AstNode::new(AstKind::Interface(Interface { fields: vec![field("x", s)], super_types: vec![] })));
        let child = ast.alloc(named(
            AstKind::Interface(Interface { fields: vec![field("name", s)], super_types: vec![base] }),
            "Child",
        ));
        let mixed = ast.alloc(named(
            AstKind::Interface(Interface { fields: vec![], super_types: vec![base, anon] }),
            "Mixed",
        ));
        let root = ast.alloc(named(AstKind::Union(vec![child, mixed]), "Root"));
        let out = generate(&ast, root, &Options::default());
        assert!(out.contains("export interface Child extends Base {\nname: string\n}"));
        assert!(out.contains("export type Mixed = Base & {\nx: string\n} & {}"));
        assert!(out.contains("export interface Base {\nid: string\n}"));
    }
}
