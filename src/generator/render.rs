//! Inline (expression-level) rendering of AST nodes.
use std::collections::{HashMap, HashSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use super::tuple::tuple_shape;
use crate::ast::{Ast, AstId, AstKind, Field, INDEX_SIGNATURE};
use crate::naming::to_safe_string;
use crate::options::Options;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// `/** ... */` block, one ` * ` line per comment line.
pub fn comment_block(comment: &str) -> String {
    let mut out = String::from("/**\n");
    for line in comment.split('\n') {
        out.push_str(format!(" * {line}").trim_end());
        out.push('\n');
    }
    out.push_str(" */");
    out
}

/// Bare identifiers stay as they are, anything else is quoted.
pub fn escape_key_name(key: &str) -> String {
    if key == INDEX_SIGNATURE || IDENTIFIER.is_match(key) {
        key.to_string()
    } else {
        Value::String(key.to_string()).to_string()
    }
}

pub struct Renderer<'a> {
    ast: &'a Ast,
    options: &'a Options,
    cache: HashMap<AstId, String>,
    in_progress: HashSet<AstId>,
}

impl<'a> Renderer<'a> {
    pub fn new(ast: &'a Ast, options: &'a Options) -> Self {
        Self { ast, options, cache: HashMap::new(), in_progress: HashSet::new() }
    }

    fn top(&self) -> &'static str {
        if self.options.unknown_any { "unknown" } else { "any" }
    }

    /// Text of `id` in a type position. Named nodes render as their name.
    pub fn render(&mut self, id: AstId) -> String {
        if let Some(text) = self.cache.get(&id) {
            return text.clone();
        }
        let ast = self.ast;
        let text = match ast.get(id).name() {
            Some(name) => to_safe_string(name),
            None => self.render_raw(id),
        };
        self.cache.insert(id, text.clone());
        text
    }

    /// Text of `id` ignoring its own name, as used on the right-hand side of
    /// its declaration.
    pub fn render_raw(&mut self, id: AstId) -> String {
        if !self.in_progress.insert(id) {
            warn!(ast = id.index(), "anonymous cycle rendered as the top type");
            return self.top().to_string();
        }
        let ast = self.ast;
        let text = match &ast.get(id).kind {
            AstKind::Any => "any".to_string(),
            AstKind::Unknown => "unknown".to_string(),
            AstKind::Null => "null".to_string(),
            AstKind::Boolean => "boolean".to_string(),
            AstKind::Number => "number".to_string(),
            AstKind::String => "string".to_string(),
            AstKind::Object => "object".to_string(),
            AstKind::Placeholder => self.top().to_string(),
            AstKind::Literal(value) => value.to_string(),
            AstKind::CustomType(text) => text.clone(),
            AstKind::Array(element) => {
                let element = self.render(*element);
                if element.ends_with('"') {
                    format!("({element})[]")
                } else {
                    format!("{element}[]")
                }
            }
            AstKind::Tuple(tuple) => {
                let params: Vec<String> = tuple.params.iter().map(|&p| self.render(p)).collect();
                let spread = tuple.spread.map(|s| self.render(s));
                tuple_shape(&params, tuple.min_items, tuple.max_items, spread, self.top().to_string()).render()
            }
            AstKind::Union(members) => self.set_operation(members, "|"),
            AstKind::Intersection(members) => self.set_operation(members, "&"),
            AstKind::Enum(members) => {
                let values: Vec<AstId> = members.iter().map(|m| m.value).collect();
                self.set_operation(&values, "|")
            }
            AstKind::Interface(record) => {
                if record.super_types.is_empty() {
                    self.record_body(&record.fields)
                } else {
                    format!("({})", self.extended_record(id))
                }
            }
        };
        self.in_progress.remove(&id);
        text
    }

    fn set_operation(&mut self, members: &[AstId], operator: &str) -> String {
        let texts: Vec<String> = members.iter().map(|&m| self.render(m)).collect();
        match texts.as_slice() {
            [] if operator == "|" => "never".to_string(),
            [] => self.top().to_string(),
            [single] => single.clone(),
            _ => format!("({})", texts.join(&format!(" {operator} "))),
        }
    }

    /// `A & B & { ... }` for a record with super-types.
    pub fn extended_record(&mut self, id: AstId) -> String {
        let ast = self.ast;
        let AstKind::Interface(record) = &ast.get(id).kind else {
            return self.render_raw(id);
        };
        let mut parts: Vec<String> = record.super_types.iter().map(|&s| self.render(s)).collect();
        parts.push(self.record_body(&record.fields));
        parts.join(" & ")
    }

    /// `{ field; ... }` with pattern and definition-only fields left out.
    pub fn record_body(&mut self, fields: &[Field]) -> String {
        let lines: Vec<String> = fields
            .iter()
            .filter(|f| !f.pattern_property && !f.unreachable_definition)
            .map(|f| self.field(f))
            .collect();
        if lines.is_empty() {
            return "{}".to_string();
        }
        format!("{{\n{}\n}}", lines.join(";\n"))
    }

    fn field(&mut self, field: &Field) -> String {
        let ast = self.ast;
        let node = ast.get(field.ast);
        let mut line = String::new();
        if node.name().is_none() {
            if let Some(comment) = node.comment.as_deref().filter(|c| !c.is_empty()) {
                line.push_str(&comment_block(comment));
                line.push('\n');
            }
        }
        line.push_str(&escape_key_name(&field.key_name));
        if !field.required {
            line.push('?');
        }
        line.push_str(": ");
        line.push_str(&self.render(field.ast));
        if self.options.strict_index_signatures && field.key_name == INDEX_SIGNATURE {
            line.push(' ');
        }
        line
    }
}
