//! Record lowering: properties, pattern properties, definitions, the
//! extra-properties rule and super-types.
use serde_json::Value;

use super::Parser;
use crate::ast::{AstId, AstKind, Field, Interface, INDEX_SIGNATURE};
use crate::schema::NodeId;

fn owner(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("`{name}`'s"),
        None => "an anonymous".to_string(),
    }
}

impl Parser<'_> {
    fn members_of(&self, node: NodeId, keyword: &str) -> Vec<(String, NodeId)> {
        self.graph
            .get(node, keyword)
            .and_then(|map| self.graph.entries(map))
            .map(|map| map.iter().map(|(k, &v)| (k.clone(), v)).collect())
            .unwrap_or_default()
    }

    fn append_comment(&mut self, id: AstId, note: String) {
        let node = self.ast.get_mut(id);
        node.comment = Some(match node.comment.take().filter(|c| !c.is_empty()) {
            Some(existing) => format!("{existing}\n\n{note}"),
            None => note,
        });
    }

    pub(super) fn interface(&mut self, node: NodeId, name: Option<&str>) -> AstKind {
        let required = self.graph.strings_of(node, "required");
        let is_required = |key: &str| required.iter().any(|r| r == key);
        let mut fields = Vec::new();

        for (key, value) in self.members_of(node, "properties") {
            let ast = self.parse(value, Some(key.as_str()));
            fields.push(Field {
                required: is_required(&key),
                key_name: key,
                pattern_property: false,
                unreachable_definition: false,
                ast,
            });
        }

        let additional = self.graph.get(node, "additionalProperties");
        let additional_allowed = additional.is_some_and(|a| {
            self.graph.is_object(a) || self.graph.leaf_value(a) == Some(&Value::Bool(true))
        });
        let patterns = self.members_of(node, "patternProperties");
        let single_pattern = !additional_allowed && patterns.len() == 1;
        for (key, value) in patterns {
            let ast = self.parse(value, Some(key.as_str()));
            self.append_comment(
                ast,
                format!(
                    "This interface was referenced by {} JSON-Schema definition\nvia the `patternProperty` \"{key}\".",
                    owner(name)
                ),
            );
            fields.push(Field {
                required: single_pattern || is_required(&key),
                key_name: if single_pattern { INDEX_SIGNATURE.to_string() } else { key },
                pattern_property: !single_pattern,
                unreachable_definition: false,
                ast,
            });
        }

        if self.options.unreachable_definitions {
            for (key, value) in self.members_of(node, "$defs") {
                let ast = self.parse(value, Some(key.as_str()));
                self.append_comment(
                    ast,
                    format!(
                        "This interface was referenced by {} JSON-Schema\nvia the `definition` \"{key}\".",
                        owner(name)
                    ),
                );
                fields.push(Field {
                    required: is_required(&key),
                    key_name: key,
                    pattern_property: false,
                    unreachable_definition: true,
                    ast,
                });
            }
        }

        let index_ast = match additional {
            Some(schema) if self.graph.is_object(schema) => Some(self.parse(schema, Some(INDEX_SIGNATURE))),
            Some(flag) if self.graph.leaf_value(flag) == Some(&Value::Bool(false)) => None,
            _ if single_pattern => None,
            _ => Some(self.top(Some(INDEX_SIGNATURE))),
        };
        if let Some(ast) = index_ast {
            fields.push(Field {
                key_name: INDEX_SIGNATURE.to_string(),
                required: true,
                pattern_property: false,
                unreachable_definition: false,
                ast,
            });
        }

        let super_types = self.parse_list(node, "extends");
        AstKind::Interface(Interface { fields, super_types })
    }
}
