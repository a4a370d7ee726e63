//! Processing categories of a schema node.
use serde_json::Value;

use crate::schema::{NodeId, SchemaGraph};

/// Closed set of ways the parser can lower a node. Declaration order is
/// matcher order, which fixes the member order of multi-category nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    AllOf,
    Any,
    AnyOf,
    Boolean,
    CustomType,
    NamedEnum,
    NamedSchema,
    Null,
    Number,
    Object,
    OneOf,
    Reference,
    String,
    TypedArray,
    Union,
    UnnamedEnum,
    UnnamedSchema,
    UntypedArray,
}

const MATCHED: [Category; 17] = [
    Category::AllOf,
    Category::Any,
    Category::AnyOf,
    Category::Boolean,
    Category::CustomType,
    Category::NamedEnum,
    Category::NamedSchema,
    Category::Null,
    Category::Number,
    Category::Object,
    Category::OneOf,
    Category::Reference,
    Category::String,
    Category::TypedArray,
    Category::Union,
    Category::UnnamedEnum,
    Category::UntypedArray,
];

/// `type` when it is a single string.
fn single_type(graph: &SchemaGraph, id: NodeId) -> Option<&str> {
    graph.str_of(id, "type")
}

fn type_is_list(graph: &SchemaGraph, id: NodeId) -> bool {
    graph.get(id, "type").is_some_and(|t| graph.is_array(t))
}

fn is_compound(graph: &SchemaGraph, id: NodeId) -> bool {
    type_is_list(graph, id) || graph.has(id, "anyOf") || graph.has(id, "oneOf")
}

fn default_is(graph: &SchemaGraph, id: NodeId, f: fn(&Value) -> bool) -> bool {
    graph
        .get(id, "default")
        .and_then(|d| graph.leaf_value(d))
        .is_some_and(f)
}

/// Scalar matcher: explicit type, or a non-compound node with a default of that JSON type.
fn scalar(graph: &SchemaGraph, id: NodeId, names: &[&str], f: fn(&Value) -> bool) -> bool {
    if graph.has(id, "enum") {
        return false;
    }
    if single_type(graph, id).is_some_and(|t| names.contains(&t)) {
        return true;
    }
    !is_compound(graph, id) && default_is(graph, id, f)
}

impl Category {
    fn matches(self, graph: &SchemaGraph, id: NodeId) -> bool {
        match self {
            Category::AllOf => graph.has(id, "allOf"),
            Category::Any => {
                graph.entries(id).is_some_and(|m| m.is_empty()) || single_type(graph, id) == Some("any")
            }
            Category::AnyOf => graph.has(id, "anyOf"),
            Category::Boolean => scalar(graph, id, &["boolean"], Value::is_boolean),
            // only reachable through `tsType`
            Category::CustomType => false,
            Category::NamedEnum => graph.has(id, "enum") && graph.has(id, "tsEnumNames"),
            Category::NamedSchema => {
                graph.has(id, "$id") && (graph.has(id, "properties") || graph.has(id, "patternProperties"))
            }
            Category::Null => single_type(graph, id) == Some("null"),
            Category::Number => scalar(graph, id, &["integer", "number"], Value::is_number),
            Category::Object => {
                single_type(graph, id) == Some("object")
                    && !graph.get(id, "additionalProperties").is_some_and(|a| graph.is_object(a))
                    && ["allOf", "anyOf", "oneOf", "patternProperties", "properties", "required"]
                        .iter()
                        .all(|k| !graph.has(id, k))
            }
            Category::OneOf => graph.has(id, "oneOf"),
            Category::Reference => graph.has(id, "$ref"),
            Category::String => scalar(graph, id, &["string"], Value::is_string),
            Category::TypedArray => {
                let untyped_or_array = match graph.get(id, "type") {
                    None => true,
                    Some(_) => single_type(graph, id) == Some("array"),
                };
                untyped_or_array && graph.has(id, "items")
            }
            Category::Union => type_is_list(graph, id),
            Category::UnnamedEnum => {
                if graph.has(id, "tsEnumNames") {
                    return false;
                }
                let scalar_or_untyped = match graph.get(id, "type") {
                    None => true,
                    Some(_) => single_type(graph, id)
                        .is_some_and(|t| matches!(t, "boolean" | "integer" | "number" | "string")),
                };
                scalar_or_untyped && graph.has(id, "enum")
            }
            Category::UnnamedSchema => false,
            Category::UntypedArray => single_type(graph, id) == Some("array") && !graph.has(id, "items"),
        }
    }
}

/// Every category an object node matches, in matcher order; never empty.
pub fn classify(graph: &SchemaGraph, id: NodeId) -> Vec<Category> {
    if graph.has(id, "tsType") {
        return vec![Category::CustomType];
    }
    let matched: Vec<Category> = MATCHED.into_iter().filter(|c| c.matches(graph, id)).collect();
    if matched.is_empty() {
        vec![Category::UnnamedSchema]
    } else {
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cats(doc: Value) -> Vec<Category> {
        let (graph, root) = SchemaGraph::from_value(&doc);
        classify(&graph, root)
    }

    #[test]
    fn scalars_and_defaults() {
        assert_eq!(cats(json!({"type": "string"})), vec![Category::String]);
        assert_eq!(cats(json!({"type": "integer"})), vec![Category::Number]);
        assert_eq!(cats(json!({"default": true})), vec![Category::Boolean]);
        assert_eq!(cats(json!({"type": "null"})), vec![Category::Null]);
        assert_eq!(cats(json!({})), vec![Category::Any]);
    }

    #[test]
    fn enums_with_and_without_labels() {
        assert_eq!(cats(json!({"type": "string", "enum": ["a"]})), vec![Category::UnnamedEnum]);
        assert_eq!(
            cats(json!({"enum": [1], "tsEnumNames": ["One"]})),
            vec![Category::NamedEnum]
        );
    }

    #[test]
    fn records_arrays_and_unions() {
        assert_eq!(cats(json!({"type": "object"})), vec![Category::Object]);
        assert_eq!(cats(json!({"properties": {}})), vec![Category::UnnamedSchema]);
        assert_eq!(cats(json!({"$id": "X", "properties": {}})), vec![Category::NamedSchema]);
        assert_eq!(cats(json!({"items": {}})), vec![Category::TypedArray]);
        assert_eq!(cats(json!({"type": "array"})), vec![Category::UntypedArray]);
        assert_eq!(cats(json!({"type": ["string", "null"]})), vec![Category::Union]);
        assert_eq!(cats(json!({"$ref": "Other"})), vec![Category::Reference]);
    }

    #[test]
    fn several_matchers_yield_ordered_categories() {
        assert_eq!(
            cats(json!({"$id": "X", "allOf": [], "properties": {}})),
            vec![Category::AllOf, Category::NamedSchema]
        );
        assert_eq!(cats(json!({"tsType": "Date", "type": "string"})), vec![Category::CustomType]);
    }
}
