use json_tsd::{Error, InputError, Options, OptionsError, SchemaGraph, compile, compile_from_file, compile_from_str};
use serde_json::json;

fn compile_named(schema: serde_json::Value, name: &str) -> String {
    compile(&schema, Some(name), &Options::default()).unwrap()
}

#[test]
fn record_with_enum_array_and_comments() {
    let out = compile_named(
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Display name"},
                "kind": {"enum": ["cat", "dog"], "tsEnumNames": ["Cat", "Dog"]},
                "tags": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["name", "kind"]
        }),
        "Pet",
    );
    assert_eq!(
        out,
        "export interface Pet {\n\
         /**\n * Display name\n */\n\
         name: string;\n\
         kind: Kind;\n\
         tags?: string[]\n\
         }\n\n\
         export enum Kind {\nCat = \"cat\",\nDog = \"dog\"\n}\n"
    );
}

#[test]
fn titled_record_is_named_by_its_title() {
    let schema = json!({
        "title": "Pet",
        "type": "object",
        "required": ["name"],
        "properties": {"name": {"type": "string"}, "age": {"type": "number"}}
    });
    assert_eq!(
        compile(&schema, None, &Options::default()).unwrap(),
        "export interface Pet {\nname: string;\nage?: number\n}\n"
    );
}

#[test]
fn optional_single_element_tuple() {
    let schema = json!({"type": "array", "items": [{"type": "string"}], "minItems": 0, "maxItems": 1});
    assert_eq!(compile(&schema, None, &Options::default()).unwrap(), "([] | [string])");
}

#[test]
fn bounded_homogeneous_array_is_a_union_of_arities() {
    let schema = json!({"type": "array", "items": {"type": "string"}, "minItems": 1, "maxItems": 3});
    assert_eq!(
        compile(&schema, None, &Options::default()).unwrap(),
        "([string] | [string, string] | [string, string, string])"
    );
}

#[test]
fn labelled_enum_and_label_count_mismatch() {
    let out = compile_named(json!({"enum": [1, 2], "tsEnumNames": ["One", "Two"]}), "Level");
    assert_eq!(out, "export enum Level {\nOne = 1,\nTwo = 2\n}\n");

    let err = compile(
        &json!({"enum": [1, 2], "tsEnumNames": ["One", "Two", "Three"]}),
        Some("Level"),
        &Options::default(),
    )
    .unwrap_err();
    let Error::Validation(validation) = err else { panic!("{err:?}") };
    assert_eq!(validation.diagnostics.len(), 1);
    assert_eq!(validation.diagnostics[0].rule, "Enum members and tsEnumNames must be of the same length");
    assert_eq!(validation.diagnostics[0].source, "Level");
}

#[test]
fn self_reference_renders_as_the_record_name() {
    let out = compile_named(json!({"properties": {"child": {"$ref": "#"}}}), "Tree");
    assert_eq!(out, "export interface Tree {\nchild?: Tree\n}\n");
}

#[test]
fn single_pattern_property_becomes_index_signature() {
    let out = compile_named(
        json!({"type": "object", "patternProperties": {"^x-": {"type": "string"}}}),
        "Ext",
    );
    assert_eq!(
        out,
        "export interface Ext {\n\
         /**\n * This interface was referenced by `Ext`'s JSON-Schema definition\n * via the `patternProperty` \"^x-\".\n */\n\
         [k: string]: string\n\
         }\n"
    );

    let out = compile_named(
        json!({"type": "object", "patternProperties": {"^a": {"type": "string"}, "^b": {"type": "number"}}}),
        "Ext",
    );
    assert_eq!(out, "export interface Ext {\n[k: string]: unknown\n}\n");
}

#[test]
fn top_type_absorbs_a_union() {
    let out = compile_named(json!({"anyOf": [{"type": "string"}, {}]}), "Loose");
    assert_eq!(out, "export type Loose = unknown\n");
}

#[test]
fn multi_type_nodes_become_unions() {
    let out = compile_named(json!({"type": ["string", "null"]}), "Maybe");
    assert_eq!(out, "export type Maybe = (string | null)\n");
}

#[test]
fn definitions_are_named_by_their_key() {
    let out = compile_named(
        json!({
            "$defs": {
                "Pet": {"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]}
            },
            "type": "object",
            "properties": {"pets": {"type": "array", "items": {"$ref": "#/$defs/Pet"}}},
            "required": ["pets"]
        }),
        "Store",
    );
    assert_eq!(
        out,
        "export interface Store {\npets: Pet[]\n}\n\nexport interface Pet {\nname: string\n}\n"
    );
}

#[test]
fn external_refs_and_custom_types_render_verbatim() {
    let out = compile_named(
        json!({"properties": {"x": {"$ref": "other.json#/Thing"}, "when": {"tsType": "Date"}}}),
        "A",
    );
    assert_eq!(out, "export interface A {\nx?: Thing;\nwhen?: Date\n}\n");

    let options = Options {
        ref_to_name: json_tsd::RefNameResolver::new(|r| format!("Ext{}", r.len())),
        ..Options::default()
    };
    let out = compile(&json!({"properties": {"x": {"$ref": "abc"}}}), Some("A"), &options).unwrap();
    assert!(out.contains("x?: Ext3"));
}

#[test]
fn colliding_titles_get_numbered_names() {
    let schema = json!({"title": "Pet", "properties": {"a": {"title": "Pet", "type": "string"}}});
    let first = compile(&schema, None, &Options::default()).unwrap();
    assert_eq!(first, "export type Pet1 = string\n\nexport interface Pet {\na?: Pet1\n}\n");
    // every call starts from a fresh name registry
    assert_eq!(compile(&schema, None, &Options::default()).unwrap(), first);
}

#[test]
fn open_records_and_index_signature_options() {
    let schema = json!({"properties": {"a": {"type": "number"}}, "required": ["a"]});
    let options = Options { additional_properties: true, unknown_any: false, ..Options::default() };
    assert_eq!(
        compile(&schema, Some("R"), &options).unwrap(),
        "export interface R {\na: number;\n[k: string]: any\n}\n"
    );
    let options = Options { strict_index_signatures: true, ..options };
    assert!(compile(&schema, Some("R"), &options).unwrap().contains("[k: string]: any \n}"));
}

#[test]
fn unreachable_definitions_declare_their_enums() {
    let schema = json!({
        "$defs": {"Color": {"enum": ["r", "g"], "tsEnumNames": ["Red", "Green"]}},
        "properties": {}
    });
    assert_eq!(compile_named(schema.clone(), "Doc"), "export interface Doc {}\n");

    let options = Options { unreachable_definitions: true, enable_const_enums: true, ..Options::default() };
    assert_eq!(
        compile(&schema, Some("Doc"), &options).unwrap(),
        "export interface Doc {}\n\n\
         /**\n * This interface was referenced by `Doc`'s JSON-Schema\n * via the `definition` \"Color\".\n */\n\
         export const enum Color {\nRed = \"r\",\nGreen = \"g\"\n}\n"
    );
}

#[test]
fn optimizer_is_idempotent() {
    let schema = json!({
        "oneOf": [{"type": "string"}, {"type": "string"}, {"$ref": "#/$defs/Id"}],
        "$defs": {"Id": {"type": "string"}}
    });
    let options = Options::default();
    let (mut graph, root) = SchemaGraph::from_value(&schema);
    json_tsd::linker::link(&graph, root, None);
    json_tsd::normalizer::normalize(&mut graph, root, Some("Key"), &options);
    let (mut ast, ast_root) = json_tsd::parser::parse(&mut graph, root, &options);

    json_tsd::optimizer::optimize(&mut ast, ast_root, &options);
    let once = json_tsd::generator::generate(&ast, ast_root, &options);
    json_tsd::optimizer::optimize(&mut ast, ast_root, &options);
    assert_eq!(json_tsd::generator::generate(&ast, ast_root, &options), once);
    assert_eq!(once, "export type Key = Id\n\nexport type Id = string\n");
}

#[test]
fn invalid_options_are_rejected_before_compiling() {
    let options = Options { max_items: -2, ..Options::default() };
    let err = compile(&json!({}), None, &options).unwrap_err();
    assert!(matches!(err, Error::Options(OptionsError::MaxItems(-2))));
}

#[test]
fn files_are_named_by_stem_and_errors_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user_profile.json");
    std::fs::write(&path, r#"{"properties": {"id": {"type": "integer"}}, "required": ["id"]}"#).unwrap();
    let out = compile_from_file(&path, &Options::default()).unwrap();
    assert_eq!(out, "export interface UserProfile {\nid: number\n}\n");

    let err = compile_from_file(&dir.path().join("missing.json"), &Options::default()).unwrap_err();
    assert!(matches!(err, Error::Input(InputError::Read { .. })));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{\"type\": ").unwrap();
    let err = compile_from_file(&bad, &Options::default()).unwrap_err();
    assert!(matches!(err, Error::Input(InputError::Parse { .. })));

    let err = compile_from_str("[1,", None, &Options::default()).unwrap_err();
    assert!(matches!(err, Error::Input(InputError::Parse { .. })));
}

#[test]
fn oversized_array_bounds_fail_cleanly() {
    for schema in [
        json!({"type": "array", "items": {"type": "string"}, "minItems": 1e20}),
        json!({"type": "array", "minItems": 1e20}),
    ] {
        let err = compile(&schema, None, &Options::default()).unwrap_err();
        let Error::Validation(validation) = err else { panic!("{err:?}") };
        assert_eq!(validation.diagnostics[0].rule, "When minItems exists, minItems <= 65535");
    }

    let options = Options { max_items: -1, ..Options::default() };
    let schema = json!({"type": "array", "items": {"type": "string"}, "maxItems": 1e20});
    assert_eq!(compile(&schema, None, &options).unwrap(), "string[]");
}

#[test]
fn enum_labels_must_be_a_list() {
    let err = compile(&json!({"enum": [1, 2], "tsEnumNames": "A"}), Some("E"), &Options::default()).unwrap_err();
    let Error::Validation(validation) = err else { panic!("{err:?}") };
    let rules: Vec<_> = validation.diagnostics.iter().map(|d| d.rule).collect();
    assert_eq!(
        rules,
        vec!["Enum members and tsEnumNames must be of the same length", "tsEnumNames must be an array of strings"]
    );
}
