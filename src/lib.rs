//! Compile JSON Schema documents into TypeScript declaration text.
//!
//! The pipeline is link → validate → normalize → parse → optimize → generate.
//! Every call to [`compile`] gets its own name registry and memo tables, so
//! concurrent calls never observe each other's state.
pub mod ast;
pub mod error;
pub mod generator;
pub mod linker;
pub mod naming;
pub mod normalizer;
pub mod optimizer;
pub mod options;
pub mod parser;
pub mod path_de;
pub mod schema;
pub mod traverse;
pub mod validator;

use std::path::Path;
use serde_json::Value;
use tracing::{debug, error};

pub use error::{Diagnostic, Error, InputError, OptionsError, Result, ValidationError};
pub use options::{Options, RefNameResolver};
pub use schema::{NodeId, SchemaGraph};

const INLINE_SOURCE: &str = "<inline>";

/// Compile an already-built schema graph. `name` becomes the root
/// declaration name (and the default `$id` of the root).
pub fn compile_graph(mut graph: SchemaGraph, root: NodeId, name: Option<&str>, options: &Options) -> Result<String> {
    options::validate_options(options)?;
    let source = name.unwrap_or(INLINE_SOURCE);

    linker::link(&graph, root, None);
    let diagnostics = validator::validate(&graph, root, source);
    if !diagnostics.is_empty() {
        for diagnostic in &diagnostics {
            error!("{diagnostic}");
        }
        return Err(ValidationError { diagnostics }.into());
    }

    normalizer::normalize(&mut graph, root, name, options);
    let (mut ast, ast_root) = parser::parse(&mut graph, root, options);
    let ast_root = optimizer::optimize(&mut ast, ast_root, options);
    let text = generator::generate(&ast, ast_root, options);
    debug!(source, bytes = text.len(), "compiled schema");
    Ok(text)
}

/// Compile a JSON Schema document.
pub fn compile(schema: &Value, name: Option<&str>, options: &Options) -> Result<String> {
    let (graph, root) = SchemaGraph::from_value(schema);
    compile_graph(graph, root, name, options)
}

pub fn compile_from_str(src: &str, name: Option<&str>, options: &Options) -> Result<String> {
    let schema: Value = path_de::from_str_with_path(src).map_err(|message| InputError::Parse {
        path: INLINE_SOURCE.into(),
        message,
    })?;
    compile(&schema, name, options)
}

/// Compile a schema file; the file stem names the root declaration.
pub fn compile_from_file(path: &Path, options: &Options) -> Result<String> {
    let schema: Value = path_de::read_json(path)?;
    let name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
    compile(&schema, name.as_deref(), options)
}

/// Run only the structural rules over a document.
pub fn validate_document(schema: &Value, label: &str) -> Vec<Diagnostic> {
    let (graph, root) = SchemaGraph::from_value(schema);
    linker::link(&graph, root, None);
    validator::validate(&graph, root, label)
}
