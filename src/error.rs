//! Error kinds surfaced by a compile call.
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Umbrella error for every public entry point.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Input(#[from] InputError),
}

/// A configuration value failed its range/shape check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("expected options.max_items to be >= -1, but was given {0}")]
    MaxItems(i64),
}

/// The input document could not be turned into a schema graph.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("unable to read file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing JSON in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// One violated structural rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule: &'static str,
    /// Key under which the offending node was found (`None` at the root).
    pub key: Option<String>,
    pub source: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key.as_deref().unwrap_or("null");
        write!(f, "error at key \"{key}\" in \"{}\": {}", self.source, self.rule)
    }
}

/// Every diagnostic collected over a full traversal of the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema failed validation with {} error(s)", self.diagnostics.len())?;
        for d in &self.diagnostics {
            write!(f, "\n  {d}")?;
        }
        Ok(())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_diagnostic() {
        let err = ValidationError {
            diagnostics: vec![
                Diagnostic { rule: "a", key: Some("x".into()), source: "Doc".into() },
                Diagnostic { rule: "b", key: None, source: "Doc".into() },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("2 error(s)"));
        assert!(text.contains("error at key \"x\" in \"Doc\": a"));
        assert!(text.contains("error at key \"null\" in \"Doc\": b"));
    }

    #[test]
    fn read_and_parse_failures_are_distinct() {
        let read: Error = InputError::Read {
            path: "a.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
        .into();
        let parse: Error = InputError::Parse { path: "a.json".into(), message: "eof".into() }.into();
        assert!(matches!(read, Error::Input(InputError::Read { .. })));
        assert!(matches!(parse, Error::Input(InputError::Parse { .. })));
        assert!(read.to_string().starts_with("unable to read file"));
        assert!(parse.to_string().starts_with("error parsing JSON"));
    }
}
