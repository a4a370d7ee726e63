//! Compile options.
use std::fmt;
use std::sync::Arc;
use serde::Deserialize;

use crate::error::OptionsError;

/// Maps a `$ref` string to the name it is rendered as.
#[derive(Clone)]
pub struct RefNameResolver(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl RefNameResolver {
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn resolve(&self, reference: &str) -> String {
        (self.0)(reference)
    }
}

impl Default for RefNameResolver {
    /// Last path segment of the reference, e.g. `#/$defs/Pet` → `Pet`.
    fn default() -> Self {
        Self::new(|reference| {
            let trimmed = reference.trim_end_matches('/');
            trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
        })
    }
}

impl fmt::Debug for RefNameResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefNameResolver(..)")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Emitted before the named declarations of a document.
    pub banner_comment: String,
    /// Default for object schemas that leave `additionalProperties` unset.
    pub additional_properties: bool,
    /// Declare named records reachable through other records, not only the root.
    /// Defaults to `true`; json-schema-to-typescript defaults it to `false`.
    pub declare_externally_referenced: bool,
    pub enable_const_enums: bool,
    pub ignore_min_and_max_items: bool,
    /// Largest `maxItems - minItems` span kept bounded; `-1` disables the ceiling.
    pub max_items: i64,
    pub strict_index_signatures: bool,
    pub unreachable_definitions: bool,
    /// Top type for unconstrained positions: `unknown` when set, `any` otherwise.
    pub unknown_any: bool,
    #[serde(skip)]
    pub ref_to_name: RefNameResolver,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            banner_comment: String::new(),
            additional_properties: false,
            declare_externally_referenced: true,
            enable_const_enums: false,
            ignore_min_and_max_items: false,
            max_items: 20,
            strict_index_signatures: false,
            unreachable_definitions: false,
            unknown_any: true,
            ref_to_name: RefNameResolver::default(),
        }
    }
}

impl Options {
    /// `max_items` as a ceiling, `None` when disabled.
    pub fn max_items_ceiling(&self) -> Option<u64> {
        u64::try_from(self.max_items).ok()
    }
}

pub fn validate_options(options: &Options) -> Result<(), OptionsError> {
    if options.max_items < -1 {
        return Err(OptionsError::MaxItems(options.max_items));
    }
    Ok(())
}
