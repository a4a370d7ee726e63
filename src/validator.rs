//! Structural rules checked before normalization.
//!
//! Every rule runs at every schema node; violations are collected over the
//! whole document and never short-circuit the walk.
use tracing::{debug, trace};

use crate::error::Diagnostic;
use crate::normalizer::MAX_TUPLE_LENGTH;
use crate::schema::{NodeId, SchemaGraph};
use crate::traverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Violated,
    Satisfied,
    NotApplicable,
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok { Verdict::Satisfied } else { Verdict::Violated }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    EnumNamesLength,
    EnumNamesAreStrings,
    MaxItemsAtLeastMinItems,
    MaxItemsNonNegative,
    MinItemsNonNegative,
    MinItemsWithinTupleLimit,
}

impl Rule {
    /// Registration order; diagnostics at one node follow it.
    pub const ALL: [Rule; 6] = [
        Rule::EnumNamesLength,
        Rule::EnumNamesAreStrings,
        Rule::MaxItemsAtLeastMinItems,
        Rule::MaxItemsNonNegative,
        Rule::MinItemsNonNegative,
        Rule::MinItemsWithinTupleLimit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::EnumNamesLength => "Enum members and tsEnumNames must be of the same length",
            Rule::EnumNamesAreStrings => "tsEnumNames must be an array of strings",
            Rule::MaxItemsAtLeastMinItems => "When both maxItems and minItems are present, maxItems >= minItems",
            Rule::MaxItemsNonNegative => "When maxItems exists, maxItems >= 0",
            Rule::MinItemsNonNegative => "When minItems exists, minItems >= 0",
            Rule::MinItemsWithinTupleLimit => "When minItems exists, minItems <= 65535",
        }
    }

    pub fn check(self, graph: &SchemaGraph, node: NodeId) -> Verdict {
        match self {
            Rule::EnumNamesLength => {
                match (graph.get(node, "enum"), graph.get(node, "tsEnumNames")) {
                    (Some(members), Some(names)) => match (graph.items(members), graph.items(names)) {
                        (Some(m), Some(n)) => (m.len() == n.len()).into(),
                        _ => Verdict::Violated,
                    },
                    _ => Verdict::NotApplicable,
                }
            }
            Rule::EnumNamesAreStrings => match graph.get(node, "tsEnumNames") {
                Some(names) => graph
                    .items(names)
                    .is_some_and(|names| {
                        names.iter().all(|&n| graph.leaf_value(n).is_some_and(|v| v.is_string()))
                    })
                    .into(),
                None => Verdict::NotApplicable,
            },
            Rule::MaxItemsAtLeastMinItems => {
                match (graph.f64_of(node, "maxItems"), graph.f64_of(node, "minItems")) {
                    (Some(max), Some(min)) => (max >= min).into(),
                    _ => Verdict::NotApplicable,
                }
            }
            Rule::MaxItemsNonNegative => match graph.f64_of(node, "maxItems") {
                Some(max) => (max >= 0.0).into(),
                None => Verdict::NotApplicable,
            },
            Rule::MinItemsNonNegative => match graph.f64_of(node, "minItems") {
                Some(min) => (min >= 0.0).into(),
                None => Verdict::NotApplicable,
            },
            // every required position is materialized as a tuple element
            Rule::MinItemsWithinTupleLimit => match graph.f64_of(node, "minItems") {
                Some(min) => (min <= MAX_TUPLE_LENGTH as f64).into(),
                None => Verdict::NotApplicable,
            },
        }
    }
}

/// Run every rule over every schema node reachable from `root`.
pub fn validate(graph: &SchemaGraph, root: NodeId, source: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut visited = 0usize;
    traverse::traverse(graph, root, |node, key| {
        visited += 1;
        for rule in Rule::ALL {
            if rule.check(graph, node) == Verdict::Violated {
                trace!(rule = rule.name(), ?key, "rule violated");
                diagnostics.push(Diagnostic {
                    rule: rule.name(),
                    key: key.map(str::to_string),
                    source: source.to_string(),
                });
            }
        }
    });
    debug!(visited, violations = diagnostics.len(), source, "validated schema");
    diagnostics
}
