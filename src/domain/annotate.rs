//! Evolution annotation: attach relationship fields to matched records.
//!
//! Two policies exist:
//! - [`AnnotationPolicy::Evolves`]: a list of matched direct children under `Evolves`
//! - [`AnnotationPolicy::Lineage`]: a single `evolvedFrom` and a single `evolvesTo`
//!
//! All functions take the forest and the table explicitly; there is no
//! shared state between calls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::domain::entities::{EntityRef, EvolutionNode};
use crate::domain::lookup::EntityTable;

pub const EVOLVES_FIELD: &str = "Evolves";
pub const EVOLVED_FROM_FIELD: &str = "evolvedFrom";
pub const EVOLVES_TO_FIELD: &str = "evolvesTo";

/// Which relationship fields are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationPolicy {
    /// `Evolves`: list of references to matched direct children
    Evolves,
    /// `evolvedFrom` / `evolvesTo`: nearest matched parent and first successor
    #[default]
    Lineage,
}

/// How far the `Evolves` policy descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvolvesDepth {
    /// Annotate forest roots only
    RootOnly,
    /// Annotate every matched node reachable through matched ancestors
    #[default]
    FullTree,
}

/// What the `Lineage` policy does at an unmatched node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmatchedNodes {
    /// Descend through it; matched descendants link to the nearest matched ancestor
    #[default]
    SkipOver,
    /// Stop; the whole subtree is left unannotated
    Prune,
}

macro_rules! kebab_enum {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const VARIANTS: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown value `{}`, expected one of: {}",
                        other,
                        Self::VARIANTS.join(", ")
                    )),
                }
            }
        }
    };
}

kebab_enum!(AnnotationPolicy { Evolves => "evolves", Lineage => "lineage" });
kebab_enum!(EvolvesDepth { RootOnly => "root-only", FullTree => "full-tree" });
kebab_enum!(UnmatchedNodes { SkipOver => "skip-over", Prune => "prune" });

/// Traversal knobs for both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateOptions {
    pub evolves_depth: EvolvesDepth,
    pub unmatched_nodes: UnmatchedNodes,
}

/// Counts gathered during one annotation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnotationSummary {
    /// Matched nodes that received fields
    pub annotated: usize,
    /// Unmatched nodes visited and skipped
    pub unmatched: usize,
}

/// Annotate `table` from `forest` using `policy`.
pub fn annotate(
    forest: &[EvolutionNode],
    table: &mut EntityTable,
    policy: AnnotationPolicy,
    options: AnnotateOptions,
) -> AnnotationSummary {
    match policy {
        AnnotationPolicy::Evolves => annotate_evolves(forest, table, options.evolves_depth),
        AnnotationPolicy::Lineage => annotate_lineage(forest, table, options.unmatched_nodes),
    }
}

/// `Evolves` policy.
///
/// An unmatched node stops the walk: neither it nor anything beneath it is
/// annotated. Unmatched children are dropped from the list, not replaced by
/// their own children.
pub fn annotate_evolves(
    forest: &[EvolutionNode],
    table: &mut EntityTable,
    depth: EvolvesDepth,
) -> AnnotationSummary {
    let mut summary = AnnotationSummary::default();
    for root in forest {
        visit_evolves(root, table, depth, &mut summary);
    }
    summary
}

fn visit_evolves(
    node: &EvolutionNode,
    table: &mut EntityTable,
    depth: EvolvesDepth,
    summary: &mut AnnotationSummary,
) {
    if !table.contains(&node.species_name) {
        trace!(species = %node.species_name, "unmatched, pruning subtree");
        summary.unmatched += 1;
        return;
    }

    let evolves: Vec<Value> = node
        .evolves_to
        .iter()
        .filter_map(|child| table.reference(&child.species_name))
        .map(Value::from)
        .collect();
    table.annotate(&node.species_name, EVOLVES_FIELD, Value::Array(evolves));
    summary.annotated += 1;

    if depth == EvolvesDepth::FullTree {
        for child in &node.evolves_to {
            visit_evolves(child, table, depth, summary);
        }
    }
}

/// `Lineage` policy.
///
/// Every matched node gets `evolvedFrom` (nearest matched ancestor or
/// `null`) and `evolvesTo` (first matched successor or `null`). Later
/// successors are dropped.
pub fn annotate_lineage(
    forest: &[EvolutionNode],
    table: &mut EntityTable,
    unmatched: UnmatchedNodes,
) -> AnnotationSummary {
    let mut summary = AnnotationSummary::default();
    for root in forest {
        visit_lineage(root, None, table, unmatched, &mut summary);
    }
    summary
}

fn visit_lineage(
    node: &EvolutionNode,
    parent: Option<&str>,
    table: &mut EntityTable,
    unmatched: UnmatchedNodes,
    summary: &mut AnnotationSummary,
) {
    if !table.contains(&node.species_name) {
        summary.unmatched += 1;
        if unmatched == UnmatchedNodes::SkipOver {
            trace!(species = %node.species_name, ?parent, "unmatched, passing parent through");
            for child in &node.evolves_to {
                visit_lineage(child, parent, table, unmatched, summary);
            }
        } else {
            trace!(species = %node.species_name, "unmatched, pruning subtree");
        }
        return;
    }

    let evolved_from = parent.and_then(|name| table.reference(name));
    let evolves_to = successors(node, table, unmatched).into_iter().next();

    table.annotate(&node.species_name, EVOLVED_FROM_FIELD, nullable(evolved_from));
    table.annotate(&node.species_name, EVOLVES_TO_FIELD, nullable(evolves_to));
    summary.annotated += 1;

    for child in &node.evolves_to {
        visit_lineage(child, Some(node.species_name.as_str()), table, unmatched, summary);
    }
}

/// Matched successors of `node` in tree order.
///
/// With `SkipOver` an unmatched child contributes its own successors.
pub fn successors(
    node: &EvolutionNode,
    table: &EntityTable,
    unmatched: UnmatchedNodes,
) -> Vec<EntityRef> {
    let mut found = Vec::new();
    for child in &node.evolves_to {
        match table.reference(&child.species_name) {
            Some(reference) => found.push(reference),
            None if unmatched == UnmatchedNodes::SkipOver => {
                found.extend(successors(child, table, unmatched));
            }
            None => {}
        }
    }
    found
}

fn nullable(reference: Option<EntityRef>) -> Value {
    reference.map(Value::from).unwrap_or(Value::Null)
}
