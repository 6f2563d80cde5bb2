//! Text rendering of the evolution forest.

use termtree::Tree;

use crate::domain::entities::EvolutionNode;
use crate::domain::lookup::EntityTable;

const UNMATCHED_SUFFIX: &str = "(unmatched)";

/// One `Tree` per forest root.
///
/// Matched species show the file they will be written to:
/// ```text
/// Bulbasaur → 001_Bulbasaur.json
/// └── Ivysaur → 002_Ivysaur.json
///     └── Venusaur (unmatched)
/// ```
pub fn render_forest(forest: &[EvolutionNode], table: &EntityTable) -> Vec<Tree<String>> {
    forest.iter().map(|root| render_node(root, table)).collect()
}

fn render_node(node: &EvolutionNode, table: &EntityTable) -> Tree<String> {
    let label = match table.reference(&node.species_name) {
        Some(reference) => format!("{} → {}", reference.name, reference.file),
        None => format!("{} {}", node.species_name, UNMATCHED_SUFFIX),
    };
    let leaves: Vec<_> = node
        .evolves_to
        .iter()
        .map(|child| render_node(child, table))
        .collect();
    Tree::new(label).with_leaves(leaves)
}
