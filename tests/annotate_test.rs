//! Tests for the evolves and lineage annotation policies

use rstest::{fixture, rstest};
use serde_json::{json, Value};

use dexlink::domain::{
    annotate, annotate_evolves, annotate_lineage, AnnotateOptions, AnnotationPolicy,
    EntityRecord, EntityTable, EvolutionNode, EvolvesDepth, UnmatchedNodes, EVOLVED_FROM_FIELD,
    EVOLVES_FIELD, EVOLVES_TO_FIELD,
};

fn table(entities: Value) -> EntityTable {
    EntityTable::build(EntityRecord::from_array(entities).expect("valid entities"))
}

fn forest(value: Value) -> Vec<EvolutionNode> {
    serde_json::from_value(value).expect("valid forest")
}

fn field<'a>(table: &'a EntityTable, name: &str, key: &str) -> Option<&'a Value> {
    table.get(name).and_then(|record| record.get(key))
}

#[fixture]
fn bulbasaur_entities() -> Value {
    json!([
        {"name": "Bulbasaur", "order": 1},
        {"name": "Ivysaur", "order": 2},
        {"name": "Venusaur", "order": 3}
    ])
}

#[fixture]
fn bulbasaur_forest() -> Vec<EvolutionNode> {
    forest(json!([
        {"speciesName": "Bulbasaur", "evolvesTo": [
            {"speciesName": "Ivysaur", "evolvesTo": [
                {"speciesName": "Venusaur", "evolvesTo": []}
            ]}
        ]}
    ]))
}

// ============================================================
// lineage policy
// ============================================================

#[rstest]
fn given_full_chain_when_lineage_then_middle_links_both_ways(
    bulbasaur_entities: Value,
    bulbasaur_forest: Vec<EvolutionNode>,
) {
    // Arrange
    let mut t = table(bulbasaur_entities);

    // Act
    let summary = annotate(
        &bulbasaur_forest,
        &mut t,
        AnnotationPolicy::Lineage,
        AnnotateOptions::default(),
    );

    // Assert
    assert_eq!(summary.annotated, 3);
    assert_eq!(summary.unmatched, 0);
    assert_eq!(
        field(&t, "Ivysaur", EVOLVED_FROM_FIELD),
        Some(&json!({"name": "Bulbasaur", "file": "001_Bulbasaur.json"}))
    );
    assert_eq!(
        field(&t, "Ivysaur", EVOLVES_TO_FIELD),
        Some(&json!({"name": "Venusaur", "file": "003_Venusaur.json"}))
    );
    assert_eq!(field(&t, "Bulbasaur", EVOLVED_FROM_FIELD), Some(&Value::Null));
    assert_eq!(field(&t, "Venusaur", EVOLVES_TO_FIELD), Some(&Value::Null));
}

#[test]
fn given_unmatched_middle_when_skip_over_then_ends_link_to_each_other() {
    // Arrange - B is missing from the entity records
    let mut t = table(json!([
        {"name": "A", "order": 1},
        {"name": "C", "order": 3}
    ]));
    let f = forest(json!([
        {"speciesName": "A", "evolvesTo": [
            {"speciesName": "B", "evolvesTo": [
                {"speciesName": "C", "evolvesTo": []}
            ]}
        ]}
    ]));

    // Act
    let summary = annotate_lineage(&f, &mut t, UnmatchedNodes::SkipOver);

    // Assert
    assert_eq!(summary.annotated, 2);
    assert_eq!(summary.unmatched, 1);
    assert_eq!(
        field(&t, "C", EVOLVED_FROM_FIELD),
        Some(&json!({"name": "A", "file": "001_A.json"}))
    );
    assert_eq!(
        field(&t, "A", EVOLVES_TO_FIELD),
        Some(&json!({"name": "C", "file": "003_C.json"}))
    );
}

#[test]
fn given_unmatched_middle_when_prune_then_subtree_left_unannotated() {
    // Arrange
    let mut t = table(json!([
        {"name": "A", "order": 1},
        {"name": "C", "order": 3}
    ]));
    let f = forest(json!([
        {"speciesName": "A", "evolvesTo": [
            {"speciesName": "B", "evolvesTo": [
                {"speciesName": "C", "evolvesTo": []}
            ]}
        ]}
    ]));

    // Act
    let summary = annotate_lineage(&f, &mut t, UnmatchedNodes::Prune);

    // Assert
    assert_eq!(summary.annotated, 1);
    assert_eq!(field(&t, "A", EVOLVES_TO_FIELD), Some(&Value::Null));
    assert!(field(&t, "C", EVOLVED_FROM_FIELD).is_none());
    assert!(field(&t, "C", EVOLVES_TO_FIELD).is_none());
}

#[rstest]
#[case::skip_over(UnmatchedNodes::SkipOver)]
#[case::prune(UnmatchedNodes::Prune)]
fn given_several_matched_children_when_lineage_then_only_first_is_kept(
    #[case] unmatched: UnmatchedNodes,
) {
    // Arrange
    let mut t = table(json!([
        {"name": "Eevee", "order": 133},
        {"name": "Vaporeon", "order": 134},
        {"name": "Jolteon", "order": 135},
        {"name": "Flareon", "order": 136}
    ]));
    let f = forest(json!([
        {"speciesName": "Eevee", "evolvesTo": [
            {"speciesName": "Vaporeon", "evolvesTo": []},
            {"speciesName": "Jolteon", "evolvesTo": []},
            {"speciesName": "Flareon", "evolvesTo": []}
        ]}
    ]));

    // Act
    annotate_lineage(&f, &mut t, unmatched);

    // Assert - siblings still point back at Eevee, but Eevee only forward to the first
    assert_eq!(
        field(&t, "Eevee", EVOLVES_TO_FIELD),
        Some(&json!({"name": "Vaporeon", "file": "134_Vaporeon.json"}))
    );
    for sibling in ["Jolteon", "Flareon"] {
        assert_eq!(
            field(&t, sibling, EVOLVED_FROM_FIELD),
            Some(&json!({"name": "Eevee", "file": "133_Eevee.json"}))
        );
    }
}

#[test]
fn given_unmatched_root_when_skip_over_then_children_have_null_parent() {
    // Arrange
    let mut t = table(json!([{"name": "Pichu2", "order": 2}]));
    let f = forest(json!([
        {"speciesName": "Ghost", "evolvesTo": [{"speciesName": "Pichu2", "evolvesTo": []}]}
    ]));

    // Act
    annotate_lineage(&f, &mut t, UnmatchedNodes::SkipOver);

    // Assert
    assert_eq!(field(&t, "Pichu2", EVOLVED_FROM_FIELD), Some(&Value::Null));
}

// ============================================================
// evolves policy
// ============================================================

#[rstest]
fn given_full_tree_when_evolves_then_every_matched_node_lists_direct_children(
    bulbasaur_entities: Value,
    bulbasaur_forest: Vec<EvolutionNode>,
) {
    // Arrange
    let mut t = table(bulbasaur_entities);

    // Act
    let summary = annotate_evolves(&bulbasaur_forest, &mut t, EvolvesDepth::FullTree);

    // Assert
    assert_eq!(summary.annotated, 3);
    assert_eq!(
        field(&t, "Bulbasaur", EVOLVES_FIELD),
        Some(&json!([{"name": "Ivysaur", "file": "002_Ivysaur.json"}]))
    );
    assert_eq!(
        field(&t, "Ivysaur", EVOLVES_FIELD),
        Some(&json!([{"name": "Venusaur", "file": "003_Venusaur.json"}]))
    );
    assert_eq!(field(&t, "Venusaur", EVOLVES_FIELD), Some(&json!([])));
}

#[rstest]
fn given_root_only_when_evolves_then_descendants_unannotated(
    bulbasaur_entities: Value,
    bulbasaur_forest: Vec<EvolutionNode>,
) {
    // Arrange
    let mut t = table(bulbasaur_entities);

    // Act
    let summary = annotate_evolves(&bulbasaur_forest, &mut t, EvolvesDepth::RootOnly);

    // Assert
    assert_eq!(summary.annotated, 1);
    assert!(field(&t, "Bulbasaur", EVOLVES_FIELD).is_some());
    assert!(field(&t, "Ivysaur", EVOLVES_FIELD).is_none());
    assert!(field(&t, "Venusaur", EVOLVES_FIELD).is_none());
}

#[test]
fn given_unmatched_child_when_evolves_then_filtered_not_substituted() {
    // Arrange - B missing; its child C is not promoted into A's list
    let mut t = table(json!([
        {"name": "A", "order": 1},
        {"name": "C", "order": 3},
        {"name": "D", "order": 4}
    ]));
    let f = forest(json!([
        {"speciesName": "A", "evolvesTo": [
            {"speciesName": "B", "evolvesTo": [{"speciesName": "C", "evolvesTo": []}]},
            {"speciesName": "D", "evolvesTo": []}
        ]}
    ]));

    // Act
    annotate_evolves(&f, &mut t, EvolvesDepth::FullTree);

    // Assert - the walk stops at B, so C is never annotated
    assert_eq!(
        field(&t, "A", EVOLVES_FIELD),
        Some(&json!([{"name": "D", "file": "004_D.json"}]))
    );
    assert!(field(&t, "C", EVOLVES_FIELD).is_none());
    assert_eq!(field(&t, "D", EVOLVES_FIELD), Some(&json!([])));
}

#[test]
fn given_unmatched_root_when_evolves_then_whole_tree_pruned() {
    // Arrange
    let mut t = table(json!([{"name": "Ivysaur", "order": 2}]));
    let f = forest(json!([
        {"speciesName": "Bulbasaur", "evolvesTo": [{"speciesName": "Ivysaur", "evolvesTo": []}]}
    ]));

    // Act
    let summary = annotate_evolves(&f, &mut t, EvolvesDepth::FullTree);

    // Assert
    assert_eq!(summary.annotated, 0);
    assert_eq!(summary.unmatched, 1);
    assert!(field(&t, "Ivysaur", EVOLVES_FIELD).is_none());
}

// ============================================================
// shared properties
// ============================================================

#[rstest]
#[case::evolves(AnnotationPolicy::Evolves)]
#[case::lineage(AnnotationPolicy::Lineage)]
fn given_unreferenced_entity_when_annotating_then_record_unchanged(
    #[case] policy: AnnotationPolicy,
    bulbasaur_forest: Vec<EvolutionNode>,
) {
    // Arrange
    let mut t = table(json!([
        {"name": "Bulbasaur", "order": 1},
        {"name": "Mew", "order": 151, "types": ["psychic"]}
    ]));
    let before = t.get("Mew").unwrap().clone();

    // Act
    annotate(&bulbasaur_forest, &mut t, policy, AnnotateOptions::default());

    // Assert
    assert_eq!(t.get("Mew"), Some(&before));
}

#[test]
fn given_duplicate_names_when_annotating_then_later_record_is_referenced() {
    // Arrange
    let mut t = table(json!([
        {"name": "Bulbasaur", "order": 1},
        {"name": "Ivysaur", "order": 2},
        {"name": "Ivysaur", "order": 20}
    ]));
    let f = forest(json!([
        {"speciesName": "Bulbasaur", "evolvesTo": [{"speciesName": "Ivysaur", "evolvesTo": []}]}
    ]));

    // Act
    annotate_lineage(&f, &mut t, UnmatchedNodes::SkipOver);

    // Assert
    assert_eq!(
        field(&t, "Bulbasaur", EVOLVES_TO_FIELD),
        Some(&json!({"name": "Ivysaur", "file": "020_Ivysaur.json"}))
    );
    let records = t.into_records();
    assert!(records[1].get(EVOLVED_FROM_FIELD).is_none());
    assert!(records[2].get(EVOLVED_FROM_FIELD).is_some());
}

#[test]
fn given_empty_forest_when_annotating_then_nothing_changes() {
    let mut t = table(json!([{"name": "Mew", "order": 151}]));

    let summary = annotate(&[], &mut t, AnnotationPolicy::Lineage, AnnotateOptions::default());

    assert_eq!(summary.annotated, 0);
    assert_eq!(t.get("Mew").unwrap().fields().len(), 2);
}
