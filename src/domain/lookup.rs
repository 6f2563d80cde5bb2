//! Name-keyed lookup table over the owned entity records.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::domain::entities::{EntityRecord, EntityRef};

/// Exclusively owned entity records plus a name index.
///
/// Duplicate names resolve last-write-wins: the index points at the later
/// record and only that record is ever annotated. Earlier duplicates are
/// still written unchanged.
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    records: Vec<EntityRecord>,
    index: HashMap<String, usize>,
}

impl EntityTable {
    pub fn build(records: Vec<EntityRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if let Some(previous) = index.insert(record.name().to_string(), position) {
                debug!(
                    name = record.name(),
                    previous, position, "duplicate entity name, later record wins"
                );
            }
        }
        Self { records, index }
    }

    /// Whether `name` is a matched species.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Entity reference for a matched species, `None` when unmatched.
    pub fn reference(&self, name: &str) -> Option<EntityRef> {
        self.get(name).map(EntityRecord::reference)
    }

    /// Set `key` on the record named `name`. Returns false when unmatched.
    pub fn annotate(&mut self, name: &str, key: &str, value: Value) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                self.records[i].set(key, value);
                true
            }
            None => false,
        }
    }

    /// Records in their original input order.
    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EntityRecord> {
        self.records
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str, order: i64, position: usize) -> EntityRecord {
        EntityRecord::from_value(json!({"name": name, "order": order}), position).unwrap()
    }

    #[test]
    fn given_duplicate_names_when_building_then_later_record_wins() {
        let table = EntityTable::build(vec![record("Ditto", 1, 0), record("Ditto", 2, 1)]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.records().len(), 2);
        assert_eq!(table.reference("Ditto").unwrap().file, "002_Ditto.json");
    }

    #[test]
    fn given_duplicate_names_when_annotating_then_only_later_record_changes() {
        let mut table = EntityTable::build(vec![record("Ditto", 1, 0), record("Ditto", 2, 1)]);

        assert!(table.annotate("Ditto", "Evolves", json!([])));

        let records = table.into_records();
        assert!(records[0].get("Evolves").is_none());
        assert_eq!(records[1].get("Evolves"), Some(&json!([])));
    }

    #[test]
    fn given_unknown_name_when_annotating_then_returns_false() {
        let mut table = EntityTable::build(vec![record("Mew", 151, 0)]);
        assert!(!table.annotate("Mewtwo", "Evolves", json!([])));
        assert!(table.reference("Mewtwo").is_none());
        assert!(!table.contains("Mewtwo"));
    }
}
