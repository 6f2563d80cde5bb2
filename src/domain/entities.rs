//! Domain entities: core data structures

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::domain::error::DomainError;

/// Extension of every written record file.
pub const RECORD_EXTENSION: &str = "json";

/// Output file name for an entity: `<order:03>_<name>.json`.
///
/// Negative orders keep their sign inside the padded width (`-1` → `-01`).
pub fn record_file_name(order: i64, name: &str) -> String {
    format!("{order:03}_{name}.{RECORD_EXTENSION}")
}

/// One creature's data object.
///
/// Holds the full JSON object in insertion order. `name` and `order` are
/// validated on load and cached; every other field passes through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    name: String,
    order: i64,
    fields: Map<String, Value>,
}

impl EntityRecord {
    /// Validate a JSON value as an entity record.
    ///
    /// # Arguments
    /// * `value` - Raw JSON value from the input array
    /// * `position` - Zero-based index in the input array (used in error messages)
    pub fn from_value(value: Value, position: usize) -> Result<Self, DomainError> {
        let context = format!("entity #{position}");
        let Value::Object(fields) = value else {
            return Err(DomainError::NotAnObject { context });
        };

        let name = match fields.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(_) => {
                return Err(DomainError::InvalidField {
                    field: "name",
                    expected: "a string",
                    context,
                })
            }
            None => return Err(DomainError::MissingField { field: "name", context }),
        };

        let order = match fields.get("order") {
            Some(value) => value.as_i64().ok_or_else(|| DomainError::InvalidField {
                field: "order",
                expected: "an integer",
                context: format!("entity `{name}`"),
            })?,
            None => {
                return Err(DomainError::MissingField {
                    field: "order",
                    context: format!("entity `{name}`"),
                })
            }
        };

        Ok(Self { name, order, fields })
    }

    /// Validate every element of a JSON array as an entity record.
    pub fn from_array(value: Value) -> Result<Vec<Self>, DomainError> {
        let Value::Array(items) = value else {
            return Err(DomainError::NotAnArray { what: "entity records" });
        };
        items
            .into_iter()
            .enumerate()
            .map(|(position, item)| Self::from_value(item, position))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn file_name(&self) -> String {
        record_file_name(self.order, &self.name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Insert or overwrite a field.
    ///
    /// A new key is appended; an existing key keeps its position.
    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    /// Reference to this record's eventual output file.
    pub fn reference(&self) -> EntityRef {
        EntityRef {
            name: self.name.clone(),
            file: self.file_name(),
        }
    }
}

impl Serialize for EntityRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// `{name, file}` pointer used to cross-link records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub name: String,
    pub file: String,
}

impl From<EntityRef> for Value {
    fn from(reference: EntityRef) -> Self {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(reference.name));
        map.insert("file".into(), Value::String(reference.file));
        Value::Object(map)
    }
}

/// Node of an evolution tree.
///
/// Extra keys such as `speciesId` are ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionNode {
    pub species_name: String,
    pub evolves_to: Vec<EvolutionNode>,
}

impl EvolutionNode {
    pub fn new(species_name: impl Into<String>, evolves_to: Vec<EvolutionNode>) -> Self {
        Self {
            species_name: species_name.into(),
            evolves_to,
        }
    }

    pub fn leaf(species_name: impl Into<String>) -> Self {
        Self::new(species_name, Vec::new())
    }

    /// Number of nodes in this subtree, including self.
    pub fn size(&self) -> usize {
        1 + self.evolves_to.iter().map(EvolutionNode::size).sum::<usize>()
    }
}
