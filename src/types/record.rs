use std::collections::HashMap;

use super::Value;

/// A flat record mapping field names to scalar [`Value`]s.
///
/// This is the data object a rule set is checked against. Nested objects
/// and arrays are not resolvable as field references and are skipped when
/// building a record from JSON.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, consuming and returning the record.
    #[must_use]
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.insert(field, value.into());
        self
    }

    /// Insert a field value (mutable reference version).
    pub fn insert(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_owned(), value);
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Whether the record has a field with this name.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of fields in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a JSON object, keeping only scalar-valued
    /// entries. Non-object input yields an empty record.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        let mut record = Record::new();
        if let Some(object) = json.as_object() {
            for (field, value) in object {
                if let Some(scalar) = Value::from_json(value) {
                    record.insert(field, scalar);
                }
            }
        }
        record
    }

    /// Parse a JSON document and build a record from it.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if the text is not
    /// valid JSON.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from_json(&json))
    }
}
