//! Record shapes: what storage hands back vs. what callers display
//!
//! `RawRecord` is an owning row with its per-type relation fields attached.
//! `NormalizedRecord` is the projection with those fields removed and the
//! populated one exposed under a single details field.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};

/// True when a field carries a value: present and not `null`
pub fn is_populated(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

/// An owning entity as returned by a storage collaborator
#[derive(Debug, Clone, Default, PartialEq, Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<V: Into<Value>>(&mut self, name: &str, value: V) -> Option<Value> {
        self.fields.insert(name.to_string(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field value when present and not `null`
    pub fn populated(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    /// String value of a field, if it is a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for RawRecord {
    type Error = ModelError;

    fn try_from(value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ModelError::Validation(format!(
                "expected a JSON object record, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// An owning entity with its detail relations collapsed into one field
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    attributes: Map<String, Value>,
    details_field: String,
    details: Option<Value>,
}

impl NormalizedRecord {
    pub(crate) fn new(
        attributes: Map<String, Value>,
        details_field: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            attributes,
            details_field: details_field.into(),
            details,
        }
    }

    /// The populated detail record, if any
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Name of the unified field (`details` by default)
    pub fn details_field(&self) -> &str {
        &self.details_field
    }

    /// Every non-details attribute of the owning entity
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        if name == self.details_field {
            return self.details.as_ref();
        }
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        name == self.details_field || self.attributes.contains_key(name)
    }

    /// Split into attributes and details
    pub fn into_parts(self) -> (Map<String, Value>, Option<Value>) {
        (self.attributes, self.details)
    }

    /// Flatten into a plain JSON object, `details` as `null` when absent
    pub fn into_value(self) -> Value {
        let mut fields = self.attributes;
        fields.insert(self.details_field, self.details.unwrap_or(Value::Null));
        Value::Object(fields)
    }

    /// Re-enter the raw shape, e.g. to normalize an already normalized record again
    pub fn into_raw(self) -> RawRecord {
        match self.into_value() {
            Value::Object(fields) => RawRecord::from(fields),
            _ => RawRecord::new(),
        }
    }
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + 1))?;
        for (key, value) in &self.attributes {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(&self.details_field, &self.details)?;
        map.end()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
