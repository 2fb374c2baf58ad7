//! Record Module
//!
//! The generic structured value the engine stores.
//!
//! ## Responsibilities
//! - Wrap a JSON object map with typed accessors
//! - Carry the engine-reserved fields (`_id`, `_type`, `_class`)
//! - Convert to and from user-defined structs
//!
//! ## Reserved Fields
//! The engine injects `_id` and `_type` when a record is stored without
//! them. `_class` records the original concrete type name so reads can
//! rebuild the concrete shape; it is stamped at encode time and consulted
//! by the [`TypeRegistry`].

mod registry;

pub use registry::TypeRegistry;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FlatError, Result};

/// Field holding the engine-generated unique identifier
pub const ID_FIELD: &str = "_id";

/// Field holding the type tag naming the record's partition
pub const TYPE_FIELD: &str = "_type";

/// Field holding the original concrete type name, populated on disk
pub const CLASS_FIELD: &str = "_class";

/// A structured record with engine-managed id and type tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record already tagged with a type
    pub fn of_type(type_tag: &str) -> Self {
        let mut record = Self::new();
        record.set_type_tag(type_tag);
        record
    }

    /// Wrap a JSON value; anything but an object is rejected
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(FlatError::Validation(format!(
                "record must be a structured value, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// Build a record from a user struct, tagging it with `type_tag`.
    ///
    /// The tag doubles as the concrete class name, so reads materialize
    /// back into `T` once the type is registered.
    pub fn from_typed<T: Serialize>(type_tag: &str, value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| FlatError::Serialization(e.to_string()))?;
        let mut record = Self::from_value(value)?;
        record.set_type_tag(type_tag);
        record.set_class_name(type_tag);
        Ok(record)
    }

    /// Convert the record back into a user struct
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| FlatError::Serialization(e.to_string()))
    }

    // =========================================================================
    // Reserved Field Accessors
    // =========================================================================

    /// The record's unique identifier, if assigned
    pub fn id(&self) -> Option<&str> {
        self.str_field(ID_FIELD)
    }

    pub fn set_id(&mut self, id: &str) {
        self.fields.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    }

    /// The type tag naming the record's partition, if assigned
    pub fn type_tag(&self) -> Option<&str> {
        self.str_field(TYPE_FIELD)
    }

    pub fn set_type_tag(&mut self, type_tag: &str) {
        self.fields
            .insert(TYPE_FIELD.to_string(), Value::String(type_tag.to_string()));
    }

    /// The original concrete type name, if stamped
    pub fn class_name(&self) -> Option<&str> {
        self.str_field(CLASS_FIELD)
    }

    pub fn set_class_name(&mut self, class_name: &str) {
        self.fields
            .insert(CLASS_FIELD.to_string(), Value::String(class_name.to_string()));
    }

    // =========================================================================
    // Generic Field Access
    // =========================================================================

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    /// Builder-style field assignment
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.set(field, value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Whether the record carries no fields beyond the engine-managed ones
    pub fn is_blank(&self) -> bool {
        self.fields
            .keys()
            .all(|key| key == ID_FIELD || key == TYPE_FIELD || key == CLASS_FIELD)
    }

    /// Borrow the underlying field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
