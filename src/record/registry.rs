//! Type Registry
//!
//! Maps concrete type names to materializers that rebuild typed shapes
//! from generic records read off disk. A statically typed language cannot
//! instantiate a type from a runtime string, so the mapping is declared up
//! front at engine setup.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::{Record, CLASS_FIELD, ID_FIELD, TYPE_FIELD};

type Materializer = Box<dyn Fn(&Record) -> Option<Record> + Send + Sync>;

/// Registry of concrete record shapes, keyed by class name
#[derive(Default)]
pub struct TypeRegistry {
    factories: HashMap<String, Materializer>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a materializer for records whose `_class` is `type_name`.
    ///
    /// Materialization round-trips the record through `T`: known fields are
    /// normalized to the concrete shape (serde defaults applied, wrong-typed
    /// values rejected), engine-managed fields and unrecognized extras are
    /// carried across unchanged.
    pub fn register<T>(&mut self, type_name: &str)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let factory: Materializer = Box::new(|record: &Record| {
            let generic = Value::Object(record.fields().clone());
            let concrete: T = serde_json::from_value(generic).ok()?;
            let rebuilt = serde_json::to_value(&concrete).ok()?;
            let mut rebuilt = Record::from_value(rebuilt).ok()?;

            for (field, value) in record.fields() {
                let reserved = field == ID_FIELD || field == TYPE_FIELD || field == CLASS_FIELD;
                if reserved || rebuilt.get(field).is_none() {
                    rebuilt.set(field, value.clone());
                }
            }
            Some(rebuilt)
        });
        self.factories.insert(type_name.to_string(), factory);
    }

    /// Whether a materializer is installed for `type_name`
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Rebuild the record's original concrete shape.
    ///
    /// A record whose class has no registration passes through as-is; there
    /// is nothing to reconstruct. A registered materializer that fails
    /// (shape drift in an old partition) logs and passes the generic record
    /// through rather than dropping data.
    pub fn materialize(&self, record: Record) -> Record {
        let class = match record.class_name() {
            Some(class) => class.to_string(),
            None => return record,
        };
        let factory = match self.factories.get(&class) {
            Some(factory) => factory,
            None => return record,
        };
        match factory(&record) {
            Some(rebuilt) => rebuilt,
            None => {
                tracing::warn!(class = %class, "materialization failed, keeping generic record");
                record
            }
        }
    }
}
