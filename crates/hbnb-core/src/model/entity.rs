use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use super::attributes::Attributes;
use super::kind::EntityKind;
use crate::errors::{HbnbError, Result};
use crate::render::render_value;

/// Timestamp layout used in persisted maps (microsecond precision, no offset)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Build the composite registry key `"<Type>.<id>"`
pub fn entity_key(kind: EntityKind, id: &str) -> String {
    format!("{}.{}", kind.name(), id)
}

/// Split a composite key back into its type name and identifier
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('.')
}

/// A live entity record
///
/// Identity and timestamps are fixed fields; everything type-specific lives
/// in the attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,

    /// Unique identifier (UUID v4), immutable after creation
    pub id: String,

    pub created_at: DateTime<Utc>,

    /// Refreshed on every persisted mutation
    pub updated_at: DateTime<Utc>,

    pub attributes: Attributes,
}

impl Entity {
    /// Create a fresh entity with a generated identifier and current timestamps
    pub fn new(kind: EntityKind) -> Self {
        let now = Utc::now();
        Self {
            kind,
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            attributes: Attributes::new(),
        }
    }

    /// Restore an entity from a previously serialized map
    ///
    /// `id`, `created_at` and `updated_at` are restored verbatim when present
    /// and generated otherwise. The `__class__` tag is discarded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimestamp` if a timestamp is present but unparseable.
    pub fn from_map(kind: EntityKind, map: Map<String, Value>) -> Result<Self> {
        let mut entity = Entity::new(kind);
        for (key, value) in map {
            match key.as_str() {
                "__class__" => {}
                "id" => {
                    entity.id = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    }
                }
                "created_at" => entity.created_at = parse_timestamp("created_at", &value)?,
                "updated_at" => entity.updated_at = parse_timestamp("updated_at", &value)?,
                _ => {
                    entity.attributes.set(key, value);
                }
            }
        }
        Ok(entity)
    }

    /// Serialize to a plain map: attributes plus identity, timestamps and type tag
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in self.attributes.iter() {
            map.insert(key.clone(), value.clone());
        }
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map.insert(
            "created_at".to_string(),
            Value::String(format_timestamp(&self.created_at)),
        );
        map.insert(
            "updated_at".to_string(),
            Value::String(format_timestamp(&self.updated_at)),
        );
        map.insert(
            "__class__".to_string(),
            Value::String(self.kind.name().to_string()),
        );
        map
    }

    pub fn key(&self) -> String {
        entity_key(self.kind, &self.id)
    }

    /// Refresh the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Set an attribute; returns `false` for protected keys
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> bool {
        self.attributes.set(key, value)
    }

    /// Read a field, falling back to the schema default for declared fields
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "created_at" => Some(Value::String(format_timestamp(&self.created_at))),
            "updated_at" => Some(Value::String(format_timestamp(&self.updated_at))),
            _ => self
                .attributes
                .get(name)
                .cloned()
                .or_else(|| self.kind.field(name).map(|f| f.default_value())),
        }
    }

    /// Read a field as a string slice, only if it was explicitly set
    pub fn str_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// `[<Type>] (<id>) {<key>: <value>, ...}`
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<(String, Value)> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        fields.push(("id".to_string(), Value::String(self.id.clone())));
        fields.push((
            "created_at".to_string(),
            Value::String(format_timestamp(&self.created_at)),
        ));
        fields.push((
            "updated_at".to_string(),
            Value::String(format_timestamp(&self.updated_at)),
        ));
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        write!(f, "[{}] ({}) {{", self.kind, self.id)?;
        for (i, (key, value)) in fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", key, render_value(value))?;
        }
        f.write_str("}")
    }
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(field: &str, value: &Value) -> Result<DateTime<Utc>> {
    let invalid = || HbnbError::InvalidTimestamp {
        field: field.to_string(),
        value: value.to_string(),
    };
    let raw = value.as_str().ok_or_else(invalid)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| invalid())
}
