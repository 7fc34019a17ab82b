pub mod attributes;
pub mod entity;
pub mod kind;

pub use attributes::{is_protected, Attributes, PROTECTED_KEYS};
pub use entity::{entity_key, split_key, Entity, TIMESTAMP_FORMAT};
pub use kind::{EntityKind, FieldSpec, FieldType};
