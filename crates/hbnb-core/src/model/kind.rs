use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::errors::HbnbError;

/// Storage type of a declared entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    /// Identifier of another entity of the given kind
    Reference(EntityKind),
    /// List of identifiers of another kind (many-to-many)
    ReferenceList(EntityKind),
}

/// A declared field of an entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    /// Required by the relational schema (NOT NULL)
    pub required: bool,
}

impl FieldSpec {
    const fn text(name: &'static str, required: bool) -> Self {
        Self {
            name,
            ty: FieldType::Text,
            required,
        }
    }

    const fn integer(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Integer,
            required: false,
        }
    }

    const fn float(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Float,
            required: false,
        }
    }

    const fn reference(name: &'static str, kind: EntityKind) -> Self {
        Self {
            name,
            ty: FieldType::Reference(kind),
            required: true,
        }
    }

    /// Value an entity reports for this field when it was never set
    pub fn default_value(&self) -> Value {
        match self.ty {
            FieldType::Text | FieldType::Reference(_) => Value::String(String::new()),
            FieldType::Integer => Value::from(0),
            FieldType::Float => Value::from(0.0),
            FieldType::ReferenceList(_) => Value::Array(Vec::new()),
        }
    }
}

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("email", true),
    FieldSpec::text("password", true),
    FieldSpec::text("first_name", false),
    FieldSpec::text("last_name", false),
];

const STATE_FIELDS: &[FieldSpec] = &[FieldSpec::text("name", true)];

const CITY_FIELDS: &[FieldSpec] = &[
    FieldSpec::reference("state_id", EntityKind::State),
    FieldSpec::text("name", true),
];

const AMENITY_FIELDS: &[FieldSpec] = &[FieldSpec::text("name", true)];

const PLACE_FIELDS: &[FieldSpec] = &[
    FieldSpec::reference("city_id", EntityKind::City),
    FieldSpec::reference("user_id", EntityKind::User),
    FieldSpec::text("name", true),
    FieldSpec::text("description", false),
    FieldSpec::integer("number_rooms"),
    FieldSpec::integer("number_bathrooms"),
    FieldSpec::integer("max_guest"),
    FieldSpec::integer("price_by_night"),
    FieldSpec::float("latitude"),
    FieldSpec::float("longitude"),
    FieldSpec {
        name: "amenity_ids",
        ty: FieldType::ReferenceList(EntityKind::Amenity),
        required: false,
    },
];

const REVIEW_FIELDS: &[FieldSpec] = &[
    FieldSpec::reference("place_id", EntityKind::Place),
    FieldSpec::reference("user_id", EntityKind::User),
    FieldSpec::text("text", true),
];

/// The class-name catalog
///
/// Closed set of entity types the console can create and the storage layer
/// can persist. Parsing is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::BaseModel,
        EntityKind::User,
        EntityKind::State,
        EntityKind::City,
        EntityKind::Amenity,
        EntityKind::Place,
        EntityKind::Review,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::BaseModel => "BaseModel",
            EntityKind::User => "User",
            EntityKind::State => "State",
            EntityKind::City => "City",
            EntityKind::Amenity => "Amenity",
            EntityKind::Place => "Place",
            EntityKind::Review => "Review",
        }
    }

    /// Relational table backing this kind; `BaseModel` has none
    pub fn table(&self) -> Option<&'static str> {
        match self {
            EntityKind::BaseModel => None,
            EntityKind::User => Some("users"),
            EntityKind::State => Some("states"),
            EntityKind::City => Some("cities"),
            EntityKind::Amenity => Some("amenities"),
            EntityKind::Place => Some("places"),
            EntityKind::Review => Some("reviews"),
        }
    }

    /// Declared fields, in column order
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            EntityKind::BaseModel => &[],
            EntityKind::User => USER_FIELDS,
            EntityKind::State => STATE_FIELDS,
            EntityKind::City => CITY_FIELDS,
            EntityKind::Amenity => AMENITY_FIELDS,
            EntityKind::Place => PLACE_FIELDS,
            EntityKind::Review => REVIEW_FIELDS,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = HbnbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| HbnbError::UnknownClass {
                class_name: s.to_string(),
            })
    }
}
