use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::AttrValue;

/// The seven known domain classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityClass {
    BaseModel,
    User,
    State,
    City,
    Place,
    Amenity,
    Review,
}

/// Declared type of a class field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    TextList,
}

/// A typed field declared by a class, with its implicit default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    /// Value reported for this field when it was never set.
    pub fn default_value(&self) -> AttrValue {
        match self.kind {
            FieldKind::Text => AttrValue::String(String::new()),
            FieldKind::Integer => AttrValue::from(0),
            FieldKind::Float => AttrValue::from(0.0),
            FieldKind::TextList => AttrValue::Array(Vec::new()),
        }
    }
}

use self::FieldKind::{Float, Integer, Text, TextList};

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("email", Text),
    FieldSpec::new("password", Text),
    FieldSpec::new("first_name", Text),
    FieldSpec::new("last_name", Text),
];

const STATE_FIELDS: &[FieldSpec] = &[FieldSpec::new("name", Text)];

const CITY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("state_id", Text),
    FieldSpec::new("name", Text),
];

const AMENITY_FIELDS: &[FieldSpec] = &[FieldSpec::new("name", Text)];

const PLACE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("city_id", Text),
    FieldSpec::new("user_id", Text),
    FieldSpec::new("name", Text),
    FieldSpec::new("description", Text),
    FieldSpec::new("number_rooms", Integer),
    FieldSpec::new("number_bathrooms", Integer),
    FieldSpec::new("max_guest", Integer),
    FieldSpec::new("price_by_night", Integer),
    FieldSpec::new("latitude", Float),
    FieldSpec::new("longitude", Float),
    FieldSpec::new("amenity_ids", TextList),
];

const REVIEW_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("place_id", Text),
    FieldSpec::new("user_id", Text),
    FieldSpec::new("text", Text),
];

impl EntityClass {
    /// Every known class, in registry order.
    pub const ALL: [EntityClass; 7] = [
        EntityClass::BaseModel,
        EntityClass::User,
        EntityClass::State,
        EntityClass::City,
        EntityClass::Place,
        EntityClass::Amenity,
        EntityClass::Review,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::State => "State",
            Self::City => "City",
            Self::Place => "Place",
            Self::Amenity => "Amenity",
            Self::Review => "Review",
        }
    }

    /// Typed fields declared by this class (beyond id and timestamps).
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::BaseModel => &[],
            Self::User => USER_FIELDS,
            Self::State => STATE_FIELDS,
            Self::City => CITY_FIELDS,
            Self::Place => PLACE_FIELDS,
            Self::Amenity => AMENITY_FIELDS,
            Self::Review => REVIEW_FIELDS,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityClass {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| TypeError::UnknownClass(s.to_string()))
    }
}
