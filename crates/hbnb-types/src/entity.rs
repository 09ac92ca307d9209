use std::fmt;

use crate::class::EntityClass;
use crate::error::TypeError;
use crate::identity::EntityId;
use crate::repr::{repr_str, repr_value};
use crate::temporal::Timestamp;
use crate::{AttrValue, Attributes};

/// Reserved record field carrying the class name.
pub const CLASS_KEY: &str = "__class__";

const ID: &str = "id";
const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

/// A domain object: identity, timestamps, and an insertion-ordered attribute
/// mapping.
///
/// Class-declared fields ([`EntityClass::fields`]) read as their defaults until
/// set; any other attribute name is accepted as an extension attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    class: EntityClass,
    id: EntityId,
    created_at: Timestamp,
    updated_at: Timestamp,
    attributes: Attributes,
}

impl Entity {
    /// A fresh entity with a new id and `created_at == updated_at == now`.
    ///
    /// Construction alone does not register the entity anywhere; the store's
    /// `create` is the registering path.
    pub fn new(class: EntityClass) -> Self {
        let now = Timestamp::now();
        Self {
            class,
            id: EntityId::generate(),
            created_at: now,
            updated_at: now,
            attributes: Attributes::new(),
        }
    }

    /// Rebuild an entity from a serialized attribute mapping.
    ///
    /// `id`, `created_at` and `updated_at` are restored verbatim; absent ones
    /// fall back to fresh values. Remaining attributes keep mapping order. A
    /// stray `__class__` entry is ignored. `updated_at` is never refreshed here.
    pub fn from_record(class: EntityClass, record: Attributes) -> Result<Self, TypeError> {
        let mut entity = Self::new(class);
        for (name, value) in record {
            match name.as_str() {
                CLASS_KEY => {}
                ID => entity.id = id_from_value(value),
                CREATED_AT => entity.created_at = timestamp_from_value(CREATED_AT, &value)?,
                UPDATED_AT => entity.updated_at = timestamp_from_value(UPDATED_AT, &value)?,
                _ => {
                    entity.attributes.insert(name, value);
                }
            }
        }
        Ok(entity)
    }

    pub fn class(&self) -> EntityClass {
        self.class
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Attributes explicitly set on this instance, in insertion order.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Composite store key: `<ClassName>.<id>`.
    pub fn key(&self) -> String {
        composite_key(self.class, self.id.as_str())
    }

    /// Read an attribute: set value, else the class default, else `None`.
    ///
    /// Timestamps are returned in their on-disk text form.
    pub fn get(&self, name: &str) -> Option<AttrValue> {
        match name {
            ID => Some(AttrValue::String(self.id.to_string())),
            CREATED_AT => Some(AttrValue::String(self.created_at.to_iso())),
            UPDATED_AT => Some(AttrValue::String(self.updated_at.to_iso())),
            _ => self
                .attributes
                .get(name)
                .cloned()
                .or_else(|| self.class.field(name).map(|f| f.default_value())),
        }
    }

    /// Assign an attribute.
    ///
    /// `id` accepts any value and keeps its text. Timestamps accept only text
    /// in the on-disk format. `__class__` cannot be assigned. Setting an
    /// attribute does not touch `updated_at`; callers save afterwards.
    pub fn set(&mut self, name: &str, value: AttrValue) -> Result<(), TypeError> {
        match name {
            CLASS_KEY => return Err(TypeError::ReservedAttribute(name.to_string())),
            ID => self.id = id_from_value(value),
            CREATED_AT => self.created_at = timestamp_from_value(CREATED_AT, &value)?,
            UPDATED_AT => self.updated_at = timestamp_from_value(UPDATED_AT, &value)?,
            _ => {
                self.attributes.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Refresh `updated_at` to the current time.
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.refreshed();
    }

    /// Serialized form: every instance attribute plus `__class__`, with
    /// timestamps rendered as text.
    pub fn to_record(&self) -> Attributes {
        let mut record = Attributes::new();
        record.insert(ID.into(), AttrValue::String(self.id.to_string()));
        record.insert(CREATED_AT.into(), AttrValue::String(self.created_at.to_iso()));
        record.insert(UPDATED_AT.into(), AttrValue::String(self.updated_at.to_iso()));
        for (name, value) in &self.attributes {
            record.insert(name.clone(), value.clone());
        }
        record.insert(CLASS_KEY.into(), AttrValue::String(self.class.name().into()));
        record
    }
}

/// Canonical representation: `[<ClassName>] (<id>) {<attributes>}`.
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {{'id': {}, 'created_at': {}, 'updated_at': {}",
            self.class,
            self.id,
            repr_str(self.id.as_str()),
            self.created_at.structured(),
            self.updated_at.structured(),
        )?;
        for (name, value) in &self.attributes {
            write!(f, ", {}: {}", repr_str(name), repr_value(value))?;
        }
        f.write_str("}")
    }
}

/// Build the composite key for a class and raw id.
pub fn composite_key(class: EntityClass, id: &str) -> String {
    format!("{}.{}", class.name(), id)
}

fn id_from_value(value: AttrValue) -> EntityId {
    match value {
        AttrValue::String(s) => EntityId::from(s),
        other => EntityId::from(other.to_string()),
    }
}

fn timestamp_from_value(field: &str, value: &AttrValue) -> Result<Timestamp, TypeError> {
    match value {
        AttrValue::String(s) => Timestamp::parse(s),
        other => Err(TypeError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected timestamp text, got {other}"),
        }),
    }
}
