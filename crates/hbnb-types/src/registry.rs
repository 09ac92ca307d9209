use std::collections::BTreeMap;

use crate::class::EntityClass;
use crate::entity::Entity;
use crate::error::TypeError;
use crate::Attributes;

/// Name → class dispatch table.
///
/// Built once at startup and consulted both to validate console targets and
/// to resolve the `__class__` discriminator on reload. Construction always
/// goes through this table; class names are never evaluated.
#[derive(Clone, Debug)]
pub struct ClassRegistry {
    classes: BTreeMap<&'static str, EntityClass>,
}

impl ClassRegistry {
    /// A registry with no classes.
    pub fn empty() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    /// The seven known classes.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for class in EntityClass::ALL {
            registry.register(class);
        }
        registry
    }

    pub fn register(&mut self, class: EntityClass) {
        self.classes.insert(class.name(), class);
    }

    pub fn resolve(&self, name: &str) -> Option<EntityClass> {
        self.classes.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Registered class names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Construct a fresh entity of the named class.
    pub fn construct(&self, name: &str) -> Result<Entity, TypeError> {
        self.require(name).map(Entity::new)
    }

    /// Rebuild an entity of the named class from a serialized mapping.
    pub fn reconstruct(&self, name: &str, record: Attributes) -> Result<Entity, TypeError> {
        let class = self.require(name)?;
        Entity::from_record(class, record)
    }

    fn require(&self, name: &str) -> Result<EntityClass, TypeError> {
        self.resolve(name)
            .ok_or_else(|| TypeError::UnknownClass(name.to_string()))
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
