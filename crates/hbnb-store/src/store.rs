use std::collections::HashMap;

use hbnb_types::{AttrValue, Attributes, ClassRegistry, Entity, EntityClass, CLASS_KEY};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::StorageBackend;

/// In-memory registry of live entities, durable through a [`StorageBackend`].
///
/// Entities are keyed by `<ClassName>.<id>` and iterate in insertion order.
/// The store owns every entity for its whole lifetime; callers borrow them
/// for the duration of one command.
pub struct ObjectStore<B> {
    backend: B,
    registry: ClassRegistry,
    objects: HashMap<String, Entity>,
    order: Vec<String>,
}

impl<B: StorageBackend> ObjectStore<B> {
    /// Create an empty store over `backend`. Nothing is read yet.
    pub fn new(backend: B, registry: ClassRegistry) -> Self {
        Self {
            backend,
            registry,
            objects: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a store and load whatever the backend holds.
    pub fn open(backend: B, registry: ClassRegistry) -> StoreResult<Self> {
        let mut store = Self::new(backend, registry);
        store.load()?;
        Ok(store)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// Every live entity with its key, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = (&str, &Entity)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.objects.get(key).map(|e| (key.as_str(), e)))
    }

    /// Live entities of one class, in insertion order.
    pub fn all_of(&self, class: EntityClass) -> impl Iterator<Item = &Entity> + '_ {
        self.all()
            .map(|(_, e)| e)
            .filter(move |e| e.class() == class)
    }

    pub fn count_class(&self, class: EntityClass) -> usize {
        self.all_of(class).count()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
        self.objects.get_mut(key)
    }

    /// Insert `entity` under `<ClassName>.<id>` and return the key.
    ///
    /// An existing entry under the same key is overwritten in place and keeps
    /// its position.
    pub fn register(&mut self, entity: Entity) -> String {
        let key = entity.key();
        if self.objects.insert(key.clone(), entity).is_none() {
            self.order.push(key.clone());
        }
        key
    }

    /// Construct a fresh entity of `class` and register it.
    pub fn create(&mut self, class: EntityClass) -> &Entity {
        let key = self.register(Entity::new(class));
        debug!(%key, "entity created");
        &self.objects[&key]
    }

    /// Remove the entity under `key` from memory. Does not persist.
    pub fn remove(&mut self, key: &str) -> Option<Entity> {
        let removed = self.objects.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Refresh the entity's `updated_at` and persist the whole store.
    ///
    /// Returns `Ok(false)` without writing if `key` is not registered.
    pub fn save(&mut self, key: &str) -> StoreResult<bool> {
        match self.objects.get_mut(key) {
            Some(entity) => entity.touch(),
            None => return Ok(false),
        }
        self.persist()?;
        Ok(true)
    }

    /// Serialize every entity and rewrite the backend.
    pub fn persist(&self) -> StoreResult<()> {
        let mut document = Attributes::new();
        for (key, entity) in self.all() {
            document.insert(key.to_string(), AttrValue::Object(entity.to_record()));
        }
        let text = serde_json::to_string(&document)?;
        self.backend.write_snapshot(&text)?;
        debug!(
            backend = %self.backend.describe(),
            entities = document.len(),
            "store persisted"
        );
        Ok(())
    }

    /// Reconstruct and register every record the backend holds.
    ///
    /// A backend that was never written is a no-op. Returns the number of
    /// entities loaded.
    pub fn load(&mut self) -> StoreResult<usize> {
        let Some(text) = self.backend.read_snapshot()? else {
            return Ok(0);
        };
        let document: Attributes = serde_json::from_str(&text)?;
        let mut loaded = 0;
        for (key, value) in document {
            let entity = self.rebuild(&key, value)?;
            self.register(entity);
            loaded += 1;
        }
        info!(source = %self.backend.describe(), entities = loaded, "store loaded");
        Ok(loaded)
    }

    fn rebuild(&self, key: &str, value: AttrValue) -> StoreResult<Entity> {
        let AttrValue::Object(record) = value else {
            return Err(StoreError::MalformedRecord {
                key: key.to_string(),
                reason: "record is not an object".into(),
            });
        };
        let class_name = match record.get(CLASS_KEY) {
            Some(AttrValue::String(name)) => name.clone(),
            _ => {
                return Err(StoreError::MalformedRecord {
                    key: key.to_string(),
                    reason: format!("missing {CLASS_KEY} field"),
                })
            }
        };
        if !self.registry.contains(&class_name) {
            return Err(StoreError::UnknownClass {
                key: key.to_string(),
                class: class_name,
            });
        }
        self.registry
            .reconstruct(&class_name, record)
            .map_err(|source| StoreError::InvalidRecord {
                key: key.to_string(),
                source,
            })
    }
}

impl<B: StorageBackend> std::fmt::Debug for ObjectStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("backend", &self.backend.describe())
            .field("entity_count", &self.len())
            .finish()
    }
}
