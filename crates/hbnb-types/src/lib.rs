//! Foundation types for the HBnB console.
//!
//! This crate provides the identity, temporal, and structural types shared by
//! the store and the console. Every other HBnB crate depends on `hbnb-types`.
//!
//! # Key Types
//!
//! - [`EntityId`]: Globally unique entity identifier (UUID v4 text)
//! - [`Timestamp`]: Microsecond-precision creation/update time
//! - [`EntityClass`]: One of the seven known domain classes
//! - [`ClassRegistry`]: Name → class dispatch table used for validation and reload
//! - [`Entity`]: A domain object with identity, timestamps, and attributes

pub mod class;
pub mod entity;
pub mod error;
pub mod identity;
pub mod registry;
pub mod repr;
pub mod temporal;

pub use class::{EntityClass, FieldKind, FieldSpec};
pub use entity::{composite_key, Entity, CLASS_KEY};
pub use error::TypeError;
pub use identity::EntityId;
pub use registry::ClassRegistry;
pub use temporal::{Timestamp, TIMESTAMP_FORMAT};

/// Attribute values carried by entities. Literal, JSON-compatible data only.
pub type AttrValue = serde_json::Value;

/// Insertion-ordered attribute mapping.
pub type Attributes = serde_json::Map<String, AttrValue>;
