//! Cache Key Scheme
//!
//! Derives cache keys for entity lookups.

use std::fmt::Display;
use std::str::FromStr;

/// How a lookup's cache key is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScheme {
    /// `"{entity}:{id}"`, shared by every route touching the entity
    #[default]
    Entity,
    /// The request path, one slot per route
    Route,
}

impl KeyScheme {
    /// Key for a lookup of `entity` number `id` reached through `path`.
    pub fn key_for(&self, entity: &str, id: impl Display, path: &str) -> String {
        match self {
            KeyScheme::Entity => entity_key(entity, id),
            KeyScheme::Route => route_key(path),
        }
    }
}

impl FromStr for KeyScheme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "entity" => Ok(Self::Entity),
            "route" => Ok(Self::Route),
            _ => Err(format!("Unknown key scheme: {value}")),
        }
    }
}

/// Stable key for one entity instance.
pub fn entity_key(entity: &str, id: impl Display) -> String {
    format!("{entity}:{id}")
}

/// Key bound to a request path.
pub fn route_key(path: &str) -> String {
    path.to_string()
}

/// Pattern matching every entity key of one type.
pub fn entity_pattern(entity: &str) -> String {
    format!("{entity}:*")
}
