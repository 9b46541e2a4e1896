//! Hierarchical entity paths that logged entries are stored under.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A path such as `observation/image`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EntityPath(Vec<String>);

impl EntityPath {
    pub fn new(parts: Vec<String>) -> Self {
        Self(parts)
    }

    /// Derive a path from a dataset column name.
    ///
    /// Dots and slashes both separate levels, so `observation.image`
    /// becomes `observation/image`. Empty segments are dropped.
    pub fn from_column(name: &str) -> Self {
        Self(
            name.split(['.', '/'])
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        write!(f, "{}", self.0.join("/"))
    }
}

impl From<String> for EntityPath {
    fn from(value: String) -> Self {
        Self::from_column(&value)
    }
}

impl From<&str> for EntityPath {
    fn from(value: &str) -> Self {
        Self::from_column(value)
    }
}

impl From<EntityPath> for String {
    fn from(value: EntityPath) -> Self {
        value.to_string()
    }
}
