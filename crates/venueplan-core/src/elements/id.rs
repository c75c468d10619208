//! Element identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of an element within a scene.
///
/// Older layouts stored numeric ids; those are read back as their decimal
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "RawId")]
pub struct ElementId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<RawId> for ElementId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => Self(s),
            RawId::Integer(n) => Self(n.to_string()),
            RawId::Float(f) => Self(f.to_string()),
        }
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Source of fresh element ids and render-cache keys.
///
/// Every operation that materialises a new element (paste, duplicate,
/// ungroup, unmerge, group/merge containers, library placement) draws from
/// one generator so tests can inject a deterministic one.
pub trait IdGenerator: fmt::Debug + Send {
    /// Mint a new element id, e.g. `group-…` or `element-…`.
    fn new_id(&mut self, prefix: &str) -> ElementId;

    /// Mint a new render-cache key.
    fn new_instance_id(&mut self) -> String;
}

/// Random v4 UUID ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&mut self, prefix: &str) -> ElementId {
        ElementId(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    fn new_instance_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Monotonic counter ids, reproducible across runs.
#[derive(Debug, Default, Clone)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting at `start`.
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    fn bump(&mut self) -> u64 {
        let n = self.next;
        self.next += 1;
        n
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&mut self, prefix: &str) -> ElementId {
        let n = self.bump();
        ElementId(format!("{}-{}", prefix, n))
    }

    fn new_instance_id(&mut self) -> String {
        format!("instance-{}", self.bump())
    }
}
