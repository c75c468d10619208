//! Reusable custom elements saved from a selection.

use crate::elements::{Element, ElementKind};
use crate::storage::{BoxFuture, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

/// Payload of a custom element: the saved elements, positioned relative to
/// their common top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomElementData {
    /// Always `group`.
    pub kind: ElementKind,
    pub elements: Vec<Element>,
    pub element_count: usize,
}

impl CustomElementData {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            kind: ElementKind::Group,
            element_count: elements.len(),
            elements,
        }
    }
}

/// An entry in a user's element library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomElement {
    /// Empty until the library assigns one.
    #[serde(default)]
    pub element_id: String,
    pub name: String,
    pub element_data: CustomElementData,
    /// Preview image as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Listing filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementFilter {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    pub public_only: bool,
}

impl ElementFilter {
    pub fn matches(&self, element: &CustomElement) -> bool {
        if self.public_only && !element.is_public {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => element.name.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

/// Result of a library listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserElements {
    pub elements: Vec<CustomElement>,
}

/// A store of custom elements.
pub trait ElementLibrary: Send + Sync {
    fn list_user_elements(&self, filter: &ElementFilter) -> BoxFuture<'_, StorageResult<UserElements>>;

    /// Save a new entry. An empty `element_id` is replaced with a fresh one.
    fn create_from_selection(&self, element: &CustomElement) -> BoxFuture<'_, StorageResult<CustomElement>>;

    fn delete_user_element(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// In-memory library, newest entries last.
#[derive(Default)]
pub struct MemoryElementLibrary {
    elements: RwLock<Vec<CustomElement>>,
}

impl MemoryElementLibrary {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl ElementLibrary for MemoryElementLibrary {
    fn list_user_elements(&self, filter: &ElementFilter) -> BoxFuture<'_, StorageResult<UserElements>> {
        let filter = filter.clone();
        Box::pin(async move {
            let elements = self.elements.read().map_err(lock_error)?;
            Ok(UserElements {
                elements: elements.iter().filter(|e| filter.matches(e)).cloned().collect(),
            })
        })
    }

    fn create_from_selection(&self, element: &CustomElement) -> BoxFuture<'_, StorageResult<CustomElement>> {
        let mut element = element.clone();
        Box::pin(async move {
            if element.name.trim().is_empty() {
                return Err(StorageError::Other("Custom element needs a name".to_string()));
            }
            if element.element_id.is_empty() {
                element.element_id = Uuid::new_v4().to_string();
            }
            element.element_data.element_count = element.element_data.elements.len();
            let mut elements = self.elements.write().map_err(lock_error)?;
            elements.retain(|e| e.element_id != element.element_id);
            elements.push(element.clone());
            log::info!("Saved custom element '{}'", element.name);
            Ok(element)
        })
    }

    fn delete_user_element(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut elements = self.elements.write().map_err(lock_error)?;
            let before = elements.len();
            elements.retain(|e| e.element_id != id);
            if elements.len() == before {
                return Err(StorageError::NotFound(id));
            }
            Ok(())
        })
    }
}
