//! In-memory layout store.

use super::{BoxFuture, Layout, LayoutStore, StorageError, StorageResult, sort_recent_first};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryLayoutStore {
    layouts: RwLock<HashMap<String, Layout>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored layouts.
    pub fn len(&self) -> usize {
        self.layouts.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl LayoutStore for MemoryLayoutStore {
    fn list_layouts(&self, event_id: &str) -> BoxFuture<'_, StorageResult<Vec<Layout>>> {
        let event_id = event_id.to_string();
        Box::pin(async move {
            let layouts = self.layouts.read().map_err(lock_error)?;
            let mut found: Vec<Layout> = layouts
                .values()
                .filter(|l| l.event_id == event_id)
                .cloned()
                .collect();
            sort_recent_first(&mut found);
            Ok(found)
        })
    }

    fn get_layout(&self, id: &str) -> BoxFuture<'_, StorageResult<Layout>> {
        let id = id.to_string();
        Box::pin(async move {
            let layouts = self.layouts.read().map_err(lock_error)?;
            layouts.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn create_layout(&self, layout: &Layout) -> BoxFuture<'_, StorageResult<Layout>> {
        let mut layout = layout.clone();
        Box::pin(async move {
            if layout.id.is_empty() {
                layout.id = Uuid::new_v4().to_string();
            }
            let now = Utc::now();
            layout.created_at = now;
            layout.updated_at = now;

            let mut layouts = self.layouts.write().map_err(lock_error)?;
            layouts.insert(layout.id.clone(), layout.clone());
            Ok(layout)
        })
    }

    fn update_layout(&self, id: &str, layout: &Layout) -> BoxFuture<'_, StorageResult<Layout>> {
        let id = id.to_string();
        let mut layout = layout.clone();
        Box::pin(async move {
            let mut layouts = self.layouts.write().map_err(lock_error)?;
            let existing = layouts.get(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            layout.created_at = existing.created_at;
            layout.updated_at = Utc::now();
            layout.id = id.clone();
            layouts.insert(id, layout.clone());
            Ok(layout)
        })
    }

    fn delete_layout(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut layouts = self.layouts.write().map_err(lock_error)?;
            layouts.remove(&id).map(|_| ()).ok_or(StorageError::NotFound(id))
        })
    }
}
