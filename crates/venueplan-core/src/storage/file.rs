//! JSON-file layout store.

use super::{BoxFuture, Layout, LayoutStore, StorageError, StorageResult, sort_recent_first};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stores each layout as `<id>.json` in a directory.
pub struct FileLayoutStore {
    base_path: PathBuf,
}

impl FileLayoutStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {}", e)))?;
        }
        Ok(Self { base_path })
    }

    /// Store in the platform data directory, e.g. `~/.local/share/venueplan/layouts`.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("venueplan").join("layouts"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn layout_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", encode_file_stem(id)))
    }

    fn read(path: &Path, id: &str) -> StorageResult<Layout> {
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let json = fs::read_to_string(path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Layout::from_json(&json)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn write(path: &Path, layout: &Layout) -> StorageResult<()> {
        let json = layout
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(path, json).map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }
}

/// Percent-encode every byte outside `[A-Za-z0-9_-]` so distinct ids never
/// share a file name.
fn encode_file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

impl LayoutStore for FileLayoutStore {
    fn list_layouts(&self, event_id: &str) -> BoxFuture<'_, StorageResult<Vec<Layout>>> {
        let event_id = event_id.to_string();
        Box::pin(async move {
            let entries = fs::read_dir(&self.base_path)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut layouts = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e != "json").unwrap_or(true) {
                    continue;
                }
                match Self::read(&path, "") {
                    Ok(layout) if layout.event_id == event_id => layouts.push(layout),
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable layout file {}: {}", path.display(), e),
                }
            }
            sort_recent_first(&mut layouts);
            Ok(layouts)
        })
    }

    fn get_layout(&self, id: &str) -> BoxFuture<'_, StorageResult<Layout>> {
        let path = self.layout_path(id);
        let id = id.to_string();
        Box::pin(async move { Self::read(&path, &id) })
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
            Self::write(&self.layout_path(&layout.id), &layout)?;
            Ok(layout)
        })
    }

    fn update_layout(&self, id: &str, layout: &Layout) -> BoxFuture<'_, StorageResult<Layout>> {
        let path = self.layout_path(id);
        let id = id.to_string();
        let mut layout = layout.clone();
        Box::pin(async move {
            let existing = Self::read(&path, &id)?;
            layout.id = id;
            layout.created_at = existing.created_at;
            layout.updated_at = Utc::now();
            Self::write(&path, &layout)?;
            Ok(layout)
        })
    }

    fn delete_layout(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.layout_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, ElementKind};
    use crate::scene::PageSize;
    use crate::storage::block_on;
    use tempfile::tempdir;

    fn layout(title: &str, event: &str) -> Layout {
        let element = Element::new("stage".into(), ElementKind::Rectangle, 10.0, 10.0, 300.0, 80.0).with_text("Stage");
        Layout::new(title, event, vec![element], PageSize::new(1600.0, 900.0))
    }

    #[test]
    fn test_create_and_get() {
        let dir = tempdir().unwrap();
        let store = FileLayoutStore::new(dir.path().to_path_buf()).unwrap();

        let created = block_on(store.create_layout(&layout("Hall", "e1"))).unwrap();
        let loaded = block_on(store.get_layout(&created.id)).unwrap();
        assert_eq!(loaded.title, "Hall");
        assert_eq!(loaded.page_size, PageSize::new(1600.0, 900.0));
        assert_eq!(loaded.elements[0].text.as_deref(), Some("Stage"));
    }

    #[test]
    fn test_not_found() {
        let dir = tempdir().unwrap();
        let store = FileLayoutStore::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(block_on(store.get_layout("missing")), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_list_skips_other_events_and_junk() {
        let dir = tempdir().unwrap();
        let store = FileLayoutStore::new(dir.path().to_path_buf()).unwrap();
        block_on(store.create_layout(&layout("A", "e1"))).unwrap();
        block_on(store.create_layout(&layout("B", "e2"))).unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let listed = block_on(store.list_layouts("e1")).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "A");
    }

    #[test]
    fn test_update_and_delete() {
        let dir = tempdir().unwrap();
        let store = FileLayoutStore::new(dir.path().to_path_buf()).unwrap();
        let created = block_on(store.create_layout(&layout("A", "e1"))).unwrap();

        let mut changed = created.clone();
        changed.elements.clear();
        let updated = block_on(store.update_layout(&created.id, &changed)).unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(block_on(store.get_layout(&created.id)).unwrap().elements.is_empty());

        block_on(store.delete_layout(&created.id)).unwrap();
        assert!(matches!(block_on(store.get_layout(&created.id)), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_sanitizes_id() {
        let dir = tempdir().unwrap();
        let store = FileLayoutStore::new(dir.path().to_path_buf()).unwrap();
        let mut odd = layout("A", "e1");
        odd.id = "hall/1:main".to_string();
        block_on(store.create_layout(&odd)).unwrap();
        assert!(dir.path().join("hall%2F1%3Amain.json").exists());
        assert_eq!(block_on(store.get_layout("hall/1:main")).unwrap().id, "hall/1:main");
    }

    #[test]
    fn test_similar_ids_get_separate_files() {
        let dir = tempdir().unwrap();
        let store = FileLayoutStore::new(dir.path().to_path_buf()).unwrap();
        let mut slash = layout("Slash", "e1");
        slash.id = "a/b".to_string();
        let mut underscore = layout("Underscore", "e1");
        underscore.id = "a_b".to_string();
        block_on(store.create_layout(&slash)).unwrap();
        block_on(store.create_layout(&underscore)).unwrap();

        assert_eq!(block_on(store.get_layout("a/b")).unwrap().title, "Slash");
        assert_eq!(block_on(store.get_layout("a_b")).unwrap().title, "Underscore");
        assert_eq!(block_on(store.list_layouts("e1")).unwrap().len(), 2);
    }
}
