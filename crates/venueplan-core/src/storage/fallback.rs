//! Remote store with a local fallback.

use super::{Layout, LayoutStore, StorageError, StorageResult};

/// Where an operation was answered from.
#[derive(Debug, Clone, PartialEq)]
pub enum Persisted<T> {
    Remote(T),
    /// The remote store failed with `reason`; the local store answered.
    LocalFallback { value: T, reason: String },
}

impl<T> Persisted<T> {
    pub fn value(&self) -> &T {
        match self {
            Persisted::Remote(value) | Persisted::LocalFallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Persisted::Remote(value) | Persisted::LocalFallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Persisted::LocalFallback { .. })
    }
}

/// Routes layout operations to the remote store and, when it fails, to the
/// local one. A failed remote call is never retried.
pub struct LayoutPersistence {
    remote: Box<dyn LayoutStore>,
    local: Box<dyn LayoutStore>,
}

impl LayoutPersistence {
    pub fn new(remote: Box<dyn LayoutStore>, local: Box<dyn LayoutStore>) -> Self {
        Self { remote, local }
    }

    /// Create the layout if it has no id yet, otherwise update it.
    pub async fn save(&self, layout: &Layout) -> StorageResult<Persisted<Layout>> {
        let remote = if layout.is_new() {
            self.remote.create_layout(layout).await
        } else {
            self.remote.update_layout(&layout.id, layout).await
        };

        match remote {
            Ok(saved) => {
                log::info!("Saved layout {} ({})", saved.id, saved.title);
                Ok(Persisted::Remote(saved))
            }
            Err(e) => {
                log::warn!("Remote save of '{}' failed, saving locally: {}", layout.title, e);
                let saved = self.save_local(layout).await.inspect_err(|local| {
                    log::error!("Local save of '{}' failed too: {}", layout.title, local);
                })?;
                Ok(Persisted::LocalFallback {
                    value: saved,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Update a local record with the same event and title, or the same id,
    /// before creating a new one.
    async fn save_local(&self, layout: &Layout) -> StorageResult<Layout> {
        let existing = self.local.list_layouts(&layout.event_id).await?;
        let target = existing
            .iter()
            .find(|l| l.title == layout.title)
            .or_else(|| existing.iter().find(|l| !layout.is_new() && l.id == layout.id));

        match target {
            Some(found) => self.local.update_layout(&found.id, layout).await,
            None => self.local.create_layout(layout).await,
        }
    }

    pub async fn load(&self, id: &str) -> StorageResult<Persisted<Layout>> {
        match self.remote.get_layout(id).await {
            Ok(layout) => Ok(Persisted::Remote(layout)),
            Err(e) => {
                log::warn!("Remote load of {} failed, reading local copy: {}", id, e);
                let layout = self.local.get_layout(id).await.inspect_err(|local| {
                    log::error!("Local load of {} failed too: {}", id, local);
                })?;
                Ok(Persisted::LocalFallback {
                    value: layout,
                    reason: e.to_string(),
                })
            }
        }
    }

    pub async fn list(&self, event_id: &str) -> StorageResult<Persisted<Vec<Layout>>> {
        match self.remote.list_layouts(event_id).await {
            Ok(layouts) => Ok(Persisted::Remote(layouts)),
            Err(e) => {
                log::warn!("Remote listing for event {} failed, listing local copies: {}", event_id, e);
                let layouts = self.local.list_layouts(event_id).await.inspect_err(|local| {
                    log::error!("Local listing for event {} failed too: {}", event_id, local);
                })?;
                Ok(Persisted::LocalFallback {
                    value: layouts,
                    reason: e.to_string(),
                })
            }
        }
    }

    pub async fn delete(&self, id: &str) -> StorageResult<Persisted<()>> {
        match self.remote.delete_layout(id).await {
            Ok(()) => {
                // Drop any stale local copy as well.
                match self.local.delete_layout(id).await {
                    Ok(()) | Err(StorageError::NotFound(_)) => {}
                    Err(e) => log::warn!("Could not remove local copy of {}: {}", id, e),
                }
                Ok(Persisted::Remote(()))
            }
            Err(e) => {
                log::warn!("Remote delete of {} failed, deleting local copy: {}", id, e);
                self.local.delete_layout(id).await.inspect_err(|local| {
                    log::error!("Local delete of {} failed too: {}", id, local);
                })?;
                Ok(Persisted::LocalFallback {
                    value: (),
                    reason: e.to_string(),
                })
            }
        }
    }
}
