//! Layout persistence.

mod fallback;
mod file;
mod memory;

pub use fallback::{LayoutPersistence, Persisted};
pub use file::FileLayoutStore;
pub use memory::MemoryLayoutStore;

use crate::elements::Element;
use crate::scene::PageSize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("Layout not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Remote store error: {0}")]
    Remote(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A saved arrangement of elements for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Empty until a store assigns one.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub event_id: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub page_size: PageSize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Layout {
    /// Create an unsaved layout.
    pub fn new(title: impl Into<String>, event_id: impl Into<String>, elements: Vec<Element>, page_size: PageSize) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            title: title.into(),
            event_id: event_id.into(),
            elements,
            page_size,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether no store has assigned an id yet.
    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A backend holding layouts: the remote API, or a local fallback.
pub trait LayoutStore: Send + Sync {
    /// Layouts of one event, most recently updated first.
    fn list_layouts(&self, event_id: &str) -> BoxFuture<'_, StorageResult<Vec<Layout>>>;

    fn get_layout(&self, id: &str) -> BoxFuture<'_, StorageResult<Layout>>;

    /// Store a new layout. An empty id is replaced with a fresh one.
    fn create_layout(&self, layout: &Layout) -> BoxFuture<'_, StorageResult<Layout>>;

    /// Overwrite an existing layout, keeping its creation time.
    fn update_layout(&self, id: &str, layout: &Layout) -> BoxFuture<'_, StorageResult<Layout>>;

    fn delete_layout(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;
}

fn sort_recent_first(layouts: &mut [Layout]) {
    layouts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
