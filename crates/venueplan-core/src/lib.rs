//! VenuePlan Core Library
//!
//! Renderer-agnostic scene editing for the venue layout designer: elements,
//! selection, grid snapping, grouping, duplication and layout persistence.

pub mod clipboard;
pub mod config;
pub mod duplicate;
pub mod editor;
pub mod elements;
pub mod error;
pub mod geometry;
pub mod grouping;
pub mod library;
pub mod render;
pub mod scene;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod transform;

pub use clipboard::{Clipboard, ClipboardMode};
pub use config::{ConfigError, EditorConfig};
pub use duplicate::{Direction, DuplicateParams, sequence_labels};
pub use editor::{Editor, StylePatch};
pub use elements::{Element, ElementId, ElementKind, IdGenerator, SerializableColor, SequentialIdGenerator, UuidIdGenerator};
pub use error::{EditError, EditResult};
pub use geometry::FontRange;
pub use library::{CustomElement, CustomElementData, ElementFilter, ElementLibrary, MemoryElementLibrary};
pub use render::{Gesture, GestureFeedback, RenderPrimitive};
pub use scene::{ElementPatch, PageSize, Scene};
pub use selection::{Selection, SelectionStyleSnapshot};
pub use snap::{GridConfig, SnapGuide, SnapResult};
pub use storage::{FileLayoutStore, Layout, LayoutPersistence, LayoutStore, MemoryLayoutStore, Persisted, StorageError};
