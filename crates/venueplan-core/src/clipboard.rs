//! Cut/copy/paste buffer.

use crate::elements::{Element, IdGenerator};
use kurbo::Vec2;

/// Default distance pasted copies move from their source.
pub const DEFAULT_PASTE_OFFSET: f64 = 20.0;

/// How the clipboard was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    /// Reusable across pastes.
    Copy,
    /// Emptied by the first paste.
    Cut,
}

/// Snapshot of elements waiting to be pasted.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    contents: Option<(Vec<Element>, ClipboardMode)>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_none()
    }

    pub fn mode(&self) -> Option<ClipboardMode> {
        self.contents.as_ref().map(|(_, mode)| *mode)
    }

    /// Elements currently held.
    pub fn elements(&self) -> &[Element] {
        self.contents.as_ref().map(|(e, _)| e.as_slice()).unwrap_or(&[])
    }

    /// Replace the contents. An empty list clears the clipboard.
    pub fn store(&mut self, elements: Vec<Element>, mode: ClipboardMode) {
        self.contents = if elements.is_empty() {
            None
        } else {
            Some((elements, mode))
        };
    }

    pub fn clear(&mut self) {
        self.contents = None;
    }

    /// Fresh-identity copies shifted by `offset`. A cut clipboard is emptied.
    pub fn paste(&mut self, id_gen: &mut dyn IdGenerator, offset: f64) -> Vec<Element> {
        let Some((elements, mode)) = self.contents.as_ref() else {
            return Vec::new();
        };
        let delta = Vec2::new(offset, offset);
        let pasted = elements
            .iter()
            .map(|element| {
                let mut copy = element.clone_with_fresh_identity(id_gen);
                copy.translate(delta);
                copy
            })
            .collect();
        if *mode == ClipboardMode::Cut {
            self.contents = None;
        }
        pasted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementKind, SequentialIdGenerator};

    fn sample() -> Vec<Element> {
        vec![Element::new("a".into(), ElementKind::Rectangle, 10.0, 10.0, 20.0, 20.0)]
    }

    #[test]
    fn test_copy_is_reusable() {
        let mut clipboard = Clipboard::new();
        let mut ids = SequentialIdGenerator::new();
        clipboard.store(sample(), ClipboardMode::Copy);

        let first = clipboard.paste(&mut ids, DEFAULT_PASTE_OFFSET);
        let second = clipboard.paste(&mut ids, DEFAULT_PASTE_OFFSET);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0].id, second[0].id);
        assert_eq!(first[0].position(), kurbo::Point::new(30.0, 30.0));
        assert!(!clipboard.is_empty());
    }

    #[test]
    fn test_cut_is_single_use() {
        let mut clipboard = Clipboard::new();
        let mut ids = SequentialIdGenerator::new();
        clipboard.store(sample(), ClipboardMode::Cut);

        let pasted = clipboard.paste(&mut ids, DEFAULT_PASTE_OFFSET);
        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0].id.as_str(), "a");
        assert!(clipboard.is_empty());
        assert!(clipboard.paste(&mut ids, DEFAULT_PASTE_OFFSET).is_empty());
    }

    #[test]
    fn test_storing_nothing_clears() {
        let mut clipboard = Clipboard::new();
        clipboard.store(sample(), ClipboardMode::Copy);
        clipboard.store(Vec::new(), ClipboardMode::Copy);
        assert!(clipboard.is_empty());
        assert_eq!(clipboard.mode(), None);
    }
}
