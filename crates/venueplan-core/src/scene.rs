//! The ordered element list and page size.

use crate::elements::{Element, ElementId, SerializableColor};
use crate::geometry::union_bounds;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Smallest accepted page dimension.
pub const MIN_PAGE_DIMENSION: f64 = 200.0;
/// Largest accepted page dimension.
pub const MAX_PAGE_DIMENSION: f64 = 3000.0;

/// Page size in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

fn clamp_dimension(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_PAGE_DIMENSION;
    }
    value.clamp(MIN_PAGE_DIMENSION, MAX_PAGE_DIMENSION)
}

impl PageSize {
    /// Create a page size, clamping each dimension into the accepted range.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: clamp_dimension(width),
            height: clamp_dimension(height),
        }
    }

    /// Parse a user-entered dimension.
    ///
    /// Numbers are clamped into range; anything else keeps `current`.
    pub fn parse_dimension(input: &str, current: f64) -> f64 {
        match input.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => clamp_dimension(value),
            _ => current,
        }
    }

    /// Same size with every dimension pulled back into range.
    pub fn clamped(self) -> Self {
        Self::new(self.width, self.height)
    }
}

/// Partial update for a single element. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub color: Option<SerializableColor>,
    pub border_width: Option<f64>,
    pub border_color: Option<SerializableColor>,
    pub opacity: Option<f64>,
    pub text: Option<String>,
    pub label: Option<String>,
    pub font_size: Option<f64>,
}

impl ElementPatch {
    /// Write the set fields into `element`.
    pub fn apply(&self, element: &mut Element) {
        if let Some(x) = self.x {
            element.x = x;
        }
        if let Some(y) = self.y {
            element.y = y;
        }
        if let Some(width) = self.width {
            element.width = width;
        }
        if let Some(height) = self.height {
            element.height = height;
        }
        if let Some(rotation) = self.rotation {
            element.rotation = rotation;
        }
        if let Some(color) = self.color {
            element.color = color;
        }
        if let Some(border_width) = self.border_width {
            element.border_width = border_width.max(0.0);
        }
        if let Some(border_color) = self.border_color {
            element.border_color = Some(border_color);
        }
        if let Some(opacity) = self.opacity {
            element.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(text) = &self.text {
            element.text = Some(text.clone());
        }
        if let Some(label) = &self.label {
            element.label = Some(label.clone());
        }
        if let Some(font_size) = self.font_size {
            element.font_size = Some(font_size);
        }
    }
}

/// Ordered element list. Index 0 is drawn first (back), the last index last
/// (front).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    elements: Vec<Element>,
    pub page_size: PageSize,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(page_size: PageSize) -> Self {
        Self {
            elements: Vec::new(),
            page_size,
        }
    }

    /// Elements back to front.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Z-order position of an element.
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// Elements among `ids`, in scene order.
    pub fn collect(&self, ids: &[ElementId]) -> Vec<&Element> {
        self.elements.iter().filter(|e| ids.contains(&e.id)).collect()
    }

    /// Add an element on top.
    pub fn add(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Add several elements on top, keeping their order.
    pub fn extend(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.elements.extend(elements);
    }

    /// Remove the listed elements, returning them in scene order.
    pub fn remove(&mut self, ids: &[ElementId]) -> Vec<Element> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.elements)
            .into_iter()
            .partition(|e| ids.contains(&e.id));
        self.elements = kept;
        removed
    }

    /// Apply a patch. Returns `false` if the element does not exist.
    pub fn update(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                patch.apply(element);
                true
            }
            None => false,
        }
    }

    /// Replace the whole element list.
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.elements = elements;
    }

    /// Move the listed elements to the front, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &[ElementId]) {
        let (moved, mut rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.elements)
            .into_iter()
            .partition(|e| ids.contains(&e.id));
        rest.extend(moved);
        self.elements = rest;
    }

    /// Move the listed elements to the back, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[ElementId]) {
        let (mut moved, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.elements)
            .into_iter()
            .partition(|e| ids.contains(&e.id));
        moved.extend(rest);
        self.elements = moved;
    }

    /// Swap each listed element with its neighbour in front of it, one id at
    /// a time. Returns how many swaps happened.
    pub fn bring_forward(&mut self, ids: &[ElementId]) -> usize {
        let mut moved = 0;
        for id in ids {
            if let Some(pos) = self.index_of(id) {
                if pos + 1 < self.elements.len() {
                    self.elements.swap(pos, pos + 1);
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Swap each listed element with its neighbour behind it, one id at a
    /// time. Returns how many swaps happened.
    pub fn send_backward(&mut self, ids: &[ElementId]) -> usize {
        let mut moved = 0;
        for id in ids {
            if let Some(pos) = self.index_of(id) {
                if pos > 0 {
                    self.elements.swap(pos, pos - 1);
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Union of every element's visual bounds.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(&self.elements)
    }
}
