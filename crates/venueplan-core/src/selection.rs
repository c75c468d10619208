//! Selection state machine.

use crate::elements::{Element, ElementId, SerializableColor};
use crate::geometry::union_bounds;
use crate::scene::Scene;
use kurbo::Rect;

/// Padding around a multi-selection's bounding box.
pub const DEFAULT_SELECTION_PADDING: f64 = 10.0;

/// What is currently selected.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(ElementId),
    /// Two or more elements, with the padded box enclosing them.
    Multi { ids: Vec<ElementId>, bounds: Rect },
}

impl Selection {
    /// Selected ids in selection order.
    pub fn ids(&self) -> Vec<ElementId> {
        match self {
            Selection::None => Vec::new(),
            Selection::Single(id) => vec![id.clone()],
            Selection::Multi { ids, .. } => ids.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::None => 0,
            Selection::Single(_) => 1,
            Selection::Multi { ids, .. } => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(selected) => selected == id,
            Selection::Multi { ids, .. } => ids.contains(id),
        }
    }

    /// The single selected id, if exactly one element is selected.
    pub fn single(&self) -> Option<&ElementId> {
        match self {
            Selection::Single(id) => Some(id),
            _ => None,
        }
    }

    /// Temporary group box, present only for multi-selections.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Selection::Multi { bounds, .. } => Some(*bounds),
            _ => None,
        }
    }
}

/// Style of the single selected element, mirrored into the style controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStyleSnapshot {
    pub color: SerializableColor,
    pub border_width: f64,
    pub border_color: Option<SerializableColor>,
    pub opacity: f64,
}

impl SelectionStyleSnapshot {
    pub fn of(element: &Element) -> Self {
        Self {
            color: element.color,
            border_width: element.border_width,
            border_color: element.border_color,
            opacity: element.opacity,
        }
    }
}

/// Owns the selection and derives the style snapshot and multi bounds from
/// every transition.
#[derive(Debug, Clone)]
pub struct SelectionManager {
    selection: Selection,
    style: Option<SelectionStyleSnapshot>,
    padding: f64,
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTION_PADDING)
    }
}

impl SelectionManager {
    pub fn new(padding: f64) -> Self {
        Self {
            selection: Selection::None,
            style: None,
            padding,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn style(&self) -> Option<&SelectionStyleSnapshot> {
        self.style.as_ref()
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.selection.ids()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.selection.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Plain select: replaces whatever was selected.
    pub fn select(&mut self, id: ElementId, scene: &Scene) {
        log::debug!("Select {}", id);
        self.style = scene.get(&id).map(SelectionStyleSnapshot::of);
        self.selection = Selection::Single(id);
    }

    /// Modifier select: adds `id`, or removes it if already selected.
    pub fn toggle(&mut self, id: ElementId, scene: &Scene) {
        let next: Vec<ElementId> = match &self.selection {
            Selection::None => vec![id],
            Selection::Single(current) if *current == id => Vec::new(),
            Selection::Single(current) => vec![current.clone(), id],
            Selection::Multi { ids, .. } => {
                let mut ids = ids.clone();
                match ids.iter().position(|existing| *existing == id) {
                    Some(pos) => {
                        ids.remove(pos);
                    }
                    None => ids.push(id),
                }
                ids
            }
        };
        log::debug!("Toggle selection, now {} selected", next.len());
        self.set_ids(next, scene);
    }

    /// Select exactly `ids`, choosing the state from how many there are.
    pub fn select_many(&mut self, ids: Vec<ElementId>, scene: &Scene) {
        let mut unique: Vec<ElementId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        self.set_ids(unique, scene);
    }

    /// Clear the selection and the style snapshot.
    pub fn deselect(&mut self) {
        if !self.selection.is_empty() {
            log::debug!("Deselect");
        }
        self.selection = Selection::None;
        self.style = None;
    }

    /// Drop ids that no longer exist (or were removed explicitly).
    pub fn remove_ids(&mut self, removed: &[ElementId], scene: &Scene) {
        if !self.selection.ids().iter().any(|id| removed.contains(id)) {
            return;
        }
        let remaining = self
            .selection
            .ids()
            .into_iter()
            .filter(|id| !removed.contains(id))
            .collect();
        self.set_ids(remaining, scene);
    }

    /// Recompute the multi-selection box from current member positions.
    pub fn refresh_bounds(&mut self, scene: &Scene) {
        if let Selection::Multi { ids, bounds } = &mut self.selection {
            *bounds = padded_bounds(scene, ids, self.padding);
        }
    }

    /// Re-read the style snapshot of the single selected element.
    pub fn refresh_style(&mut self, scene: &Scene) {
        if let Selection::Single(id) = &self.selection {
            self.style = scene.get(id).map(SelectionStyleSnapshot::of);
        }
    }

    fn set_ids(&mut self, mut ids: Vec<ElementId>, scene: &Scene) {
        match ids.len() {
            0 => self.deselect(),
            1 => {
                let id = ids.remove(0);
                self.select(id, scene);
            }
            _ => {
                let bounds = padded_bounds(scene, &ids, self.padding);
                self.selection = Selection::Multi { ids, bounds };
                self.style = None;
            }
        }
    }
}

fn padded_bounds(scene: &Scene, ids: &[ElementId], padding: f64) -> Rect {
    union_bounds(scene.collect(ids))
        .map(|bounds| bounds.inflate(padding, padding))
        .unwrap_or(Rect::ZERO)
}
