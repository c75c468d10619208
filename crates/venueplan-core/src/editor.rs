//! The editing session: scene, selection, clipboard and in-flight gestures.

use crate::clipboard::{Clipboard, ClipboardMode};
use crate::config::EditorConfig;
use crate::duplicate::{DuplicateParams, duplicate_elements};
use crate::elements::{Element, ElementId, ElementKind, IdGenerator, SerializableColor, UuidIdGenerator};
use crate::error::{EditError, EditResult};
use crate::geometry::{optimal_font_size, union_bounds};
use crate::grouping::{group_elements, merge_elements, ungroup_element, unmerge_element, unwrap_singleton};
use crate::library::{CustomElement, CustomElementData};
use crate::render::{Gesture, GestureFeedback, RenderPrimitive, flatten};
use crate::scene::{ElementPatch, PageSize, Scene};
use crate::selection::{Selection, SelectionManager, SelectionStyleSnapshot};
use crate::snap::SnapGuide;
use crate::storage::Layout;
use crate::transform::{DragSession, resize_element};
use kurbo::{Point, Vec2};

/// Style edit applied from the style controls.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StylePatch {
    pub color: Option<SerializableColor>,
    pub border_width: Option<f64>,
    pub border_color: Option<SerializableColor>,
    pub opacity: Option<f64>,
}

impl StylePatch {
    fn apply(&self, element: &mut Element) {
        if let Some(color) = self.color {
            element.color = color;
        }
        if let Some(width) = self.border_width {
            element.border_width = width.max(0.0);
        }
        if let Some(color) = self.border_color {
            element.border_color = Some(color);
        }
        if let Some(opacity) = self.opacity {
            element.opacity = opacity.clamp(0.0, 1.0);
        }
    }
}

/// One layout being edited.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    selection: SelectionManager,
    clipboard: Clipboard,
    ids: Box<dyn IdGenerator>,
    drag: Option<DragSession>,
    editing: Option<ElementId>,
    /// Id of the stored layout this scene was loaded from or saved as.
    layout_id: String,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_id_generator(config, Box::new(UuidIdGenerator))
    }

    /// Create an editor that mints ids from `ids`.
    pub fn with_id_generator(config: EditorConfig, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            scene: Scene::new(config.page_size.clamped()),
            selection: SelectionManager::new(config.selection_padding),
            clipboard: Clipboard::new(),
            ids,
            drag: None,
            editing: None,
            layout_id: String::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    /// Style of the single selected element.
    pub fn selection_style(&self) -> Option<&SelectionStyleSnapshot> {
        self.selection.style()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Element whose text is being edited.
    pub fn editing(&self) -> Option<&ElementId> {
        self.editing.as_ref()
    }

    pub fn set_snapping(&mut self, enabled: bool) {
        self.config.grid.enabled = enabled;
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.scene.page_size = page_size.clamped();
    }

    /// Apply raw page-size input. Unparseable input keeps the current value.
    pub fn set_page_size_from_input(&mut self, width: &str, height: &str) -> PageSize {
        let current = self.scene.page_size;
        self.scene.page_size = PageSize::new(
            PageSize::parse_dimension(width, current.width),
            PageSize::parse_dimension(height, current.height),
        );
        self.scene.page_size
    }

    // --- Scene CRUD ---

    /// Add an element on top. A missing or clashing id is replaced.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        let clashes = element.all_ids().iter().any(|id| id.as_str().is_empty() || self.scene.contains(id));
        if clashes {
            element = element.clone_with_fresh_identity(self.ids.as_mut());
        } else if element.instance_id.is_empty() {
            element.instance_id = self.ids.new_instance_id();
        }
        let id = element.id.clone();
        log::debug!("Add {} {}", element.kind, id);
        self.scene.add(element);
        id
    }

    /// Create a default-styled element and add it.
    pub fn create_element(&mut self, kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> ElementId {
        let element = Element::create(self.ids.as_mut(), kind, x, y, width, height);
        self.add_element(element)
    }

    /// Remove elements, dropping them from the selection and ending any
    /// text edit or drag that involved them.
    pub fn remove_elements(&mut self, ids: &[ElementId]) -> Vec<Element> {
        let removed = self.scene.remove(ids);
        if removed.is_empty() {
            return removed;
        }
        let removed_ids: Vec<ElementId> = removed.iter().map(|e| e.id.clone()).collect();
        self.selection.remove_ids(&removed_ids, &self.scene);
        if self.editing.as_ref().is_some_and(|id| removed_ids.contains(id)) {
            self.editing = None;
        }
        if self
            .drag
            .as_ref()
            .is_some_and(|drag| drag.ids().iter().any(|id| removed_ids.contains(id)))
        {
            self.drag = None;
        }
        log::info!("Removed {} element(s)", removed.len());
        removed
    }

    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) -> EditResult<()> {
        if !self.scene.update(id, patch) {
            return Err(EditError::UnknownElement(id.clone()));
        }
        self.selection.refresh_style(&self.scene);
        Ok(())
    }

    /// Replace every element, e.g. after an external import.
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.scene.replace_all(elements);
        self.reset_transient_state();
    }

    pub fn delete_selected(&mut self) -> EditResult<usize> {
        let ids = self.require_selection("delete")?;
        Ok(self.remove_elements(&ids).len())
    }

    // --- Selection ---

    pub fn select(&mut self, id: ElementId) -> EditResult<()> {
        self.require_element(&id)?;
        self.selection.select(id, &self.scene);
        Ok(())
    }

    /// Modifier-select.
    pub fn toggle_selection(&mut self, id: ElementId) -> EditResult<()> {
        self.require_element(&id)?;
        self.selection.toggle(id, &self.scene);
        Ok(())
    }

    pub fn select_all(&mut self) {
        let ids = self.scene.elements().iter().map(|e| e.id.clone()).collect();
        self.selection.select_many(ids, &self.scene);
    }

    pub fn deselect(&mut self) {
        self.selection.deselect();
        self.editing = None;
    }

    // --- Transform ---

    /// Start dragging `id`. Dragging a member of a multi-selection drags the
    /// whole selection; dragging anything else selects it first.
    pub fn begin_drag(&mut self, id: ElementId) -> EditResult<()> {
        self.require_element(&id)?;
        if !self.selection.contains(&id) {
            self.selection.select(id.clone(), &self.scene);
        }
        let members = self.selection.ids();
        self.selection.refresh_bounds(&self.scene);
        self.drag = DragSession::begin(&self.scene, id.clone(), &members);
        log::debug!("Drag start on {} with {} member(s)", id, members.len());
        Ok(())
    }

    /// Live drag. Moves without snapping and returns guides to show.
    pub fn drag_to(&mut self, id: &ElementId, position: Point) -> Vec<SnapGuide> {
        match &self.drag {
            Some(drag) if drag.anchor == *id => {
                drag.apply(&mut self.scene, position);
                self.config.grid.guides(position)
            }
            _ => Vec::new(),
        }
    }

    /// Finish a drag, snapping the committed position to the grid.
    ///
    /// A drag end without a matching start moves only the reported element.
    pub fn end_drag(&mut self, id: &ElementId, position: Point) -> EditResult<Point> {
        let drag = match self.drag.take() {
            Some(drag) if drag.anchor == *id => drag,
            _ => {
                self.require_element(id)?;
                DragSession::begin(&self.scene, id.clone(), std::slice::from_ref(id))
                    .ok_or_else(|| EditError::UnknownElement(id.clone()))?
            }
        };
        let committed = drag.finish(&mut self.scene, position, &self.config.grid);
        self.selection.refresh_bounds(&self.scene);
        log::debug!("Drag end on {} at ({}, {})", id, committed.x, committed.y);
        Ok(committed)
    }

    /// Apply a finished resize gesture.
    pub fn resize(&mut self, id: &ElementId, scale_x: f64, scale_y: f64, position: Point, rotation: f64) -> EditResult<()> {
        let options = self.config.resize_options();
        let element = self
            .scene
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownElement(id.clone()))?;
        element.set_position(position);
        element.rotation = rotation;
        resize_element(element, scale_x, scale_y, &options);
        log::debug!("Resized {} by ({:.3}, {:.3})", id, scale_x, scale_y);
        self.selection.refresh_bounds(&self.scene);
        Ok(())
    }

    // --- Grouping ---

    pub fn group_selected(&mut self) -> EditResult<ElementId> {
        let ids = self.selection.ids();
        let group_id = group_elements(&mut self.scene, &ids, self.ids.as_mut()).inspect_err(|e| {
            log::warn!("Group ignored: {}", e);
        })?;
        self.selection.select(group_id.clone(), &self.scene);
        Ok(group_id)
    }

    /// Dissolve every selected group. Clears the selection.
    pub fn ungroup_selected(&mut self) -> EditResult<Vec<ElementId>> {
        let groups = self.selected_of_kind(ElementKind::Group, "ungroup")?;
        let mut restored = Vec::new();
        for id in &groups {
            restored.extend(ungroup_element(&mut self.scene, id, self.ids.as_mut())?);
        }
        self.selection.deselect();
        Ok(restored)
    }

    pub fn merge_selected(&mut self) -> EditResult<ElementId> {
        let ids = self.selection.ids();
        let font_range = self.config.font_range();
        let merged_id = merge_elements(&mut self.scene, &ids, self.ids.as_mut(), font_range).inspect_err(|e| {
            log::warn!("Merge ignored: {}", e);
        })?;
        self.selection.select(merged_id.clone(), &self.scene);
        Ok(merged_id)
    }

    /// Split every selected merged element. Selects the first restored child.
    pub fn unmerge_selected(&mut self) -> EditResult<Vec<ElementId>> {
        let merged = self.selected_of_kind(ElementKind::Merged, "unmerge")?;
        if self.editing.as_ref().is_some_and(|id| merged.contains(id)) {
            self.editing = None;
        }
        let mut restored = Vec::new();
        for id in &merged {
            restored.extend(unmerge_element(&mut self.scene, id, self.ids.as_mut())?);
        }
        match restored.first() {
            Some(first) => self.selection.select(first.clone(), &self.scene),
            None => self.selection.deselect(),
        }
        Ok(restored)
    }

    // --- Duplication ---

    /// Duplicate the selection with auto-numbered labels. The original and
    /// all copies become the selection.
    pub fn duplicate_selected(&mut self, params: DuplicateParams) -> EditResult<Vec<ElementId>> {
        let ids = self.require_selection("duplicate")?;
        let font_range = self.config.font_range();
        let result = duplicate_elements(&mut self.scene, &ids, params, self.ids.as_mut(), font_range)?;
        self.selection.select_many(result.clone(), &self.scene);
        Ok(result)
    }

    // --- Clipboard ---

    pub fn copy_selection(&mut self) -> EditResult<usize> {
        let ids = self.require_selection("copy")?;
        let elements: Vec<Element> = self.scene.collect(&ids).into_iter().cloned().collect();
        let count = elements.len();
        self.clipboard.store(elements, ClipboardMode::Copy);
        log::info!("Copied {} element(s)", count);
        Ok(count)
    }

    /// Copy the selection to the clipboard and remove it from the scene.
    pub fn cut_selection(&mut self) -> EditResult<usize> {
        let ids = self.require_selection("cut")?;
        let removed = self.remove_elements(&ids);
        let count = removed.len();
        self.clipboard.store(removed, ClipboardMode::Cut);
        log::info!("Cut {} element(s)", count);
        Ok(count)
    }

    /// Paste the clipboard with fresh ids, offset from the source, and select
    /// the pasted elements.
    pub fn paste(&mut self) -> Vec<ElementId> {
        let pasted = self.clipboard.paste(self.ids.as_mut(), self.config.paste_offset);
        if pasted.is_empty() {
            log::debug!("Paste with empty clipboard");
            return Vec::new();
        }
        let ids: Vec<ElementId> = pasted.iter().map(|e| e.id.clone()).collect();
        self.scene.extend(pasted);
        self.selection.select_many(ids.clone(), &self.scene);
        log::info!("Pasted {} element(s)", ids.len());
        ids
    }

    // --- Layers ---

    pub fn bring_to_front(&mut self) -> EditResult<()> {
        let ids = self.require_selection("bring to front")?;
        self.scene.bring_to_front(&ids);
        Ok(())
    }

    pub fn send_to_back(&mut self) -> EditResult<()> {
        let ids = self.require_selection("send to back")?;
        self.scene.send_to_back(&ids);
        Ok(())
    }

    pub fn bring_forward(&mut self) -> EditResult<usize> {
        let ids = self.require_selection("bring forward")?;
        Ok(self.scene.bring_forward(&ids))
    }

    pub fn send_backward(&mut self) -> EditResult<usize> {
        let ids = self.require_selection("send backward")?;
        Ok(self.scene.send_backward(&ids))
    }

    // --- Style and text ---

    /// Apply a style edit. Color and border edits on a merged element are
    /// pushed onto its children too.
    pub fn apply_style(&mut self, ids: &[ElementId], patch: StylePatch) -> EditResult<usize> {
        if ids.is_empty() {
            return Err(EditError::NothingSelected);
        }
        let mut changed = 0;
        for id in ids {
            let Some(element) = self.scene.get_mut(id) else {
                continue;
            };
            patch.apply(element);
            if element.kind == ElementKind::Merged {
                let child_patch = StylePatch { opacity: None, ..patch };
                for child in &mut element.children {
                    child_patch.apply(child);
                }
            }
            changed += 1;
        }
        self.selection.refresh_style(&self.scene);
        Ok(changed)
    }

    /// Start editing the text of `id` and select it.
    pub fn begin_text_editing(&mut self, id: &ElementId) -> EditResult<()> {
        let element = self.require_element(id)?;
        if !element.kind.carries_text() {
            return Err(EditError::WrongKind {
                expected: ElementKind::Text,
                actual: element.kind,
            });
        }
        self.selection.select(id.clone(), &self.scene);
        self.editing = Some(id.clone());
        log::debug!("Editing text of {}", id);
        Ok(())
    }

    /// Write `text`, refit the font and leave text editing.
    pub fn commit_text(&mut self, id: &ElementId, text: &str) -> EditResult<()> {
        let range = self.config.font_range();
        let element = self
            .scene
            .get_mut(id)
            .ok_or_else(|| EditError::UnknownElement(id.clone()))?;
        if text.trim().is_empty() {
            element.text = None;
            element.font_size = None;
        } else {
            element.font_size = Some(optimal_font_size(element.width, element.height, text, range));
            element.text = Some(text.to_string());
        }
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        log::info!("Updated text of {}", id);
        Ok(())
    }

    pub fn cancel_text_editing(&mut self) {
        self.editing = None;
    }

    // --- Library ---

    /// Package the selection as a custom element, positioned relative to the
    /// selection's top-left.
    pub fn custom_element_from_selection(&self, name: &str, is_public: bool) -> EditResult<CustomElement> {
        let ids = self.require_selection("save to library")?;
        let selected = self.scene.collect(&ids);
        let origin = union_bounds(selected.iter().copied())
            .map(|b| Vec2::new(b.x0, b.y0))
            .unwrap_or(Vec2::ZERO);
        let elements = selected
            .into_iter()
            .map(|element| {
                let mut element = element.clone();
                element.translate(-origin);
                element
            })
            .collect();
        Ok(CustomElement {
            element_id: String::new(),
            name: name.trim().to_string(),
            element_data: CustomElementData::new(elements),
            thumbnail: None,
            is_public,
        })
    }

    /// Instantiate a custom element with its top-left at `at`.
    ///
    /// A single stored element is placed as is (unwrapping a one-child
    /// container); several become one group.
    pub fn place_custom_element(&mut self, custom: &CustomElement, at: Point) -> EditResult<Vec<ElementId>> {
        let stored = &custom.element_data.elements;
        if stored.is_empty() {
            return Err(EditError::NothingSelected);
        }

        let ids: Vec<ElementId> = stored
            .iter()
            .map(|element| {
                let mut element = unwrap_singleton(element.clone()).clone_with_fresh_identity(self.ids.as_mut());
                element.translate(at.to_vec2());
                let id = element.id.clone();
                self.scene.add(element);
                id
            })
            .collect();

        let placed = if ids.len() > 1 {
            vec![group_elements(&mut self.scene, &ids, self.ids.as_mut())?]
        } else {
            ids
        };
        self.selection.select_many(placed.clone(), &self.scene);
        log::info!("Placed custom element '{}'", custom.name);
        Ok(placed)
    }

    // --- Persistence ---

    /// Snapshot the scene as a layout.
    pub fn to_layout(&self, title: &str, event_id: &str) -> Layout {
        let mut layout = Layout::new(title, event_id, self.scene.elements().to_vec(), self.scene.page_size);
        layout.id = self.layout_id.clone();
        layout
    }

    /// Remember the id a store assigned on save.
    pub fn set_layout_id(&mut self, id: impl Into<String>) {
        self.layout_id = id.into();
    }

    pub fn layout_id(&self) -> &str {
        &self.layout_id
    }

    /// Replace the scene with a stored layout.
    pub fn load_layout(&mut self, layout: Layout) {
        let elements: Vec<Element> = layout.elements.into_iter().map(unwrap_singleton).collect();
        log::info!("Loaded layout '{}' with {} element(s)", layout.title, elements.len());
        self.scene.replace_all(elements);
        self.scene.page_size = layout.page_size.clamped();
        self.layout_id = layout.id;
        self.reset_transient_state();
    }

    // --- Renderer boundary ---

    /// Drawable primitives back to front.
    pub fn primitives(&self) -> Vec<RenderPrimitive> {
        flatten(&self.scene, |id| self.selection.contains(id), self.config.font_range())
    }

    /// Dispatch a renderer gesture. Gestures on unknown ids are ignored.
    pub fn handle_gesture(&mut self, gesture: Gesture) -> GestureFeedback {
        let mut feedback = GestureFeedback::default();
        match gesture {
            Gesture::PointerDown { id, append } => {
                if self.editing.as_ref().is_some_and(|editing| *editing != id) {
                    self.editing = None;
                }
                let result = if append {
                    self.toggle_selection(id)
                } else {
                    self.select(id)
                };
                if let Err(e) = result {
                    log::debug!("Pointer down ignored: {}", e);
                }
            }
            Gesture::CanvasClick => self.deselect(),
            Gesture::DragStart { id } => {
                if let Err(e) = self.begin_drag(id) {
                    log::debug!("Drag start ignored: {}", e);
                }
            }
            Gesture::DragMove { id, position } => {
                feedback.guides = self.drag_to(&id, position);
                feedback.changed = self.drag.is_some();
            }
            Gesture::DragEnd { id, position } => {
                feedback.changed = self.end_drag(&id, position).is_ok();
            }
            Gesture::ResizeEnd {
                id,
                scale_x,
                scale_y,
                position,
                rotation,
            } => {
                feedback.changed = self.resize(&id, scale_x, scale_y, position, rotation).is_ok();
            }
            Gesture::DoubleClick { id } => {
                if let Err(e) = self.begin_text_editing(&id) {
                    log::debug!("Double click ignored: {}", e);
                }
            }
        }
        feedback.editing = self.editing.clone();
        feedback
    }

    // --- Helpers ---

    fn require_element(&self, id: &ElementId) -> EditResult<&Element> {
        self.scene.get(id).ok_or_else(|| EditError::UnknownElement(id.clone()))
    }

    fn require_selection(&self, action: &str) -> EditResult<Vec<ElementId>> {
        let ids = self.selection.ids();
        if ids.is_empty() {
            log::warn!("Nothing selected to {}", action);
            return Err(EditError::NothingSelected);
        }
        Ok(ids)
    }

    fn selected_of_kind(&self, kind: ElementKind, action: &str) -> EditResult<Vec<ElementId>> {
        let ids = self.require_selection(action)?;
        let selected = self.scene.collect(&ids);
        let matching: Vec<ElementId> = selected
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.id.clone())
            .collect();
        match (matching.is_empty(), selected.first()) {
            (false, _) => Ok(matching),
            (true, Some(first)) => Err(EditError::WrongKind {
                expected: kind,
                actual: first.kind,
            }),
            (true, None) => Err(EditError::NothingSelected),
        }
    }

    fn reset_transient_state(&mut self) {
        self.selection.deselect();
        self.editing = None;
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::SequentialIdGenerator;
    use crate::library::{ElementFilter, ElementLibrary, MemoryElementLibrary};
    use crate::storage::{LayoutPersistence, MemoryLayoutStore, block_on};
    use kurbo::Rect;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn editor() -> Editor {
        init();
        Editor::with_id_generator(EditorConfig::default(), Box::new(SequentialIdGenerator::new()))
    }

    fn rect(editor: &mut Editor, x: f64, y: f64) -> ElementId {
        editor.create_element(ElementKind::Rectangle, x, y, 100.0, 50.0)
    }

    #[test]
    fn test_select_toggle_sequence() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        let b = rect(&mut editor, 200.0, 0.0);

        editor.select(a.clone()).unwrap();
        editor.toggle_selection(b.clone()).unwrap();
        assert_eq!(editor.selection().len(), 2);
        editor.toggle_selection(a).unwrap();
        assert_eq!(editor.selection(), &Selection::Single(b));
    }

    #[test]
    fn test_deleting_multi_member_updates_selection() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        let b = rect(&mut editor, 200.0, 0.0);
        let c = rect(&mut editor, 400.0, 0.0);
        editor.select_all();

        editor.remove_elements(std::slice::from_ref(&c));
        assert!(!editor.scene().contains(&c));
        assert_eq!(editor.selection().ids(), vec![a.clone(), b.clone()]);
        assert_eq!(editor.selection().bounds(), Some(Rect::new(-10.0, -10.0, 310.0, 60.0)));

        editor.remove_elements(std::slice::from_ref(&b));
        assert_eq!(editor.selection(), &Selection::Single(a));
        assert!(editor.selection().bounds().is_none());
    }

    #[test]
    fn test_commands_without_selection_are_noops() {
        let mut editor = editor();
        rect(&mut editor, 0.0, 0.0);
        let before = editor.scene().clone();

        assert_eq!(editor.group_selected(), Err(EditError::NotEnoughSelected { required: 2, actual: 0 }));
        assert_eq!(editor.duplicate_selected(DuplicateParams::default()), Err(EditError::NothingSelected));
        assert_eq!(editor.delete_selected(), Err(EditError::NothingSelected));
        assert_eq!(editor.bring_to_front(), Err(EditError::NothingSelected));
        assert_eq!(editor.scene(), &before);
    }

    #[test]
    fn test_group_selects_group_and_ungroup_clears() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        let b = rect(&mut editor, 200.0, 100.0);
        editor.select(a).unwrap();
        editor.toggle_selection(b).unwrap();

        let group = editor.group_selected().unwrap();
        assert_eq!(editor.selection(), &Selection::Single(group));
        assert_eq!(editor.scene().len(), 1);

        let restored = editor.ungroup_selected().unwrap();
        assert_eq!(restored.len(), 2);
        assert!(editor.selection().is_empty());
        assert_eq!(editor.scene().elements()[1].position(), Point::new(200.0, 100.0));
    }

    #[test]
    fn test_ungroup_needs_group() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        editor.select(a).unwrap();
        assert_eq!(
            editor.ungroup_selected(),
            Err(EditError::WrongKind {
                expected: ElementKind::Group,
                actual: ElementKind::Rectangle
            })
        );
    }

    #[test]
    fn test_merge_style_then_unmerge() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        let b = rect(&mut editor, 200.0, 0.0);
        editor.commit_text(&a, "Bar").unwrap();
        editor.select(a).unwrap();
        editor.toggle_selection(b).unwrap();

        let merged = editor.merge_selected().unwrap();
        let red = SerializableColor::new(255, 0, 0, 255);
        editor
            .apply_style(std::slice::from_ref(&merged), StylePatch { color: Some(red), ..Default::default() })
            .unwrap();
        assert_eq!(editor.selection_style().map(|s| s.color), Some(red));
        assert!(editor.scene().get(&merged).unwrap().children.iter().all(|c| c.color == red));

        let restored = editor.unmerge_selected().unwrap();
        assert_eq!(editor.selection(), &Selection::Single(restored[0].clone()));
        let first = editor.scene().get(&restored[0]).unwrap();
        assert_eq!(first.text.as_deref(), Some("Bar"));
        assert_eq!(first.color, red);
    }

    #[test]
    fn test_duplicate_selects_all_copies() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        editor.select(a).unwrap();
        let params = DuplicateParams { start: 1, end: 3, count: 3, gap: 20.0, ..DuplicateParams::default() };
        let ids = editor.duplicate_selected(params).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(editor.selection().ids(), ids);
        assert_eq!(editor.scene().len(), 3);
    }

    #[test]
    fn test_cut_paste_once_and_copy_paste_twice() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        editor.select(a.clone()).unwrap();

        editor.cut_selection().unwrap();
        assert!(editor.scene().is_empty());
        assert!(editor.selection().is_empty());
        let pasted = editor.paste();
        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], a);
        assert_eq!(editor.scene().get(&pasted[0]).unwrap().position(), Point::new(20.0, 20.0));
        assert!(editor.paste().is_empty());

        editor.copy_selection().unwrap();
        assert_eq!(editor.paste().len(), 1);
        assert_eq!(editor.paste().len(), 1);
        assert_eq!(editor.scene().len(), 3);
    }

    #[test]
    fn test_layer_commands_use_selection() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        let b = rect(&mut editor, 0.0, 0.0);
        let c = rect(&mut editor, 0.0, 0.0);
        editor.select(a.clone()).unwrap();
        editor.bring_to_front().unwrap();
        let order: Vec<ElementId> = editor.scene().elements().iter().map(|e| e.id.clone()).collect();
        assert_eq!(order, vec![b.clone(), c.clone(), a.clone()]);

        editor.select(c.clone()).unwrap();
        editor.send_backward().unwrap();
        let order: Vec<ElementId> = editor.scene().elements().iter().map(|e| e.id.clone()).collect();
        assert_eq!(order, vec![c, b, a]);
    }

    #[test]
    fn test_gestures_drag_and_snap() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);

        editor.handle_gesture(Gesture::PointerDown { id: a.clone(), append: false });
        editor.handle_gesture(Gesture::DragStart { id: a.clone() });
        let live = editor.handle_gesture(Gesture::DragMove { id: a.clone(), position: Point::new(101.0, 58.0) });
        assert_eq!(live.guides, vec![SnapGuide::Vertical(100.0), SnapGuide::Horizontal(60.0)]);
        assert_eq!(editor.scene().get(&a).unwrap().position(), Point::new(101.0, 58.0));

        let end = editor.handle_gesture(Gesture::DragEnd { id: a.clone(), position: Point::new(101.0, 58.0) });
        assert!(end.changed);
        assert_eq!(editor.scene().get(&a).unwrap().position(), Point::new(100.0, 60.0));
    }

    #[test]
    fn test_multi_drag_bounds_refresh_only_at_end() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        let b = rect(&mut editor, 200.0, 0.0);
        editor.select(a.clone()).unwrap();
        editor.toggle_selection(b.clone()).unwrap();
        let start_bounds = editor.selection().bounds();

        editor.handle_gesture(Gesture::DragStart { id: b.clone() });
        editor.handle_gesture(Gesture::DragMove { id: b.clone(), position: Point::new(240.0, 30.0) });
        assert_eq!(editor.selection().bounds(), start_bounds);
        assert_eq!(editor.scene().get(&a).unwrap().position(), Point::new(40.0, 30.0));

        editor.handle_gesture(Gesture::DragEnd { id: b, position: Point::new(240.0, 30.0) });
        assert_eq!(editor.selection().bounds(), Some(Rect::new(30.0, 20.0, 350.0, 90.0)));
    }

    #[test]
    fn test_double_click_and_commit_text() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        let feedback = editor.handle_gesture(Gesture::DoubleClick { id: a.clone() });
        assert_eq!(feedback.editing, Some(a.clone()));

        editor.commit_text(&a, "VIP").unwrap();
        assert!(editor.editing().is_none());
        let element = editor.scene().get(&a).unwrap();
        assert_eq!(element.text.as_deref(), Some("VIP"));
        assert!(element.font_size.is_some());
    }

    #[test]
    fn test_canvas_click_deselects_and_stops_editing() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        editor.begin_text_editing(&a).unwrap();
        let feedback = editor.handle_gesture(Gesture::CanvasClick);
        assert!(feedback.editing.is_none());
        assert!(editor.selection().is_empty());
        assert!(editor.selection_style().is_none());
    }

    #[test]
    fn test_lines_cannot_be_text_edited() {
        let mut editor = editor();
        let line = editor.create_element(ElementKind::Line, 0.0, 0.0, 100.0, 2.0);
        assert!(matches!(editor.begin_text_editing(&line), Err(EditError::WrongKind { .. })));
    }

    #[test]
    fn test_resize_gesture() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        editor.handle_gesture(Gesture::ResizeEnd {
            id: a.clone(),
            scale_x: 2.0,
            scale_y: 1.0,
            position: Point::new(5.0, 5.0),
            rotation: 0.0,
        });
        let element = editor.scene().get(&a).unwrap();
        assert_eq!((element.x, element.width, element.height), (5.0, 200.0, 50.0));
    }

    #[test]
    fn test_layout_round_trip_unwraps_singletons() {
        let mut editor = editor();
        rect(&mut editor, 0.0, 0.0);
        let child = Element::new("inner".into(), ElementKind::Circle, 10.0, 10.0, 20.0, 20.0);
        let wrapper = Element::new("wrap".into(), ElementKind::Group, 50.0, 50.0, 20.0, 20.0).with_children(vec![child]);
        editor.add_element(wrapper);

        let layout = editor.to_layout("Hall", "event-1");
        let mut other = Editor::default();
        other.load_layout(layout);
        assert_eq!(other.scene().len(), 2);
        let unwrapped = &other.scene().elements()[1];
        assert_eq!(unwrapped.kind, ElementKind::Circle);
        assert_eq!(unwrapped.position(), Point::new(60.0, 60.0));
        assert!(other.selection().is_empty());
    }

    #[test]
    fn test_save_through_persistence_keeps_layout_id() {
        let mut editor = editor();
        rect(&mut editor, 0.0, 0.0);
        let persistence = LayoutPersistence::new(Box::new(MemoryLayoutStore::new()), Box::new(MemoryLayoutStore::new()));

        let saved = block_on(persistence.save(&editor.to_layout("Hall", "e1"))).unwrap().into_value();
        editor.set_layout_id(saved.id.clone());
        let again = block_on(persistence.save(&editor.to_layout("Hall", "e1"))).unwrap().into_value();
        assert_eq!(again.id, saved.id);
        assert_eq!(block_on(persistence.list("e1")).unwrap().value().len(), 1);
    }

    #[test]
    fn test_custom_element_round_trip() {
        let mut editor = editor();
        let a = rect(&mut editor, 100.0, 100.0);
        let b = editor.create_element(ElementKind::Circle, 300.0, 150.0, 60.0, 60.0);
        editor.select(a).unwrap();
        editor.toggle_selection(b).unwrap();

        let custom = editor.custom_element_from_selection("Bar set", false).unwrap();
        assert_eq!(custom.element_data.element_count, 2);
        assert_eq!(custom.element_data.elements[0].position(), Point::new(0.0, 0.0));

        let library = MemoryElementLibrary::new();
        let saved = block_on(library.create_from_selection(&custom)).unwrap();
        let listed = block_on(library.list_user_elements(&ElementFilter::default())).unwrap();
        assert_eq!(listed.elements[0].element_id, saved.element_id);

        let placed = editor.place_custom_element(&saved, Point::new(500.0, 400.0)).unwrap();
        assert_eq!(placed.len(), 1);
        let group = editor.scene().get(&placed[0]).unwrap();
        assert_eq!(group.kind, ElementKind::Group);
        assert_eq!(group.position(), Point::new(500.0, 400.0));
        assert_eq!(editor.selection(), &Selection::Single(placed[0].clone()));
    }

    #[test]
    fn test_place_single_wrapped_custom_element() {
        let mut editor = editor();
        let child = Element::new("seat".into(), ElementKind::Square, 0.0, 0.0, 30.0, 30.0);
        let wrapper = Element::new("g".into(), ElementKind::Group, 0.0, 0.0, 30.0, 30.0).with_children(vec![child]);
        let custom = CustomElement {
            element_id: "lib-1".to_string(),
            name: "Seat".to_string(),
            element_data: CustomElementData::new(vec![wrapper]),
            thumbnail: None,
            is_public: true,
        };

        let placed = editor.place_custom_element(&custom, Point::new(40.0, 40.0)).unwrap();
        let element = editor.scene().get(&placed[0]).unwrap();
        assert_eq!(element.kind, ElementKind::Square);
        assert_ne!(element.id.as_str(), "seat");
        assert_eq!(element.position(), Point::new(40.0, 40.0));
    }

    #[test]
    fn test_add_element_replaces_clashing_id() {
        let mut editor = editor();
        let first = editor.add_element(Element::new("dup".into(), ElementKind::Text, 0.0, 0.0, 10.0, 10.0));
        let second = editor.add_element(Element::new("dup".into(), ElementKind::Text, 0.0, 0.0, 10.0, 10.0));
        assert_eq!(first.as_str(), "dup");
        assert_ne!(second, first);
    }

    #[test]
    fn test_primitives_flag_selection() {
        let mut editor = editor();
        let a = rect(&mut editor, 0.0, 0.0);
        rect(&mut editor, 200.0, 0.0);
        editor.select(a).unwrap();
        let primitives = editor.primitives();
        assert_eq!(primitives.len(), 2);
        assert!(primitives[0].selected);
        assert!(!primitives[1].selected);
    }

    #[test]
    fn test_page_size_input_is_clamped() {
        let mut editor = editor();
        assert_eq!(editor.set_page_size_from_input("5000", "abc"), PageSize::new(3000.0, 800.0));
        assert_eq!(editor.set_page_size_from_input(" 150 ", "900"), PageSize::new(200.0, 900.0));
    }
}
