//! Drag and resize.

use crate::elements::{Element, ElementId, ElementKind};
use crate::geometry::{FontRange, optimal_font_size};
use crate::scene::Scene;
use crate::snap::GridConfig;
use kurbo::{Affine, BezPath, Point, Vec2};

/// Elements never shrink below this width or height.
pub const MIN_DIMENSION: f64 = 1.0;

/// Default tolerance for treating a scale factor as unchanged.
pub const DEFAULT_FREE_RESIZE_EPSILON: f64 = 0.05;

/// State for an in-progress drag.
///
/// Positions are recorded at drag start; every move re-applies the total
/// delta to those originals so repeated moves never accumulate error.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Element the pointer is holding.
    pub anchor: ElementId,
    /// Original position of each moved element.
    origins: Vec<(ElementId, Point)>,
}

impl DragSession {
    /// Record starting positions of `members`. `anchor` must be one of them.
    pub fn begin(scene: &Scene, anchor: ElementId, members: &[ElementId]) -> Option<Self> {
        let origins: Vec<(ElementId, Point)> = scene
            .collect(members)
            .into_iter()
            .map(|e| (e.id.clone(), e.position()))
            .collect();
        if !origins.iter().any(|(id, _)| *id == anchor) {
            return None;
        }
        Some(Self { anchor, origins })
    }

    /// Ids being moved.
    pub fn ids(&self) -> Vec<ElementId> {
        self.origins.iter().map(|(id, _)| id.clone()).collect()
    }

    fn anchor_origin(&self) -> Point {
        self.origins
            .iter()
            .find(|(id, _)| *id == self.anchor)
            .map(|(_, p)| *p)
            .unwrap_or(Point::ZERO)
    }

    /// Delta from the anchor's start position to `anchor_position`.
    pub fn delta(&self, anchor_position: Point) -> Vec2 {
        anchor_position - self.anchor_origin()
    }

    /// Live move: no snapping.
    pub fn apply(&self, scene: &mut Scene, anchor_position: Point) {
        self.apply_delta(scene, self.delta(anchor_position));
    }

    /// Commit: the anchor's final position snaps to the grid and every
    /// member follows with the same delta. Returns the committed anchor
    /// position.
    pub fn finish(&self, scene: &mut Scene, anchor_position: Point, grid: &GridConfig) -> Point {
        let committed = grid.nearest_snap_candidate(anchor_position).point;
        self.apply_delta(scene, self.delta(committed));
        committed
    }

    fn apply_delta(&self, scene: &mut Scene, delta: Vec2) {
        for (id, origin) in &self.origins {
            if let Some(element) = scene.get_mut(id) {
                element.set_position(*origin + delta);
            }
        }
    }
}

/// Tunables for resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOptions {
    pub font_range: FontRange,
    /// A scale within this distance of 1 counts as "axis untouched" for
    /// image free resize.
    pub free_resize_epsilon: f64,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            font_range: FontRange::default(),
            free_resize_epsilon: DEFAULT_FREE_RESIZE_EPSILON,
        }
    }
}

/// Apply resize scale factors `sx, sy` to an element.
pub fn resize_element(element: &mut Element, sx: f64, sy: f64, options: &ResizeOptions) {
    match element.kind {
        ElementKind::Group => {
            element.width = (element.width * sx).max(MIN_DIMENSION);
            element.height = (element.height * sy).max(MIN_DIMENSION);
            scale_contents(element, sx, sy);
        }
        ElementKind::Merged => {
            element.width = (element.width * sx).max(MIN_DIMENSION);
            element.height = (element.height * sy).max(MIN_DIMENSION);
            scale_contents(element, sx, sy);
            refit_font(element, options.font_range);
        }
        ElementKind::Image => {
            let x_untouched = (sx - 1.0).abs() <= options.free_resize_epsilon;
            let y_untouched = (sy - 1.0).abs() <= options.free_resize_epsilon;
            let (fx, fy) = if x_untouched != y_untouched {
                (sx, sy)
            } else {
                let s = sx.max(sy);
                (s, s)
            };
            element.width = (element.width * fx).max(MIN_DIMENSION);
            element.height = (element.height * fy).max(MIN_DIMENSION);
        }
        ElementKind::Circle
        | ElementKind::Square
        | ElementKind::Rectangle
        | ElementKind::Ellipse
        | ElementKind::Triangle
        | ElementKind::Pentagon
        | ElementKind::Hexagon
        | ElementKind::Octagon
        | ElementKind::Star
        | ElementKind::Line
        | ElementKind::Text => {
            element.width = (element.width * sx).max(MIN_DIMENSION);
            element.height = (element.height * sy).max(MIN_DIMENSION);
            refit_font(element, options.font_range);
        }
    }
}

/// Scale position, size and font of an element (and its children)
/// relative to its parent's origin.
pub fn scale_in_place(element: &mut Element, sx: f64, sy: f64) {
    element.x *= sx;
    element.y *= sy;
    element.width = (element.width * sx).max(MIN_DIMENSION);
    element.height = (element.height * sy).max(MIN_DIMENSION);
    if let Some(font_size) = element.font_size.as_mut() {
        *font_size *= sx.min(sy);
    }
    scale_contents(element, sx, sy);
}

/// Scale a container's children and, for a merged element, its outline.
fn scale_contents(element: &mut Element, sx: f64, sy: f64) {
    for child in &mut element.children {
        scale_in_place(child, sx, sy);
    }
    if element.kind != ElementKind::Merged {
        return;
    }
    let scaled = match element.outline_path.as_deref().map(BezPath::from_svg) {
        Some(Ok(path)) => Some((Affine::scale_non_uniform(sx, sy) * path).to_svg()),
        Some(Err(e)) => {
            log::warn!("Dropping malformed outline on {}: {}", element.id, e);
            None
        }
        None => None,
    };
    element.outline_path = scaled;
}

/// Recompute the font size of a text-bearing element from its box.
pub fn refit_font(element: &mut Element, range: FontRange) {
    if let Some(text) = element.visible_text() {
        element.font_size = Some(optimal_font_size(element.width, element.height, text, range));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with(elements: Vec<Element>) -> Scene {
        let mut scene = Scene::default();
        scene.extend(elements);
        scene
    }

    #[test]
    fn test_single_drag_snaps_on_finish_only() {
        let mut scene = scene_with(vec![Element::new(
            "a".into(),
            ElementKind::Rectangle,
            0.0,
            0.0,
            50.0,
            50.0,
        )]);
        let session = DragSession::begin(&scene, "a".into(), &["a".into()]).unwrap();

        session.apply(&mut scene, Point::new(101.0, 58.0));
        assert_eq!(scene.get(&"a".into()).unwrap().position(), Point::new(101.0, 58.0));

        let committed = session.finish(&mut scene, Point::new(101.0, 58.0), &GridConfig::default());
        assert_eq!(committed, Point::new(100.0, 60.0));
        assert_eq!(scene.get(&"a".into()).unwrap().position(), Point::new(100.0, 60.0));
    }

    #[test]
    fn test_multi_drag_moves_members_by_same_delta() {
        let mut scene = scene_with(vec![
            Element::new("a".into(), ElementKind::Rectangle, 0.0, 0.0, 50.0, 50.0),
            Element::new("b".into(), ElementKind::Circle, 200.0, 35.0, 40.0, 40.0),
        ]);
        let session = DragSession::begin(&scene, "a".into(), &["a".into(), "b".into()]).unwrap();

        session.apply(&mut scene, Point::new(10.0, 10.0));
        session.apply(&mut scene, Point::new(21.0, 14.0));
        assert_eq!(scene.get(&"b".into()).unwrap().position(), Point::new(221.0, 49.0));

        session.finish(&mut scene, Point::new(21.0, 14.0), &GridConfig::default());
        assert_eq!(scene.get(&"a".into()).unwrap().position(), Point::new(20.0, 15.0));
        assert_eq!(scene.get(&"b".into()).unwrap().position(), Point::new(220.0, 50.0));
    }

    #[test]
    fn test_drag_without_snapping() {
        let mut scene = scene_with(vec![Element::new(
            "a".into(),
            ElementKind::Rectangle,
            0.0,
            0.0,
            50.0,
            50.0,
        )]);
        let grid = GridConfig { enabled: false, ..GridConfig::default() };
        let session = DragSession::begin(&scene, "a".into(), &["a".into()]).unwrap();
        session.finish(&mut scene, Point::new(101.0, 58.0), &grid);
        assert_eq!(scene.get(&"a".into()).unwrap().position(), Point::new(101.0, 58.0));
    }

    #[test]
    fn test_begin_requires_anchor() {
        let scene = scene_with(vec![]);
        assert!(DragSession::begin(&scene, "a".into(), &["a".into()]).is_none());
    }

    #[test]
    fn test_group_resize_scales_children() {
        let child = Element::new("c".into(), ElementKind::Rectangle, 10.0, 20.0, 30.0, 40.0)
            .with_font_size(20.0);
        let mut group = Element::new("g".into(), ElementKind::Group, 0.0, 0.0, 100.0, 100.0)
            .with_children(vec![child]);

        resize_element(&mut group, 2.0, 0.5, &ResizeOptions::default());
        assert_eq!((group.width, group.height), (200.0, 50.0));
        let child = &group.children[0];
        assert_eq!((child.x, child.y, child.width, child.height), (20.0, 10.0, 60.0, 20.0));
        assert_eq!(child.font_size, Some(10.0));
    }

    #[test]
    fn test_image_side_handle_resizes_freely() {
        let mut image = Element::new("i".into(), ElementKind::Image, 0.0, 0.0, 200.0, 100.0);
        resize_element(&mut image, 1.5, 1.0, &ResizeOptions::default());
        assert_eq!((image.width, image.height), (300.0, 100.0));
    }

    #[test]
    fn test_image_corner_handle_keeps_aspect_ratio() {
        let mut image = Element::new("i".into(), ElementKind::Image, 0.0, 0.0, 200.0, 100.0);
        resize_element(&mut image, 1.5, 1.2, &ResizeOptions::default());
        assert_eq!((image.width, image.height), (300.0, 150.0));
        assert!((image.aspect_ratio() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_resize_refits_font() {
        let mut rect = Element::new("r".into(), ElementKind::Rectangle, 0.0, 0.0, 100.0, 100.0)
            .with_text("Table 1")
            .with_font_size(12.0);
        resize_element(&mut rect, 2.0, 2.0, &ResizeOptions::default());
        let expected = optimal_font_size(200.0, 200.0, "Table 1", FontRange::default());
        assert_eq!(rect.font_size, Some(expected));
    }

    #[test]
    fn test_resize_never_collapses() {
        let mut rect = Element::new("r".into(), ElementKind::Rectangle, 0.0, 0.0, 10.0, 10.0);
        resize_element(&mut rect, 0.0, 0.01, &ResizeOptions::default());
        assert_eq!((rect.width, rect.height), (MIN_DIMENSION, MIN_DIMENSION));
    }

    fn merged_pair() -> Element {
        let children = vec![
            Element::new("l".into(), ElementKind::Rectangle, 0.0, 0.0, 50.0, 50.0),
            Element::new("r".into(), ElementKind::Rectangle, 50.0, 0.0, 50.0, 50.0),
        ];
        let outline = crate::geometry::merged_outline_path(&children, 0.0, 0.0).to_svg();
        let mut merged = Element::new("m".into(), ElementKind::Merged, 0.0, 0.0, 100.0, 50.0).with_children(children);
        merged.outline_path = Some(outline);
        merged
    }

    fn outline_bounds(element: &Element) -> kurbo::Rect {
        let path = BezPath::from_svg(element.outline_path.as_deref().unwrap()).unwrap();
        kurbo::Shape::bounding_box(&path)
    }

    #[test]
    fn test_scale_in_place_scales_merged_contents() {
        let mut merged = merged_pair();
        scale_in_place(&mut merged, 0.5, 0.5);
        assert_eq!((merged.width, merged.height), (50.0, 25.0));
        let right = &merged.children[1];
        assert_eq!((right.x, right.width), (25.0, 25.0));
        let bounds = outline_bounds(&merged);
        assert!((bounds.x1 - 50.0).abs() < 1e-9);
        assert!((bounds.y1 - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_resize_reaches_nested_merged() {
        let mut group = Element::new("g".into(), ElementKind::Group, 0.0, 0.0, 100.0, 50.0)
            .with_children(vec![merged_pair()]);
        resize_element(&mut group, 0.5, 0.5, &ResizeOptions::default());
        let merged = &group.children[0];
        assert_eq!(merged.width, 50.0);
        assert_eq!((merged.children[1].x, merged.children[1].width), (25.0, 25.0));
        assert!((outline_bounds(merged).x1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_merged_resize_keeps_outline_in_box() {
        let mut merged = merged_pair();
        resize_element(&mut merged, 2.0, 1.0, &ResizeOptions::default());
        assert_eq!(merged.width, 200.0);
        assert_eq!(merged.children[1].x, 100.0);
        assert!((outline_bounds(&merged).x1 - 200.0).abs() < 1e-9);
    }
}
