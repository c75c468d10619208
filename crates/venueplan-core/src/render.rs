//! What the engine hands to a renderer, and what a renderer reports back.

use crate::elements::{Element, ElementId, ElementKind, ImageState, SerializableColor};
use crate::geometry::{FontRange, optimal_font_size, visual_bounds};
use crate::scene::Scene;
use crate::snap::SnapGuide;
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;

/// Stroke of a primitive.
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
}

/// One thing to draw, in absolute scene coordinates.
#[derive(Debug, Clone)]
pub struct RenderPrimitive {
    pub id: ElementId,
    pub instance_id: String,
    pub kind: ElementKind,
    /// Container this primitive belongs to, if it is a child.
    pub parent: Option<ElementId>,
    /// Anchor, as stored (center for centered kinds).
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub bounds: Rect,
    pub fill: Color,
    pub stroke: Option<Stroke>,
    pub rotation: f64,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub image: Option<ImageState>,
    /// Outline of a merged container.
    pub outline: Option<BezPath>,
    pub selected: bool,
}

/// Flatten `scene` back to front. Containers come before their children;
/// children carry absolute positions.
pub fn flatten(scene: &Scene, is_selected: impl Fn(&ElementId) -> bool, font_range: FontRange) -> Vec<RenderPrimitive> {
    let mut primitives = Vec::with_capacity(scene.len());
    for element in scene.elements() {
        let selected = is_selected(&element.id);
        push_element(&mut primitives, element, None, Vec2::ZERO, selected, font_range);
    }
    primitives
}

fn push_element(
    out: &mut Vec<RenderPrimitive>,
    element: &Element,
    parent: Option<&Element>,
    offset: Vec2,
    selected: bool,
    font_range: FontRange,
) {
    let position = element.position() + offset;
    let hide_text = parent.map(|p| p.kind == ElementKind::Merged).unwrap_or(false);
    let text = if hide_text {
        None
    } else {
        element.visible_text().map(str::to_string)
    };
    let font_size = text.as_deref().map(|t| {
        element
            .font_size
            .unwrap_or_else(|| optimal_font_size(element.width, element.height, t, font_range))
    });
    let stroke = element.has_border().then(|| Stroke {
        width: element.border_width,
        color: element.border_color.unwrap_or(SerializableColor::black()).with_opacity(element.opacity),
    });
    let outline = match element.kind {
        ElementKind::Merged => element.outline_path.as_deref().and_then(|svg| match BezPath::from_svg(svg) {
            Ok(path) => Some(Affine::translate(position.to_vec2()) * path),
            Err(e) => {
                log::warn!("Ignoring malformed outline on {}: {}", element.id, e);
                None
            }
        }),
        _ => None,
    };
    let image = (element.kind == ElementKind::Image).then(|| element.image_state());

    out.push(RenderPrimitive {
        id: element.id.clone(),
        instance_id: element.instance_id.clone(),
        kind: element.kind,
        parent: parent.map(|p| p.id.clone()),
        position,
        width: element.width,
        height: element.height,
        bounds: visual_bounds(element) + offset,
        fill: element.color.with_opacity(element.opacity),
        stroke,
        rotation: element.rotation,
        text,
        font_size,
        image,
        outline,
        selected,
    });

    let child_offset = position.to_vec2();
    for child in &element.children {
        push_element(out, child, Some(element), child_offset, selected, font_range);
    }
}

/// Pointer input reported by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Press on an element; `append` when a selection modifier is held.
    PointerDown { id: ElementId, append: bool },
    /// Press on empty canvas.
    CanvasClick,
    DragStart { id: ElementId },
    /// Live drag; `position` is the dragged element's current anchor.
    DragMove { id: ElementId, position: Point },
    DragEnd { id: ElementId, position: Point },
    /// Resize handle released with scale factors relative to the start.
    ResizeEnd {
        id: ElementId,
        scale_x: f64,
        scale_y: f64,
        position: Point,
        rotation: f64,
    },
    DoubleClick { id: ElementId },
}

/// What the renderer should show after a gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureFeedback {
    /// Snap guides to draw during a live drag.
    pub guides: Vec<SnapGuide>,
    /// Element whose text is being edited.
    pub editing: Option<ElementId>,
    /// Whether the scene changed.
    pub changed: bool,
}
