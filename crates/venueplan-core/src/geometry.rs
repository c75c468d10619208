//! Bounds, font fitting and outline geometry for elements.

use crate::elements::{Element, ElementKind};
use kurbo::{Arc, BezPath, Point, Rect, Vec2};
use std::f64::consts::PI;

/// Lines thinner than this still occupy this much vertical space.
pub const LINE_MIN_STROKE: f64 = 2.0;

/// Smallest font size produced by [`optimal_font_size`] by default.
pub const DEFAULT_MIN_FONT_SIZE: f64 = 8.0;
/// Largest font size produced by [`optimal_font_size`] by default.
pub const DEFAULT_MAX_FONT_SIZE: f64 = 72.0;

/// Inner radius of a star as a fraction of its outer radius.
const STAR_INNER_RATIO: f64 = 0.5;
/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.6;
/// Usable fraction of an element's box.
const FILL_RATIO: f64 = 0.9;

/// Axis-aligned box the element visibly occupies.
pub fn visual_bounds(element: &Element) -> Rect {
    let (x, y, w, h) = (element.x, element.y, element.width, element.height);
    match element.kind {
        ElementKind::Ellipse => Rect::new(x - w / 2.0, y - h / 2.0, x + w / 2.0, y + h / 2.0),
        ElementKind::Circle
        | ElementKind::Triangle
        | ElementKind::Pentagon
        | ElementKind::Hexagon
        | ElementKind::Octagon
        | ElementKind::Star => Rect::new(x - w / 2.0, y - w / 2.0, x + w / 2.0, y + w / 2.0),
        ElementKind::Line => {
            let stroke = h.max(LINE_MIN_STROKE);
            Rect::new(x, y - stroke / 2.0, x + w, y + stroke / 2.0)
        }
        ElementKind::Square
        | ElementKind::Rectangle
        | ElementKind::Text
        | ElementKind::Image
        | ElementKind::Group
        | ElementKind::Merged => Rect::new(x, y, x + w, y + h),
    }
}

/// Inverse of [`visual_bounds`]: anchor and size for `kind` occupying `bounds`.
///
/// Returns `(x, y, width, height)`.
pub fn geometry_from_bounds(kind: ElementKind, bounds: Rect) -> (f64, f64, f64, f64) {
    let center = bounds.center();
    match kind {
        ElementKind::Circle
        | ElementKind::Ellipse
        | ElementKind::Triangle
        | ElementKind::Pentagon
        | ElementKind::Hexagon
        | ElementKind::Octagon
        | ElementKind::Star => (center.x, center.y, bounds.width(), bounds.height()),
        ElementKind::Line => (bounds.x0, center.y, bounds.width(), bounds.height()),
        ElementKind::Square
        | ElementKind::Rectangle
        | ElementKind::Text
        | ElementKind::Image
        | ElementKind::Group
        | ElementKind::Merged => (bounds.x0, bounds.y0, bounds.width(), bounds.height()),
    }
}

/// Union of the visual bounds of `elements`, or `None` if empty.
pub fn union_bounds<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Option<Rect> {
    elements
        .into_iter()
        .map(visual_bounds)
        .reduce(|acc, bounds| acc.union(bounds))
}

/// Font size range accepted by [`optimal_font_size`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRange {
    pub min: f64,
    pub max: f64,
}

impl Default for FontRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_FONT_SIZE,
            max: DEFAULT_MAX_FONT_SIZE,
        }
    }
}

/// Shrink factor for longer strings. Non-increasing in `chars`.
fn length_factor(chars: usize) -> f64 {
    match chars {
        0..=3 => 1.0,
        4..=6 => 0.9,
        7..=10 => 0.8,
        11..=20 => 0.7,
        _ => 0.6,
    }
}

/// Largest font size that fits `text` inside a `width`×`height` box.
pub fn optimal_font_size(width: f64, height: f64, text: &str, range: FontRange) -> f64 {
    let available_w = width.max(0.0) * FILL_RATIO;
    let available_h = height.max(0.0) * FILL_RATIO;
    let aspect = width / height.max(f64::EPSILON);

    let mut size = available_w.min(available_h) * 0.2;
    if aspect > 3.0 {
        size = size.max(available_h * 0.4);
    } else if aspect < 1.0 / 3.0 {
        size = size.max(available_w * 0.25);
    }

    let chars = text.chars().count();
    size *= length_factor(chars);

    if chars > 0 {
        let estimated_width = GLYPH_WIDTH_RATIO * size * chars as f64;
        if estimated_width > available_w {
            size = available_w / (GLYPH_WIDTH_RATIO * chars as f64);
        }
    }

    size.clamp(range.min, range.max)
}

/// Stroke outline of `elements`, relative to `(origin_x, origin_y)`.
///
/// One closed sub-path per element, in input order. Overlapping elements are
/// not unioned.
pub fn merged_outline_path(elements: &[Element], origin_x: f64, origin_y: f64) -> BezPath {
    let origin = Vec2::new(origin_x, origin_y);
    let mut path = BezPath::new();

    for element in elements {
        let bounds = visual_bounds(element);
        let center = bounds.center() - origin;
        let radius = element.width / 2.0;

        match element.kind {
            ElementKind::Circle | ElementKind::Ellipse => {
                let radii = Vec2::new(bounds.width() / 2.0, bounds.height() / 2.0);
                path.move_to(Point::new(center.x + radii.x, center.y));
                for start in [0.0, PI] {
                    let arc = Arc::new(center, radii, start, PI, 0.0);
                    path.extend(arc.append_iter(0.1));
                }
                path.close_path();
            }
            ElementKind::Triangle | ElementKind::Pentagon | ElementKind::Hexagon | ElementKind::Octagon => {
                let sides = element.kind.polygon_sides().unwrap_or(3);
                let vertices = (0..sides).map(|i| {
                    let angle = -PI / 2.0 + i as f64 * 2.0 * PI / sides as f64;
                    polar(center, radius, angle)
                });
                push_polygon(&mut path, vertices);
            }
            ElementKind::Star => {
                let vertices = (0..10).map(|i| {
                    let angle = (i as f64 * 36.0 - 90.0).to_radians();
                    let r = if i % 2 == 0 { radius } else { radius * STAR_INNER_RATIO };
                    polar(center, r, angle)
                });
                push_polygon(&mut path, vertices);
            }
            ElementKind::Square
            | ElementKind::Rectangle
            | ElementKind::Line
            | ElementKind::Text
            | ElementKind::Image
            | ElementKind::Group
            | ElementKind::Merged => {
                let rect = bounds - origin;
                push_polygon(
                    &mut path,
                    [
                        Point::new(rect.x0, rect.y0),
                        Point::new(rect.x1, rect.y0),
                        Point::new(rect.x1, rect.y1),
                        Point::new(rect.x0, rect.y1),
                    ],
                );
            }
        }
    }

    path
}

fn polar(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

fn push_polygon(path: &mut BezPath, vertices: impl IntoIterator<Item = Point>) {
    let mut vertices = vertices.into_iter();
    let Some(first) = vertices.next() else { return };
    path.move_to(first);
    for vertex in vertices {
        path.line_to(vertex);
    }
    path.close_path();
}
