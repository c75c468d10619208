//! Element definitions for the layout scene.

mod color;
mod id;
mod image;

pub use color::SerializableColor;
pub use id::{ElementId, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use image::{ImageFormat, ImageState, encode_data_url, resolve_image};

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    #[serde(alias = "round")]
    Circle,
    #[serde(alias = "chair")]
    Square,
    #[serde(
        alias = "table",
        alias = "stage",
        alias = "bar",
        alias = "dj",
        alias = "entrance",
        alias = "restroom",
        alias = "buffet"
    )]
    Rectangle,
    Ellipse,
    Triangle,
    Pentagon,
    Hexagon,
    Octagon,
    Star,
    Line,
    Text,
    Image,
    Group,
    Merged,
}

impl ElementKind {
    /// Kinds whose `x,y` anchor is the center rather than the top-left.
    pub fn is_centered(self) -> bool {
        match self {
            ElementKind::Circle
            | ElementKind::Ellipse
            | ElementKind::Triangle
            | ElementKind::Pentagon
            | ElementKind::Hexagon
            | ElementKind::Octagon
            | ElementKind::Star => true,
            ElementKind::Square
            | ElementKind::Rectangle
            | ElementKind::Line
            | ElementKind::Text
            | ElementKind::Image
            | ElementKind::Group
            | ElementKind::Merged => false,
        }
    }

    /// Kinds that hold children.
    pub fn is_container(self) -> bool {
        matches!(self, ElementKind::Group | ElementKind::Merged)
    }

    /// Vertex count for regular polygons.
    pub fn polygon_sides(self) -> Option<usize> {
        match self {
            ElementKind::Triangle => Some(3),
            ElementKind::Pentagon => Some(5),
            ElementKind::Hexagon => Some(6),
            ElementKind::Octagon => Some(8),
            _ => None,
        }
    }

    /// Kinds that display a text label inside their body.
    pub fn carries_text(self) -> bool {
        !matches!(self, ElementKind::Line | ElementKind::Image | ElementKind::Group)
    }

    /// Lowercase name, as persisted and used as id prefix.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Circle => "circle",
            ElementKind::Square => "square",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Triangle => "triangle",
            ElementKind::Pentagon => "pentagon",
            ElementKind::Hexagon => "hexagon",
            ElementKind::Octagon => "octagon",
            ElementKind::Star => "star",
            ElementKind::Line => "line",
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Group => "group",
            ElementKind::Merged => "merged",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// One drawable, manipulable unit of the scene.
///
/// Children of `group`/`merged` containers are positioned relative to the
/// container's `x,y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    /// Render-cache key, regenerated whenever the element is cloned.
    #[serde(default)]
    pub instance_id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub color: SerializableColor,
    #[serde(default)]
    pub border_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<SerializableColor>,
    /// Degrees. Stored only; nothing in the engine rotates elements.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
    /// SVG path data of a merged container's outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_path: Option<String>,
    /// Text a child of a merged container had before merging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl Element {
    /// Create an element with default style.
    pub fn new(id: ElementId, kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        let color = if kind.is_container() {
            SerializableColor::transparent()
        } else {
            SerializableColor::default()
        };
        Self {
            instance_id: id.to_string(),
            id,
            kind,
            x,
            y,
            width,
            height,
            color,
            border_width: 0.0,
            border_color: None,
            rotation: 0.0,
            opacity: 1.0,
            label: None,
            text: None,
            font_size: None,
            image_url: None,
            image_data: None,
            children: Vec::new(),
            outline_path: None,
            original_text: None,
        }
    }

    /// Create an element with a freshly minted identity.
    pub fn create(ids: &mut dyn IdGenerator, kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        let mut element = Self::new(ids.new_id(kind.name()), kind, x, y, width, height);
        element.instance_id = ids.new_instance_id();
        element
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_border(mut self, width: f64, color: SerializableColor) -> Self {
        self.border_width = width;
        self.border_color = Some(color);
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_image_data(mut self, data: impl Into<String>) -> Self {
        self.image_data = Some(data.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Non-empty visible text.
    pub fn visible_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Whether the element draws a border.
    pub fn has_border(&self) -> bool {
        self.border_width > 0.0
    }

    /// Resolve the image payload (only meaningful for `image` elements).
    pub fn image_state(&self) -> ImageState {
        resolve_image(self.image_data.as_deref(), self.image_url.as_deref())
    }

    /// Stored width/height ratio, guarded against zero height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height.max(f64::EPSILON)
    }

    /// Children with positions resolved against this container.
    pub fn absolute_children(&self) -> Vec<Element> {
        self.children
            .iter()
            .map(|child| {
                let mut child = child.clone();
                child.x += self.x;
                child.y += self.y;
                child
            })
            .collect()
    }

    /// Deep copy with new ids and instance ids on this element and every
    /// nested child.
    pub fn clone_with_fresh_identity(&self, ids: &mut dyn IdGenerator) -> Element {
        let mut copy = self.clone();
        copy.reassign_identity(ids);
        copy
    }

    fn reassign_identity(&mut self, ids: &mut dyn IdGenerator) {
        self.id = ids.new_id(self.kind.name());
        self.instance_id = ids.new_instance_id();
        for child in &mut self.children {
            child.reassign_identity(ids);
        }
    }

    /// Collect this element's id and the ids of all nested children.
    pub fn all_ids(&self) -> Vec<ElementId> {
        let mut ids = vec![self.id.clone()];
        for child in &self.children {
            ids.extend(child.all_ids());
        }
        ids
    }
}
