//! Duplication with auto-numbered labels.

use crate::elements::{Element, ElementId, IdGenerator};
use crate::error::{EditError, EditResult};
use crate::geometry::{FontRange, union_bounds, visual_bounds};
use crate::scene::{PageSize, Scene};
use crate::transform::{refit_font, scale_in_place};
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Marker standing in for the elided middle of a long label range.
pub const ELLIPSIS: &str = "...";

/// Scale-to-fit leaves this fraction of the page as margin.
const FIT_MARGIN: f64 = 0.9;

/// Most copies one duplication may create.
pub const MAX_COPIES: usize = 500;

/// Largest magnitude accepted for start, end and increment.
pub const MAX_LABEL_VALUE: i64 = 1_000_000_000_000;

/// Which way copies are laid out from the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit step on the scene axes (y grows downward).
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Parse a direction name, ignoring case and surrounding whitespace.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Parameters of one duplication.
///
/// Deserialization never rejects a field: numbers may arrive as text,
/// out-of-range values are clamped and unparseable ones take the default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDuplicateParams")]
pub struct DuplicateParams {
    pub start: i64,
    pub end: i64,
    pub increment: i64,
    pub count: usize,
    pub direction: Direction,
    pub gap: f64,
}

impl Default for DuplicateParams {
    fn default() -> Self {
        Self {
            start: 1,
            end: 10,
            increment: 1,
            count: 10,
            direction: Direction::Right,
            gap: 20.0,
        }
    }
}

impl DuplicateParams {
    /// Pull out-of-range values back to the nearest usable ones.
    pub fn sanitized(self) -> Self {
        let start = self.start.clamp(-MAX_LABEL_VALUE, MAX_LABEL_VALUE);
        let end = self.end.clamp(-MAX_LABEL_VALUE, MAX_LABEL_VALUE);
        let magnitude = self.increment.unsigned_abs().clamp(1, MAX_LABEL_VALUE as u64) as i64;
        let increment = if end < start { -magnitude } else { magnitude };
        let gap = if self.gap.is_finite() { self.gap.max(0.0) } else { 0.0 };
        Self {
            start,
            end,
            increment,
            count: self.count.clamp(1, MAX_COPIES),
            direction: self.direction,
            gap,
        }
    }

    /// Parse a user-entered start, end or increment. Non-numeric input
    /// keeps `current`.
    pub fn parse_value(input: &str, current: i64) -> i64 {
        parse_number(input).map(label_value).unwrap_or(current)
    }

    /// Parse a user-entered copy count. Non-numeric input keeps `current`.
    pub fn parse_count(input: &str, current: usize) -> usize {
        parse_number(input).map(count_value).unwrap_or(current)
    }

    /// Parse a user-entered gap. Non-numeric input keeps `current`.
    pub fn parse_gap(input: &str, current: f64) -> f64 {
        parse_number(input).map(gap_value).unwrap_or(current)
    }

    /// Labels for copies `0..count`.
    pub fn labels(&self) -> Vec<String> {
        sequence_labels(self.start, self.end, self.increment, self.count)
    }
}

fn parse_number(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn label_value(value: f64) -> i64 {
    value.round().clamp(-MAX_LABEL_VALUE as f64, MAX_LABEL_VALUE as f64) as i64
}

fn count_value(value: f64) -> usize {
    value.round().clamp(1.0, MAX_COPIES as f64) as usize
}

fn gap_value(value: f64) -> f64 {
    value.max(0.0)
}

/// A number as sent by a form: either JSON numeric or free text.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    fn value(&self) -> Option<f64> {
        match self {
            NumberInput::Number(v) => Some(*v).filter(|v| v.is_finite()),
            NumberInput::Text(text) => parse_number(text),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawDuplicateParams {
    start: Option<NumberInput>,
    end: Option<NumberInput>,
    increment: Option<NumberInput>,
    count: Option<NumberInput>,
    direction: Option<String>,
    gap: Option<NumberInput>,
}

impl From<RawDuplicateParams> for DuplicateParams {
    fn from(raw: RawDuplicateParams) -> Self {
        let defaults = DuplicateParams::default();
        let number = |field: Option<NumberInput>| field.as_ref().and_then(NumberInput::value);
        DuplicateParams {
            start: number(raw.start).map(label_value).unwrap_or(defaults.start),
            end: number(raw.end).map(label_value).unwrap_or(defaults.end),
            increment: number(raw.increment).map(label_value).unwrap_or(defaults.increment),
            count: number(raw.count).map(count_value).unwrap_or(defaults.count),
            direction: raw
                .direction
                .as_deref()
                .and_then(Direction::parse)
                .unwrap_or(defaults.direction),
            gap: number(raw.gap).map(gap_value).unwrap_or(defaults.gap),
        }
    }
}

/// Labels for `count` copies numbered from `start` toward `end`.
///
/// When there are fewer copies than numbers in the range, the middle is
/// elided: the first `ceil((count - 1) / 2)` labels count up from `start`,
/// then one [`ELLIPSIS`], then the rest count up to `end`.
pub fn sequence_labels(start: i64, end: i64, increment: i64, count: usize) -> Vec<String> {
    // Widened so extreme inputs saturate instead of overflowing.
    let (start, end) = (i128::from(start), i128::from(end));
    let step = if increment == 0 { 1 } else { i128::from(increment) };
    let span = (end - start).unsigned_abs() / step.unsigned_abs() + 1;
    let steps = |n: usize| (n as i128).saturating_mul(step);

    if count as u128 >= span || count <= 3 {
        return (0..count).map(|i| start.saturating_add(steps(i)).to_string()).collect();
    }

    let lead = count / 2;
    (0..count)
        .map(|i| {
            if i < lead {
                start.saturating_add(steps(i)).to_string()
            } else if i == lead {
                ELLIPSIS.to_string()
            } else {
                end.saturating_sub(steps(count - 1 - i)).to_string()
            }
        })
        .collect()
}

/// Offset of copy `i` from the original for a block of size `block`.
pub fn copy_offset(block: Rect, direction: Direction, gap: f64, i: usize) -> Vec2 {
    let extent = if direction.is_horizontal() { block.width() } else { block.height() };
    direction.unit() * ((extent + gap) * i as f64)
}

/// Uniform scale that fits `bounds` into the page, or `None` if it already
/// fits.
pub fn fit_scale(bounds: Rect, page: PageSize) -> Option<f64> {
    if bounds.x1 <= page.width && bounds.y1 <= page.height {
        return None;
    }
    let scale = (page.width / bounds.x1.max(f64::EPSILON))
        .min(page.height / bounds.y1.max(f64::EPSILON))
        .min(1.0);
    Some(scale * FIT_MARGIN)
}

fn stamp(element: &mut Element, label: &str, font_range: FontRange) {
    element.label = Some(label.to_string());
    if element.kind.carries_text() {
        element.text = Some(label.to_string());
        refit_font(element, font_range);
    }
}

/// Duplicate the listed elements as one block.
///
/// Copy 0 is the original, relabelled in place. Copies `1..count` get fresh
/// ids and are appended on top. Returns every resulting id, originals
/// first.
pub fn duplicate_elements(
    scene: &mut Scene,
    ids: &[ElementId],
    params: DuplicateParams,
    id_gen: &mut dyn IdGenerator,
    font_range: FontRange,
) -> EditResult<Vec<ElementId>> {
    let params = params.sanitized();
    let originals: Vec<Element> = scene.collect(ids).into_iter().cloned().collect();
    let Some(block) = union_bounds(&originals) else {
        return Err(EditError::NothingSelected);
    };
    let labels = params.labels();

    let mut copies: Vec<Vec<Element>> = Vec::with_capacity(params.count);
    for i in 0..params.count {
        let offset = copy_offset(block, params.direction, params.gap, i);
        let set = originals
            .iter()
            .map(|original| {
                let mut copy = if i == 0 {
                    original.clone()
                } else {
                    original.clone_with_fresh_identity(id_gen)
                };
                copy.translate(offset);
                copy
            })
            .collect();
        copies.push(set);
    }

    let target = union_bounds(copies.iter().flatten()).unwrap_or(block);
    let scale = fit_scale(target, scene.page_size);
    if let Some(scale) = scale {
        log::info!("Duplicates overflow the page, scaling by {:.3}", scale);
    }

    let mut result = Vec::with_capacity(params.count * originals.len());
    for (i, set) in copies.into_iter().enumerate() {
        for mut copy in set {
            if let Some(scale) = scale {
                scale_in_place(&mut copy, scale, scale);
            }
            stamp(&mut copy, &labels[i], font_range);
            result.push(copy.id.clone());
            if i == 0 {
                if let Some(slot) = scene.get_mut(&copy.id) {
                    *slot = copy;
                }
            } else {
                scene.add(copy);
            }
        }
    }

    log::info!(
        "Duplicated {} element(s) into {} copies",
        originals.len(),
        params.count
    );
    Ok(result)
}

/// Every copy of `element` for the given parameters without touching a
/// scene. Useful for previews.
pub fn preview_positions(element: &Element, params: DuplicateParams) -> Vec<kurbo::Point> {
    let params = params.sanitized();
    let block = visual_bounds(element);
    (0..params.count)
        .map(|i| element.position() + copy_offset(block, params.direction, params.gap, i))
        .collect()
}
