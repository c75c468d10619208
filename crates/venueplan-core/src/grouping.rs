//! Group, ungroup, merge and unmerge.
//!
//! Containers store their children relative to their own `x,y`. Group and
//! merge absorb the members (in scene order) and append the container on
//! top; ungroup and unmerge append re-identified children in their place.

use crate::elements::{Element, ElementId, ElementKind, IdGenerator};
use crate::error::{EditError, EditResult};
use crate::geometry::{FontRange, merged_outline_path, optimal_font_size, union_bounds};
use crate::scene::Scene;
use kurbo::Vec2;

fn take_members(scene: &mut Scene, ids: &[ElementId]) -> EditResult<Vec<Element>> {
    let actual = scene.collect(ids).len();
    if actual < 2 {
        return Err(EditError::NotEnoughSelected { required: 2, actual });
    }
    Ok(scene.remove(ids))
}

/// Build a container of `kind` around `members` (absolute positions).
fn wrap(kind: ElementKind, members: Vec<Element>, ids: &mut dyn IdGenerator) -> Element {
    let bounds = union_bounds(&members).unwrap_or_default();
    let mut container = Element::create(ids, kind, bounds.x0, bounds.y0, bounds.width(), bounds.height());
    let origin = Vec2::new(bounds.x0, bounds.y0);
    container.children = members
        .into_iter()
        .map(|mut member| {
            member.translate(-origin);
            member
        })
        .collect();
    container
}

/// Group the listed elements. Returns the new group's id.
pub fn group_elements(scene: &mut Scene, ids: &[ElementId], id_gen: &mut dyn IdGenerator) -> EditResult<ElementId> {
    let members = take_members(scene, ids)?;
    let count = members.len();
    let group = wrap(ElementKind::Group, members, id_gen);
    let group_id = group.id.clone();
    scene.add(group);
    log::info!("Grouped {} elements into {}", count, group_id);
    Ok(group_id)
}

fn take_container(scene: &mut Scene, id: &ElementId, expected: ElementKind) -> EditResult<Element> {
    let element = scene.get(id).ok_or_else(|| EditError::UnknownElement(id.clone()))?;
    if element.kind != expected {
        return Err(EditError::WrongKind {
            expected,
            actual: element.kind,
        });
    }
    scene
        .remove(std::slice::from_ref(id))
        .pop()
        .ok_or_else(|| EditError::UnknownElement(id.clone()))
}

/// Dissolve a group. Children come back at absolute positions with fresh
/// ids, in their stored order.
pub fn ungroup_element(scene: &mut Scene, id: &ElementId, id_gen: &mut dyn IdGenerator) -> EditResult<Vec<ElementId>> {
    let group = take_container(scene, id, ElementKind::Group)?;
    let children: Vec<Element> = group
        .absolute_children()
        .iter()
        .map(|child| child.clone_with_fresh_identity(id_gen))
        .collect();
    let child_ids = children.iter().map(|c| c.id.clone()).collect();
    scene.extend(children);
    log::info!("Ungrouped {}", id);
    Ok(child_ids)
}

/// Merge the listed elements into one outlined container. Returns the new
/// container's id.
pub fn merge_elements(
    scene: &mut Scene,
    ids: &[ElementId],
    id_gen: &mut dyn IdGenerator,
    font_range: FontRange,
) -> EditResult<ElementId> {
    let members = take_members(scene, ids)?;

    let text = members
        .iter()
        .filter(|m| m.kind.carries_text())
        .filter_map(|m| m.visible_text())
        .collect::<Vec<_>>()
        .join(" ");
    let border = members
        .iter()
        .find(|m| m.has_border())
        .map(|m| (m.border_width, m.border_color));

    let bounds = union_bounds(&members).unwrap_or_default();
    let outline = merged_outline_path(&members, bounds.x0, bounds.y0);

    let mut merged = wrap(ElementKind::Merged, members, id_gen);
    for child in &mut merged.children {
        child.original_text = child.text.clone();
        if child.kind != ElementKind::Text {
            child.text = None;
        }
    }
    if let Some((width, color)) = border {
        merged.border_width = width;
        merged.border_color = color;
    }
    if !text.is_empty() {
        merged.font_size = Some(optimal_font_size(merged.width, merged.height, &text, font_range));
        merged.text = Some(text);
    }
    merged.outline_path = Some(outline.to_svg());

    let merged_id = merged.id.clone();
    log::info!("Merged {} elements into {}", merged.children.len(), merged_id);
    scene.add(merged);
    Ok(merged_id)
}

/// Split a merged container back into its children.
///
/// Each child gets its pre-merge text back. A fill or border set on the
/// container overrides the child's own.
pub fn unmerge_element(scene: &mut Scene, id: &ElementId, id_gen: &mut dyn IdGenerator) -> EditResult<Vec<ElementId>> {
    let merged = take_container(scene, id, ElementKind::Merged)?;
    let children: Vec<Element> = merged
        .absolute_children()
        .into_iter()
        .map(|mut child| {
            restore_text(&mut child);
            if !merged.color.is_transparent() {
                child.color = merged.color;
            }
            if merged.has_border() {
                child.border_width = merged.border_width;
                child.border_color = merged.border_color;
            }
            child.clone_with_fresh_identity(id_gen)
        })
        .collect();
    let child_ids = children.iter().map(|c| c.id.clone()).collect();
    scene.extend(children);
    log::info!("Unmerged {}", id);
    Ok(child_ids)
}

fn restore_text(child: &mut Element) {
    if let Some(original) = child.original_text.take() {
        child.text = Some(original);
    }
}

/// Replace a container holding exactly one non-container child with that
/// child at its absolute position. Anything else is returned unchanged.
///
/// Layouts and library entries written by older clients wrap single
/// elements this way.
pub fn unwrap_singleton(element: Element) -> Element {
    let is_singleton = element.is_container()
        && element.children.len() == 1
        && !element.children[0].is_container();
    if !is_singleton {
        return element;
    }

    let mut child = element.absolute_children().remove(0);
    restore_text(&mut child);
    log::debug!("Unwrapped single-child {} {}", element.kind, element.id);
    child
}
