use crate::{
    document::{Document, NodeId, ATTR_VISIBILITY},
    error::{BookmarkError, Result},
};

pub const ONSCREEN: &str = "onscreen";
pub const OFFSCREEN: &str = "offscreen";

/// Tags every identified element `onscreen` or `offscreen`. The viewport is
/// shrunk by `margin` of its height at top and bottom first, so elements
/// only peeking in at an edge stay offscreen. Returns the onscreen count.
pub fn mark_visibility(doc: &mut Document, margin: f64) -> usize {
    let inset = doc.viewport_height * margin.clamp(0.0, 0.5);
    let top = inset;
    let bottom = doc.viewport_height - inset;
    let mut onscreen = 0;
    for element in doc.elements.iter_mut().filter(|e| e.id.is_some()) {
        let visible = element.rect.bottom > top && element.rect.top < bottom;
        if visible {
            onscreen += 1;
        }
        element.set_attr(ATTR_VISIBILITY, if visible { ONSCREEN } else { OFFSCREEN });
    }
    onscreen
}

/// Picks the element a bookmark should point at.
///
/// An explicit identifier wins. Otherwise: the first onscreen element, then
/// the element named by the URL fragment, then the first identified element.
pub fn resolve_target(doc: &Document, explicit: Option<&str>) -> Result<NodeId> {
    if let Some(id) = explicit.filter(|id| !id.is_empty()) {
        return doc.find(id).ok_or_else(|| BookmarkError::ElementNotFound(id.to_string()));
    }
    if let Some((node, _)) = doc.identified().find(|(_, e)| e.attr(ATTR_VISIBILITY) == Some(ONSCREEN)) {
        return Ok(node);
    }
    if let Some(node) = doc.url_fragment().and_then(|f| doc.find(f)) {
        return Ok(node);
    }
    doc.identified().next().map(|(node, _)| node).ok_or(BookmarkError::NoTarget)
}
