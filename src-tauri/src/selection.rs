use serde::{Deserialize, Serialize};

use crate::document::{ButtonIcon, Document, NodeId, CLASS_PENDING};

/// A selection-change notification: the selected text (empty for a bare
/// caret) and the node the selection is anchored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    pub anchor: NodeId,
}

/// Follows the reader's selection and keeps one element marked as the
/// pending bookmark target.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    text: String,
    pending: Option<String>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_text(&self) -> &str {
        &self.text
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Description to store for a bookmark on `target_id`: the selection, if
    /// one was made inside that element.
    pub fn description_for(&self, target_id: &str) -> Option<&str> {
        (self.pending() == Some(target_id) && !self.text.trim().is_empty()).then_some(self.text.as_str())
    }

    pub fn on_selection_change(&mut self, doc: &mut Document, selection: Option<&Selection>) {
        let Some(selection) = selection else {
            self.text.clear();
            return;
        };
        self.text = selection.text.clone();

        let Some(node) = doc.closest_identified(selection.anchor) else { return };
        let Some(id) = doc.element(node).and_then(|e| e.id.clone()) else { return };
        if self.pending.as_deref() == Some(id.as_str()) {
            return;
        }

        if let Some(previous) = self.pending.take() {
            if let Some(el) = doc.by_id_mut(&previous) {
                el.classes.remove(CLASS_PENDING);
                if !el.is_bookmarked() {
                    el.button = None;
                }
            }
        }
        if let Some(el) = doc.element_mut(node) {
            el.classes.insert(CLASS_PENDING.to_string());
            el.button.get_or_insert(ButtonIcon::Bookmark);
        }
        tracing::debug!(pending = %id, "bookmark target follows selection");
        self.pending = Some(id);
    }
}
