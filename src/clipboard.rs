//! Copy, cut and paste of selected entities.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use tracing::debug;
use uuid::Uuid;

use crate::doc::{Entity, EntityId, EntityStore};

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Vec<Entity>,
}

impl Clipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the clipboard with copies of the selected entities, in draw
    /// order (shapes, then measurements). Returns the number copied. An
    /// empty selection leaves the clipboard untouched.
    pub fn copy(&mut self, store: &EntityStore) -> usize {
        let selection = store.selection();
        if selection.is_empty() {
            return 0;
        }
        let shapes = store
            .shapes()
            .iter()
            .filter(|s| selection.contains(&s.id))
            .cloned()
            .map(Entity::Shape);
        let measurements = store
            .measurements()
            .iter()
            .filter(|m| selection.contains(&m.id))
            .cloned()
            .map(Entity::Measurement);
        self.items = shapes.chain(measurements).collect();
        debug!(count = self.items.len(), "copied to clipboard");
        self.items.len()
    }

    /// Copy, then delete the selection. Returns the deleted ids.
    pub fn cut(&mut self, store: &mut EntityStore) -> Vec<EntityId> {
        if self.copy(store) == 0 {
            return Vec::new();
        }
        store.delete_selected()
    }

    /// Insert fresh copies of every item onto `page_index`, moved by
    /// `(offset, offset)`, and select them. The clipboard is left intact so
    /// paste can repeat. An empty clipboard changes nothing.
    pub fn paste(&self, store: &mut EntityStore, page_index: usize, offset: f64) -> Vec<EntityId> {
        if self.items.is_empty() {
            return Vec::new();
        }
        let mut ids = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let id = match item {
                Entity::Shape(s) => {
                    let mut copy = s.translated(offset, offset);
                    copy.id = Uuid::new_v4();
                    copy.page_index = page_index;
                    store.add_shape(copy)
                }
                Entity::Measurement(m) => {
                    let mut copy = m.translated(offset, offset);
                    copy.id = Uuid::new_v4();
                    copy.page_index = page_index;
                    store.add_measurement(copy)
                }
            };
            ids.push(id);
        }
        store.set_selection(ids.iter().copied());
        debug!(count = ids.len(), page_index, "pasted from clipboard");
        ids
    }
}
