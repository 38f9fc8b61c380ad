//! Ranked list editing for feature lists and team rosters.
//!
//! The sequence itself belongs to the caller. [`ListEditor`] only keeps the
//! new-item input buffer and the in-flight drag gesture; every mutation takes
//! the caller's current items and hands back the sequence to store. A `None`
//! return means nothing was emitted.
//!
//! Read-only rendering goes through [`ListView`], which has no mutating
//! methods at all.

use std::marker::PhantomData;

use shared::domain::{ItemId, ListItem, ListPayload};
use tracing::debug;

/// Transient indices of one drag gesture, cleared when the gesture ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragGesture {
    pub source: Option<usize>,
    pub target: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKey {
    Enter,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome<T> {
    pub emitted: Option<Vec<ListItem<T>>>,
    /// Set when the host must not run its default action (form submit).
    pub prevent_default: bool,
}

#[derive(Debug, Clone)]
pub struct ListEditor<T> {
    input: String,
    drag: DragGesture,
    _payload: PhantomData<T>,
}

impl<T> Default for ListEditor<T> {
    fn default() -> Self {
        Self {
            input: String::new(),
            drag: DragGesture::default(),
            _payload: PhantomData,
        }
    }
}

impl<T: ListPayload> ListEditor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the "add" affordance should be enabled.
    pub fn can_add(&self) -> bool {
        !self.input.trim().is_empty()
    }

    pub fn drag_state(&self) -> DragGesture {
        self.drag
    }

    pub fn add(&mut self, items: &[ListItem<T>], raw_text: &str) -> Option<Vec<ListItem<T>>> {
        let text = raw_text.trim();
        if text.is_empty() {
            return None;
        }
        let mut next = items.to_vec();
        next.push(ListItem::new(text));
        self.input.clear();
        Some(next)
    }

    /// Adds whatever is in the input buffer.
    pub fn submit_input(&mut self, items: &[ListItem<T>]) -> Option<Vec<ListItem<T>>> {
        let raw = self.input.clone();
        self.add(items, &raw)
    }

    pub fn remove(&self, items: &[ListItem<T>], id: &ItemId) -> Vec<ListItem<T>> {
        items.iter().filter(|item| &item.id != id).cloned().collect()
    }

    pub fn drag_start(&mut self, source_index: usize) {
        self.drag.source = Some(source_index);
    }

    pub fn drag_enter(&mut self, target_index: usize) {
        self.drag.target = Some(target_index);
    }

    pub fn drag_end(&mut self, items: &[ListItem<T>]) -> Option<Vec<ListItem<T>>> {
        let gesture = std::mem::take(&mut self.drag);
        let (Some(source), Some(target)) = (gesture.source, gesture.target) else {
            return None;
        };
        if source >= items.len() || target >= items.len() {
            debug!(
                "ordered list: dropping stale drag source={source} target={target} len={}",
                items.len()
            );
            return None;
        }
        let mut next = items.to_vec();
        let moved = next.remove(source);
        next.insert(target, moved);
        Some(next)
    }

    pub fn handle_key(&mut self, key: ListKey, items: &[ListItem<T>]) -> KeyOutcome<T> {
        match key {
            ListKey::Enter => KeyOutcome {
                emitted: self.submit_input(items),
                prevent_default: true,
            },
            ListKey::Other => KeyOutcome {
                emitted: None,
                prevent_default: false,
            },
        }
    }
}

/// Read-only rendering of a ranked list.
#[derive(Debug, Clone, Copy)]
pub struct ListView<'a, T> {
    items: &'a [ListItem<T>],
}

impl<'a, T: ListPayload> ListView<'a, T> {
    pub fn new(items: &'a [ListItem<T>]) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rows with their 1-based rank.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &'a ListItem<T>)> + 'a {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (index + 1, item))
    }

    pub fn labels(&self) -> Vec<&'a str> {
        self.items.iter().map(|item| item.label()).collect()
    }
}

#[cfg(test)]
#[path = "tests/ordered_list_tests.rs"]
mod tests;
