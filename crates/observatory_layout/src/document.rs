//! Laid-out element registry
//!
//! The document owns every mounted element: its stable string key, its
//! bounds in document coordinates and a small attribute map. Observers and
//! trackers refer to elements by [`ElementId`] only; once an element is
//! unmounted its id stops resolving and attribute writes fail with
//! [`LayoutError::UnknownElement`].

use observatory_core::Rect;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::error::{LayoutError, Result};

new_key_type! {
    /// Identity of a mounted element
    pub struct ElementId;
}

/// A mounted element
#[derive(Debug, Clone)]
pub struct ElementNode {
    key: String,
    bounds: Rect,
    attributes: FxHashMap<String, String>,
}

impl ElementNode {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Registry of mounted elements
#[derive(Debug, Default)]
pub struct Document {
    nodes: SlotMap<ElementId, ElementNode>,
    by_key: FxHashMap<String, ElementId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount an element; a key already in use is re-pointed at the new element
    pub fn mount(&mut self, key: impl Into<String>, bounds: Rect) -> ElementId {
        let key = key.into();
        let id = self.nodes.insert(ElementNode {
            key: key.clone(),
            bounds,
            attributes: FxHashMap::default(),
        });
        debug!(%key, ?bounds, "element mounted");
        self.by_key.insert(key, id);
        id
    }

    /// Remove an element, returning its last state
    pub fn unmount(&mut self, id: ElementId) -> Option<ElementNode> {
        let node = self.nodes.remove(id)?;
        if self.by_key.get(&node.key) == Some(&id) {
            self.by_key.remove(&node.key);
        }
        debug!(key = %node.key, "element unmounted");
        Some(node)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        self.nodes.get(id)
    }

    /// Look up an element by key
    pub fn find(&self, key: &str) -> Option<ElementId> {
        self.by_key.get(key).copied()
    }

    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.bounds)
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or(LayoutError::UnknownElement(id))?;
        node.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.nodes.get(id)?.attribute(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Extent of all mounted elements measured from the document origin
    pub fn content_size(&self) -> (f32, f32) {
        self.nodes.values().fold((0.0f32, 0.0f32), |(w, h), node| {
            (w.max(node.bounds.right()), h.max(node.bounds.bottom()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_find_unmount() {
        let mut doc = Document::new();
        let hero = doc.mount("hero", Rect::new(0.0, 0.0, 800.0, 400.0));

        assert_eq!(doc.find("hero"), Some(hero));
        assert_eq!(doc.get(hero).map(|n| n.key()), Some("hero"));

        let node = doc.unmount(hero).unwrap();
        assert_eq!(node.bounds().height, 400.0);
        assert_eq!(doc.find("hero"), None);
        assert!(!doc.contains(hero));
    }

    #[test]
    fn test_attributes() {
        let mut doc = Document::new();
        let id = doc.mount("pipeline", Rect::new(0.0, 400.0, 800.0, 300.0));

        assert_eq!(doc.attribute(id, "data-visible"), None);
        doc.set_attribute(id, "data-visible", "true").unwrap();
        assert_eq!(doc.attribute(id, "data-visible"), Some("true"));
    }

    #[test]
    fn test_write_to_unmounted_element_fails() {
        let mut doc = Document::new();
        let id = doc.mount("team", Rect::default());
        doc.unmount(id);

        assert_eq!(
            doc.set_attribute(id, "data-visible", "true"),
            Err(LayoutError::UnknownElement(id))
        );
    }

    #[test]
    fn test_remounted_key_keeps_latest_element() {
        let mut doc = Document::new();
        let first = doc.mount("hero", Rect::default());
        let second = doc.mount("hero", Rect::default());

        doc.unmount(first);
        assert_eq!(doc.find("hero"), Some(second));
    }

    #[test]
    fn test_content_size() {
        let mut doc = Document::new();
        doc.mount("a", Rect::new(0.0, 0.0, 800.0, 400.0));
        doc.mount("b", Rect::new(0.0, 400.0, 1024.0, 600.0));
        assert_eq!(doc.content_size(), (1024.0, 1000.0));
    }
}
