//! Layout snapshot: a plain-data copy of the on-screen UI layout
//!
//! The presentation layer captures one snapshot per frame (or on resize)
//! and hands it to the engines, which never query the DOM themselves.

use crate::error::{FireflyError, Result};
use crate::types::{Color, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the drawing surface in pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

/// Stable identifier of a UI element supplied by the presentation layer
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementKey(pub String);

impl ElementKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Axis-aligned rectangle in screen pixels (Y grows downward)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Zero-area rects belong to hidden elements
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Inclusive hit test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Grow by `padding` pixels on every side
    pub fn padded(&self, padding: f32) -> Self {
        Self {
            left: self.left - padding,
            top: self.top - padding,
            width: self.width + padding * 2.0,
            height: self.height + padding * 2.0,
        }
    }
}

/// One element in the snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub key: ElementKey,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Layout box, excluding any transform the engines applied
    pub rect: ScreenRect,
    /// Computed text color, if the presentation layer reports one
    #[serde(default)]
    pub color: Option<Color>,
    /// Ordered sub-letter elements (each also present as its own node)
    #[serde(default)]
    pub letters: Vec<ElementKey>,
}

impl LayoutNode {
    pub fn new(key: impl Into<String>, rect: ScreenRect) -> Self {
        Self {
            key: ElementKey::new(key),
            classes: Vec::new(),
            rect,
            color: None,
            letters: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_letters(mut self, letters: Vec<ElementKey>) -> Self {
        self.letters = letters;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A parsed element selector (`.class` or `#key`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Class(String),
    Key(String),
}

impl Selector {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let valid = |name: &str| {
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if let Some(name) = s.strip_prefix('.') {
            if valid(name) {
                return Ok(Selector::Class(name.to_string()));
            }
        } else if let Some(name) = s.strip_prefix('#') {
            if valid(name) {
                return Ok(Selector::Key(name.to_string()));
            }
        }
        Err(FireflyError::InvalidSelector(s.to_string()))
    }

    pub fn matches(&self, node: &LayoutNode) -> bool {
        match self {
            Selector::Class(class) => node.has_class(class),
            Selector::Key(key) => node.key.as_str() == key,
        }
    }
}

/// The layout of every UI element the engines care about, at one instant
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub nodes: Vec<LayoutNode>,
}

impl LayoutSnapshot {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            nodes: Vec::new(),
        }
    }

    /// Parse a snapshot from a TOML document (`[viewport]` + `[[nodes]]`)
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Insert or replace a node
    pub fn insert(&mut self, node: LayoutNode) {
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.key == node.key) {
            *existing = node;
        } else {
            self.nodes.push(node);
        }
    }

    pub fn with_node(mut self, node: LayoutNode) -> Self {
        self.insert(node);
        self
    }

    pub fn remove(&mut self, key: &ElementKey) -> Option<LayoutNode> {
        let idx = self.nodes.iter().position(|n| &n.key == key)?;
        Some(self.nodes.remove(idx))
    }

    pub fn get(&self, key: &ElementKey) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| &n.key == key)
    }

    pub fn rect(&self, key: &ElementKey) -> Option<ScreenRect> {
        self.get(key).map(|n| n.rect)
    }

    /// All nodes matching a selector, in document order
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = &'a LayoutNode> + 'a {
        self.nodes.iter().filter(move |n| selector.matches(n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parsing() {
        assert_eq!(
            Selector::parse(".band-name").unwrap(),
            Selector::Class("band-name".into())
        );
        assert_eq!(
            Selector::parse("#title").unwrap(),
            Selector::Key("title".into())
        );
        assert!(Selector::parse("div > span").is_err());
        assert!(Selector::parse(".").is_err());
    }

    #[test]
    fn test_select_by_class_in_order() {
        let layout = LayoutSnapshot::new(Viewport::default())
            .with_node(LayoutNode::new("a", ScreenRect::new(0.0, 0.0, 10.0, 10.0)).with_class("band-name"))
            .with_node(LayoutNode::new("b", ScreenRect::new(0.0, 0.0, 10.0, 10.0)).with_class("tagline"))
            .with_node(LayoutNode::new("c", ScreenRect::new(0.0, 0.0, 10.0, 10.0)).with_class("band-name"));

        let sel = Selector::parse(".band-name").unwrap();
        let keys: Vec<_> = layout.select(&sel).map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut layout = LayoutSnapshot::default();
        layout.insert(LayoutNode::new("a", ScreenRect::new(0.0, 0.0, 10.0, 10.0)));
        layout.insert(LayoutNode::new("a", ScreenRect::new(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.rect(&"a".into()).unwrap().left, 5.0);
        assert!(layout.remove(&"a".into()).is_some());
        assert!(layout.is_empty());
    }

    #[test]
    fn test_rect_geometry() {
        let r = ScreenRect::new(10.0, 20.0, 100.0, 40.0);
        assert_eq!(r.center(), Vec2::new(60.0, 40.0));
        let p = r.padded(5.0);
        assert_eq!(p.left, 5.0);
        assert_eq!(p.right(), 115.0);
        assert_eq!(p.bottom(), 65.0);
        assert!(!ScreenRect::new(0.0, 0.0, 0.0, 10.0).is_visible());
        assert!(r.contains(Vec2::new(110.0, 60.0)));
        assert!(!r.contains(Vec2::new(9.0, 30.0)));
    }

    #[test]
    fn test_snapshot_from_toml() {
        let doc = r#"
[viewport]
width = 800
height = 600

[[nodes]]
key = "venue"
classes = ["venue-name"]
rect = { left = 100, top = 50, width = 300, height = 80 }
letters = ["venue-0", "venue-1"]
"#;
        let layout = LayoutSnapshot::from_toml_str(doc).unwrap();
        assert_eq!(layout.viewport.width, 800.0);
        let node = layout.get(&"venue".into()).unwrap();
        assert!(node.has_class("venue-name"));
        assert_eq!(node.letters.len(), 2);
    }
}
