//! Boundary to the node editor and the element tree.
//!
//! The engine never touches the DOM or the editor's node store directly.
//! Everything it reads or writes goes through [`EditorHost`], which the
//! embedding UI implements once for all visual component types.

mod memory;

pub use memory::{MemoryElement, MemoryHost, NodeSpec};

use crate::error::HostError;
use crate::geometry::NodeId;
use crate::units::Length;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Opaque reference to a rendered element.
///
/// Only ever read: the registry keeps one per tracked rectangle so stale
/// entries (element unmounted mid-gesture) can be recognised and skipped.
pub trait ElementHandle: fmt::Debug {
    /// Current client rectangle, `None` once the element is gone.
    fn client_rect(&self) -> Option<Rect>;

    fn is_mounted(&self) -> bool {
        self.client_rect().is_some()
    }
}

/// Shared element handle. The engine is single-threaded, so `Rc` suffices.
pub type SharedHandle = Rc<dyn ElementHandle>;

/// CSS `position` value written by commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    #[default]
    Static,
    Relative,
    Absolute,
}

/// A property update for one node. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Positioning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Length>,
}

impl PropertyPatch {
    /// Copy every field set in `other` over this patch.
    pub fn merge(&mut self, other: &PropertyPatch) {
        if other.position.is_some() {
            self.position = other.position;
        }
        if other.left.is_some() {
            self.left = other.left;
        }
        if other.top.is_some() {
            self.top = other.top;
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.height.is_some() {
            self.height = other.height;
        }
    }

    /// Whether every field set in `expected` holds the same value here.
    pub fn contains(&self, expected: &PropertyPatch) -> bool {
        fn field<T: PartialEq>(have: &Option<T>, want: &Option<T>) -> bool {
            want.is_none() || have == want
        }
        field(&self.position, &expected.position)
            && field(&self.left, &expected.left)
            && field(&self.top, &expected.top)
            && field(&self.width, &expected.width)
            && field(&self.height, &expected.height)
    }

    /// Pixel lengths of a live rectangle, as mirrored during a gesture.
    pub fn pixels(origin: Option<Point>, size: Option<Size>) -> Self {
        Self {
            position: None,
            left: origin.map(|p| Length::Px(p.x)),
            top: origin.map(|p| Length::Px(p.y)),
            width: size.map(|s| Length::Px(s.width)),
            height: size.map(|s| Length::Px(s.height)),
        }
    }

    pub fn with_position(mut self, position: Positioning) -> Self {
        self.position = Some(position);
        self
    }
}

/// Inline pixel overrides written for immediate visual feedback.
///
/// Never persisted; cleared once a percentage commit takes over. `left` and
/// `top` are relative to the element's positioned ancestor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveStyle {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub absolute: bool,
}

impl LiveStyle {
    /// Freeze the current size.
    pub fn size(size: Size) -> Self {
        Self {
            width: Some(size.width),
            height: Some(size.height),
            ..Self::default()
        }
    }

    /// Absolute position inside the positioned ancestor.
    pub fn position(origin: Point) -> Self {
        Self {
            left: Some(origin.x),
            top: Some(origin.y),
            absolute: true,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.width = Some(size.width);
        self.height = Some(size.height);
        self
    }

    /// Copy every field set in `other` over this style.
    pub fn merge(&mut self, other: &LiveStyle) {
        if other.left.is_some() {
            self.left = other.left;
        }
        if other.top.is_some() {
            self.top = other.top;
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.height.is_some() {
            self.height = other.height;
        }
        self.absolute |= other.absolute;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Capabilities the engine needs from the editor and its rendered elements.
///
/// All rectangles are in client (viewport) coordinates.
pub trait EditorHost {
    /// Ids of every node currently in the editor tree.
    fn node_ids(&self) -> Vec<NodeId>;

    fn contains(&self, id: &str) -> bool;

    /// Parent node id, `None` for the root.
    fn parent_id(&self, id: &str) -> Option<NodeId>;

    /// Bounds of the node's rendered element, `None` when not mounted.
    fn client_rect(&self, id: &str) -> Option<Rect>;

    /// Bounds of the node's immediate parent element.
    fn parent_rect(&self, id: &str) -> Option<Rect>;

    /// Bounds of the nearest ancestor that establishes the frame for
    /// absolute positioning.
    fn positioned_ancestor_rect(&self, id: &str) -> Option<Rect>;

    /// Bounds of the editor root element.
    fn root_rect(&self) -> Option<Rect>;

    /// Whether the node is currently absolutely positioned.
    fn is_absolute(&self, id: &str) -> bool;

    fn element_handle(&self, id: &str) -> Option<SharedHandle>;

    /// Write inline pixel overrides (merged with earlier ones).
    fn write_live(&mut self, id: &str, style: &LiveStyle);

    /// Drop every inline override so committed properties apply again.
    fn clear_live(&mut self, id: &str);

    /// Apply a property update as one history entry and return what the
    /// store actually holds for the patched fields afterwards.
    fn commit(&mut self, id: &str, patch: &PropertyPatch) -> Result<PropertyPatch, HostError>;
}

/// Whether `id` sits somewhere below `ancestor` in the node tree.
pub fn is_descendant_of<H: EditorHost + ?Sized>(host: &H, id: &str, ancestor: &str) -> bool {
    let mut current = host.parent_id(id);
    // Bounded walk in case a host reports a cyclic tree.
    let mut remaining = host.node_ids().len();
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        if remaining == 0 {
            log::warn!("Parent chain of {} does not terminate", id);
            return false;
        }
        remaining -= 1;
        current = host.parent_id(&parent);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_merge_and_contains() {
        let mut base = PropertyPatch {
            width: Some(Length::Px(100.0)),
            height: Some(Length::Px(80.0)),
            ..Default::default()
        };
        let update = PropertyPatch {
            width: Some(Length::Percent(25.0)),
            ..Default::default()
        }
        .with_position(Positioning::Absolute);

        base.merge(&update);
        assert_eq!(base.width, Some(Length::Percent(25.0)));
        assert_eq!(base.height, Some(Length::Px(80.0)));
        assert!(base.contains(&update));
        assert!(!update.contains(&base));
    }

    #[test]
    fn test_patch_serializes_css_strings() {
        let patch = PropertyPatch {
            left: Some(Length::Percent(37.5)),
            ..Default::default()
        }
        .with_position(Positioning::Absolute);
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"position":"absolute","left":"37.5000%"}"#);
    }

    #[test]
    fn test_live_style_merge() {
        let mut style = LiveStyle::size(Size::new(50.0, 40.0));
        style.merge(&LiveStyle::position(Point::new(10.0, 20.0)));
        assert_eq!(style.left, Some(10.0));
        assert_eq!(style.width, Some(50.0));
        assert!(style.absolute);
        assert!(!style.is_empty());
        assert!(LiveStyle::default().is_empty());
    }
}
