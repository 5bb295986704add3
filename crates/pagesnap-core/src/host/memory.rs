//! In-memory host implementation.

use super::{EditorHost, ElementHandle, LiveStyle, Positioning, PropertyPatch, SharedHandle};
use crate::error::HostError;
use crate::geometry::{Bounds, NodeId};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Declarative description of one node, as used by scenes and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Client rectangle of the rendered element.
    pub bounds: Bounds,
    #[serde(default)]
    pub absolute: bool,
    /// Establishes the frame for absolutely positioned descendants.
    #[serde(default)]
    pub positioned: bool,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, bounds: Bounds) -> Self {
        Self {
            id: id.into(),
            parent: None,
            bounds,
            absolute: false,
            positioned: false,
        }
    }

    pub fn child_of(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }

    pub fn positioned(mut self) -> Self {
        self.positioned = true;
        self
    }
}

/// Element handle backed by a shared cell; reads `None` once unmounted.
#[derive(Debug)]
pub struct MemoryElement {
    rect: Cell<Option<Rect>>,
}

impl ElementHandle for MemoryElement {
    fn client_rect(&self) -> Option<Rect> {
        self.rect.get()
    }
}

#[derive(Debug)]
struct MemoryNode {
    parent: Option<NodeId>,
    element: Rc<MemoryElement>,
    /// Rectangle produced by committed properties and normal flow.
    layout: Rect,
    live: LiveStyle,
    absolute: bool,
    positioned: bool,
    props: PropertyPatch,
    mounted: bool,
}

/// Node tree kept in memory, for tests and headless replay.
///
/// Inline overrides and commits re-lay out only the node they target;
/// descendants are not reflowed.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: HashMap<NodeId, MemoryNode>,
    order: Vec<NodeId>,
    commits: Vec<(NodeId, PropertyPatch)>,
    live_writes: usize,
    pending_overwrite: Option<PropertyPatch>,
}

impl MemoryHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a host from node specs, in order.
    pub fn from_specs(specs: impl IntoIterator<Item = NodeSpec>) -> Self {
        let mut host = Self::new();
        for spec in specs {
            host.insert(spec);
        }
        host
    }

    /// Insert or replace a node.
    pub fn insert(&mut self, spec: NodeSpec) {
        let rect = Rect::from(spec.bounds);
        if !self.nodes.contains_key(&spec.id) {
            self.order.push(spec.id.clone());
        }
        self.nodes.insert(
            spec.id,
            MemoryNode {
                parent: spec.parent,
                element: Rc::new(MemoryElement {
                    rect: Cell::new(Some(rect)),
                }),
                layout: rect,
                live: LiveStyle::default(),
                absolute: spec.absolute,
                positioned: spec.positioned,
                props: PropertyPatch::default(),
                mounted: true,
            },
        );
    }

    /// Remove a node's element from the page. Existing handles go stale.
    pub fn unmount(&mut self, id: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.mounted = false;
            node.element.rect.set(None);
        }
    }

    /// Move a node's laid-out rectangle, as a reflow would.
    pub fn set_bounds(&mut self, id: &str, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.layout = rect;
        }
        self.refresh(id);
    }

    /// Committed properties of a node.
    pub fn props(&self, id: &str) -> Option<&PropertyPatch> {
        self.nodes.get(id).map(|n| &n.props)
    }

    /// Current inline overrides of a node.
    pub fn live_style(&self, id: &str) -> Option<LiveStyle> {
        self.nodes.get(id).map(|n| n.live)
    }

    /// Every commit received, in order.
    pub fn commits(&self) -> &[(NodeId, PropertyPatch)] {
        &self.commits
    }

    /// Number of commits received for one node.
    pub fn commit_count(&self, id: &str) -> usize {
        self.commits.iter().filter(|(n, _)| n == id).count()
    }

    pub fn live_write_count(&self) -> usize {
        self.live_writes
    }

    /// Simulate another writer clobbering the next commit right after it lands.
    pub fn overwrite_next_commit(&mut self, patch: PropertyPatch) {
        self.pending_overwrite = Some(patch);
    }

    fn refresh(&self, id: &str) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.mounted {
            return;
        }
        let frame = self.positioned_ancestor_rect(id).unwrap_or(Rect::ZERO);
        let origin = Point::new(
            node.live.left.map_or(node.layout.x0, |l| frame.x0 + l),
            node.live.top.map_or(node.layout.y0, |t| frame.y0 + t),
        );
        let size = Size::new(
            node.live.width.unwrap_or(node.layout.width()),
            node.live.height.unwrap_or(node.layout.height()),
        );
        node.element.rect.set(Some(Rect::from_origin_size(origin, size)));
    }
}

/// Rectangle implied by committed properties, falling back to `current`.
fn layout_from_props(current: Rect, props: &PropertyPatch, absolute: bool, frame: Rect, size_frame: Rect) -> Rect {
    let mut origin = current.origin();
    if absolute {
        if let Some(left) = props.left {
            origin.x = frame.x0 + left.to_pixels(frame.width());
        }
        if let Some(top) = props.top {
            origin.y = frame.y0 + top.to_pixels(frame.height());
        }
    }
    let size = Size::new(
        props.width.map_or(current.width(), |w| w.to_pixels(size_frame.width())),
        props.height.map_or(current.height(), |h| h.to_pixels(size_frame.height())),
    );
    Rect::from_origin_size(origin, size)
}

/// The fields of `props` that `shape` sets.
fn project(props: &PropertyPatch, shape: &PropertyPatch) -> PropertyPatch {
    PropertyPatch {
        position: shape.position.and(props.position),
        left: shape.left.and(props.left),
        top: shape.top.and(props.top),
        width: shape.width.and(props.width),
        height: shape.height.and(props.height),
    }
}

impl EditorHost for MemoryHost {
    fn node_ids(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn parent_id(&self, id: &str) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent.clone())
    }

    fn client_rect(&self, id: &str) -> Option<Rect> {
        self.nodes.get(id).and_then(|n| n.element.client_rect())
    }

    fn parent_rect(&self, id: &str) -> Option<Rect> {
        self.parent_id(id).and_then(|p| self.client_rect(&p))
    }

    fn positioned_ancestor_rect(&self, id: &str) -> Option<Rect> {
        let mut current = self.parent_id(id);
        let mut remaining = self.order.len();
        while let Some(parent_id) = current {
            let parent = self.nodes.get(&parent_id)?;
            if parent.positioned || parent.absolute || parent.parent.is_none() {
                return parent.element.client_rect();
            }
            if remaining == 0 {
                return None;
            }
            remaining -= 1;
            current = parent.parent.clone();
        }
        None
    }

    fn root_rect(&self) -> Option<Rect> {
        self.order
            .iter()
            .find(|id| self.nodes.get(*id).is_some_and(|n| n.parent.is_none()))
            .and_then(|id| self.client_rect(id))
    }

    fn is_absolute(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| n.absolute)
    }

    fn element_handle(&self, id: &str) -> Option<SharedHandle> {
        self.nodes
            .get(id)
            .map(|n| n.element.clone() as SharedHandle)
    }

    fn write_live(&mut self, id: &str, style: &LiveStyle) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.live.merge(style);
            self.live_writes += 1;
        }
        self.refresh(id);
    }

    fn clear_live(&mut self, id: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.live = LiveStyle::default();
        }
        self.refresh(id);
    }

    fn commit(&mut self, id: &str, patch: &PropertyPatch) -> Result<PropertyPatch, HostError> {
        if !self.nodes.contains_key(id) {
            return Err(HostError::NotFound(id.to_string()));
        }
        let frame = self.positioned_ancestor_rect(id).unwrap_or(Rect::ZERO);
        let parent_frame = self.parent_rect(id).unwrap_or(frame);
        let overwrite = self.pending_overwrite.take();

        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| HostError::NotFound(id.to_string()))?;
        node.props.merge(patch);
        if let Some(overwrite) = &overwrite {
            node.props.merge(overwrite);
        }
        if let Some(position) = node.props.position {
            node.absolute = position == Positioning::Absolute;
        }
        let size_frame = if node.absolute { frame } else { parent_frame };
        node.layout = layout_from_props(node.layout, &node.props, node.absolute, frame, size_frame);
        let accepted = project(&node.props, patch);

        self.commits.push((id.to_string(), patch.clone()));
        self.refresh(id);
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Length;

    fn host() -> MemoryHost {
        MemoryHost::from_specs([
            NodeSpec::new("root", Bounds::new(0.0, 0.0, 1000.0, 800.0)),
            NodeSpec::new("section", Bounds::new(100.0, 100.0, 400.0, 300.0))
                .child_of("root")
                .positioned(),
            NodeSpec::new("card", Bounds::new(120.0, 130.0, 100.0, 50.0)).child_of("section"),
        ])
    }

    #[test]
    fn test_tree_queries() {
        let host = host();
        assert_eq!(host.node_ids(), vec!["root", "section", "card"]);
        assert_eq!(host.parent_id("card").as_deref(), Some("section"));
        assert_eq!(host.root_rect(), Some(Rect::new(0.0, 0.0, 1000.0, 800.0)));
        assert_eq!(host.positioned_ancestor_rect("card"), Some(Rect::new(100.0, 100.0, 500.0, 400.0)));
        assert_eq!(host.positioned_ancestor_rect("section"), host.root_rect());
        assert_eq!(host.positioned_ancestor_rect("root"), None);
        assert!(super::super::is_descendant_of(&host, "card", "root"));
        assert!(!super::super::is_descendant_of(&host, "root", "card"));
    }

    #[test]
    fn test_live_style_overrides_layout() {
        let mut host = host();
        host.write_live("card", &LiveStyle::position(Point::new(50.0, 60.0)));
        assert_eq!(host.client_rect("card"), Some(Rect::new(150.0, 160.0, 250.0, 210.0)));
        host.clear_live("card");
        assert_eq!(host.client_rect("card"), Some(Rect::new(120.0, 130.0, 220.0, 180.0)));
        assert!(host.commits().is_empty());
    }

    #[test]
    fn test_commit_percentages_lay_out() {
        let mut host = host();
        let patch = PropertyPatch {
            left: Some(Length::Percent(25.0)),
            top: Some(Length::Percent(50.0)),
            width: Some(Length::Percent(25.0)),
            ..Default::default()
        }
        .with_position(Positioning::Absolute);
        let accepted = host.commit("card", &patch).unwrap();
        assert_eq!(accepted, patch);
        assert!(host.is_absolute("card"));
        assert_eq!(host.client_rect("card"), Some(Rect::new(200.0, 250.0, 300.0, 300.0)));
        assert_eq!(host.commit_count("card"), 1);
    }

    #[test]
    fn test_overwritten_commit_reports_store_value() {
        let mut host = host();
        host.overwrite_next_commit(PropertyPatch {
            width: Some(Length::Px(100.0)),
            ..Default::default()
        });
        let patch = PropertyPatch {
            width: Some(Length::Percent(30.0)),
            ..Default::default()
        };
        let accepted = host.commit("card", &patch).unwrap();
        assert_eq!(accepted.width, Some(Length::Px(100.0)));
        assert!(!accepted.contains(&patch));
    }

    #[test]
    fn test_unmount_makes_handle_stale() {
        let mut host = host();
        let handle = host.element_handle("card").unwrap();
        assert!(handle.is_mounted());
        host.unmount("card");
        assert!(!handle.is_mounted());
        assert_eq!(host.client_rect("card"), None);
    }

    #[test]
    fn test_commit_unknown_node() {
        let mut host = host();
        let err = host.commit("ghost", &PropertyPatch::default()).unwrap_err();
        assert_eq!(err, HostError::NotFound("ghost".to_string()));
    }
}
