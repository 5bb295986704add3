//! Geometry registry: tracked rectangles that act as snap targets.

use crate::geometry::{NodeId, to_frame};
use crate::host::{EditorHost, SharedHandle, is_descendant_of};
use crate::snap::SnapGuide;
use kurbo::Rect;
use std::collections::HashMap;

/// Bounds of one element, registered as a snap target.
#[derive(Debug, Clone)]
pub struct TrackedRect {
    pub id: NodeId,
    /// Bounds in the frame of the interaction that registered them.
    pub bounds: Rect,
    /// Live element, used only to notice that it went away.
    pub handle: Option<SharedHandle>,
}

impl TrackedRect {
    /// Whether the element behind this entry has been unmounted.
    pub fn is_stale(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_mounted())
    }
}

/// Table of tracked rectangles plus the guide lines currently on screen.
///
/// Every operation is best-effort: unknown ids are ignored.
#[derive(Debug, Default)]
pub struct GeometryRegistry {
    entries: HashMap<NodeId, TrackedRect>,
    indicators: Vec<SnapGuide>,
    /// Subject whose gesture produced `indicators`.
    indicator_owner: Option<NodeId>,
}

impl GeometryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `id`.
    pub fn register(&mut self, id: impl Into<NodeId>, handle: Option<SharedHandle>, bounds: Rect) {
        let id = id.into();
        self.entries.insert(id.clone(), TrackedRect { id, bounds, handle });
    }

    /// Remove the entry for `id`, if any.
    pub fn unregister(&mut self, id: &str) -> Option<TrackedRect> {
        self.entries.remove(id)
    }

    /// Drop every guide line, leaving tracked rectangles alone.
    pub fn clear_indicators(&mut self) {
        self.indicators.clear();
        self.indicator_owner = None;
    }

    /// Drop the guide lines only if `subject`'s gesture set them.
    /// Returns whether anything was cleared.
    pub fn clear_indicators_for(&mut self, subject: &str) -> bool {
        match self.indicator_owner.as_deref() {
            Some(owner) if owner != subject => {
                log::trace!("Keeping guides of {}, not clearing for {}", owner, subject);
                false
            }
            _ => {
                self.clear_indicators();
                true
            }
        }
    }

    /// Drop every tracked rectangle.
    pub fn cleanup_tracked_elements(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Dropping {} tracked rectangles", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn set_indicators(&mut self, owner: &str, guides: Vec<SnapGuide>) {
        self.indicators = guides;
        self.indicator_owner = Some(owner.to_string());
    }

    /// Guide lines to render.
    pub fn indicators(&self) -> &[SnapGuide] {
        &self.indicators
    }

    pub fn indicator_owner(&self) -> Option<&str> {
        self.indicator_owner.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&TrackedRect> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live snap targets: everything except `exclude` and stale entries,
    /// ordered by id so results do not depend on hash order.
    pub fn candidates(&self, exclude: &str) -> Vec<&TrackedRect> {
        let mut targets: Vec<&TrackedRect> = self
            .entries
            .values()
            .filter(|t| t.id != exclude)
            .filter(|t| {
                let stale = t.is_stale();
                if stale {
                    log::trace!("Skipping stale tracked rectangle {}", t.id);
                }
                !stale
            })
            .collect();
        targets.sort_by(|a, b| a.id.cmp(&b.id));
        targets
    }

    /// Remove entries whose element is gone. Returns how many were removed.
    pub fn prune_unmounted(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, t| !t.is_stale());
        let removed = before - self.entries.len();
        if removed > 0 {
            log::debug!("Pruned {} unmounted tracked rectangles", removed);
        }
        removed
    }

    /// Register every mounted node except `subject` and its descendants, with
    /// bounds expressed relative to `frame`. Returns how many were registered.
    pub fn register_from_host<H: EditorHost + ?Sized>(&mut self, host: &H, subject: &str, frame: Rect) -> usize {
        let mut count = 0;
        for id in host.node_ids() {
            if id == subject || is_descendant_of(host, &id, subject) {
                continue;
            }
            let Some(rect) = host.client_rect(&id) else {
                continue;
            };
            let handle = host.element_handle(&id);
            self.register(id, handle, to_frame(rect, frame));
            count += 1;
        }
        log::debug!("Registered {} snap targets around {}", count, subject);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Axis, Bounds};
    use crate::host::{MemoryHost, NodeSpec};
    use crate::snap::GuideKind;
    use kurbo::Point;

    #[test]
    fn test_register_replaces() {
        let mut registry = GeometryRegistry::new();
        registry.register("a", None, Rect::new(0.0, 0.0, 10.0, 10.0));
        registry.register("a", None, Rect::new(5.0, 5.0, 15.0, 15.0));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().bounds, Rect::new(5.0, 5.0, 15.0, 15.0));
    }

    #[test]
    fn test_unregister_missing_is_noop() {
        let mut registry = GeometryRegistry::new();
        assert!(registry.unregister("nope").is_none());
        registry.cleanup_tracked_elements();
        registry.clear_indicators();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_indicators_survive_cleanup() {
        let mut registry = GeometryRegistry::new();
        registry.register("a", None, Rect::new(0.0, 0.0, 10.0, 10.0));
        registry.set_indicators("s", vec![SnapGuide {
            axis: Axis::X,
            kind: GuideKind::Edge,
            target: "a".into(),
            from: Point::new(0.0, 0.0),
            to: Point::new(0.0, 10.0),
        }]);
        registry.cleanup_tracked_elements();
        assert!(registry.is_empty());
        assert_eq!(registry.indicators().len(), 1);
        registry.clear_indicators();
        assert!(registry.indicators().is_empty());
    }

    #[test]
    fn test_clear_indicators_for_owner_only() {
        let mut registry = GeometryRegistry::new();
        let guide = SnapGuide {
            axis: Axis::Y,
            kind: GuideKind::Center,
            target: "a".into(),
            from: Point::new(0.0, 5.0),
            to: Point::new(10.0, 5.0),
        };
        registry.set_indicators("b", vec![guide]);
        assert!(!registry.clear_indicators_for("a"));
        assert_eq!(registry.indicators().len(), 1);
        assert_eq!(registry.indicator_owner(), Some("b"));

        assert!(registry.clear_indicators_for("b"));
        assert!(registry.indicators().is_empty());
        assert_eq!(registry.indicator_owner(), None);
        assert!(registry.clear_indicators_for("a"));
    }

    #[test]
    fn test_candidates_skip_subject_and_stale() {
        let mut host = MemoryHost::from_specs([
            NodeSpec::new("root", Bounds::new(0.0, 0.0, 500.0, 500.0)),
            NodeSpec::new("a", Bounds::new(10.0, 10.0, 50.0, 50.0)).child_of("root"),
            NodeSpec::new("b", Bounds::new(100.0, 10.0, 50.0, 50.0)).child_of("root"),
            NodeSpec::new("a-child", Bounds::new(20.0, 20.0, 10.0, 10.0)).child_of("a"),
        ]);
        let frame = host.root_rect().unwrap();
        let mut registry = GeometryRegistry::new();
        assert_eq!(registry.register_from_host(&host, "a", frame), 2);
        assert!(registry.get("a").is_none());
        assert!(registry.get("a-child").is_none());

        let ids: Vec<_> = registry.candidates("a").iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["b", "root"]);

        host.unmount("b");
        let ids: Vec<_> = registry.candidates("a").iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["root"]);
        assert_eq!(registry.prune_unmounted(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_from_host_uses_frame() {
        let host = MemoryHost::from_specs([
            NodeSpec::new("root", Bounds::new(0.0, 0.0, 500.0, 500.0)),
            NodeSpec::new("box", Bounds::new(150.0, 120.0, 40.0, 40.0)).child_of("root"),
        ]);
        let mut registry = GeometryRegistry::new();
        registry.register_from_host(&host, "other", Rect::new(100.0, 100.0, 400.0, 400.0));
        assert_eq!(registry.get("box").unwrap().bounds, Rect::new(50.0, 20.0, 90.0, 60.0));
    }
}
