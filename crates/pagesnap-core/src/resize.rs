//! Resize interaction controller.
//!
//! Live bounds are computed in client coordinates and snapped in the editor
//! root's frame. Nothing is written until the pointer has moved past the
//! resize threshold, so a click on a handle leaves the element untouched.

use crate::context::{InteractionContext, InteractionOutcome};
use crate::error::{InteractionError, InteractionResult};
use crate::geometry::{NodeId, ResizeDirection, from_frame, to_frame};
use crate::host::{EditorHost, LiveStyle, Positioning, PropertyPatch};
use crate::input::{PointerEvent, exceeds_threshold};
use crate::session::SessionKind;
use crate::snap::get_resize_snap_position;
use crate::timers::{Instant, Throttle};
use crate::units::percent_of;
use kurbo::{Point, Rect, Size, Vec2};
use uuid::Uuid;

/// Apply a handle drag of `delta` to `origin`.
///
/// Edges the handle does not own keep their coordinates. A moving edge stops
/// where the size would drop below `min` instead of crossing the fixed edge.
/// With `keep_aspect`, corner handles scale both dimensions by the larger
/// of the two requested factors, anchored at the opposite corner.
pub fn resize_rect(origin: Rect, direction: ResizeDirection, delta: Vec2, min: Size, keep_aspect: bool) -> Rect {
    if keep_aspect && direction.is_corner() && origin.width() > 0.0 && origin.height() > 0.0 {
        return resize_keeping_aspect(origin, direction, delta, min);
    }

    let mut rect = origin;
    if direction.moves_left() {
        rect.x0 = (origin.x0 + delta.x).min(origin.x1 - min.width);
    }
    if direction.moves_right() {
        rect.x1 = (origin.x1 + delta.x).max(origin.x0 + min.width);
    }
    if direction.moves_top() {
        rect.y0 = (origin.y0 + delta.y).min(origin.y1 - min.height);
    }
    if direction.moves_bottom() {
        rect.y1 = (origin.y1 + delta.y).max(origin.y0 + min.height);
    }
    rect
}

fn resize_keeping_aspect(origin: Rect, direction: ResizeDirection, delta: Vec2, min: Size) -> Rect {
    let (w, h) = (origin.width(), origin.height());
    let requested_w = if direction.moves_left() { w - delta.x } else { w + delta.x };
    let requested_h = if direction.moves_top() { h - delta.y } else { h + delta.y };
    let scale = (requested_w / w)
        .max(requested_h / h)
        .max(min.width / w)
        .max(min.height / h);
    let size = Size::new(w * scale, h * scale);

    let mut rect = origin;
    if direction.moves_left() {
        rect.x0 = origin.x1 - size.width;
    } else {
        rect.x1 = origin.x0 + size.width;
    }
    if direction.moves_top() {
        rect.y0 = origin.y1 - size.height;
    } else {
        rect.y1 = origin.y0 + size.height;
    }
    rect
}

/// Push the moving edges back out until `rect` is at least `min` in size.
pub fn enforce_min_size(rect: Rect, direction: ResizeDirection, min: Size) -> Rect {
    let mut rect = rect;
    if rect.width() < min.width {
        if direction.moves_left() {
            rect.x0 = rect.x1 - min.width;
        } else if direction.moves_right() {
            rect.x1 = rect.x0 + min.width;
        }
    }
    if rect.height() < min.height {
        if direction.moves_top() {
            rect.y0 = rect.y1 - min.height;
        } else if direction.moves_bottom() {
            rect.y1 = rect.y0 + min.height;
        }
    }
    rect
}

/// Result of one pointer-move frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeFrame {
    pub subject: NodeId,
    /// Live bounds in client coordinates.
    pub bounds: Rect,
    /// Whether the movement threshold has been crossed.
    pub resizing: bool,
    pub snapped: bool,
    pub mirrored: bool,
}

/// One resize gesture on a directional handle.
#[derive(Debug)]
pub struct ResizeSession {
    id: Uuid,
    subject: NodeId,
    direction: ResizeDirection,
    pointer_origin: Point,
    origin: Rect,
    root: Rect,
    /// Frame that live `left`/`top` are written in.
    ancestor: Rect,
    was_absolute: bool,
    keep_aspect: bool,
    significant: bool,
    bounds: Rect,
    mirror: Throttle,
}

impl ResizeSession {
    pub fn begin<H: EditorHost + ?Sized>(
        ctx: &mut InteractionContext,
        host: &mut H,
        subject: &str,
        direction: ResizeDirection,
        event: &PointerEvent,
    ) -> InteractionResult<Self> {
        if !host.contains(subject) {
            return Err(InteractionError::UnknownNode(subject.to_string()));
        }
        let origin = host
            .client_rect(subject)
            .ok_or_else(|| InteractionError::Detached(subject.to_string()))?;
        let root = host
            .root_rect()
            .ok_or_else(|| InteractionError::NoContainer(subject.to_string()))?;
        let ancestor = host.positioned_ancestor_rect(subject).unwrap_or(root);

        ctx.timers.cancel_for(subject);
        ctx.registry.cleanup_tracked_elements();
        ctx.registry.clear_indicators();
        ctx.registry.register_from_host(host, subject, root);
        let id = ctx.sessions.begin_session(subject, SessionKind::Resize, event.time);
        log::debug!("Resize {} ({}) started for {}", id, direction, subject);

        Ok(Self {
            id,
            subject: subject.to_string(),
            direction,
            pointer_origin: event.position,
            origin,
            root,
            ancestor,
            was_absolute: host.is_absolute(subject),
            keep_aspect: ctx.config.keep_aspect_ratio || event.modifiers.shift,
            significant: false,
            bounds: origin,
            mirror: Throttle::new(ctx.config.resize_mirror_interval()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn direction(&self) -> ResizeDirection {
        self.direction
    }

    /// Whether `left`/`top` are written along with the size. Moving a
    /// leading edge takes a flow element out of flow, so its trailing edges
    /// stay where they were.
    fn writes_position(&self) -> bool {
        self.was_absolute || self.direction.moves_leading_edge()
    }

    fn leaves_flow(&self) -> bool {
        !self.was_absolute && self.direction.moves_leading_edge()
    }

    /// Apply a pointer move. Returns `None` when the frame was skipped
    /// because the subject's element is gone.
    pub fn update<H: EditorHost + ?Sized>(
        &mut self,
        ctx: &mut InteractionContext,
        host: &mut H,
        event: &PointerEvent,
    ) -> Option<ResizeFrame> {
        self.step(ctx, host, event, true)
    }

    /// Apply `event`, mirroring into the property store only when `mirror`
    /// is set and the throttle allows it.
    fn step<H: EditorHost + ?Sized>(
        &mut self,
        ctx: &mut InteractionContext,
        host: &mut H,
        event: &PointerEvent,
        mirror: bool,
    ) -> Option<ResizeFrame> {
        if host.client_rect(&self.subject).is_none() {
            log::warn!("Resize subject {} is no longer mounted, skipping frame", self.subject);
            return None;
        }

        let delta = event.delta_from(self.pointer_origin);
        if !self.significant {
            if !exceeds_threshold(delta, ctx.config.resize_threshold) {
                return Some(self.frame(false, false));
            }
            self.significant = true;
        }

        let min = ctx.config.min_size();
        let keep_aspect = self.keep_aspect || event.modifiers.shift;
        let resized = resize_rect(self.origin, self.direction, delta, min, keep_aspect);

        // Aspect-locked corner resizes are never snapped.
        let (intended, snapped) = if keep_aspect && self.direction.is_corner() {
            ctx.registry.clear_indicators();
            (to_frame(resized, self.root), false)
        } else {
            let snap = get_resize_snap_position(
                &ctx.registry,
                &self.subject,
                self.direction,
                to_frame(resized, self.root),
                &ctx.config.snap_options(),
            );
            ctx.registry.set_indicators(&self.subject, snap.guides);
            (snap.bounds, snap.snapped)
        };
        self.bounds = from_frame(enforce_min_size(intended, self.direction, min), self.root);

        let local = to_frame(self.bounds, self.ancestor);
        let mut style = LiveStyle::default().with_size(local.size());
        if self.writes_position() {
            style.left = Some(local.x0);
            style.top = Some(local.y0);
            style.absolute = true;
        }
        host.write_live(&self.subject, &style);

        let mirrored = mirror && self.mirror.ready(event.time);
        if mirrored {
            let origin = self.writes_position().then(|| local.origin());
            let mut patch = PropertyPatch::pixels(origin, Some(local.size()));
            if self.leaves_flow() {
                patch = patch.with_position(Positioning::Absolute);
            }
            if let Err(e) = host.commit(&self.subject, &patch) {
                log::warn!("Failed to mirror resize of {}: {}", self.subject, e);
            }
        }
        log::trace!("Resize {} to {:?}", self.subject, self.bounds);
        Some(self.frame(snapped, mirrored))
    }

    /// Finish on pointer-up at `event`'s position.
    pub fn end<H: EditorHost + ?Sized>(
        mut self,
        ctx: &mut InteractionContext,
        host: &mut H,
        event: &PointerEvent,
    ) -> InteractionOutcome {
        // No pixel mirror on release, only the percentage commit.
        self.step(ctx, host, event, false);
        self.finish(ctx, host, event.time)
    }

    /// Finish without a final pointer position. Commits if the threshold
    /// had been crossed.
    pub fn cancel<H: EditorHost + ?Sized>(
        self,
        ctx: &mut InteractionContext,
        host: &mut H,
        now: Instant,
    ) -> InteractionOutcome {
        log::debug!("Resize {} cancelled for {}", self.id, self.subject);
        self.finish(ctx, host, now)
    }

    fn frame(&self, snapped: bool, mirrored: bool) -> ResizeFrame {
        ResizeFrame {
            subject: self.subject.clone(),
            bounds: self.bounds,
            resizing: self.significant,
            snapped,
            mirrored,
        }
    }

    fn finish<H: EditorHost + ?Sized>(
        self,
        ctx: &mut InteractionContext,
        host: &mut H,
        now: Instant,
    ) -> InteractionOutcome {
        let outcome = if self.significant {
            self.commit(ctx, host, now)
        } else {
            host.clear_live(&self.subject);
            InteractionOutcome::Clicked {
                subject: self.subject.clone(),
            }
        };

        ctx.schedule_teardown(&self.subject, now);
        ctx.sessions.end_session(&self.subject);
        log::debug!("Resize {} ended for {}: {:?}", self.id, self.subject, outcome);
        outcome
    }

    fn commit<H: EditorHost + ?Sized>(&self, ctx: &mut InteractionContext, host: &mut H, now: Instant) -> InteractionOutcome {
        let discarded = || InteractionOutcome::Discarded {
            subject: self.subject.clone(),
        };

        let rect = host.client_rect(&self.subject).unwrap_or(self.bounds);
        // Percentages resolve against the containing block: the positioned
        // ancestor once the element is absolute, the parent while in flow.
        let frame = if self.writes_position() {
            host.positioned_ancestor_rect(&self.subject)
        } else {
            host.parent_rect(&self.subject)
        }
        .or_else(|| host.root_rect())
        .unwrap_or(self.root);
        let local = to_frame(rect, frame);

        let (Some(width), Some(height)) = (
            percent_of(local.width(), frame.width()),
            percent_of(local.height(), frame.height()),
        ) else {
            log::warn!("Container of {} has no usable size, keeping pixel size", self.subject);
            return discarded();
        };
        let mut patch = PropertyPatch {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        };
        if self.writes_position() {
            patch.left = percent_of(local.x0, frame.width());
            patch.top = percent_of(local.y0, frame.height());
        }
        if self.leaves_flow() {
            patch = patch.with_position(Positioning::Absolute);
        }

        let accepted = match host.commit(&self.subject, &patch) {
            Ok(accepted) => accepted,
            Err(e) => {
                log::warn!("Failed to commit resize of {}: {}", self.subject, e);
                return discarded();
            }
        };
        if !accepted.contains(&patch) {
            log::warn!("Resize commit of {} was overwritten, committing again", self.subject);
            match host.commit(&self.subject, &patch) {
                Ok(accepted) if accepted.contains(&patch) => {}
                Ok(_) => log::warn!("Resize commit of {} still not reflected", self.subject),
                Err(e) => log::warn!("Failed to re-commit resize of {}: {}", self.subject, e),
            }
        }

        host.clear_live(&self.subject);
        ctx.sessions.mark_committed(&self.subject, now);
        InteractionOutcome::Committed {
            subject: self.subject.clone(),
            patch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::host::{MemoryHost, NodeSpec};
    use crate::input::{Modifiers, PointerPhase};
    use crate::timers::Duration;
    use crate::units::Length;

    const MIN: Size = Size {
        width: 20.0,
        height: 20.0,
    };

    fn assert_near(actual: f64, expected: f64, what: &str) {
        assert!((actual - expected).abs() < 0.01, "{what}: {actual} != {expected}");
    }

    fn host_with(subject: Bounds) -> MemoryHost {
        MemoryHost::from_specs([
            NodeSpec::new("root", Bounds::new(0.0, 0.0, 1000.0, 1000.0)),
            NodeSpec::new("subject", subject).child_of("root").absolute(),
        ])
    }

    fn flow_host_with(subject: Bounds) -> MemoryHost {
        MemoryHost::from_specs([
            NodeSpec::new("root", Bounds::new(0.0, 0.0, 1000.0, 1000.0)),
            NodeSpec::new("subject", subject).child_of("root"),
        ])
    }

    fn resize(host: &mut MemoryHost, direction: ResizeDirection, delta: Vec2) -> InteractionOutcome {
        let t0 = Instant::now();
        let mut ctx = InteractionContext::default();
        let start = Point::new(500.0, 500.0);
        let down = PointerEvent::mouse(PointerPhase::Down, start, t0);
        let mut session = ResizeSession::begin(&mut ctx, host, "subject", direction, &down).unwrap();
        let end = start + delta;
        session.update(&mut ctx, host, &PointerEvent::mouse(PointerPhase::Move, end, t0 + Duration::from_millis(16)));
        session.end(&mut ctx, host, &PointerEvent::mouse(PointerPhase::Up, end, t0 + Duration::from_millis(32)))
    }

    #[test]
    fn test_resize_rect_fixed_edges() {
        let origin = Rect::new(300.0, 300.0, 400.0, 400.0);
        for direction in ResizeDirection::ALL {
            let dx = if direction.moves_left() { -30.0 } else { 30.0 };
            let dy = if direction.moves_top() { -30.0 } else { 30.0 };
            let rect = resize_rect(origin, direction, Vec2::new(dx, dy), MIN, false);
            if !direction.moves_left() {
                assert_eq!(rect.x0, origin.x0, "{direction} moved left");
            }
            if !direction.moves_right() {
                assert_eq!(rect.x1, origin.x1, "{direction} moved right");
            }
            if !direction.moves_top() {
                assert_eq!(rect.y0, origin.y0, "{direction} moved top");
            }
            if !direction.moves_bottom() {
                assert_eq!(rect.y1, origin.y1, "{direction} moved bottom");
            }
        }
    }

    #[test]
    fn test_resize_rect_min_size_freezes_edge() {
        let origin = Rect::new(300.0, 300.0, 400.0, 400.0);
        let rect = resize_rect(origin, ResizeDirection::E, Vec2::new(-200.0, 0.0), MIN, false);
        assert_eq!(rect, Rect::new(300.0, 300.0, 320.0, 400.0));
        let rect = resize_rect(origin, ResizeDirection::W, Vec2::new(200.0, 0.0), MIN, false);
        assert_eq!(rect, Rect::new(380.0, 300.0, 400.0, 400.0));
        let rect = resize_rect(origin, ResizeDirection::NW, Vec2::new(500.0, 500.0), MIN, false);
        assert_eq!(rect, Rect::new(380.0, 380.0, 400.0, 400.0));
    }

    #[test]
    fn test_resize_rect_keeps_aspect_on_corners() {
        let origin = Rect::new(0.0, 0.0, 100.0, 50.0);
        let rect = resize_rect(origin, ResizeDirection::SE, Vec2::new(50.0, 0.0), MIN, true);
        assert_eq!(rect, Rect::new(0.0, 0.0, 150.0, 75.0));
        let rect = resize_rect(origin, ResizeDirection::NW, Vec2::new(10.0, 10.0), MIN, true);
        assert_eq!(rect, Rect::new(10.0, 5.0, 100.0, 50.0));
        // Edge handles ignore the aspect lock.
        let rect = resize_rect(origin, ResizeDirection::E, Vec2::new(50.0, 0.0), MIN, true);
        assert_eq!(rect, Rect::new(0.0, 0.0, 150.0, 50.0));
    }

    #[test]
    fn test_enforce_min_size() {
        let rect = enforce_min_size(Rect::new(50.0, 0.0, 60.0, 100.0), ResizeDirection::W, MIN);
        assert_eq!(rect, Rect::new(40.0, 0.0, 60.0, 100.0));
        let rect = enforce_min_size(Rect::new(50.0, 0.0, 60.0, 5.0), ResizeDirection::SE, MIN);
        assert_eq!(rect, Rect::new(50.0, 0.0, 70.0, 20.0));
    }

    #[test]
    fn test_resize_se_scenario() {
        let mut host = host_with(Bounds::new(10.0, 10.0, 100.0, 100.0));
        let outcome = resize(&mut host, ResizeDirection::SE, Vec2::new(20.0, 30.0));
        let patch = outcome.patch().unwrap();
        assert_eq!(patch.width, Some(Length::Percent(12.0)));
        assert_eq!(patch.height, Some(Length::Percent(13.0)));
        assert_eq!(patch.left, Some(Length::Percent(1.0)));
        assert_eq!(patch.top, Some(Length::Percent(1.0)));
        assert!(patch.position.is_none());

        let rect = host.client_rect("subject").unwrap();
        assert_near(rect.x0, 10.0, "left");
        assert_near(rect.y0, 10.0, "top");
        assert_near(rect.width(), 120.0, "width");
        assert_near(rect.height(), 130.0, "height");
        assert!(host.live_style("subject").unwrap().is_empty());
    }

    #[test]
    fn test_fixed_edges_after_commit() {
        let origin = Rect::new(300.0, 300.0, 400.0, 400.0);
        for direction in ResizeDirection::ALL {
            let mut host = host_with(origin.into());
            let dx = if direction.moves_left() { -30.0 } else { 30.0 };
            let dy = if direction.moves_top() { -30.0 } else { 30.0 };
            let outcome = resize(&mut host, direction, Vec2::new(dx, dy));
            assert!(outcome.patch().is_some(), "{direction} did not commit");

            let rect = host.client_rect("subject").unwrap();
            if !direction.moves_left() {
                assert_near(rect.x0, origin.x0, "left");
            }
            if !direction.moves_right() {
                assert_near(rect.x1, origin.x1, "right");
            }
            if !direction.moves_top() {
                assert_near(rect.y0, origin.y0, "top");
            }
            if !direction.moves_bottom() {
                assert_near(rect.y1, origin.y1, "bottom");
            }
        }
    }

    #[test]
    fn test_fixed_edges_after_commit_in_flow() {
        let origin = Rect::new(300.0, 300.0, 400.0, 400.0);
        for direction in ResizeDirection::ALL {
            let mut host = flow_host_with(origin.into());
            let dx = if direction.moves_left() { -30.0 } else { 30.0 };
            let dy = if direction.moves_top() { -30.0 } else { 30.0 };
            let outcome = resize(&mut host, direction, Vec2::new(dx, dy));
            let patch = outcome.patch().unwrap();
            if direction.moves_leading_edge() {
                assert_eq!(patch.position, Some(Positioning::Absolute), "{direction}");
                assert!(host.is_absolute("subject"), "{direction} stayed in flow");
            } else {
                assert!(patch.position.is_none(), "{direction}");
                assert!(patch.left.is_none() && patch.top.is_none(), "{direction}");
            }

            let rect = host.client_rect("subject").unwrap();
            if !direction.moves_left() {
                assert_near(rect.x0, origin.x0, "left");
            }
            if !direction.moves_right() {
                assert_near(rect.x1, origin.x1, "right");
            }
            if !direction.moves_top() {
                assert_near(rect.y0, origin.y0, "top");
            }
            if !direction.moves_bottom() {
                assert_near(rect.y1, origin.y1, "bottom");
            }
        }
    }

    #[test]
    fn test_commit_inside_unpositioned_wrapper() {
        let wrapped = |subject: NodeSpec| {
            MemoryHost::from_specs([
                NodeSpec::new("root", Bounds::new(0.0, 0.0, 1000.0, 1000.0)),
                NodeSpec::new("wrap", Bounds::new(100.0, 100.0, 400.0, 400.0)).child_of("root"),
                subject.child_of("wrap"),
            ])
        };

        // Absolute: offsets and size against the positioned ancestor (root).
        let mut host = wrapped(NodeSpec::new("subject", Bounds::new(300.0, 300.0, 100.0, 100.0)).absolute());
        let outcome = resize(&mut host, ResizeDirection::E, Vec2::new(30.0, 0.0));
        let patch = outcome.patch().unwrap();
        assert_eq!(patch.left, Some(Length::Percent(30.0)));
        assert_eq!(patch.width, Some(Length::Percent(13.0)));
        let rect = host.client_rect("subject").unwrap();
        assert_near(rect.x0, 300.0, "left");
        assert_near(rect.y0, 300.0, "top");
        assert_near(rect.x1, 430.0, "right");
        assert_near(rect.y1, 400.0, "bottom");

        // In flow: size against the immediate parent.
        let mut host = wrapped(NodeSpec::new("subject", Bounds::new(150.0, 150.0, 100.0, 100.0)));
        let outcome = resize(&mut host, ResizeDirection::SE, Vec2::new(30.0, 30.0));
        let patch = outcome.patch().unwrap();
        assert_eq!(patch.width, Some(Length::Percent(32.5)));
        assert!(patch.left.is_none());
        let rect = host.client_rect("subject").unwrap();
        assert_near(rect.x0, 150.0, "left");
        assert_near(rect.x1, 280.0, "right");
        assert_near(rect.y1, 280.0, "bottom");
    }

    #[test]
    fn test_min_size_after_commit() {
        let mut host = host_with(Bounds::new(300.0, 300.0, 100.0, 100.0));
        resize(&mut host, ResizeDirection::E, Vec2::new(-200.0, 0.0));
        let rect = host.client_rect("subject").unwrap();
        assert_near(rect.width(), 20.0, "width");
        assert_near(rect.x0, 300.0, "left");

        let mut host = host_with(Bounds::new(300.0, 300.0, 100.0, 100.0));
        resize(&mut host, ResizeDirection::W, Vec2::new(200.0, 0.0));
        let rect = host.client_rect("subject").unwrap();
        assert_near(rect.width(), 20.0, "width");
        assert_near(rect.x1, 400.0, "right");
    }

    #[test]
    fn test_threshold_boundary() {
        let mut host = host_with(Bounds::new(300.0, 300.0, 100.0, 100.0));
        let outcome = resize(&mut host, ResizeDirection::E, Vec2::new(4.0, 0.0));
        assert!(matches!(outcome, InteractionOutcome::Clicked { .. }));
        assert_eq!(host.commit_count("subject"), 0);
        assert_eq!(host.live_write_count(), 0);

        let mut host = host_with(Bounds::new(300.0, 300.0, 100.0, 100.0));
        let outcome = resize(&mut host, ResizeDirection::E, Vec2::new(6.0, 0.0));
        assert_eq!(outcome.patch().unwrap().width, Some(Length::Percent(10.6)));
    }

    #[test]
    fn test_pure_click_writes_nothing() {
        let mut host = host_with(Bounds::new(300.0, 300.0, 100.0, 100.0));
        let outcome = resize(&mut host, ResizeDirection::NW, Vec2::ZERO);
        assert!(outcome.patch().is_none());
        assert_eq!(host.commit_count("subject"), 0);
        assert_eq!(host.live_write_count(), 0);
    }

    #[test]
    fn test_snaps_moving_edge_to_neighbour() {
        let mut host = MemoryHost::from_specs([
            NodeSpec::new("root", Bounds::new(0.0, 0.0, 1000.0, 1000.0)),
            NodeSpec::new("subject", Bounds::new(100.0, 100.0, 100.0, 100.0))
                .child_of("root")
                .absolute(),
            NodeSpec::new("other", Bounds::new(243.0, 400.0, 50.0, 50.0)).child_of("root"),
        ]);
        let outcome = resize(&mut host, ResizeDirection::E, Vec2::new(40.0, 0.0));
        assert_eq!(outcome.patch().unwrap().width, Some(Length::Percent(14.3)));
    }

    #[test]
    fn test_overwritten_commit_is_retried_once() {
        let mut host = host_with(Bounds::new(300.0, 300.0, 100.0, 100.0));
        let t0 = Instant::now();
        let mut ctx = InteractionContext::default();
        let down = PointerEvent::mouse(PointerPhase::Down, Point::ZERO, t0);
        let mut session = ResizeSession::begin(&mut ctx, &mut host, "subject", ResizeDirection::S, &down).unwrap();
        let frame = session
            .update(&mut ctx, &mut host, &PointerEvent::mouse(PointerPhase::Move, Point::new(0.0, 50.0), t0 + Duration::from_millis(10)))
            .unwrap();
        assert!(frame.resizing && frame.mirrored);
        let mirrors = host.commit_count("subject");

        host.overwrite_next_commit(PropertyPatch {
            height: Some(Length::Px(150.0)),
            ..Default::default()
        });
        let outcome = session.end(&mut ctx, &mut host, &PointerEvent::mouse(PointerPhase::Up, Point::new(0.0, 50.0), t0 + Duration::from_millis(20)));

        assert_eq!(host.commit_count("subject"), mirrors + 2);
        assert_eq!(host.props("subject").unwrap().height, Some(Length::Percent(15.0)));
        assert_eq!(outcome.patch().unwrap().height, Some(Length::Percent(15.0)));
    }

    #[test]
    fn test_release_skips_pixel_mirror() {
        let mut host = host_with(Bounds::new(300.0, 300.0, 100.0, 100.0));
        let t0 = Instant::now();
        let mut ctx = InteractionContext::default();
        let down = PointerEvent::mouse(PointerPhase::Down, Point::ZERO, t0);
        let mut session = ResizeSession::begin(&mut ctx, &mut host, "subject", ResizeDirection::E, &down).unwrap();
        let frame = session
            .update(&mut ctx, &mut host, &PointerEvent::mouse(PointerPhase::Move, Point::new(20.0, 0.0), t0 + Duration::from_millis(10)))
            .unwrap();
        assert!(frame.mirrored);

        let up = PointerEvent::mouse(PointerPhase::Up, Point::new(50.0, 0.0), t0 + Duration::from_millis(800));
        let outcome = session.end(&mut ctx, &mut host, &up);
        assert_eq!(host.commit_count("subject"), 2);
        assert_eq!(outcome.patch().unwrap().width, Some(Length::Percent(15.0)));
        let (_, last) = host.commits().last().unwrap();
        assert_eq!(last.width, Some(Length::Percent(15.0)));
    }

    #[test]
    fn test_shift_keeps_aspect() {
        let mut host = host_with(Bounds::new(100.0, 100.0, 200.0, 100.0));
        let t0 = Instant::now();
        let mut ctx = InteractionContext::default();
        let shift = Modifiers {
            shift: true,
            ..Default::default()
        };
        let down = PointerEvent::mouse(PointerPhase::Down, Point::ZERO, t0).with_modifiers(shift);
        let session = ResizeSession::begin(&mut ctx, &mut host, "subject", ResizeDirection::SE, &down).unwrap();
        let up = PointerEvent::mouse(PointerPhase::Up, Point::new(100.0, 10.0), t0 + Duration::from_millis(10));
        let outcome = session.end(&mut ctx, &mut host, &up);
        let patch = outcome.patch().unwrap();
        assert_eq!(patch.width, Some(Length::Percent(30.0)));
        assert_eq!(patch.height, Some(Length::Percent(15.0)));
    }

    #[test]
    fn test_begin_requires_root() {
        let mut host = MemoryHost::from_specs([
            NodeSpec::new("subject", Bounds::new(0.0, 0.0, 50.0, 50.0)).child_of("detached-parent"),
        ]);
        let mut ctx = InteractionContext::default();
        let down = PointerEvent::mouse(PointerPhase::Down, Point::ZERO, Instant::now());
        let err = ResizeSession::begin(&mut ctx, &mut host, "subject", ResizeDirection::E, &down).unwrap_err();
        assert_eq!(err, InteractionError::NoContainer("subject".into()));
        let err = ResizeSession::begin(&mut ctx, &mut host, "ghost", ResizeDirection::E, &down).unwrap_err();
        assert_eq!(err, InteractionError::UnknownNode("ghost".into()));
    }
}
