//! Drag interaction controller.
//!
//! Moves an element inside its positioned ancestor. Positions are tracked in
//! the ancestor's frame, written live as pixels while the pointer moves, and
//! committed as percentages of the ancestor on release.

use crate::context::{InteractionContext, InteractionOutcome};
use crate::error::{InteractionError, InteractionResult};
use crate::geometry::{NodeId, to_frame};
use crate::host::{EditorHost, LiveStyle, Positioning, PropertyPatch};
use crate::input::{PointerEvent, exceeds_threshold};
use crate::session::SessionKind;
use crate::snap::get_snap_position;
use crate::timers::{Instant, Throttle};
use crate::units::percent_of;
use kurbo::{Point, Rect, Size};
use uuid::Uuid;

/// Result of one pointer-move frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DragFrame {
    pub subject: NodeId,
    /// Live position in the ancestor's frame, after snapping and clamping.
    pub position: Point,
    pub snapped: bool,
    pub has_moved: bool,
    /// Whether this frame's position was mirrored into the property store.
    pub mirrored: bool,
}

/// One drag gesture, from pointer-down to release.
#[derive(Debug)]
pub struct DragSession {
    id: Uuid,
    subject: NodeId,
    pointer_origin: Point,
    /// Subject position in the ancestor's frame at gesture start.
    origin: Point,
    size: Size,
    ancestor: Rect,
    was_absolute: bool,
    has_moved: bool,
    position: Point,
    mirror: Throttle,
}

impl DragSession {
    /// Start dragging `subject`.
    ///
    /// Registers every other mounted element as a snap target in the
    /// ancestor's frame and freezes the subject's current size.
    pub fn begin<H: EditorHost + ?Sized>(
        ctx: &mut InteractionContext,
        host: &mut H,
        subject: &str,
        event: &PointerEvent,
    ) -> InteractionResult<Self> {
        if !host.contains(subject) {
            return Err(InteractionError::UnknownNode(subject.to_string()));
        }
        let rect = host
            .client_rect(subject)
            .ok_or_else(|| InteractionError::Detached(subject.to_string()))?;
        let ancestor = host
            .positioned_ancestor_rect(subject)
            .or_else(|| host.root_rect())
            .ok_or_else(|| InteractionError::NoContainer(subject.to_string()))?;

        ctx.timers.cancel_for(subject);
        ctx.registry.cleanup_tracked_elements();
        ctx.registry.clear_indicators();
        ctx.registry.register_from_host(host, subject, ancestor);
        let id = ctx.sessions.begin_session(subject, SessionKind::Drag, event.time);

        let origin = to_frame(rect, ancestor).origin();
        host.write_live(subject, &LiveStyle::size(rect.size()));
        log::debug!("Drag {} started for {} at {:?}", id, subject, origin);

        Ok(Self {
            id,
            subject: subject.to_string(),
            pointer_origin: event.position,
            origin,
            size: rect.size(),
            ancestor,
            was_absolute: host.is_absolute(subject),
            has_moved: false,
            position: origin,
            mirror: Throttle::new(ctx.config.drag_mirror_interval()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Apply a pointer move. Returns `None` when the frame was skipped
    /// because the subject's element is gone.
    pub fn update<H: EditorHost + ?Sized>(
        &mut self,
        ctx: &mut InteractionContext,
        host: &mut H,
        event: &PointerEvent,
    ) -> Option<DragFrame> {
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
    ) -> Option<DragFrame> {
        if host.client_rect(&self.subject).is_none() {
            log::warn!("Drag subject {} is no longer mounted, skipping frame", self.subject);
            return None;
        }

        let delta = event.delta_from(self.pointer_origin);
        if !self.has_moved && exceeds_threshold(delta, ctx.config.drag_threshold) {
            self.has_moved = true;
        }
        if !self.has_moved {
            return Some(self.frame(false, false));
        }

        let snap = get_snap_position(
            &ctx.registry,
            &self.subject,
            self.origin + delta,
            self.size,
            &ctx.config.snap_options(),
        );
        let max_x = (self.ancestor.width() - self.size.width).max(0.0);
        let max_y = (self.ancestor.height() - self.size.height).max(0.0);
        self.position = Point::new(snap.position.x.clamp(0.0, max_x), snap.position.y.clamp(0.0, max_y));
        let snapped = snap.is_snapped();
        ctx.registry.set_indicators(&self.subject, snap.guides);

        host.write_live(&self.subject, &LiveStyle::position(self.position));

        let mirrored = mirror && self.mirror.ready(event.time);
        if mirrored {
            let patch = PropertyPatch::pixels(Some(self.position), None).with_position(Positioning::Absolute);
            if let Err(e) = host.commit(&self.subject, &patch) {
                log::warn!("Failed to mirror drag position of {}: {}", self.subject, e);
            }
        }
        log::trace!("Drag {} at {:?}", self.subject, self.position);
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

    /// Finish without a final pointer position (pointercancel, blur).
    /// Commits if the pointer had moved, like a release would.
    pub fn cancel<H: EditorHost + ?Sized>(
        self,
        ctx: &mut InteractionContext,
        host: &mut H,
        now: Instant,
    ) -> InteractionOutcome {
        log::debug!("Drag {} cancelled for {}", self.id, self.subject);
        self.finish(ctx, host, now)
    }

    fn frame(&self, snapped: bool, mirrored: bool) -> DragFrame {
        DragFrame {
            subject: self.subject.clone(),
            position: self.position,
            snapped,
            has_moved: self.has_moved,
            mirrored,
        }
    }

    fn finish<H: EditorHost + ?Sized>(
        self,
        ctx: &mut InteractionContext,
        host: &mut H,
        now: Instant,
    ) -> InteractionOutcome {
        let outcome = if self.has_moved {
            self.commit(ctx, host, now)
        } else {
            host.clear_live(&self.subject);
            InteractionOutcome::Clicked {
                subject: self.subject.clone(),
            }
        };

        ctx.schedule_teardown(&self.subject, now);
        ctx.sessions.end_session(&self.subject);
        log::debug!("Drag {} ended for {}: {:?}", self.id, self.subject, outcome);
        outcome
    }

    fn commit<H: EditorHost + ?Sized>(&self, ctx: &mut InteractionContext, host: &mut H, now: Instant) -> InteractionOutcome {
        let discarded = || InteractionOutcome::Discarded {
            subject: self.subject.clone(),
        };

        let ancestor = host
            .positioned_ancestor_rect(&self.subject)
            .or_else(|| host.root_rect())
            .unwrap_or(self.ancestor);
        let position = host
            .client_rect(&self.subject)
            .map(|rect| to_frame(rect, ancestor).origin())
            .unwrap_or(self.position);

        let (Some(left), Some(top)) = (
            percent_of(position.x, ancestor.width()),
            percent_of(position.y, ancestor.height()),
        ) else {
            log::warn!("Container of {} has no usable size, keeping pixel position", self.subject);
            return discarded();
        };

        let mut patch = PropertyPatch {
            left: Some(left),
            top: Some(top),
            ..Default::default()
        }
        .with_position(Positioning::Absolute);

        let floor = ctx.config.reasonable_size_floor;
        if self.was_absolute || (self.size.width > floor && self.size.height > floor) {
            patch.width = percent_of(self.size.width, ancestor.width());
            patch.height = percent_of(self.size.height, ancestor.height());
        }

        match host.commit(&self.subject, &patch) {
            Ok(_) => {
                host.clear_live(&self.subject);
                ctx.sessions.mark_committed(&self.subject, now);
                InteractionOutcome::Committed {
                    subject: self.subject.clone(),
                    patch,
                }
            }
            Err(e) => {
                log::warn!("Failed to commit drag of {}: {}", self.subject, e);
                discarded()
            }
        }
    }
}
