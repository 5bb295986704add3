//! Entry point for embedding UIs: one engine per editor.

use crate::config::EngineConfig;
use crate::context::{InteractionContext, InteractionOutcome};
use crate::drag::{DragFrame, DragSession};
use crate::error::InteractionResult;
use crate::geometry::ResizeDirection;
use crate::host::EditorHost;
use crate::input::{PointerEvent, PointerPhase};
use crate::registry::GeometryRegistry;
use crate::resize::{ResizeFrame, ResizeSession};
use crate::session::SessionCoordinator;
use crate::snap::SnapGuide;
use crate::timers::Instant;
use uuid::Uuid;

#[derive(Debug)]
enum ActiveInteraction {
    Drag(DragSession),
    Resize(ResizeSession),
}

/// What a routed pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionUpdate {
    Drag(DragFrame),
    Resize(ResizeFrame),
    Ended(InteractionOutcome),
}

/// Owns the shared context and runs at most one drag or resize at a time.
#[derive(Debug, Default)]
pub struct InteractionEngine {
    ctx: InteractionContext,
    active: Option<ActiveInteraction>,
}

impl InteractionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            ctx: InteractionContext::new(config),
            active: None,
        }
    }

    /// Start dragging `subject` from a pointer-down. Any running gesture is
    /// finished first, as if its pointer had been cancelled.
    pub fn begin_drag<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        subject: &str,
        event: &PointerEvent,
    ) -> InteractionResult<Uuid> {
        self.finish_active(host, event.time);
        let session = DragSession::begin(&mut self.ctx, host, subject, event)?;
        let id = session.id();
        self.active = Some(ActiveInteraction::Drag(session));
        Ok(id)
    }

    /// Start resizing `subject` from a pointer-down on the `direction` handle.
    pub fn begin_resize<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        subject: &str,
        direction: ResizeDirection,
        event: &PointerEvent,
    ) -> InteractionResult<Uuid> {
        self.finish_active(host, event.time);
        let session = ResizeSession::begin(&mut self.ctx, host, subject, direction, event)?;
        let id = session.id();
        self.active = Some(ActiveInteraction::Resize(session));
        Ok(id)
    }

    /// Route a pointer event to the running gesture.
    ///
    /// Returns `None` when nothing is running, for pointer-downs (gestures
    /// start through `begin_*`), and for frames skipped because the subject
    /// went away.
    pub fn handle_pointer<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: &PointerEvent,
    ) -> Option<InteractionUpdate> {
        match event.phase {
            PointerPhase::Down => None,
            PointerPhase::Move => match self.active.as_mut()? {
                ActiveInteraction::Drag(session) => session
                    .update(&mut self.ctx, host, event)
                    .map(InteractionUpdate::Drag),
                ActiveInteraction::Resize(session) => session
                    .update(&mut self.ctx, host, event)
                    .map(InteractionUpdate::Resize),
            },
            PointerPhase::Up => {
                let outcome = match self.active.take()? {
                    ActiveInteraction::Drag(session) => session.end(&mut self.ctx, host, event),
                    ActiveInteraction::Resize(session) => session.end(&mut self.ctx, host, event),
                };
                Some(InteractionUpdate::Ended(outcome))
            }
            PointerPhase::Cancel => self.finish_active(host, event.time).map(InteractionUpdate::Ended),
        }
    }

    /// End the running gesture with cancel semantics: commit if moved.
    pub fn finish_active<H: EditorHost + ?Sized>(&mut self, host: &mut H, now: Instant) -> Option<InteractionOutcome> {
        let outcome = match self.active.take()? {
            ActiveInteraction::Drag(session) => session.cancel(&mut self.ctx, host, now),
            ActiveInteraction::Resize(session) => session.cancel(&mut self.ctx, host, now),
        };
        Some(outcome)
    }

    /// Run deferred teardown due at `now`.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.ctx.tick(now)
    }

    /// When `tick` next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.ctx.timers.next_deadline()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_subject(&self) -> Option<&str> {
        self.ctx.sessions.active_subject()
    }

    /// Guide lines to render.
    pub fn indicators(&self) -> &[SnapGuide] {
        self.ctx.registry.indicators()
    }

    pub fn registry(&self) -> &GeometryRegistry {
        &self.ctx.registry
    }

    pub fn registry_mut(&mut self) -> &mut GeometryRegistry {
        &mut self.ctx.registry
    }

    pub fn sessions(&self) -> &SessionCoordinator {
        &self.ctx.sessions
    }

    pub fn is_interacting(&self, subject: &str) -> bool {
        self.ctx.sessions.is_interacting(subject)
    }

    pub fn is_recently_committed(&self, subject: &str, now: Instant) -> bool {
        self.ctx.sessions.is_recently_committed(subject, now)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }
}
