//! State shared by the drag and resize controllers.

use crate::config::EngineConfig;
use crate::geometry::NodeId;
use crate::host::PropertyPatch;
use crate::registry::GeometryRegistry;
use crate::session::SessionCoordinator;
use crate::timers::{DeferredTask, Instant, TimerQueue};
use serde::Serialize;

/// Registry, coordinator and timers, owned together and handed to whichever
/// controller runs the current gesture.
#[derive(Debug)]
pub struct InteractionContext {
    pub config: EngineConfig,
    pub registry: GeometryRegistry,
    pub sessions: SessionCoordinator,
    pub timers: TimerQueue,
}

impl InteractionContext {
    pub fn new(config: EngineConfig) -> Self {
        let sessions = SessionCoordinator::new(config.commit_cooldown());
        Self {
            config,
            registry: GeometryRegistry::new(),
            sessions,
            timers: TimerQueue::new(),
        }
    }

    /// Run deferred tasks due at `now`. Returns how many ran.
    ///
    /// Tasks that come due while a gesture is active are dropped: that
    /// gesture re-registered its own targets and schedules its own teardown.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.sessions.prune_expired(now);
        let due = self.timers.take_due(now);
        if due.is_empty() {
            return 0;
        }
        if let Some(active) = self.sessions.active_subject() {
            log::debug!("Dropping {} deferred tasks during session for {}", due.len(), active);
            return 0;
        }
        for (subject, task) in &due {
            log::trace!("Running {:?} for {}", task, subject);
            match task {
                DeferredTask::ClearIndicators => {
                    self.registry.clear_indicators_for(subject);
                }
                DeferredTask::CleanupTracked => self.registry.cleanup_tracked_elements(),
            }
        }
        due.len()
    }

    /// Schedule the post-gesture teardown for `subject`.
    pub fn schedule_teardown(&mut self, subject: &str, now: Instant) {
        self.timers.schedule(
            subject,
            DeferredTask::ClearIndicators,
            now + self.config.indicator_clear_delay(),
        );
        self.timers
            .schedule(subject, DeferredTask::CleanupTracked, now + self.config.cleanup_delay());
    }
}

impl Default for InteractionContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum InteractionOutcome {
    /// Released without crossing the movement threshold. Nothing was written.
    Clicked { subject: NodeId },
    /// Final position or size committed in percentage units.
    Committed { subject: NodeId, patch: PropertyPatch },
    /// Moved, but the final values could not be expressed as percentages.
    /// The inline pixel values stay in place.
    Discarded { subject: NodeId },
}

impl InteractionOutcome {
    pub fn subject(&self) -> &str {
        match self {
            Self::Clicked { subject } | Self::Committed { subject, .. } | Self::Discarded { subject } => subject,
        }
    }

    pub fn patch(&self) -> Option<&PropertyPatch> {
        match self {
            Self::Committed { patch, .. } => Some(patch),
            _ => None,
        }
    }
}
