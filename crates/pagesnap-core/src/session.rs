//! Session coordinator shared by the interaction controllers and sibling
//! systems (e.g. container reparenting) that must stay out of the way of an
//! ongoing or just-finished gesture.

use crate::geometry::NodeId;
use crate::timers::{Duration, Instant};
use std::collections::HashMap;
use uuid::Uuid;

/// Which controller owns a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Drag,
    Resize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub id: Uuid,
    pub subject: NodeId,
    pub kind: SessionKind,
    pub started: Instant,
}

/// Tracks the one active interaction and the per-subject commit cooldowns.
#[derive(Debug)]
pub struct SessionCoordinator {
    active: Option<ActiveSession>,
    committed: HashMap<NodeId, Instant>,
    cooldown: Duration,
}

impl SessionCoordinator {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            active: None,
            committed: HashMap::new(),
            cooldown,
        }
    }

    /// Start a session for `subject`, replacing any active one.
    pub fn begin_session(&mut self, subject: &str, kind: SessionKind, now: Instant) -> Uuid {
        if let Some(previous) = &self.active {
            log::debug!("Session {} for {} replaced", previous.id, previous.subject);
        }
        let id = Uuid::new_v4();
        self.active = Some(ActiveSession {
            id,
            subject: subject.to_string(),
            kind,
            started: now,
        });
        id
    }

    /// End the session for `subject`. Returns false if it was not active.
    pub fn end_session(&mut self, subject: &str) -> bool {
        match &self.active {
            Some(session) if session.subject == subject => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn active_subject(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.subject.as_str())
    }

    /// Whether `subject` is being dragged or resized right now.
    pub fn is_interacting(&self, subject: &str) -> bool {
        self.active_subject() == Some(subject)
    }

    /// Whether `subject` is being dragged right now.
    pub fn is_dragging(&self, subject: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|s| s.subject == subject && s.kind == SessionKind::Drag)
    }

    /// Record a commit for `subject`, starting its cooldown.
    pub fn mark_committed(&mut self, subject: &str, now: Instant) {
        self.committed.insert(subject.to_string(), now);
    }

    /// Whether `subject` was committed less than the cooldown ago.
    pub fn is_recently_committed(&self, subject: &str, now: Instant) -> bool {
        self.committed
            .get(subject)
            .is_some_and(|at| now.saturating_duration_since(*at) < self.cooldown)
    }

    /// Forget cooldowns that have run out.
    pub fn prune_expired(&mut self, now: Instant) {
        let cooldown = self.cooldown;
        self.committed
            .retain(|_, at| now.saturating_duration_since(*at) < cooldown);
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_active_session() {
        let now = Instant::now();
        let mut sessions = SessionCoordinator::new(Duration::from_millis(1200));
        let first = sessions.begin_session("a", SessionKind::Drag, now);
        assert!(sessions.is_dragging("a"));
        let second = sessions.begin_session("b", SessionKind::Resize, now);
        assert_ne!(first, second);
        assert!(!sessions.is_interacting("a"));
        assert!(sessions.is_interacting("b"));
        assert!(!sessions.is_dragging("b"));

        assert!(!sessions.end_session("a"));
        assert!(sessions.end_session("b"));
        assert!(sessions.active().is_none());
    }

    #[test]
    fn test_cooldown_window() {
        let t0 = Instant::now();
        let mut sessions = SessionCoordinator::new(Duration::from_millis(1200));
        sessions.mark_committed("a", t0);
        assert!(sessions.is_recently_committed("a", t0 + Duration::from_millis(1199)));
        assert!(!sessions.is_recently_committed("a", t0 + Duration::from_millis(1200)));
        assert!(!sessions.is_recently_committed("b", t0));

        sessions.prune_expired(t0 + Duration::from_millis(2000));
        assert!(!sessions.is_recently_committed("a", t0));
    }
}
