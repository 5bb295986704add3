//! Deferred teardown tasks and write throttling.
//!
//! The engine never sleeps or spawns. Callers pass the current time into
//! every event, and [`TimerQueue::take_due`] hands back whatever has expired.

use crate::geometry::NodeId;

// Use web_time on WASM, std::time otherwise
#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};

/// Work scheduled to run after a gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredTask {
    /// Remove guide lines from the registry.
    ClearIndicators,
    /// Drop every tracked rectangle.
    CleanupTracked,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: Instant,
    subject: NodeId,
    task: DeferredTask,
}

/// Pending deferred tasks, keyed by the subject whose gesture scheduled them.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<Scheduled>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` for `subject`, replacing an earlier entry for the same pair.
    pub fn schedule(&mut self, subject: &str, task: DeferredTask, due: Instant) {
        self.pending
            .retain(|s| !(s.subject == subject && s.task == task));
        self.pending.push(Scheduled {
            due,
            subject: subject.to_string(),
            task,
        });
    }

    /// Drop every task scheduled by `subject`. Returns how many were removed.
    pub fn cancel_for(&mut self, subject: &str) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.subject != subject);
        before - self.pending.len()
    }

    /// Remove and return tasks whose deadline is at or before `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<(NodeId, DeferredTask)> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = rest;
        due.sort_by_key(|s| s.due);
        due.into_iter().map(|s| (s.subject, s.task)).collect()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|s| s.due).min()
    }

    pub fn is_scheduled(&self, subject: &str, task: DeferredTask) -> bool {
        self.pending
            .iter()
            .any(|s| s.subject == subject && s.task == task)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Leading-edge throttle: the first call passes, later calls pass once
/// `interval` has elapsed since the last one that did.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Check whether a write may happen at `now`, recording it if so.
    pub fn ready(&mut self, now: Instant) -> bool {
        let ready = match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if ready {
            self.last = Some(now);
        }
        ready
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_in_order() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule("a", DeferredTask::ClearIndicators, t0 + Duration::from_millis(300));
        queue.schedule("a", DeferredTask::CleanupTracked, t0 + Duration::from_millis(100));

        assert!(queue.take_due(t0 + Duration::from_millis(50)).is_empty());

        let due = queue.take_due(t0 + Duration::from_millis(400));
        assert_eq!(
            due,
            vec![
                ("a".to_string(), DeferredTask::CleanupTracked),
                ("a".to_string(), DeferredTask::ClearIndicators),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_reschedule_replaces() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule("a", DeferredTask::CleanupTracked, t0 + Duration::from_millis(100));
        queue.schedule("a", DeferredTask::CleanupTracked, t0 + Duration::from_millis(500));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel_is_per_subject() {
        let t0 = Instant::now();
        let mut queue = TimerQueue::new();
        queue.schedule("a", DeferredTask::CleanupTracked, t0);
        queue.schedule("b", DeferredTask::CleanupTracked, t0);
        assert_eq!(queue.cancel_for("a"), 1);
        assert!(!queue.is_scheduled("a", DeferredTask::CleanupTracked));
        assert!(queue.is_scheduled("b", DeferredTask::CleanupTracked));
    }

    #[test]
    fn test_throttle() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(500));
        assert!(throttle.ready(t0));
        assert!(!throttle.ready(t0 + Duration::from_millis(200)));
        assert!(!throttle.ready(t0 + Duration::from_millis(499)));
        assert!(throttle.ready(t0 + Duration::from_millis(500)));
        assert!(!throttle.ready(t0 + Duration::from_millis(600)));
        throttle.reset();
        assert!(throttle.ready(t0 + Duration::from_millis(601)));
    }
}
