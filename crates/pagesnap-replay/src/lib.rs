//! Headless gesture replay.
//!
//! A scene file describes a node tree and a list of scripted pointer
//! gestures. Replaying it drives the core engine against a [`MemoryHost`]
//! and reports every commit plus the final element bounds.

use kurbo::Point;
use pagesnap_core::{
    Bounds, Duration, EditorHost, EngineConfig, Instant, InteractionEngine, InteractionOutcome, InteractionUpdate,
    MemoryHost, Modifiers, NodeId, NodeSpec, PointerEvent, PointerPhase, PropertyPatch, ResizeDirection,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid scene: {0}")]
    Scene(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Drag,
    Resize,
}

/// One pointer sample of a scripted gesture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    /// Milliseconds since the start of the replay.
    pub at_ms: u64,
    #[serde(default)]
    pub shift: bool,
}

/// A scripted gesture. The first step must be a pointer-down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gesture {
    pub kind: GestureKind,
    pub subject: NodeId,
    #[serde(default)]
    pub direction: Option<ResizeDirection>,
    pub steps: Vec<Step>,
}

/// Scene file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub config: EngineConfig,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub gestures: Vec<Gesture>,
}

impl Scene {
    /// Check references and ordering before anything runs.
    pub fn validate(&self) -> Result<(), ReplayError> {
        let mut ids = HashSet::new();
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(ReplayError::Scene(format!("duplicate node id {}", node.id)));
            }
        }
        for node in &self.nodes {
            if let Some(parent) = &node.parent {
                if !ids.contains(parent.as_str()) {
                    return Err(ReplayError::Scene(format!("node {} has unknown parent {}", node.id, parent)));
                }
            }
        }

        let mut last_ms = 0;
        for (index, gesture) in self.gestures.iter().enumerate() {
            let first = gesture
                .steps
                .first()
                .ok_or_else(|| ReplayError::Scene(format!("gesture {} has no steps", index)))?;
            if first.phase != PointerPhase::Down {
                return Err(ReplayError::Scene(format!("gesture {} does not start with a pointer-down", index)));
            }
            if gesture.kind == GestureKind::Resize && gesture.direction.is_none() {
                return Err(ReplayError::Scene(format!("resize gesture {} has no direction", index)));
            }
            for step in &gesture.steps {
                if step.at_ms < last_ms {
                    return Err(ReplayError::Scene(format!("gesture {} goes back in time at {}ms", index, step.at_ms)));
                }
                last_ms = step.at_ms;
            }
        }
        Ok(())
    }
}

/// How one gesture went.
#[derive(Debug, Clone, Serialize)]
pub struct GestureReport {
    pub index: usize,
    pub subject: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<InteractionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of pointer moves that produced a snapped frame.
    pub snapped_frames: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitRecord {
    pub node: NodeId,
    pub patch: PropertyPatch,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub gestures: Vec<GestureReport>,
    pub commits: Vec<CommitRecord>,
    pub final_bounds: BTreeMap<NodeId, Bounds>,
}

/// Read and parse a scene file.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene, ReplayError> {
    let json = fs::read_to_string(path.as_ref())?;
    let scene: Scene = serde_json::from_str(&json)?;
    scene.validate()?;
    Ok(scene)
}

/// Replay every gesture of `scene` against a fresh in-memory host.
pub fn replay(scene: &Scene) -> Result<ReplayReport, ReplayError> {
    scene.validate()?;

    let mut host = MemoryHost::from_specs(scene.nodes.iter().cloned());
    let mut engine = InteractionEngine::new(scene.config.clone());
    let t0 = Instant::now();
    let at = |ms: u64| t0 + Duration::from_millis(ms);
    let mut reports: Vec<GestureReport> = Vec::with_capacity(scene.gestures.len());

    for (index, gesture) in scene.gestures.iter().enumerate() {
        let mut report = GestureReport {
            index,
            subject: gesture.subject.clone(),
            outcome: None,
            error: None,
            snapped_frames: 0,
        };

        for (n, step) in gesture.steps.iter().enumerate() {
            let modifiers = Modifiers {
                shift: step.shift,
                ..Default::default()
            };
            let event = PointerEvent::mouse(step.phase, Point::new(step.x, step.y), at(step.at_ms)).with_modifiers(modifiers);
            engine.tick(event.time);

            if n == 0 {
                if let Some(outcome) = engine.finish_active(&mut host, event.time) {
                    log::warn!("Gesture before {} never released, finished as cancelled", index);
                    if let Some(previous) = reports.last_mut() {
                        previous.outcome = Some(outcome);
                    }
                }
                let started = match (gesture.kind, gesture.direction) {
                    (GestureKind::Drag, _) => engine.begin_drag(&mut host, &gesture.subject, &event),
                    (GestureKind::Resize, Some(direction)) => {
                        engine.begin_resize(&mut host, &gesture.subject, direction, &event)
                    }
                    (GestureKind::Resize, None) => {
                        return Err(ReplayError::Scene(format!("resize gesture {} has no direction", index)));
                    }
                };
                if let Err(e) = started {
                    log::warn!("Gesture {} on {} did not start: {}", index, gesture.subject, e);
                    report.error = Some(e.to_string());
                    break;
                }
                continue;
            }

            match engine.handle_pointer(&mut host, &event) {
                Some(InteractionUpdate::Drag(frame)) if frame.snapped => report.snapped_frames += 1,
                Some(InteractionUpdate::Resize(frame)) if frame.snapped => report.snapped_frames += 1,
                Some(InteractionUpdate::Ended(outcome)) => report.outcome = Some(outcome),
                _ => {}
            }
        }
        reports.push(report);
    }

    let end = scene.gestures.iter().flat_map(|g| g.steps.iter()).map(|s| s.at_ms).max().unwrap_or(0);
    if let Some(outcome) = engine.finish_active(&mut host, at(end)) {
        if let Some(last) = reports.last_mut() {
            last.outcome = Some(outcome);
        }
    }
    engine.tick(at(end) + scene.config.indicator_clear_delay().max(scene.config.cleanup_delay()));

    let commits = host
        .commits()
        .iter()
        .map(|(node, patch)| CommitRecord {
            node: node.clone(),
            patch: patch.clone(),
        })
        .collect();
    let final_bounds = host
        .node_ids()
        .into_iter()
        .filter_map(|id| host.client_rect(&id).map(|rect| (id, Bounds::from(rect))))
        .collect();

    Ok(ReplayReport {
        gestures: reports,
        commits,
        final_bounds,
    })
}

/// Load, replay and render the report as pretty JSON.
pub fn run(path: impl AsRef<Path>) -> Result<String, ReplayError> {
    let scene = load_scene(path)?;
    log::info!("Replaying {} gestures over {} nodes", scene.gestures.len(), scene.nodes.len());
    let report = replay(&scene)?;
    Ok(serde_json::to_string_pretty(&report)?)
}
