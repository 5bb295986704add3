//! Snap resolver: aligns a moving or resizing rectangle with tracked ones.
//!
//! Both queries share the same matching: each axis is resolved on its own,
//! the candidate's start/center/end coordinates are compared with every
//! target's, and the smallest delta within tolerance wins. Ties keep the
//! first match but report guides for every match at the same delta.

use crate::geometry::{Axis, NodeId, ResizeDirection, axis_span, axis_values, overlaps_on};
use crate::registry::{GeometryRegistry, TrackedRect};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Slack for float comparisons against the tolerance and between deltas.
const EPSILON: f64 = 1e-6;

/// Start, center and end slots in [`axis_values`].
const ALL_SLOTS: [usize; 3] = [0, 1, 2];
const CENTER_SLOT: usize = 1;

/// Resolver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOptions {
    /// Largest delta (px) that still snaps. Inclusive.
    pub tolerance: f64,
    /// Offer equal-gap positions between two neighbours (drag only).
    pub equal_spacing: bool,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            tolerance: 5.0,
            equal_spacing: true,
        }
    }
}

/// What a guide line marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideKind {
    /// Edge aligned with an edge or center.
    Edge,
    /// Center aligned with a center.
    Center,
    /// One of two equal gaps.
    Spacing,
}

/// A guide line segment to render, in the same frame as the tracked rectangles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapGuide {
    /// Axis whose coordinate was adjusted.
    pub axis: Axis,
    pub kind: GuideKind,
    /// Tracked rectangle the guide refers to.
    pub target: NodeId,
    pub from: Point,
    pub to: Point,
}

/// Result of a drag snap query.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub snapped: bool,
    pub snapped_x: bool,
    pub snapped_y: bool,
    /// Adjusted top-left corner.
    pub position: Point,
    pub guides: Vec<SnapGuide>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(position: Point) -> Self {
        Self {
            snapped: false,
            snapped_x: false,
            snapped_y: false,
            position,
            guides: Vec::new(),
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Result of a resize snap query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSnapResult {
    pub snapped: bool,
    pub snapped_x: bool,
    pub snapped_y: bool,
    /// Adjusted bounds. Edges the handle does not move are untouched.
    pub bounds: Rect,
    pub guides: Vec<SnapGuide>,
}

impl ResizeSnapResult {
    pub fn none(bounds: Rect) -> Self {
        Self {
            snapped: false,
            snapped_x: false,
            snapped_y: false,
            bounds,
            guides: Vec::new(),
        }
    }
}

/// A match found on one axis. Indices point into the candidate list.
#[derive(Debug, Clone, Copy)]
enum Hit {
    Align { target: usize, coord: f64, kind: GuideKind },
    Spacing { before: usize, after: usize },
}

/// Best delta found so far on one axis, with every hit that produces it.
#[derive(Debug, Default)]
struct AxisSnap {
    delta: Option<f64>,
    hits: Vec<Hit>,
}

impl AxisSnap {
    fn offer(&mut self, delta: f64, hit: Hit, tolerance: f64) {
        if !delta.is_finite() || delta.abs() > tolerance + EPSILON {
            return;
        }
        match self.delta {
            None => {
                self.delta = Some(delta);
                self.hits = vec![hit];
            }
            Some(best) if delta.abs() < best.abs() - EPSILON => {
                self.delta = Some(delta);
                self.hits = vec![hit];
            }
            Some(best) if (delta - best).abs() <= EPSILON => self.hits.push(hit),
            Some(_) => {}
        }
    }
}

fn align_axis(subject: Rect, axis: Axis, slots: &[usize], targets: &[&TrackedRect], tolerance: f64, snap: &mut AxisSnap) {
    let values = axis_values(subject, axis);
    for (index, target) in targets.iter().enumerate() {
        let target_values = axis_values(target.bounds, axis);
        for &slot in slots {
            for (target_slot, &coord) in target_values.iter().enumerate() {
                let kind = if slot == CENTER_SLOT && target_slot == CENTER_SLOT {
                    GuideKind::Center
                } else {
                    GuideKind::Edge
                };
                snap.offer(coord - values[slot], Hit::Align { target: index, coord, kind }, tolerance);
            }
        }
    }
}

/// Offer positions that leave equal gaps to a neighbour on each side.
fn spacing_axis(subject: Rect, axis: Axis, targets: &[&TrackedRect], tolerance: f64, snap: &mut AxisSnap) {
    let (start, end) = axis_span(subject, axis);
    let size = end - start;
    let neighbours: Vec<usize> = targets
        .iter()
        .enumerate()
        .filter(|(_, t)| overlaps_on(t.bounds, subject, axis.other()))
        .map(|(i, _)| i)
        .collect();

    for &before in &neighbours {
        let (_, before_end) = axis_span(targets[before].bounds, axis);
        for &after in &neighbours {
            if before == after {
                continue;
            }
            let (after_start, _) = axis_span(targets[after].bounds, axis);
            let room = after_start - before_end - size;
            if room < 0.0 {
                continue;
            }
            let position = before_end + room / 2.0;
            snap.offer(position - start, Hit::Spacing { before, after }, tolerance);
        }
    }
}

/// Line across `axis` at `coord`, spanning `lo..hi` on the other axis.
fn across(axis: Axis, coord: f64, lo: f64, hi: f64) -> (Point, Point) {
    match axis {
        Axis::X => (Point::new(coord, lo), Point::new(coord, hi)),
        Axis::Y => (Point::new(lo, coord), Point::new(hi, coord)),
    }
}

/// Line along `axis` from `lo` to `hi`, at `at` on the other axis.
fn along(axis: Axis, lo: f64, hi: f64, at: f64) -> (Point, Point) {
    match axis {
        Axis::X => (Point::new(lo, at), Point::new(hi, at)),
        Axis::Y => (Point::new(at, lo), Point::new(at, hi)),
    }
}

fn guides_for(axis: Axis, snap: &AxisSnap, targets: &[&TrackedRect], subject: Rect) -> Vec<SnapGuide> {
    let other = axis.other();
    let (s0, s1) = axis_span(subject, other);
    let mut guides = Vec::new();
    for hit in &snap.hits {
        match *hit {
            Hit::Align { target, coord, kind } => {
                let target = targets[target];
                let (t0, t1) = axis_span(target.bounds, other);
                let (from, to) = across(axis, coord, s0.min(t0), s1.max(t1));
                guides.push(SnapGuide {
                    axis,
                    kind,
                    target: target.id.clone(),
                    from,
                    to,
                });
            }
            Hit::Spacing { before, after } => {
                let middle = (s0 + s1) / 2.0;
                let (start, end) = axis_span(subject, axis);
                let (_, before_end) = axis_span(targets[before].bounds, axis);
                let (after_start, _) = axis_span(targets[after].bounds, axis);
                for (target, lo, hi) in [(before, before_end, start), (after, end, after_start)] {
                    let (from, to) = along(axis, lo, hi, middle);
                    guides.push(SnapGuide {
                        axis,
                        kind: GuideKind::Spacing,
                        target: targets[target].id.clone(),
                        from,
                        to,
                    });
                }
            }
        }
    }
    guides
}

/// Snap a dragged rectangle whose top-left corner would be at `candidate`.
///
/// Coordinates are in the frame the registry entries were recorded in.
pub fn get_snap_position(
    registry: &GeometryRegistry,
    subject_id: &str,
    candidate: Point,
    size: Size,
    options: &SnapOptions,
) -> SnapResult {
    let targets = registry.candidates(subject_id);
    if targets.is_empty() {
        return SnapResult::none(candidate);
    }

    let rect = Rect::from_origin_size(candidate, size);
    let mut x = AxisSnap::default();
    let mut y = AxisSnap::default();
    for (axis, snap) in [(Axis::X, &mut x), (Axis::Y, &mut y)] {
        align_axis(rect, axis, &ALL_SLOTS, &targets, options.tolerance, snap);
        if options.equal_spacing {
            spacing_axis(rect, axis, &targets, options.tolerance, snap);
        }
    }

    let offset = Vec2::new(x.delta.unwrap_or(0.0), y.delta.unwrap_or(0.0));
    let position = candidate + offset;
    let snapped_rect = rect + offset;
    let mut guides = guides_for(Axis::X, &x, &targets, snapped_rect);
    guides.extend(guides_for(Axis::Y, &y, &targets, snapped_rect));

    let result = SnapResult {
        snapped: x.delta.is_some() || y.delta.is_some(),
        snapped_x: x.delta.is_some(),
        snapped_y: y.delta.is_some(),
        position,
        guides,
    };
    if result.snapped {
        log::trace!("Snapped {} from {:?} to {:?}", subject_id, candidate, position);
    }
    result
}

/// Snap the moving edges of a rectangle being resized with `direction`.
///
/// Only the edges the handle drags are compared and adjusted, so the
/// opposite edges keep their exact coordinates.
pub fn get_resize_snap_position(
    registry: &GeometryRegistry,
    subject_id: &str,
    direction: ResizeDirection,
    intended: Rect,
    options: &SnapOptions,
) -> ResizeSnapResult {
    let targets = registry.candidates(subject_id);
    if targets.is_empty() {
        return ResizeSnapResult::none(intended);
    }

    let x_slot = if direction.moves_left() {
        Some(0)
    } else if direction.moves_right() {
        Some(2)
    } else {
        None
    };
    let y_slot = if direction.moves_top() {
        Some(0)
    } else if direction.moves_bottom() {
        Some(2)
    } else {
        None
    };

    let mut x = AxisSnap::default();
    let mut y = AxisSnap::default();
    if let Some(slot) = x_slot {
        align_axis(intended, Axis::X, &[slot], &targets, options.tolerance, &mut x);
    }
    if let Some(slot) = y_slot {
        align_axis(intended, Axis::Y, &[slot], &targets, options.tolerance, &mut y);
    }

    let mut bounds = intended;
    if let Some(dx) = x.delta {
        if direction.moves_left() {
            bounds.x0 += dx;
        } else {
            bounds.x1 += dx;
        }
    }
    if let Some(dy) = y.delta {
        if direction.moves_top() {
            bounds.y0 += dy;
        } else {
            bounds.y1 += dy;
        }
    }

    let mut guides = guides_for(Axis::X, &x, &targets, bounds);
    guides.extend(guides_for(Axis::Y, &y, &targets, bounds));

    ResizeSnapResult {
        snapped: x.delta.is_some() || y.delta.is_some(),
        snapped_x: x.delta.is_some(),
        snapped_y: y.delta.is_some(),
        bounds,
        guides,
    }
}
