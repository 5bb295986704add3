//! Shared geometry vocabulary: node ids, resize directions and frame helpers.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a visual element. Matches the owning node id in the editor.
pub type NodeId = String;

/// Coordinate axis a snap or guide applies to.
///
/// A guide on [`Axis::X`] constrains x coordinates and is drawn as a vertical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The perpendicular axis.
    pub fn other(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Plain `{x, y, width, height}` rectangle used at serialization boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

impl From<Bounds> for Rect {
    fn from(b: Bounds) -> Self {
        Rect::from_origin_size(Point::new(b.x, b.y), Size::new(b.width, b.height))
    }
}

impl From<Rect> for Bounds {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
        }
    }
}

/// Direction of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeDirection {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeDirection {
    /// All eight handle directions.
    pub const ALL: [ResizeDirection; 8] = [
        ResizeDirection::N,
        ResizeDirection::S,
        ResizeDirection::E,
        ResizeDirection::W,
        ResizeDirection::NE,
        ResizeDirection::NW,
        ResizeDirection::SE,
        ResizeDirection::SW,
    ];

    /// Whether this handle drags the left edge.
    pub fn moves_left(self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    /// Whether this handle drags the right edge.
    pub fn moves_right(self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    /// Whether this handle drags the top edge.
    pub fn moves_top(self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    /// Whether this handle drags the bottom edge.
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    /// Whether the left or top edge moves, which shifts the element's origin.
    pub fn moves_leading_edge(self) -> bool {
        self.moves_left() || self.moves_top()
    }

    /// Diagonal handles.
    pub fn is_corner(self) -> bool {
        matches!(self, Self::NE | Self::NW | Self::SE | Self::SW)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::S => "s",
            Self::E => "e",
            Self::W => "w",
            Self::NE => "ne",
            Self::NW => "nw",
            Self::SE => "se",
            Self::SW => "sw",
        }
    }
}

impl fmt::Display for ResizeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown resize direction: {0}")]
pub struct ParseDirectionError(pub String);

impl FromStr for ResizeDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" => Ok(Self::N),
            "s" => Ok(Self::S),
            "e" => Ok(Self::E),
            "w" => Ok(Self::W),
            "ne" => Ok(Self::NE),
            "nw" => Ok(Self::NW),
            "se" => Ok(Self::SE),
            "sw" => Ok(Self::SW),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Express a client-space rectangle relative to `frame`'s origin.
pub fn to_frame(rect: Rect, frame: Rect) -> Rect {
    rect - frame.origin().to_vec2()
}

/// Inverse of [`to_frame`].
pub fn from_frame(rect: Rect, frame: Rect) -> Rect {
    rect + frame.origin().to_vec2()
}

/// Start, center and end coordinates of a rectangle along an axis.
pub fn axis_values(rect: Rect, axis: Axis) -> [f64; 3] {
    match axis {
        Axis::X => [rect.x0, (rect.x0 + rect.x1) / 2.0, rect.x1],
        Axis::Y => [rect.y0, (rect.y0 + rect.y1) / 2.0, rect.y1],
    }
}

/// Extent of a rectangle along an axis as `(start, end)`.
pub fn axis_span(rect: Rect, axis: Axis) -> (f64, f64) {
    match axis {
        Axis::X => (rect.x0, rect.x1),
        Axis::Y => (rect.y0, rect.y1),
    }
}

/// Whether two rectangles overlap when projected onto `axis`.
pub fn overlaps_on(a: Rect, b: Rect, axis: Axis) -> bool {
    let (a0, a1) = axis_span(a, axis);
    let (b0, b1) = axis_span(b, axis);
    a0 < b1 && b0 < a1
}
