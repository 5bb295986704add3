//! PageSnap Core Library
//!
//! Platform-agnostic snapping and resize geometry for the PageSnap visual
//! page builder: the geometry registry, the snap resolver and the drag and
//! resize interaction controllers, driven through an [`EditorHost`].

pub mod config;
pub mod context;
pub mod drag;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod host;
pub mod input;
pub mod registry;
pub mod resize;
pub mod session;
pub mod snap;
pub mod timers;
pub mod units;

pub use config::EngineConfig;
pub use context::{InteractionContext, InteractionOutcome};
pub use drag::{DragFrame, DragSession};
pub use engine::{InteractionEngine, InteractionUpdate};
pub use error::{HostError, InteractionError, InteractionResult};
pub use geometry::{Axis, Bounds, NodeId, ResizeDirection};
pub use host::{EditorHost, ElementHandle, LiveStyle, MemoryHost, NodeSpec, Positioning, PropertyPatch};
pub use input::{Modifiers, PointerEvent, PointerPhase, PointerSource, TouchPoint};
pub use registry::{GeometryRegistry, TrackedRect};
pub use resize::{ResizeFrame, ResizeSession, enforce_min_size, resize_rect};
pub use session::{SessionCoordinator, SessionKind};
pub use snap::{GuideKind, ResizeSnapResult, SnapGuide, SnapOptions, SnapResult, get_resize_snap_position, get_snap_position};
pub use timers::{Duration, Instant};
pub use units::Length;
