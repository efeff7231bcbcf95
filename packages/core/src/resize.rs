//! # Resize Coordinator
//!
//! Turns a pointer gesture on one of the eight resize handles of the
//! selected node into a `resizeChange` payload.
//!
//! ```text
//! Idle ──start──▶ Resizing ──pointer_up──▶ Idle (payload, if anything moved)
//!                   │  ▲
//!                   │  └── pointer_move (live preview)
//!                   └─────cancel─────────▶ Idle
//! ```
//!
//! Each axis is computed independently from the offset since the gesture
//! started. A candidate size with zero offset, or outside the measured
//! min/max bounds, is rejected and the axis keeps its last accepted value.

use crate::geometry::{format_px, MeasuredSize, Point};
use crate::node::Key;
use serde::{Deserialize, Serialize};

/// Resize handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
    TopRight,
    BottomRight,
    BottomLeft,
    TopLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
        Direction::TopRight,
        Direction::BottomRight,
        Direction::BottomLeft,
        Direction::TopLeft,
    ];

    /// Sign applied to the pointer offset on each axis (0 = axis untouched)
    pub fn factors(self) -> (f64, f64) {
        match self {
            Direction::Top => (0.0, -1.0),
            Direction::Right => (1.0, 0.0),
            Direction::Bottom => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::TopRight => (1.0, -1.0),
            Direction::BottomRight => (1.0, 1.0),
            Direction::BottomLeft => (-1.0, 1.0),
            Direction::TopLeft => (-1.0, -1.0),
        }
    }
}

/// Style change produced by a finished gesture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl ResizePayload {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Live size while the gesture is in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizePreview {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
struct ResizeGesture {
    key: Key,
    direction: Direction,
    origin: Point,
    measured: MeasuredSize,
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ResizeCoordinator {
    gesture: Option<ResizeGesture>,
}

impl ResizeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resizing(&self) -> bool {
        self.gesture.is_some()
    }

    /// Node being resized
    pub fn target(&self) -> Option<&str> {
        self.gesture.as_ref().map(|gesture| gesture.key.as_str())
    }

    /// Begin a gesture, replacing any gesture in flight
    pub fn start(
        &mut self,
        key: impl Into<Key>,
        direction: Direction,
        origin: Point,
        measured: MeasuredSize,
    ) {
        self.gesture = Some(ResizeGesture {
            key: key.into(),
            direction,
            origin,
            measured,
            width: None,
            height: None,
        });
    }

    /// Apply a pointer move. Returns `None` when no gesture is active.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<SizePreview> {
        let gesture = self.gesture.as_mut()?;
        let (x_factor, y_factor) = gesture.direction.factors();
        let measured = gesture.measured;

        if let Some(width) = candidate(
            (pointer.x - gesture.origin.x) * x_factor,
            measured.width,
            measured.min_width,
            measured.max_width,
        ) {
            gesture.width = Some(width);
        }
        if let Some(height) = candidate(
            (pointer.y - gesture.origin.y) * y_factor,
            measured.height,
            measured.min_height,
            measured.max_height,
        ) {
            gesture.height = Some(height);
        }

        Some(SizePreview {
            width: gesture.width.unwrap_or(measured.width),
            height: gesture.height.unwrap_or(measured.height),
        })
    }

    /// Finish the gesture. `None` when neither axis changed.
    pub fn pointer_up(&mut self) -> Option<ResizePayload> {
        let gesture = self.gesture.take()?;
        let payload = ResizePayload {
            width: gesture.width.map(format_px),
            height: gesture.height.map(format_px),
        };
        (!payload.is_empty()).then_some(payload)
    }

    pub fn cancel(&mut self) {
        self.gesture = None;
    }
}

fn candidate(offset: f64, start: f64, min: Option<f64>, max: Option<f64>) -> Option<f64> {
    if offset == 0.0 {
        return None;
    }
    let size = start + offset;
    let in_bounds = size >= min.unwrap_or(0.0) && max.map_or(true, |max| size <= max);
    in_bounds.then_some(size)
}
