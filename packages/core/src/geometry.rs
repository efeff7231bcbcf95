//! Measured geometry handed to the engine by the host.
//!
//! The engine never measures anything itself. Whoever owns the canvas
//! measures node boxes and computed sizes and passes them in as plain data.

use crate::node::{Key, Props};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned box in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges inclusive
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Whether this box comes before `point` in reading order: the point is
    /// below the box, or inside the box's row and past its midpoint along the
    /// box's long axis.
    pub fn precedes(&self, point: Point) -> bool {
        if point.y >= self.bottom() {
            return true;
        }
        if point.y < self.y {
            return false;
        }
        let center = self.center();
        if self.width >= self.height {
            center.y <= point.y
        } else {
            center.x <= point.x
        }
    }
}

/// Boxes measured for one frame of a drag gesture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    #[serde(default)]
    pub nodes: HashMap<Key, Rect>,

    /// Boxes of the named slots of slot containers
    #[serde(default)]
    pub slots: HashMap<Key, BTreeMap<String, Rect>>,

    /// Modal whose overlay the pointer is over (`None` for the page itself)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<Key>,
}

impl LayoutSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, key: impl Into<Key>, rect: Rect) -> Self {
        self.nodes.insert(key.into(), rect);
        self
    }

    pub fn with_slot(mut self, key: impl Into<Key>, slot: impl Into<String>, rect: Rect) -> Self {
        self.slots
            .entry(key.into())
            .or_default()
            .insert(slot.into(), rect);
        self
    }

    pub fn on_surface(mut self, modal: impl Into<Key>) -> Self {
        self.surface = Some(modal.into());
        self
    }

    pub fn node_box(&self, key: &str) -> Option<&Rect> {
        self.nodes.get(key)
    }

    /// Slot of `key` whose box contains `point`
    pub fn slot_at(&self, key: &str, point: Point) -> Option<&str> {
        self.slots
            .get(key)?
            .iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(name, _)| name.as_str())
    }
}

/// Computed size of the selected node when a resize starts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredSize {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub min_width: Option<f64>,
    #[serde(default)]
    pub min_height: Option<f64>,
    #[serde(default)]
    pub max_width: Option<f64>,
    #[serde(default)]
    pub max_height: Option<f64>,
}

impl MeasuredSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_width_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_width = min;
        self.max_width = max;
        self
    }

    pub fn with_height_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_height = min;
        self.max_height = max;
        self
    }

    /// Size with bounds read from a computed style object (`minWidth`,
    /// `maxWidth`, `minHeight`, `maxHeight`). Keywords such as `none` leave
    /// that bound open.
    pub fn from_computed(width: f64, height: f64, computed: &Props) -> Self {
        let bound = |name: &str| match computed.get(name)? {
            Value::String(text) => parse_unit(text),
            Value::Number(number) => number.as_f64(),
            _ => None,
        };
        Self::new(width, height)
            .with_width_bounds(bound("minWidth"), bound("maxWidth"))
            .with_height_bounds(bound("minHeight"), bound("maxHeight"))
    }
}

/// Parse a computed CSS length such as `"120px"` or `"87.5"`.
/// Keywords (`none`, `auto`) and percentages yield `None`.
pub fn parse_unit(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a length as a pixel string
pub fn format_px(value: f64) -> String {
    format!("{}px", value)
}
