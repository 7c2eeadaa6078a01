//! Fractional placement rectangles

use serde::{Deserialize, Serialize};

/// A rectangle expressed as fractions (0 to 1) of some available area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Anchor {
    /// Create an anchor from its four components
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole available area
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::full()
    }
}
