//! Map data: a base image with markers and optional polygon overlays

use serde::{Deserialize, Serialize};

/// A map image with points of interest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    /// Image reference: a data URI, bare base64 JPEG, or whitelisted URL
    pub image: String,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub polygons: Option<Vec<Polygon>>,
}

/// A marker positioned as a fraction of the image size
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    /// Cluster label, or tooltip text for plain markers
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub cluster: bool,
    pub color: String,
    #[serde(default)]
    pub font_color: Option<String>,
    /// Render at reduced opacity
    #[serde(default)]
    pub fade: bool,
}

/// A closed region outlined over the image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    /// Vertices as `[x, y]` fractions of the image size
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub text: Option<String>,
    pub color: String,
}

impl MapData {
    /// Create map data for an image without markers
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    /// Add a marker
    pub fn push_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }
}

impl Marker {
    /// Create a plain (non-cluster) marker
    pub fn new(x: f64, y: f64, color: impl Into<String>) -> Self {
        Self {
            x,
            y,
            color: color.into(),
            ..Default::default()
        }
    }

    /// Non-empty marker text
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}
