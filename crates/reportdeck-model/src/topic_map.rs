//! Topic map data

use serde::{Deserialize, Serialize};

/// Nested topic clusters drawn as labelled polygons
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicMapData {
    pub paths: Vec<TopicPath>,
}

/// One topic polygon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicPath {
    pub name: String,
    /// Gradient start colour
    pub color: String,
    /// Gradient end colour
    pub color2: String,
    /// Fill opacity, 0 to 1
    pub opacity: f64,
    /// Vertices as `[x, y]` fractions of the drawing area
    pub points: Vec<[f64; 2]>,
    /// Depth in the topic hierarchy, 0 for leaves
    #[serde(default)]
    pub level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_map_json() {
        let json = r##"{"paths": [
            {"name": "cats", "color": "#FF0000", "color2": "#880000", "opacity": 0.7,
             "points": [[0.1, 0.1], [0.5, 0.1], [0.3, 0.6]], "level": 1},
            {"name": "dogs", "color": "#00FF00", "color2": "#008800", "opacity": 1,
             "points": [[0.5, 0.5], [0.9, 0.5], [0.7, 0.9]]}
        ]}"##;
        let data: TopicMapData = serde_json::from_str(json).unwrap();
        assert_eq!(data.paths.len(), 2);
        assert_eq!(data.paths[0].level, 1);
        assert_eq!(data.paths[1].level, 0);
        assert_eq!(data.paths[0].points.len(), 3);
    }
}
