//! Composite reports made of several visualizations

use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;
use crate::chart::{DateSeriesData, SunburstData};
use crate::error::Result;
use crate::list::ListData;
use crate::map::MapData;
use crate::table::TableData;
use crate::text::TextData;
use crate::topic_map::TopicMapData;

/// Any visualization a report region can hold, tagged by `type` with its
/// payload under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Visualization {
    #[serde(rename = "dategraph")]
    DateGraph(DateSeriesData),
    List(ListData),
    Map(MapData),
    Sunburst(SunburstData),
    Table(TableData),
    Text(TextData),
    #[serde(rename = "topicmap")]
    TopicMap(TopicMapData),
}

impl Visualization {
    /// The `type` tag used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DateGraph(_) => "dategraph",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Sunburst(_) => "sunburst",
            Self::Table(_) => "table",
            Self::Text(_) => "text",
            Self::TopicMap(_) => "topicmap",
        }
    }

    /// Whether this visualization is backed by an embedded chart part
    pub fn is_chart(&self) -> bool {
        matches!(self, Self::DateGraph(_) | Self::Sunburst(_))
    }

    /// Check the invariants of the wrapped data
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::DateGraph(data) => data.validate(),
            Self::Sunburst(data) => data.validate(),
            Self::Table(data) => data.validate(),
            Self::List(_) | Self::Map(_) | Self::Text(_) | Self::TopicMap(_) => Ok(()),
        }
    }
}

/// A report: visualizations placed in fractional regions of a slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub children: Vec<ReportChild>,
}

/// One region of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportChild {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_extent")]
    pub width: f64,
    #[serde(default = "default_extent")]
    pub height: f64,
    #[serde(default)]
    pub title: Option<String>,
    /// Inset in points; negative disables insetting and titles
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Gap in points between the title and the content
    #[serde(default = "default_text_margin")]
    pub text_margin: f64,
    /// Title font size in points
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Title font family
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(flatten)]
    pub visualization: Visualization,
}

fn default_extent() -> f64 {
    1.0
}

fn default_margin() -> f64 {
    3.0
}

fn default_text_margin() -> f64 {
    5.0
}

fn default_font_size() -> f64 {
    12.0
}

fn default_font_family() -> String {
    "Metric-Light".to_string()
}

impl ReportData {
    /// Create a report from its regions
    pub fn new(children: Vec<ReportChild>) -> Self {
        Self { children }
    }

    /// Validate every region's data
    pub fn validate(&self) -> Result<()> {
        self.children
            .iter()
            .try_for_each(|child| child.visualization.validate())
    }
}

impl ReportChild {
    /// Create a region covering the given fractional rectangle
    pub fn new(anchor: Anchor, visualization: Visualization) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            width: anchor.width,
            height: anchor.height,
            title: None,
            margin: default_margin(),
            text_margin: default_text_margin(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            visualization,
        }
    }

    /// Set the region title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The region's fractional rectangle
    pub fn anchor(&self) -> Anchor {
        Anchor::new(self.x, self.y, self.width, self.height)
    }

    /// The title, if non-empty
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT_JSON: &str = r##"{
        "children": [
            {
                "x": 0, "y": 0, "width": 0.5, "height": 1,
                "title": "Sources",
                "type": "sunburst",
                "data": {"categories": ["a", "b"], "values": [1, 2]}
            },
            {
                "x": 0.5, "y": 0, "width": 0.5, "height": 1,
                "margin": 10, "fontFamily": "Arial",
                "type": "table",
                "data": {"rows": 1, "cols": 2, "cells": ["x", "1"]}
            },
            {
                "type": "topicmap",
                "data": {"paths": []}
            }
        ]
    }"##;

    #[test]
    fn test_report_json() {
        let report: ReportData = serde_json::from_str(REPORT_JSON).unwrap();
        assert_eq!(report.children.len(), 3);

        let first = &report.children[0];
        assert_eq!(first.title_text(), Some("Sources"));
        assert_eq!(first.margin, 3.0);
        assert_eq!(first.text_margin, 5.0);
        assert_eq!(first.font_family, "Metric-Light");
        assert!(first.visualization.is_chart());

        let second = &report.children[1];
        assert_eq!(second.margin, 10.0);
        assert_eq!(second.font_family, "Arial");
        assert_eq!(second.visualization.kind(), "table");

        let third = &report.children[2];
        assert_eq!(third.anchor(), Anchor::full());
        assert_eq!(third.visualization.kind(), "topicmap");

        assert!(report.validate().is_ok());
    }

    #[test]
    fn test_report_validate_reports_bad_child() {
        let report = ReportData::new(vec![ReportChild::new(
            Anchor::full(),
            Visualization::Table(TableData::new(2, 2, vec!["only one".into()])),
        )]);
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{"children": [{"type": "piechart", "data": {}}]}"#;
        assert!(serde_json::from_str::<ReportData>(json).is_err());
    }

    #[test]
    fn test_chart_kinds() {
        assert!(Visualization::DateGraph(DateSeriesData::default()).is_chart());
        assert!(!Visualization::Text(TextData::default()).is_chart());
        assert!(!Visualization::List(ListData::default()).is_chart());
    }
}
