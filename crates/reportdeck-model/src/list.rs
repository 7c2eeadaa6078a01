//! Document list data

use serde::{Deserialize, Serialize};

/// A list of search result documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListData {
    pub docs: Vec<ListDocument>,
    /// Draw a document icon beside each entry
    #[serde(default = "default_draw_icons")]
    pub draw_icons: bool,
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f64,
    #[serde(default = "default_date_font_size")]
    pub date_font_size: f64,
    #[serde(default = "default_ref_font_size")]
    pub ref_font_size: f64,
    #[serde(default = "default_summary_font_size")]
    pub summary_font_size: f64,
}

/// A single entry in a document list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocument {
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    /// Summary text; highlighted spans are wrapped in placeholder tags
    #[serde(default)]
    pub summary: Option<String>,
    /// Thumbnail image reference
    #[serde(default)]
    pub thumbnail: Option<String>,
}

fn default_draw_icons() -> bool {
    true
}

fn default_title_font_size() -> f64 {
    12.0
}

fn default_date_font_size() -> f64 {
    10.0
}

fn default_ref_font_size() -> f64 {
    10.0
}

fn default_summary_font_size() -> f64 {
    12.0
}

impl Default for ListData {
    fn default() -> Self {
        Self {
            docs: Vec::new(),
            draw_icons: default_draw_icons(),
            title_font_size: default_title_font_size(),
            date_font_size: default_date_font_size(),
            ref_font_size: default_ref_font_size(),
            summary_font_size: default_summary_font_size(),
        }
    }
}

impl ListData {
    /// Create a list with default font sizes
    pub fn new(docs: Vec<ListDocument>) -> Self {
        Self {
            docs,
            ..Default::default()
        }
    }
}

impl ListDocument {
    /// Create a document entry with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}
