//! Chart data: date series (line chart) and sunburst (doughnut chart)

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Time-series data for a date-axis line chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSeriesData {
    /// Unix epoch seconds, one per category point
    pub timestamps: Vec<i64>,
    /// One or more series with values matching the timestamps
    pub rows: Vec<DateSeriesRow>,
}

/// A single series in a date chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSeriesRow {
    /// Line colour as a hex string, e.g. `#FF0000`
    pub color: String,
    /// Series label shown in the legend
    pub label: String,
    /// Plot against the secondary y-axis
    #[serde(default)]
    pub secondary_axis: bool,
    /// Values, same length as the timestamps
    pub values: Vec<f64>,
}

impl DateSeriesData {
    /// Create date series data
    pub fn new(timestamps: Vec<i64>, rows: Vec<DateSeriesRow>) -> Self {
        Self { timestamps, rows }
    }

    /// Check that there are at least two timestamps, at least one row, and
    /// that every row has one value per timestamp.
    pub fn validate(&self) -> Result<()> {
        let length = self.timestamps.len();
        if length < 2 {
            return Err(ModelError::invalid_input(format!(
                "date series needs at least 2 timestamps, got {}",
                length
            )));
        }
        if self.rows.is_empty() {
            return Err(ModelError::invalid_input(
                "date series needs at least one row",
            ));
        }
        if let Some((idx, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.values.len() != length)
        {
            return Err(ModelError::invalid_input(format!(
                "row {} ('{}') has {} values but there are {} timestamps",
                idx,
                row.label,
                row.values.len(),
                length
            )));
        }
        Ok(())
    }

    /// Whether any row asks for the secondary axis
    pub fn uses_secondary_axis(&self) -> bool {
        self.rows.iter().any(|r| r.secondary_axis)
    }
}

impl DateSeriesRow {
    /// Create a primary-axis row
    pub fn new(label: impl Into<String>, color: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            color: color.into(),
            label: label.into(),
            secondary_axis: false,
            values,
        }
    }

    /// Move this row to the secondary axis
    pub fn on_secondary_axis(mut self) -> Self {
        self.secondary_axis = true;
        self
    }
}

/// Category data for a doughnut ("sunburst") chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunburstData {
    pub categories: Vec<String>,
    /// One value per category
    pub values: Vec<f64>,
    /// Fill colours per category, cycled; template colours are kept when absent
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    /// Stroke colours per category, cycled
    #[serde(default)]
    pub stroke_colors: Option<Vec<String>>,
    /// Indices of categories to keep in the legend; all are shown when absent
    #[serde(default)]
    pub show_in_legend: Option<Vec<usize>>,
    #[serde(default)]
    pub title: Option<String>,
}

impl SunburstData {
    /// Create sunburst data with template styling
    pub fn new(categories: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            categories,
            values,
            ..Default::default()
        }
    }

    /// Set the chart title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check that each category has exactly one value
    pub fn validate(&self) -> Result<()> {
        if self.categories.len() != self.values.len() {
            return Err(ModelError::invalid_input(format!(
                "number of values ({}) should match the number of categories ({})",
                self.values.len(),
                self.categories.len()
            )));
        }
        Ok(())
    }

    /// Fill colours, if any were supplied
    pub fn fill_colors(&self) -> Option<&[String]> {
        self.colors.as_deref().filter(|c| !c.is_empty())
    }

    /// Stroke colours, if any were supplied
    pub fn stroke_colors(&self) -> Option<&[String]> {
        self.stroke_colors.as_deref().filter(|c| !c.is_empty())
    }

    /// The title, if it has any non-whitespace content
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(timestamps: usize, values: &[usize]) -> DateSeriesData {
        DateSeriesData::new(
            (0..timestamps as i64).map(|t| t * 86_400).collect(),
            values
                .iter()
                .enumerate()
                .map(|(i, n)| DateSeriesRow::new(format!("row{}", i), "#FF0000", vec![1.0; *n]))
                .collect(),
        )
    }

    #[test]
    fn test_date_series_valid() {
        assert!(series(4, &[4]).validate().is_ok());
        assert!(series(2, &[2, 2, 2]).validate().is_ok());
    }

    #[test]
    fn test_date_series_needs_two_timestamps() {
        let err = series(1, &[1]).validate().unwrap_err();
        assert!(err.reason().contains("at least 2 timestamps"));
    }

    #[test]
    fn test_date_series_needs_rows() {
        assert!(series(3, &[]).validate().is_err());
    }

    #[test]
    fn test_date_series_row_length_mismatch() {
        let err = series(3, &[3, 2]).validate().unwrap_err();
        assert!(err.reason().contains("row 1"));
    }

    #[test]
    fn test_date_series_json() {
        let json = r##"{
            "timestamps": [1500000000, 1500086400],
            "rows": [
                {"color": "#00FF00", "label": "hits", "values": [1, 2]},
                {"color": "#0000FF", "label": "misses", "secondaryAxis": true, "values": [3, 4]}
            ]
        }"##;
        let data: DateSeriesData = serde_json::from_str(json).unwrap();
        assert_eq!(data.rows.len(), 2);
        assert!(!data.rows[0].secondary_axis);
        assert!(data.rows[1].secondary_axis);
        assert!(data.uses_secondary_axis());
    }

    #[test]
    fn test_sunburst_validate() {
        let ok = SunburstData::new(vec!["a".into(), "b".into()], vec![1.0, 2.0]);
        assert!(ok.validate().is_ok());

        let bad = SunburstData::new(vec!["a".into()], vec![1.0, 2.0]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_sunburst_optional_fields() {
        let json = r##"{"categories": ["Red"], "values": [1], "colors": [], "title": "  "}"##;
        let data: SunburstData = serde_json::from_str(json).unwrap();
        assert!(data.fill_colors().is_none());
        assert!(data.stroke_colors().is_none());
        assert!(data.show_in_legend.is_none());
        assert!(data.title_text().is_none());
    }
}
