//! Tabular data

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A grid of text cells listed row by row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub rows: usize,
    pub cols: usize,
    /// `rows * cols` cells: the first row, then the second, and so on
    pub cells: Vec<String>,
}

impl TableData {
    /// Create table data
    pub fn new(rows: usize, cols: usize, cells: Vec<String>) -> Self {
        Self { rows, cols, cells }
    }

    /// Check the grid has at least one cell and the cell count matches
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ModelError::invalid_input(format!(
                "table must have at least one row and column, got {}x{}",
                self.rows, self.cols
            )));
        }
        let expected = self.rows.checked_mul(self.cols).ok_or_else(|| {
            ModelError::invalid_input(format!(
                "table of {}x{} is too large",
                self.rows, self.cols
            ))
        })?;
        if self.cells.len() != expected {
            return Err(ModelError::invalid_input(format!(
                "table of {}x{} needs {} cells, got {}",
                self.rows,
                self.cols,
                expected,
                self.cells.len()
            )));
        }
        Ok(())
    }

    /// Cell text at the given position
    pub fn cell(&self, row: usize, col: usize) -> &str {
        row.checked_mul(self.cols)
            .and_then(|start| start.checked_add(col))
            .and_then(|index| self.cells.get(index))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let cells = vec!["a".to_string(), "1".to_string(), "b".to_string(), "2".to_string()];
        assert!(TableData::new(2, 2, cells.clone()).validate().is_ok());
        assert!(TableData::new(3, 2, cells.clone()).validate().is_err());
        assert!(TableData::new(0, 0, Vec::new()).validate().is_err());
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = TableData::new(usize::MAX, 2, Vec::new()).validate().unwrap_err();
        assert!(err.reason().contains("too large"));

        // 2^33 x 2^31 cells wraps to zero without the overflow check
        let json = format!(r#"{{"rows": {}, "cols": {}, "cells": []}}"#, 1u64 << 33, 1u64 << 31);
        if let Ok(table) = serde_json::from_str::<TableData>(&json) {
            assert!(table.validate().is_err());
        }
    }

    #[test]
    fn test_cell_lookup() {
        let table = TableData::new(2, 2, vec!["a".into(), "1".into(), "b".into(), "2".into()]);
        assert_eq!(table.cell(1, 0), "b");
        assert_eq!(table.cell(0, 1), "1");
        assert_eq!(table.cell(5, 5), "");
        assert_eq!(table.cell(usize::MAX, 1), "");
    }
}
