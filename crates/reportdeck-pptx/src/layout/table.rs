//! Tables, optionally cropped to the height of their region

use crate::color::Rgba;
use crate::geometry::Rect;
use crate::shape::{ShapeKind, TableCell, TableRow, TableShape};
use crate::slide::Slide;
use crate::text::{measure_text_height, Paragraph, TextBody, TextRun};

/// Narrowest the count column of a two-column table gets
const MIN_COUNT_COLUMN_WIDTH: f64 = 70.0;

/// Height of an empty row
const MIN_ROW_HEIGHT: f64 = 20.0;

const ELLIPSIS: &str = "\u{2026}";

/// Draw a `rows` x `cols` table of `cells`, laid out row by row.
///
/// Two-column tables are assumed to be label/count pairs and give the
/// count column a tenth of the width (at least 70pt, at most half). With
/// `crop`, the first row that would overflow the region (unless it is the
/// last one) is merged into a single "…" cell and the rest is dropped. The
/// table is centred horizontally. Returns the table's shape id.
pub fn draw_table(
    slide: &mut Slide,
    region: Rect,
    rows: usize,
    cols: usize,
    cells: &[String],
    crop: bool,
) -> u32 {
    let available = region.width;
    let columns: Vec<f64> = if cols == 2 {
        let count = (0.5 * available).min(MIN_COUNT_COLUMN_WIDTH.max(0.1 * available));
        vec![available - count, count]
    } else {
        vec![available / cols.max(1) as f64; cols]
    };

    let mut table_rows = Vec::with_capacity(rows);
    let mut table_height = 0.0;
    for row in 0..rows {
        let cells: Vec<TableCell> = (0..cols)
            .map(|col| TableCell {
                text: cells.get(row * cols + col).cloned().unwrap_or_default(),
                grid_span: 1,
                h_merge: false,
            })
            .collect();
        let height = row_height(&cells, &columns);

        if crop && table_height + height > region.height && row + 1 < rows {
            table_rows.push(ellipsis_row(cols, height));
            break;
        }
        table_height += height;
        table_rows.push(TableRow { height, cells });
    }

    let width = columns.iter().sum::<f64>().min(available);
    let anchor = Rect::new(
        region.x + 0.5 * (available - width),
        region.y,
        width,
        table_height.min(region.height),
    );

    slide.add(ShapeKind::Table(TableShape {
        anchor,
        columns,
        rows: table_rows,
        border: Some(Rgba::BLACK),
    }))
}

/// Height of the tallest cell in a row
fn row_height(cells: &[TableCell], columns: &[f64]) -> f64 {
    cells
        .iter()
        .zip(columns)
        .filter(|(cell, _)| !cell.text.is_empty())
        .map(|(cell, width)| {
            let body = TextBody::from_paragraph(Paragraph::from_run(TextRun::new(
                cell.text.as_str(),
            )));
            measure_text_height(&body, *width)
        })
        .fold(MIN_ROW_HEIGHT, f64::max)
}

/// A row merged into one cell reading "…"
fn ellipsis_row(cols: usize, height: f64) -> TableRow {
    let cells = (0..cols)
        .map(|col| {
            if col == 0 {
                TableCell {
                    text: ELLIPSIS.to_string(),
                    grid_span: cols as u32,
                    h_merge: false,
                }
            } else {
                TableCell {
                    text: String::new(),
                    grid_span: 1,
                    h_merge: true,
                }
            }
        })
        .collect();
    TableRow { height, cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_template;
    use crate::template::TemplateHandle;

    fn slide_with_table(region: Rect, rows: usize, cols: usize, crop: bool) -> TableShape {
        let template = TemplateHandle::load(&sample_template().unwrap()).unwrap();
        let mut deck = template.new_presentation().unwrap();
        let id = deck.add_slide();
        let slide = deck.slide_mut(id).unwrap();

        let cells: Vec<String> = (0..rows * cols).map(|i| format!("c{}", i)).collect();
        let shape_id = draw_table(slide, region, rows, cols, &cells, crop);
        match &slide.shape(shape_id).unwrap().kind {
            ShapeKind::Table(table) => table.clone(),
            other => panic!("expected a table, got {:?}", other),
        }
    }

    #[test]
    fn test_count_column_width() {
        let table = slide_with_table(Rect::new(0.0, 0.0, 1000.0, 500.0), 3, 2, false);
        assert_eq!(table.columns, vec![900.0, 100.0]);

        // 10% would be 40pt, the minimum wins
        let table = slide_with_table(Rect::new(0.0, 0.0, 400.0, 500.0), 3, 2, false);
        assert_eq!(table.columns, vec![330.0, 70.0]);

        // never more than half
        let table = slide_with_table(Rect::new(0.0, 0.0, 100.0, 500.0), 3, 2, false);
        assert_eq!(table.columns, vec![50.0, 50.0]);
    }

    #[test]
    fn test_even_columns() {
        let table = slide_with_table(Rect::new(10.0, 20.0, 600.0, 500.0), 2, 3, false);
        assert_eq!(table.columns, vec![200.0, 200.0, 200.0]);
        assert_eq!(table.anchor.x, 10.0);
        assert_eq!(table.anchor.y, 20.0);
        assert_eq!(table.border, Some(Rgba::BLACK));
        assert_eq!(table.rows[1].cells[2].text, "c5");
    }

    #[test]
    fn test_crop_merges_overflow_row() {
        let table = slide_with_table(Rect::new(0.0, 0.0, 400.0, 50.0), 10, 2, true);
        assert_eq!(table.rows.len(), 2);

        let last = &table.rows[1];
        assert_eq!(last.cells[0].text, "\u{2026}");
        assert_eq!(last.cells[0].grid_span, 2);
        assert!(last.cells[1].h_merge);
        assert!(table.anchor.height <= 50.0);
        assert!((table.anchor.height - table.rows[0].height).abs() < 1e-9);
    }

    #[test]
    fn test_no_crop_keeps_every_row() {
        let table = slide_with_table(Rect::new(0.0, 0.0, 400.0, 50.0), 10, 2, false);
        assert_eq!(table.rows.len(), 10);
        assert!(table.rows.iter().all(|r| r.cells.iter().all(|c| !c.h_merge)));
        assert_eq!(table.anchor.height, 50.0);
    }

    #[test]
    fn test_last_row_never_cropped() {
        let table = slide_with_table(Rect::new(0.0, 0.0, 400.0, 30.0), 1, 2, true);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells[0].text, "c0");
    }
}
