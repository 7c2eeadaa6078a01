//! Single-sheet companion workbooks
//!
//! Every chart part points at an embedded spreadsheet holding the data it
//! plots. PowerPoint reports the deck as damaged if that workbook is missing
//! or unreadable, so charts always ship with one, even though the chart XML
//! carries cached copies of the same values.
//!
//! The workbook written here is deliberately minimal: one sheet named
//! `Sheet1`, inline strings, and a second cell style using the built-in
//! short date format (number format 14).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::escape::escape;

use crate::archive::OoxmlArchive;
use crate::content_types::{ContentTypes, CT_RELATIONSHIPS};
use crate::error::Result;
use crate::relationships::Relationships;
use crate::xml::format_number;

/// The only sheet name used in generated workbooks
pub const SHEET_NAME: &str = "Sheet1";

/// Built-in short date number format
pub const DATE_NUMBER_FORMAT: u32 = 14;

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

/// A cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Excel serial date, rendered with the date style
    Date(f64),
}

impl CellValue {
    /// The raw value as it is stored in the sheet
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) | CellValue::Date(n) => format_number(*n),
        }
    }
}

/// An in-memory single-sheet workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    /// Cells keyed by zero-based (row, column)
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a text cell
    pub fn set_text(&mut self, row: u32, col: u32, text: impl Into<String>) {
        self.cells.insert((row, col), CellValue::Text(text.into()));
    }

    /// Set a numeric cell
    pub fn set_number(&mut self, row: u32, col: u32, value: f64) {
        self.cells.insert((row, col), CellValue::Number(value));
    }

    /// Set a date cell from unix epoch seconds, returning the serial value
    /// written. Timestamps outside chrono's range are written as 0.
    pub fn set_date(&mut self, row: u32, col: u32, unix_secs: i64) -> f64 {
        let serial = excel_serial(unix_secs).unwrap_or(0.0);
        self.cells.insert((row, col), CellValue::Date(serial));
        serial
    }

    /// Get a cell
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Number of populated cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the sheet is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Package the workbook as `.xlsx` bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut package = OoxmlArchive::new();

        let mut types = ContentTypes::new();
        types.add_default("rels", CT_RELATIONSHIPS);
        types.add_default("xml", "application/xml");
        types.add_override("xl/workbook.xml", CT_WORKBOOK);
        types.add_override("xl/worksheets/sheet1.xml", CT_WORKSHEET);
        types.add_override("xl/styles.xml", CT_STYLES);
        package.set_string(crate::content_types::CONTENT_TYPES_PATH, types.to_xml());

        let mut root_rels = Relationships::new();
        root_rels.add("xl/workbook.xml", Relationships::TYPE_OFFICE_DOCUMENT);
        package.set_string("_rels/.rels", root_rels.to_xml());

        let mut workbook_rels = Relationships::new();
        workbook_rels.add("worksheets/sheet1.xml", Relationships::TYPE_WORKSHEET);
        workbook_rels.add("styles.xml", Relationships::TYPE_STYLES);
        package.set_string("xl/_rels/workbook.xml.rels", workbook_rels.to_xml());

        package.set_string("xl/workbook.xml", workbook_xml());
        package.set_string("xl/styles.xml", styles_xml());
        package.set_string("xl/worksheets/sheet1.xml", self.sheet_xml());

        package.to_bytes()
    }

    fn sheet_xml(&self) -> String {
        use std::fmt::Write;

        let mut xml = String::with_capacity(64 * self.cells.len() + 256);
        xml.push_str(crate::xml::XML_DECLARATION);
        let _ = write!(xml, r#"<worksheet xmlns="{}"><sheetData>"#, SPREADSHEET_NS);

        let mut current_row = None;
        for (&(row, col), value) in &self.cells {
            if current_row != Some(row) {
                if current_row.is_some() {
                    xml.push_str("</row>");
                }
                let _ = write!(xml, r#"<row r="{}">"#, row + 1);
                current_row = Some(row);
            }
            let reference = format!("{}{}", column_letter(col), row + 1);
            match value {
                CellValue::Text(text) => {
                    let _ = write!(
                        xml,
                        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        reference,
                        escape(text.as_str())
                    );
                }
                CellValue::Number(n) => {
                    let _ = write!(xml, r#"<c r="{}"><v>{}</v></c>"#, reference, format_number(*n));
                }
                CellValue::Date(serial) => {
                    let _ = write!(
                        xml,
                        r#"<c r="{}" s="1"><v>{}</v></c>"#,
                        reference,
                        format_number(*serial)
                    );
                }
            }
        }
        if current_row.is_some() {
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

fn workbook_xml() -> String {
    format!(
        r#"{}<workbook xmlns="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        crate::xml::XML_DECLARATION,
        SPREADSHEET_NS,
        SHEET_NAME
    )
}

fn styles_xml() -> String {
    format!(
        concat!(
            r#"{}<styleSheet xmlns="{}">"#,
            r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border/></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
            r#"<xf numFmtId="{}" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs>"#,
            r#"</styleSheet>"#
        ),
        crate::xml::XML_DECLARATION,
        SPREADSHEET_NS,
        DATE_NUMBER_FORMAT
    )
}

/// Convert unix epoch seconds to an Excel serial date (days since
/// 1899-12-30, fractional part is the time of day, UTC)
pub fn excel_serial(unix_secs: i64) -> Option<f64> {
    let instant = DateTime::<Utc>::from_timestamp(unix_secs, 0)?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let elapsed = instant.naive_utc().signed_duration_since(epoch);
    Some(elapsed.num_seconds() as f64 / 86_400.0)
}

/// Column letters for a zero-based column index (0 = A, 26 = AA)
pub fn column_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col as u64 + 1;
    while n > 0 {
        let remainder = ((n - 1) % 26) as u8;
        letters.push((b'A' + remainder) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Absolute single-cell reference, e.g. `Sheet1!$B$1`
pub fn cell_reference(row: u32, col: u32) -> String {
    format!("{}!${}${}", SHEET_NAME, column_letter(col), row + 1)
}

/// Absolute area reference for a column span, e.g. `Sheet1!$A$2:$A$5`
pub fn area_reference(first_row: u32, last_row: u32, col: u32) -> String {
    let letter = column_letter(col);
    format!(
        "{}!${}${}:${}${}",
        SHEET_NAME,
        letter,
        first_row + 1,
        letter,
        last_row + 1
    )
}
