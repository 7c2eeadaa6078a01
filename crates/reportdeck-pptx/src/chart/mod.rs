//! Binding data into template charts.
//!
//! Each binder takes a fresh copy of a fragment's chart XML, rewrites its
//! series for the new data and builds the companion workbook the series
//! formulas point at. The fragment itself is never touched.

mod date_series;
mod sunburst;

pub use date_series::bind_date_series;
pub use sunburst::bind_sunburst;

use reportdeck_ooxml::xml::format_number;
use reportdeck_ooxml::{Workbook, XmlElement};

use crate::color::{ColorChoice, Rgba};
use crate::error::{ReportError, Result};

/// Chart XML with its companion workbook, ready to be committed
#[derive(Debug, Clone)]
pub struct BoundChart {
    pub chart: XmlElement,
    pub workbook: Workbook,
}

/// Elements that may follow `c:tx` inside a series
const TX_FOLLOWERS: [&str; 12] = [
    "c:spPr",
    "c:explosion",
    "c:marker",
    "c:dPt",
    "c:dLbls",
    "c:trendline",
    "c:errBars",
    "c:cat",
    "c:val",
    "c:smooth",
    "c:shape",
    "c:extLst",
];

/// Elements that may follow `c:spPr` inside a series
const SERIES_SPPR_FOLLOWERS: [&str; 10] = [
    "c:explosion",
    "c:marker",
    "c:dPt",
    "c:dLbls",
    "c:trendline",
    "c:errBars",
    "c:cat",
    "c:val",
    "c:smooth",
    "c:extLst",
];

/// Fill elements of `a:spPr`
const SHAPE_FILLS: [&str; 6] = [
    "a:noFill",
    "a:solidFill",
    "a:gradFill",
    "a:blipFill",
    "a:pattFill",
    "a:grpFill",
];

/// Fill elements allowed inside `a:ln`
const LINE_FILLS: [&str; 4] = ["a:noFill", "a:solidFill", "a:gradFill", "a:pattFill"];

/// Elements following the fill in `a:spPr`
const SHAPE_FILL_FOLLOWERS: [&str; 6] = [
    "a:ln",
    "a:effectLst",
    "a:effectDag",
    "a:scene3d",
    "a:sp3d",
    "a:extLst",
];

/// Elements following `a:ln` in `a:spPr`
const LINE_FOLLOWERS: [&str; 5] = ["a:effectLst", "a:effectDag", "a:scene3d", "a:sp3d", "a:extLst"];

/// Elements following the fill inside `a:ln`
const LINE_FILL_FOLLOWERS: [&str; 8] = [
    "a:prstDash",
    "a:custDash",
    "a:round",
    "a:bevel",
    "a:miter",
    "a:headEnd",
    "a:tailEnd",
    "a:extLst",
];

/// A template chart that lacks an element the binders rely on
fn missing(what: &str) -> ReportError {
    ReportError::template_load(format!("template chart has no {}", what))
}

fn parse_colors(colors: &[String]) -> Result<Vec<Rgba>> {
    colors.iter().map(|c| Rgba::parse(c)).collect()
}

fn val_element(name: &str, value: impl Into<String>) -> XmlElement {
    XmlElement::new(name).with_attr("val", value)
}

/// Set a `c:idx` / `c:order` style value child
fn set_val(parent: &mut XmlElement, name: &str, value: usize, followers: &[&str]) {
    parent
        .ensure_child(name, followers)
        .set_attr("val", value.to_string());
}

fn point(index: usize, value: String) -> XmlElement {
    XmlElement::new("c:pt")
        .with_attr("idx", index.to_string())
        .with_child(XmlElement::new("c:v").with_text(value))
}

/// `c:strRef` with its cached values
fn str_ref(formula: &str, values: &[&str]) -> XmlElement {
    let mut cache = XmlElement::new("c:strCache").with_child(val_element("c:ptCount", values.len().to_string()));
    for (i, value) in values.iter().enumerate() {
        cache.push(point(i, value.to_string()));
    }
    XmlElement::new("c:strRef")
        .with_child(XmlElement::new("c:f").with_text(formula))
        .with_child(cache)
}

/// `c:numRef` with its cached values
fn num_ref(formula: &str, format_code: &str, values: &[f64]) -> XmlElement {
    let mut cache = XmlElement::new("c:numCache")
        .with_child(XmlElement::new("c:formatCode").with_text(format_code))
        .with_child(val_element("c:ptCount", values.len().to_string()));
    for (i, value) in values.iter().enumerate() {
        cache.push(point(i, format_number(*value)));
    }
    XmlElement::new("c:numRef")
        .with_child(XmlElement::new("c:f").with_text(formula))
        .with_child(cache)
}

/// The number format a series slot's cache used, if any
fn cached_format(series: &XmlElement, slot: &str) -> Option<String> {
    series
        .child(slot)?
        .find("c:formatCode")
        .map(XmlElement::text)
        .filter(|code| !code.is_empty())
}

/// Point the series name at `formula`, caching `text`
fn set_series_text(series: &mut XmlElement, formula: &str, text: &str) {
    let tx = series.ensure_child("c:tx", &TX_FOLLOWERS);
    tx.children.clear();
    tx.push(str_ref(formula, &[text]));
}

/// Replace the data reference held by `c:cat` or `c:val`
fn set_series_data(series: &mut XmlElement, slot: &str, followers: &[&str], reference: XmlElement) {
    let element = series.ensure_child(slot, followers);
    element.children.clear();
    element.push(reference);
}

/// Make `a:solidFill` the only fill of `sp_pr`
fn set_shape_fill(sp_pr: &mut XmlElement, color: Rgba) {
    sp_pr.remove_children_in(&SHAPE_FILLS);
    let mut fill = XmlElement::new("a:solidFill");
    ColorChoice::Rgb(color).write_into(&mut fill);
    sp_pr.insert_before_first_of(fill, &SHAPE_FILL_FOLLOWERS);
}

/// Make `a:solidFill` the only fill of the outline in `sp_pr`
fn set_line_fill(sp_pr: &mut XmlElement, color: Rgba) {
    let line = sp_pr.ensure_child("a:ln", &LINE_FOLLOWERS);
    line.remove_children_in(&LINE_FILLS);
    let mut fill = XmlElement::new("a:solidFill");
    ColorChoice::Rgb(color).write_into(&mut fill);
    line.insert_before_first_of(fill, &LINE_FILL_FOLLOWERS);
}

/// Cached point values below a `c:strRef` or `c:numRef`
#[cfg(test)]
pub(crate) fn cached_points(reference: &XmlElement) -> Vec<String> {
    reference
        .find_all("c:pt")
        .into_iter()
        .map(|pt| pt.child("c:v").map(XmlElement::text).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_ref_cache() {
        let reference = num_ref("Sheet1!$B$2:$B$3", "General", &[1.0, 2.5]);
        assert_eq!(reference.child("c:f").unwrap().text(), "Sheet1!$B$2:$B$3");
        let cache = reference.child("c:numCache").unwrap();
        assert_eq!(cache.child("c:ptCount").unwrap().attr("val"), Some("2"));
        assert_eq!(cached_points(&reference), vec!["1", "2.5"]);
    }

    #[test]
    fn test_line_fill_replaces_scheme_colour() {
        let mut sp_pr = XmlElement::parse(
            br#"<c:spPr xmlns:c="c" xmlns:a="a"><a:ln w="28575"><a:solidFill><a:schemeClr val="accent1"/></a:solidFill><a:round/></a:ln></c:spPr>"#,
        )
        .unwrap();
        set_line_fill(&mut sp_pr, Rgba::rgb(255, 0, 0));

        let line = sp_pr.child("a:ln").unwrap();
        let fill = line.child("a:solidFill").unwrap();
        assert_eq!(fill.elements().count(), 1);
        assert_eq!(fill.child("a:srgbClr").unwrap().attr("val"), Some("FF0000"));
        // fill stays ahead of the join style
        assert_eq!(line.elements().next().unwrap().name, "a:solidFill");
    }

    #[test]
    fn test_shape_fill_replaces_any_fill() {
        let mut sp_pr = XmlElement::parse(
            br#"<c:spPr xmlns:c="c" xmlns:a="a"><a:gradFill/><a:ln/></c:spPr>"#,
        )
        .unwrap();
        set_shape_fill(&mut sp_pr, Rgba::rgb(0, 0, 255));
        let names: Vec<&str> = sp_pr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a:solidFill", "a:ln"]);
    }
}
