//! Sunburst data in the template's doughnut chart

use reportdeck_model::SunburstData;
use reportdeck_ooxml::workbook::{area_reference, cell_reference};
use reportdeck_ooxml::{Workbook, XmlElement};

use super::{
    cached_format, missing, parse_colors, set_line_fill, set_series_data, set_series_text,
    set_shape_fill, set_val, val_element, BoundChart,
};
use crate::error::Result;
use crate::template::ChartFragment;

/// Elements following `c:dPt` in a pie series
const DPT_FOLLOWERS: [&str; 4] = ["c:dLbls", "c:cat", "c:val", "c:extLst"];

/// Elements following `c:cat` in a pie series
const CAT_FOLLOWERS: [&str; 2] = ["c:val", "c:extLst"];

/// Elements following `c:idx` in a data point
const DPT_IDX_FOLLOWERS: [&str; 7] = [
    "c:invertIfNegative",
    "c:marker",
    "c:bubble3D",
    "c:explosion",
    "c:spPr",
    "c:pictureOptions",
    "c:extLst",
];

/// Elements following `c:spPr` in a data point
const DPT_SPPR_FOLLOWERS: [&str; 2] = ["c:pictureOptions", "c:extLst"];

/// Elements following `c:legend` in `c:chart`
const LEGEND_FOLLOWERS: [&str; 4] = [
    "c:plotVisOnly",
    "c:dispBlanksAs",
    "c:showDLblsOverMax",
    "c:extLst",
];

/// Elements following `c:legendEntry` in `c:legend`
const LEGEND_ENTRY_FOLLOWERS: [&str; 5] = ["c:layout", "c:overlay", "c:spPr", "c:txPr", "c:extLst"];

/// Bind sunburst data into a copy of the doughnut chart.
///
/// One category per data point: `A2:A<n+1>` holds the categories and
/// `B2:B<n+1>` the values, `B1` the title, which doubles as the series name.
pub fn bind_sunburst(fragment: &ChartFragment, data: &SunburstData) -> Result<BoundChart> {
    data.validate()?;
    let fills = data.fill_colors().map(parse_colors).transpose()?;
    let strokes = data.stroke_colors().map(parse_colors).transpose()?;

    let count = data.categories.len();
    let title = data.title_text().unwrap_or("");

    let mut workbook = Workbook::new();
    if !title.is_empty() {
        workbook.set_text(0, 1, title);
    }
    for (i, (category, value)) in data.categories.iter().zip(&data.values).enumerate() {
        let row = i as u32 + 1;
        workbook.set_text(row, 0, category.as_str());
        workbook.set_number(row, 1, *value);
    }

    let mut chart = fragment.chart_xml();
    let series = chart
        .find_mut("c:doughnutChart")
        .and_then(|d| d.child_mut("c:ser"))
        .ok_or_else(|| missing("doughnut series"))?;

    // An empty chart still refers to row 2 so the formulas stay valid
    let last_row = count.max(1) as u32;
    let categories: Vec<&str> = data.categories.iter().map(String::as_str).collect();
    let format_code = cached_format(series, "c:val").unwrap_or_else(|| "General".to_string());

    set_series_text(series, &cell_reference(0, 1), title);
    set_series_data(
        series,
        "c:cat",
        &CAT_FOLLOWERS,
        super::str_ref(&area_reference(1, last_row, 0), &categories),
    );
    set_series_data(
        series,
        "c:val",
        &["c:extLst"],
        super::num_ref(&area_reference(1, last_row, 1), &format_code, &data.values),
    );

    if fills.is_some() || strokes.is_some() {
        let template = series
            .child("c:dPt")
            .cloned()
            .unwrap_or_else(default_data_point);
        series.remove_children_named("c:dPt");

        for i in 0..count {
            let mut point = template.clone();
            set_val(&mut point, "c:idx", i, &DPT_IDX_FOLLOWERS);
            let sp_pr = point.ensure_child("c:spPr", &DPT_SPPR_FOLLOWERS);
            if let Some(fills) = &fills {
                set_shape_fill(sp_pr, fills[i % fills.len()]);
            }
            if let Some(strokes) = &strokes {
                set_line_fill(sp_pr, strokes[i % strokes.len()]);
            }
            series.insert_before_first_of(point, &DPT_FOLLOWERS);
        }
    }

    if let Some(shown) = &data.show_in_legend {
        hide_legend_entries(&mut chart, shown, count);
    }

    if title.is_empty() {
        if let Some(chart_element) = chart.child_mut("c:chart") {
            if let Some(deleted) = chart_element.child_mut("c:autoTitleDeleted") {
                deleted.set_attr("val", "1");
            }
            chart_element.remove_children_named("c:title");
        }
    }

    Ok(BoundChart { chart, workbook })
}

fn default_data_point() -> XmlElement {
    XmlElement::new("c:dPt")
        .with_child(val_element("c:idx", "0"))
        .with_child(val_element("c:bubble3D", "0"))
        .with_child(XmlElement::new("c:spPr"))
}

/// Delete the legend entry of every category not listed in `shown`
fn hide_legend_entries(chart: &mut XmlElement, shown: &[usize], count: usize) {
    let Some(chart_element) = chart.child_mut("c:chart") else {
        return;
    };
    let legend = chart_element.ensure_child("c:legend", &LEGEND_FOLLOWERS);
    if legend.child("c:legendPos").is_none() {
        legend
            .children
            .insert(0, reportdeck_ooxml::XmlNode::Element(val_element("c:legendPos", "r")));
    }

    let mut shown: Vec<usize> = shown.to_vec();
    shown.sort_unstable();
    shown.dedup();

    let mut next = shown.iter().peekable();
    for index in 0..count {
        while next.next_if(|&&s| s < index).is_some() {}
        if next.next_if_eq(&&index).is_some() {
            continue;
        }

        let existing = legend.children_named_mut("c:legendEntry").find(|entry| {
            entry.child("c:idx").and_then(|i| i.attr("val")) == Some(index.to_string().as_str())
        });
        match existing {
            Some(entry) => {
                entry.remove_children_named("c:txPr");
                entry
                    .ensure_child("c:delete", &["c:extLst"])
                    .set_attr("val", "1");
            }
            None => {
                let entry = XmlElement::new("c:legendEntry")
                    .with_child(val_element("c:idx", index.to_string()))
                    .with_child(val_element("c:delete", "1"));
                legend.insert_before_first_of(entry, &LEGEND_ENTRY_FOLLOWERS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::cached_points;
    use crate::sample::sample_template;
    use crate::template::TemplateHandle;
    use reportdeck_ooxml::workbook::CellValue;

    fn template() -> TemplateHandle {
        TemplateHandle::load(&sample_template().unwrap()).unwrap()
    }

    fn rgb() -> SunburstData {
        SunburstData::new(
            vec!["Red".into(), "Green".into(), "Blue".into()],
            vec![1.0, 169.0, 130.0],
        )
        .with_title("Colours")
    }

    fn series(chart: &XmlElement) -> &XmlElement {
        chart.find("c:doughnutChart").unwrap().child("c:ser").unwrap()
    }

    #[test]
    fn test_points_and_formulas() {
        let bound = bind_sunburst(template().doughnut(), &rgb()).unwrap();
        let ser = series(&bound.chart);

        let cat = ser.child("c:cat").unwrap().child("c:strRef").unwrap();
        let val = ser.child("c:val").unwrap().child("c:numRef").unwrap();
        assert_eq!(cat.child("c:f").unwrap().text(), "Sheet1!$A$2:$A$4");
        assert_eq!(val.child("c:f").unwrap().text(), "Sheet1!$B$2:$B$4");
        assert_eq!(cached_points(cat), vec!["Red", "Green", "Blue"]);
        assert_eq!(cached_points(val), vec!["1", "169", "130"]);
        assert_eq!(
            cat.find("c:ptCount").unwrap().attr("val"),
            val.find("c:ptCount").unwrap().attr("val")
        );

        let tx = ser.child("c:tx").unwrap();
        assert_eq!(tx.find("c:f").unwrap().text(), "Sheet1!$B$1");
        assert_eq!(tx.find("c:v").unwrap().text(), "Colours");
        assert!(bound.chart.find("c:title").is_some());
    }

    #[test]
    fn test_workbook_layout() {
        let bound = bind_sunburst(template().doughnut(), &rgb()).unwrap();
        let book = &bound.workbook;
        assert_eq!(book.cell(0, 1), Some(&CellValue::Text("Colours".into())));
        assert_eq!(book.cell(1, 0), Some(&CellValue::Text("Red".into())));
        assert_eq!(book.cell(3, 1), Some(&CellValue::Number(130.0)));
    }

    #[test]
    fn test_colours_cycle() {
        let mut data = rgb();
        data.colors = Some(vec!["#FF0000".into(), "#00FF00".into()]);
        data.stroke_colors = Some(vec!["#000000".into()]);
        let bound = bind_sunburst(template().doughnut(), &data).unwrap();

        let points: Vec<&XmlElement> = series(&bound.chart).children_named("c:dPt").collect();
        assert_eq!(points.len(), 3);
        let fill = |p: &XmlElement| {
            p.path(&["c:spPr", "a:solidFill", "a:srgbClr"])
                .and_then(|c| c.attr("val"))
                .map(str::to_string)
        };
        assert_eq!(fill(points[0]).as_deref(), Some("FF0000"));
        assert_eq!(fill(points[1]).as_deref(), Some("00FF00"));
        assert_eq!(fill(points[2]).as_deref(), Some("FF0000"));
        assert_eq!(points[2].child("c:idx").unwrap().attr("val"), Some("2"));

        let stroke = points[1]
            .path(&["c:spPr", "a:ln", "a:solidFill"])
            .unwrap();
        assert_eq!(stroke.elements().count(), 1);
        assert_eq!(stroke.child("a:srgbClr").unwrap().attr("val"), Some("000000"));
        // the template's scheme fill is gone
        assert!(points[0].find("a:schemeClr").is_none());
    }

    #[test]
    fn test_legend_entries_hidden() {
        let mut data = rgb();
        data.show_in_legend = Some(vec![2, 0, 7]);
        let bound = bind_sunburst(template().doughnut(), &data).unwrap();

        let legend = bound.chart.find("c:legend").unwrap();
        let hidden: Vec<&str> = legend
            .children_named("c:legendEntry")
            .filter(|e| e.child("c:delete").and_then(|d| d.attr("val")) == Some("1"))
            .filter_map(|e| e.child("c:idx").and_then(|i| i.attr("val")))
            .collect();
        assert_eq!(hidden, vec!["1"]);
        assert_eq!(legend.elements().next().unwrap().name, "c:legendPos");
    }

    #[test]
    fn test_blank_title_removed() {
        let mut data = rgb();
        data.title = Some("  ".into());
        let bound = bind_sunburst(template().doughnut(), &data).unwrap();
        assert!(bound.chart.find("c:title").is_none());
        assert_eq!(
            bound.chart.find("c:autoTitleDeleted").unwrap().attr("val"),
            Some("1")
        );
    }

    #[test]
    fn test_invalid_input_leaves_fragment() {
        let template = template();
        let before = template.doughnut().clone();

        let mut data = rgb();
        data.values.pop();
        assert_eq!(bind_sunburst(template.doughnut(), &data).unwrap_err().code(), "RPT002");

        let mut data = rgb();
        data.colors = Some(vec!["not a colour".into()]);
        assert_eq!(bind_sunburst(template.doughnut(), &data).unwrap_err().code(), "RPT002");

        bind_sunburst(template.doughnut(), &rgb()).unwrap();
        assert_eq!(template.doughnut(), &before);
    }

    #[test]
    fn test_chart_without_doughnut_is_a_template_error() {
        let err = bind_sunburst(template().line(), &rgb()).unwrap_err();
        assert_eq!(err.code(), "RPT001");
        assert!(err.to_string().contains("doughnut series"));
    }
}
