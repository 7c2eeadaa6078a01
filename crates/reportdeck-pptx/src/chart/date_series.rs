//! Date series in the template's two-axis line chart

use reportdeck_model::DateSeriesData;
use reportdeck_ooxml::workbook::{area_reference, cell_reference};
use reportdeck_ooxml::{Workbook, XmlElement};
use tracing::warn;

use super::{
    cached_format, missing, parse_colors, set_line_fill, set_series_data, set_series_text,
    set_val, BoundChart, SERIES_SPPR_FOLLOWERS,
};
use crate::color::Rgba;
use crate::error::Result;
use crate::template::ChartFragment;

/// Elements following the series in `c:lineChart`
const SERIES_FOLLOWERS: [&str; 8] = [
    "c:dLbls",
    "c:dropLines",
    "c:hiLowLines",
    "c:upDownBars",
    "c:marker",
    "c:smooth",
    "c:axId",
    "c:extLst",
];

/// Elements following `c:idx` in a line series
const IDX_FOLLOWERS: [&str; 12] = [
    "c:order",
    "c:tx",
    "c:spPr",
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

/// Elements following `c:cat` in a line series
const CAT_FOLLOWERS: [&str; 3] = ["c:val", "c:smooth", "c:extLst"];

/// Elements following `c:val` in a line series
const VAL_FOLLOWERS: [&str; 2] = ["c:smooth", "c:extLst"];

/// Header of the timestamp column
const TIMESTAMP_HEADER: &str = "Timestamp";

/// Bind date series into a copy of the line chart.
///
/// Column A of the workbook holds the timestamps as dates, each row gets
/// its own column from B onwards with its label in row 1. Rows asking for
/// the secondary axis go to the second line chart; when no row does, the
/// second chart and its axes are removed.
pub fn bind_date_series(fragment: &ChartFragment, data: &DateSeriesData) -> Result<BoundChart> {
    data.validate()?;
    let colors: Vec<Rgba> = parse_colors(
        &data.rows.iter().map(|r| r.color.clone()).collect::<Vec<_>>(),
    )?;

    let mut secondary: Vec<bool> = data.rows.iter().map(|r| r.secondary_axis).collect();
    if secondary.iter().all(|&s| s) {
        warn!(
            rows = secondary.len(),
            "every series asked for the secondary axis; plotting them on the primary axis"
        );
        secondary.iter_mut().for_each(|s| *s = false);
    }
    let two_axes = secondary.iter().any(|&s| s);

    let mut workbook = Workbook::new();
    workbook.set_text(0, 0, TIMESTAMP_HEADER);
    let serials: Vec<f64> = data
        .timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| workbook.set_date(i as u32 + 1, 0, ts))
        .collect();
    for (i, row) in data.rows.iter().enumerate() {
        let col = i as u32 + 1;
        workbook.set_text(0, col, row.label.as_str());
        for (j, value) in row.values.iter().enumerate() {
            workbook.set_number(j as u32 + 1, col, *value);
        }
    }

    let mut chart = fragment.chart_xml();
    let plot_area = chart
        .find_mut("c:plotArea")
        .ok_or_else(|| missing("plot area"))?;
    if !two_axes {
        plot_area.remove_nth_child("c:lineChart", 1);
        plot_area.remove_nth_child("c:valAx", 1);
        plot_area.remove_nth_child("c:dateAx", 1);
    }

    let last_row = data.timestamps.len() as u32;
    let categories = area_reference(1, last_row, 0);

    for axis in 0..if two_axes { 2 } else { 1 } {
        let line_chart = plot_area
            .nth_child_mut("c:lineChart", axis)
            .ok_or_else(|| missing("line chart for each axis"))?;

        let mut existing: Vec<XmlElement> = line_chart.children_named("c:ser").cloned().collect();
        let template = existing
            .first()
            .cloned()
            .ok_or_else(|| missing("line series"))?;
        if axis == 0 {
            if let Some(first) = existing.first_mut() {
                first.remove_children_named("c:dPt");
            }
        }
        line_chart.remove_children_named("c:ser");

        let rows = data
            .rows
            .iter()
            .enumerate()
            .filter(|(i, _)| secondary[*i] == (axis == 1));
        for (position, (index, row)) in rows.enumerate() {
            let mut series = if position < existing.len() {
                std::mem::take(&mut existing[position])
            } else {
                template.clone()
            };
            series.remove_children_named("c:dPt");

            set_val(&mut series, "c:idx", index, &IDX_FOLLOWERS);
            set_val(&mut series, "c:order", index, &IDX_FOLLOWERS[1..]);

            let sp_pr = series.ensure_child("c:spPr", &SERIES_SPPR_FOLLOWERS);
            set_line_fill(sp_pr, colors[index]);

            let col = index as u32 + 1;
            let date_format =
                cached_format(&series, "c:cat").unwrap_or_else(|| "m/d/yyyy".to_string());
            let value_format =
                cached_format(&series, "c:val").unwrap_or_else(|| "General".to_string());
            set_series_text(&mut series, &cell_reference(0, col), &row.label);
            set_series_data(
                &mut series,
                "c:cat",
                &CAT_FOLLOWERS,
                super::num_ref(&categories, &date_format, &serials),
            );
            set_series_data(
                &mut series,
                "c:val",
                &VAL_FOLLOWERS,
                super::num_ref(&area_reference(1, last_row, col), &value_format, &row.values),
            );

            line_chart.insert_before_first_of(series, &SERIES_FOLLOWERS);
        }
    }

    Ok(BoundChart { chart, workbook })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::cached_points;
    use crate::sample::sample_template;
    use crate::template::TemplateHandle;
    use reportdeck_model::DateSeriesRow;
    use reportdeck_ooxml::workbook::CellValue;

    // 2018-01-01 .. 2018-01-04, one day apart
    const DAYS: [i64; 4] = [1_514_764_800, 1_514_851_200, 1_514_937_600, 1_515_024_000];

    fn template() -> TemplateHandle {
        TemplateHandle::load(&sample_template().unwrap()).unwrap()
    }

    fn row(label: &str, secondary: bool) -> DateSeriesRow {
        let row = DateSeriesRow::new(label, "#1F77B4", vec![1.0, 2.0, 3.0, 4.0]);
        if secondary {
            row.on_secondary_axis()
        } else {
            row
        }
    }

    fn orders(chart: &XmlElement) -> Vec<&str> {
        chart
            .children_named("c:ser")
            .filter_map(|s| s.child("c:order").and_then(|o| o.attr("val")))
            .collect()
    }

    #[test]
    fn test_single_axis_drops_secondary() {
        let data = DateSeriesData::new(DAYS.to_vec(), vec![row("Documents", false)]);
        let bound = bind_date_series(template().line(), &data).unwrap();

        let plot_area = bound.chart.find("c:plotArea").unwrap();
        assert_eq!(plot_area.count_children("c:lineChart"), 1);
        assert_eq!(plot_area.count_children("c:valAx"), 1);
        assert_eq!(plot_area.count_children("c:dateAx"), 1);

        let ser = plot_area.child("c:lineChart").unwrap().child("c:ser").unwrap();
        let cat = ser.child("c:cat").unwrap().child("c:numRef").unwrap();
        assert_eq!(cat.child("c:f").unwrap().text(), "Sheet1!$A$2:$A$5");
        assert_eq!(cached_points(cat), vec!["43101", "43102", "43103", "43104"]);
        assert_eq!(
            ser.child("c:val").unwrap().find("c:f").unwrap().text(),
            "Sheet1!$B$2:$B$5"
        );
    }

    #[test]
    fn test_split_axes_keep_global_order() {
        let data = DateSeriesData::new(
            DAYS.to_vec(),
            vec![
                row("a", false),
                row("b", true),
                row("c", false),
                row("d", true),
                row("e", false),
            ],
        );
        let bound = bind_date_series(template().line(), &data).unwrap();
        let plot_area = bound.chart.find("c:plotArea").unwrap();
        assert_eq!(plot_area.count_children("c:lineChart"), 2);

        let primary = plot_area.nth_child("c:lineChart", 0).unwrap();
        let secondary = plot_area.nth_child("c:lineChart", 1).unwrap();
        assert_eq!(orders(primary), vec!["0", "2", "4"]);
        assert_eq!(orders(secondary), vec!["1", "3"]);

        // series stay ahead of the axis ids
        let names: Vec<&str> = secondary.elements().map(|e| e.name.as_str()).collect();
        let last_series = names.iter().rposition(|n| *n == "c:ser").unwrap();
        let first_axis = names.iter().position(|n| *n == "c:axId").unwrap();
        assert!(last_series < first_axis);

        let d = secondary.children_named("c:ser").nth(1).unwrap();
        assert_eq!(d.child("c:tx").unwrap().find("c:f").unwrap().text(), "Sheet1!$E$1");
        assert_eq!(d.child("c:tx").unwrap().find("c:v").unwrap().text(), "d");
    }

    #[test]
    fn test_all_secondary_forced_to_primary() {
        let data = DateSeriesData::new(DAYS.to_vec(), vec![row("a", true), row("b", true)]);
        let bound = bind_date_series(template().line(), &data).unwrap();
        let plot_area = bound.chart.find("c:plotArea").unwrap();
        assert_eq!(plot_area.count_children("c:lineChart"), 1);
        assert_eq!(plot_area.count_children("c:valAx"), 1);
        assert_eq!(orders(plot_area.child("c:lineChart").unwrap()), vec!["0", "1"]);
    }

    #[test]
    fn test_line_colour_is_single_rgb() {
        let mut data = DateSeriesData::new(DAYS.to_vec(), vec![row("a", false)]);
        data.rows[0].color = "#FF8000".into();
        let bound = bind_date_series(template().line(), &data).unwrap();

        let fill = bound
            .chart
            .find("c:ser")
            .unwrap()
            .path(&["c:spPr", "a:ln", "a:solidFill"])
            .unwrap();
        assert_eq!(fill.elements().count(), 1);
        assert_eq!(fill.child("a:srgbClr").unwrap().attr("val"), Some("FF8000"));
    }

    #[test]
    fn test_workbook_layout() {
        let data = DateSeriesData::new(DAYS.to_vec(), vec![row("a", false), row("b", true)]);
        let bound = bind_date_series(template().line(), &data).unwrap();
        let book = &bound.workbook;
        assert_eq!(book.cell(0, 0), Some(&CellValue::Text("Timestamp".into())));
        assert_eq!(book.cell(0, 2), Some(&CellValue::Text("b".into())));
        assert_eq!(book.cell(1, 0), Some(&CellValue::Date(43101.0)));
        assert_eq!(book.cell(4, 2), Some(&CellValue::Number(4.0)));
    }

    #[test]
    fn test_invalid_input_rejected_before_binding() {
        let template = template();
        let before = template.line().clone();

        let short = DateSeriesData::new(vec![DAYS[0]], vec![row("a", false)]);
        assert_eq!(bind_date_series(template.line(), &short).unwrap_err().code(), "RPT002");

        let mut mismatched = DateSeriesData::new(DAYS.to_vec(), vec![row("a", false)]);
        mismatched.rows[0].values.pop();
        assert_eq!(
            bind_date_series(template.line(), &mismatched).unwrap_err().code(),
            "RPT002"
        );

        let data = DateSeriesData::new(DAYS.to_vec(), vec![row("a", false), row("b", true)]);
        let first = bind_date_series(template.line(), &data).unwrap();
        let second = bind_date_series(template.line(), &data).unwrap();
        assert_eq!(first.chart, second.chart);
        assert_eq!(template.line(), &before);
    }
}
