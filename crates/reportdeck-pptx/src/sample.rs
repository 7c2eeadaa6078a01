//! A built-in template.
//!
//! [`sample_template`] produces the smallest deck the loader accepts: a
//! widescreen presentation with a title and a blank layout, a doughnut
//! chart on slide 1 and a two-axis date line chart on slide 2, both backed
//! by embedded workbooks. [`template_with_charts`] builds variations of it,
//! which is handy for exercising the loader's checks.

use reportdeck_ooxml::content_types::{CONTENT_TYPES_PATH, CT_CHART, CT_RELATIONSHIPS, CT_SLIDE, CT_XLSX};
use reportdeck_ooxml::{ContentTypes, OoxmlArchive, Relationships, Workbook};

use crate::constants::{
    NS_CHART, NS_DRAWING, NS_PRESENTATION, NS_RELATIONSHIPS, REL_TYPE_SLIDE_MASTER,
    REL_TYPE_THEME, WIDESCREEN_SLIDE_HEIGHT_EMU as SLIDE_HEIGHT_EMU,
    WIDESCREEN_SLIDE_WIDTH_EMU as SLIDE_WIDTH_EMU,
};
use crate::error::Result;

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_MASTER: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_LAYOUT: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

/// The chart placed on one slide of a generated template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleChart {
    /// Doughnut chart with two categories
    Doughnut,
    /// Line chart with primary and secondary date/value axis pairs
    DateLine,
    /// Line chart with a single axis pair
    SingleAxisLine,
    /// Clustered column chart
    Bar,
    /// A slide without any chart
    Empty,
}

/// The built-in two-slide template
pub fn sample_template() -> Result<Vec<u8>> {
    template_with_charts(&[SampleChart::Doughnut, SampleChart::DateLine])
}

/// A template with one slide per entry in `charts`
pub fn template_with_charts(charts: &[SampleChart]) -> Result<Vec<u8>> {
    let mut package = OoxmlArchive::new();
    let mut types = ContentTypes::new();
    types.add_default("rels", CT_RELATIONSHIPS);
    types.add_default("xml", "application/xml");
    types.add_default("xlsx", CT_XLSX);

    let mut root_rels = Relationships::new();
    root_rels.add("ppt/presentation.xml", Relationships::TYPE_OFFICE_DOCUMENT);
    package.set_string("_rels/.rels", root_rels.to_xml());

    let mut pres_rels = Relationships::new();
    pres_rels.add("slideMasters/slideMaster1.xml", REL_TYPE_SLIDE_MASTER);
    pres_rels.add("theme/theme1.xml", REL_TYPE_THEME);
    types.add_override("ppt/slideMasters/slideMaster1.xml", CT_MASTER);
    types.add_override("ppt/theme/theme1.xml", CT_THEME);
    package.set_string("ppt/theme/theme1.xml", theme_xml());
    package.set_string("ppt/slideMasters/slideMaster1.xml", master_xml());

    let mut master_rels = Relationships::new();
    for (index, (kind, name)) in [("title", "Title Slide"), ("blank", "Blank")].iter().enumerate() {
        let part = format!("ppt/slideLayouts/slideLayout{}.xml", index + 1);
        package.set_string(part.clone(), layout_xml(kind, name));
        let mut layout_rels = Relationships::new();
        layout_rels.add("../slideMasters/slideMaster1.xml", REL_TYPE_SLIDE_MASTER);
        package.set_string(
            format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", index + 1),
            layout_rels.to_xml(),
        );
        types.add_override(&part, CT_LAYOUT);
        master_rels.add(
            format!("../slideLayouts/slideLayout{}.xml", index + 1),
            Relationships::TYPE_SLIDE_LAYOUT,
        );
    }
    master_rels.add("../theme/theme1.xml", REL_TYPE_THEME);
    package.set_string(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        master_rels.to_xml(),
    );

    let mut slide_ids = String::new();
    let mut chart_number = 0;
    for (index, chart) in charts.iter().enumerate() {
        let number = index + 1;
        let slide_part = format!("ppt/slides/slide{}.xml", number);
        let mut slide_rels = Relationships::new();
        slide_rels.add("../slideLayouts/slideLayout1.xml", Relationships::TYPE_SLIDE_LAYOUT);

        let frame = match chart_xml(*chart) {
            Some(xml) => {
                chart_number += 1;
                let chart_part = format!("ppt/charts/chart{}.xml", chart_number);
                let workbook_part = format!(
                    "ppt/embeddings/Microsoft_Excel_Worksheet{}.xlsx",
                    chart_number
                );
                package.set_string(chart_part.clone(), xml);
                package.set(workbook_part, chart_workbook(*chart).to_bytes()?);
                let mut chart_rels = Relationships::new();
                chart_rels.add(
                    format!("../embeddings/Microsoft_Excel_Worksheet{}.xlsx", chart_number),
                    Relationships::TYPE_PACKAGE,
                );
                package.set_string(
                    format!("ppt/charts/_rels/chart{}.xml.rels", chart_number),
                    chart_rels.to_xml(),
                );
                types.add_override(&chart_part, CT_CHART);

                let rel_id = slide_rels.add(
                    format!("../charts/chart{}.xml", chart_number),
                    Relationships::TYPE_CHART,
                );
                frame_xml(chart_number + 2, &rel_id)
            }
            None => String::new(),
        };

        package.set_string(slide_part.clone(), slide_xml(&frame));
        package.set_string(
            format!("ppt/slides/_rels/slide{}.xml.rels", number),
            slide_rels.to_xml(),
        );
        types.add_override(&slide_part, CT_SLIDE);
        let rel_id = pres_rels.add(format!("slides/slide{}.xml", number), Relationships::TYPE_SLIDE);
        slide_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="{}"/>"#,
            255 + number,
            rel_id
        ));
    }

    package.set_string("ppt/presentation.xml", presentation_xml(&slide_ids));
    package.set_string("ppt/_rels/presentation.xml.rels", pres_rels.to_xml());
    types.add_override("ppt/presentation.xml", CT_PRESENTATION);
    package.set_string(CONTENT_TYPES_PATH, types.to_xml());

    Ok(package.to_bytes()?)
}

fn presentation_xml(slide_ids: &str) -> String {
    let slide_list = if slide_ids.is_empty() {
        String::new()
    } else {
        format!("<p:sldIdLst>{}</p:sldIdLst>", slide_ids)
    };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            "{}",
            r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/>"#,
            "</p:presentation>"
        ),
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        slide_list,
        SLIDE_WIDTH_EMU,
        SLIDE_HEIGHT_EMU,
        SLIDE_HEIGHT_EMU,
        SLIDE_WIDTH_EMU
    )
}

fn empty_tree() -> &'static str {
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#
}

fn master_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst>"#,
            "</p:sldMaster>"
        ),
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        empty_tree()
    )
}

fn layout_xml(kind: &str, name: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="{}" preserve="1">"#,
            r#"<p:cSld name="{}"><p:spTree>{}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        kind,
        name,
        empty_tree()
    )
}

fn theme_xml() -> String {
    let accents = ["4472C4", "ED7D31", "A5A5A5", "FFC000", "5B9BD5", "70AD47"];
    let accent_xml: String = accents
        .iter()
        .enumerate()
        .map(|(i, rgb)| format!(r#"<a:accent{0}><a:srgbClr val="{1}"/></a:accent{0}>"#, i + 1, rgb))
        .collect();
    let three = |xml: &str| xml.repeat(3);
    let phclr_fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let lines: String = [6350, 12700, 19050]
        .iter()
        .map(|w| format!(r#"<a:ln w="{}">{}</a:ln>"#, w, phclr_fill))
        .collect();

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<a:theme xmlns:a="{}" name="reportdeck"><a:themeElements>"#,
            r#"<a:clrScheme name="Office">"#,
            r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
            r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
            r#"<a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>"#,
            "{}",
            r#"<a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink>"#,
            "</a:clrScheme>",
            r#"<a:fontScheme name="Office">"#,
            r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
            "</a:fontScheme>",
            r#"<a:fmtScheme name="Office">"#,
            "<a:fillStyleLst>{}</a:fillStyleLst><a:lnStyleLst>{}</a:lnStyleLst>",
            "<a:effectStyleLst>{}</a:effectStyleLst><a:bgFillStyleLst>{}</a:bgFillStyleLst>",
            "</a:fmtScheme></a:themeElements></a:theme>"
        ),
        NS_DRAWING,
        accent_xml,
        three(phclr_fill),
        lines,
        three("<a:effectStyle><a:effectLst/></a:effectStyle>"),
        three(phclr_fill)
    )
}

fn slide_xml(frame: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            "<p:cSld><p:spTree>{}{}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        empty_tree(),
        frame
    )
}

fn frame_xml(shape_id: usize, rel_id: &str) -> String {
    format!(
        concat!(
            "<p:graphicFrame><p:nvGraphicFramePr>",
            r#"<p:cNvPr id="{id}" name="Chart {name}"/><p:cNvGraphicFramePr/>"#,
            r#"<p:nvPr><p:extLst><p:ext uri="{{D42A27DB-BD31-4B8C-83A1-F6EECF244321}}">"#,
            r#"<p14:modId xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main" val="866141002"/>"#,
            "</p:ext></p:extLst></p:nvPr></p:nvGraphicFramePr>",
            r#"<p:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></p:xfrm>"#,
            r#"<a:graphic><a:graphicData uri="{chart_ns}">"#,
            r#"<c:chart xmlns:c="{chart_ns}" xmlns:r="{rel_ns}" r:id="{rel}"/>"#,
            "</a:graphicData></a:graphic></p:graphicFrame>"
        ),
        id = shape_id,
        name = shape_id - 1,
        cx = SLIDE_WIDTH_EMU,
        cy = SLIDE_HEIGHT_EMU,
        chart_ns = NS_CHART,
        rel_ns = NS_RELATIONSHIPS,
        rel = rel_id
    )
}

fn chart_space(plot_area: &str, legend: bool) -> String {
    let legend = if legend {
        r#"<c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>"#
    } else {
        ""
    };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<c:chartSpace xmlns:c="{}" xmlns:a="{}" xmlns:r="{}">"#,
            r#"<c:date1904 val="0"/><c:roundedCorners val="0"/><c:chart>"#,
            r#"<c:title><c:overlay val="0"/></c:title><c:autoTitleDeleted val="0"/>"#,
            "<c:plotArea><c:layout/>{}</c:plotArea>{}",
            r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart>"#,
            r#"<c:externalData r:id="rId1"><c:autoUpdate val="0"/></c:externalData>"#,
            "</c:chartSpace>"
        ),
        NS_CHART,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        plot_area,
        legend
    )
}

fn str_cache(reference: &str, values: &[&str]) -> String {
    let points: String = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!(r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, v))
        .collect();
    format!(
        r#"<c:strRef><c:f>{}</c:f><c:strCache><c:ptCount val="{}"/>{}</c:strCache></c:strRef>"#,
        reference,
        values.len(),
        points
    )
}

fn num_cache(reference: &str, format_code: &str, values: &[&str]) -> String {
    let points: String = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!(r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, v))
        .collect();
    format!(
        concat!(
            "<c:numRef><c:f>{}</c:f><c:numCache><c:formatCode>{}</c:formatCode>",
            r#"<c:ptCount val="{}"/>{}</c:numCache></c:numRef>"#
        ),
        reference,
        format_code,
        values.len(),
        points
    )
}

fn data_point(index: usize, accent: usize) -> String {
    format!(
        concat!(
            r#"<c:dPt><c:idx val="{}"/><c:bubble3D val="0"/><c:spPr>"#,
            r#"<a:solidFill><a:schemeClr val="accent{}"/></a:solidFill>"#,
            r#"<a:ln w="19050"><a:solidFill><a:schemeClr val="lt1"/></a:solidFill></a:ln>"#,
            "</c:spPr></c:dPt>"
        ),
        index, accent
    )
}

const DATES: [&str; 2] = ["43101", "43102"];

fn line_series(index: usize, column: char) -> String {
    format!(
        concat!(
            r#"<c:ser><c:idx val="{i}"/><c:order val="{i}"/><c:tx>{tx}</c:tx>"#,
            r#"<c:spPr><a:ln w="28575" cap="rnd"><a:solidFill><a:schemeClr val="accent{accent}"/></a:solidFill>"#,
            r#"<a:round/></a:ln></c:spPr><c:marker><c:symbol val="none"/></c:marker>"#,
            "<c:cat>{cat}</c:cat><c:val>{val}</c:val>",
            r#"<c:smooth val="0"/></c:ser>"#
        ),
        i = index,
        tx = str_cache(&format!("Sheet1!${}$1", column), &[&format!("Series {}", index + 1)]),
        accent = index + 1,
        cat = num_cache("Sheet1!$A$2:$A$3", "m/d/yyyy", &DATES),
        val = num_cache(&format!("Sheet1!${0}$2:${0}$3", column), "General", &["1", "2"])
    )
}

fn line_chart(index: usize, column: char, axes: (u32, u32)) -> String {
    format!(
        concat!(
            r#"<c:lineChart><c:grouping val="standard"/><c:varyColors val="0"/>{}"#,
            r#"<c:marker val="1"/><c:axId val="{}"/><c:axId val="{}"/></c:lineChart>"#
        ),
        line_series(index, column),
        axes.0,
        axes.1
    )
}

fn date_axis(id: u32, cross: u32, deleted: bool) -> String {
    format!(
        concat!(
            r#"<c:dateAx><c:axId val="{}"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="{}"/><c:axPos val="b"/><c:numFmt formatCode="m/d/yyyy" sourceLinked="1"/>"#,
            r#"<c:majorTickMark val="none"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/>"#,
            r#"<c:crossAx val="{}"/><c:crosses val="autoZero"/><c:auto val="1"/><c:lblOffset val="100"/>"#,
            r#"<c:baseTimeUnit val="days"/></c:dateAx>"#
        ),
        id,
        u8::from(deleted),
        cross
    )
}

fn value_axis(id: u32, cross: u32, position: &str, crosses: &str) -> String {
    format!(
        concat!(
            r#"<c:valAx><c:axId val="{}"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="0"/><c:axPos val="{}"/><c:numFmt formatCode="General" sourceLinked="1"/>"#,
            r#"<c:majorTickMark val="none"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/>"#,
            r#"<c:crossAx val="{}"/><c:crosses val="{}"/><c:crossBetween val="between"/></c:valAx>"#
        ),
        id, position, cross, crosses
    )
}

fn chart_xml(chart: SampleChart) -> Option<String> {
    let xml = match chart {
        SampleChart::Doughnut => {
            let series = format!(
                concat!(
                    r#"<c:ser><c:idx val="0"/><c:order val="0"/><c:tx>{}</c:tx>{}{}"#,
                    "<c:cat>{}</c:cat><c:val>{}</c:val></c:ser>"
                ),
                str_cache("Sheet1!$B$1", &["Sales"]),
                data_point(0, 1),
                data_point(1, 2),
                str_cache("Sheet1!$A$2:$A$3", &["First", "Second"]),
                num_cache("Sheet1!$B$2:$B$3", "General", &["1", "2"])
            );
            chart_space(
                &format!(
                    concat!(
                        r#"<c:doughnutChart><c:varyColors val="1"/>{}"#,
                        r#"<c:firstSliceAng val="0"/><c:holeSize val="50"/></c:doughnutChart>"#
                    ),
                    series
                ),
                true,
            )
        }
        SampleChart::DateLine => chart_space(
            &[
                line_chart(0, 'B', (1001, 1002)),
                line_chart(1, 'C', (1003, 1004)),
                date_axis(1001, 1002, false),
                value_axis(1002, 1001, "l", "autoZero"),
                value_axis(1004, 1003, "r", "max"),
                date_axis(1003, 1004, true),
            ]
            .concat(),
            true,
        ),
        SampleChart::SingleAxisLine => chart_space(
            &[
                line_chart(0, 'B', (1001, 1002)),
                date_axis(1001, 1002, false),
                value_axis(1002, 1001, "l", "autoZero"),
            ]
            .concat(),
            true,
        ),
        SampleChart::Bar => chart_space(
            &format!(
                concat!(
                    r#"<c:barChart><c:barDir val="col"/><c:grouping val="clustered"/><c:varyColors val="0"/>"#,
                    r#"<c:ser><c:idx val="0"/><c:order val="0"/><c:tx>{}</c:tx><c:cat>{}</c:cat><c:val>{}</c:val></c:ser>"#,
                    r#"<c:axId val="2001"/><c:axId val="2002"/></c:barChart>"#,
                    r#"<c:catAx><c:axId val="2001"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/>"#,
                    r#"<c:axPos val="b"/><c:crossAx val="2002"/></c:catAx>{}"#
                ),
                str_cache("Sheet1!$B$1", &["Sales"]),
                str_cache("Sheet1!$A$2:$A$3", &["First", "Second"]),
                num_cache("Sheet1!$B$2:$B$3", "General", &["1", "2"]),
                value_axis(2002, 2001, "l", "autoZero")
            ),
            false,
        ),
        SampleChart::Empty => return None,
    };
    Some(xml)
}

fn chart_workbook(chart: SampleChart) -> Workbook {
    let mut workbook = Workbook::new();
    match chart {
        SampleChart::DateLine | SampleChart::SingleAxisLine => {
            workbook.set_text(0, 0, "Timestamp");
            workbook.set_text(0, 1, "Series 1");
            workbook.set_text(0, 2, "Series 2");
            // 2018-01-01 and 2018-01-02
            for (row, secs) in [1_514_764_800_i64, 1_514_851_200].iter().enumerate() {
                let row = row as u32 + 1;
                workbook.set_date(row, 0, *secs);
                workbook.set_number(row, 1, row as f64);
                workbook.set_number(row, 2, row as f64);
            }
        }
        _ => {
            workbook.set_text(0, 1, "Sales");
            for (row, (label, value)) in [("First", 1.0), ("Second", 2.0)].iter().enumerate() {
                let row = row as u32 + 1;
                workbook.set_text(row, 0, *label);
                workbook.set_number(row, 1, *value);
            }
        }
    }
    workbook
}
