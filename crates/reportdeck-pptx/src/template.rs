//! Template loading.
//!
//! A template is an ordinary presentation with exactly two slides: a
//! doughnut chart on the first and a date-axis line chart, with a primary
//! and a secondary axis pair, on the second. Loading pulls both charts out
//! as [`ChartFragment`]s and strips the slides, leaving a package of
//! masters, layouts and theme that every generated deck starts from.

use std::path::Path;

use reportdeck_ooxml::content_types::CONTENT_TYPES_PATH;
use reportdeck_ooxml::relationships::{rels_path_for, resolve_target};
use reportdeck_ooxml::{ContentTypes, OoxmlArchive, Relationships, XmlElement};
use tracing::{debug, info};

use crate::constants::REL_TYPE_NOTES_SLIDE;
use crate::error::{ReportError, Result};
use crate::geometry::{from_emu, Rect};
use crate::presentation::Presentation;

const NOT_A_PRESENTATION: &str = "File is not a valid Office PowerPoint file";
const WRONG_SLIDE_COUNT: &str = "Template powerpoint should have two slides, doughnut chart on slide 1 and time-axis line chart on slide 2";
const NO_DOUGHNUT: &str = "First slide should have a doughnut chart";
const WRONG_DOUGHNUT: &str = "First slide has the wrong chart type, should have a doughnut chart";
const NO_LINE: &str = "Second slide should have a time-axis line chart";
const WRONG_LINE: &str = "Second slide has the wrong chart type, should have a time-axis line chart";
const WRONG_AXES: &str = "Second slide should have a time-axis line chart with a primary and a secondary axis";

/// Which template chart a fragment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Doughnut,
    Line,
}

/// A part the template chart refers to: style, colours, embedded workbook
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedPart {
    pub rel_id: String,
    pub rel_type: String,
    pub part_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A chart lifted from the template: the graphic frame that placed it on
/// the slide and the chart part itself. Read-only; every use works on
/// clones.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFragment {
    kind: ChartKind,
    rel_id: String,
    frame: XmlElement,
    chart: XmlElement,
    part_name: String,
    related: Vec<RelatedPart>,
}

impl ChartFragment {
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Relationship id the template slide used for the chart
    pub fn rel_id(&self) -> &str {
        &self.rel_id
    }

    /// The template's `p:graphicFrame`
    pub fn frame(&self) -> &XmlElement {
        &self.frame
    }

    /// The template's `c:chartSpace`
    pub fn chart(&self) -> &XmlElement {
        &self.chart
    }

    /// Part name the chart had in the template
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn related(&self) -> &[RelatedPart] {
        &self.related
    }

    /// A fresh copy of the chart XML to bind data into
    pub fn chart_xml(&self) -> XmlElement {
        self.chart.clone()
    }

    /// A copy of the graphic frame with a new shape id and chart
    /// relationship, moved to `anchor` when given
    pub fn instantiate(&self, shape_id: u32, rel_id: &str, anchor: Option<Rect>) -> XmlElement {
        let mut frame = self.frame.clone();

        if let Some(c_nv_pr) = frame.path_mut(&["p:nvGraphicFramePr", "p:cNvPr"]) {
            c_nv_pr.set_attr("id", shape_id.to_string());
            c_nv_pr.set_attr("name", format!("chart{}", shape_id));
        }

        if let Some(anchor) = anchor {
            let (x, y, cx, cy) = anchor.to_emu();
            if let Some(xfrm) = frame.child_mut("p:xfrm") {
                let off = xfrm.ensure_child("a:off", &["a:ext"]);
                off.set_attr("x", x.to_string());
                off.set_attr("y", y.to_string());
                let ext = xfrm.ensure_child("a:ext", &[]);
                ext.set_attr("cx", cx.to_string());
                ext.set_attr("cy", cy.to_string());
            }
        }

        if let Some(data) = frame.path_mut(&["a:graphic", "a:graphicData"]) {
            for chart in data.children_named_mut("c:chart") {
                chart.set_attr("r:id", rel_id);
            }
        }
        frame
    }

    /// Where the frame sits on the template slide
    pub fn anchor(&self) -> Option<Rect> {
        let xfrm = self.frame.child("p:xfrm")?;
        let value = |element: &str, name: &str| {
            xfrm.child(element)
                .and_then(|e| e.attr(name))
                .and_then(|v| v.parse::<i64>().ok())
                .map(from_emu)
        };
        Some(Rect::new(
            value("a:off", "x")?,
            value("a:off", "y")?,
            value("a:ext", "cx")?,
            value("a:ext", "cy")?,
        ))
    }
}

/// A loaded template: a slide-less package plus the two chart fragments
#[derive(Debug, Clone)]
pub struct TemplateHandle {
    package: OoxmlArchive,
    doughnut: ChartFragment,
    line: ChartFragment,
    slide_width: f64,
    slide_height: f64,
}

/// A template slide located through the presentation
struct TemplateSlide {
    part_name: String,
    pres_rel_id: String,
    xml: XmlElement,
    rels: Relationships,
}

impl TemplateHandle {
    /// Load and validate a template from `.pptx` bytes
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let mut package = OoxmlArchive::from_bytes(bytes)
            .map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))?;
        let mut content_types = ContentTypes::parse(
            package
                .require(CONTENT_TYPES_PATH)
                .map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))?,
        )
        .map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))?;

        let presentation_part = Relationships::parse(
            package
                .require("_rels/.rels")
                .map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))?,
        )
        .ok()
        .and_then(|rels| {
            rels.first_of_type(Relationships::TYPE_OFFICE_DOCUMENT)
                .map(|(_, rel)| resolve_target("", &rel.target))
        })
        .ok_or_else(|| ReportError::template_load(NOT_A_PRESENTATION))?;

        let mut presentation = parse_part(&package, &presentation_part)?;
        if presentation.local_name() != "presentation" {
            return Err(ReportError::template_load(NOT_A_PRESENTATION));
        }
        let mut presentation_rels = match package.get(&rels_path_for(&presentation_part)) {
            Some(xml) => Relationships::parse(xml)
                .map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))?,
            None => Relationships::new(),
        };

        let slides = locate_slides(&package, &presentation_part, &presentation, &presentation_rels)?;
        if slides.len() != 2 {
            return Err(ReportError::template_load(WRONG_SLIDE_COUNT));
        }

        let doughnut = extract_chart(&package, &content_types, &slides[0], ChartKind::Doughnut, NO_DOUGHNUT)?;
        let plot_area = doughnut.chart.find("c:plotArea");
        let has_series = plot_area
            .and_then(|p| p.child("c:doughnutChart"))
            .is_some_and(|d| d.child("c:ser").is_some());
        if !has_series {
            return Err(ReportError::template_load(WRONG_DOUGHNUT));
        }

        let line = extract_chart(&package, &content_types, &slides[1], ChartKind::Line, NO_LINE)?;
        let Some(plot_area) = line.chart.find("c:plotArea") else {
            return Err(ReportError::template_load(WRONG_LINE));
        };
        if plot_area.child("c:lineChart").is_none() {
            return Err(ReportError::template_load(WRONG_LINE));
        }
        let axes_ok = plot_area.count_children("c:lineChart") == 2
            && plot_area.count_children("c:valAx") == 2
            && plot_area.count_children("c:dateAx") == 2
            && plot_area
                .children_named("c:lineChart")
                .all(|chart| chart.child("c:ser").is_some());
        if !axes_ok {
            return Err(ReportError::template_load(WRONG_AXES));
        }

        // Strip the template slides and everything only they used
        for slide in &slides {
            for (_, rel) in slide.rels.iter() {
                let target = resolve_target(&slide.part_name, &rel.target);
                if rel.rel_type == Relationships::TYPE_CHART || rel.rel_type == REL_TYPE_NOTES_SLIDE {
                    remove_part_tree(&mut package, &mut content_types, &target);
                }
            }
            remove_part(&mut package, &mut content_types, &slide.part_name);
            presentation_rels.remove(&slide.pres_rel_id);
        }
        presentation.remove_children_named("p:sldIdLst");

        package.set_string(presentation_part.clone(), presentation.to_document());
        package.set_string(rels_path_for(&presentation_part), presentation_rels.to_xml());
        package.set_string(CONTENT_TYPES_PATH, content_types.to_xml());

        let size = presentation.child("p:sldSz");
        let dimension = |name: &str, fallback: f64| {
            size.and_then(|s| s.attr(name))
                .and_then(|v| v.parse::<i64>().ok())
                .map(from_emu)
                .unwrap_or(fallback)
        };
        let slide_width = dimension("cx", 720.0);
        let slide_height = dimension("cy", 540.0);

        info!(
            slide_width,
            slide_height,
            parts = package.len(),
            "template loaded"
        );

        Ok(Self {
            package,
            doughnut,
            line,
            slide_width,
            slide_height,
        })
    }

    /// Load and validate a template file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| {
            ReportError::template_load_caused(
                format!("Error while loading template {}", path.as_ref().display()),
                e,
            )
        })?;
        Self::load(&bytes)
    }

    /// The doughnut chart from slide 1
    pub fn doughnut(&self) -> &ChartFragment {
        &self.doughnut
    }

    /// The line chart from slide 2
    pub fn line(&self) -> &ChartFragment {
        &self.line
    }

    /// Slide width and height in points
    pub fn slide_size(&self) -> (f64, f64) {
        (self.slide_width, self.slide_height)
    }

    /// A new, empty presentation based on the template
    pub fn new_presentation(&self) -> Result<Presentation> {
        Presentation::from_package(self.package.clone())
    }
}

fn parse_part(package: &OoxmlArchive, part: &str) -> Result<XmlElement> {
    let bytes = package
        .require(part)
        .map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))?;
    XmlElement::parse(bytes).map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))
}

fn locate_slides(
    package: &OoxmlArchive,
    presentation_part: &str,
    presentation: &XmlElement,
    presentation_rels: &Relationships,
) -> Result<Vec<TemplateSlide>> {
    let Some(list) = presentation.child("p:sldIdLst") else {
        return Ok(Vec::new());
    };

    let mut slides = Vec::new();
    for entry in list.children_named("p:sldId") {
        let Some(rel_id) = entry.attr("r:id") else {
            continue;
        };
        let Some(target) = presentation_rels.get(rel_id) else {
            continue;
        };
        let part_name = resolve_target(presentation_part, target);
        let xml = parse_part(package, &part_name)?;
        let rels = match package.get(&rels_path_for(&part_name)) {
            Some(bytes) => Relationships::parse(bytes)
                .map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))?,
            None => Relationships::new(),
        };
        slides.push(TemplateSlide {
            part_name,
            pres_rel_id: rel_id.to_string(),
            xml,
            rels,
        });
    }
    debug!(slides = slides.len(), "template slides located");
    Ok(slides)
}

/// Find the graphic frame on `slide` that shows one of its chart parts
fn extract_chart(
    package: &OoxmlArchive,
    content_types: &ContentTypes,
    slide: &TemplateSlide,
    kind: ChartKind,
    missing: &str,
) -> Result<ChartFragment> {
    let frames = slide.xml.find_all("p:graphicFrame");

    for (rel_id, rel) in slide.rels.of_type(Relationships::TYPE_CHART) {
        let frame = frames.iter().find(|frame| {
            frame
                .path(&["a:graphic", "a:graphicData"])
                .is_some_and(|data| {
                    data.children_named("c:chart")
                        .any(|chart| chart.attr("r:id") == Some(rel_id))
                })
        });
        let Some(frame) = frame else {
            continue;
        };

        let part_name = resolve_target(&slide.part_name, &rel.target);
        let chart = parse_part(package, &part_name)?;
        let related = related_parts(package, content_types, &part_name)?;

        let mut frame = (*frame).clone();
        if let Some(nv_pr) = frame.path_mut(&["p:nvGraphicFramePr", "p:nvPr"]) {
            nv_pr.remove_children_named("p:extLst");
        }

        debug!(?kind, part = %part_name, related = related.len(), "template chart found");
        return Ok(ChartFragment {
            kind,
            rel_id: rel_id.to_string(),
            frame,
            chart,
            part_name,
            related,
        });
    }

    Err(ReportError::template_load(missing))
}

fn related_parts(
    package: &OoxmlArchive,
    content_types: &ContentTypes,
    chart_part: &str,
) -> Result<Vec<RelatedPart>> {
    let Some(xml) = package.get(&rels_path_for(chart_part)) else {
        return Ok(Vec::new());
    };
    let rels = Relationships::parse(xml)
        .map_err(|e| ReportError::template_load_caused(NOT_A_PRESENTATION, e))?;

    let mut related = Vec::new();
    for (id, rel) in rels.iter() {
        if rel.target_mode.as_deref() == Some("External") {
            continue;
        }
        let part_name = resolve_target(chart_part, &rel.target);
        let Some(bytes) = package.get(&part_name) else {
            continue;
        };
        related.push(RelatedPart {
            rel_id: id.to_string(),
            rel_type: rel.rel_type.clone(),
            content_type: content_types.content_type_for(&part_name).map(str::to_string),
            part_name,
            bytes: bytes.to_vec(),
        });
    }
    Ok(related)
}

fn remove_part(package: &mut OoxmlArchive, content_types: &mut ContentTypes, part: &str) {
    package.remove(part);
    package.remove(&rels_path_for(part));
    content_types.remove_override(part);
}

/// Remove a part together with the internal parts its relationships point at
fn remove_part_tree(package: &mut OoxmlArchive, content_types: &mut ContentTypes, part: &str) {
    if let Some(rels) = package
        .get(&rels_path_for(part))
        .and_then(|xml| Relationships::parse(xml).ok())
    {
        for (_, rel) in rels.iter() {
            // layouts and masters are shared; only drop what hangs off charts
            let owned = rel.rel_type != Relationships::TYPE_SLIDE
                && rel.rel_type != Relationships::TYPE_SLIDE_LAYOUT
                && !rel.rel_type.ends_with("/notesMaster")
                && rel.target_mode.as_deref() != Some("External");
            if owned {
                let target = resolve_target(part, &rel.target);
                remove_part(package, content_types, &target);
            }
        }
    }
    remove_part(package, content_types, part);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{sample_template, template_with_charts, SampleChart};

    fn handle() -> TemplateHandle {
        TemplateHandle::load(&sample_template().unwrap()).unwrap()
    }

    /// The sample template with `edit` applied to every chart and slide part
    fn edited_sample(edit: impl Fn(&str, String) -> String) -> Vec<u8> {
        let mut package = OoxmlArchive::from_bytes(&sample_template().unwrap()).unwrap();
        let parts: Vec<String> = package
            .file_list()
            .into_iter()
            .filter(|p| {
                (p.starts_with("ppt/charts/chart") || p.starts_with("ppt/slides/slide"))
                    && p.ends_with(".xml")
            })
            .map(str::to_string)
            .collect();
        for part in parts {
            let xml = package.get_string(&part).unwrap();
            package.set_string(part.clone(), edit(&part, xml));
        }
        package.to_bytes().unwrap()
    }

    #[test]
    fn test_load_sample() {
        let template = handle();
        assert_eq!(template.doughnut().kind(), ChartKind::Doughnut);
        assert_eq!(template.line().kind(), ChartKind::Line);
        assert!(template.doughnut().chart().find("c:doughnutChart").is_some());
        assert_eq!(template.slide_size(), (960.0, 540.0));

        let related = template.line().related();
        assert!(related
            .iter()
            .any(|r| r.rel_type == Relationships::TYPE_PACKAGE));
    }

    #[test]
    fn test_slides_stripped() {
        let template = handle();
        assert!(!template.package.contains("ppt/slides/slide1.xml"));
        assert!(!template.package.contains("ppt/slides/slide2.xml"));
        assert!(!template.package.contains("ppt/charts/chart1.xml"));
        assert!(template
            .package
            .file_list()
            .iter()
            .all(|p| !p.starts_with("ppt/embeddings/")));

        let types = ContentTypes::parse(template.package.require(CONTENT_TYPES_PATH).unwrap()).unwrap();
        assert!(!template.package.contains("ppt/charts/chart2.xml"));
        assert_eq!(types.parts_of_type(reportdeck_ooxml::content_types::CT_CHART).count(), 0);
        assert!(template.package.contains("ppt/slideLayouts/slideLayout2.xml"));
    }

    #[test]
    fn test_instantiate_leaves_fragment_untouched() {
        let template = handle();
        let before = template.doughnut().clone();
        let frame = template.doughnut().instantiate(
            12,
            "rId5",
            Some(Rect::new(10.0, 20.0, 300.0, 200.0)),
        );

        assert_eq!(template.doughnut(), &before);
        let c_nv_pr = frame.path(&["p:nvGraphicFramePr", "p:cNvPr"]).unwrap();
        assert_eq!(c_nv_pr.attr("id"), Some("12"));
        assert_eq!(c_nv_pr.attr("name"), Some("chart12"));
        assert_eq!(frame.find("c:chart").unwrap().attr("r:id"), Some("rId5"));
        let off = frame.path(&["p:xfrm", "a:off"]).unwrap();
        assert_eq!(off.attr("x"), Some("127000"));
        assert_eq!(off.attr("y"), Some("254000"));
        assert!(frame.find("p:extLst").is_none());
    }

    #[test]
    fn test_instantiate_keeps_template_position() {
        let template = handle();
        let frame = template.line().instantiate(3, "rId2", None);
        assert_eq!(
            frame.child("p:xfrm"),
            template.line().frame().child("p:xfrm")
        );
        assert_eq!(template.line().anchor(), Some(Rect::new(0.0, 0.0, 960.0, 540.0)));
    }

    #[test]
    fn test_not_a_presentation() {
        let err = TemplateHandle::load(b"plain text").unwrap_err();
        assert_eq!(err.code(), "RPT001");
        assert!(err.to_string().contains("not a valid Office PowerPoint file"));
    }

    #[test]
    fn test_missing_file() {
        let err = TemplateHandle::from_file("/nonexistent/template.pptx").unwrap_err();
        assert_eq!(err.code(), "RPT001");
    }

    #[test]
    fn test_chart_prefix_is_irrelevant() {
        let bytes = edited_sample(|_, xml| {
            xml.replace("xmlns:c=", "xmlns:ch=")
                .replace("<c:", "<ch:")
                .replace("</c:", "</ch:")
        });
        let template = TemplateHandle::load(&bytes).unwrap();
        assert!(template.doughnut().chart().find("c:doughnutChart").is_some());
        let plot_area = template.line().chart().find("c:plotArea").unwrap();
        assert_eq!(plot_area.count_children("c:lineChart"), 2);
        assert!(template.line().frame().find("c:chart").unwrap().attr("r:id").is_some());
    }

    #[test]
    fn test_single_axis_line_rejected() {
        let bytes = template_with_charts(&[SampleChart::Doughnut, SampleChart::SingleAxisLine]).unwrap();
        let err = TemplateHandle::load(&bytes).unwrap_err();
        assert_eq!(err.code(), "RPT001");
        assert!(err.to_string().contains(WRONG_AXES));
    }

    #[test]
    fn test_doughnut_without_series_rejected() {
        let bytes = edited_sample(|part, xml| {
            if !part.starts_with("ppt/charts/") || !xml.contains("c:doughnutChart") {
                return xml;
            }
            let mut chart = XmlElement::parse(xml.as_bytes()).unwrap();
            chart
                .find_mut("c:doughnutChart")
                .unwrap()
                .remove_children_named("c:ser");
            chart.to_document()
        });
        let err = TemplateHandle::load(&bytes).unwrap_err();
        assert_eq!(err.code(), "RPT001");
        assert!(err.to_string().contains(WRONG_DOUGHNUT));
    }
}
