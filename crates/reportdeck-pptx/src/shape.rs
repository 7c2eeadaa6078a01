//! Slide shapes and their PresentationML markup.
//!
//! Shapes are kept as plain values until the slide is written, so layout
//! code can still move or drop them after the fact (list pagination does
//! both).

use quick_xml::escape::escape;
use reportdeck_ooxml::XmlElement;

use crate::color::Rgba;
use crate::geometry::{to_emu, Rect};
use crate::text::{Paragraph, TextBody, TextRun};

/// Shape fill
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    None,
    Solid(Rgba),
    /// Linear gradient; `angle` in 60000ths of a degree
    LinearGradient {
        angle: u32,
        stops: Vec<GradientStop>,
    },
}

/// One stop of a gradient
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// Position in 1000ths of a percent
    pub position: u32,
    pub color: Rgba,
    /// Alpha in 1000ths of a percent, opaque when absent
    pub alpha: Option<u32>,
}

impl Fill {
    fn to_xml(&self) -> String {
        match self {
            Fill::None => "<a:noFill/>".to_string(),
            Fill::Solid(color) => color.solid_fill_xml(),
            Fill::LinearGradient { angle, stops } => {
                let mut xml = String::from("<a:gradFill><a:gsLst>");
                for stop in stops {
                    let alpha = stop
                        .alpha
                        .map(|a| format!(r#"<a:alpha val="{}"/>"#, a))
                        .unwrap_or_default();
                    xml.push_str(&format!(
                        r#"<a:gs pos="{}"><a:srgbClr val="{}">{}</a:srgbClr></a:gs>"#,
                        stop.position,
                        stop.color.hex(),
                        alpha
                    ));
                }
                xml.push_str(&format!(r#"</a:gsLst><a:lin ang="{}" scaled="0"/></a:gradFill>"#, angle));
                xml
            }
        }
    }
}

/// Shape outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Width in points
    pub width: f64,
    pub color: Rgba,
}

impl Line {
    pub fn new(width: f64, color: Rgba) -> Self {
        Self { width, color }
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<a:ln w="{}">{}</a:ln>"#,
            to_emu(self.width),
            self.color.solid_fill_xml()
        )
    }
}

/// A path segment, coordinates in points relative to the shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Elliptical arc continuing from the current point; angles in degrees,
    /// clockwise from the positive x axis
    ArcTo {
        width_radius: f64,
        height_radius: f64,
        start_angle: f64,
        swing_angle: f64,
    },
    Close,
}

/// Shape outline geometry
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Preset shape such as `rect`, `ellipse`, `donut`, `snip1Rect`
    Preset(&'static str),
    /// Freeform path within a `width` x `height` box
    Custom {
        width: f64,
        height: f64,
        commands: Vec<PathCommand>,
    },
}

impl Geometry {
    /// Closed polygon through absolute points; returns the bounding anchor
    /// and the geometry relative to it
    pub fn polygon(points: &[(f64, f64)]) -> Option<(Rect, Self)> {
        let bounds = Rect::bounding(points)?;
        let mut commands = Vec::with_capacity(points.len() + 1);
        for (i, &(x, y)) in points.iter().enumerate() {
            let local = (x - bounds.x, y - bounds.y);
            commands.push(if i == 0 {
                PathCommand::MoveTo(local.0, local.1)
            } else {
                PathCommand::LineTo(local.0, local.1)
            });
        }
        commands.push(PathCommand::Close);
        Some((
            bounds,
            Self::Custom {
                width: bounds.width,
                height: bounds.height,
                commands,
            },
        ))
    }

    fn to_xml(&self) -> String {
        match self {
            Geometry::Preset(name) => format!(r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#, name),
            Geometry::Custom {
                width,
                height,
                commands,
            } => {
                let mut path = String::new();
                for command in commands {
                    match *command {
                        PathCommand::MoveTo(x, y) => path.push_str(&format!(
                            r#"<a:moveTo><a:pt x="{}" y="{}"/></a:moveTo>"#,
                            to_emu(x),
                            to_emu(y)
                        )),
                        PathCommand::LineTo(x, y) => path.push_str(&format!(
                            r#"<a:lnTo><a:pt x="{}" y="{}"/></a:lnTo>"#,
                            to_emu(x),
                            to_emu(y)
                        )),
                        PathCommand::ArcTo {
                            width_radius,
                            height_radius,
                            start_angle,
                            swing_angle,
                        } => path.push_str(&format!(
                            r#"<a:arcTo wR="{}" hR="{}" stAng="{}" swAng="{}"/>"#,
                            to_emu(width_radius),
                            to_emu(height_radius),
                            (start_angle * 60_000.0).round() as i64,
                            (swing_angle * 60_000.0).round() as i64
                        )),
                        PathCommand::Close => path.push_str("<a:close/>"),
                    }
                }
                format!(
                    concat!(
                        "<a:custGeom><a:avLst/><a:gdLst/><a:ahLst/><a:cxnLst/>",
                        r#"<a:rect l="0" t="0" r="r" b="b"/>"#,
                        r#"<a:pathLst><a:path w="{}" h="{}">{}</a:path></a:pathLst></a:custGeom>"#
                    ),
                    to_emu(*width),
                    to_emu(*height),
                    path
                )
            }
        }
    }
}

/// A click action on a shape
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperlink {
    pub rel_id: String,
    pub tooltip: Option<String>,
    pub action: Option<String>,
}

impl Hyperlink {
    fn to_xml(&self) -> String {
        let mut attrs = format!(r#" r:id="{}""#, escape(self.rel_id.as_str()));
        if let Some(action) = &self.action {
            attrs.push_str(&format!(r#" action="{}""#, escape(action.as_str())));
        }
        if let Some(tooltip) = &self.tooltip {
            attrs.push_str(&format!(r#" tooltip="{}""#, escape(tooltip.as_str())));
        }
        format!("<a:hlinkClick{}/>", attrs)
    }
}

/// A `p:sp`: text box, preset shape or freeform
#[derive(Debug, Clone, PartialEq)]
pub struct AutoShape {
    pub anchor: Rect,
    pub geometry: Geometry,
    pub fill: Option<Fill>,
    pub line: Option<Line>,
    pub text: Option<TextBody>,
    pub hyperlink: Option<Hyperlink>,
    pub text_box: bool,
}

impl AutoShape {
    /// A preset shape without fill, outline or text
    pub fn preset(anchor: Rect, preset: &'static str) -> Self {
        Self {
            anchor,
            geometry: Geometry::Preset(preset),
            fill: None,
            line: None,
            text: None,
            hyperlink: None,
            text_box: false,
        }
    }

    /// A rectangular text box
    pub fn text_box(anchor: Rect, text: TextBody) -> Self {
        Self {
            text: Some(text),
            text_box: true,
            ..Self::preset(anchor, "rect")
        }
    }

    /// A freeform shape
    pub fn freeform(anchor: Rect, geometry: Geometry) -> Self {
        Self {
            geometry,
            ..Self::preset(anchor, "rect")
        }
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_line(mut self, line: Line) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_text(mut self, text: TextBody) -> Self {
        self.text = Some(text);
        self
    }
}

/// A `p:pic` referencing an image relationship
#[derive(Debug, Clone, PartialEq)]
pub struct PictureShape {
    pub anchor: Rect,
    pub rel_id: String,
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    pub text: String,
    /// Number of grid columns this cell spans
    pub grid_span: u32,
    /// Covered by a merged cell to its left
    pub h_merge: bool,
}

/// A table row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    /// Height in points
    pub height: f64,
    pub cells: Vec<TableCell>,
}

/// A table inside a graphic frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableShape {
    pub anchor: Rect,
    /// Column widths in points
    pub columns: Vec<f64>,
    pub rows: Vec<TableRow>,
    /// Colour of every cell border
    pub border: Option<Rgba>,
}

/// A group of shapes with its own child coordinate space
#[derive(Debug, Clone, PartialEq)]
pub struct GroupShape {
    pub anchor: Rect,
    /// Child coordinate space mapped onto `anchor`
    pub interior: Rect,
    pub children: Vec<Shape>,
}

/// What a shape is
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Auto(AutoShape),
    Picture(PictureShape),
    Table(TableShape),
    Group(GroupShape),
    /// A chart graphic frame cloned from the template
    ChartFrame(XmlElement),
}

/// A shape with its slide-unique id
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: u32,
    pub name: String,
    pub kind: ShapeKind,
}

impl Shape {
    /// The anchor of movable shapes
    pub fn anchor_mut(&mut self) -> Option<&mut Rect> {
        match &mut self.kind {
            ShapeKind::Auto(s) => Some(&mut s.anchor),
            ShapeKind::Picture(p) => Some(&mut p.anchor),
            ShapeKind::Table(t) => Some(&mut t.anchor),
            ShapeKind::Group(g) => Some(&mut g.anchor),
            ShapeKind::ChartFrame(_) => None,
        }
    }

    /// Render as PresentationML
    pub fn to_xml(&self) -> String {
        match &self.kind {
            ShapeKind::Auto(shape) => self.auto_shape_xml(shape),
            ShapeKind::Picture(picture) => self.picture_xml(picture),
            ShapeKind::Table(table) => self.table_xml(table),
            ShapeKind::Group(group) => self.group_xml(group),
            ShapeKind::ChartFrame(frame) => frame.to_xml(),
        }
    }

    fn c_nv_pr(&self, hyperlink: Option<&Hyperlink>) -> String {
        match hyperlink {
            Some(link) => format!(
                r#"<p:cNvPr id="{}" name="{}">{}</p:cNvPr>"#,
                self.id,
                escape(self.name.as_str()),
                link.to_xml()
            ),
            None => format!(
                r#"<p:cNvPr id="{}" name="{}"/>"#,
                self.id,
                escape(self.name.as_str())
            ),
        }
    }

    fn auto_shape_xml(&self, shape: &AutoShape) -> String {
        let nv_sp_pr = if shape.text_box {
            r#"<p:cNvSpPr txBox="1"/>"#
        } else {
            "<p:cNvSpPr/>"
        };
        let mut sp_pr = format!("{}{}", xfrm(&shape.anchor), shape.geometry.to_xml());
        if let Some(fill) = &shape.fill {
            sp_pr.push_str(&fill.to_xml());
        }
        if let Some(line) = &shape.line {
            sp_pr.push_str(&line.to_xml());
        }
        let text = shape
            .text
            .as_ref()
            .map(|body| body.to_xml("p:txBody"))
            .unwrap_or_default();

        format!(
            "<p:sp><p:nvSpPr>{}{}<p:nvPr/></p:nvSpPr><p:spPr>{}</p:spPr>{}</p:sp>",
            self.c_nv_pr(shape.hyperlink.as_ref()),
            nv_sp_pr,
            sp_pr,
            text
        )
    }

    fn picture_xml(&self, picture: &PictureShape) -> String {
        format!(
            concat!(
                "<p:pic><p:nvPicPr>{}",
                r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
                r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                r#"<p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
            ),
            self.c_nv_pr(None),
            escape(picture.rel_id.as_str()),
            xfrm(&picture.anchor)
        )
    }

    fn group_xml(&self, group: &GroupShape) -> String {
        let (x, y, cx, cy) = group.anchor.to_emu();
        let (chx, chy, chcx, chcy) = group.interior.to_emu();
        let children: String = group.children.iter().map(Shape::to_xml).collect();
        format!(
            concat!(
                "<p:grpSp><p:nvGrpSpPr>{}<p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
                r#"<p:grpSpPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/>"#,
                r#"<a:chOff x="{}" y="{}"/><a:chExt cx="{}" cy="{}"/></a:xfrm></p:grpSpPr>"#,
                "{}</p:grpSp>"
            ),
            self.c_nv_pr(None),
            x,
            y,
            cx,
            cy,
            chx,
            chy,
            chcx,
            chcy,
            children
        )
    }

    fn table_xml(&self, table: &TableShape) -> String {
        let (x, y, cx, cy) = table.anchor.to_emu();
        let grid: String = table
            .columns
            .iter()
            .map(|w| format!(r#"<a:gridCol w="{}"/>"#, to_emu(*w)))
            .collect();

        let borders = table
            .border
            .map(|color| {
                ["a:lnL", "a:lnR", "a:lnT", "a:lnB"]
                    .iter()
                    .map(|edge| {
                        format!(
                            r#"<{} w="12700">{}</{}>"#,
                            edge,
                            color.solid_fill_xml(),
                            edge
                        )
                    })
                    .collect::<String>()
            })
            .unwrap_or_default();

        let mut rows = String::new();
        for row in &table.rows {
            rows.push_str(&format!(r#"<a:tr h="{}">"#, to_emu(row.height)));
            for cell in &row.cells {
                let mut attrs = String::new();
                if cell.grid_span > 1 {
                    attrs.push_str(&format!(r#" gridSpan="{}""#, cell.grid_span));
                }
                if cell.h_merge {
                    attrs.push_str(r#" hMerge="1""#);
                }
                let body = TextBody::from_paragraph(Paragraph::from_run(TextRun::new(
                    cell.text.as_str(),
                )));
                rows.push_str(&format!(
                    "<a:tc{}>{}<a:tcPr>{}</a:tcPr></a:tc>",
                    attrs,
                    body.to_xml("a:txBody"),
                    borders
                ));
            }
            rows.push_str("</a:tr>");
        }

        format!(
            concat!(
                "<p:graphicFrame><p:nvGraphicFramePr>{}",
                r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#,
                r#"<p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm>"#,
                r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table">"#,
                r#"<a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>{}</a:tblGrid>{}</a:tbl>"#,
                "</a:graphicData></a:graphic></p:graphicFrame>"
            ),
            self.c_nv_pr(None),
            x,
            y,
            cx,
            cy,
            grid,
            rows
        )
    }
}

fn xfrm(anchor: &Rect) -> String {
    let (x, y, cx, cy) = anchor.to_emu();
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        x, y, cx, cy
    )
}
