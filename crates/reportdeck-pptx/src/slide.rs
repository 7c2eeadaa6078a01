//! A slide under construction: its shapes, relationships and click timing.

use reportdeck_ooxml::relationships::{relative_target, Relationships};

use crate::constants::{NS_CHART, NS_DRAWING, NS_PRESENTATION, NS_RELATIONSHIPS};
use crate::geometry::Rect;
use crate::presentation::PictureRef;
use crate::shape::{PictureShape, Shape, ShapeKind};

/// Handle to a slide within its presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlideId(pub(crate) u32);

/// Where a hidden picture is parked: off the slide and too small to notice
pub const HIDDEN_ANCHOR: Rect = Rect::new(-1.0, -1.0, 0.1, 0.1);

/// A slide under construction
#[derive(Debug, Clone)]
pub struct Slide {
    id: SlideId,
    part_name: String,
    shapes: Vec<Shape>,
    next_shape_id: u32,
    relationships: Relationships,
    self_link: Option<String>,
    hide_on_click: Vec<u32>,
}

impl Slide {
    /// A blank slide stored at `part_name` using `layout_part`
    pub(crate) fn new(id: SlideId, part_name: String, layout_part: &str) -> Self {
        let mut relationships = Relationships::new();
        relationships.add(
            relative_target(&part_name, layout_part),
            Relationships::TYPE_SLIDE_LAYOUT,
        );
        Self {
            id,
            part_name,
            shapes: Vec::new(),
            // id 1 is the shape tree itself
            next_shape_id: 2,
            relationships,
            self_link: None,
            hide_on_click: Vec::new(),
        }
    }

    pub fn id(&self) -> SlideId {
        self.id
    }

    /// Package part name, e.g. `ppt/slides/slide3.xml`
    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Reserve a fresh shape id
    pub fn next_shape_id(&mut self) -> u32 {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        id
    }

    /// Build a shape with a fresh id without placing it, for group children
    pub fn new_shape(&mut self, kind: ShapeKind) -> Shape {
        let id = self.next_shape_id();
        Shape {
            id,
            name: default_name(&kind, id),
            kind,
        }
    }

    /// Place a shape built by [`Slide::new_shape`] or with a reserved id
    pub fn push(&mut self, shape: Shape) -> u32 {
        let id = shape.id;
        self.next_shape_id = self.next_shape_id.max(id + 1);
        self.shapes.push(shape);
        id
    }

    /// Add a shape and return its id
    pub fn add(&mut self, kind: ShapeKind) -> u32 {
        let shape = self.new_shape(kind);
        self.push(shape)
    }

    /// Place a picture already stored in the package
    pub fn add_picture(&mut self, picture: &PictureRef, anchor: Rect) -> u32 {
        let rel_id = self.picture_rel(picture);
        self.add(ShapeKind::Picture(PictureShape { anchor, rel_id }))
    }

    /// Relationship to a picture part, reused when the slide already has one
    pub fn picture_rel(&mut self, picture: &PictureRef) -> String {
        let target = relative_target(&self.part_name, &picture.part_name);
        match self
            .relationships
            .find_id(&target, Relationships::TYPE_IMAGE)
        {
            Some(id) => id.to_string(),
            None => self.relationships.add(target, Relationships::TYPE_IMAGE),
        }
    }

    pub fn shape(&self, id: u32) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_mut(&mut self, id: u32) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Remove a top-level shape
    pub fn remove_shape(&mut self, id: u32) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id == id)?;
        self.hide_on_click.retain(|&hidden| hidden != id);
        Some(self.shapes.remove(index))
    }

    /// Park a shape off the slide instead of removing it
    pub fn hide_shape(&mut self, id: u32) -> bool {
        match self.shape_mut(id).and_then(Shape::anchor_mut) {
            Some(anchor) => {
                *anchor = HIDDEN_ANCHOR;
                true
            }
            None => false,
        }
    }

    /// Relationship from the slide to itself, for hyperlinks that only
    /// carry a tooltip
    pub fn self_link(&mut self) -> String {
        if let Some(id) = &self.self_link {
            return id.clone();
        }
        let target = relative_target(&self.part_name, &self.part_name);
        let id = self.relationships.add(target, Relationships::TYPE_SLIDE);
        self.self_link = Some(id.clone());
        id
    }

    /// Add a relationship from this slide to another part
    pub fn add_relationship(&mut self, target_part: &str, rel_type: &str) -> String {
        let target = relative_target(&self.part_name, target_part);
        self.relationships.add(target, rel_type)
    }

    /// Add a relationship under a caller-chosen id
    pub fn add_relationship_with_id(&mut self, id: &str, target_part: &str, rel_type: &str) {
        let target = relative_target(&self.part_name, target_part);
        self.relationships.add_with_id(id, target, rel_type);
    }

    /// Fade the shape out and hide it when clicked during the show
    pub fn hide_on_click(&mut self, shape_id: u32) {
        if !self.hide_on_click.contains(&shape_id) {
            self.hide_on_click.push(shape_id);
        }
    }

    /// Shapes with a click-to-hide animation
    pub fn click_to_hide(&self) -> &[u32] {
        &self.hide_on_click
    }

    /// Render the slide part
    pub fn to_xml(&self) -> String {
        let shapes: String = self.shapes.iter().map(Shape::to_xml).collect();
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                "\n",
                r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" xmlns:c="{}">"#,
                "<p:cSld><p:spTree><p:nvGrpSpPr>",
                r#"<p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
                "<p:grpSpPr/>{}</p:spTree></p:cSld>",
                "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>{}</p:sld>"
            ),
            NS_DRAWING,
            NS_RELATIONSHIPS,
            NS_PRESENTATION,
            NS_CHART,
            shapes,
            self.timing_xml()
        )
    }

    /// Render the slide's relationships part
    pub fn rels_xml(&self) -> String {
        self.relationships.to_xml()
    }

    /// One interactive sequence per click-to-hide shape, each triggered by
    /// clicking the shape itself
    fn timing_xml(&self) -> String {
        if self.hide_on_click.is_empty() {
            return String::new();
        }

        let mut node_id = 1;
        let mut next_node = || {
            node_id += 1;
            node_id
        };

        let mut sequences = String::new();
        for &spid in &self.hide_on_click {
            let (seq, outer, inner, effect, fade, set) = (
                next_node(),
                next_node(),
                next_node(),
                next_node(),
                next_node(),
                next_node(),
            );
            sequences.push_str(&format!(
                concat!(
                    r#"<p:seq concurrent="1" nextAc="seek">"#,
                    r#"<p:cTn id="{seq}" restart="whenNotActive" fill="hold" evtFilter="cancelBubble" nodeType="interactiveSeq">"#,
                    r#"<p:stCondLst><p:cond evt="onClick" delay="0"><p:tgtEl><p:spTgt spid="{spid}"/></p:tgtEl></p:cond></p:stCondLst>"#,
                    r#"<p:endSync evt="end" delay="0"><p:rtn val="all"/></p:endSync><p:childTnLst>"#,
                    r#"<p:par><p:cTn id="{outer}" fill="hold"><p:stCondLst><p:cond delay="0"/></p:stCondLst><p:childTnLst>"#,
                    r#"<p:par><p:cTn id="{inner}" fill="hold"><p:stCondLst><p:cond delay="0"/></p:stCondLst><p:childTnLst>"#,
                    r#"<p:par><p:cTn id="{effect}" presetID="10" presetClass="exit" presetSubtype="0" fill="hold" grpId="0" nodeType="clickEffect">"#,
                    r#"<p:stCondLst><p:cond delay="0"/></p:stCondLst><p:childTnLst>"#,
                    r#"<p:animEffect transition="out" filter="fade"><p:cBhvr><p:cTn id="{fade}" dur="500"/>"#,
                    r#"<p:tgtEl><p:spTgt spid="{spid}"/></p:tgtEl></p:cBhvr></p:animEffect>"#,
                    r#"<p:set><p:cBhvr><p:cTn id="{set}" dur="1" fill="hold"><p:stCondLst><p:cond delay="499"/></p:stCondLst></p:cTn>"#,
                    r#"<p:tgtEl><p:spTgt spid="{spid}"/></p:tgtEl><p:attrNameLst><p:attrName>style.visibility</p:attrName></p:attrNameLst></p:cBhvr>"#,
                    r#"<p:to><p:strVal val="hidden"/></p:to></p:set>"#,
                    "</p:childTnLst></p:cTn></p:par>",
                    "</p:childTnLst></p:cTn></p:par>",
                    "</p:childTnLst></p:cTn></p:par>",
                    "</p:childTnLst></p:cTn>",
                    r#"<p:nextCondLst><p:cond evt="onNext" delay="0"><p:tgtEl><p:sldTgt/></p:tgtEl></p:cond></p:nextCondLst>"#,
                    "</p:seq>"
                ),
                seq = seq,
                outer = outer,
                inner = inner,
                effect = effect,
                fade = fade,
                set = set,
                spid = spid
            ));
        }

        let builds: String = self
            .hide_on_click
            .iter()
            .map(|spid| format!(r#"<p:bldP spid="{}" grpId="0" animBg="1"/>"#, spid))
            .collect();

        format!(
            concat!(
                r#"<p:timing><p:tnLst><p:par><p:cTn id="1" dur="indefinite" restart="never" nodeType="tmRoot">"#,
                "<p:childTnLst>{}</p:childTnLst></p:cTn></p:par></p:tnLst>",
                "<p:bldLst>{}</p:bldLst></p:timing>"
            ),
            sequences, builds
        )
    }
}

fn default_name(kind: &ShapeKind, id: u32) -> String {
    let prefix = match kind {
        ShapeKind::Auto(shape) if shape.text_box => "TextBox",
        ShapeKind::Auto(shape) => match shape.geometry {
            crate::shape::Geometry::Custom { .. } => "Freeform",
            crate::shape::Geometry::Preset(_) => "AutoShape",
        },
        ShapeKind::Picture(_) => "Picture",
        ShapeKind::Table(_) => "Table",
        ShapeKind::Group(_) => "Group",
        ShapeKind::ChartFrame(_) => "Chart",
    };
    format!("{} {}", prefix, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::AutoShape;
    use crate::text::TextBody;
    use reportdeck_ooxml::XmlElement;

    fn slide() -> Slide {
        Slide::new(
            SlideId(1),
            "ppt/slides/slide2.xml".to_string(),
            "ppt/slideLayouts/slideLayout7.xml",
        )
    }

    #[test]
    fn test_layout_relationship() {
        let slide = slide();
        assert_eq!(
            slide.relationships().get("rId1"),
            Some("../slideLayouts/slideLayout7.xml")
        );
    }

    #[test]
    fn test_shape_ids_and_names() {
        let mut slide = slide();
        let first = slide.add(ShapeKind::Auto(AutoShape::text_box(
            Rect::default(),
            TextBody::new(),
        )));
        let second = slide.add(ShapeKind::Auto(AutoShape::preset(Rect::default(), "ellipse")));
        assert_eq!((first, second), (2, 3));
        assert_eq!(slide.shape(2).unwrap().name, "TextBox 2");
        assert_eq!(slide.shape(3).unwrap().name, "AutoShape 3");

        let reserved = slide.next_shape_id();
        slide.push(Shape {
            id: reserved,
            name: format!("chart{}", reserved),
            kind: ShapeKind::ChartFrame(XmlElement::new("p:graphicFrame")),
        });
        assert_eq!(slide.next_shape_id(), reserved + 1);

        assert!(slide.remove_shape(first).is_some());
        assert!(slide.remove_shape(first).is_none());
        assert_eq!(slide.shapes().len(), 2);
    }

    #[test]
    fn test_pictures_share_relationship() {
        let mut slide = slide();
        let picture = PictureRef {
            part_name: "ppt/media/image1.png".to_string(),
            width: 10,
            height: 20,
        };
        let a = slide.add_picture(&picture, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = slide.add_picture(&picture, Rect::new(20.0, 0.0, 10.0, 10.0));
        assert_ne!(a, b);
        assert_eq!(slide.relationships().of_type(Relationships::TYPE_IMAGE).count(), 1);

        assert!(slide.hide_shape(a));
        match &slide.shape(a).unwrap().kind {
            ShapeKind::Picture(p) => assert_eq!(p.anchor, HIDDEN_ANCHOR),
            other => panic!("expected picture, got {:?}", other),
        }
    }

    #[test]
    fn test_self_link_is_reused() {
        let mut slide = slide();
        let first = slide.self_link();
        assert_eq!(slide.self_link(), first);
        assert_eq!(slide.relationships().get(&first), Some("slide2.xml"));
    }

    #[test]
    fn test_slide_markup() {
        let mut slide = slide();
        slide.add(ShapeKind::Auto(AutoShape::preset(Rect::default(), "rect")));
        let xml = slide.to_xml();
        assert!(xml.contains(r#"<p:cNvPr id="1" name=""/>"#));
        assert!(xml.contains(r#"<p:cNvPr id="2" name="AutoShape 2"/>"#));
        assert!(xml.contains("<a:masterClrMapping/>"));
        assert!(!xml.contains("<p:timing>"));
        assert!(XmlElement::parse(xml.as_bytes()).is_ok());
    }

    #[test]
    fn test_click_to_hide_timing() {
        let mut slide = slide();
        let a = slide.add(ShapeKind::Auto(AutoShape::preset(Rect::default(), "rect")));
        let b = slide.add(ShapeKind::Auto(AutoShape::preset(Rect::default(), "rect")));
        slide.hide_on_click(a);
        slide.hide_on_click(b);
        slide.hide_on_click(a);

        let root = XmlElement::parse(slide.to_xml().as_bytes()).unwrap();
        let timing = root.child("p:timing").unwrap();
        assert_eq!(timing.find_all("p:seq").len(), 2);
        assert_eq!(timing.find_all("p:bldP").len(), 2);

        let mut ids: Vec<&str> = timing
            .find_all("p:cTn")
            .into_iter()
            .filter_map(|c| c.attr("id"))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);

        let effect = timing
            .find_all("p:cTn")
            .into_iter()
            .find(|c| c.attr("presetClass") == Some("exit"))
            .unwrap();
        assert_eq!(effect.attr("presetID"), Some("10"));
        assert!(slide.to_xml().contains(r#"<p:cond delay="499"/>"#));
    }
}
