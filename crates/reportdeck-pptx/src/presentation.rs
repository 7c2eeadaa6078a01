//! The output document: slides, pictures and committed charts on top of the
//! template package.
//!
//! Slides are kept as [`Slide`] values and only rendered into the package by
//! [`Presentation::to_package`]. Their part names are reserved in the package
//! the moment they are added, so charts and pictures committed in between
//! never collide with them.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use reportdeck_ooxml::content_types::{CONTENT_TYPES_PATH, CT_CHART, CT_SLIDE};
use reportdeck_ooxml::relationships::{rels_path_for, relative_target, resolve_target};
use reportdeck_ooxml::{ContentTypes, OoxmlArchive, Relationships, XmlElement};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::chart::BoundChart;
use crate::error::{ReportError, Result};
use crate::geometry::{from_emu, Rect};
use crate::image_source::ImageData;
use crate::shape::{Shape, ShapeKind};
use crate::slide::{Slide, SlideId};
use crate::template::ChartFragment;

/// Content type of slide layout parts
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";

/// First id PowerPoint accepts in `p:sldIdLst`
const FIRST_SLIDE_LIST_ID: u32 = 256;

/// Elements that follow `p:sldIdLst` inside `p:presentation`
const SLIDE_LIST_FOLLOWERS: [&str; 11] = [
    "p:sldSz",
    "p:notesSz",
    "p:smartTags",
    "p:embeddedFontLst",
    "p:custShowLst",
    "p:photoAlbum",
    "p:custDataLst",
    "p:kinsoku",
    "p:defaultTextStyle",
    "p:modifyVerifier",
    "p:extLst",
];

/// A picture stored in the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureRef {
    pub part_name: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

/// A presentation being composed
#[derive(Debug, Clone)]
pub struct Presentation {
    package: OoxmlArchive,
    content_types: ContentTypes,
    presentation_part: String,
    presentation: XmlElement,
    presentation_rels: Relationships,
    layout_part: String,
    slide_width: f64,
    slide_height: f64,
    slides: Vec<(Slide, String)>,
    next_slide_id: u32,
    pictures: HashMap<Vec<u8>, PictureRef>,
}

impl Presentation {
    /// Start a presentation from a package holding masters and layouts
    pub fn from_package(package: OoxmlArchive) -> Result<Self> {
        let content_types = ContentTypes::parse(package.require(CONTENT_TYPES_PATH)?)?;
        let root_rels = Relationships::parse(package.require("_rels/.rels")?)?;
        let presentation_part = root_rels
            .first_of_type(Relationships::TYPE_OFFICE_DOCUMENT)
            .map(|(_, rel)| resolve_target("", &rel.target))
            .unwrap_or_else(|| "ppt/presentation.xml".to_string());

        let presentation = XmlElement::parse(package.require(&presentation_part)?)?;
        let presentation_rels = match package.get(&rels_path_for(&presentation_part)) {
            Some(xml) => Relationships::parse(xml)?,
            None => Relationships::new(),
        };

        let size = presentation.child("p:sldSz");
        let dimension = |name: &str| {
            size.and_then(|s| s.attr(name))
                .and_then(|v| v.parse::<i64>().ok())
                .map(from_emu)
        };
        let slide_width = dimension("cx").unwrap_or(720.0);
        let slide_height = dimension("cy").unwrap_or(540.0);

        let layout_part = select_layout(&package, &content_types)?;
        debug!(layout = %layout_part, slide_width, slide_height, "presentation opened");

        Ok(Self {
            package,
            content_types,
            presentation_part,
            presentation,
            presentation_rels,
            layout_part,
            slide_width,
            slide_height,
            slides: Vec::new(),
            next_slide_id: 1,
            pictures: HashMap::new(),
        })
    }

    /// Slide width and height in points
    pub fn slide_size(&self) -> (f64, f64) {
        (self.slide_width, self.slide_height)
    }

    /// The layout new slides are based on
    pub fn layout_part(&self) -> &str {
        &self.layout_part
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide handles in presentation order
    pub fn slide_ids(&self) -> Vec<SlideId> {
        self.slides.iter().map(|(slide, _)| slide.id()).collect()
    }

    pub fn slides(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter().map(|(slide, _)| slide)
    }

    pub fn slide(&self, id: SlideId) -> Option<&Slide> {
        self.slides
            .iter()
            .find(|(slide, _)| slide.id() == id)
            .map(|(slide, _)| slide)
    }

    pub fn slide_mut(&mut self, id: SlideId) -> Option<&mut Slide> {
        self.slides
            .iter_mut()
            .find(|(slide, _)| slide.id() == id)
            .map(|(slide, _)| slide)
    }

    /// Like [`Presentation::slide_mut`], failing for removed slides
    pub fn require_slide_mut(&mut self, id: SlideId) -> Result<&mut Slide> {
        self.slide_mut(id)
            .ok_or_else(|| ReportError::invalid_input(format!("slide {} does not exist", id.0)))
    }

    /// Append a blank slide
    pub fn add_slide(&mut self) -> SlideId {
        let part_name = self.package.next_part_name("ppt/slides/slide1.xml");
        // reserve the name until the slide is written
        self.package.set(part_name.clone(), Vec::new());

        let rel_id = self.presentation_rels.add(
            relative_target(&self.presentation_part, &part_name),
            Relationships::TYPE_SLIDE,
        );
        let id = SlideId(self.next_slide_id);
        self.next_slide_id += 1;
        self.slides
            .push((Slide::new(id, part_name, &self.layout_part), rel_id));
        id
    }

    /// Drop a slide; parts it committed stay in the package
    pub fn remove_slide(&mut self, id: SlideId) -> bool {
        let Some(index) = self.slides.iter().position(|(slide, _)| slide.id() == id) else {
            return false;
        };
        let (slide, rel_id) = self.slides.remove(index);
        self.presentation_rels.remove(&rel_id);
        self.package.remove(slide.part_name());
        true
    }

    /// Store a picture in the package; identical bytes are stored once
    pub fn add_picture(&mut self, image: &ImageData) -> Result<PictureRef> {
        let digest = Sha256::digest(&image.bytes).to_vec();
        if let Some(existing) = self.pictures.get(&digest) {
            return Ok(existing.clone());
        }

        let (width, height) = image::ImageReader::new(Cursor::new(&image.bytes))
            .with_guessed_format()
            .map_err(|e| ReportError::image_fetch(image.format.extension(), e.to_string()))?
            .into_dimensions()
            .map_err(|e| ReportError::image_fetch(image.format.extension(), e.to_string()))?;

        let extension = image.format.extension();
        let part_name = self
            .package
            .next_part_name(&format!("ppt/media/image1.{}", extension));
        if self.content_types.content_type_for(&part_name).is_none() {
            self.content_types
                .add_default(extension, image.format.content_type());
        }
        self.package.set(part_name.clone(), image.bytes.clone());
        debug!(part = %part_name, width, height, "picture stored");

        let picture = PictureRef {
            part_name,
            width,
            height,
        };
        self.pictures.insert(digest, picture.clone());
        Ok(picture)
    }

    /// Commit a bound chart to a slide.
    ///
    /// The chart XML and its workbook are written under fresh part names,
    /// the template's other chart parts (style, colours) are copied along,
    /// and a graphic frame pointing at the new chart is placed on the
    /// slide. Returns the frame's shape id.
    pub fn commit_chart(
        &mut self,
        slide_id: SlideId,
        fragment: &ChartFragment,
        bound: BoundChart,
        anchor: Option<Rect>,
    ) -> Result<u32> {
        let chart_part = self.package.next_part_name(fragment.part_name());

        let mut chart_rels = Relationships::new();
        let mut related_parts = Vec::new();
        for related in fragment.related() {
            let bytes = if related.rel_type == Relationships::TYPE_PACKAGE {
                bound.workbook.to_bytes()?
            } else {
                related.bytes.clone()
            };
            let part_name = self.package.next_part_name(&related.part_name);
            // reserve before the next lookup
            self.package.set(part_name.clone(), bytes);
            chart_rels.add_with_id(
                related.rel_id.as_str(),
                relative_target(&chart_part, &part_name),
                related.rel_type.as_str(),
            );
            related_parts.push((part_name, related.content_type.clone()));
        }

        self.package
            .set_string(chart_part.clone(), bound.chart.to_document());
        self.content_types.add_override(&chart_part, CT_CHART);
        if !chart_rels.is_empty() {
            self.package
                .set_string(rels_path_for(&chart_part), chart_rels.to_xml());
        }
        for (part_name, content_type) in related_parts {
            if let Some(content_type) = content_type {
                if self.content_types.content_type_for(&part_name) != Some(content_type.as_str()) {
                    self.content_types.add_override(&part_name, &content_type);
                }
            }
        }

        let slide = self.require_slide_mut(slide_id)?;
        let rel_id = slide.add_relationship(&chart_part, Relationships::TYPE_CHART);
        let shape_id = slide.next_shape_id();
        let frame = fragment.instantiate(shape_id, &rel_id, anchor);
        slide.push(Shape {
            id: shape_id,
            name: format!("chart{}", shape_id),
            kind: ShapeKind::ChartFrame(frame),
        });

        debug!(part = %chart_part, kind = ?fragment.kind(), "chart committed");
        Ok(shape_id)
    }

    /// Render every slide into a copy of the package
    pub fn to_package(&self) -> Result<OoxmlArchive> {
        let mut package = self.package.clone();
        let mut content_types = self.content_types.clone();
        let mut presentation = self.presentation.clone();

        if self.slides.is_empty() {
            presentation.remove_children_named("p:sldIdLst");
        } else {
            let list = presentation.ensure_child("p:sldIdLst", &SLIDE_LIST_FOLLOWERS);
            list.children.clear();
            for (index, (slide, rel_id)) in self.slides.iter().enumerate() {
                package.set_string(slide.part_name().to_string(), slide.to_xml());
                package.set_string(rels_path_for(slide.part_name()), slide.rels_xml());
                content_types.add_override(slide.part_name(), CT_SLIDE);
                list.push(
                    XmlElement::new("p:sldId")
                        .with_attr("id", (FIRST_SLIDE_LIST_ID + index as u32).to_string())
                        .with_attr("r:id", rel_id.as_str()),
                );
            }
        }

        package.set_string(self.presentation_part.clone(), presentation.to_document());
        package.set_string(
            rels_path_for(&self.presentation_part),
            self.presentation_rels.to_xml(),
        );
        package.set_string(CONTENT_TYPES_PATH, content_types.to_xml());
        Ok(package)
    }

    /// Serialize to `.pptx` bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_package()?.to_bytes()?)
    }

    /// Serialize to a `.pptx` file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_package()?.write_to_file(path)?;
        Ok(())
    }
}

/// The layout marked `type="blank"`, or the lowest-numbered layout
fn select_layout(package: &OoxmlArchive, content_types: &ContentTypes) -> Result<String> {
    let mut layouts: Vec<String> = content_types
        .parts_of_type(CT_SLIDE_LAYOUT)
        .map(str::to_string)
        .filter(|part| package.contains(part))
        .collect();
    if layouts.is_empty() {
        layouts = package
            .file_list()
            .into_iter()
            .filter(|p| p.starts_with("ppt/slideLayouts/") && p.ends_with(".xml"))
            .map(str::to_string)
            .collect();
    }
    layouts.sort_by_key(|part| (part_number(part), part.clone()));

    for part in &layouts {
        let root = XmlElement::parse(package.require(part)?)?;
        if root.attr("type") == Some("blank") {
            return Ok(part.clone());
        }
    }
    layouts
        .into_iter()
        .next()
        .ok_or_else(|| ReportError::template_load("Template has no slide layouts"))
}

fn part_number(part: &str) -> u64 {
    let stem = part.rsplit('/').next().unwrap_or(part);
    let digits: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_source::ImageFormat;
    use crate::sample::sample_template;
    use crate::shape::AutoShape;
    use crate::template::TemplateHandle;

    fn presentation() -> Presentation {
        let template = TemplateHandle::load(&sample_template().unwrap()).unwrap();
        template.new_presentation().unwrap()
    }

    fn png(width: u32, height: u32) -> ImageData {
        let mut bytes = Cursor::new(Vec::new());
        image::RgbImage::new(width, height)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        ImageData::new(ImageFormat::Png, bytes.into_inner())
    }

    #[test]
    fn test_blank_layout_selected() {
        let deck = presentation();
        let layout = XmlElement::parse(
            deck.package.require(deck.layout_part()).unwrap(),
        )
        .unwrap();
        assert_eq!(layout.attr("type"), Some("blank"));
    }

    #[test]
    fn test_slides_get_distinct_parts() {
        let mut deck = presentation();
        let a = deck.add_slide();
        let b = deck.add_slide();
        let names: Vec<String> = deck.slides().map(|s| s.part_name().to_string()).collect();
        assert_eq!(names, vec!["ppt/slides/slide1.xml", "ppt/slides/slide2.xml"]);

        assert!(deck.remove_slide(a));
        assert!(!deck.remove_slide(a));
        assert_eq!(deck.slide_ids(), vec![b]);
        let c = deck.add_slide();
        assert_eq!(deck.slide(c).unwrap().part_name(), "ppt/slides/slide1.xml");
    }

    #[test]
    fn test_slide_list_written() {
        let mut deck = presentation();
        let id = deck.add_slide();
        deck.slide_mut(id)
            .unwrap()
            .add(ShapeKind::Auto(AutoShape::preset(Rect::default(), "rect")));
        deck.add_slide();

        let package = deck.to_package().unwrap();
        let root = XmlElement::parse(package.require("ppt/presentation.xml").unwrap()).unwrap();
        let ids: Vec<&str> = root
            .path(&["p:sldIdLst"])
            .unwrap()
            .children_named("p:sldId")
            .filter_map(|s| s.attr("id"))
            .collect();
        assert_eq!(ids, vec!["256", "257"]);

        let types = ContentTypes::parse(package.require(CONTENT_TYPES_PATH).unwrap()).unwrap();
        assert_eq!(types.parts_of_type(CT_SLIDE).count(), 2);
        assert!(package.contains("ppt/slides/_rels/slide2.xml.rels"));
    }

    #[test]
    fn test_pictures_deduplicated() {
        let mut deck = presentation();
        let first = deck.add_picture(&png(4, 2)).unwrap();
        let again = deck.add_picture(&png(4, 2)).unwrap();
        let other = deck.add_picture(&png(3, 3)).unwrap();

        assert_eq!(first, again);
        assert_ne!(first.part_name, other.part_name);
        assert_eq!((first.width, first.height), (4, 2));
        assert_eq!(
            deck.content_types.content_type_for(&first.part_name),
            Some("image/png")
        );
    }

    #[test]
    fn test_undecodable_picture_rejected() {
        let mut deck = presentation();
        let err = deck
            .add_picture(&ImageData::new(ImageFormat::Jpeg, b"not a jpeg".to_vec()))
            .unwrap_err();
        assert_eq!(err.code(), "RPT003");
    }
}
