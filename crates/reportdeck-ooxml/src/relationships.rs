//! Relationship parts for OPC packages
//!
//! Every part that points at other parts (a slide at its layout, chart and
//! pictures; a chart at its embedded workbook) does so through a sibling
//! `_rels/<name>.rels` file mapping relationship IDs to targets. Targets are
//! relative to the folder of the source part.
//!
//! # Example
//!
//! ```
//! use reportdeck_ooxml::relationships::{self, Relationships};
//!
//! let mut rels = Relationships::new();
//! let id = rels.add("../charts/chart1.xml", Relationships::TYPE_CHART);
//! assert_eq!(id, "rId1");
//!
//! let path = relationships::rels_path_for("ppt/slides/slide1.xml");
//! assert_eq!(path, "ppt/slides/_rels/slide1.xml.rels");
//! assert_eq!(
//!     relationships::resolve_target("ppt/slides/slide1.xml", "../charts/chart1.xml"),
//!     "ppt/charts/chart1.xml"
//! );
//! ```

use std::collections::HashMap;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Common relationship type URIs
impl Relationships {
    /// Office document (package root to presentation/workbook)
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Slide relationship type
    pub const TYPE_SLIDE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    /// Slide layout relationship type
    pub const TYPE_SLIDE_LAYOUT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    /// Chart relationship type
    pub const TYPE_CHART: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    /// Embedded package (e.g. the chart's workbook)
    pub const TYPE_PACKAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/package";
    /// Image relationship type
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    /// Hyperlink relationship type
    pub const TYPE_HYPERLINK: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    /// Worksheet relationship type
    pub const TYPE_WORKSHEET: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    /// Styles relationship type
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
}

/// Parsed relationships from a .rels file
///
/// Maintains insertion order for deterministic XML serialization.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Ordered list of relationship IDs (maintains insertion order)
    order: Vec<String>,
    /// Map of relationship ID to target (for fast lookups)
    map: HashMap<String, RelationshipTarget>,
    /// Counter for generating unique IDs (starts at 1)
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            next_id_counter: 1,
        }
    }
}

/// A relationship target with its type and mode
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipTarget {
    /// The target URL or path, relative to the source part's folder
    pub target: String,
    /// The relationship type URI
    pub rel_type: String,
    /// Target mode: "External" for URLs, None for internal parts
    pub target_mode: Option<String>,
}

impl Relationships {
    /// Create an empty relationships map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut target_mode = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                b"TargetMode" => target_mode = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            rels.insert(
                                id,
                                RelationshipTarget {
                                    target,
                                    rel_type: rel_type.unwrap_or_default(),
                                    target_mode,
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    fn insert(&mut self, id: String, rel: RelationshipTarget) {
        if let Some(num) = extract_id_number(&id) {
            self.next_id_counter = self.next_id_counter.max(num + 1);
        }
        if self.map.insert(id.clone(), rel).is_none() {
            self.order.push(id);
        }
    }

    /// Add a new internal relationship and return the generated ID
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        self.add_with_mode(target, rel_type, None)
    }

    /// Add a new relationship with explicit target mode
    pub fn add_with_mode(
        &mut self,
        target: impl Into<String>,
        rel_type: impl Into<String>,
        target_mode: Option<String>,
    ) -> String {
        let mut id = format!("rId{}", self.next_id_counter);
        while self.map.contains_key(&id) {
            self.next_id_counter += 1;
            id = format!("rId{}", self.next_id_counter);
        }
        self.insert(
            id.clone(),
            RelationshipTarget {
                target: target.into(),
                rel_type: rel_type.into(),
                target_mode,
            },
        );
        id
    }

    /// Add or replace a relationship under a caller-chosen ID
    pub fn add_with_id(
        &mut self,
        id: impl Into<String>,
        target: impl Into<String>,
        rel_type: impl Into<String>,
    ) {
        self.insert(
            id.into(),
            RelationshipTarget {
                target: target.into(),
                rel_type: rel_type.into(),
                target_mode: None,
            },
        );
    }

    /// Remove a relationship, returning its target
    pub fn remove(&mut self, id: &str) -> Option<RelationshipTarget> {
        let removed = self.map.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Serialize relationships to OOXML format
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));

        for (id, rel) in self.iter() {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape(id),
                escape(rel.rel_type.as_str()),
                escape(rel.target.as_str())
            ));
            if let Some(mode) = &rel.target_mode {
                xml.push_str(&format!(r#" TargetMode="{}""#, escape(mode.as_str())));
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }

    /// Get the target for a relationship ID
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target.as_str())
    }

    /// Get the full relationship target for an ID
    pub fn get_target(&self, id: &str) -> Option<&RelationshipTarget> {
        self.map.get(id)
    }

    /// Check if a relationship ID exists
    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    /// All relationships of a given type, in document order
    pub fn of_type<'a>(
        &'a self,
        rel_type: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a RelationshipTarget)> + 'a {
        self.iter().filter(move |(_, rel)| rel.rel_type == rel_type)
    }

    /// The first relationship of a given type
    pub fn first_of_type(&self, rel_type: &str) -> Option<(&str, &RelationshipTarget)> {
        self.iter().find(|(_, rel)| rel.rel_type == rel_type)
    }

    /// The ID of an existing relationship to `target` with the given type
    pub fn find_id(&self, target: &str, rel_type: &str) -> Option<&str> {
        self.iter()
            .find(|(_, rel)| rel.target == target && rel.rel_type == rel_type)
            .map(|(id, _)| id)
    }

    /// Get the number of relationships
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over relationships in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipTarget)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }

    /// Get the next ID that would be generated (without incrementing)
    pub fn peek_next_id(&self) -> String {
        format!("rId{}", self.next_id_counter)
    }
}

/// Extract the numeric portion from a relationship ID (e.g., "rId5" -> 5)
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|num_str| num_str.parse().ok())
}

/// Path of the relationships part belonging to `part`
pub fn rels_path_for(part: &str) -> String {
    match part.rfind('/') {
        Some(idx) => format!("{}/_rels/{}.rels", &part[..idx], &part[idx + 1..]),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns the relationship
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute);
    }
    let base = source_part.rfind('/').map_or("", |idx| &source_part[..idx]);
    if base.is_empty() {
        normalize(target)
    } else {
        normalize(&format!("{}/{}", base, target))
    }
}

/// Express `target_part` relative to the folder of `source_part`
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rfind('/') {
        Some(idx) => source_part[..idx].split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();
    let (target_dir, file) = target.split_at(target.len().saturating_sub(1));

    let common = source_dir
        .iter()
        .zip(target_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..")
        .take(source_dir.len() - common)
        .collect();
    parts.extend_from_slice(&target_dir[common..]);
    parts.extend_from_slice(file);
    parts.join("/")
}

fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relationships() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
        <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout7.xml"/>
            <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart3.xml"/>
        </Relationships>"#;

        let rels = Relationships::parse(xml).unwrap();

        assert_eq!(rels.get("rId2"), Some("../charts/chart3.xml"));
        assert_eq!(
            rels.first_of_type(Relationships::TYPE_CHART).map(|(id, _)| id),
            Some("rId2")
        );
        assert_eq!(rels.of_type(Relationships::TYPE_SLIDE_LAYOUT).count(), 1);
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_add_continues_from_existing() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="t" Target="a.xml"/>
            <Relationship Id="rId5" Type="t" Target="b.xml"/>
        </Relationships>"#;

        let mut rels = Relationships::parse(xml).unwrap();
        assert_eq!(rels.add("media/image1.png", Relationships::TYPE_IMAGE), "rId6");
    }

    #[test]
    fn test_custom_ids_do_not_collide() {
        let mut rels = Relationships::new();
        rels.add_with_id("relId1", "../charts/chart1.xml", Relationships::TYPE_CHART);
        rels.add_with_id("rId1", "../slideLayouts/slideLayout1.xml", Relationships::TYPE_SLIDE_LAYOUT);

        assert_eq!(rels.add("../media/image1.png", Relationships::TYPE_IMAGE), "rId2");
        assert_eq!(rels.get("relId1"), Some("../charts/chart1.xml"));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut rels = Relationships::new();
        rels.add("first.xml", "type1");
        rels.add("second.xml", "type2");
        rels.add("third.xml", "type3");

        let removed = rels.remove("rId2").unwrap();
        assert_eq!(removed.target, "second.xml");
        assert!(rels.remove("rId2").is_none());

        let targets: Vec<&str> = rels.iter().map(|(_, rel)| rel.target.as_str()).collect();
        assert_eq!(targets, vec!["first.xml", "third.xml"]);
    }

    #[test]
    fn test_to_xml_roundtrip_with_escaping() {
        let mut rels = Relationships::new();
        rels.add("file with <special> & \"chars\".xml", Relationships::TYPE_STYLES);
        rels.add_with_mode(
            "https://example.com/?a=1&b=2",
            Relationships::TYPE_HYPERLINK,
            Some("External".to_string()),
        );

        let xml = rels.to_xml();
        assert!(xml.contains(&format!(r#"xmlns="{}""#, RELATIONSHIPS_NS)));
        assert!(xml.contains("&lt;special&gt;"));
        assert!(xml.contains(r#"TargetMode="External""#));

        let reparsed = Relationships::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.get("rId1"), Some("file with <special> & \"chars\".xml"));
        assert_eq!(reparsed.get("rId2"), Some("https://example.com/?a=1&b=2"));
        assert_eq!(
            reparsed.get_target("rId2").unwrap().target_mode.as_deref(),
            Some("External")
        );
    }

    #[test]
    fn test_find_id() {
        let mut rels = Relationships::new();
        rels.add("../media/image1.png", Relationships::TYPE_IMAGE);
        assert_eq!(
            rels.find_id("../media/image1.png", Relationships::TYPE_IMAGE),
            Some("rId1")
        );
        assert_eq!(rels.find_id("../media/image1.png", Relationships::TYPE_CHART), None);
    }

    #[test]
    fn test_extract_id_number() {
        assert_eq!(extract_id_number("rId1"), Some(1));
        assert_eq!(extract_id_number("rId123"), Some(123));
        assert_eq!(extract_id_number("relId3"), None);
        assert_eq!(extract_id_number("rIdabc"), None);
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for("ppt/charts/chart2.xml"), "ppt/charts/_rels/chart2.xml.rels");
        assert_eq!(rels_path_for(""), "_rels/.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("ppt/charts/chart1.xml", "../embeddings/Microsoft_Excel_Worksheet.xlsx"),
            "ppt/embeddings/Microsoft_Excel_Worksheet.xlsx"
        );
        assert_eq!(resolve_target("ppt/presentation.xml", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "/ppt/media/a.png"), "ppt/media/a.png");
    }

    #[test]
    fn test_relative_target() {
        assert_eq!(
            relative_target("ppt/slides/slide3.xml", "ppt/charts/chart9.xml"),
            "../charts/chart9.xml"
        );
        assert_eq!(relative_target("ppt/presentation.xml", "ppt/slides/slide1.xml"), "slides/slide1.xml");
        assert_eq!(relative_target("ppt/slides/slide1.xml", "ppt/slides/slide1.xml"), "slide1.xml");
    }
}
