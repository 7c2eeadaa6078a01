//! `[Content_Types].xml` handling
//!
//! Each part's MIME type is declared either by extension (`Default`) or by
//! explicit part name (`Override`). New parts must be registered here or
//! PowerPoint refuses to open the package.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// Path of the content types part
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";

/// Content types namespace
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Chart part content type
pub const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
/// Slide part content type
pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
/// Embedded workbook content type
pub const CT_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// Relationship part content type
pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Parsed `[Content_Types].xml`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentTypes {
    /// (extension, content type), extension without the dot
    defaults: Vec<(String, String)>,
    /// (part name without leading slash, content type)
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Create an empty content types table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let is_default = e.local_name().as_ref() == b"Default";
                    let is_override = e.local_name().as_ref() == b"Override";

                    if is_default || is_override {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => key = value,
                                b"ContentType" => content_type = value,
                                _ => {}
                            }
                        }

                        if let (Some(key), Some(content_type)) = (key, content_type) {
                            if is_default {
                                types.add_default(&key, &content_type);
                            } else {
                                types.add_override(&key, &content_type);
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Register a content type for a file extension
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        if !self.defaults.iter().any(|(ext, _)| *ext == extension) {
            self.defaults.push((extension, content_type.to_string()));
        }
    }

    /// Register or replace a content type for a specific part
    pub fn add_override(&mut self, part: &str, content_type: &str) {
        let part = part.trim_start_matches('/').to_string();
        match self.overrides.iter_mut().find(|(name, _)| *name == part) {
            Some(existing) => existing.1 = content_type.to_string(),
            None => self.overrides.push((part, content_type.to_string())),
        }
    }

    /// Drop the override for a part, if any
    pub fn remove_override(&mut self, part: &str) -> bool {
        let part = part.trim_start_matches('/');
        let before = self.overrides.len();
        self.overrides.retain(|(name, _)| name != part);
        before != self.overrides.len()
    }

    /// The content type a part resolves to
    pub fn content_type_for(&self, part: &str) -> Option<&str> {
        let part = part.trim_start_matches('/');
        if let Some((_, ct)) = self.overrides.iter().find(|(name, _)| name == part) {
            return Some(ct.as_str());
        }
        let extension = part.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, ct)| ct.as_str())
    }

    /// Part names registered with the given content type
    pub fn parts_of_type<'a>(&'a self, content_type: &'a str) -> impl Iterator<Item = &'a str> {
        self.overrides
            .iter()
            .filter(move |(_, ct)| ct == content_type)
            .map(|(name, _)| name.as_str())
    }

    /// Serialize to XML
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS));
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(ext.as_str()),
                escape(ct.as_str())
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                escape(part.as_str()),
                escape(ct.as_str())
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

/// Picture content type for a file extension
pub fn image_content_type(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}
