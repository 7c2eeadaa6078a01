//! A small owned XML element tree
//!
//! Slide and chart parts are edited structurally: series are cloned, axes
//! removed, points regenerated. This module parses a part into an
//! [`XmlElement`] tree with `quick-xml`, lets callers rearrange it, and
//! writes it back out.
//!
//! Names are kept with their prefix (`c:ser`, `a:srgbClr`). Elements and
//! attributes in the well-known OOXML namespaces are renamed to the
//! conventional prefix on parse, whatever prefix the producer bound, so
//! lookups by `c:plotArea` work on any valid part. Namespace declarations
//! stay ordinary attributes and are rewritten to match.
//!
//! Schema order matters for OOXML: most insertions go through
//! [`XmlElement::insert_before_first_of`], which places a child in front of
//! the first sibling that must follow it.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// Standard declaration written at the top of every part
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Namespaces renamed to a fixed prefix on parse
pub const CANONICAL_PREFIXES: &[(&str, &str)] = &[
    ("http://schemas.openxmlformats.org/drawingml/2006/chart", "c"),
    ("http://schemas.openxmlformats.org/drawingml/2006/main", "a"),
    ("http://schemas.openxmlformats.org/presentationml/2006/main", "p"),
    (
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        "r",
    ),
];

/// Conventional prefix for a namespace URI, if it is one we rename
pub fn canonical_prefix(uri: &str) -> Option<&'static str> {
    CANONICAL_PREFIXES
        .iter()
        .find(|(known, _)| *known == uri)
        .map(|(_, prefix)| *prefix)
}

/// Prefix renames declared by one element: (prefix as written, canonical)
type PrefixScope = Vec<(String, String)>;

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified name, e.g. `c:lineChart`
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut scopes: Vec<PrefixScope> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let (element, scope) = Self::from_start(e, &scopes)?;
                    stack.push(element);
                    scopes.push(scope);
                }
                Event::Empty(ref e) => {
                    let (element, _) = Self::from_start(e, &scopes)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        OoxmlError::InvalidStructure("unbalanced closing tag".to_string())
                    })?;
                    scopes.pop();
                    element.drop_layout_whitespace();
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&e.unescape()?);
                    }
                }
                Event::CData(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(OoxmlError::InvalidStructure(format!(
                "unclosed element <{}>",
                stack.last().map_or("", |e| e.name.as_str())
            )));
        }
        root.ok_or_else(|| OoxmlError::InvalidStructure("document has no root element".to_string()))
    }

    fn from_start(
        start: &BytesStart<'_>,
        outer: &[PrefixScope],
    ) -> Result<(Self, PrefixScope)> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        let mut scope = PrefixScope::new();
        for (key, value) in &attributes {
            if let Some(prefix) = declared_prefix(key) {
                let canonical = canonical_prefix(value).unwrap_or(prefix);
                scope.push((prefix.to_string(), canonical.to_string()));
            }
        }

        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut element = Self::new(rename(&name, &scope, outer, true));
        for (key, value) in attributes {
            let key = match declared_prefix(&key) {
                Some(prefix) => match canonical_prefix(&value).unwrap_or(prefix) {
                    "" => "xmlns".to_string(),
                    canonical => format!("xmlns:{}", canonical),
                },
                None => rename(&key, &scope, outer, false),
            };
            // a second binding of the same namespace collapses into the first
            if element.attr(&key).is_none() {
                element.attributes.push((key, value));
            }
        }
        Ok((element, scope))
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> Result<()> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(XmlNode::Element(element)),
            None if root.is_none() => *root = Some(element),
            None => {
                return Err(OoxmlError::InvalidStructure(
                    "more than one root element".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    /// Indentation between child elements is not content
    fn drop_layout_whitespace(&mut self) {
        let has_elements = self
            .children
            .iter()
            .any(|c| matches!(c, XmlNode::Element(_)));
        if has_elements {
            self.children
                .retain(|c| !matches!(c, XmlNode::Text(t) if t.trim().is_empty()));
        }
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Iterate over child elements
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Iterate mutably over child elements
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// First child element with the given name, mutably
    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// Child elements with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// Child elements with the given name, mutably
    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut XmlElement> {
        self.elements_mut().filter(move |e| e.name == name)
    }

    /// The `n`th child element with the given name
    pub fn nth_child(&self, name: &str, n: usize) -> Option<&XmlElement> {
        self.elements().filter(|e| e.name == name).nth(n)
    }

    /// The `n`th child element with the given name, mutably
    pub fn nth_child_mut(&mut self, name: &str, n: usize) -> Option<&mut XmlElement> {
        self.elements_mut().filter(|e| e.name == name).nth(n)
    }

    /// Number of child elements with the given name
    pub fn count_children(&self, name: &str) -> usize {
        self.children_named(name).count()
    }

    /// Follow a path of child names from this element
    pub fn path(&self, names: &[&str]) -> Option<&XmlElement> {
        names
            .iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Follow a path of child names from this element, mutably
    pub fn path_mut(&mut self, names: &[&str]) -> Option<&mut XmlElement> {
        let mut current = self;
        for name in names {
            current = current.child_mut(name)?;
        }
        Some(current)
    }

    /// Append a child element
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Insert `child` before the first existing child element whose name is
    /// in `followers`, or append it if there is none. Returns the position
    /// in `children`.
    pub fn insert_before_first_of(&mut self, child: XmlElement, followers: &[&str]) -> usize {
        let position = self
            .children
            .iter()
            .position(|c| matches!(c, XmlNode::Element(e) if followers.contains(&e.name.as_str())))
            .unwrap_or(self.children.len());
        self.children.insert(position, XmlNode::Element(child));
        position
    }

    /// Insert `child` directly after the last child element named `name`,
    /// or append it if there is none
    pub fn insert_after_last(&mut self, child: XmlElement, name: &str) {
        let position = self
            .children
            .iter()
            .rposition(|c| matches!(c, XmlNode::Element(e) if e.name == name))
            .map_or(self.children.len(), |p| p + 1);
        self.children.insert(position, XmlNode::Element(child));
    }

    /// Get the named child, creating it in schema position if missing
    pub fn ensure_child(&mut self, name: &str, followers: &[&str]) -> &mut XmlElement {
        let position = match self
            .children
            .iter()
            .position(|c| matches!(c, XmlNode::Element(e) if e.name == name))
        {
            Some(p) => p,
            None => self.insert_before_first_of(XmlElement::new(name), followers),
        };
        match &mut self.children[position] {
            XmlNode::Element(element) => element,
            XmlNode::Text(_) => unreachable!("position always refers to an element"),
        }
    }

    /// Remove every child element with the given name; returns how many
    pub fn remove_children_named(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|c| !matches!(c, XmlNode::Element(e) if e.name == name));
        before - self.children.len()
    }

    /// Remove every child element whose name is in `names`
    pub fn remove_children_in(&mut self, names: &[&str]) -> usize {
        let before = self.children.len();
        self.children
            .retain(|c| !matches!(c, XmlNode::Element(e) if names.contains(&e.name.as_str())));
        before - self.children.len()
    }

    /// Remove and return the `n`th child element with the given name
    pub fn remove_nth_child(&mut self, name: &str, n: usize) -> Option<XmlElement> {
        let position = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, XmlNode::Element(e) if e.name == name))
            .nth(n)
            .map(|(i, _)| i)?;
        match self.children.remove(position) {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        }
    }

    /// Keep only the child elements for which `keep` returns true
    pub fn retain_elements(&mut self, mut keep: impl FnMut(&XmlElement) -> bool) {
        self.children.retain(|c| match c {
            XmlNode::Element(e) => keep(e),
            XmlNode::Text(_) => true,
        });
    }

    /// First descendant (depth-first, self excluded) with the given name
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// First descendant with the given name, mutably
    pub fn find_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        for child in self.elements_mut() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_mut(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given name, in document order
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in self.elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// Apply `f` to every descendant with the given name
    pub fn for_each_named_mut(&mut self, name: &str, f: &mut dyn FnMut(&mut XmlElement)) {
        for child in self.elements_mut() {
            if child.name == name {
                f(child);
            }
            child.for_each_named_mut(name, f);
        }
    }

    /// Concatenated text content of direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![XmlNode::Text(text.into())];
    }

    /// Serialize this element (no declaration)
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    /// Serialize as a standalone part with the XML declaration
    pub fn to_document(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        out.push('\n');
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_into(out),
                XmlNode::Text(t) => out.push_str(&escape(t.as_str())),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// The prefix bound by a namespace declaration attribute (`""` for the
/// default namespace)
fn declared_prefix(key: &str) -> Option<&str> {
    match key.strip_prefix("xmlns")? {
        "" => Some(""),
        tail => tail.strip_prefix(':'),
    }
}

/// Apply the innermost prefix rename in scope to a qualified name.
/// Unprefixed attributes never take the default namespace.
fn rename(
    name: &str,
    scope: &[(String, String)],
    outer: &[PrefixScope],
    element: bool,
) -> String {
    let (prefix, local) = match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None if element => ("", name),
        None => return name.to_string(),
    };
    let canonical = scope
        .iter()
        .chain(outer.iter().rev().flatten())
        .find(|(written, _)| written == prefix)
        .map(|(_, canonical)| canonical.as_str());
    match canonical {
        Some("") => local.to_string(),
        Some(canonical) => format!("{}:{}", canonical, local),
        None => name.to_string(),
    }
}

/// Format a number the way chart caches and cells expect it
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <c:chart>
    <c:title><c:tx><c:rich><a:p><a:r><a:t>Hits &amp; misses</a:t></a:r></a:p></c:rich></c:tx></c:title>
    <c:plotArea>
      <c:lineChart><c:ser><c:idx val="0"/></c:ser></c:lineChart>
      <c:lineChart><c:ser><c:idx val="1"/></c:ser></c:lineChart>
      <c:valAx/>
    </c:plotArea>
    <c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>
  </c:chart>
</c:chartSpace>"#;

    #[test]
    fn test_parse_structure() {
        let root = XmlElement::parse(CHART).unwrap();
        assert_eq!(root.name, "c:chartSpace");
        assert_eq!(root.local_name(), "chartSpace");
        assert!(root.attr("xmlns:c").is_some());

        let plot = root.path(&["c:chart", "c:plotArea"]).unwrap();
        assert_eq!(plot.count_children("c:lineChart"), 2);
        assert_eq!(root.find_all("c:ser").len(), 2);
        assert_eq!(root.find("a:t").unwrap().text(), "Hits & misses");
    }

    #[test]
    fn test_whitespace_between_elements_dropped() {
        let root = XmlElement::parse(CHART).unwrap();
        let chart = root.child("c:chart").unwrap();
        assert!(chart.children.iter().all(|c| matches!(c, XmlNode::Element(_))));

        let spaced = XmlElement::parse(b"<a:t> </a:t>").unwrap();
        assert_eq!(spaced.text(), " ");
    }

    #[test]
    fn test_roundtrip() {
        let root = XmlElement::parse(CHART).unwrap();
        let xml = root.to_document();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("Hits &amp; misses"));
        assert!(xml.contains(r#"<c:idx val="1"/>"#));

        let reparsed = XmlElement::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed, root);
    }

    #[test]
    fn test_remove_nth_child() {
        let mut root = XmlElement::parse(CHART).unwrap();
        let plot = root.path_mut(&["c:chart", "c:plotArea"]).unwrap();
        let removed = plot.remove_nth_child("c:lineChart", 1).unwrap();
        assert_eq!(removed.find("c:idx").unwrap().attr("val"), Some("1"));
        assert_eq!(plot.count_children("c:lineChart"), 1);
        assert!(plot.remove_nth_child("c:dateAx", 0).is_none());
    }

    #[test]
    fn test_insert_before_first_of() {
        let mut legend = XmlElement::parse(CHART)
            .unwrap()
            .find("c:legend")
            .cloned()
            .unwrap();
        legend.insert_before_first_of(XmlElement::new("c:legendEntry"), &["c:layout", "c:overlay"]);
        let names: Vec<&str> = legend.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["c:legendPos", "c:legendEntry", "c:overlay"]);

        legend.insert_before_first_of(XmlElement::new("c:extLst"), &["c:nothing"]);
        assert_eq!(legend.elements().last().unwrap().name, "c:extLst");
    }

    #[test]
    fn test_ensure_child() {
        let mut ln = XmlElement::new("a:ln").with_child(XmlElement::new("a:prstDash"));
        ln.ensure_child("a:solidFill", &["a:prstDash"])
            .push(XmlElement::new("a:srgbClr").with_attr("val", "FF0000"));
        ln.ensure_child("a:solidFill", &["a:prstDash"]);

        assert_eq!(ln.count_children("a:solidFill"), 1);
        assert_eq!(ln.elements().next().unwrap().name, "a:solidFill");
        assert_eq!(ln.find("a:srgbClr").unwrap().attr("val"), Some("FF0000"));
    }

    #[test]
    fn test_attributes() {
        let mut el = XmlElement::new("c:pt").with_attr("idx", "0");
        el.set_attr("idx", "3");
        assert_eq!(el.attr("idx"), Some("3"));
        assert_eq!(el.remove_attr("idx"), Some("3".to_string()));
        assert!(el.attr("idx").is_none());
        assert_eq!(el.to_xml(), "<c:pt/>");
    }

    #[test]
    fn test_escaping_on_write() {
        let el = XmlElement::new("a:t")
            .with_attr("title", "\"quoted\" <tag>")
            .with_text("a < b & c");
        let xml = el.to_xml();
        assert!(xml.contains("&lt;tag&gt;"));
        assert!(xml.contains("a &lt; b &amp; c"));
        let reparsed = XmlElement::parse(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.text(), "a < b & c");
        assert_eq!(reparsed.attr("title"), Some("\"quoted\" <tag>"));
    }

    #[test]
    fn test_prefixes_canonicalized() {
        let xml = br#"<ch:chartSpace xmlns:ch="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <ch:chart><ch:plotArea><ch:doughnutChart/></ch:plotArea></ch:chart>
  <ch:externalData rel:id="rId1"/>
</ch:chartSpace>"#;
        let root = XmlElement::parse(xml).unwrap();
        assert_eq!(root.name, "c:chartSpace");
        assert!(root.attr("xmlns:c").is_some());
        assert!(root.attr("xmlns:ch").is_none());
        assert!(root.path(&["c:chart", "c:plotArea", "c:doughnutChart"]).is_some());
        assert_eq!(root.child("c:externalData").unwrap().attr("r:id"), Some("rId1"));

        let reparsed = XmlElement::parse(root.to_document().as_bytes()).unwrap();
        assert_eq!(reparsed, root);
    }

    #[test]
    fn test_default_namespace_canonicalized() {
        let xml = br#"<a:graphicData xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <chart xmlns="http://schemas.openxmlformats.org/drawingml/2006/chart" id="x"><plotArea/></chart>
  <other xmlns="urn:example"><inner/></other>
</a:graphicData>"#;
        let root = XmlElement::parse(xml).unwrap();
        let chart = root.child("c:chart").unwrap();
        assert_eq!(chart.attr("xmlns:c"), Some(CANONICAL_PREFIXES[0].0));
        assert_eq!(chart.attr("id"), Some("x"));
        assert!(chart.child("c:plotArea").is_some());

        let other = root.child("other").unwrap();
        assert!(other.child("inner").is_some());
    }

    #[test]
    fn test_nth_child() {
        let root = XmlElement::parse(CHART).unwrap();
        let plot = root.path(&["c:chart", "c:plotArea"]).unwrap();
        let second = plot.nth_child("c:lineChart", 1).unwrap();
        assert_eq!(second.find("c:idx").unwrap().attr("val"), Some("1"));
        assert!(plot.nth_child("c:lineChart", 2).is_none());

        let mut root = root;
        let plot = root.path_mut(&["c:chart", "c:plotArea"]).unwrap();
        plot.nth_child_mut("c:lineChart", 0)
            .unwrap()
            .set_attr("marker", "1");
        assert_eq!(plot.nth_child("c:lineChart", 0).unwrap().attr("marker"), Some("1"));
    }

    #[test]
    fn test_malformed() {
        assert!(XmlElement::parse(b"<a><b></a>").is_err());
        assert!(XmlElement::parse(b"").is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(169.0), "169");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-3.5), "-3.5");
    }
}
