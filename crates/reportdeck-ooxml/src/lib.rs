//! # reportdeck-ooxml
//!
//! The Office Open XML packaging layer used by reportdeck.
//!
//! This crate provides functionality to:
//! - Unpack and repack OPC (zip) packages, keeping every part in memory
//! - Parse and rewrite `_rels/*.rels` relationship parts and `[Content_Types].xml`
//! - Edit part XML through a small owned element tree
//! - Write the single-sheet companion workbooks embedded in charts
//!
//! ## Example: Rewriting a Part
//!
//! ```no_run
//! use reportdeck_ooxml::{OoxmlArchive, XmlElement};
//!
//! let mut archive = OoxmlArchive::open("deck.pptx")?;
//! let mut root = XmlElement::parse(archive.require("ppt/presentation.xml")?)?;
//! if let Some(size) = root.child_mut("p:sldSz") {
//!     size.set_attr("cx", "12192000");
//! }
//! archive.set_string("ppt/presentation.xml", root.to_document());
//! archive.write_to_file("deck-wide.pptx")?;
//! # Ok::<(), reportdeck_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod content_types;
pub mod error;
pub mod relationships;
pub mod workbook;
pub mod xml;

pub use archive::OoxmlArchive;
pub use content_types::ContentTypes;
pub use error::{OoxmlError, Result};
pub use relationships::Relationships;
pub use workbook::Workbook;
pub use xml::{XmlElement, XmlNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
