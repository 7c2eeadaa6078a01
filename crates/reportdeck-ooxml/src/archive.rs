//! Archive handling for OPC packages
//!
//! PPTX and XLSX files are ZIP archives of XML parts and binary resources.
//! The whole package is unpacked into memory so parts can be edited freely
//! and written back out in one go.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// Represents an unpacked OOXML package
#[derive(Debug, Clone, Default)]
pub struct OoxmlArchive {
    /// All parts in the archive, keyed by path without a leading slash
    files: HashMap<String, Vec<u8>>,
}

static NUMBERED_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn numbered_name() -> &'static Regex {
    NUMBERED_NAME_RE.get_or_init(|| Regex::new(r"^(.*?)(\d+)(\.\w+)?$").unwrap())
}

impl OoxmlArchive {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a package file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a part's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a part's contents, failing if it is absent
    pub fn require(&self, path: &str) -> Result<&[u8]> {
        self.get(path)
            .ok_or_else(|| OoxmlError::MissingFile(path.to_string()))
    }

    /// Get a part's contents as a string
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Check if a part exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all parts in the archive, sorted
    pub fn file_list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the package has no parts
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Set or update a part's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a part's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Remove a part from the archive
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Find an unused part name based on `name`.
    ///
    /// The trailing number before the extension is incremented until the
    /// name is free (`ppt/charts/chart1.xml` becomes `chart2.xml`, then
    /// `chart3.xml`). A name without a number gets one appended before the
    /// extension, starting at 1.
    pub fn next_part_name(&self, name: &str) -> String {
        let (prefix, start, ext) = match numbered_name().captures(name) {
            Some(caps) => {
                let prefix = caps.get(1).map_or("", |m| m.as_str()).to_string();
                let number = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse::<u64>().ok())
                    .unwrap_or(0);
                let ext = caps.get(3).map_or("", |m| m.as_str()).to_string();
                if !self.contains(name) {
                    return name.to_string();
                }
                (prefix, number + 1, ext)
            }
            None => {
                if !self.contains(name) {
                    return name.to_string();
                }
                let file_start = name.rfind('/').map_or(0, |i| i + 1);
                match name[file_start..].rfind('.') {
                    Some(dot) => (
                        name[..file_start + dot].to_string(),
                        1,
                        name[file_start + dot..].to_string(),
                    ),
                    None => (name.to_string(), 1, String::new()),
                }
            }
        };

        let mut number = start;
        loop {
            let candidate = format!("{}{}{}", prefix, number, ext);
            if !self.contains(&candidate) {
                return candidate;
            }
            number += 1;
        }
    }

    /// Write the archive to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Serialize the archive into a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the archive to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        // [Content_Types].xml first, the rest sorted for deterministic output
        let mut paths: Vec<&String> = self.files.keys().collect();
        paths.sort_by_key(|p| (p.as_str() != "[Content_Types].xml", p.as_str()));

        for path in paths {
            let contents = &self.files[path];
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}
