//! Report settings, loaded from TOML.
//!
//! ```toml
//! [anchor]
//! x = 0.05
//! y = 0.1
//! width = 0.9
//! height = 0.85
//!
//! [images]
//! allow_remote = true
//! allowed_extensions = [".png", ".jpg"]
//! ```

use std::path::Path;
use std::sync::Arc;

use reportdeck_model::Anchor;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::image_source::{DataUriImageSource, ImageSource, DEFAULT_ALLOWED_EXTENSIONS};

/// Settings shared by every report rendered from one template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Drawable area of each slide, as a fraction of the slide size
    #[serde(default)]
    pub anchor: Anchor,

    /// Image resolution
    #[serde(default)]
    pub images: ImageSettings,
}

/// How image references are resolved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Fetch http/https pictures
    #[serde(default)]
    pub allow_remote: bool,

    /// Path extensions that may be fetched, e.g. `.png`
    #[serde(default)]
    pub allowed_extensions: Option<Vec<String>>,
}

impl ImageSettings {
    /// The configured extensions, or the built-in picture list
    pub fn extensions(&self) -> Vec<String> {
        match &self.allowed_extensions {
            Some(list) => list.clone(),
            None => DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl ReportSettings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        let settings: ReportSettings = toml::from_str(toml_content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Check the anchor lies within the slide
    pub fn validate(&self) -> Result<()> {
        let a = &self.anchor;
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(a.x) && in_unit(a.y) && a.width > 0.0 && a.height > 0.0)
            || a.x + a.width > 1.0 + f64::EPSILON
            || a.y + a.height > 1.0 + f64::EPSILON
        {
            return Err(ReportError::invalid_input(format!(
                "anchor ({}, {}, {}, {}) does not fit on the slide",
                a.x, a.y, a.width, a.height
            )));
        }
        Ok(())
    }

    /// The image source these settings ask for
    pub fn image_source(&self) -> Result<Arc<dyn ImageSource>> {
        if self.images.allow_remote {
            remote_source(self.images.extensions())
        } else {
            Ok(Arc::new(DataUriImageSource))
        }
    }
}

#[cfg(feature = "remote-images")]
fn remote_source(extensions: Vec<String>) -> Result<Arc<dyn ImageSource>> {
    Ok(Arc::new(crate::image_source::WebAndDataUriImageSource::new(
        extensions,
    )?))
}

#[cfg(not(feature = "remote-images"))]
fn remote_source(_extensions: Vec<String>) -> Result<Arc<dyn ImageSource>> {
    Err(ReportError::invalid_input(
        "remote images requested but reportdeck was built without the remote-images feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ReportSettings::from_toml_str("").unwrap();
        assert_eq!(settings.anchor, Anchor::full());
        assert!(!settings.images.allow_remote);
        assert_eq!(settings.images.extensions().len(), 4);
    }

    #[test]
    fn test_parse() {
        let settings = ReportSettings::from_toml_str(
            r#"
            [anchor]
            x = 0.05
            y = 0.1
            width = 0.9
            height = 0.85

            [images]
            allow_remote = true
            allowed_extensions = [".png"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.anchor, Anchor::new(0.05, 0.1, 0.9, 0.85));
        assert_eq!(settings.images.extensions(), vec![".png".to_string()]);
    }

    #[test]
    fn test_partial_anchor_uses_defaults() {
        let settings = ReportSettings::from_toml_str("[anchor]\nheight = 0.5\n").unwrap();
        assert_eq!(settings.anchor, Anchor::new(0.0, 0.0, 1.0, 0.5));
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = ReportSettings::from_toml_str("[anchor]\nx = 0.5\n").unwrap_err();
        assert_eq!(err.code(), "RPT002");

        let err = ReportSettings::from_toml_str("[anchor\n").unwrap_err();
        assert_eq!(err.code(), "RPT006");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reportdeck.toml");
        std::fs::write(&path, "[images]\nallow_remote = false\n").unwrap();
        let settings = ReportSettings::from_file(&path).unwrap();
        assert!(settings.image_source().is_ok());

        let missing = ReportSettings::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert_eq!(missing.code(), "RPT005");
    }
}
