//! Error types for report composition.

use reportdeck_model::ModelError;
use reportdeck_ooxml::OoxmlError;
use thiserror::Error;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Boxed underlying cause of a template failure
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while loading templates and composing reports
#[derive(Error, Debug)]
pub enum ReportError {
    /// Template missing, malformed, or not shaped as expected
    #[error("Template load failed: {reason}")]
    TemplateLoad {
        reason: String,
        #[source]
        source: Option<BoxedCause>,
    },

    /// Visualization data breaks one of its invariants
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// An image reference could not be resolved or is not allowed
    #[error("Image '{reference}' cannot be fetched: {reason}")]
    ImageFetch { reference: String, reason: String },

    /// Error in the underlying package layer
    #[error("Package error: {0}")]
    Package(#[from] OoxmlError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),
}

impl ReportError {
    /// Create a template load error without an underlying cause
    pub fn template_load(reason: impl Into<String>) -> Self {
        Self::TemplateLoad {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a template load error wrapping its cause
    pub fn template_load_caused(
        reason: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TemplateLoad {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an image fetch error
    pub fn image_fetch(reference: impl AsRef<str>, reason: impl Into<String>) -> Self {
        Self::ImageFetch {
            reference: abbreviate(reference.as_ref()),
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::TemplateLoad { .. } => "RPT001",
            Self::InvalidInput { .. } => "RPT002",
            Self::ImageFetch { .. } => "RPT003",
            Self::Package(_) => "RPT004",
            Self::Io(_) => "RPT005",
            Self::Settings(_) => "RPT006",
        }
    }
}

impl From<ModelError> for ReportError {
    fn from(err: ModelError) -> Self {
        Self::invalid_input(err.reason())
    }
}

/// Data URIs can run to megabytes; keep messages readable
fn abbreviate(reference: &str) -> String {
    const MAX: usize = 64;
    if reference.chars().count() <= MAX {
        reference.to_string()
    } else {
        let head: String = reference.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
