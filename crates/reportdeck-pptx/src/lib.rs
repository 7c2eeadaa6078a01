//! # reportdeck-pptx
//!
//! Template-driven PowerPoint report composition.
//!
//! A template deck supplies the chart boilerplate that is impractical to
//! build from scratch: a doughnut chart on slide 1 and a two-axis date line
//! chart on slide 2. Charts are cloned from it and rebound with new data and
//! a fresh embedded workbook, while tables, document lists, maps, topic maps
//! and free text are drawn directly as shapes.
//!
//! ## Features
//!
//! - **Chart binding**: sunburst (doughnut) and date series (line, optional secondary axis)
//! - **Layout**: tables with cropping, paginated document lists, image maps
//!   with markers, topic maps with shrink-to-fit labels, free text
//! - **Reports**: several visualizations arranged on one slide or one slide each
//! - **Images**: data URIs out of the box, whitelisted http/https behind the
//!   `remote-images` feature
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reportdeck_model::SunburstData;
//! use reportdeck_pptx::{ReportService, ReportSettings, TemplateHandle};
//!
//! let template = Arc::new(TemplateHandle::from_file("template.pptx")?);
//! let service = ReportService::new(template, ReportSettings::default())?;
//!
//! let data = SunburstData::new(
//!     vec!["Red".into(), "Green".into(), "Blue".into()],
//!     vec![1.0, 169.0, 130.0],
//! );
//! service.sunburst(&data)?.write_to_file("sunburst.pptx")?;
//! ```

pub mod chart;
pub mod color;
pub mod composer;
pub mod error;
pub mod geometry;
pub mod image_source;
pub mod layout;
pub mod presentation;
pub mod sample;
pub mod settings;
pub mod shape;
pub mod slide;
pub mod template;
pub mod text;

// Re-exports
pub use chart::{bind_date_series, bind_sunburst, BoundChart};
pub use composer::ReportService;
pub use error::{ReportError, Result};
pub use geometry::Rect;
pub use image_source::{DataUriImageSource, ImageData, ImageFormat, ImageSource};
#[cfg(feature = "remote-images")]
pub use image_source::WebAndDataUriImageSource;
pub use presentation::Presentation;
pub use settings::{ImageSettings, ReportSettings};
pub use slide::{Slide, SlideId};
pub use template::{ChartFragment, TemplateHandle};

/// PPTX-related constants
pub mod constants {
    /// Widescreen 16:9 slide width in EMU (13.333" width)
    pub const WIDESCREEN_SLIDE_WIDTH_EMU: i64 = 12_192_000;

    /// Widescreen 16:9 slide height in EMU (7.5" height)
    pub const WIDESCREEN_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// EMU per point
    pub const EMU_PER_POINT: i64 = 12_700;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// DrawingML chart namespace
    pub const NS_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

    /// Relationships namespace
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Slide master relationship type
    pub const REL_TYPE_SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// Theme relationship type
    pub const REL_TYPE_THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

    /// Notes slide relationship type
    pub const REL_TYPE_NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

    /// Attempts made when shrinking topic labels to fit
    pub const FONT_FIT_ATTEMPTS: u32 = 7;

    /// Smallest topic label font scale, in percent
    pub const FONT_SCALE_MIN: f64 = 1.0;

    /// Largest topic label font scale, in percent
    pub const FONT_SCALE_MAX: f64 = 100.0;
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_constants() {
        assert_eq!(
            constants::WIDESCREEN_SLIDE_WIDTH_EMU / constants::EMU_PER_POINT,
            960
        );
        assert_eq!(
            constants::WIDESCREEN_SLIDE_HEIGHT_EMU / constants::EMU_PER_POINT,
            540
        );
    }

    #[test]
    fn test_font_fit_bounds() {
        assert!(constants::FONT_SCALE_MIN < constants::FONT_SCALE_MAX);
        assert!(constants::FONT_FIT_ATTEMPTS > 0);
    }
}
