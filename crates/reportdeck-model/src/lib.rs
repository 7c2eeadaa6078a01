//! reportdeck-model - Visualization and report data types
//!
//! Plain value objects describing what to draw. Each type deserializes from
//! the camelCase JSON produced by report front-ends and knows how to check
//! its own invariants via `validate()`. Nothing here touches the document
//! format.
//!
//! ## Example
//!
//! ```
//! use reportdeck_model::SunburstData;
//!
//! let data = SunburstData::new(
//!     vec!["Red".into(), "Green".into(), "Blue".into()],
//!     vec![1.0, 169.0, 130.0],
//! );
//! assert!(data.validate().is_ok());
//! ```

pub mod anchor;
pub mod chart;
pub mod error;
pub mod list;
pub mod map;
pub mod report;
pub mod table;
pub mod text;
pub mod topic_map;

pub use anchor::Anchor;
pub use chart::{DateSeriesData, DateSeriesRow, SunburstData};
pub use error::{ModelError, Result};
pub use list::{ListData, ListDocument};
pub use map::{MapData, Marker, Polygon};
pub use report::{ReportChild, ReportData, Visualization};
pub use table::TableData;
pub use text::{TextData, TextParagraph};
pub use topic_map::{TopicMapData, TopicPath};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
