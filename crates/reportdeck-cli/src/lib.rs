//! reportdeck CLI - Command-line interface library
//!
//! This library provides the CLI functionality for reportdeck:
//! - Validate: check that a template deck can be used
//! - Render: turn visualization JSON into a `.pptx`
//! - Sample template: write the built-in template
//!
//! # Library Usage
//!
//! ```ignore
//! use reportdeck_cli::{render_command, RenderOptions, VisualizationKind};
//!
//! render_command(&RenderOptions {
//!     template: "template.pptx".into(),
//!     input: "sunburst.json".into(),
//!     output: "sunburst.pptx".into(),
//!     kind: VisualizationKind::Sunburst,
//!     title: None,
//!     slide_per_region: false,
//!     config: None,
//! })?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Write the built-in template
//! reportdeck sample-template --output template.pptx
//!
//! # Check a template
//! reportdeck validate template.pptx
//!
//! # Render a report
//! reportdeck render --template template.pptx --input report.json --output report.pptx
//! ```

pub mod app;

pub use app::{load_settings, render_command, sample_template_command, validate_command};
pub use app::{run_cli, RenderOptions, VisualizationKind, DEFAULT_CONFIG};
