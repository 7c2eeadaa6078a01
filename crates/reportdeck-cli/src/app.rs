//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use tracing::debug;

use reportdeck_model::{
    DateSeriesData, ListData, MapData, ReportData, SunburstData, TableData, TextData,
    TopicMapData,
};
use reportdeck_pptx::sample::sample_template;
use reportdeck_pptx::{Presentation, ReportService, ReportSettings, TemplateHandle};

/// Settings file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG: &str = "reportdeck.toml";

/// What the input JSON describes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum VisualizationKind {
    /// Several visualizations placed in regions
    #[default]
    Report,
    /// Date line chart
    Dategraph,
    /// Doughnut chart
    Sunburst,
    Table,
    /// Image with markers
    Map,
    /// Paginated document list
    List,
    Topicmap,
    Text,
}

#[derive(Parser)]
#[command(name = "reportdeck")]
#[command(author, version, about = "Data in, slides out", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a template deck can be used
    Validate {
        /// Template PPTX file
        template: PathBuf,
    },

    /// Render visualization JSON into a PPTX file
    Render {
        /// Template PPTX file
        #[arg(short, long)]
        template: PathBuf,

        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PPTX file
        #[arg(short, long)]
        output: PathBuf,

        /// Kind of visualization the input holds
        #[arg(short, long, value_enum, default_value = "report")]
        kind: VisualizationKind,

        /// Heading for tables and maps, results header for lists
        #[arg(long)]
        title: Option<String>,

        /// Put each report region on a slide of its own
        #[arg(long)]
        slide_per_region: bool,

        /// Settings file (defaults to ./reportdeck.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the built-in template
    SampleTemplate {
        /// Output PPTX file
        #[arg(short, long, default_value = "template.pptx")]
        output: PathBuf,
    },
}

/// Everything the render command needs
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub template: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub kind: VisualizationKind,
    pub title: Option<String>,
    pub slide_per_region: bool,
    pub config: Option<PathBuf>,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { template } => {
            validate_command(&template)?;
        }
        Commands::Render {
            template,
            input,
            output,
            kind,
            title,
            slide_per_region,
            config,
        } => {
            render_command(&RenderOptions {
                template,
                input,
                output,
                kind,
                title,
                slide_per_region,
                config,
            })?;
        }
        Commands::SampleTemplate { output } => {
            sample_template_command(&output)?;
        }
    }

    Ok(())
}

/// Execute the validate command
pub fn validate_command(template: &Path) -> Result<()> {
    let bytes = fs::read(template)
        .with_context(|| format!("Failed to read template: {}", template.display()))?;
    ReportService::validate_template(&bytes)
        .with_context(|| format!("Invalid template: {}", template.display()))?;

    println!("Template OK: {}", template.display());
    Ok(())
}

/// Execute the render command
pub fn render_command(options: &RenderOptions) -> Result<()> {
    let settings = load_settings(options.config.as_deref())?;
    let template = TemplateHandle::from_file(&options.template)
        .with_context(|| format!("Failed to load template: {}", options.template.display()))?;
    let service = ReportService::new(Arc::new(template), settings)
        .context("Invalid report settings")?;

    let json = fs::read_to_string(&options.input)
        .with_context(|| format!("Failed to read input: {}", options.input.display()))?;
    debug!(kind = ?options.kind, input = %options.input.display(), "rendering");

    let title = options.title.as_deref();
    let presentation = match options.kind {
        VisualizationKind::Report => service.report(
            &parse_input::<ReportData>(&json, &options.input)?,
            options.slide_per_region,
        ),
        VisualizationKind::Dategraph => {
            service.date_graph(&parse_input::<DateSeriesData>(&json, &options.input)?)
        }
        VisualizationKind::Sunburst => {
            service.sunburst(&parse_input::<SunburstData>(&json, &options.input)?)
        }
        VisualizationKind::Table => {
            service.table(&parse_input::<TableData>(&json, &options.input)?, title)
        }
        VisualizationKind::Map => {
            service.map(&parse_input::<MapData>(&json, &options.input)?, title)
        }
        VisualizationKind::List => {
            service.list(&parse_input::<ListData>(&json, &options.input)?, title, None)
        }
        VisualizationKind::Topicmap => {
            service.topic_map(&parse_input::<TopicMapData>(&json, &options.input)?)
        }
        VisualizationKind::Text => {
            service.text(&parse_input::<TextData>(&json, &options.input)?)
        }
    }
    .with_context(|| format!("Failed to render {}", options.input.display()))?;

    write_presentation(&presentation, &options.output)
}

/// Execute the sample-template command
pub fn sample_template_command(output: &Path) -> Result<()> {
    let bytes = sample_template().context("Failed to build the sample template")?;
    fs::write(output, bytes)
        .with_context(|| format!("Failed to write template: {}", output.display()))?;

    println!("Wrote sample template: {}", output.display());
    Ok(())
}

/// Settings from `config`, else from [`DEFAULT_CONFIG`] if it exists, else
/// the defaults
pub fn load_settings(config: Option<&Path>) -> Result<ReportSettings> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG);
            if !fallback.exists() {
                return Ok(ReportSettings::default());
            }
            fallback
        }
    };

    ReportSettings::from_file(&path)
        .with_context(|| format!("Failed to load settings: {}", path.display()))
}

fn parse_input<T: DeserializeOwned>(json: &str, input: &Path) -> Result<T> {
    serde_json::from_str(json).with_context(|| format!("Invalid input JSON: {}", input.display()))
}

fn write_presentation(presentation: &Presentation, output: &Path) -> Result<()> {
    presentation
        .write_to_file(output)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;

    println!(
        "Wrote {} slide(s) to {}",
        presentation.slide_count(),
        output.display()
    );
    Ok(())
}
