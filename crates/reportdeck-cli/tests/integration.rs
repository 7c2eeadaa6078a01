//! Integration tests for the reportdeck CLI
//!
//! These drive the command functions against files in a temporary
//! directory: sample template -> validate -> render -> read back.

use std::fs;
use std::path::{Path, PathBuf};

use reportdeck_cli::{
    load_settings, render_command, sample_template_command, validate_command, RenderOptions,
    VisualizationKind,
};
use reportdeck_model::Anchor;
use reportdeck_ooxml::OoxmlArchive;
use tempfile::TempDir;

fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("template.pptx");
    sample_template_command(&path).expect("Failed to write sample template");
    path
}

fn options(dir: &Path, kind: VisualizationKind, json: &str) -> RenderOptions {
    let input = dir.join("input.json");
    fs::write(&input, json).expect("Failed to write input");
    RenderOptions {
        template: write_template(dir),
        input,
        output: dir.join("out.pptx"),
        kind,
        title: None,
        slide_per_region: false,
        config: None,
    }
}

fn slide_xml(path: &Path) -> Vec<String> {
    let archive = OoxmlArchive::open(path).expect("Failed to open output");
    archive
        .file_list()
        .into_iter()
        .filter(|p| p.starts_with("ppt/slides/slide") && p.ends_with(".xml"))
        .filter_map(|p| archive.get_string(p))
        .collect()
}

#[test]
fn test_sample_template_validates() {
    let temp_dir = TempDir::new().unwrap();
    let template = write_template(temp_dir.path());
    validate_command(&template).expect("Sample template should be valid");
}

#[test]
fn test_validate_rejects_non_presentation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.pptx");
    fs::write(&path, b"plain text").unwrap();

    let err = validate_command(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid template"));
    assert!(err.chain().count() > 1);
}

#[test]
fn test_render_table_with_title() {
    let temp_dir = TempDir::new().unwrap();
    let mut opts = options(
        temp_dir.path(),
        VisualizationKind::Table,
        r#"{"rows": 2, "cols": 2, "cells": ["cats", "12", "dogs", "7"]}"#,
    );
    opts.title = Some("Pets".to_string());
    render_command(&opts).expect("Failed to render table");

    let slides = slide_xml(&opts.output);
    assert_eq!(slides.len(), 1);
    assert!(slides[0].contains("<a:t>Pets</a:t>"));
    assert!(slides[0].contains("<a:t>dogs</a:t>"));
}

#[test]
fn test_render_report_slide_per_region() {
    let temp_dir = TempDir::new().unwrap();
    let mut opts = options(
        temp_dir.path(),
        VisualizationKind::Report,
        r##"{"children": [
            {"type": "text", "data": {"paragraphs": [{"text": "First"}]}},
            {"type": "text", "data": {"text": [{"text": "Second", "bold": true}]}}
        ]}"##,
    );
    opts.slide_per_region = true;
    render_command(&opts).expect("Failed to render report");

    assert_eq!(slide_xml(&opts.output).len(), 2);
}

#[test]
fn test_render_rejects_bad_json() {
    let temp_dir = TempDir::new().unwrap();
    let opts = options(temp_dir.path(), VisualizationKind::Sunburst, "{not json");
    let err = render_command(&opts).unwrap_err();
    assert!(err.to_string().contains("Invalid input JSON"));
    assert!(!opts.output.exists());
}

#[test]
fn test_render_rejects_inconsistent_chart() {
    let temp_dir = TempDir::new().unwrap();
    let opts = options(
        temp_dir.path(),
        VisualizationKind::Sunburst,
        r#"{"categories": ["a", "b"], "values": [1]}"#,
    );
    let err = render_command(&opts).unwrap_err();
    assert!(err.to_string().contains("Failed to render"));
    assert!(!opts.output.exists());
}

#[test]
fn test_settings_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("custom.toml");
    fs::write(
        &config,
        "[anchor]\nx = 0.1\ny = 0.1\nwidth = 0.8\nheight = 0.8\n",
    )
    .unwrap();

    let settings = load_settings(Some(&config)).unwrap();
    assert_eq!(settings.anchor, Anchor::new(0.1, 0.1, 0.8, 0.8));
    assert!(!settings.images.allow_remote);

    let missing = temp_dir.path().join("missing.toml");
    let err = load_settings(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("Failed to load settings"));
}
