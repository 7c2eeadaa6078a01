//! Free text: one paragraph of individually formatted runs

use std::sync::OnceLock;

use regex::Regex;
use reportdeck_model::TextData;

use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::Rect;
use crate::shape::{AutoShape, ShapeKind};
use crate::slide::Slide;
use crate::text::{measure_text_height, Autofit, Paragraph, TextBody, TextRun};

const ELLIPSIS: &str = "\u{2026}";

static TRAILING_ELLIPSIS_RE: OnceLock<Regex> = OnceLock::new();

fn trailing_ellipsis() -> &'static Regex {
    TRAILING_ELLIPSIS_RE.get_or_init(|| Regex::new(r"(\s*(\.{3}|\x{2026}))?$").unwrap())
}

/// Draw the runs of `data` as a single paragraph in a text box covering
/// `region`.
///
/// Runs are added one at a time. The first run that makes the text
/// overflow is cut back word by word until it fits (or has no words left
/// to drop) and closed with an ellipsis; the runs after it are dropped and
/// the box is told to shrink its text on overflow. Returns the text box id.
pub fn draw_text(slide: &mut Slide, region: Rect, data: &TextData) -> Result<u32> {
    let runs = data
        .paragraphs
        .iter()
        .map(|p| {
            let mut run = TextRun::sized(p.text.as_str(), p.font_size, Rgba::parse(&p.color)?);
            run.bold = p.bold;
            run.italic = p.italic;
            Ok(run)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut body = TextBody::from_paragraph(Paragraph::new());
    for run in runs {
        body.paragraphs[0].push_run(run);
        if measure_text_height(&body, region.width) > region.height {
            trim_last_run(&mut body, region);
            body.autofit = Autofit::Normal { font_scale: None };
            break;
        }
    }

    Ok(slide.add(ShapeKind::Auto(AutoShape::text_box(region, body))))
}

/// Drop words from the end of the body's last run while it overflows
fn trim_last_run(body: &mut TextBody, region: Rect) {
    let Some(run) = body.paragraphs[0].last_run_mut() else {
        return;
    };
    run.text = run.text.trim().to_string();
    let mut text = run.text.clone();

    while !text.is_empty() && measure_text_height(body, region.width) > region.height {
        let Some(last_space) = text.rfind([' ', '\n']) else {
            break;
        };
        text.truncate(last_space);
        if let Some(run) = body.paragraphs[0].last_run_mut() {
            run.text = ellipsize(&text);
        }
    }
}

/// End `text` in a single "…", folding a trailing "..." into it
fn ellipsize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    trailing_ellipsis().replace(text, ELLIPSIS).into_owned()
}
