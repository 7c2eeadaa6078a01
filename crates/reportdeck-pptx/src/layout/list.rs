//! Document lists, paginated across slides when they do not fit

use std::sync::OnceLock;

use regex::Regex;
use reportdeck_model::{ListData, ListDocument};
use tracing::{debug, warn};

use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::Rect;
use crate::image_source::ImageSource;
use crate::presentation::{PictureRef, Presentation};
use crate::shape::{AutoShape, Line, ShapeKind};
use crate::slide::{Slide, SlideId};
use crate::text::{measure_text_height, Align, Paragraph, TextBody, TextRun};

/// Space kept free left and right of the list
const X_MARGIN: f64 = 20.0;
/// Space kept free above the list
const Y_MARGIN: f64 = 5.0;
const ICON_WIDTH: f64 = 20.0;
const ICON_HEIGHT: f64 = 24.0;
const ICON_LINE_WIDTH: f64 = 2.0;
const ICON_COLOR: Rgba = Rgba::rgb(0x88, 0x88, 0x88);
/// Thumbnails are 97x55 pixels in the search UI, drawn at 80%
const THUMBNAIL_WIDTH: f64 = 97.0 * 0.8;
const THUMBNAIL_HEIGHT: f64 = 55.0 * 0.8;
const THUMBNAIL_MARGIN: f64 = 4.0;
/// Vertical gap between documents
const ITEM_MARGIN: f64 = 5.0;
const DATE_INDENT: f64 = 5.0;
const HEADER_FONT_SIZE: f64 = 12.0;
const HEADER_HEIGHT: f64 = 20.0;

static HIGHLIGHT_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn highlight() -> &'static Regex {
    HIGHLIGHT_RE.get_or_init(|| {
        Regex::new(
            r"<HavenSearch-QueryText-Placeholder>(.*?)</HavenSearch-QueryText-Placeholder>",
        )
        .unwrap()
    })
}

fn whitespace() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Text drawn in the top corners of every list page, typically the result
/// count on the left and the sort order on the right
#[derive(Debug, Clone, Copy, Default)]
pub struct ListHeaders<'a> {
    pub left: Option<&'a str>,
    pub right: Option<&'a str>,
}

impl<'a> ListHeaders<'a> {
    pub fn new(left: Option<&'a str>, right: Option<&'a str>) -> Self {
        Self { left, right }
    }

    fn left_text(&self) -> Option<&'a str> {
        self.left.filter(|s| !s.trim().is_empty())
    }

    fn right_text(&self) -> Option<&'a str> {
        self.right.filter(|s| !s.trim().is_empty())
    }
}

/// Shapes drawn for one document, kept so they can be taken back
struct DrawnDocument {
    text_box: u32,
    icon: Option<u32>,
    picture: Option<u32>,
    height: f64,
}

/// Stack the documents of `data` top to bottom inside `region`.
///
/// Drawing starts on `slide` when given, otherwise on a new slide. When a
/// document overflows the bottom of the region and is not alone on its
/// page, its shapes are taken back and it is drawn again on a fresh slide;
/// its picture is only moved out of sight, since the picture part may be
/// shared with other thumbnails. Without `paginate` drawing stops at the
/// first overflow. Headers are drawn on every slide this function creates.
///
/// Thumbnails that cannot be resolved are skipped. Returns the slides
/// drawn on, in order.
pub fn draw_list(
    presentation: &mut Presentation,
    slide: Option<SlideId>,
    region: Rect,
    paginate: bool,
    data: &ListData,
    headers: ListHeaders<'_>,
    images: &dyn ImageSource,
) -> Result<Vec<SlideId>> {
    let left = region.x + X_MARGIN;
    let mut y = region.y + Y_MARGIN;
    let mut current = slide;
    let mut pages: Vec<SlideId> = slide.into_iter().collect();
    let mut docs_on_page = 0;

    let mut index = 0;
    while index < data.docs.len() {
        let doc = &data.docs[index];

        let slide_id = match current {
            Some(id) => id,
            None => {
                let id = presentation.add_slide();
                pages.push(id);
                y = region.y + Y_MARGIN;
                docs_on_page = 0;

                let step = draw_headers(presentation.require_slide_mut(id)?, region, y, headers);
                if step > 0.0 {
                    y += ITEM_MARGIN + step;
                }
                current = Some(id);
                id
            }
        };

        let picture = thumbnail(presentation, doc, images);
        let slide = presentation.require_slide_mut(slide_id)?;
        let drawn = draw_document(slide, region, left, y, data, doc, picture.as_ref());

        y += drawn.height;
        docs_on_page += 1;

        if y > region.max_y() {
            if docs_on_page > 1 {
                slide.remove_shape(drawn.text_box);
                if let Some(icon) = drawn.icon {
                    slide.remove_shape(icon);
                }
                if let Some(picture) = drawn.picture {
                    slide.hide_shape(picture);
                }
                debug!(document = index, "document moved to the next page");
            } else {
                index += 1;
            }
            current = None;
            if !paginate {
                break;
            }
        } else {
            y += ITEM_MARGIN;
            index += 1;
        }
    }

    debug!(documents = data.docs.len(), pages = pages.len(), "list drawn");
    Ok(pages)
}

/// Store a document's thumbnail, if it has a usable one
fn thumbnail(
    presentation: &mut Presentation,
    doc: &ListDocument,
    images: &dyn ImageSource,
) -> Option<PictureRef> {
    let reference = doc.thumbnail.as_deref().filter(|t| !t.trim().is_empty())?;
    match images
        .resolve(reference)
        .and_then(|image| presentation.add_picture(&image))
    {
        Ok(picture) => Some(picture),
        Err(e) => {
            warn!(title = %doc.title, error = %e, "thumbnail skipped");
            None
        }
    }
}

/// Draw the headers at `y`; returns the height they take
fn draw_headers(slide: &mut Slide, region: Rect, y: f64, headers: ListHeaders<'_>) -> f64 {
    let left = region.x + X_MARGIN;
    let anchor = Rect::new(
        left,
        y,
        (region.max_x() - left - X_MARGIN).max(0.0),
        HEADER_HEIGHT,
    );

    let mut step: f64 = 0.0;
    let sides = [
        (headers.left_text(), Align::Left),
        (headers.right_text(), Align::Right),
    ];
    for (text, align) in sides {
        let Some(text) = text else {
            continue;
        };
        let body = TextBody::from_paragraph(
            Paragraph::from_run(TextRun::sized(text, HEADER_FONT_SIZE, Rgba::LIGHT_GRAY))
                .aligned(align),
        );
        step = step.max(measure_text_height(&body, anchor.width));
        slide.add(ShapeKind::Auto(AutoShape::text_box(anchor, body)));
    }
    step
}

/// Draw one document with its top edge at `y`
fn draw_document(
    slide: &mut Slide,
    region: Rect,
    left: f64,
    y: f64,
    data: &ListData,
    doc: &ListDocument,
    picture: Option<&PictureRef>,
) -> DrawnDocument {
    let mut x = left;

    let icon = if data.draw_icons {
        let icon = AutoShape::preset(
            Rect::new(x, y + ITEM_MARGIN, ICON_WIDTH, ICON_HEIGHT),
            "snip1Rect",
        )
        .with_line(Line::new(ICON_LINE_WIDTH, ICON_COLOR));
        x += ICON_WIDTH;
        Some(slide.add(ShapeKind::Auto(icon)))
    } else {
        None
    };

    let anchor = Rect::new(
        x,
        y,
        (region.max_x() - x - X_MARGIN).max(0.0),
        (region.max_y() - y).max(0.0),
    );

    let mut body = TextBody::from_paragraph(Paragraph::from_run(
        TextRun::sized(doc.title.as_str(), data.title_font_size, Rgba::BLACK).bold(),
    ));
    if let Some(date) = non_blank(doc.date.as_deref()) {
        let paragraph = body.add_paragraph();
        paragraph.left_margin = DATE_INDENT;
        paragraph.push_run(TextRun::sized(date, data.date_font_size, Rgba::GRAY).italic());
    }
    if let Some(reference) = non_blank(doc.reference.as_deref()) {
        body.add_paragraph()
            .push_run(TextRun::sized(reference, data.ref_font_size, Rgba::GRAY));
    }
    let thumbnail_offset = measure_text_height(&body, anchor.width);

    let mut content = Paragraph::new();
    let picture_anchor = picture.map(|_| {
        Rect::new(
            x,
            y + thumbnail_offset + THUMBNAIL_MARGIN,
            THUMBNAIL_WIDTH,
            THUMBNAIL_HEIGHT,
        )
    });
    if picture.is_some() {
        // summary beside the thumbnail when there is room, below it otherwise
        if anchor.width > 2.5 * THUMBNAIL_WIDTH {
            content.left_margin = THUMBNAIL_WIDTH;
        } else {
            content.push_break(THUMBNAIL_HEIGHT);
        }
    }
    if let Some(summary) = non_blank(doc.summary.as_deref()) {
        push_summary(&mut content, summary, data.summary_font_size);
    }
    if !content.spans.is_empty() || content.left_margin > 0.0 {
        body.paragraphs.push(content);
    }

    let mut height = measure_text_height(&body, anchor.width).max(ICON_HEIGHT);
    if let Some(picture_anchor) = picture_anchor {
        height = height.max(picture_anchor.max_y() - y);
    }

    let text_box = slide.add(ShapeKind::Auto(AutoShape::text_box(anchor, body)));
    let picture = picture
        .zip(picture_anchor)
        .map(|(picture, anchor)| slide.add_picture(picture, anchor));

    DrawnDocument {
        text_box,
        icon,
        picture,
        height,
    }
}

/// Append the summary with whitespace collapsed and highlighted query
/// terms in bold
fn push_summary(paragraph: &mut Paragraph, summary: &str, font_size: f64) {
    let summary = whitespace().replace_all(summary, " ");
    let mut last = 0;
    for captures in highlight().captures_iter(&summary) {
        let (Some(whole), Some(term)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if last < whole.start() {
            paragraph.push_run(TextRun::sized(
                &summary[last..whole.start()],
                font_size,
                Rgba::DARK_GRAY,
            ));
        }
        paragraph.push_run(TextRun::sized(term.as_str(), font_size, Rgba::DARK_GRAY).bold());
        last = whole.end();
    }
    if last < summary.len() {
        paragraph.push_run(TextRun::sized(&summary[last..], font_size, Rgba::DARK_GRAY));
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
