//! Text bodies: paragraphs of formatted runs, their `p:txBody` markup, and
//! an approximate height measurement used for layout.
//!
//! Measurement does not load fonts. Glyph advance is estimated from the
//! character's display width (East Asian wide characters count double) and
//! the font size, lines are wrapped greedily at spaces, and each line is
//! 1.2 times its largest font size tall. That is close enough to decide
//! pagination and title space; PowerPoint refits the text on edit anyway.

use quick_xml::escape::escape;
use unicode_width::UnicodeWidthChar;

use crate::color::Rgba;
use crate::geometry::to_emu;

/// Default left/right inset of a text body in points
pub const DEFAULT_HORIZONTAL_INSET: f64 = 7.2;
/// Default top/bottom inset of a text body in points
pub const DEFAULT_VERTICAL_INSET: f64 = 3.6;
/// Font size used when a run does not set one
pub const DEFAULT_FONT_SIZE: f64 = 18.0;

/// Average glyph advance as a fraction of the font size
const AVERAGE_ADVANCE: f64 = 0.5;
/// Extra advance for bold glyphs
const BOLD_FACTOR: f64 = 1.05;
/// Line height as a multiple of the font size
const LINE_SPACING: f64 = 1.2;

/// Horizontal paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn attr(self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }
}

/// Vertical anchoring of text inside its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// How PowerPoint should fit text that overflows its shape
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Autofit {
    #[default]
    None,
    /// Shrink text; `font_scale` is in 1000ths of a percent
    Normal { font_scale: Option<u32> },
    /// Grow the shape to fit the text
    Shape,
}

/// A run of uniformly formatted text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font_size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgba>,
    pub font_family: Option<String>,
}

impl TextRun {
    /// A run with default formatting
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: None,
            bold: false,
            italic: false,
            color: None,
            font_family: None,
        }
    }

    /// A run with size and colour, the common case in layouts
    pub fn sized(text: impl Into<String>, font_size: f64, color: Rgba) -> Self {
        Self {
            font_size: Some(font_size),
            color: Some(color),
            ..Self::new(text)
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    fn size(&self) -> f64 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }
}

/// A paragraph element
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Run(TextRun),
    /// Explicit line break; its size sets the height of the line it ends
    Break { font_size: f64 },
}

/// A paragraph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub spans: Vec<Span>,
    pub align: Option<Align>,
    /// Left indent in points
    pub left_margin: f64,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph holding a single run
    pub fn from_run(run: TextRun) -> Self {
        Self {
            spans: vec![Span::Run(run)],
            ..Self::default()
        }
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn push_run(&mut self, run: TextRun) {
        self.spans.push(Span::Run(run));
    }

    pub fn push_break(&mut self, font_size: f64) {
        self.spans.push(Span::Break { font_size });
    }

    /// Mutable access to the last run, if the paragraph ends with one
    pub fn last_run_mut(&mut self) -> Option<&mut TextRun> {
        match self.spans.last_mut() {
            Some(Span::Run(run)) => Some(run),
            _ => None,
        }
    }

    fn first_font_size(&self) -> f64 {
        self.spans
            .iter()
            .find_map(|s| match s {
                Span::Run(r) => Some(r.size()),
                Span::Break { font_size } => Some(*font_size),
            })
            .unwrap_or(DEFAULT_FONT_SIZE)
    }
}

/// The text content of a shape
#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    pub paragraphs: Vec<Paragraph>,
    /// Left, top, right, bottom insets in points
    pub insets: (f64, f64, f64, f64),
    pub wrap: bool,
    pub anchor: VerticalAnchor,
    /// Centre the text block horizontally within the shape
    pub anchor_center: bool,
    pub autofit: Autofit,
}

impl Default for TextBody {
    fn default() -> Self {
        Self {
            paragraphs: Vec::new(),
            insets: (
                DEFAULT_HORIZONTAL_INSET,
                DEFAULT_VERTICAL_INSET,
                DEFAULT_HORIZONTAL_INSET,
                DEFAULT_VERTICAL_INSET,
            ),
            wrap: true,
            anchor: VerticalAnchor::Top,
            anchor_center: false,
            autofit: Autofit::None,
        }
    }
}

impl TextBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// A body holding one paragraph
    pub fn from_paragraph(paragraph: Paragraph) -> Self {
        Self {
            paragraphs: vec![paragraph],
            ..Self::default()
        }
    }

    /// Append a paragraph and return it for filling
    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::new());
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Whether the body holds any text at all
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(|p| p.spans.is_empty())
    }

    fn font_scale(&self) -> f64 {
        match self.autofit {
            Autofit::Normal {
                font_scale: Some(scale),
            } => scale as f64 / 100_000.0,
            _ => 1.0,
        }
    }

    /// Render as `<p:txBody>` (or another tag, e.g. `a:txBody` in tables)
    pub fn to_xml(&self, tag: &str) -> String {
        let mut xml = format!("<{}>{}<a:lstStyle/>", tag, self.body_pr_xml());
        if self.paragraphs.is_empty() {
            xml.push_str("<a:p/>");
        }
        for paragraph in &self.paragraphs {
            xml.push_str(&paragraph_xml(paragraph));
        }
        xml.push_str(&format!("</{}>", tag));
        xml
    }

    fn body_pr_xml(&self) -> String {
        let (l, t, r, b) = self.insets;
        let mut attrs = format!(
            r#" lIns="{}" tIns="{}" rIns="{}" bIns="{}" rtlCol="0""#,
            to_emu(l),
            to_emu(t),
            to_emu(r),
            to_emu(b)
        );
        if !self.wrap {
            attrs.push_str(r#" wrap="none""#);
        }
        match self.anchor {
            VerticalAnchor::Top => attrs.push_str(r#" anchor="t""#),
            VerticalAnchor::Middle => attrs.push_str(r#" anchor="ctr""#),
            VerticalAnchor::Bottom => attrs.push_str(r#" anchor="b""#),
        }
        if self.anchor_center {
            attrs.push_str(r#" anchorCtr="1""#);
        }
        let fit = match self.autofit {
            Autofit::None => String::new(),
            Autofit::Normal { font_scale: None } => "<a:normAutofit/>".to_string(),
            Autofit::Normal {
                font_scale: Some(scale),
            } => format!(r#"<a:normAutofit fontScale="{}"/>"#, scale),
            Autofit::Shape => "<a:spAutoFit/>".to_string(),
        };
        if fit.is_empty() {
            format!("<a:bodyPr{}/>", attrs)
        } else {
            format!("<a:bodyPr{}>{}</a:bodyPr>", attrs, fit)
        }
    }
}

fn paragraph_xml(paragraph: &Paragraph) -> String {
    let mut xml = String::from("<a:p>");
    let mut ppr = String::new();
    if let Some(align) = paragraph.align {
        ppr.push_str(&format!(r#" algn="{}""#, align.attr()));
    }
    if paragraph.left_margin > 0.0 {
        ppr.push_str(&format!(r#" marL="{}""#, to_emu(paragraph.left_margin)));
    }
    if !ppr.is_empty() {
        xml.push_str(&format!("<a:pPr{}/>", ppr));
    }

    for span in &paragraph.spans {
        match span {
            Span::Run(run) => {
                let props = run_properties(run);
                for (i, line) in run.text.split('\n').enumerate() {
                    if i > 0 {
                        xml.push_str(&format!("<a:br>{}</a:br>", props));
                    }
                    if !line.is_empty() {
                        xml.push_str(&format!(
                            "<a:r>{}<a:t>{}</a:t></a:r>",
                            props,
                            escape(line)
                        ));
                    }
                }
            }
            Span::Break { font_size } => {
                xml.push_str(&format!(
                    r#"<a:br><a:rPr lang="en-US" sz="{}" dirty="0"/></a:br>"#,
                    hundredths(*font_size)
                ));
            }
        }
    }
    xml.push_str("</a:p>");
    xml
}

fn run_properties(run: &TextRun) -> String {
    let mut attrs = String::from(r#" lang="en-US""#);
    if let Some(size) = run.font_size {
        attrs.push_str(&format!(r#" sz="{}""#, hundredths(size)));
    }
    if run.bold {
        attrs.push_str(r#" b="1""#);
    }
    if run.italic {
        attrs.push_str(r#" i="1""#);
    }
    attrs.push_str(r#" dirty="0""#);

    let mut children = String::new();
    if let Some(color) = run.color {
        children.push_str(&color.solid_fill_xml());
    }
    if let Some(family) = &run.font_family {
        children.push_str(&format!(r#"<a:latin typeface="{}"/>"#, escape(family.as_str())));
    }

    if children.is_empty() {
        format!("<a:rPr{}/>", attrs)
    } else {
        format!("<a:rPr{}>{}</a:rPr>", attrs, children)
    }
}

fn hundredths(points: f64) -> u32 {
    (points * 100.0).round().max(0.0) as u32
}

/// Estimated height in points of `body` laid out in a box `width` points
/// wide, insets included
pub fn measure_text_height(body: &TextBody, width: f64) -> f64 {
    let (l, t, r, b) = body.insets;
    let scale = body.font_scale();
    let available = if body.wrap {
        (width - l - r).max(0.0)
    } else {
        f64::INFINITY
    };

    let text_height: f64 = body
        .paragraphs
        .iter()
        .map(|p| paragraph_height(p, available, scale))
        .sum();
    text_height + t + b
}

/// Greedy line filler for one paragraph
struct LineFiller {
    available: f64,
    width: f64,
    line_height: f64,
    total: f64,
}

impl LineFiller {
    fn add_word(&mut self, word_width: f64, height: f64) {
        if self.width > 0.0 && self.width + word_width > self.available {
            self.end_line();
        }
        self.width += word_width;
        self.line_height = self.line_height.max(height);
    }

    fn end_line(&mut self) {
        self.total += self.line_height;
        self.width = 0.0;
        self.line_height = 0.0;
    }
}

fn paragraph_height(paragraph: &Paragraph, available: f64, scale: f64) -> f64 {
    let available = (available - paragraph.left_margin).max(1.0);
    let mut filler = LineFiller {
        available,
        width: 0.0,
        line_height: 0.0,
        total: 0.0,
    };

    for span in &paragraph.spans {
        match span {
            Span::Run(run) => {
                let size = run.size() * scale;
                let height = size * LINE_SPACING;
                let advance = size * AVERAGE_ADVANCE * if run.bold { BOLD_FACTOR } else { 1.0 };

                for (i, line) in run.text.split('\n').enumerate() {
                    if i > 0 {
                        filler.line_height = filler.line_height.max(height);
                        filler.end_line();
                    }
                    for word in split_keeping_spaces(line) {
                        let word_width = display_width(word) * advance;
                        if word_width > available {
                            // No break opportunity: wrap by character
                            for c in word.chars() {
                                let cw = UnicodeWidthChar::width(c).unwrap_or(0) as f64 * advance;
                                filler.add_word(cw, height);
                            }
                        } else {
                            filler.add_word(word_width, height);
                        }
                    }
                    if line.is_empty() {
                        filler.line_height = filler.line_height.max(height);
                    }
                }
            }
            Span::Break { font_size } => {
                filler.line_height = filler.line_height.max(font_size * scale * LINE_SPACING);
                filler.end_line();
            }
        }
    }

    if filler.line_height == 0.0 && filler.total == 0.0 {
        return paragraph.first_font_size() * scale * LINE_SPACING;
    }
    if filler.line_height > 0.0 {
        filler.end_line();
    }
    filler.total
}

/// Split into words with their trailing spaces attached
fn split_keeping_spaces(line: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut in_space = false;
    for (i, c) in line.char_indices() {
        if c == ' ' {
            in_space = true;
        } else if in_space {
            words.push(&line[start..i]);
            start = i;
            in_space = false;
        }
    }
    if start < line.len() {
        words.push(&line[start..]);
    }
    words
}

fn display_width(text: &str) -> f64 {
    text.chars()
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
        .sum::<usize>() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(text: &str, size: f64) -> TextBody {
        TextBody::from_paragraph(Paragraph::from_run(TextRun::sized(text, size, Rgba::BLACK)))
    }

    #[test]
    fn test_single_line_height() {
        let h = measure_text_height(&body("Title", 12.0), 500.0);
        assert!((h - (12.0 * 1.2 + 7.2)).abs() < 1e-9);
    }

    #[test]
    fn test_wrapping_grows_height() {
        let text = "lorem ipsum dolor sit amet ".repeat(20);
        let wide = measure_text_height(&body(&text, 12.0), 2000.0);
        let narrow = measure_text_height(&body(&text, 12.0), 200.0);
        assert!(narrow > wide * 3.0);
    }

    #[test]
    fn test_newlines_and_breaks() {
        let two_lines = measure_text_height(&body("a\nb", 10.0), 500.0);
        assert!((two_lines - (2.0 * 12.0 + 7.2)).abs() < 1e-9);

        let mut para = Paragraph::new();
        para.push_break(44.0);
        para.push_run(TextRun::sized("summary", 10.0, Rgba::BLACK));
        let h = measure_text_height(&TextBody::from_paragraph(para), 500.0);
        assert!((h - (44.0 * 1.2 + 12.0 + 7.2)).abs() < 1e-9);
    }

    #[test]
    fn test_font_scale_shrinks() {
        let text = "topic ".repeat(30);
        let mut b = body(&text, 18.0);
        let full = measure_text_height(&b, 150.0);
        b.autofit = Autofit::Normal {
            font_scale: Some(25_000),
        };
        assert!(measure_text_height(&b, 150.0) < full / 2.0);
    }

    #[test]
    fn test_wide_characters_count_double() {
        let latin = measure_text_height(&body(&"a".repeat(40), 10.0), 150.0);
        let cjk = measure_text_height(&body(&"\u{4E2D}".repeat(40), 10.0), 150.0);
        assert!(cjk > latin);
    }

    #[test]
    fn test_no_wrap() {
        let mut b = body(&"long ".repeat(100), 12.0);
        b.wrap = false;
        assert!((measure_text_height(&b, 50.0) - (14.4 + 7.2)).abs() < 1e-9);
    }

    #[test]
    fn test_xml_runs_and_breaks() {
        let mut para = Paragraph::new().aligned(Align::Right);
        para.left_margin = 5.0;
        para.push_run(TextRun::sized("a & b\nc", 12.0, Rgba::GRAY).bold());
        let xml = TextBody::from_paragraph(para).to_xml("p:txBody");

        assert!(xml.starts_with("<p:txBody><a:bodyPr"));
        assert!(xml.contains(r#"<a:pPr algn="r" marL="63500"/>"#));
        assert!(xml.contains(r#"sz="1200" b="1""#));
        assert!(xml.contains("<a:t>a &amp; b</a:t>"));
        assert!(xml.contains("<a:br>"));
        assert!(xml.contains("<a:t>c</a:t>"));
        assert!(xml.contains(r#"<a:srgbClr val="808080"/>"#));
    }

    #[test]
    fn test_body_properties() {
        let mut b = body("x", 6.0);
        b.wrap = false;
        b.anchor = VerticalAnchor::Middle;
        b.anchor_center = true;
        b.autofit = Autofit::Normal {
            font_scale: Some(62_500),
        };
        let xml = b.to_xml("p:txBody");
        assert!(xml.contains(r#"wrap="none" anchor="ctr" anchorCtr="1""#));
        assert!(xml.contains(r#"<a:normAutofit fontScale="62500"/>"#));

        b.autofit = Autofit::Shape;
        assert!(b.to_xml("p:txBody").contains("<a:spAutoFit/>"));
    }

    #[test]
    fn test_split_keeping_spaces() {
        assert_eq!(split_keeping_spaces("ab  cd e"), vec!["ab  ", "cd ", "e"]);
        assert!(split_keeping_spaces("").is_empty());
    }
}
