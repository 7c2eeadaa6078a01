//! Free-form formatted text

use serde::{Deserialize, Serialize};

/// A block of differently formatted text runs.
///
/// Runs are placed one after another with no implicit line break between
/// them; use `\n` inside a run's text to start a new line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    #[serde(alias = "text")]
    pub paragraphs: Vec<TextParagraph>,
}

/// A run of text with its own formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextParagraph {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

fn default_text() -> String {
    "\n".to_string()
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_font_size() -> f64 {
    12.0
}

impl Default for TextParagraph {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            text: default_text(),
            color: default_color(),
            font_size: default_font_size(),
        }
    }
}

impl TextParagraph {
    /// Create a plain black 12pt run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Render in bold
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_defaults() {
        let data: TextData = serde_json::from_str(r#"{"paragraphs": [{}]}"#).unwrap();
        assert_eq!(data.paragraphs[0], TextParagraph::default());
        assert_eq!(data.paragraphs[0].text, "\n");
        assert_eq!(data.paragraphs[0].color, "#000000");
        assert_eq!(data.paragraphs[0].font_size, 12.0);
    }

    #[test]
    fn test_text_alias() {
        let data: TextData =
            serde_json::from_str(r#"{"text": [{"text": "Hello", "bold": true, "fontSize": 20}]}"#)
                .unwrap();
        assert_eq!(data.paragraphs.len(), 1);
        assert!(data.paragraphs[0].bold);
        assert_eq!(data.paragraphs[0].font_size, 20.0);
    }
}
