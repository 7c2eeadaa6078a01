//! Colours: hex parsing for input data and DrawingML colour elements.

use reportdeck_ooxml::XmlElement;

use crate::error::{ReportError, Result};

/// An 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const GRAY: Rgba = Rgba::rgb(128, 128, 128);
    pub const LIGHT_GRAY: Rgba = Rgba::rgb(192, 192, 192);
    pub const DARK_GRAY: Rgba = Rgba::rgb(64, 64, 64);

    /// An opaque colour
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or `#RGB`
    pub fn parse(value: &str) -> Result<Self> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || ReportError::invalid_input(format!("invalid colour '{}'", value));

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let double = |s: &str| channel(&s.repeat(2));
                Ok(Self::rgb(
                    double(&hex[0..1])?,
                    double(&hex[1..2])?,
                    double(&hex[2..3])?,
                ))
            }
            _ => Err(invalid()),
        }
    }

    /// Same colour with a different alpha
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Multiply each channel by `factor`, truncating
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |c: u8| (c as f64 * factor).clamp(0.0, 255.0) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }

    /// A darker shade, 70% of each channel
    pub fn darker(self) -> Self {
        self.scaled(0.7)
    }

    /// `RRGGBB` as written in `a:srgbClr/@val`
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Alpha in DrawingML's thousandths of a percent
    pub fn alpha_per_mille(&self) -> u32 {
        (self.a as u32 * 100_000) / 255
    }

    /// `<a:srgbClr>` markup, with an `a:alpha` child when not opaque
    pub fn srgb_xml(&self) -> String {
        if self.a == 255 {
            format!(r#"<a:srgbClr val="{}"/>"#, self.hex())
        } else {
            format!(
                r#"<a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr>"#,
                self.hex(),
                self.alpha_per_mille()
            )
        }
    }

    /// `<a:solidFill>` markup
    pub fn solid_fill_xml(&self) -> String {
        format!("<a:solidFill>{}</a:solidFill>", self.srgb_xml())
    }
}

/// DrawingML colour element names; a colour slot holds exactly one
pub const COLOR_ELEMENTS: [&str; 6] = [
    "a:scrgbClr",
    "a:srgbClr",
    "a:hslClr",
    "a:sysClr",
    "a:schemeClr",
    "a:prstClr",
];

/// The colour kinds a DrawingML colour slot can hold
#[derive(Debug, Clone, PartialEq)]
pub enum ColorChoice {
    /// Theme colour, e.g. `accent1`
    Scheme(String),
    Rgb(Rgba),
    /// Hue in 60000ths of a degree, saturation and luminance in 1000ths of a percent
    Hsl { hue: i64, sat: i64, lum: i64 },
    /// Named preset colour, e.g. `red`
    Preset(String),
    /// System colour, e.g. `windowText`
    System(String),
    /// Linear RGB in 1000ths of a percent
    RgbPercent { r: i64, g: i64, b: i64 },
}

impl ColorChoice {
    /// Read the colour held by a colour element
    pub fn from_element(element: &XmlElement) -> Option<Self> {
        let attr = |name: &str| element.attr(name).map(str::to_string);
        let number = |name: &str| element.attr(name).and_then(|v| v.parse::<i64>().ok());
        match element.name.as_str() {
            "a:schemeClr" => attr("val").map(Self::Scheme),
            "a:srgbClr" => element
                .attr("val")
                .and_then(|v| Rgba::parse(v).ok())
                .map(Self::Rgb),
            "a:hslClr" => Some(Self::Hsl {
                hue: number("hue")?,
                sat: number("sat")?,
                lum: number("lum")?,
            }),
            "a:prstClr" => attr("val").map(Self::Preset),
            "a:sysClr" => attr("val").map(Self::System),
            "a:scrgbClr" => Some(Self::RgbPercent {
                r: number("r")?,
                g: number("g")?,
                b: number("b")?,
            }),
            _ => None,
        }
    }

    /// Build the colour element
    pub fn to_element(&self) -> XmlElement {
        match self {
            Self::Scheme(v) => XmlElement::new("a:schemeClr").with_attr("val", v.as_str()),
            Self::Rgb(c) => XmlElement::new("a:srgbClr").with_attr("val", c.hex()),
            Self::Hsl { hue, sat, lum } => XmlElement::new("a:hslClr")
                .with_attr("hue", hue.to_string())
                .with_attr("sat", sat.to_string())
                .with_attr("lum", lum.to_string()),
            Self::Preset(v) => XmlElement::new("a:prstClr").with_attr("val", v.as_str()),
            Self::System(v) => XmlElement::new("a:sysClr").with_attr("val", v.as_str()),
            Self::RgbPercent { r, g, b } => XmlElement::new("a:scrgbClr")
                .with_attr("r", r.to_string())
                .with_attr("g", g.to_string())
                .with_attr("b", b.to_string()),
        }
    }

    /// Replace whatever colour `slot` holds with this one
    pub fn write_into(&self, slot: &mut XmlElement) {
        slot.remove_children_in(&COLOR_ELEMENTS);
        slot.children.insert(0, reportdeck_ooxml::XmlNode::Element(self.to_element()));
    }

    /// The colour currently held by `slot`
    pub fn read_from(slot: &XmlElement) -> Option<Self> {
        slot.elements()
            .find(|e| COLOR_ELEMENTS.contains(&e.name.as_str()))
            .and_then(Self::from_element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Rgba::parse("#FF8000").unwrap(), Rgba::rgb(255, 128, 0));
        assert_eq!(Rgba::parse("00ff00").unwrap(), Rgba::rgb(0, 255, 0));
        assert_eq!(Rgba::parse("#abc").unwrap(), Rgba::rgb(0xAA, 0xBB, 0xCC));
        assert!(Rgba::parse("#GG0000").is_err());
        assert!(Rgba::parse("#12345").is_err());
        assert!(Rgba::parse("").is_err());
    }

    #[test]
    fn test_shades() {
        let c = Rgba::rgb(100, 200, 50);
        assert_eq!(c.darker(), Rgba::rgb(70, 140, 35));
        assert_eq!(c.scaled(0.9), Rgba::rgb(90, 180, 45));
        assert_eq!(c.with_alpha(76).darker().a, 76);
    }

    #[test]
    fn test_srgb_xml() {
        assert_eq!(Rgba::rgb(255, 0, 0).srgb_xml(), r#"<a:srgbClr val="FF0000"/>"#);
        let faded = Rgba::rgb(0, 0, 255).with_alpha(76);
        assert_eq!(
            faded.srgb_xml(),
            r#"<a:srgbClr val="0000FF"><a:alpha val="29803"/></a:srgbClr>"#
        );
        assert_eq!(Rgba::WHITE.with_alpha(0).alpha_per_mille(), 0);
    }

    #[test]
    fn test_color_choice_replaces_every_kind() {
        let mut fill = XmlElement::new("a:solidFill")
            .with_child(XmlElement::new("a:schemeClr").with_attr("val", "accent1"))
            .with_child(XmlElement::new("a:prstClr").with_attr("val", "red"));
        assert_eq!(
            ColorChoice::read_from(&fill),
            Some(ColorChoice::Scheme("accent1".to_string()))
        );

        ColorChoice::Rgb(Rgba::rgb(1, 2, 3)).write_into(&mut fill);
        assert_eq!(fill.elements().count(), 1);
        assert_eq!(
            ColorChoice::read_from(&fill),
            Some(ColorChoice::Rgb(Rgba::rgb(1, 2, 3)))
        );
    }

    #[test]
    fn test_color_choice_roundtrip_kinds() {
        let kinds = vec![
            ColorChoice::Hsl { hue: 60000, sat: 100000, lum: 50000 },
            ColorChoice::System("windowText".to_string()),
            ColorChoice::RgbPercent { r: 0, g: 50000, b: 100000 },
        ];
        for kind in kinds {
            assert_eq!(ColorChoice::from_element(&kind.to_element()), Some(kind));
        }
    }
}
