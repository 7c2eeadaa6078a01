//! Topic maps: shaded closed paths with labels shrunk to fit

use reportdeck_model::TopicMapData;

use crate::color::Rgba;
use crate::constants::{FONT_FIT_ATTEMPTS, FONT_SCALE_MAX, FONT_SCALE_MIN};
use crate::error::Result;
use crate::geometry::Rect;
use crate::shape::{AutoShape, Fill, Geometry, GradientStop, Line, ShapeKind};
use crate::slide::Slide;
use crate::text::{
    measure_text_height, Align, Autofit, Paragraph, TextBody, TextRun, VerticalAnchor,
};

/// Gradient direction, in 60000ths of a degree
const GRADIENT_ANGLE: u32 = 3_300_000;
const OUTLINE_WIDTH: f64 = 2.0;

/// Draw every path of `data` inside `region`, scaling its fractional
/// points to the region.
///
/// Each path is filled with a two-stop gradient at the path's opacity and
/// labelled with its name in bold white, the font shrunk until the label
/// fits the path's bounding box. Paths above level 0 disappear when
/// clicked in the slide show. Returns the ids of the drawn shapes.
pub fn draw_topic_map(slide: &mut Slide, region: Rect, data: &TopicMapData) -> Result<Vec<u32>> {
    let colors = data
        .paths
        .iter()
        .map(|path| Ok((Rgba::parse(&path.color)?, Rgba::parse(&path.color2)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut ids = Vec::with_capacity(data.paths.len());
    for (path, (start, end)) in data.paths.iter().zip(colors) {
        let points: Vec<(f64, f64)> = path
            .points
            .iter()
            .map(|[x, y]| (x * region.width + region.x, y * region.height + region.y))
            .collect();
        let Some((bounds, geometry)) = Geometry::polygon(&points) else {
            continue;
        };

        let alpha = (100_000.0 * path.opacity.clamp(0.0, 1.0)) as u32;
        let fill = Fill::LinearGradient {
            angle: GRADIENT_ANGLE,
            stops: vec![
                GradientStop {
                    position: 0,
                    color: start,
                    alpha: Some(alpha),
                },
                GradientStop {
                    position: 100_000,
                    color: end,
                    alpha: Some(alpha),
                },
            ],
        };

        let mut label = TextBody::from_paragraph(
            Paragraph::from_run(TextRun {
                color: Some(Rgba::WHITE),
                ..TextRun::new(path.name.as_str()).bold()
            })
            .aligned(Align::Center),
        );
        label.anchor = VerticalAnchor::Middle;
        label.anchor_center = true;
        fit_font_scale(&mut label, bounds.width, bounds.height);

        let id = slide.add(ShapeKind::Auto(
            AutoShape::freeform(bounds, geometry)
                .with_fill(fill)
                .with_line(Line::new(OUTLINE_WIDTH, Rgba::GRAY))
                .with_text(label),
        ));
        if path.level > 0 {
            slide.hide_on_click(id);
        }
        ids.push(id);
    }
    Ok(ids)
}

/// Bisect the body's font scale between 1% and 100% until its measured
/// height matches `height`, giving up after a fixed number of attempts.
/// The last scale tried is the one kept.
pub(crate) fn fit_font_scale(body: &mut TextBody, width: f64, height: f64) {
    let (mut min, mut max) = (FONT_SCALE_MIN, FONT_SCALE_MAX);
    let mut scale = FONT_SCALE_MAX;

    for _ in 0..FONT_FIT_ATTEMPTS {
        body.autofit = Autofit::Normal {
            font_scale: Some(((scale * 1000.0) as u32).max(1)),
        };
        let text_height = measure_text_height(body, width);
        if text_height < height {
            min = scale;
        } else if text_height > height {
            max = scale;
        } else {
            break;
        }
        scale = 0.5 * (min + max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_template;
    use crate::template::TemplateHandle;
    use reportdeck_model::TopicPath;

    fn path(name: &str, points: Vec<[f64; 2]>, level: u32) -> TopicPath {
        TopicPath {
            name: name.to_string(),
            color: "#FF0000".to_string(),
            color2: "#0000FF".to_string(),
            opacity: 0.7,
            points,
            level,
        }
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<[f64; 2]> {
        vec![[x, y], [x + size, y], [x + size, y + size], [x, y + size]]
    }

    fn draw(paths: Vec<TopicPath>) -> (Slide, Vec<u32>) {
        let template = TemplateHandle::load(&sample_template().unwrap()).unwrap();
        let mut deck = template.new_presentation().unwrap();
        let id = deck.add_slide();
        let slide = deck.slide_mut(id).unwrap();
        let ids = draw_topic_map(
            slide,
            Rect::new(0.0, 0.0, 1000.0, 500.0),
            &TopicMapData { paths },
        )
        .unwrap();
        (slide.clone(), ids)
    }

    fn auto(slide: &Slide, id: u32) -> AutoShape {
        match &slide.shape(id).unwrap().kind {
            ShapeKind::Auto(a) => a.clone(),
            other => panic!("expected an auto shape, got {:?}", other),
        }
    }

    fn font_scale(shape: &AutoShape) -> u32 {
        match shape.text.as_ref().unwrap().autofit {
            Autofit::Normal {
                font_scale: Some(scale),
            } => scale,
            other => panic!("expected normal autofit, got {:?}", other),
        }
    }

    #[test]
    fn test_path_scaled_and_styled() {
        let (slide, ids) = draw(vec![path("cats", square(0.25, 0.25, 0.5), 0)]);
        let shape = auto(&slide, ids[0]);

        assert_eq!(shape.anchor, Rect::new(250.0, 125.0, 500.0, 250.0));
        assert_eq!(shape.line, Some(Line::new(2.0, Rgba::GRAY)));
        match &shape.fill {
            Some(Fill::LinearGradient { angle, stops }) => {
                assert_eq!(*angle, 3_300_000);
                assert_eq!(stops[0].color, Rgba::rgb(255, 0, 0));
                assert_eq!(stops[1].position, 100_000);
                assert_eq!(stops[1].color, Rgba::rgb(0, 0, 255));
                assert!(stops.iter().all(|s| s.alpha == Some(70_000)));
            }
            other => panic!("expected a gradient, got {:?}", other),
        }

        let body = shape.text.as_ref().unwrap();
        assert_eq!(body.anchor, VerticalAnchor::Middle);
        assert!(body.anchor_center);
        assert_eq!(body.paragraphs[0].align, Some(Align::Center));
        assert_eq!(font_scale(&shape), 100_000);
        assert!(slide.click_to_hide().is_empty());
    }

    #[test]
    fn test_long_label_shrinks() {
        let name = "a very long topic label that cannot possibly fit ".repeat(4);
        let (slide, ids) = draw(vec![path(&name, square(0.0, 0.0, 0.08), 0)]);
        let shape = auto(&slide, ids[0]);
        let scale = font_scale(&shape);
        assert!(scale < 100_000);
        assert!(scale >= 1_000);
    }

    #[test]
    fn test_bisection_is_capped() {
        // nothing fits in no height at all, so every attempt halves down
        let mut body = TextBody::from_paragraph(Paragraph::from_run(TextRun::new("x")));
        fit_font_scale(&mut body, 100.0, 0.0);
        // 100, 50.5, 25.75, 13.375, 7.1875, 4.09375, 2.546875
        assert_eq!(
            body.autofit,
            Autofit::Normal {
                font_scale: Some(2_546)
            }
        );
    }

    #[test]
    fn test_nested_topics_hide_on_click() {
        let (slide, ids) = draw(vec![
            path("outer", square(0.0, 0.0, 0.5), 0),
            path("inner", square(0.1, 0.1, 0.2), 1),
        ]);
        assert_eq!(slide.click_to_hide(), &[ids[1]]);
        assert!(slide.to_xml().contains(&format!(r#"<p:spTgt spid="{}"/>"#, ids[1])));
    }

    #[test]
    fn test_bad_colour_rejected() {
        let template = TemplateHandle::load(&sample_template().unwrap()).unwrap();
        let mut deck = template.new_presentation().unwrap();
        let id = deck.add_slide();
        let slide = deck.slide_mut(id).unwrap();

        let mut bad = path("x", square(0.0, 0.0, 0.5), 0);
        bad.color2 = "blue".into();
        let data = TopicMapData {
            paths: vec![path("ok", square(0.0, 0.0, 0.5), 0), bad],
        };
        let err = draw_topic_map(slide, Rect::new(0.0, 0.0, 100.0, 100.0), &data).unwrap_err();
        assert_eq!(err.code(), "RPT002");
        assert!(slide.shapes().is_empty());
    }
}
