//! Image maps with markers and shaded regions

use reportdeck_model::{MapData, Marker, Polygon};

use crate::color::Rgba;
use crate::error::{ReportError, Result};
use crate::geometry::Rect;
use crate::presentation::PictureRef;
use crate::shape::{
    AutoShape, Fill, Geometry, GroupShape, Hyperlink, Line, PathCommand, ShapeKind,
};
use crate::slide::Slide;
use crate::text::{Align, Paragraph, TextBody, TextRun, VerticalAnchor};

/// Click action that stays on the slide; the link only carries a tooltip
const SLIDE_JUMP: &str = "ppaction://hlinksldjump";

/// Alpha of faded markers and polygon fills
const FADE_ALPHA: u8 = 76;

const CLUSTER_HALF_SIZE: f64 = 10.0;
const CLUSTER_INNER_HALF_SIZE: f64 = 7.0;
const CLUSTER_HALO_ALPHA: u8 = 154;
const CLUSTER_FADED_HALO_ALPHA: u8 = 47;
const CLUSTER_FONT_SIZE: f64 = 6.0;

const PIN_HALF_WIDTH: f64 = 8.0;
/// How far below the head the pin's point reaches, relative to its width
const PIN_EXTENSION: f64 = 0.85;
const PIN_ALPHA: u8 = 210;
const OUTLINE_WIDTH: f64 = 0.5;

/// Draw `picture` inside `region` with the markers and polygons of `data`
/// on top of it.
///
/// The picture keeps its aspect ratio and is anchored top-centre. Marker
/// and polygon coordinates are fractions of the fitted picture. Colours
/// are checked before anything is drawn. Returns the picture's shape id.
pub fn draw_map(
    slide: &mut Slide,
    region: Rect,
    picture: &PictureRef,
    data: &MapData,
) -> Result<u32> {
    let markers = data
        .markers
        .iter()
        .map(|marker| {
            let font = marker.font_color.as_deref().map(Rgba::parse).transpose()?;
            Ok((marker, Rgba::parse(&marker.color)?, font.unwrap_or(Rgba::BLACK)))
        })
        .collect::<Result<Vec<_>>>()?;
    let polygons = data
        .polygons
        .iter()
        .flatten()
        .map(|polygon| Ok((polygon, Rgba::parse(&polygon.color)?)))
        .collect::<Result<Vec<_>>>()?;

    if picture.width == 0 || picture.height == 0 {
        return Err(ReportError::image_fetch(
            picture.part_name.as_str(),
            "picture has no size",
        ));
    }

    let canvas = fit_top_centre(region, picture.width as f64 / picture.height as f64);
    let picture_id = slide.add_picture(picture, canvas);

    for (polygon, color) in polygons {
        draw_polygon(slide, canvas, polygon, color);
    }
    for (marker, color, font_color) in markers {
        let center = (
            canvas.x + marker.x * canvas.width,
            canvas.y + marker.y * canvas.height,
        );
        if marker.cluster {
            draw_cluster(slide, center, marker, color, font_color);
        } else {
            draw_pin(slide, center, marker, color);
        }
    }

    Ok(picture_id)
}

/// Largest rectangle of aspect `ratio` inside `region`, top-centre
fn fit_top_centre(region: Rect, ratio: f64) -> Rect {
    let (mut width, mut height) = (region.width, region.height);
    if ratio > width / height {
        height = width / ratio;
    } else {
        width = height * ratio;
    }
    Rect::new(
        region.x + 0.5 * (region.width - width),
        region.y,
        width,
        height,
    )
}

fn tooltip(slide: &mut Slide, text: &str) -> Hyperlink {
    Hyperlink {
        rel_id: slide.self_link(),
        tooltip: Some(text.to_string()),
        action: Some(SLIDE_JUMP.to_string()),
    }
}

/// A halo with a numbered disc, centred on the marker position
fn draw_cluster(
    slide: &mut Slide,
    (cx, cy): (f64, f64),
    marker: &Marker,
    color: Rgba,
    font_color: Rgba,
) {
    let bounds = Rect::new(
        cx - CLUSTER_HALF_SIZE,
        cy - CLUSTER_HALF_SIZE,
        2.0 * CLUSTER_HALF_SIZE,
        2.0 * CLUSTER_HALF_SIZE,
    );
    let halo_alpha = if marker.fade {
        CLUSTER_FADED_HALO_ALPHA
    } else {
        CLUSTER_HALO_ALPHA
    };
    let halo = AutoShape::preset(bounds, "ellipse")
        .with_fill(Fill::Solid(color.with_alpha(halo_alpha)));

    let inner_alpha = if marker.fade { FADE_ALPHA } else { 255 };
    let mut label = TextBody::from_paragraph(
        Paragraph::from_run(TextRun::sized(
            marker.text().unwrap_or(""),
            CLUSTER_FONT_SIZE,
            font_color.with_alpha(inner_alpha),
        ))
        .aligned(Align::Center),
    );
    label.wrap = false;
    label.anchor = VerticalAnchor::Middle;
    label.anchor_center = true;
    let inner = AutoShape::preset(
        Rect::new(
            cx - CLUSTER_INNER_HALF_SIZE,
            cy - CLUSTER_INNER_HALF_SIZE,
            2.0 * CLUSTER_INNER_HALF_SIZE,
            2.0 * CLUSTER_INNER_HALF_SIZE,
        ),
        "ellipse",
    )
    .with_fill(Fill::Solid(color.with_alpha(inner_alpha)))
    .with_line(Line::new(0.1, color.scaled(0.9).with_alpha(inner_alpha)))
    .with_text(label);

    let children = vec![
        slide.new_shape(ShapeKind::Auto(halo)),
        slide.new_shape(ShapeKind::Auto(inner)),
    ];
    let group = slide.new_shape(ShapeKind::Group(GroupShape {
        anchor: bounds,
        interior: bounds,
        children,
    }));
    slide.push(group);
}

/// A pin whose point sits on the marker position, with a white disc in its
/// head; text becomes a tooltip on both parts
fn draw_pin(slide: &mut Slide, (cx, cy): (f64, f64), marker: &Marker, color: Rgba) {
    let width = 2.0 * PIN_HALF_WIDTH;
    let height = (0.5 + PIN_EXTENSION) * width;
    let angle = (0.5 / PIN_EXTENSION).asin().to_degrees();
    let radians = angle.to_radians();

    let outline = Geometry::Custom {
        width,
        height,
        commands: vec![
            PathCommand::MoveTo(
                PIN_HALF_WIDTH + PIN_HALF_WIDTH * radians.cos(),
                PIN_HALF_WIDTH + PIN_HALF_WIDTH * radians.sin(),
            ),
            PathCommand::ArcTo {
                width_radius: PIN_HALF_WIDTH,
                height_radius: PIN_HALF_WIDTH,
                start_angle: angle,
                swing_angle: -(180.0 + 2.0 * angle),
            },
            PathCommand::LineTo(PIN_HALF_WIDTH, height),
            PathCommand::Close,
        ],
    };
    let mut pin = AutoShape::freeform(Rect::new(0.0, 0.0, width, height), outline)
        .with_fill(Fill::Solid(color.with_alpha(PIN_ALPHA)))
        .with_line(Line::new(OUTLINE_WIDTH, color.darker()));

    let disc_radius = 0.25 * width;
    let mut disc = AutoShape::preset(
        Rect::new(
            PIN_HALF_WIDTH - disc_radius,
            PIN_HALF_WIDTH - disc_radius,
            2.0 * disc_radius,
            2.0 * disc_radius,
        ),
        "donut",
    )
    .with_fill(Fill::Solid(Rgba::WHITE))
    .with_line(Line::new(OUTLINE_WIDTH, Rgba::WHITE));

    if let Some(text) = marker.text().filter(|t| !t.is_empty()) {
        let link = tooltip(slide, text);
        pin.hyperlink = Some(link.clone());
        disc.hyperlink = Some(link);
    }

    let children = vec![
        slide.new_shape(ShapeKind::Auto(pin)),
        slide.new_shape(ShapeKind::Auto(disc)),
    ];
    let group = slide.new_shape(ShapeKind::Group(GroupShape {
        anchor: Rect::new(cx - PIN_HALF_WIDTH, cy - height, width, height),
        interior: Rect::new(0.0, 0.0, width, height),
        children,
    }));
    slide.push(group);
}

/// A translucent closed outline over the picture
fn draw_polygon(slide: &mut Slide, canvas: Rect, polygon: &Polygon, color: Rgba) {
    let points: Vec<(f64, f64)> = polygon
        .points
        .iter()
        .map(|[x, y]| (canvas.x + x * canvas.width, canvas.y + y * canvas.height))
        .collect();
    let Some((bounds, geometry)) = Geometry::polygon(&points) else {
        return;
    };

    let mut shape = AutoShape::freeform(bounds, geometry)
        .with_fill(Fill::Solid(color.with_alpha(FADE_ALPHA)))
        .with_line(Line::new(OUTLINE_WIDTH, color.darker()));
    if let Some(text) = polygon.text.as_deref().filter(|t| !t.is_empty()) {
        shape.hyperlink = Some(tooltip(slide, text));
    }
    let shape = slide.new_shape(ShapeKind::Auto(shape));
    slide.push(shape);
}
