//! Report composition.
//!
//! [`ReportService`] turns visualization data into presentations built on a
//! loaded template. Each single-visualization entry point produces a fresh
//! one-slide deck (or several slides for a paginated list); [`ReportService::report`]
//! arranges several visualizations in fractional regions of a slide, or one
//! region per slide.

use std::sync::Arc;

use reportdeck_model::{
    DateSeriesData, ListData, MapData, ReportChild, ReportData, SunburstData, TableData, TextData,
    TopicMapData, Visualization,
};
use tracing::{debug, info};

use crate::chart::{bind_date_series, bind_sunburst};
use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::{page_anchor, remaining_space, starting_space, Rect};
use crate::image_source::ImageSource;
use crate::layout::{draw_list, draw_map, draw_table, draw_text, draw_topic_map, ListHeaders};
use crate::presentation::{PictureRef, Presentation};
use crate::settings::ReportSettings;
use crate::shape::{AutoShape, ShapeKind};
use crate::slide::{Slide, SlideId};
use crate::template::TemplateHandle;
use crate::text::{measure_text_height, Align, Autofit, Paragraph, TextBody, TextRun};

/// Share of the page height taken by the heading of a table or map
const HEADING_FRACTION: f64 = 0.1;

/// Renders visualizations into presentations based on one template
#[derive(Clone)]
pub struct ReportService {
    template: Arc<TemplateHandle>,
    settings: ReportSettings,
    images: Arc<dyn ImageSource>,
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// A title text box waiting to be placed once its region is drawn
struct PendingTitle {
    anchor: Rect,
    body: TextBody,
}

impl ReportService {
    /// Create a service; images are resolved as the settings ask
    pub fn new(template: Arc<TemplateHandle>, settings: ReportSettings) -> Result<Self> {
        settings.validate()?;
        let images = settings.image_source()?;
        Ok(Self {
            template,
            settings,
            images,
        })
    }

    /// Resolve images through `images` instead
    pub fn with_image_source(mut self, images: Arc<dyn ImageSource>) -> Self {
        self.images = images;
        self
    }

    pub fn template(&self) -> &TemplateHandle {
        &self.template
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Check that `bytes` hold a usable template
    pub fn validate_template(bytes: &[u8]) -> Result<()> {
        TemplateHandle::load(bytes).map(|_| ())
    }

    /// A topic map filling the page
    pub fn topic_map(&self, data: &TopicMapData) -> Result<Presentation> {
        let (mut deck, page) = self.new_deck()?;
        let slide = deck.add_slide();
        draw_topic_map(deck.require_slide_mut(slide)?, page, data)?;
        Ok(deck)
    }

    /// A doughnut chart placed where the template had it
    pub fn sunburst(&self, data: &SunburstData) -> Result<Presentation> {
        let (mut deck, _) = self.new_deck()?;
        let slide = deck.add_slide();
        self.commit_sunburst(&mut deck, slide, data, None)?;
        Ok(deck)
    }

    /// A date line chart placed where the template had it
    pub fn date_graph(&self, data: &DateSeriesData) -> Result<Presentation> {
        let (mut deck, _) = self.new_deck()?;
        let slide = deck.add_slide();
        self.commit_date_graph(&mut deck, slide, data, None)?;
        Ok(deck)
    }

    /// A table under an optional heading. Rows are never cropped.
    pub fn table(&self, data: &TableData, title: Option<&str>) -> Result<Presentation> {
        data.validate()?;
        let (mut deck, page) = self.new_deck()?;
        let slide = deck.add_slide();
        let slide = deck.require_slide_mut(slide)?;

        let used = draw_heading(slide, page, title);
        draw_table(
            slide,
            remaining_space(&page, used),
            data.rows,
            data.cols,
            &data.cells,
            false,
        );
        Ok(deck)
    }

    /// A map under an optional heading
    pub fn map(&self, data: &MapData, title: Option<&str>) -> Result<Presentation> {
        let (mut deck, page) = self.new_deck()?;
        let slide = deck.add_slide();
        let picture = self.map_picture(&mut deck, data)?;
        let slide = deck.require_slide_mut(slide)?;

        let used = draw_heading(slide, page, title);
        draw_map(slide, remaining_space(&page, used), &picture, data)?;
        Ok(deck)
    }

    /// A document list over as many slides as it needs, with `results` and
    /// `sort_by` as the page headers
    pub fn list(
        &self,
        data: &ListData,
        results: Option<&str>,
        sort_by: Option<&str>,
    ) -> Result<Presentation> {
        let (mut deck, page) = self.new_deck()?;
        let slides = draw_list(
            &mut deck,
            None,
            page,
            true,
            data,
            ListHeaders::new(results, sort_by),
            self.images.as_ref(),
        )?;
        debug!(slides = slides.len(), docs = data.docs.len(), "list drawn");
        Ok(deck)
    }

    /// Formatted text filling the page
    pub fn text(&self, data: &TextData) -> Result<Presentation> {
        let (mut deck, page) = self.new_deck()?;
        let slide = deck.add_slide();
        draw_text(deck.require_slide_mut(slide)?, page, data)?;
        Ok(deck)
    }

    /// Several visualizations, each in its own fractional region of the page.
    ///
    /// Every region's data is validated before anything is drawn. With
    /// `slide_per_region` each region gets a slide of its own; otherwise
    /// they share one slide and charts are drawn first. Region titles are
    /// measured up front to reserve their space and placed after the
    /// content.
    pub fn report(&self, report: &ReportData, slide_per_region: bool) -> Result<Presentation> {
        report.validate()?;
        let (mut deck, page) = self.new_deck()?;

        let mut children: Vec<&ReportChild> = report.children.iter().collect();
        if !slide_per_region {
            children.sort_by_key(|child| !child.visualization.is_chart());
        }

        let mut slide = deck.add_slide();
        let mut titles = Vec::new();
        for (index, child) in children.into_iter().enumerate() {
            if slide_per_region && index > 0 {
                slide = deck.add_slide();
            }

            let (region, title) = layout_region(&page, child);
            debug!(kind = child.visualization.kind(), ?region, "drawing region");
            self.draw_visualization(&mut deck, slide, region, &child.visualization)?;
            titles.extend(title);

            if slide_per_region {
                place_titles(deck.require_slide_mut(slide)?, titles.drain(..));
            }
        }
        place_titles(deck.require_slide_mut(slide)?, titles);

        info!(
            regions = report.children.len(),
            slides = deck.slide_count(),
            "report composed"
        );
        Ok(deck)
    }

    fn new_deck(&self) -> Result<(Presentation, Rect)> {
        let deck = self.template.new_presentation()?;
        let (width, height) = deck.slide_size();
        let page = page_anchor(width, height, &self.settings.anchor);
        Ok((deck, page))
    }

    fn draw_visualization(
        &self,
        deck: &mut Presentation,
        slide: SlideId,
        region: Rect,
        visualization: &Visualization,
    ) -> Result<()> {
        match visualization {
            Visualization::DateGraph(data) => {
                self.commit_date_graph(deck, slide, data, Some(region))?;
            }
            Visualization::Sunburst(data) => {
                self.commit_sunburst(deck, slide, data, Some(region))?;
            }
            Visualization::List(data) => {
                draw_list(
                    deck,
                    Some(slide),
                    region,
                    false,
                    data,
                    ListHeaders::default(),
                    self.images.as_ref(),
                )?;
            }
            Visualization::Map(data) => {
                let picture = self.map_picture(deck, data)?;
                draw_map(deck.require_slide_mut(slide)?, region, &picture, data)?;
            }
            Visualization::Table(data) => {
                draw_table(
                    deck.require_slide_mut(slide)?,
                    region,
                    data.rows,
                    data.cols,
                    &data.cells,
                    true,
                );
            }
            Visualization::TopicMap(data) => {
                draw_topic_map(deck.require_slide_mut(slide)?, region, data)?;
            }
            Visualization::Text(data) => {
                draw_text(deck.require_slide_mut(slide)?, region, data)?;
            }
        }
        Ok(())
    }

    fn commit_sunburst(
        &self,
        deck: &mut Presentation,
        slide: SlideId,
        data: &SunburstData,
        anchor: Option<Rect>,
    ) -> Result<u32> {
        let fragment = self.template.doughnut();
        let bound = bind_sunburst(fragment, data)?;
        deck.commit_chart(slide, fragment, bound, anchor)
    }

    fn commit_date_graph(
        &self,
        deck: &mut Presentation,
        slide: SlideId,
        data: &DateSeriesData,
        anchor: Option<Rect>,
    ) -> Result<u32> {
        let fragment = self.template.line();
        let bound = bind_date_series(fragment, data)?;
        deck.commit_chart(slide, fragment, bound, anchor)
    }

    /// The map's background picture; failing to get it fails the map
    fn map_picture(&self, deck: &mut Presentation, data: &MapData) -> Result<PictureRef> {
        let image = self.images.resolve(&data.image)?;
        deck.add_picture(&image)
    }
}

/// Centred heading across the top tenth of `page`; returns the height used
fn draw_heading(slide: &mut Slide, page: Rect, title: Option<&str>) -> f64 {
    let Some(title) = title.filter(|t| !t.trim().is_empty()) else {
        return 0.0;
    };
    let height = HEADING_FRACTION * page.height;

    let mut body = TextBody::from_paragraph(
        Paragraph::from_run(TextRun::new(title)).aligned(Align::Center),
    );
    body.anchor_center = true;
    body.autofit = Autofit::Shape;
    slide.add(ShapeKind::Auto(AutoShape::text_box(
        starting_space(&page, height),
        body,
    )));
    height
}

/// Where a region's content goes, and its title if there is room for one.
///
/// A non-negative margin insets the region on every side as long as the
/// region is wider than both margins. The title then takes its measured
/// height plus the text margin off the top. If nothing is left below it,
/// the region is used uninset and the title is dropped.
fn layout_region(page: &Rect, child: &ReportChild) -> (Rect, Option<PendingTitle>) {
    let anchor = page.scaled(&child.anchor());
    let margin = child.margin;
    if margin < 0.0 || anchor.width <= 2.0 * margin {
        return (anchor, None);
    }

    let mut content = anchor.inset(margin);
    let mut title = None;
    if let Some(text) = child.title_text() {
        if content.height > 0.0 {
            let body = TextBody {
                autofit: Autofit::Shape,
                ..TextBody::from_paragraph(Paragraph::from_run(
                    TextRun::sized(text, child.font_size, Rgba::BLACK)
                        .with_font_family(child.font_family.as_str()),
                ))
            };
            let text_height = measure_text_height(&body, content.width);
            title = Some(PendingTitle {
                anchor: Rect::new(content.x, content.y, content.width, text_height),
                body,
            });

            let used = text_height + child.text_margin;
            content.y += used;
            content.height -= used;
        }
    }

    if content.height > 0.0 {
        (content, title)
    } else {
        (anchor, None)
    }
}

fn place_titles(slide: &mut Slide, titles: impl IntoIterator<Item = PendingTitle>) {
    for title in titles {
        slide.add(ShapeKind::Auto(AutoShape::text_box(title.anchor, title.body)));
    }
}
