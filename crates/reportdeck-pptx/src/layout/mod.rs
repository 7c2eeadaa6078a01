//! Layout routines: visualizations drawn as plain shapes inside a bounding
//! rectangle on a slide.
//!
//! Every routine works in points, takes the region it may use, and leaves
//! anything outside that region alone. Only the document list needs the
//! whole presentation, since it can add slides and pictures as it goes.

mod list;
mod map;
mod table;
mod text;
mod topic_map;

pub use list::{draw_list, ListHeaders};
pub use map::draw_map;
pub use table::draw_table;
pub use text::draw_text;
pub use topic_map::draw_topic_map;

/// Run texts of every shape on a slide, groups included
#[cfg(test)]
pub(crate) fn run_texts(shapes: &[crate::shape::Shape]) -> Vec<String> {
    use crate::shape::ShapeKind;
    use crate::text::Span;

    let mut texts = Vec::new();
    for shape in shapes {
        match &shape.kind {
            ShapeKind::Auto(auto) => {
                if let Some(body) = &auto.text {
                    for paragraph in &body.paragraphs {
                        for span in &paragraph.spans {
                            if let Span::Run(run) = span {
                                texts.push(run.text.clone());
                            }
                        }
                    }
                }
            }
            ShapeKind::Group(group) => texts.extend(run_texts(&group.children)),
            _ => {}
        }
    }
    texts
}
