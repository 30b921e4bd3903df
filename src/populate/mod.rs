//! Slide populator: turns outline slides (and their pictures) into slides
//! of a [`Deck`].

pub mod layout;

use crate::model::{ImageRef, OutlineSlide, SlideKind, SlideOutline};
use crate::pptx::{Deck, SlideBuilder, Template};
use layout::{
    body_font_size_for, classify, cover_subtitle_frame, image_frame, table_frame, table_rows,
    text_frame_beside_image, title_font_size, truncate, TABLE_FONT_PT,
};

/// Titles are cut to this many display columns.
const MAX_TITLE_COLS: usize = 100;

const COVER_SUBTITLE_PT: u32 = 18;

/// Writes outline slides into a deck.
#[derive(Debug, Clone, Default)]
pub struct SlidePopulator {
    background: Option<String>,
}

impl SlidePopulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every slide a solid `RRGGBB` background.
    pub fn with_background(mut self, rgb: Option<String>) -> Self {
        self.background = rgb;
        self
    }

    /// Build the slide for one outline entry.
    pub fn build_slide(
        &self,
        template: &Template,
        slide: &OutlineSlide,
        image: Option<&ImageRef>,
    ) -> SlideBuilder {
        let kind = classify(slide);
        let size = template.slide_size();
        let title = truncate(&slide.title, MAX_TITLE_COLS);

        let mut builder = SlideBuilder::new(template.layout_for(kind), size)
            .title(title.as_str(), title_font_size(&title));

        match kind {
            SlideKind::Title => {}
            SlideKind::Table => {
                let frame = table_frame(size, image.is_some());
                builder = builder.table(table_rows(slide), frame, TABLE_FONT_PT);
            }
            SlideKind::Body | SlideKind::Bullets => {
                let font = body_font_size_for(kind, &slide.bullets);
                builder =
                    builder.body(slide.bullets.iter().cloned(), font, kind == SlideKind::Bullets);
                if image.is_some() {
                    builder = builder.body_frame(text_frame_beside_image(size));
                }
            }
        }

        if let Some(image) = image {
            builder = builder.picture(image.clone(), image_frame(kind, size));
        }
        if let Some(rgb) = &self.background {
            builder = builder.background(rgb.as_str());
        }
        builder
    }

    /// Opening slide: `title` over a line counting the slides that follow.
    pub fn build_cover(&self, template: &Template, title: &str, slides: usize) -> SlideBuilder {
        let size = template.slide_size();
        let title = truncate(title, MAX_TITLE_COLS);
        let subtitle = match slides {
            1 => "1 key insight".to_string(),
            n => format!("{} key insights", n),
        };

        let mut builder = SlideBuilder::new(template.layout_for(SlideKind::Title), size)
            .title(title.as_str(), title_font_size(&title))
            .body([subtitle], COVER_SUBTITLE_PT, false)
            .body_frame(cover_subtitle_frame(size));
        if let Some(rgb) = &self.background {
            builder = builder.background(rgb.as_str());
        }
        builder
    }

    /// Append one slide per outline entry; `images[i]` belongs to slide `i`.
    ///
    /// Returns the number of slides written.
    pub fn populate(
        &self,
        deck: &mut Deck<'_>,
        outline: &SlideOutline,
        images: &[Option<ImageRef>],
    ) -> usize {
        let template = deck.template();
        for (i, slide) in outline.iter().enumerate() {
            let image = images.get(i).and_then(Option::as_ref);
            let builder = self.build_slide(template, slide, image);
            log::debug!(
                "slide {}: {:?} layout {}, {} bullets{}",
                i + 1,
                classify(slide),
                builder.layout().part,
                slide.bullets.len(),
                if image.is_some() { ", picture" } else { "" }
            );
            deck.push_slide(builder);
        }
        outline.len()
    }
}
