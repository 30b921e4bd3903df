//! End-to-end run: template in, filled deck out.

use crate::config::{Config, ENV_IMAGE_KEY};
use crate::content::{ContentRequester, OpenAiClient, TextGenerator};
use crate::error::{Error, Result};
use crate::images::{ImageRequester, ImageSearch, UnsplashClient};
use crate::model::SlideOutline;
use crate::populate::SlidePopulator;
use crate::pptx::{Deck, Template};
use crate::variant::{select_by_scores, Variant};
use std::path::PathBuf;

/// Slides requested when neither the options nor the template give a count.
pub const DEFAULT_SLIDE_COUNT: usize = 6;

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub variant: Variant,
    /// File the deck was written to
    pub output: PathBuf,
    /// Slides in the template
    pub template_slides: usize,
    /// Slides the text service returned
    pub generated_slides: usize,
    /// Slides in the written deck, cover included
    pub slides: usize,
    /// Whether the deck opens with a cover slide
    pub cover: bool,
    /// Bullets in the written deck
    pub bullets: usize,
    /// Pictures in the written deck
    pub images: usize,
}

/// Run against the real text and image services configured in `config`.
///
/// Configuration is validated before any client is created.
pub fn run(config: &Config, variant: Variant) -> Result<RunReport> {
    config.validate(variant)?;

    let text = OpenAiClient::new(&config.ai)?;
    let images = if variant.policy().images {
        Some(UnsplashClient::new(&config.images)?)
    } else {
        None
    };

    run_with(
        config,
        variant,
        &text,
        images.as_ref().map(|client| client as &dyn ImageSearch),
    )
}

/// Run with the given service implementations and save the deck.
pub fn run_with(
    config: &Config,
    variant: Variant,
    text: &dyn TextGenerator,
    images: Option<&dyn ImageSearch>,
) -> Result<RunReport> {
    config.validate(variant)?;

    let template = Template::open(&config.template)?;
    log::info!(
        "loaded template {} ({} slides, {} layouts)",
        config.template.display(),
        template.slide_count(),
        template.layouts().len()
    );

    let (deck, mut report) = build_deck(&template, config, variant, text, images)?;

    let output = config.output_path(variant);
    deck.save(&output)?;
    report.output = output;
    Ok(report)
}

/// Generate the deck in memory without writing it.
///
/// The returned report has an empty `output`.
pub fn build_deck<'t>(
    template: &'t Template,
    config: &Config,
    variant: Variant,
    text: &dyn TextGenerator,
    images: Option<&dyn ImageSearch>,
) -> Result<(Deck<'t>, RunReport)> {
    let policy = variant.policy();

    if policy.cap_to_template && template.slide_count() == 0 {
        return Err(Error::InvalidData(format!(
            "the {} variant needs a template with at least one slide",
            variant
        )));
    }
    let image_search = match (policy.images, images) {
        (true, None) => return Err(Error::MissingApiKey(ENV_IMAGE_KEY)),
        (true, Some(search)) => Some(search),
        (false, _) => None,
    };

    let requested = config.slides.unwrap_or(match template.slide_count() {
        0 => DEFAULT_SLIDE_COUNT,
        n => n,
    });

    let content = ContentRequester::new(text);
    let outline = content.request_outline(template, config.topic.as_deref(), requested)?;
    let generated_slides = outline.len();

    let cap = policy.cap_to_template.then_some(template.slide_count());
    let outline = if policy.score_slides {
        let scores = content.score_slides(&outline)?;
        select_by_scores(outline, &scores, config.threshold, cap)
    } else {
        match cap {
            Some(cap) => outline.into_iter().take(cap).collect(),
            None => outline,
        }
    };
    let outline = policy.apply(outline);
    log::info!(
        "{} variant keeps {} of {} generated slides",
        variant,
        outline.len(),
        generated_slides
    );

    let pictures = match image_search {
        Some(search) => ImageRequester::new(search).request_images(&outline)?,
        None => Vec::new(),
    };

    let mut deck = Deck::from_template(template);
    let populator = SlidePopulator::new().with_background(config.background.clone());
    let cover = policy.cover_slide && !outline.is_empty();
    if cover {
        let title = cover_title(template, config.topic.as_deref(), &outline);
        deck.push_slide(populator.build_cover(template, &title, outline.len()));
    }
    populator.populate(&mut deck, &outline, &pictures);

    let report = RunReport {
        variant,
        output: PathBuf::new(),
        template_slides: template.slide_count(),
        generated_slides,
        slides: deck.slide_count(),
        cover,
        bullets: outline.bullet_count(),
        images: pictures.iter().flatten().count(),
    };
    Ok((deck, report))
}

/// Cover title: the topic, else the template's first title, else the first
/// generated title.
fn cover_title(template: &Template, topic: Option<&str>, outline: &SlideOutline) -> String {
    topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| template.slides().iter().find_map(|s| s.title.clone()))
        .or_else(|| outline.iter().next().map(|s| s.title.clone()))
        .unwrap_or_default()
}
