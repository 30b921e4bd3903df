//! Content requester: asks the text service for a slide outline and for
//! importance scores.

mod openai;
pub mod parse;
pub mod prompt;

pub use openai::OpenAiClient;
pub use parse::{parse_outline, parse_scores};

use crate::error::Result;
use crate::model::SlideOutline;
use crate::pptx::Template;
use prompt::{outline_prompt, score_prompt, SCORE_BATCH_SIZE};

/// A single-turn request to the text service.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// User message
    pub text: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl Prompt {
    pub fn new(text: impl Into<String>, temperature: f32) -> Self {
        Self {
            text: text.into(),
            temperature,
        }
    }
}

/// Port for generative text services.
pub trait TextGenerator {
    /// Return the model's reply to `prompt`.
    fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// Builds prompts, calls the generator and parses the replies.
pub struct ContentRequester<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> ContentRequester<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Ask for an outline of `slide_count` slides.
    pub fn request_outline(
        &self,
        template: &Template,
        topic: Option<&str>,
        slide_count: usize,
    ) -> Result<SlideOutline> {
        let prompt = outline_prompt(template, topic, slide_count);
        log::debug!("outline prompt:\n{}", prompt.text);

        let reply = self.generator.complete(&prompt)?;
        log::debug!("outline reply:\n{}", reply);

        let outline = parse_outline(&reply)?;
        log::info!(
            "received outline: {} slides, {} bullets",
            outline.len(),
            outline.bullet_count()
        );
        Ok(outline)
    }

    /// Score every slide from 1 to 10, three slides per request.
    ///
    /// The result has exactly one score per slide.
    pub fn score_slides(&self, outline: &SlideOutline) -> Result<Vec<u8>> {
        let mut scores = Vec::with_capacity(outline.len());
        for (batch_index, batch) in outline.slides.chunks(SCORE_BATCH_SIZE).enumerate() {
            let prompt = score_prompt(batch, batch_index * SCORE_BATCH_SIZE + 1);
            let reply = self.generator.complete(&prompt)?;
            let batch_scores = parse_scores(&reply, batch.len());
            log::debug!("scores for batch {}: {:?}", batch_index + 1, batch_scores);
            scores.extend(batch_scores);
        }
        Ok(scores)
    }
}

impl std::fmt::Debug for ContentRequester<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRequester").finish_non_exhaustive()
    }
}
