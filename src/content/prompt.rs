//! Fixed prompts sent to the text service.

use super::Prompt;
use crate::model::OutlineSlide;
use crate::pptx::Template;

/// Sampling temperature for outline generation.
pub const OUTLINE_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for importance scoring.
pub const SCORE_TEMPERATURE: f32 = 0.2;

/// Slides sent per scoring request.
pub const SCORE_BATCH_SIZE: usize = 3;

const SCORE_INSTRUCTION: &str =
    "Rate each slide from 1 to 10 for importance. Respond with comma-separated numbers only.";

/// Ask for `slide_count` slides based on the template's text and an
/// optional topic.
pub fn outline_prompt(template: &Template, topic: Option<&str>, slide_count: usize) -> Prompt {
    let mut text = format!(
        "Write the content of a presentation with exactly {} slides.\n\
         Use this format and nothing else:\n\
         Slide 1: <title>\n\
         - <bullet point>\n\
         - <bullet point>\n\n\
         Keep titles under 60 characters and bullet points under 90 characters.\n",
        slide_count
    );

    if let Some(topic) = topic.map(str::trim).filter(|t| !t.is_empty()) {
        text.push_str(&format!("\nTopic: {}\n", topic));
    }

    if template.slide_count() > 0 {
        text.push_str("\nThe existing slides of the template read:\n\n");
        let existing: Vec<String> = template
            .slides()
            .iter()
            .map(|slide| format!("Slide {}: {}", slide.index + 1, slide.text()))
            .collect();
        text.push_str(&existing.join("\n\n"));
        text.push('\n');
    }

    Prompt::new(text, OUTLINE_TEMPERATURE)
}

/// Ask for one importance score per slide of `batch`; `first_number` is the
/// 1-based position of the batch's first slide in the deck.
pub fn score_prompt(batch: &[OutlineSlide], first_number: usize) -> Prompt {
    let slides: Vec<String> = batch
        .iter()
        .enumerate()
        .map(|(j, slide)| format!("Slide {}: {}", first_number + j, slide.plain_text()))
        .collect();
    Prompt::new(
        format!("{}\n\n{}", SCORE_INSTRUCTION, slides.join("\n\n")),
        SCORE_TEMPERATURE,
    )
}
