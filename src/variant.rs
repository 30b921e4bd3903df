//! Trimmed and enhanced output modes.

use crate::model::{OutlineSlide, SlideOutline};
use crate::populate::layout::truncate;

/// Slides scoring at or above this are kept by the trimmed variant.
pub const DEFAULT_SCORE_THRESHOLD: u8 = 6;

/// Output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Short preview deck: fewer slides and bullets, no pictures.
    Trimmed,
    /// Full deck with a cover and one picture per slide.
    Enhanced,
}

/// What a variant keeps and adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPolicy {
    /// Bullets kept per slide
    pub max_bullets: Option<usize>,
    /// Display columns a bullet is truncated to
    pub max_bullet_cols: Option<usize>,
    /// Whether one picture is added per slide
    pub images: bool,
    /// Whether slides are scored for importance and filtered
    pub score_slides: bool,
    /// Whether the slide count is capped to the template's
    pub cap_to_template: bool,
    /// Whether the deck opens with a cover slide
    pub cover_slide: bool,
}

impl Variant {
    /// The rules this variant applies.
    pub fn policy(&self) -> VariantPolicy {
        match self {
            Variant::Trimmed => VariantPolicy {
                max_bullets: Some(3),
                max_bullet_cols: Some(90),
                images: false,
                score_slides: true,
                cap_to_template: true,
                cover_slide: false,
            },
            Variant::Enhanced => VariantPolicy {
                max_bullets: None,
                max_bullet_cols: None,
                images: true,
                score_slides: false,
                cap_to_template: false,
                cover_slide: true,
            },
        }
    }

    /// Lowercase name, also the output file suffix.
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Trimmed => "trimmed",
            Variant::Enhanced => "enhanced",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl VariantPolicy {
    /// Apply the bullet cap and truncation to every slide.
    pub fn apply(&self, outline: SlideOutline) -> SlideOutline {
        outline
            .into_iter()
            .map(|slide| self.apply_slide(slide))
            .collect()
    }

    fn apply_slide(&self, mut slide: OutlineSlide) -> OutlineSlide {
        if let Some(max) = self.max_bullets {
            slide.bullets.truncate(max);
        }
        if let Some(cols) = self.max_bullet_cols {
            for bullet in &mut slide.bullets {
                *bullet = truncate(bullet, cols);
            }
        }
        slide
    }
}

/// Keep the slides whose score reaches `threshold`, in their original order.
///
/// When no slide qualifies every slide is kept. When more than `cap` remain,
/// the `cap` highest scores win (earlier slides win ties). Missing scores
/// count as qualifying.
pub fn select_by_scores(
    outline: SlideOutline,
    scores: &[u8],
    threshold: u8,
    cap: Option<usize>,
) -> SlideOutline {
    let score_of = |i: usize| scores.get(i).copied().unwrap_or(threshold);

    let mut kept: Vec<usize> = (0..outline.len()).filter(|&i| score_of(i) >= threshold).collect();
    if kept.is_empty() {
        log::info!("no slide scored {} or more, keeping all", threshold);
        kept = (0..outline.len()).collect();
    }

    if let Some(cap) = cap {
        if kept.len() > cap {
            // Stable sort keeps position order among equal scores
            kept.sort_by(|a, b| score_of(*b).cmp(&score_of(*a)));
            kept.truncate(cap);
            kept.sort_unstable();
        }
    }

    let mut slides: Vec<Option<OutlineSlide>> = outline.into_iter().map(Some).collect();
    kept.into_iter()
        .filter_map(|i| slides.get_mut(i).and_then(Option::take))
        .collect()
}
