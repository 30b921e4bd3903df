//! Slide outline produced by the text service.

use serde::{Deserialize, Serialize};

/// Title and bullets of one generated slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSlide {
    /// Slide title
    #[serde(default)]
    pub title: String,

    /// Bullet lines, in order
    #[serde(default, alias = "points", alias = "content")]
    pub bullets: Vec<String>,
}

impl OutlineSlide {
    /// Create a slide with a title and bullets.
    pub fn new<T, B>(title: T, bullets: B) -> Self
    where
        T: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            title: title.into(),
            bullets: bullets.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the slide carries neither a title nor bullets.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.bullets.iter().all(|b| b.trim().is_empty())
    }

    /// Title followed by bullets, one per line.
    pub fn plain_text(&self) -> String {
        let mut text = self.title.clone();
        for bullet in &self.bullets {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(bullet);
        }
        text
    }
}

/// How a slide is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    /// Title only (section header or cover)
    Title,
    /// Long prose paragraphs, no bullet glyphs
    Body,
    /// Title and bullet list
    Bullets,
    /// Title and a grid of cells split from `|` or tab separated bullets
    Table,
}

/// Ordered slides of a generated deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOutline {
    /// Slides in presentation order
    pub slides: Vec<OutlineSlide>,
}

impl SlideOutline {
    /// Create an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slide to the end of the outline.
    pub fn push(&mut self, slide: OutlineSlide) {
        self.slides.push(slide);
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the outline has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Iterate slides in order.
    pub fn iter(&self) -> std::slice::Iter<'_, OutlineSlide> {
        self.slides.iter()
    }

    /// Total number of bullets across all slides.
    pub fn bullet_count(&self) -> usize {
        self.slides.iter().map(|s| s.bullets.len()).sum()
    }
}

impl FromIterator<OutlineSlide> for SlideOutline {
    fn from_iter<I: IntoIterator<Item = OutlineSlide>>(iter: I) -> Self {
        Self {
            slides: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SlideOutline {
    type Item = OutlineSlide;
    type IntoIter = std::vec::IntoIter<OutlineSlide>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.into_iter()
    }
}

impl<'a> IntoIterator for &'a SlideOutline {
    type Item = &'a OutlineSlide;
    type IntoIter = std::slice::Iter<'a, OutlineSlide>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.iter()
    }
}
