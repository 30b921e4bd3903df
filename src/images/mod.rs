//! Image requester: one keyword search per slide.

mod unsplash;

pub use unsplash::UnsplashClient;

use crate::error::Result;
use crate::model::{ImageRef, OutlineSlide, SlideOutline};

/// Query used when a slide yields no usable keywords.
pub const FALLBACK_QUERY: &str = "presentation";

/// Most words sent in one query.
const MAX_QUERY_WORDS: usize = 6;

/// Titles with fewer keywords than this are topped up from the bullets.
const MIN_TITLE_WORDS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "how", "in", "into", "is",
    "it", "its", "of", "on", "or", "our", "that", "the", "their", "this", "to", "vs", "was",
    "we", "what", "when", "why", "with", "you", "your",
];

/// Port for image search services.
pub trait ImageSearch {
    /// Find and download one image for `query`; `Ok(None)` when nothing matches.
    fn find(&self, query: &str) -> Result<Option<ImageRef>>;
}

/// Build the search keywords for a slide.
pub fn keyword_query(slide: &OutlineSlide) -> String {
    let mut words = keywords(&slide.title);
    if words.len() < MIN_TITLE_WORDS {
        for bullet in &slide.bullets {
            for word in keywords(bullet) {
                if !words.contains(&word) {
                    words.push(word);
                }
            }
            if words.len() >= MAX_QUERY_WORDS {
                break;
            }
        }
    }
    words.truncate(MAX_QUERY_WORDS);

    if words.is_empty() {
        FALLBACK_QUERY.to_string()
    } else {
        words.join(" ")
    }
}

fn keywords(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(&w.as_str()))
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .collect()
}

/// Runs one search per outline slide.
pub struct ImageRequester<'a> {
    search: &'a dyn ImageSearch,
}

impl<'a> ImageRequester<'a> {
    pub fn new(search: &'a dyn ImageSearch) -> Self {
        Self { search }
    }

    /// Fetch one image per slide, in slide order.
    ///
    /// Slides without a match get `None`; any service failure aborts.
    pub fn request_images(&self, outline: &SlideOutline) -> Result<Vec<Option<ImageRef>>> {
        let mut images = Vec::with_capacity(outline.len());
        for (i, slide) in outline.iter().enumerate() {
            let query = keyword_query(slide);
            let image = self.search.find(&query)?;
            match &image {
                Some(found) => log::info!(
                    "slide {}: image for \"{}\" ({} bytes)",
                    i + 1,
                    query,
                    found.size()
                ),
                None => log::warn!("slide {}: no image found for \"{}\"", i + 1, query),
            }
            images.push(image);
        }
        Ok(images)
    }
}

impl std::fmt::Debug for ImageRequester<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageRequester").finish_non_exhaustive()
    }
}
