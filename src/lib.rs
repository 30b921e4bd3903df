//! # deckfill
//!
//! Fill an existing PowerPoint template with AI-generated slides.
//!
//! A run reads the template, asks a generative text service for a slide
//! outline, optionally fetches one stock photo per slide, lays the slides
//! out on the template's own layouts and writes a new `.pptx`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use deckfill::{Config, Variant};
//!
//! let mut config = Config::from_env()?;
//! config.topic = Some("Renewable energy in 2030".to_string());
//!
//! let report = deckfill::run(&config, Variant::Enhanced)?;
//! println!("{} slides written to {}", report.slides, report.output.display());
//! # Ok::<(), deckfill::Error>(())
//! ```
//!
//! ## Variants
//!
//! - [`Variant::Trimmed`]: at most as many slides as the template, the most
//!   important ones, three short bullets each, no pictures.
//! - [`Variant::Enhanced`]: every generated slide and bullet plus a picture
//!   per slide.
//!
//! ## Services
//!
//! The text and image services sit behind the [`TextGenerator`] and
//! [`ImageSearch`] traits; [`pipeline::run_with`] accepts any implementation.

pub mod config;
pub mod container;
pub mod content;
pub mod detect;
pub mod error;
pub mod images;
pub mod model;
pub mod pipeline;
pub mod populate;
pub mod pptx;
pub mod variant;

#[cfg(test)]
mod testing;

// Re-exports
pub use config::Config;
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use content::{ContentRequester, OpenAiClient, Prompt, TextGenerator};
pub use detect::{detect_presentation_from_bytes, detect_presentation_from_path, PresentationKind};
pub use error::{Error, ErrorKind, Result};
pub use images::{ImageRequester, ImageSearch, UnsplashClient};
pub use model::{ImageFormat, ImageRef, OutlineSlide, SlideKind, SlideOutline};
pub use pipeline::{run, RunReport};
pub use populate::SlidePopulator;
pub use pptx::{Deck, SlideBuilder, Template};
pub use variant::{Variant, VariantPolicy};

use std::path::Path;

/// Extract the text of every slide of a presentation, in order.
///
/// Slides without text read `"No text content"`.
///
/// # Example
///
/// ```no_run
/// for (i, text) in deckfill::slide_texts("template.pptx")?.iter().enumerate() {
///     println!("Slide {}: {}", i + 1, text);
/// }
/// # Ok::<(), deckfill::Error>(())
/// ```
pub fn slide_texts(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let template = Template::open(path)?;
    Ok(template.slides().iter().map(|s| s.text()).collect())
}
