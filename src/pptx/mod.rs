//! PresentationML (.pptx) reading and writing.
//!
//! [`Template`] is the read-only view of the input package; [`Deck`] adds
//! generated slides ([`SlideBuilder`]) on top of it and writes the result.

mod deck;
pub mod package;
mod slide;
mod template;

pub use deck::Deck;
pub use slide::{Frame, SlideBuilder, EMU_PER_INCH};
pub use template::{SlideLayout, SlideSize, Template, TemplateSlide, NO_TEXT};
