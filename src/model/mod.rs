//! Data carried between the pipeline stages.
//!
//! The text service produces a [`SlideOutline`], the image service one
//! [`ImageRef`] per slide; the slide populator consumes both.

mod image;
mod outline;

pub use image::*;
pub use outline::*;
