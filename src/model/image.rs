//! Downloaded image model.

use ::image::ImageReader;
use serde::Serialize;
use std::io::Cursor;

/// Raster formats that can be embedded into a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG / JFIF
    Jpeg,
    /// Graphics Interchange Format
    Gif,
}

impl ImageFormat {
    /// Sniff the format from the leading magic bytes.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    /// Determine the format from a MIME type.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().split(';').next().map(str::trim) {
            Some("image/png") => Some(ImageFormat::Png),
            Some("image/jpeg") | Some("image/jpg") => Some(ImageFormat::Jpeg),
            Some("image/gif") => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// File extension used for the media part.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    /// MIME type, also used as the package content type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

/// One image fetched for one slide.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRef {
    /// Keyword query that found the image
    pub query: String,

    /// Source URL the bytes were downloaded from
    pub url: String,

    /// Image bytes
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Sniffed format
    pub format: ImageFormat,

    /// Photographer credit, when the service reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

impl ImageRef {
    /// Create an image reference, sniffing the format from the bytes.
    ///
    /// Returns `None` when the bytes are not a supported raster image.
    pub fn new(query: impl Into<String>, url: impl Into<String>, data: Vec<u8>) -> Option<Self> {
        let format = ImageFormat::from_bytes(&data)?;
        Some(Self {
            query: query.into(),
            url: url.into(),
            data,
            format,
            attribution: None,
        })
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Pixel dimensions read from the image header, if it decodes.
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        ImageReader::new(Cursor::new(&self.data))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}
