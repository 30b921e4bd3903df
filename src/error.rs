//! Error types for the deckfill library.

use std::io;
use thiserror::Error;

/// Result type alias for deckfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Every error is terminal for a run; the kind only decides how it is
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing key, missing or unusable template, bad option value.
    Configuration,
    /// The text or image service failed or answered with garbage.
    ExternalService,
    /// Reading or writing local files failed.
    Io,
}

/// Errors that can occur while building a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required API key is not configured.
    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),

    /// The template file does not exist.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// An option value is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The file is not a PowerPoint presentation.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading or writing the ZIP container.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing or writing XML content.
    #[error("XML error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the template.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Transport-level HTTP failure (DNS, TLS, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// A service answered with a non-success status.
    #[error("{service} returned {status}: {body}")]
    Service {
        /// Service name, for messages
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// A service answered successfully but the payload is unusable.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl Error {
    /// Map the error into the flat configuration / service / I/O taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Http(_) | Error::Service { .. } | Error::MalformedResponse(_) => {
                ErrorKind::ExternalService
            }
            Error::MissingApiKey(_)
            | Error::TemplateNotFound(_)
            | Error::InvalidConfig(_)
            | Error::UnsupportedFormat(_)
            | Error::ZipArchive(_)
            | Error::XmlParse(_)
            | Error::InvalidData(_)
            | Error::MissingComponent(_) => ErrorKind::Configuration,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}
