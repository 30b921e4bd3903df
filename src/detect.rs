//! Format detection for presentation packages.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content type for the main part of a .pptx presentation.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Content type for the main part of a .potx template.
pub const POTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

/// Content type for the main part of a macro-enabled .pptm presentation.
pub const PPTM_CONTENT_TYPE: &str =
    "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";

/// Flavour of PresentationML package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationKind {
    /// Regular presentation (.pptx)
    Presentation,
    /// Design template (.potx)
    Template,
    /// Macro-enabled presentation (.pptm)
    MacroEnabled,
}

impl PresentationKind {
    /// Returns the file extension for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            PresentationKind::Presentation => "pptx",
            PresentationKind::Template => "potx",
            PresentationKind::MacroEnabled => "pptm",
        }
    }

    /// Content type of the main presentation part.
    pub fn content_type(&self) -> &'static str {
        match self {
            PresentationKind::Presentation => PPTX_CONTENT_TYPE,
            PresentationKind::Template => POTX_CONTENT_TYPE,
            PresentationKind::MacroEnabled => PPTM_CONTENT_TYPE,
        }
    }
}

impl std::fmt::Display for PresentationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PresentationKind::Presentation => "PowerPoint Presentation",
            PresentationKind::Template => "PowerPoint Template",
            PresentationKind::MacroEnabled => "PowerPoint Macro-Enabled Presentation",
        };
        f.write_str(name)
    }
}

/// Detect the presentation kind of a file.
///
/// # Example
///
/// ```no_run
/// use deckfill::detect::detect_presentation_from_path;
///
/// let kind = detect_presentation_from_path("template.pptx")?;
/// println!("Detected: {}", kind);
/// # Ok::<(), deckfill::Error>(())
/// ```
pub fn detect_presentation_from_path(path: impl AsRef<Path>) -> Result<PresentationKind> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    detect_presentation_from_reader(reader)
}

/// Detect the presentation kind of an in-memory package.
pub fn detect_presentation_from_bytes(data: &[u8]) -> Result<PresentationKind> {
    if !is_zip_file(data) {
        return Err(Error::UnsupportedFormat(
            "not a ZIP-based Office package".to_string(),
        ));
    }

    let cursor = std::io::Cursor::new(data);
    detect_presentation_from_reader(cursor)
}

/// Detect the presentation kind from a reader.
pub fn detect_presentation_from_reader<R: Read + Seek>(reader: R) -> Result<PresentationKind> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => {
            return Err(Error::MissingComponent("[Content_Types].xml".to_string()));
        }
    };

    if content_types.contains(PPTX_CONTENT_TYPE) {
        Ok(PresentationKind::Presentation)
    } else if content_types.contains(POTX_CONTENT_TYPE) {
        Ok(PresentationKind::Template)
    } else if content_types.contains(PPTM_CONTENT_TYPE) {
        Ok(PresentationKind::MacroEnabled)
    } else if content_types.contains("wordprocessingml") {
        Err(Error::UnsupportedFormat("Word document".to_string()))
    } else if content_types.contains("spreadsheetml") {
        Err(Error::UnsupportedFormat("Excel workbook".to_string()))
    } else {
        detect_by_folder_structure(&mut archive)
    }
}

/// Fallback detection by checking folder structure.
fn detect_by_folder_structure<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<PresentationKind> {
    if archive.file_names().any(|n| n == "ppt/presentation.xml") {
        Ok(PresentationKind::Presentation)
    } else {
        Err(Error::UnsupportedFormat(
            "package has no presentation part".to_string(),
        ))
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}
