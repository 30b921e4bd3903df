//! ZIP container abstraction for OOXML packages.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

/// Relationship type of a slide part.
pub const REL_TYPE_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// Relationship type of a slide layout part.
pub const REL_TYPE_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

/// Relationship type of an image part.
pub const REL_TYPE_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Relationship type of a notes slide part.
pub const REL_TYPE_NOTES_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";

/// Relationship type of the macro project of a .pptm package.
pub const REL_TYPE_VBA_PROJECT: &str =
    "http://schemas.microsoft.com/office/2006/relationships/vbaProject";

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Relationships parsed from a .rels file, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Get relationships by type.
    pub fn get_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.entries
            .iter()
            .filter(|r| r.rel_type == rel_type)
            .collect()
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.entries.push(rel);
    }

    /// Add an internal relationship with the next free ID and return the ID.
    pub fn add_internal(&mut self, rel_type: &str, target: impl Into<String>) -> String {
        let id = self.next_id();
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.into(),
            external: false,
        });
        id
    }

    /// Remove every relationship of the given type, returning the removed entries.
    pub fn remove_by_type(&mut self, rel_type: &str) -> Vec<Relationship> {
        let (removed, kept) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|r| r.rel_type == rel_type);
        self.entries = kept;
        removed
    }

    /// The next unused `rIdN` identifier.
    pub fn next_id(&self) -> String {
        let max = self
            .entries
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    /// Iterate relationships in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the content of a .rels part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut rels = Relationships::new();
        if content.trim().is_empty() {
            return Ok(rels);
        }

        let mut reader = quick_xml::Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                    if e.name().local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut rel_type = String::new();
                    let mut target = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Type" => rel_type = value,
                            b"Target" => target = value,
                            b"TargetMode" => external = value.eq_ignore_ascii_case("external"),
                            _ => {}
                        }
                    }

                    if !id.is_empty() {
                        rels.add(Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        });
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Serialize back into a .rels part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.entries.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.entries {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Escape XML special characters for text and attribute values.
pub fn escape_xml(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// After decoding UTF-16 XML into a Rust `String`, the declaration still
/// claims UTF-16 and quick-xml would try to decode it a second time.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
///
/// Templates saved by PowerPoint are UTF-8, but packages produced by other
/// tools occasionally carry UTF-16 parts.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }

    if bytes.starts_with(&[0xFF, 0xFE]) {
        let content = decode_utf16(&bytes[2..], u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        let content = decode_utf16(&bytes[2..], u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // No BOM: ASCII markup in UTF-16 leaves NUL in every other byte
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16(bytes, u16::from_le_bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16(bytes, u16::from_be_bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// OOXML container abstraction over a ZIP archive.
///
/// Provides methods to read XML parts, binary parts and relationships, and
/// to copy untouched parts into a new package.
pub struct OoxmlContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deckfill::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("template.pptx")?;
    /// # Ok::<(), deckfill::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create an OOXML container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create an OOXML container from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Read an XML part from the archive as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read_binary(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a binary part from the archive.
    pub fn read_binary(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let found = archive.file_names().any(|n| n == path);
        found
    }

    /// List all parts in archive order.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// List parts matching a prefix.
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        let archive = self.archive.borrow();
        archive
            .file_names()
            .filter(|n| n.starts_with(prefix))
            .map(String::from)
            .collect()
    }

    /// Read and parse the relationships of a part.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        match self.read_xml(&Self::rels_path_for(part_path)) {
            Ok(content) => Relationships::parse(&content),
            Err(Error::MissingComponent(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Read package-level relationships (_rels/.rels).
    pub fn read_package_relationships(&self) -> Result<Relationships> {
        self.read_relationships("")
    }

    /// Copy every part for which `keep` returns true into `writer`, in
    /// archive order, without recompressing.
    pub fn copy_parts_into<W, F>(&self, writer: &mut zip::ZipWriter<W>, keep: F) -> Result<usize>
    where
        W: Write + Seek,
        F: Fn(&str) -> bool,
    {
        let mut archive = self.archive.borrow_mut();
        let mut copied = 0;
        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            if file.is_dir() || !keep(file.name()) {
                continue;
            }
            writer.raw_copy_file(file)?;
            copied += 1;
        }
        Ok(copied)
    }

    /// Path of the .rels part belonging to `part_path`.
    ///
    /// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
    pub fn rels_path_for(part_path: &str) -> String {
        if part_path.is_empty() || part_path == "/" {
            return "_rels/.rels".to_string();
        }
        match part_path.rfind('/') {
            Some(last_slash) => format!(
                "{}/_rels/{}.rels",
                &part_path[..last_slash],
                &part_path[last_slash + 1..]
            ),
            None => format!("_rels/{}.rels", part_path),
        }
    }

    /// Resolve a relative path from a base path.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let base_path = Path::new(base);
        let base_dir = base_path.parent().unwrap_or(Path::new(""));

        let mut result = base_dir.to_path_buf();
        for component in Path::new(relative).components() {
            match component {
                std::path::Component::ParentDir => {
                    result.pop();
                }
                std::path::Component::Normal(c) => {
                    result.push(c);
                }
                _ => {}
            }
        }

        result.to_string_lossy().replace('\\', "/")
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.list_files().len())
            .finish()
    }
}
