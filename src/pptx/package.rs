//! Package-level rewrites: `[Content_Types].xml`, `ppt/presentation.xml`
//! and the fixed ZIP entry options used for output.

use crate::container::escape_xml;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;

/// Content type of slide parts.
pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// Content type of relationship parts.
pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// Content type of a macro project part.
pub const CT_VBA_PROJECT: &str = "application/vnd.ms-office.vbaProject";

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// First id PowerPoint assigns to `p:sldId`.
pub const FIRST_SLIDE_ID: u32 = 256;

/// ZIP entry options for every written part.
///
/// The timestamp is fixed so identical input produces identical bytes.
pub fn entry_options() -> zip::write::SimpleFileOptions {
    zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct DefaultEntry {
    #[serde(rename = "@Extension")]
    extension: String,
    #[serde(rename = "@ContentType")]
    content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct OverrideEntry {
    #[serde(rename = "@PartName")]
    part_name: String,
    #[serde(rename = "@ContentType")]
    content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
enum Entry {
    Default(DefaultEntry),
    Override(OverrideEntry),
}

#[derive(Debug, Deserialize)]
struct TypesDocument {
    #[serde(rename = "$value", default)]
    entries: Vec<Entry>,
}

/// The `[Content_Types].xml` part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<DefaultEntry>,
    overrides: Vec<OverrideEntry>,
}

impl ContentTypes {
    /// Parse the content types part.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc: TypesDocument = quick_xml::de::from_str(xml)?;
        let mut types = Self::default();
        for entry in doc.entries {
            match entry {
                Entry::Default(d) => types.defaults.push(d),
                Entry::Override(o) => types.overrides.push(o),
            }
        }
        Ok(types)
    }

    /// Content type registered for a part, override first.
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        if let Some(content_type) = self.override_for(part) {
            return Some(content_type);
        }
        let ext = part.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults
            .iter()
            .find(|d| d.extension.eq_ignore_ascii_case(ext))
            .map(|d| d.content_type.as_str())
    }

    /// Content type of the `Override` for a part, ignoring defaults.
    pub fn override_for(&self, part: &str) -> Option<&str> {
        let part_name = part_name(part);
        self.overrides
            .iter()
            .find(|o| o.part_name == part_name)
            .map(|o| o.content_type.as_str())
    }

    /// Whether a `Default` exists for the extension.
    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults
            .iter()
            .any(|d| d.extension.eq_ignore_ascii_case(extension))
    }

    /// Register an extension unless it already is.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self.has_default(extension) {
            self.defaults.push(DefaultEntry {
                extension: extension.to_string(),
                content_type: content_type.to_string(),
            });
        }
    }

    /// Set the override for a part, replacing an existing one.
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part_name = part_name(part);
        match self.overrides.iter_mut().find(|o| o.part_name == part_name) {
            Some(existing) => existing.content_type = content_type.to_string(),
            None => self.overrides.push(OverrideEntry {
                part_name,
                content_type: content_type.to_string(),
            }),
        }
    }

    /// Drop the overrides of every part matched by `removed`.
    pub fn remove_overrides<F: Fn(&str) -> bool>(&mut self, removed: F) {
        self.overrides
            .retain(|o| !removed(o.part_name.trim_start_matches('/')));
    }

    /// Drop every `Default` mapping an extension to `content_type`.
    pub fn remove_defaults_of_type(&mut self, content_type: &str) {
        self.defaults.retain(|d| d.content_type != content_type);
    }

    /// Number of overrides.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Serialize back to XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS));
        for d in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(&d.extension),
                escape_xml(&d.content_type)
            ));
        }
        for o in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(&o.part_name),
                escape_xml(&o.content_type)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

fn part_name(part: &str) -> String {
    format!("/{}", part.trim_start_matches('/'))
}

/// Rewrite `presentation.xml` so that its `p:sldIdLst` lists exactly
/// `slides` (`(id, relationship id)` pairs).
///
/// The rest of the document is streamed through unchanged. When the
/// document has no list yet it is inserted before `p:sldSz` (or
/// `p:notesSz`); an empty `slides` removes the list.
///
/// Slide sections (`p14:sectionLst`) are collapsed into the first section,
/// which then holds every slide.
pub fn rewrite_presentation(xml: &str, slides: &[(u32, String)]) -> Result<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = quick_xml::Writer::new(Vec::with_capacity(xml.len() + 64 * slides.len()));

    let mut p_prefix = String::from("p");
    let mut r_prefix = String::from("r");
    let mut list_tag = String::from("p:sldIdLst");
    let mut seen_root = false;
    let mut written = false;
    let mut skip_depth = 0usize;
    let mut sections = Sections::default();

    loop {
        let event = match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => event,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        };

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                _ => {}
            }
            continue;
        }

        match &event {
            Event::Start(e) | Event::Empty(e) if !seen_root => {
                seen_root = true;
                (p_prefix, r_prefix) = namespace_prefixes(e, &p_prefix, &r_prefix);
                list_tag = format!("{}:sldIdLst", p_prefix);
            }
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == list_tag.as_bytes() => {
                if !written {
                    write_slide_list(writer.get_mut(), &p_prefix, &r_prefix, slides);
                    written = true;
                }
                if matches!(event, Event::Start(_)) {
                    skip_depth = 1;
                }
                continue;
            }
            Event::Start(e) | Event::Empty(e)
                if !written && matches!(e.local_name().as_ref(), b"sldSz" | b"notesSz") =>
            {
                write_slide_list(writer.get_mut(), &p_prefix, &r_prefix, slides);
                written = true;
            }
            Event::Start(e) if e.local_name().as_ref() == b"sectionLst" => {
                sections = Sections {
                    open: true,
                    ..Sections::default()
                };
            }
            Event::End(e) if e.local_name().as_ref() == b"sectionLst" => sections.open = false,
            Event::Start(e) | Event::Empty(e)
                if sections.open && e.local_name().as_ref() == b"section" =>
            {
                sections.seen += 1;
                if sections.seen > 1 {
                    if matches!(event, Event::Start(_)) {
                        skip_depth = 1;
                    }
                    continue;
                }
                sections.prefix = element_prefix(e);
                if let Event::Empty(e) = &event {
                    writer.write_event(Event::Start(e.borrow()))?;
                    write_section_ids(writer.get_mut(), &sections.prefix, slides);
                    sections.ids_written = true;
                    writer.write_event(Event::End(e.to_end()))?;
                    continue;
                }
            }
            Event::Start(e) | Event::Empty(e)
                if sections.open && e.local_name().as_ref() == b"sldIdLst" =>
            {
                if !sections.ids_written {
                    write_section_ids(writer.get_mut(), &sections.prefix, slides);
                    sections.ids_written = true;
                }
                if matches!(event, Event::Start(_)) {
                    skip_depth = 1;
                }
                continue;
            }
            Event::End(e)
                if sections.open
                    && !sections.ids_written
                    && e.local_name().as_ref() == b"section" =>
            {
                write_section_ids(writer.get_mut(), &sections.prefix, slides);
                sections.ids_written = true;
            }
            _ => {}
        }

        writer.write_event(event)?;
    }

    if !written && !slides.is_empty() {
        return Err(Error::InvalidData(
            "presentation.xml has no place for a slide list".to_string(),
        ));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| Error::XmlParse(e.to_string()))
}

/// Progress through a `p14:sectionLst`.
#[derive(Debug, Default)]
struct Sections {
    open: bool,
    seen: usize,
    prefix: String,
    ids_written: bool,
}

fn element_prefix(e: &BytesStart<'_>) -> String {
    e.name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).to_string())
        .unwrap_or_default()
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn write_section_ids(out: &mut Vec<u8>, prefix: &str, slides: &[(u32, String)]) {
    let list = qualified(prefix, "sldIdLst");
    let item = qualified(prefix, "sldId");
    if slides.is_empty() {
        out.extend_from_slice(format!("<{}/>", list).as_bytes());
        return;
    }
    let mut xml = format!("<{}>", list);
    for (id, _) in slides {
        xml.push_str(&format!(r#"<{} id="{}"/>"#, item, id));
    }
    xml.push_str(&format!("</{}>", list));
    out.extend_from_slice(xml.as_bytes());
}

/// Prefixes bound to the presentation and relationship namespaces on the
/// root element.
fn namespace_prefixes(root: &BytesStart<'_>, p_default: &str, r_default: &str) -> (String, String) {
    let mut p_prefix = root
        .name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).to_string())
        .unwrap_or_else(|| p_default.to_string());
    let mut r_prefix = r_default.to_string();

    for attr in root.attributes().flatten() {
        let key = attr.key.as_ref();
        if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            if attr.value.as_ref() == RELATIONSHIPS_NS.as_bytes() {
                r_prefix = String::from_utf8_lossy(prefix).to_string();
            }
        }
    }
    if p_prefix.is_empty() {
        p_prefix = p_default.to_string();
    }
    (p_prefix, r_prefix)
}

fn write_slide_list(out: &mut Vec<u8>, p: &str, r: &str, slides: &[(u32, String)]) {
    if slides.is_empty() {
        return;
    }
    let mut list = format!("<{}:sldIdLst>", p);
    for (id, rel_id) in slides {
        list.push_str(&format!(
            r#"<{}:sldId id="{}" {}:id="{}"/>"#,
            p,
            id,
            r,
            escape_xml(rel_id)
        ));
    }
    list.push_str(&format!("</{}:sldIdLst>", p));
    out.extend_from_slice(list.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/><Default Extension="png" ContentType="image/png"/></Types>"#;

    const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/><p:defaultTextStyle><a:lvl1pPr algn="l">&amp;</a:lvl1pPr></p:defaultTextStyle></p:presentation>"#;

    #[test]
    fn test_content_types_parse_interleaved() {
        let types = ContentTypes::parse(TYPES).unwrap();
        assert_eq!(types.override_count(), 2);
        assert!(types.has_default("PNG"));
        assert_eq!(types.content_type_of("ppt/slides/slide1.xml"), Some(CT_SLIDE));
        assert_eq!(types.content_type_of("ppt/media/image1.png"), Some("image/png"));
        assert_eq!(types.content_type_of("ppt/media/image1.emf"), None);
    }

    #[test]
    fn test_content_types_edit_and_serialize() {
        let mut types = ContentTypes::parse(TYPES).unwrap();
        types.remove_overrides(|part| part.starts_with("ppt/slides/"));
        types.set_override("ppt/slides/slide1.xml", CT_SLIDE);
        types.set_override("ppt/slides/slide2.xml", CT_SLIDE);
        types.ensure_default("jpeg", "image/jpeg");
        types.ensure_default("png", "image/png");

        let xml = types.to_xml();
        assert_eq!(xml.matches(r#"Extension="png""#).count(), 1);
        assert!(xml.contains(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#));
        assert!(xml.contains(r#"PartName="/ppt/slides/slide2.xml""#));

        let reparsed = ContentTypes::parse(&xml).unwrap();
        assert_eq!(reparsed, types);
    }

    #[test]
    fn test_rewrite_replaces_slide_list() {
        let slides = vec![(256, "rId7".to_string())];
        let xml = rewrite_presentation(PRESENTATION, &slides).unwrap();

        assert!(xml.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId7"/></p:sldIdLst><p:sldSz"#));
        assert!(!xml.contains("rId3"));
        // Untouched content survives, escaped as before
        assert!(xml.contains(r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#));
        assert!(xml.contains("&amp;"));
        assert!(xml.contains(r#"saveSubsetFonts="1""#));
    }

    #[test]
    fn test_rewrite_inserts_missing_list() {
        let without = PRESENTATION.replace(
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst>"#,
            "",
        );
        let slides = vec![(256, "rId2".to_string()), (257, "rId3".to_string())];
        let xml = rewrite_presentation(&without, &slides).unwrap();
        let list = xml.find("<p:sldIdLst>").unwrap();
        assert!(list > xml.find("</p:sldMasterIdLst>").unwrap());
        assert!(list < xml.find("<p:sldSz").unwrap());
    }

    #[test]
    fn test_rewrite_removes_list_when_empty() {
        let xml = rewrite_presentation(PRESENTATION, &[]).unwrap();
        assert!(!xml.contains("sldIdLst"));
        assert!(xml.contains("<p:sldSz"));
    }

    const SECTIONS: &str = r#"<p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p14:section name="Intro" id="{1C6C1E80-0001-4B3A-9C1D-000000000001}"><p14:sldIdLst><p14:sldId id="256"/></p14:sldIdLst></p14:section><p14:section name="Details" id="{1C6C1E80-0002-4B3A-9C1D-000000000002}"><p14:sldIdLst><p14:sldId id="257"/></p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst>"#;

    fn with_sections(sections: &str) -> String {
        PRESENTATION.replace("</p:presentation>", &format!("{}</p:presentation>", sections))
    }

    #[test]
    fn test_rewrite_moves_slides_into_first_section() {
        let slides = vec![(256, "rId7".to_string()), (257, "rId8".to_string()), (258, "rId9".to_string())];
        let xml = rewrite_presentation(&with_sections(SECTIONS), &slides).unwrap();

        assert!(xml.contains(
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId7"/><p:sldId id="257" r:id="rId8"/><p:sldId id="258" r:id="rId9"/></p:sldIdLst><p:sldSz"#
        ));
        assert!(xml.contains(
            r#"<p14:section name="Intro" id="{1C6C1E80-0001-4B3A-9C1D-000000000001}"><p14:sldIdLst><p14:sldId id="256"/><p14:sldId id="257"/><p14:sldId id="258"/></p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst>"#
        ));
        assert!(!xml.contains("Details"));
    }

    #[test]
    fn test_rewrite_fills_empty_section() {
        let sections = r#"<p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p14:section name="Only" id="{A}"/></p14:sectionLst></p:ext></p:extLst>"#;
        let xml = rewrite_presentation(&with_sections(sections), &[(256, "rId2".to_string())]).unwrap();
        assert!(xml.contains(
            r#"<p14:section name="Only" id="{A}"><p14:sldIdLst><p14:sldId id="256"/></p14:sldIdLst></p14:section>"#
        ));

        let xml = rewrite_presentation(&with_sections(SECTIONS), &[]).unwrap();
        assert!(xml.contains(r#"<p14:sldIdLst/></p14:section></p14:sectionLst>"#));
        assert!(!xml.contains("<p:sldIdLst"));
    }

    #[test]
    fn test_override_for_ignores_defaults() {
        let mut types = ContentTypes::parse(TYPES).unwrap();
        assert_eq!(types.override_for("ppt/slides/slide1.xml"), Some(CT_SLIDE));
        assert_eq!(types.override_for("ppt/notesSlides/notesSlide1.xml"), None);
        assert_eq!(
            types.content_type_of("ppt/notesSlides/notesSlide1.xml"),
            Some("application/xml")
        );

        types.remove_defaults_of_type("image/png");
        assert!(!types.has_default("png"));
        assert!(types.has_default("xml"));
    }

    #[test]
    fn test_rewrite_uses_document_prefixes() {
        let xml = r#"<pml:presentation xmlns:pml="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><pml:sldSz cx="1" cy="1"/></pml:presentation>"#;
        let out = rewrite_presentation(xml, &[(256, "rId1".to_string())]).unwrap();
        assert!(out.contains(r#"<pml:sldIdLst><pml:sldId id="256" rel:id="rId1"/></pml:sldIdLst>"#));
    }
}
