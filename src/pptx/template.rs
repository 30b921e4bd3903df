//! Template loader: read-only view over the input presentation.

use crate::container::{OoxmlContainer, Relationships, REL_TYPE_SLIDE};
use crate::detect::{detect_presentation_from_bytes, PresentationKind};
use crate::error::{Error, Result};
use crate::model::SlideKind;
use std::path::Path;

/// Relationship type of the main document part.
const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Text reported for slides without any text.
pub const NO_TEXT: &str = "No text content";

/// Slide size in EMU (914400 per inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    /// Width in EMU
    pub cx: i64,
    /// Height in EMU
    pub cy: i64,
}

impl Default for SlideSize {
    /// 10" x 7.5", the 4:3 default.
    fn default() -> Self {
        Self {
            cx: 9_144_000,
            cy: 6_858_000,
        }
    }
}

/// A slide of the template.
#[derive(Debug, Clone)]
pub struct TemplateSlide {
    /// Zero-based position in the deck
    pub index: usize,
    /// `p:sldId/@id`
    pub id: u32,
    /// Part path inside the package, e.g. `ppt/slides/slide1.xml`
    pub part: String,
    /// Text of the title placeholder, if any
    pub title: Option<String>,
    /// Text of every paragraph in the slide's shapes
    pub paragraphs: Vec<String>,
}

impl TemplateSlide {
    /// All paragraphs joined by newlines, or [`NO_TEXT`] for empty slides.
    pub fn text(&self) -> String {
        if self.paragraphs.is_empty() {
            NO_TEXT.to_string()
        } else {
            self.paragraphs.join("\n")
        }
    }
}

/// A slide layout that new slides can be based on.
#[derive(Debug, Clone, Default)]
pub struct SlideLayout {
    /// Part path, e.g. `ppt/slideLayouts/slideLayout2.xml`
    pub part: String,
    /// `p:sldLayout/@type` (`title`, `obj`, `blank`, ...)
    pub layout_type: Option<String>,
    /// `p:cSld/@name`
    pub name: Option<String>,
    /// Placeholder type of the title (`title` or `ctrTitle`)
    pub title_type: Option<String>,
    /// Index of the first body/object placeholder
    pub body_idx: Option<u32>,
}

impl SlideLayout {
    /// Whether the layout has a title placeholder.
    pub fn has_title(&self) -> bool {
        self.title_type.is_some()
    }

    /// Whether the layout has a body placeholder.
    pub fn has_body(&self) -> bool {
        self.body_idx.is_some()
    }

    fn is_type(&self, wanted: &str) -> bool {
        self.layout_type.as_deref() == Some(wanted)
    }
}

/// A loaded presentation template.
pub struct Template {
    container: OoxmlContainer,
    kind: PresentationKind,
    presentation_part: String,
    presentation_rels: Relationships,
    slides: Vec<TemplateSlide>,
    layouts: Vec<SlideLayout>,
    slide_size: SlideSize,
}

impl Template {
    /// Open a template file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deckfill::pptx::Template;
    ///
    /// let template = Template::open("template.pptx")?;
    /// println!("{} slides, {} layouts", template.slide_count(), template.layouts().len());
    /// # Ok::<(), deckfill::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::TemplateNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Load a template from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let kind = detect_presentation_from_bytes(&data)?;
        let container = OoxmlContainer::from_bytes(data)?;

        let presentation_part = Self::find_presentation_part(&container)?;
        let presentation_rels = container.read_relationships(&presentation_part)?;

        let xml = container.read_xml(&presentation_part)?;
        let (slide_refs, slide_size) = Self::parse_presentation(&xml)?;

        let mut slides = Vec::with_capacity(slide_refs.len());
        for (index, (id, rel_id)) in slide_refs.into_iter().enumerate() {
            let rel = presentation_rels.get(&rel_id).ok_or_else(|| {
                Error::InvalidData(format!("slide relationship {} not found", rel_id))
            })?;
            let part = OoxmlContainer::resolve_path(&presentation_part, &rel.target);
            let slide_xml = container.read_xml(&part)?;
            let (title, paragraphs) = Self::parse_slide_text(&slide_xml)?;
            slides.push(TemplateSlide {
                index,
                id,
                part,
                title,
                paragraphs,
            });
        }

        let layouts = Self::parse_layouts(&container, &presentation_part)?;
        if layouts.is_empty() {
            return Err(Error::MissingComponent("slide layouts".to_string()));
        }

        log::debug!(
            "loaded {} template: {} slides, {} layouts, {}x{} EMU",
            kind,
            slides.len(),
            layouts.len(),
            slide_size.cx,
            slide_size.cy
        );

        Ok(Self {
            container,
            kind,
            presentation_part,
            presentation_rels,
            slides,
            layouts,
            slide_size,
        })
    }

    /// Locate the main presentation part through the package relationships.
    fn find_presentation_part(container: &OoxmlContainer) -> Result<String> {
        let rels = container.read_package_relationships()?;
        let part = rels
            .get_by_type(REL_TYPE_OFFICE_DOCUMENT)
            .first()
            .map(|rel| OoxmlContainer::resolve_path("", &rel.target))
            .unwrap_or_else(|| "ppt/presentation.xml".to_string());

        if container.exists(&part) {
            Ok(part)
        } else {
            Err(Error::MissingComponent(part))
        }
    }

    /// Parse presentation.xml for slide references and slide size.
    fn parse_presentation(xml: &str) -> Result<(Vec<(u32, String)>, SlideSize)> {
        let mut slides = Vec::new();
        let mut size = SlideSize::default();

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e)) => {
                    let name = e.name();
                    match name.local_name().as_ref() {
                        // p:sldId - slide reference
                        b"sldId" => {
                            let mut id = 0u32;
                            let mut rel_id = String::new();

                            for attr in e.attributes().flatten() {
                                let key = attr.key;
                                if key.as_ref() == b"id" {
                                    id = String::from_utf8_lossy(&attr.value).parse().unwrap_or(0);
                                } else if key.local_name().as_ref() == b"id" {
                                    // r:id
                                    rel_id = String::from_utf8_lossy(&attr.value).to_string();
                                }
                            }

                            if !rel_id.is_empty() {
                                slides.push((id, rel_id));
                            }
                        }
                        // p:sldSz - slide size
                        b"sldSz" => {
                            for attr in e.attributes().flatten() {
                                let value = String::from_utf8_lossy(&attr.value);
                                match attr.key.as_ref() {
                                    b"cx" => size.cx = value.parse().unwrap_or(size.cx),
                                    b"cy" => size.cy = value.parse().unwrap_or(size.cy),
                                    _ => {}
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok((slides, size))
    }

    /// Extract the title placeholder text and all shape paragraphs of a slide.
    ///
    /// Text lives in `p:sp/p:txBody/a:p/a:r/a:t`; table cells and pictures
    /// are ignored.
    fn parse_slide_text(xml: &str) -> Result<(Option<String>, Vec<String>)> {
        let mut title = None;
        let mut paragraphs = Vec::new();

        let mut reader = quick_xml::Reader::from_str(xml);
        // Keep whitespace inside a:t runs
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut in_shape = false;
        let mut in_txbody = false;
        let mut in_text = false;
        let mut is_title_shape = false;
        let mut shape_paragraphs: Vec<String> = Vec::new();
        let mut current = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().local_name().as_ref() {
                    b"sp" => {
                        in_shape = true;
                        is_title_shape = false;
                        shape_paragraphs.clear();
                    }
                    b"txBody" if in_shape => in_txbody = true,
                    b"p" if in_txbody => current.clear(),
                    b"t" if in_txbody => in_text = true,
                    b"ph" if in_shape => is_title_shape |= Self::is_title_placeholder(e),
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().local_name().as_ref() {
                    b"ph" if in_shape => is_title_shape |= Self::is_title_placeholder(e),
                    b"br" if in_txbody => current.push(' '),
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_text {
                        let text = e.unescape().unwrap_or_default();
                        current.push_str(&text);
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().local_name().as_ref() {
                    b"t" => in_text = false,
                    b"p" if in_txbody => {
                        let text = current.trim();
                        if !text.is_empty() {
                            shape_paragraphs.push(text.to_string());
                        }
                        current.clear();
                    }
                    b"txBody" => in_txbody = false,
                    b"sp" => {
                        if is_title_shape && title.is_none() && !shape_paragraphs.is_empty() {
                            title = Some(shape_paragraphs.join(" "));
                        }
                        paragraphs.append(&mut shape_paragraphs);
                        in_shape = false;
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok((title, paragraphs))
    }

    fn is_title_placeholder(e: &quick_xml::events::BytesStart<'_>) -> bool {
        e.attributes().flatten().any(|attr| {
            attr.key.local_name().as_ref() == b"type"
                && matches!(attr.value.as_ref(), b"title" | b"ctrTitle")
        })
    }

    /// Parse every slide layout part, ordered by its number.
    fn parse_layouts(container: &OoxmlContainer, presentation_part: &str) -> Result<Vec<SlideLayout>> {
        let dir = OoxmlContainer::resolve_path(presentation_part, "slideLayouts/");
        let prefix = format!("{}/", dir.trim_end_matches('/'));

        let mut parts: Vec<(u32, String)> = container
            .list_files_with_prefix(&prefix)
            .into_iter()
            .filter(|name| name.ends_with(".xml") && !name[prefix.len()..].contains('/'))
            .map(|name| (Self::part_number(&name), name))
            .collect();
        parts.sort();

        let mut layouts = Vec::with_capacity(parts.len());
        for (_, part) in parts {
            let xml = container.read_xml(&part)?;
            let mut layout = Self::parse_layout(&xml)?;
            layout.part = part;
            layouts.push(layout);
        }
        Ok(layouts)
    }

    /// Parse a slide layout part for its type, name and placeholders.
    fn parse_layout(xml: &str) -> Result<SlideLayout> {
        let mut layout = SlideLayout::default();

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(ref e)) | Ok(quick_xml::events::Event::Start(ref e)) => {
                    match e.name().local_name().as_ref() {
                        b"sldLayout" => {
                            layout.layout_type = Self::attr(e, b"type");
                        }
                        b"cSld" => {
                            layout.name = Self::attr(e, b"name");
                        }
                        b"ph" => {
                            let ph_type = Self::attr(e, b"type");
                            let idx = Self::attr(e, b"idx").and_then(|v| v.parse::<u32>().ok());
                            match ph_type.as_deref() {
                                Some("title") | Some("ctrTitle") => {
                                    if layout.title_type.is_none() {
                                        layout.title_type = ph_type;
                                    }
                                }
                                None | Some("body") | Some("obj") => {
                                    if let Some(idx) = idx {
                                        if layout.body_idx.is_none_or(|current| idx < current) {
                                            layout.body_idx = Some(idx);
                                        }
                                    }
                                }
                                _ => {}
                            }
                        }
                        _ => {}
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(layout)
    }

    fn attr(e: &quick_xml::events::BytesStart<'_>, local: &[u8]) -> Option<String> {
        e.attributes()
            .flatten()
            .find(|a| a.key.local_name().as_ref() == local)
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Trailing number of a part name: `slideLayout12.xml` -> 12.
    pub(crate) fn part_number(part: &str) -> u32 {
        let stem = part
            .rsplit('/')
            .next()
            .unwrap_or(part)
            .trim_end_matches(".xml");
        let digits: String = stem
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        digits.parse().unwrap_or(0)
    }

    /// Pick the layout to base a slide of the given kind on.
    pub fn layout_for(&self, kind: SlideKind) -> &SlideLayout {
        let by_type = |wanted: &str| self.layouts.iter().find(|l| l.is_type(wanted));

        let preferred = match kind {
            SlideKind::Title => by_type("title").or_else(|| by_type("obj")),
            SlideKind::Body | SlideKind::Bullets => by_type("obj")
                .or_else(|| by_type("txAndObj"))
                .or_else(|| by_type("twoObj")),
            SlideKind::Table => by_type("titleOnly").or_else(|| by_type("obj")),
        };

        preferred
            .or_else(|| self.layouts.iter().find(|l| l.has_title() && l.has_body()))
            .or_else(|| self.layouts.iter().find(|l| l.has_title()))
            .unwrap_or(&self.layouts[0])
    }

    /// Package flavour of the template.
    pub fn kind(&self) -> PresentationKind {
        self.kind
    }

    /// Underlying package.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Path of the main presentation part.
    pub fn presentation_part(&self) -> &str {
        &self.presentation_part
    }

    /// Relationships of the main presentation part.
    pub fn presentation_relationships(&self) -> &Relationships {
        &self.presentation_rels
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[TemplateSlide] {
        &self.slides
    }

    /// Number of slides in the template.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide layouts, ordered by part number.
    pub fn layouts(&self) -> &[SlideLayout] {
        &self.layouts
    }

    /// Slide size in EMU.
    pub fn slide_size(&self) -> SlideSize {
        self.slide_size
    }

    /// Part paths of every slide the presentation references.
    pub fn slide_parts(&self) -> Vec<String> {
        self.presentation_rels
            .get_by_type(REL_TYPE_SLIDE)
            .into_iter()
            .map(|rel| OoxmlContainer::resolve_path(&self.presentation_part, &rel.target))
            .collect()
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("kind", &self.kind)
            .field("slides", &self.slides.len())
            .field("layouts", &self.layouts.len())
            .field("slide_size", &self.slide_size)
            .finish()
    }
}
