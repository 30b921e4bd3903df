//! Output deck built on top of a template.

use super::package::{
    entry_options, rewrite_presentation, ContentTypes, CT_RELATIONSHIPS, CT_SLIDE, CT_VBA_PROJECT,
    FIRST_SLIDE_ID,
};
use super::slide::SlideBuilder;
use super::template::Template;
use crate::container::{
    OoxmlContainer, Relationships, REL_TYPE_IMAGE, REL_TYPE_NOTES_SLIDE, REL_TYPE_SLIDE,
    REL_TYPE_SLIDE_LAYOUT, REL_TYPE_VBA_PROJECT,
};
use crate::detect::PresentationKind;
use crate::error::Result;
use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::Path;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// A presentation made of the template's masters, layouts and theme plus
/// newly generated slides.
///
/// The template's own slides (and their notes) are not carried over. The
/// output is always a plain presentation: a `.potx` main part is retyped
/// and the macro project of a `.pptm` is dropped.
pub struct Deck<'t> {
    template: &'t Template,
    slides: Vec<SlideBuilder>,
}

impl<'t> Deck<'t> {
    /// Start an empty deck from a template.
    pub fn from_template(template: &'t Template) -> Self {
        Self {
            template,
            slides: Vec::new(),
        }
    }

    /// Template the deck is based on.
    pub fn template(&self) -> &'t Template {
        self.template
    }

    /// Append a slide.
    pub fn push_slide(&mut self, slide: SlideBuilder) {
        self.slides.push(slide);
    }

    /// Number of slides added so far.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides added so far.
    pub fn slides(&self) -> &[SlideBuilder] {
        &self.slides
    }

    /// Write the deck to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        log::info!(
            "wrote {} slides to {}",
            self.slides.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Serialize the deck into a .pptx package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let container = self.template.container();
        let presentation_part = self.template.presentation_part();
        let presentation_rels_part = OoxmlContainer::rels_path_for(presentation_part);
        let base_dir = parent_dir(presentation_part);

        let removed = self.removed_parts()?;

        // New part names
        let mut media_names: BTreeSet<String> = BTreeSet::new();
        let mut planned = Vec::with_capacity(self.slides.len());
        for (i, slide) in self.slides.iter().enumerate() {
            let slide_part = join(&base_dir, &format!("slides/slide{}.xml", i + 1));
            let media_part = slide.image().map(|image| {
                let mut n = media_names.len() + 1;
                loop {
                    let candidate = join(
                        &base_dir,
                        &format!("media/deckfill_image{}.{}", n, image.format.extension()),
                    );
                    if !container.exists(&candidate) && !media_names.contains(&candidate) {
                        media_names.insert(candidate.clone());
                        break candidate;
                    }
                    n += 1;
                }
            });
            planned.push((slide, slide_part, media_part));
        }

        // Presentation relationships and slide list
        let mut presentation_rels = self.template.presentation_relationships().clone();
        presentation_rels.remove_by_type(REL_TYPE_SLIDE);
        presentation_rels.remove_by_type(REL_TYPE_VBA_PROJECT);
        let mut slide_ids = Vec::with_capacity(planned.len());
        for (i, (_, slide_part, _)) in planned.iter().enumerate() {
            let target = relative_target(presentation_part, slide_part);
            let rel_id = presentation_rels.add_internal(REL_TYPE_SLIDE, target);
            slide_ids.push((FIRST_SLIDE_ID + i as u32, rel_id));
        }
        let presentation_xml =
            rewrite_presentation(&container.read_xml(presentation_part)?, &slide_ids)?;

        // Content types
        let mut content_types = ContentTypes::parse(&container.read_xml(CONTENT_TYPES_PART)?)?;
        content_types.remove_overrides(|part| removed.contains(part));
        content_types.ensure_default("rels", CT_RELATIONSHIPS);
        let kind = self.template.kind();
        if kind != PresentationKind::Presentation {
            log::info!("writing {} as a plain presentation", kind);
            content_types.set_override(presentation_part, PresentationKind::Presentation.content_type());
            content_types.remove_defaults_of_type(CT_VBA_PROJECT);
        }
        for (slide, slide_part, _) in &planned {
            content_types.set_override(slide_part, CT_SLIDE);
            if let Some(image) = slide.image() {
                content_types.ensure_default(image.format.extension(), image.format.mime_type());
            }
        }

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = entry_options();

        writer.start_file(CONTENT_TYPES_PART, options)?;
        writer.write_all(content_types.to_xml().as_bytes())?;

        let rewritten = [
            CONTENT_TYPES_PART,
            presentation_part,
            presentation_rels_part.as_str(),
        ];
        let copied = container.copy_parts_into(&mut writer, |name| {
            !removed.contains(name) && !rewritten.iter().any(|part| *part == name)
        })?;
        log::debug!(
            "copied {} template parts, dropped {}",
            copied,
            removed.len()
        );

        writer.start_file(presentation_part, options)?;
        writer.write_all(presentation_xml.as_bytes())?;
        writer.start_file(presentation_rels_part.as_str(), options)?;
        writer.write_all(presentation_rels.to_xml().as_bytes())?;

        for (slide, slide_part, media_part) in &planned {
            let mut rels = Relationships::new();
            rels.add_internal(
                REL_TYPE_SLIDE_LAYOUT,
                relative_target(slide_part, &slide.layout().part),
            );
            let image_rel = media_part
                .as_ref()
                .map(|media| rels.add_internal(REL_TYPE_IMAGE, relative_target(slide_part, media)));

            writer.start_file(slide_part.as_str(), options)?;
            writer.write_all(slide.to_xml(image_rel.as_deref()).as_bytes())?;
            writer.start_file(OoxmlContainer::rels_path_for(slide_part), options)?;
            writer.write_all(rels.to_xml().as_bytes())?;

            if let (Some(media), Some(image)) = (media_part, slide.image()) {
                writer.start_file(media.as_str(), options)?;
                writer.write_all(&image.data)?;
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    /// Template parts that do not make it into the output: every slide
    /// part and everything under the slides' `_rels/`, the notes slides
    /// those slides own, and the macro project with the parts it refers to.
    fn removed_parts(&self) -> Result<BTreeSet<String>> {
        let container = self.template.container();
        let slides_prefix = join(&parent_dir(self.template.presentation_part()), "slides/");

        let mut slide_parts: BTreeSet<String> = self.template.slide_parts().into_iter().collect();
        slide_parts.extend(
            container
                .list_files_with_prefix(&slides_prefix)
                .into_iter()
                .filter(|name| name.ends_with(".xml") && !name[slides_prefix.len()..].contains('/')),
        );

        let mut removed = BTreeSet::new();
        for part in &slide_parts {
            let rels = container.read_relationships(part)?;
            for notes in rels.get_by_type(REL_TYPE_NOTES_SLIDE) {
                let notes_part = OoxmlContainer::resolve_path(part, &notes.target);
                removed.insert(OoxmlContainer::rels_path_for(&notes_part));
                removed.insert(notes_part);
            }
        }
        removed.extend(container.list_files_with_prefix(&format!("{}_rels/", slides_prefix)));
        removed.extend(slide_parts);

        let presentation_part = self.template.presentation_part();
        for vba in self
            .template
            .presentation_relationships()
            .get_by_type(REL_TYPE_VBA_PROJECT)
        {
            let vba_part = OoxmlContainer::resolve_path(presentation_part, &vba.target);
            for rel in container.read_relationships(&vba_part)?.iter() {
                if !rel.external {
                    removed.insert(OoxmlContainer::resolve_path(&vba_part, &rel.target));
                }
            }
            removed.insert(OoxmlContainer::rels_path_for(&vba_part));
            removed.insert(vba_part);
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for Deck<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deck")
            .field("template", self.template)
            .field("slides", &self.slides.len())
            .finish()
    }
}

fn parent_dir(part: &str) -> String {
    part.rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default()
}

fn join(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", dir, rest)
    }
}

/// Relationship target of `to` as seen from the part `from`.
///
/// `ppt/slides/slide1.xml` -> `ppt/slideLayouts/slideLayout2.xml` gives
/// `../slideLayouts/slideLayout2.xml`.
fn relative_target(from: &str, to: &str) -> String {
    let from_parent = parent_dir(from);
    let from_dir: Vec<&str> = from_parent.split('/').filter(|s| !s.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_dir
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; from_dir.len() - common];
    segments.extend_from_slice(&to_parts[common..]);
    segments.join("/")
}
