//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

use deckfill::{ImageRef, ImageSearch, Prompt, Result, TextGenerator};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// A blank PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// A template with `slide_titles.len()` titled slides, a title layout and a
/// title-and-content layout.
pub fn template(slide_titles: &[&str]) -> Vec<u8> {
    let mut parts: Vec<(String, String)> = Vec::new();

    let mut overrides = String::from(
        r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
    );
    for layout in 1..=2 {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slideLayouts/slideLayout{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
            layout
        ));
    }
    for n in 1..=slide_titles.len() {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        ));
    }
    parts.push((
        "[Content_Types].xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{}</Types>"#,
            overrides
        ),
    ));
    parts.push((
        "_rels/.rels".into(),
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#.into(),
    ));

    let mut ids = String::new();
    let mut rels = String::from(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>"#,
    );
    for n in 1..=slide_titles.len() {
        ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n + 2));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            n + 2,
            n
        ));
    }
    parts.push((
        "ppt/presentation.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            NS, ids
        ),
    ));
    parts.push((
        "ppt/_rels/presentation.xml.rels".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            rels
        ),
    ));
    parts.push((
        "ppt/slideMasters/slideMaster1.xml".into(),
        format!(r#"<p:sldMaster {}><p:cSld><p:spTree/></p:cSld></p:sldMaster>"#, NS),
    ));
    parts.push((
        "ppt/theme/theme1.xml".into(),
        r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"/>"#.into(),
    ));
    parts.push((
        "ppt/slideLayouts/slideLayout1.xml".into(),
        format!(
            r#"<p:sldLayout {} type="title"><p:cSld name="Title Slide"><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr></p:sp></p:spTree></p:cSld></p:sldLayout>"#,
            NS
        ),
    ));
    parts.push((
        "ppt/slideLayouts/slideLayout2.xml".into(),
        format!(
            r#"<p:sldLayout {} type="obj"><p:cSld name="Title and Content"><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Content 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr></p:sp></p:spTree></p:cSld></p:sldLayout>"#,
            NS
        ),
    ));

    for (i, title) in slide_titles.iter().enumerate() {
        let n = i + 1;
        parts.push((
            format!("ppt/slides/slide{}.xml", n),
            format!(
                r#"<p:sld {}><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
                NS, title
            ),
        ));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", n),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/></Relationships>"#.into(),
        ));
    }

    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

/// Text service stub: a fixed outline, fixed scores, and a call counter.
pub struct StubText {
    pub outline: String,
    pub scores: String,
    pub calls: Cell<usize>,
}

impl StubText {
    pub fn new(outline: &str, scores: &str) -> Self {
        Self {
            outline: outline.to_string(),
            scores: scores.to_string(),
            calls: Cell::new(0),
        }
    }
}

impl TextGenerator for StubText {
    fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        if prompt.text.starts_with("Rate each slide") {
            Ok(self.scores.clone())
        } else {
            Ok(self.outline.clone())
        }
    }
}

/// Image service stub returning the same PNG for every query.
pub struct StubImages {
    pub calls: Cell<usize>,
}

impl StubImages {
    pub fn new() -> Self {
        Self {
            calls: Cell::new(0),
        }
    }
}

impl ImageSearch for StubImages {
    fn find(&self, query: &str) -> Result<Option<ImageRef>> {
        self.calls.set(self.calls.get() + 1);
        Ok(ImageRef::new(query, format!("https://images.test/{}", self.calls.get()), png(8, 6)))
    }
}
