//! In-memory presentation packages for unit tests.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_NOTES: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml";

pub const CT_TEMPLATE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
pub const CT_MACRO_ENABLED: &str =
    "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
const CT_VBA_PROJECT: &str = "application/vnd.ms-office.vbaProject";
const CT_VBA_DATA: &str = "application/vnd.ms-word.vbaData+xml";

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// Builder for a small but structurally complete .pptx package.
pub struct TemplateFixture {
    slides: Vec<String>,
    layouts: bool,
    size: (i64, i64),
    notes_on_first: bool,
    main_content_type: &'static str,
    vba_project: bool,
    extra_parts: Vec<(String, String)>,
}

impl TemplateFixture {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            layouts: true,
            size: (9_144_000, 6_858_000),
            notes_on_first: false,
            main_content_type: CT_PRESENTATION,
            vba_project: false,
            extra_parts: Vec::new(),
        }
    }

    /// Add a slide whose shapes contain the given inner XML.
    pub fn slide(mut self, shapes: impl Into<String>) -> Self {
        self.slides.push(shapes.into());
        self
    }

    pub fn slide_size(mut self, cx: i64, cy: i64) -> Self {
        self.size = (cx, cy);
        self
    }

    pub fn without_layouts(mut self) -> Self {
        self.layouts = false;
        self
    }

    pub fn with_notes(mut self) -> Self {
        self.notes_on_first = true;
        self
    }

    /// Content type declared for `ppt/presentation.xml`.
    pub fn main_content_type(mut self, content_type: &'static str) -> Self {
        self.main_content_type = content_type;
        self
    }

    /// Attach a macro project and its data part to the presentation.
    pub fn with_vba_project(mut self) -> Self {
        self.vba_project = true;
        self
    }

    /// Add an arbitrary part after all generated ones.
    pub fn part(mut self, name: &str, content: &str) -> Self {
        self.extra_parts.push((name.to_string(), content.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = Vec::new();

        let mut overrides = format!(
            r#"<Override PartName="/ppt/presentation.xml" ContentType="{}"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="{}"/>"#,
            self.main_content_type, CT_MASTER
        );
        if self.vba_project {
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/vbaData.xml" ContentType="{}"/>"#,
                CT_VBA_DATA
            ));
        }
        for i in 1..=self.slides.len() {
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
                i, CT_SLIDE
            ));
        }
        if self.layouts {
            for i in 1..=2 {
                overrides.push_str(&format!(
                    r#"<Override PartName="/ppt/slideLayouts/slideLayout{}.xml" ContentType="{}"/>"#,
                    i, CT_LAYOUT
                ));
            }
        }
        if self.notes_on_first && !self.slides.is_empty() {
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/notesSlides/notesSlide1.xml" ContentType="{}"/>"#,
                CT_NOTES
            ));
        }
        parts.push((
            "[Content_Types].xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{}{}</Types>"#,
                if self.vba_project {
                    format!(r#"<Default Extension="bin" ContentType="{}"/>"#, CT_VBA_PROJECT)
                } else {
                    String::new()
                },
                overrides
            ),
        ));

        parts.push((
            "_rels/.rels".into(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#.into(),
        ));

        let mut sld_ids = String::new();
        let mut pres_rels = String::from(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
        );
        for i in 1..=self.slides.len() {
            sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 1));
            pres_rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                i + 1,
                i
            ));
        }
        if self.vba_project {
            pres_rels.push_str(r#"<Relationship Id="rId99" Type="http://schemas.microsoft.com/office/2006/relationships/vbaProject" Target="vbaProject.bin"/>"#);
        }
        let sld_id_lst = if self.slides.is_empty() {
            String::new()
        } else {
            format!("<p:sldIdLst>{}</p:sldIdLst>", sld_ids)
        };
        parts.push((
            "ppt/presentation.xml".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
                NS, sld_id_lst, self.size.0, self.size.1
            ),
        ));
        parts.push((
            "ppt/_rels/presentation.xml.rels".into(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                pres_rels
            ),
        ));

        parts.push((
            "ppt/slideMasters/slideMaster1.xml".into(),
            format!(r#"<p:sldMaster {}><p:cSld><p:spTree/></p:cSld></p:sldMaster>"#, NS),
        ));

        if self.layouts {
            parts.push((
                "ppt/slideLayouts/slideLayout1.xml".into(),
                format!(
                    r#"<p:sldLayout {} type="title"><p:cSld name="Title Slide"><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Subtitle 2"/><p:cNvSpPr/><p:nvPr><p:ph type="subTitle" idx="1"/></p:nvPr></p:nvSpPr></p:sp></p:spTree></p:cSld></p:sldLayout>"#,
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
        }

        for (i, shapes) in self.slides.iter().enumerate() {
            let n = i + 1;
            parts.push((
                format!("ppt/slides/slide{}.xml", n),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
                    NS, shapes
                ),
            ));
            let mut rels = String::from(
                r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/>"#,
            );
            if n == 1 && self.notes_on_first {
                rels.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide" Target="../notesSlides/notesSlide1.xml"/>"#);
            }
            parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", n),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                    rels
                ),
            ));
        }

        if self.notes_on_first && !self.slides.is_empty() {
            parts.push((
                "ppt/notesSlides/notesSlide1.xml".into(),
                format!(r#"<p:notes {}><p:cSld><p:spTree/></p:cSld></p:notes>"#, NS),
            ));
        }

        if self.vba_project {
            parts.push(("ppt/vbaProject.bin".into(), "\u{0}VBA".into()));
            parts.push((
                "ppt/_rels/vbaProject.bin.rels".into(),
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.microsoft.com/office/2006/relationships/wordVbaData" Target="vbaData.xml"/></Relationships>"#.into(),
            ));
            parts.push((
                "ppt/vbaData.xml".into(),
                r#"<wne:vbaSuppData xmlns:wne="http://schemas.microsoft.com/office/word/2006/wordml"/>"#.into(),
            ));
        }
        parts.extend(self.extra_parts);

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
}

/// Shape XML for a title placeholder with the given text.
pub fn title_shape(text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        text
    )
}

/// Shape XML for a body placeholder with one paragraph per line.
pub fn body_shape(lines: &[&str]) -> String {
    let paragraphs: String = lines
        .iter()
        .map(|l| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", l))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content 2"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
        paragraphs
    )
}

/// Two slides (one titled, one empty), two layouts, a master and notes on slide 1.
pub fn minimal_template() -> Vec<u8> {
    TemplateFixture::new()
        .slide(format!(
            "{}{}",
            title_shape("Quarterly Review"),
            body_shape(&["Revenue &amp; growth"])
        ))
        .slide("")
        .with_notes()
        .build()
}

/// A blank `width` x `height` image encoded in `format`.
pub fn encoded_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, format)
        .unwrap();
    out.into_inner()
}

/// A blank PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, image::ImageFormat::Png)
}
