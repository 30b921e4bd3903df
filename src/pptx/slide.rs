//! Slide part generation.
//!
//! A [`SlideBuilder`] collects the title, body text, picture and background
//! of one new slide and renders the `p:sld` part. Placeholders of the base
//! layout are used when present so the slide inherits the template styling;
//! otherwise explicit text boxes are positioned on the slide.

use super::template::{SlideLayout, SlideSize};
use crate::container::escape_xml;
use crate::model::ImageRef;

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Reference slide the inch positions are expressed in (10" x 7.5").
const REFERENCE_WIDTH_IN: f64 = 10.0;
const REFERENCE_HEIGHT_IN: f64 = 7.5;

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// Rectangle on the slide in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    /// Create a frame from EMU values.
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Convert a rectangle given in inches on a 10" x 7.5" slide to EMU on
    /// a slide of the given size.
    pub fn from_inches(x: f64, y: f64, width: f64, height: f64, size: SlideSize) -> Self {
        let sx = size.cx as f64 / (REFERENCE_WIDTH_IN * EMU_PER_INCH as f64);
        let sy = size.cy as f64 / (REFERENCE_HEIGHT_IN * EMU_PER_INCH as f64);
        let emu = |inches: f64, scale: f64| (inches * EMU_PER_INCH as f64 * scale).round() as i64;
        Self {
            x: emu(x, sx),
            y: emu(y, sy),
            cx: emu(width, sx),
            cy: emu(height, sy),
        }
    }

    /// Largest rectangle with the given aspect ratio that fits inside this
    /// frame, centred.
    pub fn fit(&self, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 || self.cx <= 0 || self.cy <= 0 {
            return *self;
        }
        let ratio = width as f64 / height as f64;
        let frame_ratio = self.cx as f64 / self.cy as f64;
        let (cx, cy) = if ratio > frame_ratio {
            (self.cx, (self.cx as f64 / ratio).round() as i64)
        } else {
            ((self.cy as f64 * ratio).round() as i64, self.cy)
        };
        Self {
            x: self.x + (self.cx - cx) / 2,
            y: self.y + (self.cy - cy) / 2,
            cx,
            cy,
        }
    }

    fn xfrm(&self) -> String {
        format!(
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            self.x, self.y, self.cx, self.cy
        )
    }
}

#[derive(Debug, Clone)]
struct TitleText {
    text: String,
    size_pt: u32,
}

#[derive(Debug, Clone)]
struct BodyText {
    lines: Vec<String>,
    size_pt: u32,
    bulleted: bool,
}

#[derive(Debug, Clone)]
struct TableGrid {
    rows: Vec<Vec<String>>,
    frame: Frame,
    size_pt: u32,
}

/// Builder for one new slide.
#[derive(Debug, Clone)]
pub struct SlideBuilder {
    layout: SlideLayout,
    slide_size: SlideSize,
    title: Option<TitleText>,
    body: Option<BodyText>,
    body_frame: Option<Frame>,
    table: Option<TableGrid>,
    picture: Option<(ImageRef, Frame)>,
    background: Option<String>,
}

impl SlideBuilder {
    /// Start a slide based on `layout`.
    pub fn new(layout: &SlideLayout, slide_size: SlideSize) -> Self {
        Self {
            layout: layout.clone(),
            slide_size,
            title: None,
            body: None,
            body_frame: None,
            table: None,
            picture: None,
            background: None,
        }
    }

    /// Set the title text and its font size in points.
    pub fn title(mut self, text: impl Into<String>, size_pt: u32) -> Self {
        self.title = Some(TitleText {
            text: text.into(),
            size_pt,
        });
        self
    }

    /// Set the body paragraphs. `bulleted = false` suppresses bullet glyphs.
    pub fn body<I, S>(mut self, lines: I, size_pt: u32, bulleted: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if !lines.is_empty() {
            self.body = Some(BodyText {
                lines,
                size_pt,
                bulleted,
            });
        }
        self
    }

    /// Override the position of the body text.
    pub fn body_frame(mut self, frame: Frame) -> Self {
        self.body_frame = Some(frame);
        self
    }

    /// Add a table inside `frame`. The first row is the header; short rows
    /// are padded with empty cells.
    pub fn table(mut self, rows: Vec<Vec<String>>, frame: Frame, size_pt: u32) -> Self {
        if !rows.is_empty() {
            self.table = Some(TableGrid {
                rows,
                frame,
                size_pt,
            });
        }
        self
    }

    /// Place a picture inside `frame`, keeping its aspect ratio.
    pub fn picture(mut self, image: ImageRef, frame: Frame) -> Self {
        let frame = match image.pixel_size() {
            Some((w, h)) => frame.fit(w, h),
            None => frame,
        };
        self.picture = Some((image, frame));
        self
    }

    /// Fill the background with a solid `RRGGBB` colour.
    pub fn background(mut self, rgb: impl Into<String>) -> Self {
        self.background = Some(rgb.into());
        self
    }

    /// Layout the slide is based on.
    pub fn layout(&self) -> &SlideLayout {
        &self.layout
    }

    /// Picture to embed, if any.
    pub fn image(&self) -> Option<&ImageRef> {
        self.picture.as_ref().map(|(image, _)| image)
    }

    /// Title text, if any.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().map(|t| t.text.as_str())
    }

    /// Body paragraphs.
    pub fn body_lines(&self) -> &[String] {
        self.body.as_ref().map(|b| b.lines.as_slice()).unwrap_or(&[])
    }

    /// Table rows, header first.
    pub fn table_rows(&self) -> &[Vec<String>] {
        self.table.as_ref().map(|t| t.rows.as_slice()).unwrap_or(&[])
    }

    /// Render the slide part. `image_rel_id` is the relationship id the
    /// picture is embedded under.
    pub fn to_xml(&self, image_rel_id: Option<&str>) -> String {
        let mut xml = String::with_capacity(2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!("<p:sld {}><p:cSld>", NAMESPACES));

        if let Some(rgb) = &self.background {
            xml.push_str(&format!(
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                escape_xml(rgb)
            ));
        }

        xml.push_str(concat!(
            r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
            r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
        ));

        let mut shape_id = 2;
        if let Some(title) = &self.title {
            self.write_title(&mut xml, shape_id, title);
            shape_id += 1;
        }
        if let Some(body) = &self.body {
            self.write_body(&mut xml, shape_id, body);
            shape_id += 1;
        }
        if let Some(table) = &self.table {
            write_table(&mut xml, shape_id, table);
            shape_id += 1;
        }
        if let (Some((image, frame)), Some(rel_id)) = (&self.picture, image_rel_id) {
            write_picture(&mut xml, shape_id, image, frame, rel_id);
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
        xml
    }

    fn write_title(&self, xml: &mut String, id: u32, title: &TitleText) {
        let run = text_run(&title.text, title.size_pt);
        match &self.layout.title_type {
            Some(ph_type) => {
                xml.push_str(&format!(
                    r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Title {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="{}"/></p:nvPr></p:nvSpPr><p:spPr/>"#,
                    id,
                    id - 1,
                    escape_xml(ph_type)
                ));
                xml.push_str(r#"<p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/>"#);
            }
            None => {
                let frame = Frame::from_inches(0.5, 0.3, 9.0, 1.2, self.slide_size);
                write_textbox_start(xml, id, "Title", &frame);
                xml.push_str(
                    r#"<p:txBody><a:bodyPr wrap="square" anchor="ctr"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
                );
            }
        }
        xml.push_str(&format!("<a:p>{}</a:p></p:txBody></p:sp>", run));
    }

    fn write_body(&self, xml: &mut String, id: u32, body: &BodyText) {
        let placeholder = self.layout.body_idx;
        match placeholder {
            Some(idx) => {
                xml.push_str(&format!(
                    r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Content Placeholder {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph idx="{}"/></p:nvPr></p:nvSpPr>"#,
                    id,
                    id - 1,
                    idx
                ));
                match &self.body_frame {
                    Some(frame) => xml.push_str(&format!("<p:spPr>{}</p:spPr>", frame.xfrm())),
                    None => xml.push_str("<p:spPr/>"),
                }
                xml.push_str(r#"<p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/>"#);
            }
            None => {
                let frame = self
                    .body_frame
                    .unwrap_or_else(|| Frame::from_inches(0.5, 1.5, 9.0, 5.0, self.slide_size));
                write_textbox_start(xml, id, "Content", &frame);
                xml.push_str(
                    r#"<p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
                );
            }
        }

        for line in &body.lines {
            xml.push_str("<a:p>");
            if !body.bulleted {
                xml.push_str(r#"<a:pPr marL="0" indent="0"><a:buNone/></a:pPr>"#);
            } else if placeholder.is_none() {
                // Text boxes carry no inherited list style
                xml.push_str(r#"<a:pPr marL="342900" indent="-342900"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#);
            }
            xml.push_str(&text_run(line, body.size_pt));
            xml.push_str("</a:p>");
        }
        xml.push_str("</p:txBody></p:sp>");
    }
}

fn text_run(text: &str, size_pt: u32) -> String {
    format!(
        r#"<a:r><a:rPr lang="en-US" sz="{}" dirty="0"/><a:t>{}</a:t></a:r>"#,
        size_pt * 100,
        escape_xml(text)
    )
}

fn write_textbox_start(xml: &mut String, id: u32, name: &str, frame: &Frame) {
    xml.push_str(&format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{} {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
        id,
        name,
        id - 1,
        frame.xfrm()
    ));
}

fn write_table(xml: &mut String, id: u32, table: &TableGrid) {
    let columns = table.rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
    let col_width = table.frame.cx / columns as i64;
    let row_height = table.frame.cy / table.rows.len() as i64;

    xml.push_str(&format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Table {}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#,
        id,
        id - 1
    ));
    xml.push_str(&format!(
        r#"<p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm>"#,
        table.frame.x,
        table.frame.y,
        col_width * columns as i64,
        row_height * table.rows.len() as i64
    ));
    xml.push_str(r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>"#);
    for _ in 0..columns {
        xml.push_str(&format!(r#"<a:gridCol w="{}"/>"#, col_width));
    }
    xml.push_str("</a:tblGrid>");

    for (r, row) in table.rows.iter().enumerate() {
        xml.push_str(&format!(r#"<a:tr h="{}">"#, row_height));
        for c in 0..columns {
            xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p>");
            match row.get(c).filter(|text| !text.is_empty()) {
                Some(text) => xml.push_str(&format!(
                    r#"<a:r><a:rPr lang="en-US" sz="{}"{} dirty="0"/><a:t>{}</a:t></a:r>"#,
                    table.size_pt * 100,
                    if r == 0 { r#" b="1""# } else { "" },
                    escape_xml(text)
                )),
                None => xml.push_str(&format!(
                    r#"<a:endParaRPr lang="en-US" sz="{}" dirty="0"/>"#,
                    table.size_pt * 100
                )),
            }
            xml.push_str("</a:p></a:txBody><a:tcPr/></a:tc>");
        }
        xml.push_str("</a:tr>");
    }
    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
}

fn write_picture(xml: &mut String, id: u32, image: &ImageRef, frame: &Frame, rel_id: &str) {
    xml.push_str(&format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}" descr="{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
        id,
        id - 1,
        escape_xml(&image.query)
    ));
    xml.push_str(&format!(
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
        escape_xml(rel_id)
    ));
    xml.push_str(&format!(
        r#"<p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        frame.xfrm()
    ));
}
