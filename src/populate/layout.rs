//! Layout arithmetic: slide classification, font sizes, truncation and
//! picture placement.
//!
//! Text lengths are measured in terminal display columns so wide scripts
//! count double.

use crate::model::{OutlineSlide, SlideKind};
use crate::pptx::{Frame, SlideSize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Bullets longer than this are prose rather than list items.
pub const PROSE_THRESHOLD_COLS: usize = 80;

/// Appended to truncated text.
pub const ELLIPSIS: char = '…';

/// Rows shown on a table slide, header included.
pub const MAX_TABLE_ROWS: usize = 8;

/// Columns shown on a table slide.
pub const MAX_TABLE_COLUMNS: usize = 5;

/// Display columns a table cell is cut to.
pub const MAX_CELL_COLS: usize = 50;

/// Table cell font size in points.
pub const TABLE_FONT_PT: u32 = 10;

/// Display width of `text`.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Decide how a slide is laid out.
///
/// Two or more bullets that split into cells make a table.
pub fn classify(slide: &OutlineSlide) -> SlideKind {
    if slide.bullets.is_empty() {
        SlideKind::Title
    } else if slide.bullets.iter().filter_map(|b| table_cells(b)).count() >= 2 {
        SlideKind::Table
    } else if slide
        .bullets
        .iter()
        .all(|b| display_width(b) > PROSE_THRESHOLD_COLS)
    {
        SlideKind::Body
    } else {
        SlideKind::Bullets
    }
}

/// Split one bullet into cells on tabs, or on `|` when it has no tabs.
///
/// Outer pipes of `| a | b |` are dropped. Lines with fewer than two cells
/// and Markdown rules such as `|---|:--:|` are not rows.
pub fn table_cells(line: &str) -> Option<Vec<String>> {
    let line = line.trim();
    let separator = if line.contains('\t') {
        '\t'
    } else if line.contains('|') {
        '|'
    } else {
        return None;
    };

    let inner = match separator {
        '|' => line.trim_start_matches('|').trim_end_matches('|'),
        _ => line,
    };
    let cells: Vec<String> = inner.split(separator).map(|c| c.trim().to_string()).collect();
    if cells.len() < 2 {
        return None;
    }

    let is_rule = cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| matches!(ch, '-' | ':')));
    if is_rule {
        return None;
    }
    Some(cells)
}

/// Table rows of a slide, the first being the header.
///
/// Bullets that are not rows are skipped. At most [`MAX_TABLE_ROWS`] rows and
/// [`MAX_TABLE_COLUMNS`] columns are kept and cells are truncated to
/// [`MAX_CELL_COLS`].
pub fn table_rows(slide: &OutlineSlide) -> Vec<Vec<String>> {
    slide
        .bullets
        .iter()
        .filter_map(|b| table_cells(b))
        .take(MAX_TABLE_ROWS)
        .map(|row| {
            row.iter()
                .take(MAX_TABLE_COLUMNS)
                .map(|cell| truncate(cell, MAX_CELL_COLS))
                .collect()
        })
        .collect()
}

/// Title font size in points.
pub fn title_font_size(title: &str) -> u32 {
    match display_width(title) {
        0..=30 => 40,
        31..=50 => 36,
        51..=70 => 32,
        _ => 28,
    }
}

/// Body font size in points for the given paragraphs.
pub fn body_font_size<S: AsRef<str>>(lines: &[S]) -> u32 {
    let cols: usize = lines.iter().map(|l| display_width(l.as_ref())).sum();
    let count = lines.len();
    if cols <= 200 && count <= 5 {
        24
    } else if cols <= 400 && count <= 7 {
        20
    } else if cols <= 700 {
        18
    } else {
        16
    }
}

/// Body font size adjusted for the slide kind; prose never exceeds 20pt.
pub fn body_font_size_for<S: AsRef<str>>(kind: SlideKind, lines: &[S]) -> u32 {
    let size = body_font_size(lines);
    match kind {
        SlideKind::Body => size.min(20),
        _ => size,
    }
}

/// Shorten `text` to at most `max_cols` display columns.
///
/// Cuts at the last word boundary that fits and appends [`ELLIPSIS`];
/// a single overlong word is cut mid-word. Text that fits is returned as is.
pub fn truncate(text: &str, max_cols: usize) -> String {
    if display_width(text) <= max_cols {
        return text.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }

    let budget = max_cols - 1;
    let mut width = 0;
    let mut end = 0;
    let mut last_space = None;
    for (i, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        if c.is_whitespace() {
            last_space = Some(i);
        }
        width += w;
        end = i + c.len_utf8();
    }

    let cut = match last_space {
        Some(i) if i > 0 => &text[..i],
        _ => &text[..end],
    };
    let mut out = cut.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

/// Picture rectangle for a slide of the given kind.
pub fn image_frame(kind: SlideKind, size: SlideSize) -> Frame {
    match kind {
        SlideKind::Bullets => Frame::from_inches(5.8, 1.2, 3.1, 2.0, size),
        SlideKind::Body => Frame::from_inches(6.4, 1.8, 2.2, 1.7, size),
        SlideKind::Title => Frame::from_inches(3.4, 3.4, 3.5, 2.0, size),
        SlideKind::Table => Frame::from_inches(5.5, 2.0, 3.5, 3.5, size),
    }
}

/// Table rectangle: full width, or the left column beside a picture.
pub fn table_frame(size: SlideSize, beside_image: bool) -> Frame {
    let width = if beside_image { 4.5 } else { 9.0 };
    Frame::from_inches(0.5, 2.0, width, 4.0, size)
}

/// Subtitle rectangle of the cover slide.
pub fn cover_subtitle_frame(size: SlideSize) -> Frame {
    Frame::from_inches(1.0, 4.5, 8.0, 1.0, size)
}

/// Body text rectangle when a picture shares the slide.
pub fn text_frame_beside_image(size: SlideSize) -> Frame {
    Frame::from_inches(0.5, 1.5, 5.1, 5.0, size)
}
