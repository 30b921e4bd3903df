//! Parsing of text service responses into outlines and scores.

use crate::error::{Error, Result};
use crate::model::{OutlineSlide, SlideOutline};
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

/// Score given to slides the service did not rate.
pub const DEFAULT_SCORE: u8 = 5;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonOutline {
    Slides(Vec<OutlineSlide>),
    Wrapped { slides: Vec<OutlineSlide> },
}

/// Parse a response into an outline.
///
/// JSON (optionally fenced) is tried first, then the line format:
///
/// ```text
/// Slide 1: Why solar
/// - Cheap
/// - Clean
/// ## Costs
/// 1. Panels
/// ```
///
/// # Errors
///
/// [`Error::MalformedResponse`] when no slide can be recovered.
pub fn parse_outline(text: &str) -> Result<SlideOutline> {
    let text: String = text.nfc().collect();

    let outline = match parse_json(&text) {
        Some(outline) => outline,
        None => parse_lines(&text),
    };

    let outline: SlideOutline = outline
        .into_iter()
        .map(clean_slide)
        .filter(|slide| !slide.is_empty())
        .collect();

    if outline.is_empty() {
        return Err(Error::MalformedResponse(
            "response contains no slides".to_string(),
        ));
    }
    Ok(outline)
}

fn parse_json(text: &str) -> Option<SlideOutline> {
    let body = strip_fence(text.trim());
    if !(body.starts_with('[') || body.starts_with('{')) {
        return None;
    }
    match serde_json::from_str::<JsonOutline>(body) {
        Ok(JsonOutline::Slides(slides)) | Ok(JsonOutline::Wrapped { slides }) => {
            Some(slides.into_iter().collect())
        }
        Err(e) => {
            log::debug!("response is not a JSON outline ({}), trying line format", e);
            None
        }
    }
}

/// Remove a surrounding ```` ``` ```` fence (with optional language tag).
fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

enum Line<'a> {
    Heading(&'a str),
    TitleLabel(&'a str),
    Bullet(&'a str),
    Plain(&'a str),
}

fn parse_lines(text: &str) -> SlideOutline {
    let mut outline = SlideOutline::new();
    let mut current: Option<OutlineSlide> = None;

    for raw in text.lines() {
        let line = raw.replace("**", "").replace("__", "");
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") || is_section_label(line) {
            continue;
        }

        match classify_line(line) {
            Line::Heading(title) => {
                if let Some(slide) = current.take() {
                    outline.push(slide);
                }
                current = Some(OutlineSlide::new(title, Vec::<String>::new()));
            }
            Line::TitleLabel(title) => match current.as_mut() {
                Some(slide) if slide.bullets.is_empty() => slide.title = title.to_string(),
                _ => {
                    if let Some(slide) = current.take() {
                        outline.push(slide);
                    }
                    current = Some(OutlineSlide::new(title, Vec::<String>::new()));
                }
            },
            Line::Bullet(bullet) => current
                .get_or_insert_with(OutlineSlide::default)
                .bullets
                .push(bullet.to_string()),
            Line::Plain(plain) => match current.as_mut() {
                None => current = Some(OutlineSlide::new(plain, Vec::<String>::new())),
                Some(slide) if slide.title.trim().is_empty() && slide.bullets.is_empty() => {
                    slide.title = plain.to_string()
                }
                Some(slide) => slide.bullets.push(plain.to_string()),
            },
        }
    }

    if let Some(slide) = current {
        outline.push(slide);
    }
    outline
}

fn classify_line(line: &str) -> Line<'_> {
    if let Some(title) = slide_heading(line) {
        return Line::Heading(title);
    }
    if line.starts_with('#') {
        return Line::Heading(line.trim_start_matches('#').trim());
    }
    if let Some(title) = strip_prefix_ignore_case(line, "title:") {
        return Line::TitleLabel(title.trim());
    }
    if let Some(bullet) = bullet_text(line) {
        return Line::Bullet(bullet);
    }
    Line::Plain(line)
}

/// `Slide 3: Title`, `Slide 3 - Title`, `Slide 3. Title` or a bare `Slide 3`.
fn slide_heading(line: &str) -> Option<&str> {
    let rest = strip_prefix_ignore_case(line, "slide")?;
    let rest = rest.trim_start();
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = rest[digits..].trim_start();
    if rest.is_empty() {
        return Some("");
    }
    let mut chars = rest.chars();
    match chars.next() {
        Some(':' | '-' | '–' | '—' | '.' | ')') => Some(chars.as_str().trim()),
        _ => None,
    }
}

/// Text after a bullet marker: `-`, `*`, `•`, `1.`, `1)`, `a.`, `a)`.
fn bullet_text(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "• ", "– ", "·"] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    if line == "-" || line == "*" || line == "•" {
        return Some("");
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    let marker_len = if digits > 0 {
        digits
    } else if line.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        1
    } else {
        return None;
    };

    let rest = &line[marker_len..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

/// Lines such as `Bullets:` or `Content:` that only label what follows.
fn is_section_label(line: &str) -> bool {
    ["bullets:", "bullet points:", "content:", "points:"]
        .iter()
        .any(|label| line.eq_ignore_ascii_case(label))
}

fn clean_slide(slide: OutlineSlide) -> OutlineSlide {
    OutlineSlide {
        title: clean_text(&slide.title),
        bullets: slide
            .bullets
            .iter()
            .map(|b| clean_text(b))
            .filter(|b| !b.is_empty())
            .collect(),
    }
}

/// NFC-normalize, drop bold markers and collapse whitespace.
fn clean_text(text: &str) -> String {
    let text: String = text.replace("**", "").nfc().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a comma-separated list of scores for a batch of `batch_len` slides.
///
/// Periods are dropped, non-numeric tokens skipped, values clamped to 1-10.
/// Missing scores are filled with [`DEFAULT_SCORE`]; extra ones discarded.
pub fn parse_scores(text: &str, batch_len: usize) -> Vec<u8> {
    let mut scores: Vec<u8> = text
        .replace('.', "")
        .split(',')
        .filter_map(|token| token.trim().parse::<u32>().ok())
        .map(|score| score.clamp(1, 10) as u8)
        .collect();
    scores.resize(batch_len, DEFAULT_SCORE);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(outline: &SlideOutline) -> Vec<&str> {
        outline.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_slide_headings_and_bullets() {
        let text = "Slide 1: Why solar\n- Cheap\n* Clean\n\nSlide 2 - Costs\n1. Panels\n2) Labour\nSlide 3. Next steps\na. Plan\nb) Build";
        let outline = parse_outline(text).unwrap();

        assert_eq!(titles(&outline), vec!["Why solar", "Costs", "Next steps"]);
        assert_eq!(outline.slides[0].bullets, vec!["Cheap", "Clean"]);
        assert_eq!(outline.slides[1].bullets, vec!["Panels", "Labour"]);
        assert_eq!(outline.slides[2].bullets, vec!["Plan", "Build"]);
    }

    #[test]
    fn test_markdown_headings_and_title_labels() {
        let text = "# Overview\n• One\n## **Details**\nplain line becomes bullet\nTitle: Summary\n- Done";
        let outline = parse_outline(text).unwrap();
        assert_eq!(titles(&outline), vec!["Overview", "Details", "Summary"]);
        assert_eq!(outline.slides[1].bullets, vec!["plain line becomes bullet"]);
    }

    #[test]
    fn test_bare_slide_heading_takes_next_line_as_title() {
        let text = "Slide 1:\nTitle: Kickoff\nBullets:\n- Goals";
        let outline = parse_outline(text).unwrap();
        assert_eq!(titles(&outline), vec!["Kickoff"]);
        assert_eq!(outline.slides[0].bullets, vec!["Goals"]);

        let outline = parse_outline("Slide 2\nIntro\n- a").unwrap();
        assert_eq!(titles(&outline), vec!["Intro"]);
    }

    #[test]
    fn test_plain_line_before_heading_is_title() {
        let outline = parse_outline("Agenda\n- Welcome\nSlide 2: Wrap up").unwrap();
        assert_eq!(titles(&outline), vec!["Agenda", "Wrap up"]);
        assert_eq!(outline.slides[0].bullets, vec!["Welcome"]);
    }

    #[test]
    fn test_sentences_are_not_bullets() {
        assert!(bullet_text("e.g. this").is_none());
        assert!(bullet_text("2024 was good").is_none());
        assert!(bullet_text("-dash without space").is_none());
        assert_eq!(bullet_text("10. Tenth"), Some("Tenth"));
    }

    #[test]
    fn test_json_outline_forms() {
        let array = r#"[{"title":"A","bullets":["x"]},{"title":"B","points":["y","z"]}]"#;
        assert_eq!(titles(&parse_outline(array).unwrap()), vec!["A", "B"]);

        let fenced = "```json\n{\"slides\": [{\"title\": \"Only\", \"bullets\": []}]}\n```";
        let outline = parse_outline(fenced).unwrap();
        assert_eq!(titles(&outline), vec!["Only"]);
        assert!(outline.slides[0].bullets.is_empty());
    }

    #[test]
    fn test_text_is_normalized() {
        // "e" + combining acute accent, bold markers, runs of spaces
        let outline = parse_outline("Slide 1: Cafe\u{301}   **menu**\n-   hot\t drinks ").unwrap();
        assert_eq!(outline.slides[0].title, "Caf\u{e9} menu");
        assert_eq!(outline.slides[0].bullets, vec!["hot drinks"]);
    }

    #[test]
    fn test_empty_response_is_malformed() {
        assert!(matches!(parse_outline(""), Err(Error::MalformedResponse(_))));
        assert!(matches!(parse_outline("\n```\n```\n"), Err(Error::MalformedResponse(_))));
        assert!(matches!(parse_outline("[]"), Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_scores() {
        assert_eq!(parse_scores("8, 3, 10", 3), vec![8, 3, 10]);
        assert_eq!(parse_scores("7.", 3), vec![7, 5, 5]);
        assert_eq!(parse_scores("0, 42, x, 6", 3), vec![1, 10, 6]);
        assert_eq!(parse_scores("9, 9, 9, 9", 2), vec![9, 9]);
        assert_eq!(parse_scores("no idea", 2), vec![5, 5]);
    }
}
