//! Table of Contents extraction from Markdown

use regex::Regex;
use std::sync::OnceLock;

use crate::fence;

/// A heading in the markdown document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub line: usize,
    pub anchor: String,
}

impl Heading {
    /// Indentation depth relative to the shallowest heading in the outline
    pub fn depth(&self, min_level: u8) -> usize {
        usize::from(self.level.saturating_sub(min_level))
    }
}

fn atx_pattern() -> &'static Regex {
    static RE_ATX: OnceLock<Regex> = OnceLock::new();
    RE_ATX.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading pattern"))
}

fn inline_marker_pattern() -> &'static Regex {
    static RE_MARKERS: OnceLock<Regex> = OnceLock::new();
    RE_MARKERS.get_or_init(|| Regex::new(r"[*_`~\[\]]").expect("valid marker pattern"))
}

fn whitespace_pattern() -> &'static Regex {
    static RE_WS: OnceLock<Regex> = OnceLock::new();
    RE_WS.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

fn non_slug_pattern() -> &'static Regex {
    static RE_NON_SLUG: OnceLock<Regex> = OnceLock::new();
    // ASCII word characters, CJK unified ideographs and hyphens survive
    RE_NON_SLUG.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9_\x{4e00}-\x{9fff}-]").expect("valid slug pattern")
    })
}

/// Extract ATX headings from markdown text, skipping fenced code blocks
pub fn extract_headings(text: &str) -> Vec<Heading> {
    fence::markdown_lines(text)
        .filter_map(|(line_idx, line)| parse_atx_heading(line, line_idx))
        .collect()
}

fn parse_atx_heading(line: &str, line_idx: usize) -> Option<Heading> {
    let caps = atx_pattern().captures(line.trim_end())?;
    let level = caps.get(1)?.as_str().len() as u8;
    let text = strip_inline_markers(caps.get(2)?.as_str());
    let anchor = slugify(&text);

    Some(Heading {
        level,
        text,
        line: line_idx,
        anchor,
    })
}

/// Remove emphasis, code and link-bracket markers from heading text
pub fn strip_inline_markers(text: &str) -> String {
    inline_marker_pattern().replace_all(text, "").trim().to_string()
}

/// Create an anchor id from heading text.
///
/// The renderer must call this with the same input when it attaches ids to
/// heading elements, otherwise table-of-contents links stop resolving.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let hyphenated = whitespace_pattern().replace_all(&lower, "-");
    non_slug_pattern().replace_all(&hyphenated, "").into_owned()
}

/// Shallowest heading level present, if any
pub fn min_level(headings: &[Heading]) -> Option<u8> {
    headings.iter().map(|h| h.level).min()
}

/// Find the heading that starts on a given source line
pub fn heading_at_line(headings: &[Heading], line: usize) -> Option<&Heading> {
    headings
        .binary_search_by_key(&line, |h| h.line)
        .ok()
        .map(|idx| &headings[idx])
}
