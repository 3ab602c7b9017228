//! Fenced code block detection
//!
//! Every structural scan (headings, task lists, highlight spans) runs over
//! this classification first so that Markdown-looking text inside an example
//! code block is never treated as document structure.

/// Opening and closing marker of a fenced code block
pub const FENCE_MARKER: &str = "```";

/// Classification of a single source line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineClass {
    /// Ordinary Markdown, eligible for structural parsing
    Markdown,
    /// A line that opens or closes a fence
    FenceDelimiter,
    /// Content between two delimiters
    Code,
}

impl LineClass {
    /// True when the line is a delimiter or lies inside a fence
    pub fn in_fence(&self) -> bool {
        !matches!(self, LineClass::Markdown)
    }
}

/// Check whether a line toggles the fence state
pub fn is_fence_delimiter(line: &str) -> bool {
    line.trim_start().starts_with(FENCE_MARKER)
}

/// Classify each line. There is no nesting: the next delimiter always
/// closes the open fence, whatever its info string.
pub fn classify_lines<'a, I>(lines: I) -> Vec<LineClass>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut inside = false;
    lines
        .into_iter()
        .map(|line| {
            if is_fence_delimiter(line) {
                inside = !inside;
                LineClass::FenceDelimiter
            } else if inside {
                LineClass::Code
            } else {
                LineClass::Markdown
            }
        })
        .collect()
}

/// Per-line "inside code fence" flags for a whole document
pub fn code_fence_mask(text: &str) -> Vec<bool> {
    classify_lines(text.split('\n'))
        .into_iter()
        .map(|class| class.in_fence())
        .collect()
}

/// Iterate over `(line_index, line)` pairs that lie outside any fence
pub fn markdown_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let classes = classify_lines(text.split('\n'));
    text.split('\n')
        .enumerate()
        .zip(classes)
        .filter(|(_, class)| *class == LineClass::Markdown)
        .map(|(entry, _)| entry)
}
