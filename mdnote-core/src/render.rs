//! HTML preview rendering
//!
//! Turns document text into HTML for the preview pane. Heading ids and
//! checkbox attributes are derived from the same source scans the editor
//! uses, so table-of-contents links and checkbox toggles land on the right
//! source lines.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::sync::OnceLock;

use crate::fence::{self, LineClass};
use crate::image::ImageStore;
use crate::tasks;
use crate::toc::{self, Heading};

/// Preview rendering switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render `==text==` as `<mark>text</mark>`
    pub highlight: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { highlight: true }
    }
}

/// A checkbox as emitted in the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedCheckbox {
    /// Index into `tasks::task_lines`, absent when the line is not a task line
    /// there (for example a task item inside a blockquote)
    pub ordinal: Option<usize>,
    /// Source line the checkbox was parsed from
    pub line: usize,
    pub checked: bool,
}

/// Rendered preview with the data needed to wire up interaction
#[derive(Debug, Clone, Default)]
pub struct Preview {
    pub html: String,
    pub headings: Vec<Heading>,
    pub checkboxes: Vec<RenderedCheckbox>,
}

impl Preview {
    /// Source line of the checkbox that `tasks::toggle_task(ordinal)` flips
    pub fn checkbox_line(&self, ordinal: usize) -> Option<usize> {
        self.checkboxes
            .iter()
            .find(|cb| cb.ordinal == Some(ordinal))
            .map(|cb| cb.line)
    }
}

fn highlight_pattern() -> &'static Regex {
    static RE_MARK: OnceLock<Regex> = OnceLock::new();
    RE_MARK.get_or_init(|| Regex::new(r"==([^=\n]+)==").expect("valid highlight pattern"))
}

/// Rewrite `==text==` spans outside code fences as `<mark>` elements
pub fn expand_highlights(text: &str) -> String {
    let classes = fence::classify_lines(text.split('\n'));
    text.split('\n')
        .zip(classes)
        .map(|(line, class)| match class {
            LineClass::Markdown => highlight_pattern()
                .replace_all(line, "<mark>$1</mark>")
                .into_owned(),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte offsets at which each line starts
fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect()
}

fn line_of(starts: &[usize], offset: usize) -> usize {
    starts.partition_point(|&start| start <= offset).saturating_sub(1)
}

fn checkbox_html(checkbox: &RenderedCheckbox) -> String {
    let checked = if checkbox.checked { " checked=\"\"" } else { "" };
    let index = checkbox
        .ordinal
        .map(|ordinal| format!(" data-task-index=\"{ordinal}\""))
        .unwrap_or_default();
    format!(
        "<input type=\"checkbox\"{index} data-source-line=\"{}\"{checked}/>",
        checkbox.line
    )
}

/// Render document text to HTML.
///
/// Highlights are expanded on the raw text, then image placeholders are
/// resolved against `images`, so base64 padding in a payload is never read as
/// a highlight marker. Neither step spans lines, so source line numbers stay
/// valid for the prepared text.
pub fn render_preview(text: &str, images: &ImageStore, options: &RenderOptions) -> Preview {
    let headings = toc::extract_headings(text);
    let task_lines = tasks::task_lines(text);

    let prepared = if options.highlight {
        images.resolve(&expand_highlights(text))
    } else {
        images.resolve(text)
    };
    let starts = line_starts(&prepared);

    let mut parser_options = Options::empty();
    parser_options.insert(Options::ENABLE_TABLES);
    parser_options.insert(Options::ENABLE_STRIKETHROUGH);
    parser_options.insert(Options::ENABLE_TASKLISTS);

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut checkboxes = Vec::new();
    // index of the open heading's start event, its source line and its text
    let mut open_heading: Option<(usize, usize, String)> = None;

    for (event, range) in Parser::new_ext(&prepared, parser_options).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                open_heading = Some((events.len(), line_of(&starts, range.start), String::new()));
                events.push(event);
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((idx, line, rendered_text)) = open_heading.take() {
                    let anchor = toc::heading_at_line(&headings, line)
                        .map(|h| h.anchor.clone())
                        .unwrap_or_else(|| toc::slugify(rendered_text.trim()));
                    if let Event::Start(Tag::Heading { id, .. }) = &mut events[idx] {
                        *id = Some(CowStr::from(anchor));
                    }
                }
                events.push(event);
            }
            Event::TaskListMarker(checked) => {
                let line = line_of(&starts, range.start);
                let checkbox = RenderedCheckbox {
                    ordinal: task_lines.binary_search(&line).ok(),
                    line,
                    checked,
                };
                events.push(Event::InlineHtml(CowStr::from(checkbox_html(&checkbox))));
                checkboxes.push(checkbox);
            }
            Event::Text(ref t) | Event::Code(ref t) => {
                if let Some((_, _, rendered_text)) = open_heading.as_mut() {
                    rendered_text.push_str(t);
                }
                events.push(event);
            }
            other => events.push(other),
        }
    }

    let mut html_out = String::with_capacity(prepared.len() * 3 / 2);
    html::push_html(&mut html_out, events.into_iter());

    Preview {
        html: html_out,
        headings,
        checkboxes,
    }
}
