//! Task list line index and checkbox toggling
//!
//! The preview numbers its checkboxes 0, 1, 2, ... in document order. The
//! Nth checkbox maps back to the Nth entry of [`task_lines`], so the preview
//! must never reorder or filter checkboxes on its own.

use regex::Regex;
use std::sync::OnceLock;

use crate::fence;

fn task_pattern() -> &'static Regex {
    static RE_TASK: OnceLock<Regex> = OnceLock::new();
    RE_TASK.get_or_init(|| Regex::new(r"^\s*[-*+]\s*\[([ xX])\]").expect("valid task pattern"))
}

/// A task list entry found in the source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskItem {
    pub line: usize,
    pub checked: bool,
    pub label: String,
}

/// Byte offset of the state character inside `[ ]` and whether it is checked
fn task_marker(line: &str) -> Option<(usize, bool)> {
    let state = task_pattern().captures(line)?.get(1)?;
    Some((state.start(), state.as_str() != " "))
}

/// Source line numbers of every task list item outside code fences, in
/// document order
pub fn task_lines(text: &str) -> Vec<usize> {
    fence::markdown_lines(text)
        .filter(|(_, line)| task_marker(line).is_some())
        .map(|(idx, _)| idx)
        .collect()
}

/// Task list items with their state and label
pub fn task_items(text: &str) -> Vec<TaskItem> {
    fence::markdown_lines(text)
        .filter_map(|(idx, line)| {
            let (state, checked) = task_marker(line)?;
            // skip past "x]"
            let label = line[state + 2..].trim().to_string();
            Some(TaskItem {
                line: idx,
                checked,
                label,
            })
        })
        .collect()
}

/// Toggle the Nth checkbox of the rendered document.
///
/// Returns `None` when the document has fewer checkboxes.
pub fn toggle_task(text: &str, ordinal: usize) -> Option<String> {
    let line = *task_lines(text).get(ordinal)?;
    log::debug!("Toggling task #{ordinal} at line {line}");
    toggle_task_line(text, line)
}

/// Flip `[ ]` to `[x]` (or `[x]`/`[X]` back to `[ ]`) on a single source line
/// and rejoin the document.
///
/// Only the marker that makes the line a task item changes. Returns `None`
/// when the line does not exist, is not a task item, or lies inside a code
/// fence.
pub fn toggle_task_line(text: &str, line_idx: usize) -> Option<String> {
    if *fence::code_fence_mask(text).get(line_idx)? {
        return None;
    }

    let mut lines: Vec<&str> = text.split('\n').collect();
    let line = *lines.get(line_idx)?;
    let (state, checked) = task_marker(line)?;
    let flipped = if checked { " " } else { "x" };
    let replaced = format!("{}{}{}", &line[..state], flipped, &line[state + 1..]);

    lines[line_idx] = &replaced;
    Some(lines.join("\n"))
}
