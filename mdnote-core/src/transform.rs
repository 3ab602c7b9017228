//! Structural text edits over a document snapshot
//!
//! Every operation takes the current text plus the caller's selection and
//! returns a new snapshot with the selection the caller should apply. None of
//! them fail: offsets past the end of the text are clamped first.

use regex::Regex;
use ropey::Rope;
use std::sync::OnceLock;

use crate::selection::Selection;

/// Indent inserted by the Tab key
pub const INDENT: &str = "  ";

/// Link text inserted when the selection is a URL
pub const LINK_TEXT_PLACEHOLDER: &str = "link text";

/// Destination inserted when the selection is not a URL
pub const LINK_URL_PLACEHOLDER: &str = "https://";

/// Result of a transform: the new text and where the selection goes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    pub selection: Selection,
}

impl Edit {
    fn new(rope: Rope, selection: Selection) -> Self {
        Self {
            text: rope.to_string(),
            selection,
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Replace `range` of the rope with `insert`
fn splice(rope: &mut Rope, start: usize, end: usize, insert: &str) {
    if start < end {
        rope.remove(start..end);
    }
    if !insert.is_empty() {
        rope.insert(start, insert);
    }
}

fn slice_eq(rope: &Rope, start: usize, end: usize, expected: &str) -> bool {
    end <= rope.len_chars() && rope.slice(start..end) == expected
}

/// Offset of the first character of the line containing `pos`
fn line_start(rope: &Rope, pos: usize) -> usize {
    let mut idx = pos;
    let mut chars = rope.chars_at(pos);
    while let Some(c) = chars.prev() {
        if c == '\n' {
            break;
        }
        idx -= 1;
    }
    idx
}

/// Offset of the newline ending the line containing `pos`, or the text length
fn line_end(rope: &Rope, pos: usize) -> usize {
    pos + rope.chars_at(pos).take_while(|&c| c != '\n').count()
}

/// Toggle `before`/`after` markers around the selection.
///
/// Unwraps when the selection itself carries both markers, or when the
/// markers sit immediately outside it. Otherwise wraps the selection (or
/// `placeholder` for a caret) and selects the wrapped content.
pub fn wrap_selection(
    text: &str,
    selection: Selection,
    before: &str,
    after: &str,
    placeholder: &str,
) -> Edit {
    let mut rope = Rope::from_str(text);
    let sel = selection.clamp(rope.len_chars());
    let selected = rope.slice(sel.start..sel.end).to_string();
    let before_len = char_len(before);
    let after_len = char_len(after);

    if sel.len() >= before_len + after_len
        && selected.starts_with(before)
        && selected.ends_with(after)
    {
        let inner: String = selected
            .chars()
            .skip(before_len)
            .take(sel.len() - before_len - after_len)
            .collect();
        let inner_len = char_len(&inner);
        splice(&mut rope, sel.start, sel.end, &inner);
        return Edit::new(rope, Selection::new(sel.start, sel.start + inner_len));
    }

    if sel.start >= before_len
        && slice_eq(&rope, sel.start - before_len, sel.start, before)
        && slice_eq(&rope, sel.end, sel.end + after_len, after)
    {
        let outer_start = sel.start - before_len;
        splice(&mut rope, sel.end, sel.end + after_len, "");
        splice(&mut rope, outer_start, sel.start, "");
        return Edit::new(rope, Selection::new(outer_start, outer_start + sel.len()));
    }

    let content = if sel.is_caret() { placeholder } else { selected.as_str() };
    let wrapped = format!("{before}{content}{after}");
    splice(&mut rope, sel.start, sel.end, &wrapped);
    let content_start = sel.start + before_len;
    Edit::new(
        rope,
        Selection::new(content_start, content_start + char_len(content)),
    )
}

/// Toggle `prefix` at the start of every line touched by the selection.
///
/// If every line already has the prefix it is removed from all of them,
/// otherwise it is added to all of them (a partial match counts as "not
/// all").
pub fn add_line_prefix(text: &str, selection: Selection, prefix: &str) -> Edit {
    let mut rope = Rope::from_str(text);
    let sel = selection.clamp(rope.len_chars());
    let block_start = line_start(&rope, sel.start);
    let block_end = line_end(&rope, sel.end);
    let block = rope.slice(block_start..block_end).to_string();
    let prefix_len = char_len(prefix);

    let remove = block.split('\n').all(|line| line.starts_with(prefix));
    let replaced = block
        .split('\n')
        .map(|line| match line.strip_prefix(prefix) {
            Some(rest) if remove => rest.to_string(),
            _ => format!("{prefix}{line}"),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let old_len = block_end - block_start;
    let new_len = char_len(&replaced);
    splice(&mut rope, block_start, block_end, &replaced);

    let (start, end) = if remove {
        let start = block_start.max(sel.start.saturating_sub(prefix_len));
        (start, (sel.end + new_len).saturating_sub(old_len).max(start))
    } else {
        (sel.start + prefix_len, sel.end + new_len - old_len)
    };
    Edit::new(rope, Selection::new(start, end))
}

/// Insert a structural snippet, starting it on a fresh line.
///
/// A newline is synthesised when the preceding character exists and is not
/// already a newline. The caret lands right after the inserted text.
pub fn insert_text(text: &str, selection: Selection, insert: &str) -> Edit {
    let mut rope = Rope::from_str(text);
    let sel = selection.clamp(rope.len_chars());
    let lead = if needs_leading_newline(&rope, sel.start) {
        "\n"
    } else {
        ""
    };
    let snippet = format!("{lead}{insert}");
    splice(&mut rope, sel.start, sel.end, &snippet);
    Edit::new(rope, Selection::caret(sel.start + char_len(&snippet)))
}

/// Insert a snippet on a line of its own, adding a newline after it too
/// when the following text does not already start with one.
pub fn insert_block(text: &str, selection: Selection, block: &str) -> Edit {
    let mut rope = Rope::from_str(text);
    let sel = selection.clamp(rope.len_chars());
    let lead = if needs_leading_newline(&rope, sel.start) {
        "\n"
    } else {
        ""
    };
    let trail = match rope.get_char(sel.end) {
        Some(c) if c != '\n' => "\n",
        _ => "",
    };
    let snippet = format!("{lead}{block}{trail}");
    splice(&mut rope, sel.start, sel.end, &snippet);
    Edit::new(rope, Selection::caret(sel.start + char_len(&snippet)))
}

fn needs_leading_newline(rope: &Rope, pos: usize) -> bool {
    pos > 0 && rope.char(pos - 1) != '\n'
}

fn url_pattern() -> &'static Regex {
    static RE_URL: OnceLock<Regex> = OnceLock::new();
    RE_URL.get_or_init(|| Regex::new(r"^https?://").expect("valid URL pattern"))
}

/// Check whether text looks like an absolute http(s) URL
pub fn looks_like_url(text: &str) -> bool {
    url_pattern().is_match(text)
}

/// Insert a `[text](url)` link.
///
/// A selected URL becomes the destination and the placeholder link text is
/// selected. Anything else becomes the link text and the placeholder URL is
/// selected.
pub fn insert_link(text: &str, selection: Selection) -> Edit {
    let mut rope = Rope::from_str(text);
    let sel = selection.clamp(rope.len_chars());
    let selected = rope.slice(sel.start..sel.end).to_string();
    let is_url = looks_like_url(&selected);

    let (label, url) = if is_url {
        (LINK_TEXT_PLACEHOLDER, selected.as_str())
    } else if selected.is_empty() {
        (LINK_TEXT_PLACEHOLDER, LINK_URL_PLACEHOLDER)
    } else {
        (selected.as_str(), LINK_URL_PLACEHOLDER)
    };
    let markdown = format!("[{label}]({url})");
    splice(&mut rope, sel.start, sel.end, &markdown);

    let label_start = sel.start + 1;
    let selection = if is_url {
        Selection::new(label_start, label_start + char_len(label))
    } else {
        // skip "[label]("
        let url_start = label_start + char_len(label) + 2;
        Selection::new(url_start, url_start + char_len(url))
    };
    Edit::new(rope, selection)
}

/// Replace the selection with a two-space indent and put the caret after it
pub fn indent(text: &str, selection: Selection) -> Edit {
    let mut rope = Rope::from_str(text);
    let sel = selection.clamp(rope.len_chars());
    splice(&mut rope, sel.start, sel.end, INDENT);
    Edit::new(rope, Selection::caret(sel.start + char_len(INDENT)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_selected_word() {
        let edit = wrap_selection("hello", Selection::new(0, 5), "**", "**", "bold");
        assert_eq!(edit.text, "**hello**");
        assert_eq!(edit.selection, Selection::new(2, 7));
    }

    #[test]
    fn test_wrap_twice_unwraps_from_outside() {
        let first = wrap_selection("hello", Selection::new(0, 5), "**", "**", "bold");
        let second = wrap_selection(&first.text, first.selection, "**", "**", "bold");
        assert_eq!(second.text, "hello");
        assert_eq!(second.selection, Selection::new(0, 5));
    }

    #[test]
    fn test_unwrap_when_markers_are_selected() {
        let edit = wrap_selection("say **hi** now", Selection::new(4, 10), "**", "**", "");
        assert_eq!(edit.text, "say hi now");
        assert_eq!(edit.selection, Selection::new(4, 6));
    }

    #[test]
    fn test_wrap_caret_uses_placeholder() {
        let edit = wrap_selection("ab", Selection::caret(1), "`", "`", "code");
        assert_eq!(edit.text, "a`code`b");
        assert_eq!(edit.selection, Selection::new(2, 6));
    }

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        let edit = wrap_selection("中文 text", Selection::new(0, 2), "==", "==", "");
        assert_eq!(edit.text, "==中文== text");
        assert_eq!(edit.selection, Selection::new(2, 4));

        let back = wrap_selection(&edit.text, edit.selection, "==", "==", "");
        assert_eq!(back.text, "中文 text");
    }

    #[test]
    fn test_wrap_clamps_out_of_range_selection() {
        let edit = wrap_selection("abc", Selection::new(1, 99), "*", "*", "x");
        assert_eq!(edit.text, "a*bc*");
        assert_eq!(edit.selection, Selection::new(2, 4));
    }

    #[test]
    fn test_prefix_single_line_toggle() {
        let edit = add_line_prefix("title", Selection::caret(2), "## ");
        assert_eq!(edit.text, "## title");
        assert_eq!(edit.selection, Selection::caret(5));

        let back = add_line_prefix(&edit.text, edit.selection, "## ");
        assert_eq!(back.text, "title");
        assert_eq!(back.selection, Selection::caret(2));
    }

    #[test]
    fn test_prefix_multiple_lines() {
        let text = "intro\na\nb\noutro";
        let edit = add_line_prefix(text, Selection::new(6, 9), "- ");
        assert_eq!(edit.text, "intro\n- a\n- b\noutro");
        assert_eq!(edit.selection, Selection::new(8, 13));

        let back = add_line_prefix(&edit.text, edit.selection, "- ");
        assert_eq!(back.text, text);
        assert_eq!(back.selection, Selection::new(6, 9));
    }

    #[test]
    fn test_prefix_partial_match_adds_everywhere() {
        let edit = add_line_prefix("> a\nb", Selection::new(0, 5), "> ");
        assert_eq!(edit.text, "> > a\n> b");
    }

    #[test]
    fn test_prefix_removal_never_moves_before_line_start() {
        let edit = add_line_prefix("x\n- item", Selection::caret(3), "- ");
        assert_eq!(edit.text, "x\nitem");
        assert_eq!(edit.selection, Selection::caret(2));
    }

    #[test]
    fn test_insert_text_adds_newline_mid_line() {
        let edit = insert_text("para", Selection::caret(4), "\n---\n");
        assert_eq!(edit.text, "para\n\n---\n");
        assert_eq!(edit.selection, Selection::caret(10));
    }

    #[test]
    fn test_insert_text_at_line_start() {
        let edit = insert_text("a\n", Selection::caret(2), "| x |");
        assert_eq!(edit.text, "a\n| x |");
        assert_eq!(edit.selection, Selection::caret(7));

        let edit = insert_text("", Selection::caret(0), "```\n\n```");
        assert_eq!(edit.text, "```\n\n```");
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let edit = insert_text("abc\nxyz", Selection::new(4, 7), "---");
        assert_eq!(edit.text, "abc\n---");
    }

    #[test]
    fn test_insert_block_pads_both_sides() {
        let edit = insert_block("ab", Selection::caret(1), "![x](img:0011aabb)");
        assert_eq!(edit.text, "a\n![x](img:0011aabb)\nb");
        assert_eq!(edit.selection, Selection::caret(21));
    }

    #[test]
    fn test_insert_link_with_text() {
        let edit = insert_link("see docs", Selection::new(4, 8));
        assert_eq!(edit.text, "see [docs](https://)");
        assert_eq!(edit.selection, Selection::new(11, 19));
    }

    #[test]
    fn test_insert_link_with_url() {
        let edit = insert_link("https://example.com", Selection::new(0, 19));
        assert_eq!(edit.text, "[link text](https://example.com)");
        assert_eq!(edit.selection, Selection::new(1, 10));
    }

    #[test]
    fn test_insert_link_at_caret() {
        let edit = insert_link("", Selection::caret(0));
        assert_eq!(edit.text, "[link text](https://)");
        assert_eq!(edit.selection, Selection::new(12, 20));
    }

    #[test]
    fn test_indent_inserts_two_spaces() {
        let edit = indent("- a", Selection::caret(0));
        assert_eq!(edit.text, "  - a");
        assert_eq!(edit.selection, Selection::caret(2));
    }

    #[test]
    fn test_url_detection() {
        assert!(looks_like_url("http://a"));
        assert!(looks_like_url("https://a"));
        assert!(!looks_like_url("ftp://a"));
        assert!(!looks_like_url(" https://a"));
    }
}
