//! Toolbar actions and their keyboard shortcuts

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::selection::Selection;
use crate::transform::{self, Edit};

/// Fenced code block skeleton inserted by [`EditorAction::CodeBlock`]
pub const CODE_BLOCK: &str = "```\n\n```";

/// Thematic break inserted by [`EditorAction::HorizontalRule`]
pub const HORIZONTAL_RULE: &str = "\n---\n";

/// Table skeleton inserted by [`EditorAction::Table`]
pub const TABLE: &str =
    "| Column 1 | Column 2 | Column 3 |\n| --- | --- | --- |\n| Cell | Cell | Cell |";

/// An authoring command offered by the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    Heading,
    Bold,
    Italic,
    Strikethrough,
    Highlight,
    InlineCode,
    CodeBlock,
    Link,
    UnorderedList,
    OrderedList,
    TaskList,
    Quote,
    HorizontalRule,
    Table,
    Indent,
}

/// How an action edits the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Wrap {
        before: &'static str,
        after: &'static str,
        placeholder: &'static str,
    },
    Prefix(&'static str),
    Insert(&'static str),
    Link,
    Indent,
}

impl EditorAction {
    pub const ALL: [EditorAction; 15] = [
        EditorAction::Heading,
        EditorAction::Bold,
        EditorAction::Italic,
        EditorAction::Strikethrough,
        EditorAction::Highlight,
        EditorAction::InlineCode,
        EditorAction::CodeBlock,
        EditorAction::Link,
        EditorAction::UnorderedList,
        EditorAction::OrderedList,
        EditorAction::TaskList,
        EditorAction::Quote,
        EditorAction::HorizontalRule,
        EditorAction::Table,
        EditorAction::Indent,
    ];

    pub fn kind(&self) -> ActionKind {
        use ActionKind::*;
        match self {
            EditorAction::Heading => Prefix("## "),
            EditorAction::Bold => Wrap {
                before: "**",
                after: "**",
                placeholder: "bold text",
            },
            EditorAction::Italic => Wrap {
                before: "*",
                after: "*",
                placeholder: "italic text",
            },
            EditorAction::Strikethrough => Wrap {
                before: "~~",
                after: "~~",
                placeholder: "strikethrough text",
            },
            EditorAction::Highlight => Wrap {
                before: "==",
                after: "==",
                placeholder: "highlighted text",
            },
            EditorAction::InlineCode => Wrap {
                before: "`",
                after: "`",
                placeholder: "code",
            },
            EditorAction::CodeBlock => Insert(CODE_BLOCK),
            EditorAction::Link => Link,
            EditorAction::UnorderedList => Prefix("- "),
            EditorAction::OrderedList => Prefix("1. "),
            EditorAction::TaskList => Prefix("- [ ] "),
            EditorAction::Quote => Prefix("> "),
            EditorAction::HorizontalRule => Insert(HORIZONTAL_RULE),
            EditorAction::Table => Insert(TABLE),
            EditorAction::Indent => Indent,
        }
    }

    /// Action bound to Ctrl/Cmd + `key`
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'b' => Some(EditorAction::Bold),
            'i' => Some(EditorAction::Italic),
            'd' => Some(EditorAction::Strikethrough),
            'e' => Some(EditorAction::InlineCode),
            'k' => Some(EditorAction::Link),
            _ => None,
        }
    }

    /// Shortcut label shown in the toolbar tooltip
    pub fn shortcut(&self) -> Option<&'static str> {
        match self {
            EditorAction::Bold => Some("Ctrl+B"),
            EditorAction::Italic => Some("Ctrl+I"),
            EditorAction::Strikethrough => Some("Ctrl+D"),
            EditorAction::InlineCode => Some("Ctrl+E"),
            EditorAction::Link => Some("Ctrl+K"),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorAction::Heading => "heading",
            EditorAction::Bold => "bold",
            EditorAction::Italic => "italic",
            EditorAction::Strikethrough => "strikethrough",
            EditorAction::Highlight => "highlight",
            EditorAction::InlineCode => "inline-code",
            EditorAction::CodeBlock => "code-block",
            EditorAction::Link => "link",
            EditorAction::UnorderedList => "ul",
            EditorAction::OrderedList => "ol",
            EditorAction::TaskList => "task",
            EditorAction::Quote => "quote",
            EditorAction::HorizontalRule => "hr",
            EditorAction::Table => "table",
            EditorAction::Indent => "indent",
        }
    }

    /// Apply the action to a text snapshot
    pub fn apply(&self, text: &str, selection: Selection) -> Edit {
        match self.kind() {
            ActionKind::Wrap {
                before,
                after,
                placeholder,
            } => transform::wrap_selection(text, selection, before, after, placeholder),
            ActionKind::Prefix(prefix) => transform::add_line_prefix(text, selection, prefix),
            ActionKind::Insert(snippet) => transform::insert_text(text, selection, snippet),
            ActionKind::Link => transform::insert_link(text, selection),
            ActionKind::Indent => transform::indent(text, selection),
        }
    }
}

impl fmt::Display for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EditorAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EditorAction::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| anyhow!("Unknown action: {s}"))
    }
}
