//! Markdown formatting actions applied to an [`EditBuffer`].
//!
//! Four shapes cover every action:
//! - wrap: surround the selection, or insert empty delimiters and park the
//!   caret between them;
//! - line prefix: prefix each non-empty selected line, or the caret's line;
//! - insert: drop fixed text at the caret;
//! - placeholder: wrap the selection, or insert a placeholder and select it.

use crate::text::EditBuffer;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("invalid heading level {0}, expected 1 to 6")]
    InvalidHeadingLevel(u8),

    #[error("unknown format action {0:?}")]
    UnknownAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatAction {
    Strong,
    Emphasis,
    Underline,
    Code,
    Strike,
    Heading(u8),
    Quote,
    UnorderedList,
    OrderedList,
    CodeBlock,
    HorizontalRule,
    Link,
    Image,
}

enum Shape {
    Wrap(&'static str, &'static str),
    LinePrefix(String),
    Insert(&'static str),
    Placeholder(&'static str, &'static str, &'static str),
}

impl FormatAction {
    /// Heading action, validating the level.
    pub fn heading(level: u8) -> Result<Self, FormatError> {
        if (1..=6).contains(&level) {
            Ok(FormatAction::Heading(level))
        } else {
            Err(FormatError::InvalidHeadingLevel(level))
        }
    }

    /// Command name, as bound to menus and shortcuts.
    pub fn name(self) -> String {
        match self {
            FormatAction::Strong => "format.strong".into(),
            FormatAction::Emphasis => "format.emphasis".into(),
            FormatAction::Underline => "format.underline".into(),
            FormatAction::Code => "format.code".into(),
            FormatAction::Strike => "format.strike".into(),
            FormatAction::Heading(level) => format!("paragraph.heading{level}"),
            FormatAction::Quote => "paragraph.quote".into(),
            FormatAction::UnorderedList => "paragraph.unordered_list".into(),
            FormatAction::OrderedList => "paragraph.ordered_list".into(),
            FormatAction::CodeBlock => "paragraph.code_block".into(),
            FormatAction::HorizontalRule => "paragraph.horizontal_rule".into(),
            FormatAction::Link => "format.link".into(),
            FormatAction::Image => "format.image".into(),
        }
    }

    pub fn from_name(name: &str) -> Result<Self, FormatError> {
        let action = match name {
            "format.strong" => FormatAction::Strong,
            "format.emphasis" => FormatAction::Emphasis,
            "format.underline" => FormatAction::Underline,
            "format.code" => FormatAction::Code,
            "format.strike" => FormatAction::Strike,
            "paragraph.quote" => FormatAction::Quote,
            "paragraph.unordered_list" => FormatAction::UnorderedList,
            "paragraph.ordered_list" => FormatAction::OrderedList,
            "paragraph.code_block" => FormatAction::CodeBlock,
            "paragraph.horizontal_rule" => FormatAction::HorizontalRule,
            "format.link" => FormatAction::Link,
            "format.image" => FormatAction::Image,
            other => {
                let level = other
                    .strip_prefix("paragraph.heading")
                    .and_then(|l| l.parse::<u8>().ok())
                    .ok_or_else(|| FormatError::UnknownAction(other.to_string()))?;
                return Self::heading(level);
            }
        };
        Ok(action)
    }

    fn shape(self) -> Result<Shape, FormatError> {
        Ok(match self {
            FormatAction::Strong => Shape::Wrap("**", "**"),
            FormatAction::Emphasis => Shape::Wrap("*", "*"),
            FormatAction::Underline => Shape::Wrap("<u>", "</u>"),
            FormatAction::Code => Shape::Wrap("`", "`"),
            FormatAction::Strike => Shape::Wrap("~~", "~~"),
            FormatAction::Heading(level) => {
                Self::heading(level)?;
                Shape::LinePrefix(format!("{} ", "#".repeat(level as usize)))
            }
            FormatAction::Quote => Shape::LinePrefix("> ".into()),
            FormatAction::UnorderedList => Shape::LinePrefix("- ".into()),
            FormatAction::OrderedList => Shape::LinePrefix("1. ".into()),
            FormatAction::CodeBlock => Shape::Wrap("```\n", "\n```"),
            FormatAction::HorizontalRule => Shape::Insert("\n---\n"),
            FormatAction::Link => Shape::Placeholder("[", "](url)", "link text"),
            FormatAction::Image => Shape::Placeholder("![", "](url)", "alt text"),
        })
    }

    /// Apply the action at the buffer's caret or selection.
    pub fn apply(self, buf: &mut EditBuffer) -> Result<(), FormatError> {
        match self.shape()? {
            Shape::Wrap(prefix, suffix) => wrap(buf, prefix, suffix),
            Shape::LinePrefix(prefix) => prefix_lines(buf, &prefix),
            Shape::Insert(text) => {
                let at = buf.cursor();
                buf.set_cursor(at);
                buf.type_text(text);
            }
            Shape::Placeholder(prefix, suffix, placeholder) => {
                if buf.has_selection() {
                    wrap(buf, prefix, suffix);
                } else {
                    let at = buf.cursor();
                    buf.type_text(&format!("{prefix}{placeholder}{suffix}"));
                    let start = at + prefix.chars().count();
                    buf.select(start, start + placeholder.chars().count());
                }
            }
        }
        tracing::trace!(
            target: "berrypad::format",
            action = %self.name(),
            cursor = buf.cursor(),
            "applied format"
        );
        Ok(())
    }
}

fn wrap(buf: &mut EditBuffer, prefix: &str, suffix: &str) {
    let range = buf.selection().to_range();
    if range.is_empty() {
        let at = range.start;
        buf.type_text(&format!("{prefix}{suffix}"));
        buf.set_cursor(at + prefix.chars().count());
        return;
    }
    let selected = buf.slice(range.clone()).unwrap_or_default();
    let wrapped = format!("{prefix}{selected}{suffix}");
    let end = range.start + wrapped.chars().count();
    buf.replace(range, &wrapped);
    buf.set_cursor(end);
}

fn prefix_lines(buf: &mut EditBuffer, prefix: &str) {
    let selection = buf.selection();
    if selection.is_collapsed() {
        let line = buf.line_of(selection.head);
        let start = buf.line_start(line);
        buf.insert(start, prefix);
        buf.set_cursor(start + prefix.chars().count());
        return;
    }

    let first = buf.line_of(selection.start());
    let last = buf.line_of(selection.end());
    // Bottom-up so earlier line offsets stay valid.
    for line in (first..=last).rev() {
        if !buf.line_text(line).trim().is_empty() {
            let start = buf.line_start(line);
            buf.insert(start, prefix);
        }
    }
    let end = buf.line_end(last);
    buf.set_cursor(end);
}
