//! Edit-surface model.
//!
//! [`EditBuffer`] is the source pane's text plus its caret, selection, scroll
//! position and modified flag. Offsets are in chars, not bytes.

use std::fmt;
use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

use crate::bus::PreviewEvent;
use crate::surface::Scrollable;
use crate::types::{DocumentId, LineCol, Selection, clamp_fraction};

/// Ropey-backed source buffer.
#[derive(Clone, Default)]
pub struct EditBuffer {
    rope: ropey::Rope,
    selection: Selection,
    modified: bool,
    scroll: f64,
}

impl fmt::Debug for EditBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditBuffer")
            .field("len_chars", &self.rope.len_chars())
            .field("selection", &self.selection)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for EditBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl From<&str> for EditBuffer {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditBuffer {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding `s`, unmodified, caret at the start.
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
            ..Self::default()
        }
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Get a slice as SmolStr. Returns None if the range is out of bounds.
    pub fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    pub fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    /// Insert `text` at `char_offset` (clamped to the end).
    ///
    /// Caret and selection positions at or after the offset move with the
    /// text, so inserting at the caret leaves the caret after the insertion.
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = char_offset.min(self.len_chars());
        let len = text.chars().count();
        self.rope.insert(offset, text);

        let shift = |pos: usize| if pos >= offset { pos + len } else { pos };
        self.selection = Selection::new(shift(self.selection.anchor), shift(self.selection.head));
        self.modified = true;
    }

    /// Delete a char range (clamped to the buffer).
    pub fn delete(&mut self, char_range: Range<usize>) {
        let end = char_range.end.min(self.len_chars());
        let start = char_range.start.min(end);
        if start == end {
            return;
        }
        self.rope.remove(start..end);

        let removed = end - start;
        let shift = |pos: usize| {
            if pos >= end {
                pos - removed
            } else if pos > start {
                start
            } else {
                pos
            }
        };
        self.selection = Selection::new(shift(self.selection.anchor), shift(self.selection.head));
        self.modified = true;
    }

    /// Replace a char range with `text`.
    pub fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start.min(self.len_chars()), text);
    }

    /// Replace the selection (or insert at the caret) as if typed.
    pub fn type_text(&mut self, text: &str) {
        let range = self.selection.to_range();
        self.delete(range.clone());
        self.selection = Selection::collapsed(range.start);
        self.insert(range.start, text);
    }

    pub fn cursor(&self) -> usize {
        self.selection.head
    }

    /// Collapse the selection to `offset` (clamped).
    pub fn set_cursor(&mut self, offset: usize) {
        self.selection = Selection::collapsed(offset.min(self.len_chars()));
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Select `anchor..head` (both clamped).
    pub fn select(&mut self, anchor: usize, head: usize) {
        let len = self.len_chars();
        self.selection = Selection::new(anchor.min(len), head.min(len));
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_collapsed()
    }

    pub fn selected_text(&self) -> Option<SmolStr> {
        if self.selection.is_collapsed() {
            return None;
        }
        self.slice(self.selection.to_range())
    }

    /// Zero-based line containing `char_offset`.
    pub fn line_of(&self, char_offset: usize) -> usize {
        self.rope.char_to_line(char_offset.min(self.len_chars()))
    }

    /// Char offset of the start of `line`.
    pub fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.rope.len_lines().saturating_sub(1)))
    }

    /// Char offset of the end of `line`, before its line break.
    pub fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        let start = self.rope.line_to_char(line);
        let content = self.rope.line(line);
        let mut len = content.len_chars();
        if len > 0 && content.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && content.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        start + len
    }

    /// Text of `line` without its line break.
    pub fn line_text(&self, line: usize) -> SmolStr {
        self.slice(self.line_start(line)..self.line_end(line))
            .unwrap_or_default()
    }

    /// 1-based line and column of the caret.
    pub fn cursor_line_col(&self) -> LineCol {
        let head = self.selection.head.min(self.len_chars());
        let line = self.rope.char_to_line(head);
        LineCol {
            line: line + 1,
            column: head - self.rope.line_to_char(line) + 1,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clear the modified flag, returning the full text if it was set.
    pub fn take_modified(&mut self) -> Option<String> {
        if !std::mem::take(&mut self.modified) {
            return None;
        }
        Some(self.to_string())
    }

    /// `document.changed` for `identity`, if the buffer changed since last asked.
    pub fn take_change_event(&mut self, identity: &DocumentId) -> Option<PreviewEvent> {
        self.take_modified().map(|content| PreviewEvent::DocumentChanged {
            identity: identity.clone(),
            content,
        })
    }

    /// `cursor.moved` for the current caret.
    pub fn cursor_event(&self) -> PreviewEvent {
        let LineCol { line, column } = self.cursor_line_col();
        PreviewEvent::CursorMoved { line, column }
    }
}

impl Scrollable for EditBuffer {
    fn scroll_fraction(&self) -> f64 {
        self.scroll
    }

    fn scroll_to(&mut self, fraction: f64) {
        self.scroll = clamp_fraction(fraction);
    }
}
