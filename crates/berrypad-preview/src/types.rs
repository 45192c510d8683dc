//! Core preview types: document identity, panes, selection.
//!
//! These types are toolkit-agnostic and shared by every pipeline component.

use std::fmt;
use std::ops::Range;

use smol_str::SmolStr;

/// Stable key identifying one open document (usually its tab label).
///
/// Cheap to clone: labels up to 23 bytes are stored inline.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(SmolStr);

impl DocumentId {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(SmolStr::new(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

/// The two scrollable panes kept in sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pane {
    /// The source text the user types into.
    Editor,
    /// The rendered preview.
    Preview,
}

impl Pane {
    /// The pane on the other side of the split.
    pub fn other(self) -> Self {
        match self {
            Pane::Editor => Pane::Preview,
            Pane::Preview => Pane::Editor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pane::Editor => "editor",
            Pane::Preview => "preview",
        }
    }
}

/// Clamp a raw scroll position into `[0.0, 1.0]`. NaN maps to the top.
pub fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Text selection with anchor and head positions, in char offsets.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is collapsed (empty, cursor only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// 1-based line and column of a cursor, as shown in the status bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}
