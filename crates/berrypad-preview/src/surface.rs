//! Presentation surface abstraction.
//!
//! The renderer only ever talks to these traits, so the same pipeline drives
//! an in-memory buffer in tests, the terminal in the CLI, or a native widget.

use crate::inline::InlineStyle;
use crate::types::clamp_fraction;

/// Errors raised by a presentation surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SurfaceError {
    #[error("surface is read-only")]
    ReadOnly,

    #[error("surface backend error: {0}")]
    Backend(String),
}

/// Block-level style of an appended span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockStyle {
    #[default]
    Paragraph,
    Heading(u8),
    Code,
    Quote,
    ListItem,
    Rule,
    Placeholder,
    Error,
}

/// Full style of an appended span: its block context plus inline flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpanStyle {
    pub block: BlockStyle,
    pub inline: InlineStyle,
}

impl SpanStyle {
    pub fn block(block: BlockStyle) -> Self {
        Self {
            block,
            inline: InlineStyle::empty(),
        }
    }

    pub fn with_inline(self, inline: InlineStyle) -> Self {
        Self { inline, ..self }
    }
}

/// Anything with a vertical scroll position expressed as a fraction.
pub trait Scrollable {
    /// Fraction of the content above the viewport top, in `[0.0, 1.0]`.
    fn scroll_fraction(&self) -> f64;

    /// Move the viewport. Out-of-range input is clamped by implementors.
    fn scroll_to(&mut self, fraction: f64);
}

/// A styled-text surface the renderer can rebuild.
///
/// Appending or clearing while not editable is an error; the renderer opens
/// the surface for the duration of a rebuild and closes it afterwards.
pub trait PresentationSurface: Scrollable {
    fn set_editable(&mut self, editable: bool);

    fn is_editable(&self) -> bool;

    fn clear(&mut self) -> Result<(), SurfaceError>;

    fn append(&mut self, text: &str, style: SpanStyle) -> Result<(), SurfaceError>;
}

impl<T: Scrollable + ?Sized> Scrollable for Box<T> {
    fn scroll_fraction(&self) -> f64 {
        (**self).scroll_fraction()
    }

    fn scroll_to(&mut self, fraction: f64) {
        (**self).scroll_to(fraction)
    }
}

impl<T: PresentationSurface + ?Sized> PresentationSurface for Box<T> {
    fn set_editable(&mut self, editable: bool) {
        (**self).set_editable(editable)
    }

    fn is_editable(&self) -> bool {
        (**self).is_editable()
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        (**self).clear()
    }

    fn append(&mut self, text: &str, style: SpanStyle) -> Result<(), SurfaceError> {
        (**self).append(text, style)
    }
}

/// In-memory presentation surface.
#[derive(Debug, Clone, Default)]
pub struct BufferSurface {
    spans: Vec<(String, SpanStyle)>,
    editable: bool,
    fraction: f64,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All spans in append order.
    pub fn spans(&self) -> &[(String, SpanStyle)] {
        &self.spans
    }

    /// Concatenated span text.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|(text, _)| text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl Scrollable for BufferSurface {
    fn scroll_fraction(&self) -> f64 {
        self.fraction
    }

    fn scroll_to(&mut self, fraction: f64) {
        self.fraction = clamp_fraction(fraction);
    }
}

impl PresentationSurface for BufferSurface {
    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn clear(&mut self) -> Result<(), SurfaceError> {
        if !self.editable {
            return Err(SurfaceError::ReadOnly);
        }
        self.spans.clear();
        Ok(())
    }

    fn append(&mut self, text: &str, style: SpanStyle) -> Result<(), SurfaceError> {
        if !self.editable {
            return Err(SurfaceError::ReadOnly);
        }
        self.spans.push((text.to_string(), style));
        Ok(())
    }
}
