//! ANSI terminal presentation surface.

use berrypad_preview::{
    BlockStyle, InlineStyle, PresentationSurface, Scrollable, SpanStyle, SurfaceError,
    clamp_fraction,
};
use owo_colors::{OwoColorize, Style};

/// Collects rendered preview output as (optionally) ANSI-styled text.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    out: String,
    color: bool,
    editable: bool,
    fraction: f64,
}

impl TerminalSurface {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn output(&self) -> &str {
        &self.out
    }
}

fn style_for(span: SpanStyle) -> Style {
    let mut style = match span.block {
        BlockStyle::Heading(1) => Style::new().bold().underline().magenta(),
        BlockStyle::Heading(_) => Style::new().bold().magenta(),
        BlockStyle::Code => Style::new().cyan(),
        BlockStyle::Quote => Style::new().italic().dimmed(),
        BlockStyle::Rule | BlockStyle::Placeholder => Style::new().dimmed(),
        BlockStyle::Error => Style::new().bold().red(),
        BlockStyle::Paragraph | BlockStyle::ListItem => Style::new(),
    };
    if span.inline.contains(InlineStyle::BOLD) {
        style = style.bold();
    }
    if span.inline.contains(InlineStyle::ITALIC) {
        style = style.italic();
    }
    if span.inline.contains(InlineStyle::CODE) {
        style = style.cyan();
    }
    if span.inline.contains(InlineStyle::STRIKETHROUGH) {
        style = style.strikethrough();
    }
    style
}

impl Scrollable for TerminalSurface {
    fn scroll_fraction(&self) -> f64 {
        self.fraction
    }

    fn scroll_to(&mut self, fraction: f64) {
        self.fraction = clamp_fraction(fraction);
    }
}

impl PresentationSurface for TerminalSurface {
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
        self.out.clear();
        Ok(())
    }

    fn append(&mut self, text: &str, span: SpanStyle) -> Result<(), SurfaceError> {
        if !self.editable {
            return Err(SurfaceError::ReadOnly);
        }
        if !self.color {
            self.out.push_str(text);
            return Ok(());
        }
        // Style each line on its own so escapes never straddle a line break.
        let style = style_for(span);
        for (idx, part) in text.split('\n').enumerate() {
            if idx > 0 {
                self.out.push('\n');
            }
            if !part.is_empty() {
                self.out.push_str(&part.style(style).to_string());
            }
        }
        Ok(())
    }
}
