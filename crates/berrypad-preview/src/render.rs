//! Incremental renderer.
//!
//! Rebuilds a [`PresentationSurface`] from raw document text: classify into
//! blocks, expand inline runs, append styled spans. The reader's scroll
//! position survives the rebuild, except on the first render of a document.

use std::collections::HashSet;

use berrypad_common::PreviewConfig;
use berrypad_common::perf::TimingGuard;

use crate::block::{Block, classify, join_paragraph};
use crate::inline::format_inline;
use crate::surface::{BlockStyle, PresentationSurface, SpanStyle, SurfaceError};
use crate::types::DocumentId;

/// Text appended for a horizontal rule.
pub const RULE_GLYPH: &str = "────────────────────────";

/// Errors raised while rebuilding the surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// What ended up on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Content,
    Placeholder,
    Error,
}

/// Summary of a single render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub kind: RenderKind,
    pub blocks: usize,
    pub runs: usize,
    /// Message shown in the error block, if the render failed.
    pub error: Option<String>,
}

impl RenderOutcome {
    fn content(blocks: usize, runs: usize) -> Self {
        Self {
            kind: RenderKind::Content,
            blocks,
            runs,
            error: None,
        }
    }

    fn placeholder() -> Self {
        Self {
            kind: RenderKind::Placeholder,
            blocks: 0,
            runs: 0,
            error: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            kind: RenderKind::Error,
            blocks: 0,
            runs: 0,
            error: Some(message),
        }
    }

    pub fn is_content(&self) -> bool {
        self.kind == RenderKind::Content
    }
}

/// Drives classification and inline formatting onto a presentation surface.
#[derive(Debug)]
pub struct IncrementalRenderer {
    bullet: String,
    placeholder: String,
    /// Documents rendered at least once; their scroll position is preserved.
    rendered: HashSet<DocumentId>,
}

impl Default for IncrementalRenderer {
    fn default() -> Self {
        Self::new(&PreviewConfig::default())
    }
}

impl IncrementalRenderer {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            bullet: config.bullet.clone(),
            placeholder: config.placeholder.clone(),
            rendered: HashSet::new(),
        }
    }

    /// Whether `id` has been rendered since it was opened.
    pub fn has_rendered(&self, id: &DocumentId) -> bool {
        self.rendered.contains(id)
    }

    /// Drop first-render state for a closed document.
    pub fn forget(&mut self, id: &DocumentId) {
        self.rendered.remove(id);
    }

    /// Carry first-render state over to a renamed document.
    pub fn rename(&mut self, from: &DocumentId, to: &DocumentId) {
        if self.rendered.remove(from) {
            self.rendered.insert(to.clone());
        }
    }

    /// Rebuild `surface` from `content`.
    ///
    /// The surface is editable only while the rebuild runs and is left
    /// read-only afterwards. Holding `&mut self` for the whole call rules out
    /// a second render starting mid-rebuild.
    ///
    /// Never fails: errors are shown on the surface as an error block and
    /// reported through the returned outcome.
    pub fn render(
        &mut self,
        surface: &mut dyn PresentationSurface,
        identity: Option<&DocumentId>,
        content: &str,
    ) -> RenderOutcome {
        let timing = TimingGuard::new("preview render");
        let first = identity.is_none_or(|id| !self.rendered.contains(id));
        let fraction = surface.scroll_fraction();

        surface.set_editable(true);

        let outcome = match self.rebuild(surface, content) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(target: "berrypad::render", error = %err, "render failed");
                self.show_error(surface, &err);
                RenderOutcome::error(err.to_string())
            }
        };

        surface.set_editable(false);
        surface.scroll_to(if first { 0.0 } else { fraction });
        if let Some(id) = identity {
            self.rendered.insert(id.clone());
        }

        tracing::debug!(
            target: "berrypad::render",
            document = identity.map(DocumentId::as_str),
            kind = ?outcome.kind,
            blocks = outcome.blocks,
            runs = outcome.runs,
            first,
            elapsed_ms = timing.elapsed_ms(),
            "rendered preview"
        );
        outcome
    }

    fn rebuild(
        &self,
        surface: &mut dyn PresentationSurface,
        content: &str,
    ) -> Result<RenderOutcome, RenderError> {
        surface.clear()?;

        if content.trim().is_empty() {
            let style = SpanStyle::block(BlockStyle::Placeholder);
            surface.append(&self.placeholder, style)?;
            surface.append("\n", style)?;
            return Ok(RenderOutcome::placeholder());
        }

        let spans = classify(content);
        let mut runs = 0;
        for span in &spans {
            runs += self.emit(surface, &span.block)?;
        }
        Ok(RenderOutcome::content(spans.len(), runs))
    }

    /// Append one block, returning the number of text runs written.
    fn emit(
        &self,
        surface: &mut dyn PresentationSurface,
        block: &Block,
    ) -> Result<usize, RenderError> {
        match block {
            Block::Empty => {
                surface.append("\n", SpanStyle::block(BlockStyle::Paragraph))?;
                Ok(0)
            }
            Block::HorizontalRule => {
                let style = SpanStyle::block(BlockStyle::Rule);
                surface.append(RULE_GLYPH, style)?;
                surface.append("\n", style)?;
                Ok(0)
            }
            Block::Header { level, text } => {
                emit_runs(surface, text, BlockStyle::Heading(*level))
            }
            Block::CodeFence { lines } => {
                let style = SpanStyle::block(BlockStyle::Code);
                for line in lines {
                    surface.append(line, style)?;
                    surface.append("\n", style)?;
                }
                Ok(lines.len())
            }
            Block::Quote { lines } => {
                let mut runs = 0;
                for line in lines {
                    runs += emit_runs(surface, line, BlockStyle::Quote)?;
                }
                Ok(runs)
            }
            Block::List { items } => {
                let marker = format!("{} ", self.bullet);
                let mut runs = 0;
                for item in items {
                    surface.append(&marker, SpanStyle::block(BlockStyle::ListItem))?;
                    runs += emit_runs(surface, &item.text, BlockStyle::ListItem)?;
                }
                Ok(runs)
            }
            Block::Paragraph { lines } => {
                emit_runs(surface, &join_paragraph(lines), BlockStyle::Paragraph)
            }
        }
    }

    fn show_error(&self, surface: &mut dyn PresentationSurface, err: &RenderError) {
        fn draw(surface: &mut dyn PresentationSurface, message: &str) -> Result<(), SurfaceError> {
            let style = SpanStyle::block(BlockStyle::Error);
            surface.clear()?;
            surface.append(message, style)?;
            surface.append("\n", style)
        }

        if let Err(surface_err) = draw(surface, &format!("Render error: {err}")) {
            tracing::warn!(
                target: "berrypad::render",
                error = %surface_err,
                "could not show render error on surface"
            );
        }
    }
}

fn emit_runs(
    surface: &mut dyn PresentationSurface,
    text: &str,
    block: BlockStyle,
) -> Result<usize, RenderError> {
    let runs = format_inline(text);
    for run in &runs {
        surface.append(&run.text, SpanStyle::block(block).with_inline(run.style))?;
    }
    surface.append("\n", SpanStyle::block(block))?;
    Ok(runs.len())
}
