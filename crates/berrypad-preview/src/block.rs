//! Block classification.
//!
//! Splits raw document text into an ordered list of structural blocks with a
//! single forward scan. Each construct is recognised by its first line and
//! then consumes as many following lines as belong to it, so the line ranges
//! of the returned blocks partition the input exactly.

use std::ops::Range;

/// A structurally classified unit of document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A blank separator line.
    Empty,
    /// `---`, `***`, `___` or `+++` on a line of its own.
    HorizontalRule,
    /// `#` through `######` followed by a space.
    Header { level: u8, text: String },
    /// Lines between triple-backtick fences, verbatim, fences excluded.
    CodeFence { lines: Vec<String> },
    /// Contiguous `>` lines with the marker stripped.
    Quote { lines: Vec<String> },
    /// Contiguous list item lines.
    List { items: Vec<ListItem> },
    /// Anything else, up to the next line that starts another construct.
    Paragraph { lines: Vec<String> },
}

/// One line of a [`Block::List`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// The source marker: `-`, `*`, `+` or `<digits>.`.
    pub marker: String,
    pub text: String,
}

impl ListItem {
    pub fn new(marker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            text: text.into(),
        }
    }
}

impl Block {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Empty => "empty",
            Block::HorizontalRule => "rule",
            Block::Header { .. } => "header",
            Block::CodeFence { .. } => "code",
            Block::Quote { .. } => "quote",
            Block::List { .. } => "list",
            Block::Paragraph { .. } => "paragraph",
        }
    }

    /// Joined inline text of a paragraph, see [`join_paragraph`].
    pub fn paragraph_text(&self) -> Option<String> {
        match self {
            Block::Paragraph { lines } => Some(join_paragraph(lines)),
            _ => None,
        }
    }
}

/// A block together with the source lines it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub block: Block,
    /// Zero-based, half-open range of source line indices.
    pub lines: Range<usize>,
}

/// Marker for a forced line break inside joined paragraph text.
pub const HARD_BREAK: char = '\n';

/// Classify `text` into blocks with their source line ranges.
pub fn classify(text: &str) -> Vec<BlockSpan> {
    let lines: Vec<&str> = text.lines().collect();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let start = i;
        let line = lines[i];

        let block = if is_blank(line) {
            i += 1;
            Block::Empty
        } else if is_rule(line) {
            i += 1;
            Block::HorizontalRule
        } else if is_fence(line) {
            i += 1;
            let mut body = Vec::new();
            while i < lines.len() && !is_fence(lines[i]) {
                body.push(lines[i].to_string());
                i += 1;
            }
            // An unterminated fence runs to the end of the document.
            if i < lines.len() {
                i += 1;
            }
            Block::CodeFence { lines: body }
        } else if is_quote(line) {
            let mut body = Vec::new();
            while i < lines.len() && is_quote(lines[i]) {
                body.push(strip_quote(lines[i]).to_string());
                i += 1;
            }
            Block::Quote { lines: body }
        } else if list_item(line).is_some() {
            let mut items = Vec::new();
            while let Some(item) = lines.get(i).and_then(|l| list_item(l)) {
                items.push(item);
                i += 1;
            }
            Block::List { items }
        } else if let Some((level, text)) = header(line) {
            i += 1;
            Block::Header {
                level,
                text: text.to_string(),
            }
        } else {
            let mut body = vec![line.to_string()];
            i += 1;
            while i < lines.len() && !starts_block(lines[i]) {
                body.push(lines[i].to_string());
                i += 1;
            }
            Block::Paragraph { lines: body }
        };

        spans.push(BlockSpan {
            block,
            lines: start..i,
        });
    }

    tracing::trace!(
        target: "berrypad::classify",
        lines = lines.len(),
        blocks = spans.len(),
        "classified document"
    );
    spans
}

/// Classify `text`, dropping line ranges.
pub fn classify_blocks(text: &str) -> Vec<Block> {
    classify(text).into_iter().map(|span| span.block).collect()
}

/// Join paragraph source lines into one inline string.
///
/// Lines are trimmed and joined with a single space. A line that ends in two
/// or more spaces is followed by [`HARD_BREAK`] instead of a space.
pub fn join_paragraph(lines: &[String]) -> String {
    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            let prev = &lines[idx - 1];
            if prev.ends_with("  ") {
                out.push(HARD_BREAK);
            } else {
                out.push(' ');
            }
        }
        out.push_str(line.trim());
    }
    out
}

/// Whether `line` would open a block other than a paragraph.
pub fn starts_block(line: &str) -> bool {
    is_blank(line)
        || is_rule(line)
        || is_fence(line)
        || is_quote(line)
        || list_item(line).is_some()
        || header(line).is_some()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first @ ('-' | '*' | '_' | '+')) => {
            trimmed.len() >= 3 && chars.all(|c| c == first)
        }
        _ => false,
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn is_quote(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

fn strip_quote(line: &str) -> &str {
    let rest = line.trim_start();
    let rest = rest.strip_prefix('>').unwrap_or(rest);
    rest.strip_prefix(' ').unwrap_or(rest)
}

fn list_item(line: &str) -> Option<ListItem> {
    let trimmed = line.trim_start();
    let marker_len = match trimmed.chars().next()? {
        '-' | '*' | '+' => 1,
        c if c.is_ascii_digit() => {
            let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
            if trimmed[digits..].starts_with('.') {
                digits + 1
            } else {
                return None;
            }
        }
        _ => return None,
    };
    let rest = &trimmed[marker_len..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(ListItem::new(&trimmed[..marker_len], rest.trim()))
}

fn header(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = line[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, rest.trim()))
}
