//! Inline formatting: splits block text into styled runs.
//!
//! Delimiters are matched left to right. At each position the patterns are
//! tried in priority order (code, strikethrough, bold+italic, bold, italic),
//! so the leftmost match always wins and ties go to the higher priority.
//! Matched content is never re-scanned.

use bitflags::bitflags;

bitflags! {
    /// Inline style of a run. The empty set is plain text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InlineStyle: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const CODE = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
    }
}

impl Default for InlineStyle {
    fn default() -> Self {
        Self::empty()
    }
}

impl InlineStyle {
    pub fn is_plain(self) -> bool {
        self.is_empty()
    }
}

/// A contiguous piece of inline text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: InlineStyle,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: InlineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, InlineStyle::empty())
    }
}

/// Delimiter pairs in priority order.
const PATTERNS: &[(&str, InlineStyle)] = &[
    ("`", InlineStyle::CODE),
    ("~~", InlineStyle::STRIKETHROUGH),
    ("***", InlineStyle::BOLD.union(InlineStyle::ITALIC)),
    ("___", InlineStyle::BOLD.union(InlineStyle::ITALIC)),
    ("**", InlineStyle::BOLD),
    ("__", InlineStyle::BOLD),
    ("*", InlineStyle::ITALIC),
    ("_", InlineStyle::ITALIC),
];

struct Match<'a> {
    content: &'a str,
    style: InlineStyle,
    end: usize,
}

/// Tokenize `text` into styled runs.
///
/// Concatenating the returned run texts yields `text` with the matched
/// delimiters removed. Empty runs are never produced and adjacent plain runs
/// are merged.
pub fn format_inline(text: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        if let Some(m) = match_at(rest) {
            push_run(&mut runs, &text[plain_start..pos], InlineStyle::empty());
            push_run(&mut runs, m.content, m.style);
            pos += m.end;
            plain_start = pos;
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    push_run(&mut runs, &text[plain_start..], InlineStyle::empty());
    runs
}

fn match_at(rest: &str) -> Option<Match<'_>> {
    if !rest.starts_with(['`', '~', '*', '_']) {
        return None;
    }
    PATTERNS.iter().find_map(|&(delim, style)| {
        let body = rest.strip_prefix(delim)?;
        // Content stays on one line and holds at least one character.
        let line = body.split('\n').next().unwrap_or("");
        let first = line.chars().next()?;
        let close = line[first.len_utf8()..].find(delim)? + first.len_utf8();
        let content = &body[..close];
        // A run of bare delimiter characters, like `***` in prose, stays literal.
        if content.chars().all(|c| delim.starts_with(c)) {
            return None;
        }
        Some(Match {
            content,
            style,
            end: delim.len() + close + delim.len(),
        })
    })
}

fn push_run(runs: &mut Vec<StyledRun>, text: &str, style: InlineStyle) {
    if text.is_empty() {
        return;
    }
    if style.is_plain() {
        if let Some(last) = runs.last_mut().filter(|r| r.style.is_plain()) {
            last.text.push_str(text);
            return;
        }
    }
    runs.push(StyledRun::new(text, style));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, style: InlineStyle) -> StyledRun {
        StyledRun::new(text, style)
    }

    #[test]
    fn test_bold_and_italic_sentence() {
        assert_eq!(
            format_inline("Some **bold** and *italic*."),
            vec![
                run("Some ", InlineStyle::empty()),
                run("bold", InlineStyle::BOLD),
                run(" and ", InlineStyle::empty()),
                run("italic", InlineStyle::ITALIC),
                run(".", InlineStyle::empty()),
            ]
        );
    }

    #[test]
    fn test_each_pattern() {
        assert_eq!(format_inline("`x`"), vec![run("x", InlineStyle::CODE)]);
        assert_eq!(
            format_inline("~~gone~~"),
            vec![run("gone", InlineStyle::STRIKETHROUGH)]
        );
        assert_eq!(
            format_inline("***both***"),
            vec![run("both", InlineStyle::BOLD | InlineStyle::ITALIC)]
        );
        assert_eq!(
            format_inline("___both___"),
            vec![run("both", InlineStyle::BOLD | InlineStyle::ITALIC)]
        );
        assert_eq!(format_inline("__b__"), vec![run("b", InlineStyle::BOLD)]);
        assert_eq!(format_inline("_i_"), vec![run("i", InlineStyle::ITALIC)]);
    }

    #[test]
    fn test_code_is_not_rescanned() {
        assert_eq!(
            format_inline("`**not bold**`"),
            vec![run("**not bold**", InlineStyle::CODE)]
        );
    }

    #[test]
    fn test_unterminated_delimiters_are_literal() {
        assert_eq!(format_inline("a ** b"), vec![StyledRun::plain("a ** b")]);
        assert_eq!(format_inline("`open"), vec![StyledRun::plain("`open")]);
        assert_eq!(format_inline("~~"), vec![StyledRun::plain("~~")]);
    }

    #[test]
    fn test_empty_content_does_not_match() {
        assert_eq!(format_inline("``"), vec![StyledRun::plain("``")]);
        assert_eq!(format_inline("** **"), vec![run(" ", InlineStyle::BOLD)]);
    }

    #[test]
    fn test_bare_delimiter_runs_are_literal() {
        assert_eq!(format_inline("a *** b"), vec![StyledRun::plain("a *** b")]);
        assert_eq!(format_inline("x ___ y"), vec![StyledRun::plain("x ___ y")]);
        assert_eq!(format_inline("~~~~~"), vec![StyledRun::plain("~~~~~")]);
    }

    #[test]
    fn test_match_does_not_cross_hard_break() {
        assert_eq!(
            format_inline("*one\ntwo*"),
            vec![StyledRun::plain("*one\ntwo*")]
        );
        assert_eq!(
            format_inline("line\n**b**"),
            vec![run("line\n", InlineStyle::empty()), run("b", InlineStyle::BOLD)]
        );
    }

    #[test]
    fn test_leftmost_match_wins() {
        // The italic opener comes first, so it wins over the later bold.
        assert_eq!(
            format_inline("*a **b** c*"),
            vec![
                run("a ", InlineStyle::ITALIC),
                run("b", InlineStyle::ITALIC),
                run(" c", InlineStyle::ITALIC),
            ]
        );
        assert_eq!(
            format_inline("x `c` **b**"),
            vec![
                run("x ", InlineStyle::empty()),
                run("c", InlineStyle::CODE),
                run(" ", InlineStyle::empty()),
                run("b", InlineStyle::BOLD),
            ]
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            format_inline("héllo *wörld* 日本"),
            vec![
                run("héllo ", InlineStyle::empty()),
                run("wörld", InlineStyle::ITALIC),
                run(" 日本", InlineStyle::empty()),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(format_inline("").is_empty());
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn runs_are_never_empty(text in "[a-z *_`~\n]{0,40}") {
                let runs = format_inline(&text);
                prop_assert!(runs.iter().all(|r| !r.text.is_empty()));
                for pair in runs.windows(2) {
                    prop_assert!(!(pair[0].style.is_plain() && pair[1].style.is_plain()));
                }
            }

            #[test]
            fn text_without_delimiters_is_one_plain_run(text in "[a-z .,\n]{1,40}") {
                prop_assert_eq!(format_inline(&text), vec![StyledRun::plain(text.clone())]);
            }
        }
    }
}
