//! Error types for berrypad

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};
use std::borrow::Cow;

/// Main error type for berrypad operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum BerrypadError {
    /// Configuration could not be loaded or saved
    #[error(transparent)]
    #[diagnostic_source]
    Config(#[from] ConfigError),

    /// Preview rendering failed
    #[error("render error: {0}")]
    #[diagnostic(code(berrypad::render))]
    Render(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file extension does not name a supported format.
    #[error("unsupported config format: {0}")]
    #[diagnostic(
        code(berrypad::config::format),
        help("use a .toml or .json file")
    )]
    UnsupportedFormat(String),

    /// Reading or writing the file failed.
    #[error("config io error: {0}")]
    #[diagnostic(code(berrypad::config::io))]
    Io(#[from] std::io::Error),

    /// The file was read but did not parse.
    #[error(transparent)]
    #[diagnostic_source]
    Parse(#[from] ParseError),

    /// Serializing the config failed.
    #[error("could not serialize config: {0}")]
    #[diagnostic(code(berrypad::config::serialize))]
    Serialize(String),
}

/// Parse error with source code location information
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("parse error: {message}")]
#[diagnostic(code(berrypad::parse))]
pub struct ParseError {
    message: String,
    #[source_code]
    src: NamedSource<Cow<'static, str>>,
    #[label("here")]
    err_location: SourceSpan,
    err_line_col: Option<(usize, usize)>,
    #[help]
    advice: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, name: impl AsRef<str>, src: String) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(name, Cow::Owned(src)),
            err_location: SourceSpan::new(SourceOffset::from(0), 0),
            err_line_col: None,
            advice: None,
        }
    }

    /// Point the error at a byte range of the source.
    pub fn at_span(mut self, offset: usize, len: usize) -> Self {
        let (line, col) = offset_to_line_col(offset, &self.src);
        self.err_location = SourceSpan::new(SourceOffset::from(offset), len);
        self.err_line_col = Some((line, col));
        self
    }

    /// Point the error at a 1-based line and column of the source.
    pub fn at_line_col(mut self, line: usize, column: usize) -> Self {
        let location = SourceOffset::from_location(self.src.inner(), line, column);
        self.err_location = SourceSpan::new(location, 0);
        self.err_line_col = Some((line, column));
        self
    }

    pub fn with_advice(mut self, advice: impl Into<String>) -> Self {
        self.advice = Some(advice.into());
        self
    }

    pub fn line_col(&self) -> Option<(usize, usize)> {
        self.err_line_col
    }
}

fn offset_to_line_col(offset: usize, src: &NamedSource<Cow<'static, str>>) -> (usize, usize) {
    let mut acc_bytes = 0usize;

    for (i, line) in src.inner().split_inclusive('\n').enumerate() {
        let line_start = acc_bytes;
        acc_bytes += line.len();
        if offset < acc_bytes {
            let line_offset = offset - line_start;
            let col = line
                .char_indices()
                .take_while(|(byte_idx, _)| *byte_idx < line_offset)
                .count();
            return (i + 1, col + 1);
        }
    }
    (src.inner().lines().count().max(1), 1)
}
