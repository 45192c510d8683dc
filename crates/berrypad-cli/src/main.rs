mod terminal;

use std::path::{Path, PathBuf};

use berrypad_common::telemetry::{self, TelemetryConfig};
use berrypad_common::{BerrypadError, FileStore, PreviewConfig};
use berrypad_preview::{Block, BlockSpan, DocumentId, IncrementalRenderer, classify};
use clap::{Parser, Subcommand};
use miette::Result;

use crate::terminal::TerminalSurface;

#[derive(Parser)]
#[command(version, about = "Berrypad - markdown live preview, in the terminal", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a .toml or .json preview config
    #[arg(long, global = true, env = "BERRYPAD_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file the way the preview pane shows it
    Render {
        file: PathBuf,

        /// Disable ANSI styling
        #[arg(long)]
        plain: bool,
    },
    /// Print the classified blocks of a markdown file with their line ranges
    Blocks { file: PathBuf },
}

fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();

    let mut telemetry_config = TelemetryConfig::from_env("berrypad");
    if cli.verbose {
        telemetry_config = telemetry_config.with_level(tracing::Level::DEBUG);
    }
    telemetry::init(telemetry_config);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render { file, plain } => render_file(&file, &config, !plain)?,
        Commands::Blocks { file } => print_blocks(&file)?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PreviewConfig, BerrypadError> {
    match path {
        Some(path) => {
            let config = PreviewConfig::load_or_default(&FileStore::new(path))?;
            tracing::debug!(target: "berrypad::cli", path = %path.display(), ?config, "loaded config");
            Ok(config)
        }
        None => Ok(PreviewConfig::default()),
    }
}

fn read_document(path: &Path) -> Result<String, BerrypadError> {
    Ok(std::fs::read_to_string(path)?)
}

fn render_file(path: &Path, config: &PreviewConfig, color: bool) -> Result<(), BerrypadError> {
    let content = read_document(path)?;
    let identity = DocumentId::new(path.display().to_string());

    let mut surface = TerminalSurface::new(color);
    let outcome = IncrementalRenderer::new(config).render(&mut surface, Some(&identity), &content);
    if let Some(message) = outcome.error {
        return Err(BerrypadError::Render(message));
    }

    tracing::info!(
        target: "berrypad::cli",
        document = %identity,
        blocks = outcome.blocks,
        runs = outcome.runs,
        "rendered"
    );
    print!("{}", surface.output());
    Ok(())
}

fn print_blocks(path: &Path) -> Result<(), BerrypadError> {
    let content = read_document(path)?;
    for span in classify(&content) {
        println!("{}", describe(&span));
    }
    Ok(())
}

/// One summary line per block: 1-based inclusive line range, kind, detail.
fn describe(span: &BlockSpan) -> String {
    let detail = match &span.block {
        Block::Empty | Block::HorizontalRule => String::new(),
        Block::Header { level, text } => format!("h{level} {text:?}"),
        Block::CodeFence { lines } => format!("{} lines", lines.len()),
        Block::Quote { lines } => format!("{:?}", lines.join(" ")),
        Block::List { items } => {
            let markers: Vec<&str> = items.iter().map(|i| i.marker.as_str()).collect();
            format!("{} items [{}]", items.len(), markers.join(" "))
        }
        Block::Paragraph { .. } => {
            format!("{:?}", span.block.paragraph_text().unwrap_or_default())
        }
    };
    let range = format!("{}-{}", span.lines.start + 1, span.lines.end);
    format!("{range:>9}  {:<9} {detail}", span.block.kind_name())
        .trim_end()
        .to_string()
}

fn init_miette() {
    let hook = miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .context_lines(3)
                .tab_width(2)
                .build(),
        )
    }));
    if hook.is_ok() {
        miette::set_panic_hook();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_blocks() {
        let lines: Vec<String> = classify("# Title\n\n- one\n2. two\n```\nx\n```\ntext  \nmore")
            .iter()
            .map(describe)
            .collect();
        assert_eq!(
            lines,
            vec![
                "      1-1  header    h1 \"Title\"",
                "      2-2  empty",
                "      3-4  list      2 items [- 2.]",
                "      5-7  code      1 lines",
                "      8-9  paragraph \"text\\nmore\"",
            ]
        );
    }

    #[test]
    fn test_missing_config_path_uses_defaults() {
        let config = load_config(Some(Path::new("does-not-exist.toml"))).unwrap();
        assert_eq!(config, PreviewConfig::default());
        assert_eq!(load_config(None).unwrap(), PreviewConfig::default());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["berrypad", "--config", "a.toml", "render", "doc.md", "--plain"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("a.toml")));
        assert!(matches!(cli.command, Commands::Render { plain: true, .. }));
    }
}
