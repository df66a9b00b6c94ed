//! Command-line arguments for the `schemati` tool.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Export and inspect Schemati diagram documents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a diagram document to PNG or SVG
    Export(ExportArgs),
    /// Print diagram statistics as JSON
    Stats {
        /// Path to the diagram document (JSON)
        document: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
pub struct ExportArgs {
    /// Path to the diagram document (JSON)
    pub document: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Png)]
    pub format: Format,

    /// Output file; the extension is appended when missing.
    /// Defaults to the document path without its extension.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resolution multiplier, clamped to [0.5, 4]
    #[arg(long)]
    pub scale: Option<f64>,

    /// Margin around the content when cropping
    #[arg(long)]
    pub padding: Option<f64>,

    /// Leave the background transparent
    #[arg(long)]
    pub transparent: bool,

    /// Export the default viewport area instead of the content bounds
    #[arg(long)]
    pub no_crop: bool,

    /// Export options file (JSON); flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Png,
    Svg,
}
