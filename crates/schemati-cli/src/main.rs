//! Schemati CLI entry point.

mod args;

use args::{Args, Command, ExportArgs, Format};
use clap::Parser;
use log::{debug, error, info};
use schemati_core::context::DiagramStatistics;
use schemati_core::{DocumentError, Viewport, document};
use schemati_render::export::{self, ExportError, ExportOptions};
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize statistics: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    debug!("parsed arguments: {args:?}");

    if let Err(err) = run(args.command) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Export(args) => {
            match export_document(&args)? {
                Some(path) => info!("wrote {}", path.display()),
                None => info!("nothing exported"),
            }
            Ok(())
        }
        Command::Stats { document: path } => {
            let diagram = document::load(&path)?;
            let stats = DiagramStatistics::compute(&diagram);
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

fn export_document(args: &ExportArgs) -> Result<Option<PathBuf>, CliError> {
    let diagram = document::load(&args.document)?;
    let options = export_options(args)?;
    let visible = Viewport::default().visible_rect();
    info!(
        "exporting {} as {:?} (scale {}, padding {})",
        args.document.display(),
        args.format,
        options.clamped_scale(),
        options.padding
    );
    let written = match args.format {
        Format::Png => export::export_raster(&diagram, visible, &options)?,
        Format::Svg => export::export_vector(&diagram, visible, &options)?,
    };
    Ok(written)
}

/// Config file first, then command-line overrides.
fn export_options(args: &ExportArgs) -> Result<ExportOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => load_config(path)?,
        None => ExportOptions::default(),
    };

    options.filename = match &args.output {
        Some(output) => output.to_string_lossy().into_owned(),
        None => args.document.with_extension("").to_string_lossy().into_owned(),
    };
    if let Some(scale) = args.scale {
        options.scale = scale;
    }
    if let Some(padding) = args.padding {
        options.padding = padding;
    }
    if args.transparent {
        options.transparent_background = true;
    }
    if args.no_crop {
        options.crop_to_content = false;
    }
    Ok(options)
}

fn load_config(path: &Path) -> Result<ExportOptions, CliError> {
    let json = std::fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}
