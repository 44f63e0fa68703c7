use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use editor::FileSource;
use formats::ExportDocument;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Edit GeoJSON feature collections from the command line.
#[derive(Debug, Parser)]
#[command(name = "featedit", version)]
struct Cli {
    /// Editor config (JSON). Defaults apply to missing keys.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the export of an empty session.
    ExportEmpty {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import a document and export it again.
    Roundtrip {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Rename the feature under a coordinate.
    Rename {
        input: PathBuf,
        /// LON,LAT in degrees.
        #[arg(long, value_parser = tools::parse_lon_lat, allow_hyphen_values = true)]
        at: (f64, f64),
        #[arg(long)]
        name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List features with their geometry type and name.
    Inspect { input: PathBuf },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let cli = Cli::parse();
    let config = tools::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::ExportEmpty { out } => write_document(&tools::export_empty(&config)?, out.as_deref()),
        Command::Roundtrip { input, out } => {
            let doc = tools::roundtrip(&config, &FileSource::new(input))?;
            write_document(&doc, out.as_deref())
        }
        Command::Rename {
            input,
            at,
            name,
            out,
        } => {
            let doc = tools::rename(&config, &FileSource::new(input), at, &name)?;
            write_document(&doc, out.as_deref())
        }
        Command::Inspect { input } => {
            let rows = tools::inspect(&config, &FileSource::new(input))?;
            let mut stdout = std::io::stdout().lock();
            for row in rows {
                let geometry = row.geometry.as_deref().unwrap_or("-");
                writeln!(stdout, "{}\t{}\t{}", row.id, geometry, row.name)?;
            }
            Ok(())
        }
    }
}

fn write_document(doc: &ExportDocument, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, &doc.content).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), bytes = doc.content.len(), "export written");
        }
        None => println!("{}", doc.content),
    }
    Ok(())
}
