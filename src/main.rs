//! splat-convert - rewrites a binary PLY splat file into the 17-float
//! scheme B vertex layout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use splat_convert::{convert_with_options, print_summary, summarize, ConvertOptions, WriteMode};

#[derive(Parser)]
#[command(name = "splat-convert")]
#[command(about = "Scheme-B: teaser.ply -> converted0112.ply")]
#[command(version)]
struct Cli {
    /// Input PLY path
    #[arg(long, alias = "teaser", default_value = "PLY/teaser.ply")]
    input: PathBuf,

    /// Output PLY path
    #[arg(long, alias = "out", default_value = "PLY/converted0112.ply")]
    output: PathBuf,

    /// Write to a temporary file and rename it into place on success
    #[arg(long)]
    atomic: bool,

    /// Reject inputs that declare elements before vertex
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ConvertOptions {
        write_mode: if cli.atomic {
            WriteMode::Atomic
        } else {
            WriteMode::Direct
        },
        strict_layout: cli.strict,
        ..ConvertOptions::default()
    };

    convert_with_options(&cli.input, &cli.output, &options).with_context(|| {
        format!(
            "converting {} -> {}",
            cli.input.display(),
            cli.output.display()
        )
    })?;

    let stdout = std::io::stdout();
    for path in [&cli.input, &cli.output] {
        let summary = summarize(path).with_context(|| format!("reading {}", path.display()))?;
        print_summary(stdout.lock(), &summary)?;
    }
    Ok(())
}
