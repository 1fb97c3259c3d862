//! Settle CLI
//!
//! Drives spring channels synchronously and prints how they settle:
//! - `trace`: one channel from a start value to a target
//! - `parallax`: one channel per configured layer following a scroll script
//! - `init`: write a default settle.toml

mod config;
mod parallax;
mod trace;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::{SettleConfig, CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "settle")]
#[command(about = "Spring-settling playground for animated values")]
#[command(version)]
struct Cli {
    /// Path to settle.toml (defaults to ./settle.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log engine activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a single channel toward a target and print every tick
    Trace {
        /// Starting value
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        from: f32,

        /// Target value
        #[arg(long, default_value = "100", allow_negative_numbers = true)]
        to: f32,

        /// Number of ticks to run
        #[arg(long, default_value = "120")]
        ticks: usize,

        /// Seconds per tick (defaults to one reference frame)
        #[arg(long)]
        dt: Option<f32>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },

    /// Settle parallax layers at each scroll offset in turn
    Parallax {
        /// Comma-separated scroll offsets in pixels
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "0,400,800",
            allow_negative_numbers = true
        )]
        scroll: Vec<f32>,

        /// Give up on a scroll stop after this many ticks
        #[arg(long, default_value = "600")]
        ticks_per_stop: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: Format,
    },

    /// Write a default settle.toml
    Init {
        /// Directory to write into
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_accepts_negative_offsets() {
        let cli = Cli::try_parse_from(["settle", "parallax", "--scroll", "-100,0,250.5"]).unwrap();
        match cli.command {
            Command::Parallax { scroll, .. } => assert_eq!(scroll, vec![-100.0, 0.0, 250.5]),
            other => panic!("expected parallax, got {other:?}"),
        }
    }

    #[test]
    fn trace_accepts_negative_endpoints() {
        let cli = Cli::try_parse_from(["settle", "trace", "--from", "-5", "--to", "-50"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Trace { from, to, .. } if from == -5.0 && to == -50.0
        ));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Init { path, force } => init(&path, force),
        Command::Trace {
            from,
            to,
            ticks,
            dt,
            format,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let samples = trace::run(&config, from, to, ticks, dt)?;
            trace::write(&mut out, &samples, format)
        }
        Command::Parallax {
            scroll,
            ticks_per_stop,
            format,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let stops = parallax::run(&config, &scroll, ticks_per_stop)?;
            parallax::write(&mut out, &stops, format)
        }
    }
}

/// An explicit `--config` must exist; the implicit ./settle.toml may not.
fn load_config(path: Option<&Path>) -> Result<SettleConfig> {
    match path {
        Some(path) => SettleConfig::load(path, true),
        None => SettleConfig::load(Path::new(CONFIG_FILE), false),
    }
}

fn init(dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    fs::write(&path, SettleConfig::new().to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote {}", path.display());
    Ok(())
}
