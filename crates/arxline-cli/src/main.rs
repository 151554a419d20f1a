//! arxline - arXiv OAI-PMH metadata harvester
//!
//! Harvests bibliographic metadata from the arXiv OAI-PMH endpoint into
//! line-delimited JSON, one object per paper.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "arxline")]
#[command(about = "arXiv OAI-PMH metadata harvester")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./arxline.toml or ~/.config/arxline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Seconds to wait before retrying a failed page fetch
    #[arg(long, global = true)]
    backoff: Option<u64>,

    /// Maximum retry attempts per page (default: retry forever)
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest a date window into one JSONL file
    Harvest(cmd::harvest::HarvestArgs),
    /// Harvest a single day into a year-partitioned tree (for cron)
    Daily(cmd::daily::DailyArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(arxline_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    arxline_core::init_logging(quiet, cli.debug, multi);

    // Load configuration
    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // Retry settings: config file defaults, CLI overrides
    if let Some(secs) = cli.backoff {
        config.retry.backoff_secs = secs;
    }
    if let Some(max) = cli.max_retries {
        config.retry.max_attempts = Some(max);
    }

    match cli.command {
        Command::Harvest(args) => cmd::harvest::run(args, &config, &progress),
        Command::Daily(args) => cmd::daily::run(args, &config, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Output directory",
                &config.output.default_dir.display().to_string(),
            ]);
            table.add_row(vec!["OAI base URL", &config.oai.base_url]);
            table.add_row(vec![
                "Retry backoff",
                &format!("{}s", config.retry.backoff_secs),
            ]);
            table.add_row(vec![
                "Max retries",
                &config
                    .retry
                    .max_attempts
                    .map_or("unbounded".to_string(), |n| n.to_string()),
            ]);
            table.add_row(vec![
                "Workers",
                &format!("{} (max: {})", config.workers.default, config.workers.max),
            ]);
            table.add_row(vec![
                "Daily dest prefix",
                &config
                    .daily
                    .dest_prefix
                    .as_ref()
                    .map_or("not set".to_string(), |p| p.display().to_string()),
            ]);
            table.add_row(vec!["Sets", &arxline_oai::DEFAULT_SETS.join(", ")]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
