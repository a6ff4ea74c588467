//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format of generated rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// Tab-separated field values, header first
    Text,
}

/// datapulse - Synthetic test data generator
#[derive(Parser, Debug)]
#[command(name = "datapulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML file describing the fields to generate
    #[arg(value_name = "CONFIG", required_unless_present = "list_sequences")]
    pub config: Option<PathBuf>,

    /// Number of rows to generate (stops early when a field is depleted)
    #[arg(short = 'n', long, default_value = "10")]
    pub rows: usize,

    /// Seed for reproducible output (overrides the config file)
    #[arg(long, env = "DATAPULSE_SEED")]
    pub seed: Option<u64>,

    /// Maximum number of source values a strategy materializes (overrides the config file)
    #[arg(long)]
    pub cache_size: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Print the registered sequence names and exit
    #[arg(long)]
    pub list_sequences: bool,

    /// Validate the configuration without generating rows
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(cache_size) = self.cache_size {
            if cache_size == 0 {
                anyhow::bail!("cache_size must be at least 1");
            }
        }
        Ok(())
    }
}
