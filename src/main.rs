//! datapulse CLI entry point

use anyhow::{Context, Result};
use datapulse::config::cli::{Cli, OutputFormat};
use datapulse::config::toml::{merge_cli_with_config, parse_toml_file};
use datapulse::config::validator::validate_config;
use datapulse::config::{Config, FieldKind};
use datapulse::distribution::SequenceRegistry;
use datapulse::factory::{GeneratorFactory, DEFAULT_DISTRIBUTION};
use datapulse::generator::{Generator, GeneratorContext};
use datapulse::value::Value;
use std::io::{self, BufWriter, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse_args();
    cli.validate()?;

    let registry = SequenceRegistry::global();

    if cli.list_sequences {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let path = cli
        .config
        .as_deref()
        .context("A configuration file is required")?;
    let config = parse_toml_file(path)?;
    let config = merge_cli_with_config(&cli, config);

    validate_config(&config, registry).context("Configuration validation failed")?;

    if cli.dry_run {
        print_configuration(&config);
        eprintln!();
        eprintln!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    generate_rows(&cli, &config, registry)
}

/// Generate up to `cli.rows` records and write them to stdout
fn generate_rows(cli: &Cli, config: &Config, registry: &SequenceRegistry) -> Result<()> {
    let factory = GeneratorFactory::new(registry, config.generator.clone());
    let mut records = factory
        .create_record_generator(&config.fields)
        .context("Failed to build generators")?;
    records
        .init(&GeneratorContext::new(config.generator.clone()))
        .context("Failed to initialize generators")?;

    let names: Vec<String> = records.field_names().map(str::to_string).collect();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cli.format == OutputFormat::Text {
        writeln!(out, "{}", names.join("\t"))?;
    }

    let mut written = 0;
    while written < cli.rows {
        let record = match records.generate().context("Generation failed")? {
            Some(record) => record,
            None => {
                info!(rows = written, requested = cli.rows, "a field is depleted, stopping early");
                break;
            }
        };
        match cli.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
            }
            OutputFormat::Text => {
                let cells: Vec<String> = names
                    .iter()
                    .map(|name| record.field(name).map(format_cell).unwrap_or_default())
                    .collect();
                writeln!(out, "{}", cells.join("\t"))?;
            }
        }
        written += 1;
    }

    out.flush()?;
    records.close();
    Ok(())
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Text(s) => s.clone(),
        Value::Record(_) => serde_json::to_string(value).unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Print configuration summary
fn print_configuration(config: &Config) {
    eprintln!("Configuration:");
    match config.generator.seed {
        Some(seed) => eprintln!("  Seed: {}", seed),
        None => eprintln!("  Seed: (entropy)"),
    }
    eprintln!("  Cache size: {}", config.generator.cache_size);
    eprintln!("  Expand pool size: {}", config.generator.expand_pool_size);
    eprintln!(
        "  Unique thresholds: warn {}, error {}",
        config.generator.unique_warn_threshold, config.generator.unique_error_threshold
    );
    eprintln!();
    eprintln!("Fields:");
    for field in &config.fields {
        let distribution = field.distribution.as_deref().unwrap_or(DEFAULT_DISTRIBUTION);
        let kind = match &field.kind {
            FieldKind::Long { min, max, granularity } => format!("long [{}, {}] step {}", min, max, granularity),
            FieldKind::Double { min, max, granularity } => format!("double [{}, {}] step {}", min, max, granularity),
            FieldKind::Date { min, max, granularity } => format!("date [{}, {}] step {}", min, max, granularity),
            FieldKind::DateTime {
                min_date,
                max_date,
                min_time,
                max_time,
                ..
            } => format!("datetime [{} {}, {} {}]", min_date, min_time, max_date, max_time),
            FieldKind::Values { values } => format!("{} values", values.len()),
        };
        eprintln!(
            "  {}: {} via {}{}",
            field.name,
            kind,
            distribution,
            if field.unique { " (unique)" } else { "" }
        );
    }
}
