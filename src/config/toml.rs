//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(seed) = cli.seed {
        config.generator.seed = Some(seed);
    }
    if let Some(cache_size) = cli.cache_size {
        config.generator.cache_size = cache_size;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[generator]
seed = 7
expand_pool_size = 20

[[fields]]
name = "id"
type = "long"
min = 1
max = 100
distribution = "increment"
unique = true

[[fields]]
name = "score"
type = "double"
min = 0
max = 1
granularity = 0.25

[[fields]]
name = "joined"
type = "date"
min = "2010-07-06"
max = "2010-08-08"
granularity = "1,2,3"
distribution = "step"

[[fields]]
name = "login"
type = "datetime"
min_date = "2008-09-01"
max_date = "2008-09-05"
date_granularity = "0,0,2"
min_time = "08:00:00"
max_time = "08:00:00"
distribution = "step"

[[fields]]
name = "color"
type = "values"
values = ["red", "green", 3, 1.5, true]
distribution = "shuffle"
"#;

    #[test]
    fn test_parse_toml_string() {
        let config = parse_toml_string(SAMPLE).unwrap();
        assert_eq!(config.generator.seed, Some(7));
        assert_eq!(config.generator.expand_pool_size, 20);
        assert_eq!(config.generator.cache_size, 100_000);
        assert_eq!(config.fields.len(), 5);

        let id = &config.fields[0];
        assert_eq!(id.name, "id");
        assert!(id.unique);
        assert_eq!(id.distribution.as_deref(), Some("increment"));
        assert_eq!(id.kind, FieldKind::Long { min: 1, max: 100, granularity: 1 });

        assert_eq!(
            config.fields[1].kind,
            FieldKind::Double { min: 0.0, max: 1.0, granularity: 0.25 }
        );
        match &config.fields[2].kind {
            FieldKind::Date { granularity, .. } => assert_eq!(*granularity, DateGranularity::new(1, 2, 3)),
            other => panic!("unexpected kind {:?}", other),
        }
        match &config.fields[3].kind {
            FieldKind::DateTime { time_granularity, time_distribution, .. } => {
                assert_eq!(*time_granularity, 1);
                assert!(time_distribution.is_none());
            }
            other => panic!("unexpected kind {:?}", other),
        }
        match &config.fields[4].kind {
            FieldKind::Values { values } => {
                assert_eq!(values.len(), 5);
                assert_eq!(values[0], ConfigValue::Text("red".into()));
                assert_eq!(values[2], ConfigValue::Long(3));
                assert_eq!(values[4], ConfigValue::Bool(true));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_parse_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = parse_toml_file(file.path()).unwrap();
        assert_eq!(config.fields.len(), 5);
    }

    #[test]
    fn test_parse_errors_carry_context() {
        let err = parse_toml_file(Path::new("/nonexistent/datapulse.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));

        let err = parse_toml_string("[[fields]]\nname = \"x\"\ntype = \"bogus\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_merge_cli_with_config() {
        let config = parse_toml_string(SAMPLE).unwrap();
        let cli = Cli::parse_from(["datapulse", "config.toml", "--seed", "99", "--cache-size", "10"]);
        let merged = merge_cli_with_config(&cli, config);
        assert_eq!(merged.generator.seed, Some(99));
        assert_eq!(merged.generator.cache_size, 10);
    }
}
