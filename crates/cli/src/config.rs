use agg_builder::AggregationOptions;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Guess from the file extension; anything but `.toml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Load aggregation options from `path`, or stdin when absent.
pub fn load_options(path: Option<&Path>, format: Option<ConfigFormat>) -> Result<AggregationOptions> {
    let (raw, detected, origin) = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read options from {}", path.display()))?;
            (raw, ConfigFormat::from_path(path), path.display().to_string())
        }
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read options from stdin")?;
            (raw, ConfigFormat::Json, "stdin".to_string())
        }
    };

    let format = format.unwrap_or(detected);
    log::debug!("Parsing options from {origin} as {format:?}");
    parse(&raw, format).with_context(|| format!("Invalid aggregation options in {origin}"))
}

fn parse<T: DeserializeOwned>(raw: &str, format: ConfigFormat) -> Result<T> {
    match format {
        ConfigFormat::Json => serde_json::from_str(raw).map_err(Into::into),
        ConfigFormat::Toml => toml::from_str(raw).map_err(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_builder::MetricKind;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("rule.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("rule.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("rule.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("rule")), ConfigFormat::Json);
    }

    #[test]
    fn parses_both_formats() {
        let json: AggregationOptions =
            parse(r#"{ "aggType": "max", "aggField": "cpu" }"#, ConfigFormat::Json).unwrap();
        let toml: AggregationOptions =
            parse("aggType = \"max\"\naggField = \"cpu\"\n", ConfigFormat::Toml).unwrap();
        assert_eq!(json, toml);
        assert_eq!(json.agg_type, MetricKind::Max);
    }

    #[test]
    fn reports_unknown_metric() {
        let err = parse::<AggregationOptions>(r#"{ "aggType": "mean" }"#, ConfigFormat::Json)
            .unwrap_err();
        assert!(err.to_string().contains("mean"), "{err}");
    }
}
