use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileSearchConfig};
use super::models::AppConfig;
use crate::cli::SolveArgs;
use crate::error::{CliError, Result};
use pnsynth::engine::config as core_config;
use std::str::FromStr;

/// Merges built-in defaults, the config file, CLI flags and `--set` overrides, in
/// increasing order of precedence.
pub fn build_config(args: &SolveArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let search_file = file_config.search.unwrap_or_default();
    let set_overrides = apply_set_values(FileSearchConfig::default(), &args.set_values)?;

    let strategy = match set_overrides
        .strategy
        .as_deref()
        .or(args.strategy.as_deref())
        .or(search_file.strategy.as_deref())
    {
        Some(value) => parse_keyword::<core_config::SearchStrategy>(value)?,
        None => defaults.strategy,
    };

    let integrality = match set_overrides
        .integrality
        .as_deref()
        .or(args.integrality.as_deref())
        .or(search_file.integrality.as_deref())
    {
        Some(value) => parse_keyword::<core_config::IntegralityMode>(value)?,
        None => defaults.integrality,
    };

    let prune = set_overrides
        .prune
        .or(args.prune.then_some(true))
        .or(search_file.prune)
        .unwrap_or(defaults.prune);

    let integrality_tolerance = set_overrides
        .integrality_tolerance
        .or(args.tolerance)
        .or(search_file.integrality_tolerance)
        .unwrap_or(defaults.integrality_tolerance);

    let core_config = core_config::SearchConfigBuilder::new()
        .strategy(strategy)
        .integrality(integrality)
        .prune(prune)
        .integrality_tolerance(integrality_tolerance)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        input_path: args.input.clone(),
        report_path: args.output.clone(),
        json_path: args.json.clone(),
        show_tree: args.tree,
        core_config,
    })
}

fn parse_keyword<T>(value: &str) -> Result<T>
where
    T: FromStr<Err = core_config::ConfigError>,
{
    value.parse().map_err(|e: core_config::ConfigError| CliError::Config(e.to_string()))
}

fn apply_set_values(mut config: FileSearchConfig, set_values: &[String]) -> Result<FileSearchConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key.trim() {
            "search.strategy" => config.strategy = Some(value_str.to_string()),
            "search.integrality" => config.integrality = Some(value_str.to_string()),
            "search.prune" => {
                config.prune = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value_str))
                })?);
            }
            "search.integrality-tolerance" => {
                config.integrality_tolerance = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid float value for {}: {}", key, value_str))
                })?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
