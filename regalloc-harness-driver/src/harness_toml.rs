// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ArgMatches;
use regalloc_harness::HarnessConfig;
use serde::Deserialize;

/// Looked for in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "regalloc-harness.toml";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct HarnessToml {
    #[serde(default)]
    harness: HarnessConfig,
}

/// Config file named on the command line, or `regalloc-harness.toml` in `cwd`
/// if one exists there.
pub fn find_config_path(matches: &ArgMatches, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = matches.get_one::<String>("config") {
        return Some(PathBuf::from(path));
    }
    let cwd_config = cwd.join(DEFAULT_CONFIG_FILE);
    if cwd_config.exists() {
        log::info!(
            "Using {} in current directory: {}",
            DEFAULT_CONFIG_FILE,
            cwd_config.display()
        );
        Some(cwd_config)
    } else {
        None
    }
}

pub fn parse_config(text: &str) -> anyhow::Result<HarnessConfig> {
    let parsed: HarnessToml = toml::from_str(text)?;
    Ok(parsed.harness)
}

pub fn load_config(path: &Path) -> anyhow::Result<HarnessConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Command-line flags take precedence over the config file.
pub fn apply_overrides(
    mut config: HarnessConfig,
    matches: &ArgMatches,
) -> anyhow::Result<HarnessConfig> {
    if let Some(test_dir) = matches.get_one::<String>("test_dir") {
        config.test_dir = PathBuf::from(test_dir);
    }
    if let Some(log_dir) = matches.get_one::<String>("log_dir") {
        config.log_dir = PathBuf::from(log_dir);
    }
    if let Some(simulator) = matches.get_one::<String>("simulator") {
        config.simulator = simulator.to_string();
    }
    if let Some(timeout_secs) = matches.get_one::<String>("timeout_secs") {
        let timeout_secs = timeout_secs.parse::<u64>().with_context(|| {
            format!("--timeout-secs must be an integer; got {:?}", timeout_secs)
        })?;
        config.timeout_secs = Some(timeout_secs);
    }
    check_strategies(&config)?;
    Ok(config)
}

/// Each strategy builds to its own artifact, so the list must be non-empty
/// and free of repeats.
fn check_strategies(config: &HarnessConfig) -> anyhow::Result<()> {
    if config.strategies.is_empty() {
        anyhow::bail!("at least one strategy must be configured");
    }
    let distinct: HashSet<_> = config.strategies.iter().collect();
    if distinct.len() != config.strategies.len() {
        anyhow::bail!("strategies must not repeat; got {:?}", config.strategies);
    }
    Ok(())
}
