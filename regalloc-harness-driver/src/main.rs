// SPDX-License-Identifier: Apache-2.0

//! Command line driver for the register-allocation regression suites.
//!
//! Every directory under the test root is built with each allocation strategy
//! and each of its cases is run on the simulator; results go to the console
//! and to `<log_dir>/<suite>.log`.
//!
//! Sample usage:
//!
//! ```shell
//! $ regalloc-harness-driver --build
//! $ regalloc-harness-driver --config ci/regalloc-harness.toml fib add
//! $ RUST_LOG=debug regalloc-harness-driver --timeout-secs 10
//! ```
//!
//! The process exits with status 1 if any case is incorrect or errors, if a
//! suite fails to build, or if the harness itself cannot run.

mod harness_toml;
mod report_cli_error;
mod tools;

use clap::{Arg, ArgAction, ArgMatches};
use regalloc_harness::{discover_tests, HarnessConfig, SuiteRunner, SuiteSummary};
use report_cli_error::report_cli_error_and_exit;

trait AppExt {
    fn add_path_override_args(self) -> Self;
}

impl AppExt for clap::Command {
    fn add_path_override_args(self) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new("test_dir")
                    .long("test-dir")
                    .value_name("DIR")
                    .help("Directory whose subdirectories are test suites")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("log_dir")
                    .long("log-dir")
                    .value_name("DIR")
                    .help("Directory for per-suite logs and built assembly")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("simulator")
                    .long("simulator")
                    .value_name("PROGRAM")
                    .help("Simulator executable (default: spim)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("timeout_secs")
                    .long("timeout-secs")
                    .value_name("SECONDS")
                    .help("Kill any build or simulator run that takes longer than this")
                    .action(ArgAction::Set),
            )
    }
}

fn resolve_config(matches: &ArgMatches) -> HarnessConfig {
    let cwd = std::env::current_dir().unwrap_or_else(|e| {
        report_cli_error_and_exit(
            "cannot determine working directory",
            None,
            &[("error", e.to_string().as_str())],
        )
    });

    let config = match harness_toml::find_config_path(matches, &cwd) {
        Some(path) => {
            if !path.exists() {
                report_cli_error_and_exit(
                    "config file does not exist",
                    None,
                    &[
                        ("path", path.display().to_string().as_str()),
                        ("working directory", cwd.display().to_string().as_str()),
                    ],
                );
            }
            harness_toml::load_config(&path).unwrap_or_else(|e| {
                report_cli_error_and_exit(&format!("{:#}", e), Some("config"), &[])
            })
        }
        None => HarnessConfig::default(),
    };
    let config = harness_toml::apply_overrides(config, matches).unwrap_or_else(|e| {
        report_cli_error_and_exit(&format!("{:#}", e), Some("config"), &[])
    });
    let config = config.rooted_at(&cwd);
    log::info!("resolved config: {:?}", config);
    config
}

/// Runs every discovered suite (or only those named in `selected`).
fn run_suites(config: &HarnessConfig, selected: &[String]) -> anyhow::Result<Vec<SuiteSummary>> {
    let runner = SuiteRunner::from_config(config);
    let mut summaries = Vec::new();
    for suite in discover_tests(&config.test_dir)? {
        let suite = suite?;
        if !selected.is_empty() && !selected.contains(&suite.name) {
            log::debug!("skipping suite {}; not selected", suite.name);
            continue;
        }
        summaries.push(runner.run_suite(&suite)?);
    }
    Ok(summaries)
}

fn main() {
    let _ = env_logger::try_init();

    log::info!(
        "regalloc-harness-driver starting; version: {}",
        env!("CARGO_PKG_VERSION")
    );

    let matches = clap::Command::new("regalloc-harness-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs register-allocation regression suites on a simulator")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("CONFIG")
                .help("Path to a regalloc-harness.toml file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("build")
                .short('b')
                .long("build")
                .help("Build the project before running any suite")
                .action(ArgAction::SetTrue),
        )
        .add_path_override_args()
        .arg(
            Arg::new("suites")
                .value_name("SUITE")
                .help("Only run the named suites")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .get_matches();

    let config = resolve_config(&matches);

    if matches.get_flag("build") {
        if let Err(e) = tools::run_build_all(&config.build_all_script) {
            report_cli_error_and_exit(&format!("{:#}", e), Some("build"), &[]);
        }
    }

    if let Err(e) = tools::locate_simulator(&config.simulator) {
        report_cli_error_and_exit(&format!("{:#}", e), None, &[]);
    }

    let selected: Vec<String> = matches
        .get_many::<String>("suites")
        .map(|names| names.cloned().collect())
        .unwrap_or_default();

    let summaries = match run_suites(&config, &selected) {
        Ok(summaries) => summaries,
        Err(e) => report_cli_error_and_exit(
            &format!("{:#}", e),
            None,
            &[("test dir", config.test_dir.display().to_string().as_str())],
        ),
    };

    let failed: Vec<&str> = summaries
        .iter()
        .filter(|s| !s.passed())
        .map(|s| s.name.as_str())
        .collect();
    println!(
        "\n{} suite(s) run, {} passed, {} failed",
        summaries.len(),
        summaries.len() - failed.len(),
        failed.len()
    );
    if !failed.is_empty() {
        println!("Failed: {}", failed.join(", "));
        std::process::exit(1);
    }
}
