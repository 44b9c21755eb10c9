// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::build_invoker::BuildInvoker;
use crate::simulator::Simulator;
use crate::strategy::{Strategy, DEFAULT_STRATEGY_ORDER};

/// Settings for a harness run; the `[harness]` table of a
/// `regalloc-harness.toml` file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory whose subdirectories are the test suites.
    pub test_dir: PathBuf,

    /// Receives one `<suite>.log` per suite plus the built assembly files.
    pub log_dir: PathBuf,

    /// Working directory of the build step.
    pub compiler_dir: PathBuf,

    /// Build step script, relative to `compiler_dir` unless absolute.
    pub build_script: PathBuf,

    /// Script run once before any suite when a project build is requested.
    pub build_all_script: PathBuf,

    pub simulator: String,

    /// Arguments given to the simulator ahead of the assembly path.
    pub simulator_args: Vec<String>,

    /// Strategies to build and run, in order.
    pub strategies: Vec<Strategy>,

    /// Kill any build or simulator process running longer than this.
    pub timeout_secs: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            test_dir: PathBuf::from("tests"),
            log_dir: PathBuf::from("logs"),
            compiler_dir: PathBuf::from("src"),
            build_script: PathBuf::from("./run.sh"),
            build_all_script: PathBuf::from("./src/build.sh"),
            simulator: "spim".to_string(),
            simulator_args: vec!["-keepstats".to_string(), "-f".to_string()],
            strategies: DEFAULT_STRATEGY_ORDER.to_vec(),
            timeout_secs: None,
        }
    }
}

impl HarnessConfig {
    /// Resolves the directory settings against `base` so the harness never
    /// depends on its working directory after startup. The build script stays
    /// relative to `compiler_dir`, where it is executed.
    pub fn rooted_at(mut self, base: &Path) -> Self {
        self.test_dir = base.join(&self.test_dir);
        self.log_dir = base.join(&self.log_dir);
        self.compiler_dir = base.join(&self.compiler_dir);
        self.build_all_script = base.join(&self.build_all_script);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn build_invoker(&self) -> BuildInvoker {
        BuildInvoker {
            script: self.build_script.clone(),
            working_dir: self.compiler_dir.clone(),
            timeout: self.timeout(),
        }
    }

    pub fn simulator(&self) -> Simulator {
        Simulator {
            program: self.simulator.clone(),
            args: self.simulator_args.clone(),
            timeout: self.timeout(),
        }
    }
}
