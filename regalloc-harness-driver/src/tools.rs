// SPDX-License-Identifier: Apache-2.0

//! Helpers for running the project-level tools the harness depends on.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;

/// Runs the project build script once, with its output going straight to the
/// terminal. Like the per-suite build step, a non-zero exit status is only
/// reported; a broken build shows up as missing assembly later on.
pub fn run_build_all(script: &Path) -> anyhow::Result<()> {
    log::info!("run_build_all; script: {}", script.display());
    let mut command = Command::new("sh");
    command.arg(script);
    log::info!("command: {:?}", command);
    let status = command
        .status()
        .with_context(|| format!("failed to run build script {}", script.display()))?;
    if !status.success() {
        eprintln!("build script {} exited with {}", script.display(), status);
    }
    Ok(())
}

/// Resolves the simulator executable up front so a missing installation is
/// reported once rather than per case.
pub fn locate_simulator(simulator: &str) -> anyhow::Result<PathBuf> {
    which::which(simulator).with_context(|| {
        format!(
            "simulator `{}` not found; install spim or set `simulator` in the config",
            simulator
        )
    })
}
