// SPDX-License-Identifier: Apache-2.0

//! Invokes the external code generator to lower a suite's IR into assembly.
//!
//! The build step does not report failure through its exit status, so the
//! only trustworthy signal is whether the requested assembly file exists
//! afterwards.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::harness_error::HarnessError;
use crate::strategy::Strategy;
use crate::subprocess::{run_combined, Completion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Produced(PathBuf),
    /// No artifact at the target path; carries whatever the build printed.
    Missing { transcript: String },
}

/// The external build step, invoked as
/// `sh <script> <ir path> <output path> --<strategy>` from `working_dir`.
#[derive(Debug, Clone)]
pub struct BuildInvoker {
    pub script: PathBuf,
    pub working_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl BuildInvoker {
    pub fn build(
        &self,
        ir_path: &Path,
        output_path: &Path,
        strategy: Strategy,
    ) -> Result<BuildOutcome, HarnessError> {
        // A leftover artifact from an earlier run must never look like a
        // fresh build.
        if output_path.exists() {
            std::fs::remove_file(output_path).map_err(|e| {
                HarnessError::io(
                    format!("failed to remove stale artifact {}", output_path.display()),
                    e,
                )
            })?;
        }

        let mut command = Command::new("sh");
        command
            .current_dir(&self.working_dir)
            .arg(&self.script)
            .arg(ir_path)
            .arg(output_path)
            .arg(strategy.build_flag());
        let captured = run_combined(&mut command, None, self.timeout)?;
        if let Completion::TimedOut(limit) = captured.completion {
            // A killed build may have left a partial file behind.
            let _ = std::fs::remove_file(output_path);
            return Ok(BuildOutcome::Missing {
                transcript: format!("build timed out after {:?}\n{}", limit, captured.text),
            });
        }

        if output_path.exists() {
            log::info!(
                "build; {} ({}) -> {}",
                ir_path.display(),
                strategy,
                output_path.display()
            );
            Ok(BuildOutcome::Produced(output_path.to_path_buf()))
        } else {
            log::info!(
                "build; {} ({}) produced no artifact; completion: {:?}",
                ir_path.display(),
                strategy,
                captured.completion
            );
            Ok(BuildOutcome::Missing {
                transcript: captured.text,
            })
        }
    }
}
