// SPDX-License-Identifier: Apache-2.0

//! Blocking execution of the external build step and simulator.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::harness_error::HarnessError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Exited(ExitStatus),
    TimedOut(Duration),
}

/// Text a process wrote to stdout and stderr, in the order it was written.
#[derive(Debug)]
pub struct CombinedOutput {
    pub completion: Completion,
    pub text: String,
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

/// Runs `command` to completion with stdout and stderr redirected into the
/// same temporary file, so the two streams interleave exactly as they would
/// on a terminal.
///
/// `stdin` is fed from the given file, or from nothing if absent. With a
/// `timeout`, a process still running after that long is killed.
pub fn run_combined(
    command: &mut Command,
    stdin: Option<File>,
    timeout: Option<Duration>,
) -> Result<CombinedOutput, HarnessError> {
    let program = program_name(command);
    let mut sink = tempfile::tempfile()
        .map_err(|e| HarnessError::io("failed to create capture file", e))?;
    let stdout = sink
        .try_clone()
        .map_err(|e| HarnessError::io("failed to clone capture file", e))?;
    let stderr = sink
        .try_clone()
        .map_err(|e| HarnessError::io("failed to clone capture file", e))?;

    command
        .stdin(stdin.map(Stdio::from).unwrap_or_else(Stdio::null))
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    log::info!("run_combined; command: {:?}", command);
    let mut child = command.spawn().map_err(|source| HarnessError::Launch {
        program: program.clone(),
        source,
    })?;
    let launch_error = |source| HarnessError::Launch {
        program: program.clone(),
        source,
    };

    let completion = match timeout {
        None => Completion::Exited(child.wait().map_err(launch_error)?),
        Some(limit) => {
            let start = Instant::now();
            loop {
                if let Some(status) = child.try_wait().map_err(launch_error)? {
                    break Completion::Exited(status);
                }
                if start.elapsed() >= limit {
                    log::warn!("{} exceeded {:?}; killing it", program, limit);
                    // The process may exit on its own between the poll and the kill.
                    let _ = child.kill();
                    child.wait().map_err(launch_error)?;
                    break Completion::TimedOut(limit);
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    };

    let mut bytes = Vec::new();
    sink.seek(SeekFrom::Start(0))
        .and_then(|_| sink.read_to_end(&mut bytes))
        .map_err(|e| HarnessError::io(format!("failed to read output of {}", program), e))?;
    log::debug!("{} completed: {:?}; {} byte(s) captured", program, completion, bytes.len());

    Ok(CombinedOutput {
        completion,
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
