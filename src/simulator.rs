// SPDX-License-Identifier: Apache-2.0

//! Runs a built assembly file against one test case on the external
//! simulator and grades the result.

use std::fs::File;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::case_matcher::TestCase;
use crate::harness_error::HarnessError;
use crate::sim_output::{parse_simulator_log, SimulatorLog};
use crate::subprocess::{run_combined, Completion};

/// Outcome of one (case, strategy) execution.
///
/// `is_correct` and `write_count` carry no meaning when `is_error` is set;
/// `error_detail` is empty when it is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorResult {
    pub is_error: bool,
    pub error_detail: String,
    pub is_correct: bool,
    pub write_count: u64,
    pub actual_output: Vec<String>,
    pub expected_output: Vec<String>,
}

/// Three-way classification used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseVerdict {
    Error,
    Correct,
    Incorrect,
}

impl SimulatorResult {
    fn error(detail: String) -> Self {
        SimulatorResult {
            is_error: true,
            error_detail: detail,
            is_correct: false,
            write_count: 0,
            actual_output: vec![],
            expected_output: vec![],
        }
    }

    pub fn verdict(&self) -> CaseVerdict {
        if self.is_error {
            CaseVerdict::Error
        } else if self.is_correct {
            CaseVerdict::Correct
        } else {
            CaseVerdict::Incorrect
        }
    }
}

/// Reads an expected-output file as lines with trailing whitespace removed.
pub fn read_expected_output(path: &Path) -> Result<Vec<String>, HarnessError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        HarnessError::io(
            format!("failed to read expected output {}", path.display()),
            e,
        )
    })?;
    Ok(text.lines().map(|line| line.trim_end().to_string()).collect())
}

/// Grades a parsed simulator log against the expected output lines.
pub fn grade(log: SimulatorLog, expected_output: Vec<String>) -> SimulatorResult {
    match log {
        SimulatorLog::Crashed { detail } => SimulatorResult::error(detail),
        SimulatorLog::Completed { output, writes } => SimulatorResult {
            is_error: false,
            error_detail: String::new(),
            is_correct: output == expected_output,
            write_count: writes,
            actual_output: output,
            expected_output,
        },
    }
}

/// The external instruction-set simulator, e.g. `spim -keepstats -f`.
#[derive(Debug, Clone)]
pub struct Simulator {
    pub program: String,
    /// Arguments placed before the assembly path.
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Simulator {
    /// Runs `assembly_path` with the case's input file on stdin.
    ///
    /// A program that crashes (no statistics block) or exceeds the timeout is
    /// an error result, not an `Err`; `Err` is reserved for a simulator that
    /// cannot be launched or whose statistics layout is not understood.
    pub fn run_case(
        &self,
        assembly_path: &Path,
        case: &TestCase,
    ) -> Result<SimulatorResult, HarnessError> {
        let stdin = File::open(&case.input_path).map_err(|e| {
            HarnessError::io(
                format!("failed to open case input {}", case.input_path.display()),
                e,
            )
        })?;

        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(assembly_path);
        let captured = run_combined(&mut command, Some(stdin), self.timeout)?;

        match captured.completion {
            Completion::TimedOut(limit) => {
                return Ok(SimulatorResult::error(format!(
                    "simulator timed out after {:?}\n{}",
                    limit, captured.text
                )));
            }
            Completion::Exited(status) if !status.success() => {
                log::debug!(
                    "{} exited with {} on {}",
                    self.program,
                    status,
                    case.input_path.display()
                );
            }
            Completion::Exited(_) => {}
        }

        let log = parse_simulator_log(&captured.text)?;
        let expected_output = read_expected_output(&case.expected_output_path)?;
        Ok(grade(log, expected_output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matching_output_is_correct() {
        let result = grade(
            SimulatorLog::Completed {
                output: strings(&["3", "7"]),
                writes: 12,
            },
            strings(&["3", "7"]),
        );
        assert_eq!(result.verdict(), CaseVerdict::Correct);
        assert_eq!(result.write_count, 12);
    }

    #[test]
    fn test_mismatched_output_is_incorrect() {
        let result = grade(
            SimulatorLog::Completed {
                output: strings(&["3", "8"]),
                writes: 12,
            },
            strings(&["3", "7"]),
        );
        assert_eq!(result.verdict(), CaseVerdict::Incorrect);
        assert_eq!(result.actual_output, strings(&["3", "8"]));
        assert_eq!(result.expected_output, strings(&["3", "7"]));
    }

    #[test]
    fn test_extra_line_is_incorrect() {
        let result = grade(
            SimulatorLog::Completed {
                output: strings(&["3", "7", ""]),
                writes: 1,
            },
            strings(&["3", "7"]),
        );
        assert!(!result.is_correct);
    }

    #[test]
    fn test_crash_has_empty_outputs() {
        let result = grade(
            SimulatorLog::Crashed {
                detail: "Exception 7".to_string(),
            },
            strings(&["5"]),
        );
        assert_eq!(result.verdict(), CaseVerdict::Error);
        assert_eq!(result.error_detail, "Exception 7");
        assert!(result.actual_output.is_empty());
        assert!(result.expected_output.is_empty());
    }

    #[test]
    fn test_expected_output_strips_trailing_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t1.out");
        std::fs::write(&path, "5  \r\n  6\t\n\n").unwrap();
        assert_eq!(
            read_expected_output(&path).unwrap(),
            strings(&["5", "  6", ""])
        );
    }
}
