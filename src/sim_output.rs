// SPDX-License-Identifier: Apache-2.0

//! Parsing of the text log the simulator writes for a single run.
//!
//! The log is one stream: a `Loaded: ...` banner line, whatever the program
//! under test printed, and then a statistics block of the form
//!
//! ```text
//! Stats -- #instructions : 24
//!          #reads : 5  #writes 3  #branches 2  #other 14
//! ```
//!
//! followed by a final newline. Nothing forces the block onto its own line:
//! if the program's last output lacks a newline, the `Stats` marker is glued
//! onto the end of it.

use crate::harness_error::HarnessError;

/// Start of the simulator's statistics block.
pub const STATS_MARKER: &str = "Stats";

const WRITES_MARKER: &str = "writes ";
const BRANCHES_MARKER: &str = "#branches";

/// Number of lines at the end of a completed log that belong to the
/// statistics block (including the empty line after the final newline).
const STATS_BLOCK_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatorLog {
    /// No statistics block was produced; holds every line after the banner.
    Crashed { detail: String },
    /// The program ran to completion.
    Completed { output: Vec<String>, writes: u64 },
}

/// Splits every line that contains [`STATS_MARKER`] somewhere other than at
/// its start into the program output before the marker and the statistics
/// text from the marker on.
pub fn repair_stats_boundary<I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut repaired = Vec::new();
    for line in lines {
        match line.find(STATS_MARKER) {
            Some(index) if index > 0 => {
                let (program_output, stats) = line.split_at(index);
                repaired.push(program_output.to_string());
                repaired.push(stats.to_string());
            }
            _ => repaired.push(line),
        }
    }
    repaired
}

/// Extracts the write count between `writes ` and `#branches`.
pub fn parse_write_count(stats_line: &str) -> Result<u64, HarnessError> {
    let format_error = || HarnessError::StatsFormat {
        line: stats_line.to_string(),
    };
    let start = stats_line.find(WRITES_MARKER).ok_or_else(format_error)? + WRITES_MARKER.len();
    let end = stats_line.find(BRANCHES_MARKER).ok_or_else(format_error)?;
    if end < start {
        return Err(format_error());
    }
    stats_line[start..end]
        .trim()
        .parse::<u64>()
        .map_err(|_| format_error())
}

/// Interprets the full text captured from one simulator run.
pub fn parse_simulator_log(text: &str) -> Result<SimulatorLog, HarnessError> {
    // The first line is the "Loaded: <path>" banner.
    let lines = repair_stats_boundary(text.split('\n').skip(1).map(str::to_string));

    if !lines.iter().any(|line| line.starts_with(STATS_MARKER)) {
        return Ok(SimulatorLog::Crashed {
            detail: lines.join("\n"),
        });
    }

    if lines.len() < 2 {
        return Err(HarnessError::StatsFormat {
            line: lines.join("\n"),
        });
    }
    let stats_line = &lines[lines.len() - 2];
    let writes = parse_write_count(stats_line)?;
    let output = lines[..lines.len().saturating_sub(STATS_BLOCK_LINES)].to_vec();
    Ok(SimulatorLog::Completed { output, writes })
}
