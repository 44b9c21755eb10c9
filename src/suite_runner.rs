// SPDX-License-Identifier: Apache-2.0

//! Builds a suite with every strategy, runs each case against each build and
//! reports the outcomes on the console and in `<log_dir>/<suite>.log`.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::build_invoker::{BuildInvoker, BuildOutcome};
use crate::case_matcher::{TestCase, TestSuite};
use crate::harness_config::HarnessConfig;
use crate::harness_error::HarnessError;
use crate::simulator::{CaseVerdict, Simulator, SimulatorResult};
use crate::strategy::Strategy;

/// Per-strategy totals for one suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTally {
    pub strategy: Strategy,
    pub correct: usize,
    pub incorrect: usize,
    pub errors: usize,
    /// Sum of write counts over correct cases.
    pub correct_writes: u64,
}

impl StrategyTally {
    fn new(strategy: Strategy) -> Self {
        StrategyTally {
            strategy,
            correct: 0,
            incorrect: 0,
            errors: 0,
            correct_writes: 0,
        }
    }

    fn record(&mut self, result: &SimulatorResult) {
        match result.verdict() {
            CaseVerdict::Error => self.errors += 1,
            CaseVerdict::Correct => {
                self.correct += 1;
                self.correct_writes += result.write_count;
            }
            CaseVerdict::Incorrect => self.incorrect += 1,
        }
    }
}

impl std::fmt::Display for StrategyTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} correct, {} incorrect, {} error(s); {} writes over correct cases",
            self.strategy, self.correct, self.incorrect, self.errors, self.correct_writes
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteStatus {
    Ran(Vec<StrategyTally>),
    /// The named strategy produced no assembly; no case was run.
    BuildFailed(Strategy),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSummary {
    pub name: String,
    pub status: SuiteStatus,
}

impl SuiteSummary {
    /// True when the suite built and every case was correct under every
    /// strategy.
    pub fn passed(&self) -> bool {
        match &self.status {
            SuiteStatus::Ran(tallies) => tallies.iter().all(|t| t.incorrect == 0 && t.errors == 0),
            SuiteStatus::BuildFailed(_) => false,
        }
    }
}

/// First line reported for a case, e.g. `Correct: tests/add/t1.in, naive (5 writes)`.
pub fn outcome_line(case: &TestCase, strategy: Strategy, result: &SimulatorResult) -> String {
    let input = case.input_path.display();
    match result.verdict() {
        CaseVerdict::Error => format!("Error: {}, {}", input, strategy),
        CaseVerdict::Correct => format!(
            "Correct: {}, {} ({} writes)",
            input, strategy, result.write_count
        ),
        CaseVerdict::Incorrect => format!(
            "Incorrect: {}, {} ({} writes)",
            input, strategy, result.write_count
        ),
    }
}

/// Full log-file entry for a case: the outcome line plus the simulator's
/// diagnostics for an error, or both output listings for an incorrect result.
pub fn log_entry(case: &TestCase, strategy: Strategy, result: &SimulatorResult) -> String {
    let mut entry = outcome_line(case, strategy, result);
    entry.push('\n');
    match result.verdict() {
        CaseVerdict::Error => {
            entry.push_str(&result.error_detail);
            if !entry.ends_with('\n') {
                entry.push('\n');
            }
        }
        CaseVerdict::Correct => {}
        CaseVerdict::Incorrect => {
            entry.push_str("Expected:\n");
            for line in &result.expected_output {
                let _ = writeln!(entry, "{}", line);
            }
            entry.push_str("Got:\n");
            for line in &result.actual_output {
                let _ = writeln!(entry, "{}", line);
            }
        }
    }
    entry
}

fn colorize_outcome(line: &str, verdict: CaseVerdict) -> String {
    let (keyword, rest) = line.split_at(line.find(':').unwrap_or(0));
    let keyword = match verdict {
        CaseVerdict::Error => keyword.red().bold(),
        CaseVerdict::Correct => keyword.green(),
        CaseVerdict::Incorrect => keyword.red(),
    };
    format!("{}{}", keyword, rest)
}

pub struct SuiteRunner {
    pub log_dir: PathBuf,
    /// Strategies in the order they are built and run for every case.
    pub strategies: Vec<Strategy>,
    pub builder: BuildInvoker,
    pub simulator: Simulator,
}

impl SuiteRunner {
    pub fn from_config(config: &HarnessConfig) -> Self {
        SuiteRunner {
            log_dir: config.log_dir.clone(),
            strategies: config.strategies.clone(),
            builder: config.build_invoker(),
            simulator: config.simulator(),
        }
    }

    pub fn assembly_path(&self, suite_name: &str, strategy: Strategy) -> PathBuf {
        self.log_dir.join(format!("{}_{}.s", suite_name, strategy))
    }

    pub fn log_path(&self, suite_name: &str) -> PathBuf {
        self.log_dir.join(format!("{}.log", suite_name))
    }

    /// Builds every strategy in order, stopping at the first one that
    /// produces no assembly.
    fn build_all(
        &self,
        suite: &TestSuite,
    ) -> Result<Result<Vec<(Strategy, PathBuf)>, Strategy>, HarnessError> {
        let mut built = Vec::with_capacity(self.strategies.len());
        for &strategy in &self.strategies {
            let target = self.assembly_path(&suite.name, strategy);
            match self.builder.build(&suite.ir_path, &target, strategy)? {
                BuildOutcome::Produced(path) => built.push((strategy, path)),
                BuildOutcome::Missing { transcript } => {
                    println!("Error: {} ({}) failed to compile", suite.name, strategy);
                    for line in transcript.lines() {
                        println!("  {}", line);
                    }
                    return Ok(Err(strategy));
                }
            }
        }
        Ok(Ok(built))
    }

    /// Runs every case of `suite` under every strategy.
    ///
    /// If any strategy fails to build, the suite is abandoned before a single
    /// case runs and it is left without a log file.
    pub fn run_suite(&self, suite: &TestSuite) -> Result<SuiteSummary, HarnessError> {
        println!("\nRunning test {}", suite.name);
        ensure_dir(&self.log_dir)?;
        let log_path = self.log_path(&suite.name);
        if log_path.exists() {
            std::fs::remove_file(&log_path).map_err(|e| {
                HarnessError::io(format!("failed to remove old log {}", log_path.display()), e)
            })?;
        }

        let built = match self.build_all(suite)? {
            Ok(built) => built,
            Err(strategy) => {
                return Ok(SuiteSummary {
                    name: suite.name.clone(),
                    status: SuiteStatus::BuildFailed(strategy),
                })
            }
        };

        let log_file = File::create(&log_path).map_err(|e| {
            HarnessError::io(format!("failed to create log {}", log_path.display()), e)
        })?;
        let mut log_writer = BufWriter::new(log_file);
        let log_error =
            |e| HarnessError::io(format!("failed to write log {}", log_path.display()), e);

        let mut tallies: Vec<StrategyTally> =
            built.iter().map(|(s, _)| StrategyTally::new(*s)).collect();
        for case in &suite.cases {
            for ((strategy, assembly), tally) in built.iter().zip(tallies.iter_mut()) {
                let result = self.simulator.run_case(assembly, case)?;
                let line = outcome_line(case, *strategy, &result);
                println!("{}", colorize_outcome(&line, result.verdict()));
                log_writer
                    .write_all(log_entry(case, *strategy, &result).as_bytes())
                    .map_err(log_error)?;
                tally.record(&result);
            }
        }
        log_writer.flush().map_err(log_error)?;

        for tally in &tallies {
            println!("  {}", tally);
        }
        Ok(SuiteSummary {
            name: suite.name.clone(),
            status: SuiteStatus::Ran(tallies),
        })
    }
}

fn ensure_dir(dir: &Path) -> Result<(), HarnessError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| HarnessError::io(format!("failed to create {}", dir.display()), e))
}
