// SPDX-License-Identifier: Apache-2.0

//! Regression harness for a code generator with two register allocators.
//!
//! Every directory under the test root is a suite holding one `.ir` program
//! and any number of `<stem>.in` / `<stem>.out` cases. For each suite the
//! harness builds the IR once per [`Strategy`], runs every case against every
//! build on a MIPS simulator, and compares the program's output with the
//! expected output. The simulator's count of executed memory writes is
//! reported alongside each result so the allocators can be compared.

pub mod build_invoker;
pub mod case_matcher;
pub mod discovery;
pub mod harness_config;
pub mod harness_error;
pub mod sim_output;
pub mod simulator;
pub mod strategy;
pub mod subprocess;
pub mod suite_runner;

pub use build_invoker::{BuildInvoker, BuildOutcome};
pub use case_matcher::{match_suite_entries, scan_suite_dir, InvalidSuite, TestCase, TestSuite};
pub use discovery::{discover_tests, SuiteIter};
pub use harness_config::HarnessConfig;
pub use harness_error::HarnessError;
pub use sim_output::{parse_simulator_log, SimulatorLog};
pub use simulator::{CaseVerdict, Simulator, SimulatorResult};
pub use strategy::{Strategy, DEFAULT_STRATEGY_ORDER};
pub use suite_runner::{StrategyTally, SuiteRunner, SuiteStatus, SuiteSummary};
