// SPDX-License-Identifier: Apache-2.0

//! Partitions the files of a suite directory into its IR artifact and the
//! paired `.in`/`.out` cases.
//!
//! The matching itself is a pure function over file names
//! ([`match_suite_entries`]) so it can be exercised without touching the
//! filesystem; [`scan_suite_dir`] is the thin wrapper that lists a real
//! directory.

use std::path::{Path, PathBuf};

use crate::harness_error::HarnessError;

/// One input file paired with the output the program is expected to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub input_path: PathBuf,
    pub expected_output_path: PathBuf,
}

/// A directory under the test root holding exactly one IR artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    pub name: String,
    pub ir_path: PathBuf,
    pub cases: Vec<TestCase>,
}

/// A suite directory that does not hold exactly one `.ir` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSuite {
    pub name: String,
    pub ir_count: usize,
}

impl std::fmt::Display for InvalidSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error: {} has {} ir files", self.name, self.ir_count)
    }
}

/// Matches the given directory entries into a suite.
///
/// Input stems are consumed in the order given; each one claims the output
/// stem of the same name from the remaining pool, so an output file is paired
/// at most once. Inputs without an output and outputs without an input are
/// dropped.
pub fn match_suite_entries<S: AsRef<str>>(
    suite_dir: &Path,
    name: &str,
    file_names: &[S],
) -> Result<TestSuite, InvalidSuite> {
    let mut input_stems: Vec<&str> = Vec::new();
    let mut output_stems: Vec<&str> = Vec::new();
    let mut ir_files: Vec<&str> = Vec::new();

    for file_name in file_names {
        let file_name = file_name.as_ref();
        let path = Path::new(file_name);
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem,
            None => continue,
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("in") => input_stems.push(stem),
            Some("out") => output_stems.push(stem),
            Some("ir") => ir_files.push(file_name),
            _ => {}
        }
    }

    if ir_files.len() != 1 {
        return Err(InvalidSuite {
            name: name.to_string(),
            ir_count: ir_files.len(),
        });
    }
    let ir_path = suite_dir.join(ir_files[0]);

    let mut cases = Vec::new();
    for stem in input_stems {
        let position = match output_stems.iter().position(|out| *out == stem) {
            Some(position) => position,
            None => {
                log::debug!("suite {}: input {}.in has no matching output", name, stem);
                continue;
            }
        };
        output_stems.remove(position);
        cases.push(TestCase {
            input_path: suite_dir.join(format!("{}.in", stem)),
            expected_output_path: suite_dir.join(format!("{}.out", stem)),
        });
    }
    for stem in output_stems {
        log::debug!("suite {}: output {}.out has no matching input", name, stem);
    }

    Ok(TestSuite {
        name: name.to_string(),
        ir_path,
        cases,
    })
}

/// Lists `suite_dir` and matches its entries. Entries are visited in sorted
/// order so repeated runs produce the same case order.
pub fn scan_suite_dir(suite_dir: &Path) -> Result<Result<TestSuite, InvalidSuite>, HarnessError> {
    let name = suite_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| suite_dir.display().to_string());

    let mut file_names = Vec::new();
    let entries = std::fs::read_dir(suite_dir).map_err(|e| {
        HarnessError::io(format!("failed to list suite {}", suite_dir.display()), e)
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| {
            HarnessError::io(format!("failed to list suite {}", suite_dir.display()), e)
        })?;
        match entry.file_name().into_string() {
            Ok(file_name) => file_names.push(file_name),
            Err(raw) => log::debug!("suite {}: skipping non-UTF-8 entry {:?}", name, raw),
        }
    }
    file_names.sort();

    Ok(match_suite_entries(suite_dir, &name, &file_names))
}
