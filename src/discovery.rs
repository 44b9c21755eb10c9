// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use crate::case_matcher::{scan_suite_dir, TestSuite};
use crate::harness_error::HarnessError;

/// Lazily yields the valid suites under a test root.
///
/// Each suite directory is scanned only when the iterator reaches it. Suites
/// with the wrong number of IR files are reported on stdout and skipped; a
/// suite directory that cannot be listed ends iteration with an error.
pub struct SuiteIter {
    suite_dirs: std::vec::IntoIter<PathBuf>,
}

impl Iterator for SuiteIter {
    type Item = Result<TestSuite, HarnessError>;

    fn next(&mut self) -> Option<Self::Item> {
        for suite_dir in self.suite_dirs.by_ref() {
            match scan_suite_dir(&suite_dir) {
                Ok(Ok(suite)) => return Some(Ok(suite)),
                Ok(Err(invalid)) => println!("{}", invalid),
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

/// Lists the suite directories directly under `test_root`, in name order.
///
/// Calling this again rescans the filesystem, so a fresh iterator always
/// reflects the current state of the test root.
pub fn discover_tests(test_root: &Path) -> Result<SuiteIter, HarnessError> {
    let invalid_root = |source| HarnessError::InvalidTestRoot {
        path: test_root.to_path_buf(),
        source,
    };
    let mut suite_dirs = Vec::new();
    for entry in std::fs::read_dir(test_root).map_err(invalid_root)? {
        let path = entry.map_err(invalid_root)?.path();
        if path.is_dir() {
            suite_dirs.push(path);
        } else {
            log::debug!("discover_tests; skipping non-directory {}", path.display());
        }
    }
    suite_dirs.sort();
    log::info!(
        "discover_tests; {} candidate suite(s) under {}",
        suite_dirs.len(),
        test_root.display()
    );
    Ok(SuiteIter {
        suite_dirs: suite_dirs.into_iter(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, names: &[&str]) {
        std::fs::create_dir_all(dir).unwrap();
        for name in names {
            std::fs::write(dir.join(name), "").unwrap();
        }
    }

    #[test]
    fn test_invalid_suites_are_filtered_out() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("add"), &["add.ir", "t1.in", "t1.out"]);
        touch(&root.path().join("empty"), &["t1.in", "t1.out"]);
        touch(&root.path().join("twice"), &["a.ir", "b.ir"]);
        std::fs::write(root.path().join("README"), "not a suite").unwrap();

        let suites: Vec<TestSuite> = discover_tests(root.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let names: Vec<&str> = suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["add"]);
        assert_eq!(suites[0].cases.len(), 1);
    }

    #[test]
    fn test_discovery_is_restartable() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("a"), &["a.ir"]);
        assert_eq!(discover_tests(root.path()).unwrap().count(), 1);

        touch(&root.path().join("b"), &["b.ir", "x.in", "x.out"]);
        let names: Vec<String> = discover_tests(root.path())
            .unwrap()
            .map(|s| s.unwrap().name)
            .collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");
        match discover_tests(&missing) {
            Err(HarnessError::InvalidTestRoot { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("listing a missing root should fail"),
        }
    }
}
