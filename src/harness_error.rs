// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Conditions under which no test result can be trusted.
///
/// Outcomes that belong to a single suite or case (an invalid suite, a build
/// that produced no assembly, a program that crashed in the simulator) are not
/// represented here; they are ordinary values returned by the respective
/// components.
#[derive(Debug)]
pub enum HarnessError {
    /// A filesystem operation the harness depends on failed.
    Io {
        context: String,
        source: std::io::Error,
    },
    /// An external executable could not be spawned or waited on.
    Launch {
        program: String,
        source: std::io::Error,
    },
    /// The simulator's statistics line did not have the expected layout.
    StatsFormat { line: String },
    /// The test root directory could not be listed.
    InvalidTestRoot {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl HarnessError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        HarnessError::Io {
            context: context.into(),
            source,
        }
    }
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::Io { context, source } => write!(f, "{}: {}", context, source),
            HarnessError::Launch { program, source } => {
                write!(f, "could not launch `{}`: {}", program, source)
            }
            HarnessError::StatsFormat { line } => write!(
                f,
                "unrecognized simulator statistics line (simulator version mismatch?): {:?}",
                line
            ),
            HarnessError::InvalidTestRoot { path, source } => {
                write!(f, "cannot list test root {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Io { source, .. }
            | HarnessError::Launch { source, .. }
            | HarnessError::InvalidTestRoot { source, .. } => Some(source),
            HarnessError::StatsFormat { .. } => None,
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(e: std::io::Error) -> Self {
        HarnessError::Io {
            context: "I/O error".to_string(),
            source: e,
        }
    }
}
