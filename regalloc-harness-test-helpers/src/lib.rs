// SPDX-License-Identifier: Apache-2.0

//! Throwaway harness workspaces for tests.
//!
//! A [`HarnessFixture`] lays out the directory structure the harness expects
//! (`tests/`, `src/run.sh`, `src/build.sh`) inside a temporary directory, with
//! shell stand-ins for the code generator and the simulator:
//!
//! * The "IR" of a suite is a POSIX shell program. The fake build step copies
//!   it to the requested assembly path and appends one `# sw` line per spill
//!   the chosen allocator would emit (three for `--naive`, one for
//!   `--greedy`).
//! * The fake simulator (run through `sh`, so no file needs to be marked
//!   executable) prints a `Loaded:` banner, runs the program with the
//!   case input on stdin, and reports the number of `# sw` lines as the write
//!   count in a spim-style statistics block on stderr. A program that exits
//!   non-zero "crashes": an exception message is printed and no statistics
//!   block follows.

use std::path::{Path, PathBuf};

/// Reads two integers and prints their sum.
pub const SUM_PROGRAM: &str = "read a\nread b\necho $((a + b))\n";

/// Like [`SUM_PROGRAM`] but without a newline after the sum, so the
/// simulator's statistics block is glued onto the output line.
pub const SUM_PROGRAM_NO_NEWLINE: &str = "read a\nread b\nprintf '%d' $((a + b))\n";

/// Prints one line and then faults.
pub const CRASHING_PROGRAM: &str = "echo 1\nexit 3\n";

/// Stand-in for `spim -keepstats -f <file>`.
pub const FAKE_SIMULATOR: &str = r#"#!/bin/sh
for asm in "$@"; do :; done
echo "Loaded: /usr/lib/spim/exceptions.s"
if ! sh "$asm"; then
  echo "Exception occurred at PC=0x00400024"
  echo "  Bad address in data/stack read: 0x00000000"
  exit 0
fi
writes=$(grep -c '^# sw' "$asm")
echo "Stats -- #instructions : 42" >&2
echo "         #reads : 7  #writes $writes  #branches 3  #other 32" >&2
"#;

/// A simulator whose statistics block lacks the write-count field.
pub const GARBLED_STATS_SIMULATOR: &str = r#"#!/bin/sh
for asm in "$@"; do :; done
echo "Loaded: /usr/lib/spim/exceptions.s"
sh "$asm"
echo "Stats -- #instructions : 42"
echo "         #reads : 7"
"#;

/// Renders the fake build step. Strategies whose flag is listed in
/// `failing_flags` print a diagnostic and exit successfully without writing
/// an artifact, like the real code generator does.
pub fn build_script(failing_flags: &[&str]) -> String {
    let mut script = String::from("#!/bin/sh\nir=\"$1\"\nout=\"$2\"\ncase \"$3\" in\n");
    for flag in failing_flags {
        script.push_str(&format!(
            "  {flag}) echo \"register allocation failed for {flag}\"; exit 0 ;;\n"
        ));
    }
    script.push_str(
        "  --naive) spills=3 ;;\n  --greedy) spills=1 ;;\n  *) echo \"unknown strategy $3\"; exit 0 ;;\nesac\n",
    );
    script.push_str("cp \"$ir\" \"$out\"\ni=0\nwhile [ \"$i\" -lt \"$spills\" ]; do\n  echo '# sw' >> \"$out\"\n  i=$((i + 1))\ndone\n");
    script
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture directory");
    }
    std::fs::write(path, contents).expect("write fixture file");
}

/// Quotes a path as a TOML basic string.
fn toml_path(path: &Path) -> String {
    format!("{:?}", path.display().to_string())
}

pub struct HarnessFixture {
    root: tempfile::TempDir,
}

impl HarnessFixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create fixture root");
        let fixture = HarnessFixture { root };
        std::fs::create_dir_all(fixture.test_dir()).expect("create test dir");
        write_file(&fixture.compiler_dir().join("run.sh"), &build_script(&[]));
        write_file(
            &fixture.build_all_script(),
            "#!/bin/sh\necho built > \"$(dirname \"$0\")/BUILT\"\n",
        );
        write_file(&fixture.simulator_path(), FAKE_SIMULATOR);
        log::info!("HarnessFixture; root: {}", fixture.root().display());
        fixture
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn test_dir(&self) -> PathBuf {
        self.root().join("tests")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root().join("logs")
    }

    pub fn compiler_dir(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn build_all_script(&self) -> PathBuf {
        self.compiler_dir().join("build.sh")
    }

    /// File the project build script leaves behind once it has run.
    pub fn build_marker(&self) -> PathBuf {
        self.compiler_dir().join("BUILT")
    }

    pub fn simulator_path(&self) -> PathBuf {
        self.root().join("bin").join("fake-spim")
    }

    /// Program and leading arguments that invoke the fake simulator the way
    /// `spim -keepstats -f` would be invoked.
    pub fn simulator_command(&self) -> (String, Vec<String>) {
        (
            "sh".to_string(),
            vec![
                self.simulator_path().display().to_string(),
                "-keepstats".to_string(),
                "-f".to_string(),
            ],
        )
    }

    /// Creates `tests/<name>/` holding the given files, e.g.
    /// `[("add.ir", SUM_PROGRAM), ("t1.in", "2\n3\n"), ("t1.out", "5\n")]`.
    pub fn add_suite(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let suite_dir = self.test_dir().join(name);
        std::fs::create_dir_all(&suite_dir).expect("create suite dir");
        for (file_name, contents) in files {
            write_file(&suite_dir.join(file_name), contents);
        }
        suite_dir
    }

    /// Makes the build step silently fail for the given strategy flags.
    pub fn fail_builds_for(&self, failing_flags: &[&str]) {
        write_file(
            &self.compiler_dir().join("run.sh"),
            &build_script(failing_flags),
        );
    }

    pub fn set_simulator(&self, script: &str) {
        write_file(&self.simulator_path(), script);
    }

    /// Writes a `regalloc-harness.toml` pointing at this fixture and returns
    /// its path.
    pub fn write_config_toml(&self) -> PathBuf {
        let path = self.root().join("regalloc-harness.toml");
        let contents = format!(
            "[harness]\ntest_dir = {}\nlog_dir = {}\ncompiler_dir = {}\nbuild_script = \"./run.sh\"\nbuild_all_script = {}\nsimulator = \"sh\"\nsimulator_args = [{}, \"-keepstats\", \"-f\"]\n",
            toml_path(&self.test_dir()),
            toml_path(&self.log_dir()),
            toml_path(&self.compiler_dir()),
            toml_path(&self.build_all_script()),
            toml_path(&self.simulator_path()),
        );
        write_file(&path, &contents);
        path
    }

    pub fn read_log(&self, suite_name: &str) -> Option<String> {
        std::fs::read_to_string(self.log_dir().join(format!("{}.log", suite_name))).ok()
    }
}

impl Default for HarnessFixture {
    fn default() -> Self {
        Self::new()
    }
}
