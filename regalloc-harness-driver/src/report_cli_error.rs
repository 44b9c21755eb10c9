// SPDX-License-Identifier: Apache-2.0

use colored::Colorize;

/// Prints a fatal harness error to stderr and exits with status 1.
///
/// `stage` names the part of startup that failed (e.g. `config`); each detail
/// is printed indented on its own line below the message.
pub fn report_cli_error_and_exit(
    message: &str,
    stage: Option<&str>,
    details: &[(&str, &str)],
) -> ! {
    let prefix = match stage {
        Some(stage) => format!("regalloc-harness-driver: {}: ", stage),
        None => "regalloc-harness-driver: ".to_string(),
    };
    eprintln!("{}{}", prefix, message.red().bold());
    details
        .iter()
        .for_each(|(key, value)| eprintln!("  {}: {}", key, value));
    std::process::exit(1);
}
