//! Handles all user-facing output for the CLI.
//!
//! Status lines and diffs are colorized with `termcolor`; errors are rendered through
//! `miette` so parse failures show the offending file and position.

use std::io::Write;

use difference::Difference;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::engine::{BuildReport, OutputStatus};
use crate::TokensError;

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Renders an error as a miette report on stderr.
pub fn print_error(error: TokensError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

/// One line per output file, then a summary.
pub fn print_build_report(report: &BuildReport) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    for output in &report.outputs {
        let (marker, color) = match output.status {
            OutputStatus::Written => ("✓ wrote", Color::Green),
            OutputStatus::UpToDate => ("✓ up to date", Color::Green),
            OutputStatus::Missing => ("✗ missing", Color::Red),
            OutputStatus::Stale { .. } => ("✗ stale", Color::Red),
        };
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
        let _ = write!(stdout, "{marker}");
        let _ = stdout.reset();
        let _ = writeln!(
            stdout,
            " [{}] {} ({})",
            output.platform,
            output.path.display(),
            output.format
        );
        if let OutputStatus::Stale { diffs } = &output.status {
            print_diff(&mut stdout, diffs);
        }
    }

    let _ = stdout.set_color(ColorSpec::new().set_bold(true));
    let _ = writeln!(
        stdout,
        "\n{} tokens from {} source file(s), {} output(s)",
        report.token_count,
        report.sources.len(),
        report.outputs.len()
    );
    let _ = stdout.reset();
}

pub fn print_formats(names: &[&str]) {
    if names.is_empty() {
        println!("  No formats registered.");
        return;
    }
    for name in names {
        println!("  {}", name);
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(_) => {}
            Difference::Add(x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                for line in x.lines() {
                    let _ = writeln!(stdout, "    +{}", line);
                }
            }
            Difference::Rem(x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                for line in x.lines() {
                    let _ = writeln!(stdout, "    -{}", line);
                }
            }
        }
    }
    let _ = stdout.reset();
}
