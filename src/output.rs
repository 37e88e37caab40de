//! Run summary output: coloured text or JSON

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::driver::RunReport;

/// Number of changed paths listed before the rest is elided.
pub const DEFAULT_LIST_LIMIT: usize = 40;

/// Print the run summary to stdout with optional color.
pub fn print_summary(report: &RunReport, use_color: bool, list_limit: usize) -> io::Result<()> {
    let color_choice = if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(color_choice);
    write_summary(&mut stdout, report, list_limit)
}

/// Write the run summary to any color-capable writer.
pub fn write_summary<W: WriteColor>(
    out: &mut W,
    report: &RunReport,
    list_limit: usize,
) -> io::Result<()> {
    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    let mut path_color = ColorSpec::new();
    path_color.set_fg(Some(Color::Cyan));
    let mut warn_color = ColorSpec::new();
    warn_color.set_fg(Some(Color::Yellow));

    writeln!(out, "Scanned: {}", report.root.display())?;
    out.set_color(&bold)?;
    write!(out, "Files changed: {}", report.changed())?;
    out.reset()?;
    writeln!(out)?;

    for edit in report.edits.iter().take(list_limit) {
        write!(out, "- ")?;
        out.set_color(&path_color)?;
        write!(out, "{}", edit.path.display())?;
        out.reset()?;
        writeln!(out)?;
    }
    if report.changed() > list_limit {
        writeln!(out, "... and {} more", report.changed() - list_limit)?;
    }

    let attention: Vec<_> = report.needs_attention().collect();
    if !attention.is_empty() {
        writeln!(out)?;
        out.set_color(&warn_color)?;
        writeln!(out, "Needs attention:")?;
        out.reset()?;
        for edit in attention {
            write!(out, "- {}", edit.path.display())?;
            if !edit.missing_imports.is_empty() {
                write!(out, " (imports not added: {})", edit.missing_imports.join(", "))?;
            }
            if edit.dangling {
                write!(out, " (still references: {})", edit.unmapped.join(", "))?;
            }
            writeln!(out)?;
        }
    }

    if !report.failures.is_empty() {
        writeln!(out)?;
        out.set_color(&warn_color)?;
        writeln!(out, "Write failures: {}", report.failures.len())?;
        out.reset()?;
        for failure in &report.failures {
            writeln!(out, "- {}: {}", failure.path.display(), failure.error)?;
        }
    }

    if !report.applied && report.changed() > 0 {
        writeln!(out)?;
        writeln!(out, "Dry-run only. Re-run with --apply to write changes.")?;
    }

    Ok(())
}

/// Print the run report as JSON.
pub fn print_json(report: &RunReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}
