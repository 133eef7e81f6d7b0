//! Output formatting for violation reports.

use anyhow::Result;
use schmid_rules_core::ViolationReport;
use std::io::Write;

use crate::OutputFormat;

/// Print the report in the specified format.
pub fn print(report: &ViolationReport, format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => write_text(report, &mut out)?,
        OutputFormat::Json => write_json(report, &mut out)?,
    }
    Ok(())
}

fn write_text(report: &ViolationReport, out: &mut impl Write) -> std::io::Result<()> {
    for description in &report.errors {
        writeln!(out, "\x1b[31merror\x1b[0m: {description}")?;
    }
    for description in &report.warnings {
        writeln!(out, "\x1b[33mwarning\x1b[0m: {description}")?;
    }

    let summary_color = if report.has_errors() {
        "\x1b[31m"
    } else if report.is_clean() {
        "\x1b[32m"
    } else {
        "\x1b[33m"
    };
    writeln!(out, "{summary_color}{}\x1b[0m", report.summary())
}

fn write_json(report: &ViolationReport, out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ViolationReport {
        ViolationReport {
            errors: vec!["web uses persistence".to_string()],
            warnings: vec!["cycle".to_string()],
        }
    }

    #[test]
    fn text_lists_errors_before_warnings_then_summary() {
        let mut out = Vec::new();
        write_text(&report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("error\x1b[0m: web uses persistence"));
        assert!(lines[1].ends_with("warning\x1b[0m: cycle"));
        assert!(lines[2].contains("Found 1 error(s), 1 warning(s)"));
    }

    #[test]
    fn clean_report_prints_only_summary() {
        let mut out = Vec::new();
        write_text(&ViolationReport::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("Found 0 error(s), 0 warning(s)"));
    }

    #[test]
    fn json_holds_classified_report() {
        let mut out = Vec::new();
        write_json(&report(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "errors": ["web uses persistence"],
                "warnings": ["cycle"],
            })
        );
    }
}
