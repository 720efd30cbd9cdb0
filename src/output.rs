//! @ai:module:intent Format output for different formats (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_check_result, format_run_summary
//! @ai:module:depends_on checker, adapter
//! @ai:module:stateless true

use crate::adapter::RunSummary;
use crate::checker::{CheckResult, Severity};
use colored::Colorize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format check results as a string
/// @ai:effects pure
pub fn format_check_result(result: &CheckResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(result).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(result).unwrap_or_default(),
        OutputFormat::Text => format_check_result_text(result),
    }
}

/// @ai:intent Format check results as human-readable text
/// @ai:effects pure
fn format_check_result_text(result: &CheckResult) -> String {
    let mut output = String::new();

    for issue in &result.issues {
        let severity_str = match issue.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warning => "WARN".yellow().bold(),
        };

        let location = match issue.location.column {
            Some(column) => format!(
                "{}:{}:{}",
                issue.location.file.display(),
                issue.location.line,
                column
            ),
            None => format!("{}:{}", issue.location.file.display(), issue.location.line),
        };

        output.push_str(&format!(
            "{} {} - {} ({})\n",
            severity_str,
            location.dimmed(),
            first_line(&issue.message),
            issue.code.dimmed()
        ));

        if let Some(suggestion) = &issue.suggestion {
            output.push_str(&format!("  {} {}\n", "hint:".cyan(), suggestion));
        }
    }

    output.push('\n');
    output.push_str(&format!(
        "Checked {} files, {} annotations\n",
        result.files_checked, result.annotations_checked
    ));

    if result.errors > 0 {
        output.push_str(&format!(
            "{} errors, {} warnings\n",
            result.errors.to_string().red().bold(),
            result.warnings.to_string().yellow()
        ));
    } else if result.warnings > 0 {
        output.push_str(&format!(
            "{} {} warnings\n",
            "OK".green().bold(),
            result.warnings.to_string().yellow()
        ));
    } else {
        output.push_str(&format!("{} No issues found\n", "OK".green().bold()));
    }

    output
}

// Annotation errors carry the payload on later lines; one line per issue is enough here.
fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or(message)
}

/// @ai:intent Format a transform run as a string
/// @ai:effects pure
pub fn format_run_summary(summary: &RunSummary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
        OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
        OutputFormat::Text => format_run_summary_text(summary),
    }
}

/// @ai:intent Format a transform run as human-readable text
/// @ai:effects pure
fn format_run_summary_text(summary: &RunSummary) -> String {
    let mut output = String::new();

    for path in &summary.written {
        output.push_str(&format!("{} {}\n", "wrote".green(), path.display()));
    }

    for failure in &summary.failures {
        output.push_str(&format!(
            "{} {} ({})\n",
            "FAILED".red().bold(),
            failure.path.display(),
            failure.code.dimmed()
        ));
        for line in failure.message.lines().filter(|l| !l.trim().is_empty()) {
            output.push_str(&format!("  {}\n", line));
        }
    }

    output.push('\n');
    if summary.passed() {
        output.push_str(&format!(
            "{} {}: {} files written\n",
            "OK".green().bold(),
            summary.transform,
            summary.written.len()
        ));
    } else {
        output.push_str(&format!(
            "{}: {} files written, {} failed\n",
            summary.transform,
            summary.written.len(),
            summary.failures.len().to_string().red().bold()
        ));
    }

    output
}
