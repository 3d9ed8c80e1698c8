use colored::*;
use indexmap::IndexMap;
use models::{ComplianceStatus, ProjectContext, Severity, ValidationIssue, ValidationResult};
use serde::Serialize;
use std::io::{self, Write};

/// Machine-readable shape of one document's result
#[derive(Serialize)]
struct ValidationReport<'a> {
    file_path: &'a str,
    is_valid: bool,
    error_count: usize,
    warning_count: usize,
    issues: &'a [ValidationIssue],
    hr_compliance: &'a IndexMap<String, ComplianceStatus>,
    project_context: &'a ProjectContext,
}

impl<'a> From<&'a ValidationResult> for ValidationReport<'a> {
    fn from(result: &'a ValidationResult) -> Self {
        ValidationReport {
            file_path: &result.file_path,
            is_valid: result.is_valid,
            error_count: result.error_count(),
            warning_count: result.warning_count(),
            issues: &result.issues,
            hr_compliance: &result.compliance,
            project_context: &result.project_context,
        }
    }
}

/// Write the result as one pretty-printed JSON object.
pub fn render_json(result: &ValidationResult, out: &mut dyn Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&ValidationReport::from(result))?;
    writeln!(out, "{}", json)
}

fn status_label(status: ComplianceStatus) -> ColoredString {
    match status {
        ComplianceStatus::Pass => "✓ PASS".green(),
        ComplianceStatus::Fail => "✗ FAIL".red().bold(),
        ComplianceStatus::Warn => "! WARN".yellow(),
        ComplianceStatus::NotApplicable => "- N/A ".dimmed(),
    }
}

fn write_issue(out: &mut dyn Write, issue: &ValidationIssue) -> io::Result<()> {
    write!(out, "  [{}]", issue.rule)?;
    if let Some(line) = issue.line {
        write!(out, " line {}:", line)?;
    }
    write!(out, " {}", issue.message)?;
    if let Some(element) = &issue.element {
        write!(out, " ({})", element)?;
    }
    writeln!(out)
}

/// Write the human-readable report for one document.
pub fn render_text(result: &ValidationResult, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{} {}", "Validating:".bold(), result.file_path)?;

    let context = &result.project_context;
    if context.is_known() {
        write!(
            out,
            "Project: {} / {}",
            context.language, context.compatibility
        )?;
        if let Some(project) = &context.project_path {
            write!(out, " ({})", project)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "\n{}", "Compliance:".bold())?;
    for (rule, status) in &result.compliance {
        writeln!(
            out,
            "  {} {:<22} {}",
            status_label(*status),
            rule,
            validators::rule_name(rule)
        )?;
    }

    for (severity, heading) in [
        (Severity::Error, "Errors:".red().bold()),
        (Severity::Warning, "Warnings:".yellow().bold()),
        (Severity::Info, "Info:".blue().bold()),
    ] {
        let issues: Vec<&ValidationIssue> = result
            .issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .collect();
        if issues.is_empty() {
            continue;
        }
        writeln!(out, "\n{}", heading)?;
        for issue in issues {
            write_issue(out, issue)?;
        }
    }

    let verdict = if result.is_valid {
        "VALID".green().bold()
    } else {
        "INVALID".red().bold()
    };
    writeln!(
        out,
        "\nResult: {} ({} error(s), {} warning(s))\n",
        verdict,
        result.error_count(),
        result.warning_count()
    )
}
