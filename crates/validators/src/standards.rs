use crate::rule_ids::STANDARDS;
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use regex::Regex;
use utils::text::{line_of, truncate_list};

lazy_static! {
    static ref PASCAL_CASE_FILE: Regex =
        Regex::new(r"^[A-Z][A-Za-z0-9]*(?:_[A-Z0-9][A-Za-z0-9]*)*\.(?i:xaml)$")
            .expect("Failed to compile file name regex");
}

/// Naming and logging conventions.
pub fn validate_standards(doc: &Document<'_>, result: &mut ValidationResult) {
    if !PASCAL_CASE_FILE.is_match(doc.file_name) {
        result.add_issue(ValidationIssue::info(
            STANDARDS,
            format!("File name '{}' is not PascalCase", doc.file_name),
        ));
    }

    let short: Vec<(&str, usize)> = doc
        .elements
        .iter()
        .filter(|e| e.local_name() == "Variable")
        .filter_map(|e| e.attr("Name").map(|name| (name, e.start)))
        .filter(|(name, _)| name.chars().count() == 1)
        .collect();
    if let Some((_, offset)) = short.first() {
        let names: Vec<&str> = short.iter().map(|(name, _)| *name).collect();
        result.add_issue(
            ValidationIssue::warning(
                STANDARDS,
                format!(
                    "Single-letter variable names: {}",
                    truncate_list(&names, 5)
                ),
            )
            .with_line(line_of(doc.text, *offset)),
        );
    }

    if !doc.has_activity("LogMessage") {
        result.add_issue(ValidationIssue::info(
            STANDARDS,
            "Workflow contains no LogMessage activity".to_string(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run, run_with, workflow};
    use models::{ProjectContext, Severity};

    #[test]
    fn test_conforming_workflow() {
        let body = r#"<Sequence><ui:LogMessage Level="Info" Message="[&quot;a&quot;]" /></Sequence>"#;
        assert!(run(validate_standards, &workflow(body)).is_empty());
    }

    #[test]
    fn test_file_names() {
        for name in ["Main.xaml", "ProcessInvoice.xaml", "Framework_InitAllSettings.xaml"] {
            assert!(PASCAL_CASE_FILE.is_match(name), "{}", name);
        }
        for name in ["main.xaml", "process invoice.xaml", "Process-Invoice.xaml", "Main.txt"] {
            assert!(!PASCAL_CASE_FILE.is_match(name), "{}", name);
        }
    }

    #[test]
    fn test_findings() {
        let body = r#"<Sequence><Sequence.Variables>
<Variable x:TypeArguments="x:Int32" Name="i" />
<Variable x:TypeArguments="x:Int32" Name="index" />
</Sequence.Variables></Sequence>"#;
        let issues = run_with(
            validate_standards,
            &workflow(body),
            "get_data.xaml",
            &ProjectContext::unknown(),
            None,
        );
        let severities: Vec<Severity> = issues.iter().map(|i| i.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Info, Severity::Warning, Severity::Info]
        );
        assert_eq!(issues[1].message, "Single-letter variable names: i");
    }
}
