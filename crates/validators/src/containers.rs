use crate::markup::open_tags;
use crate::rule_ids::PRIMARY_CONTAINER;
use crate::Document;
use models::{ValidationIssue, ValidationResult};
use utils::text::line_of;

const PRIMARY_CONTAINERS: &[&str] = &["Sequence", "Flowchart", "StateMachine"];

/// A workflow needs at least one Sequence, Flowchart or StateMachine.
/// Every occurrence counts, nested ones included.
pub fn validate_primary_container(doc: &Document<'_>, result: &mut ValidationResult) {
    let mut counts = [0usize; 3];
    let mut first: Option<usize> = None;

    for tag in open_tags(doc.text).filter(|tag| tag.prefix.is_none()) {
        if let Some(i) = PRIMARY_CONTAINERS.iter().position(|c| *c == tag.local) {
            counts[i] += 1;
            first.get_or_insert(tag.start);
        }
    }

    let total: usize = counts.iter().sum();
    match total {
        0 => result.add_issue(ValidationIssue::error(
            PRIMARY_CONTAINER,
            format!(
                "No primary container found; expected one of {}",
                PRIMARY_CONTAINERS.join(", ")
            ),
        )),
        1 => {}
        _ => {
            let breakdown: Vec<String> = PRIMARY_CONTAINERS
                .iter()
                .zip(counts.iter())
                .filter(|(_, count)| **count > 0)
                .map(|(name, count)| format!("{}: {}", name, count))
                .collect();
            let mut issue = ValidationIssue::info(
                PRIMARY_CONTAINER,
                format!(
                    "Found {} primary containers ({})",
                    total,
                    breakdown.join(", ")
                ),
            );
            if let Some(offset) = first {
                issue = issue.with_line(line_of(doc.text, offset));
            }
            result.add_issue(issue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run, workflow};
    use models::Severity;

    #[test]
    fn test_single_container_passes() {
        let issues = run(
            validate_primary_container,
            &workflow("<Sequence><Sequence.Variables /></Sequence>"),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_container_is_error() {
        let issues = run(validate_primary_container, &workflow("<ui:LogMessage />"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_nested_containers_are_info() {
        let body = "<Flowchart><FlowStep><Sequence><Sequence /></Sequence></FlowStep></Flowchart>";
        let issues = run(validate_primary_container, &workflow(body));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Info);
        assert_eq!(
            issues[0].message,
            "Found 3 primary containers (Sequence: 2, Flowchart: 1)"
        );
    }
}
