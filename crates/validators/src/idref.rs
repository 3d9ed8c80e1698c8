use crate::rule_ids::{IDREF_DECLARATION, IDREF_UNIQUE};
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use utils::text::{line_of, truncate_list};

lazy_static! {
    static ref IDREF_ATTRIBUTE: Regex =
        Regex::new(r#"\s(?:sap2010|sap):WorkflowViewState\.IdRef\s*=\s*"([^"]*)""#)
            .expect("Failed to compile IdRef attribute regex");
    static ref IDREF_ELEMENT: Regex =
        Regex::new(r"<(?:sap2010|sap):WorkflowViewState\.IdRef>\s*([^<]*?)\s*</")
            .expect("Failed to compile IdRef element regex");
}

pub(crate) fn has_idref(text: &str) -> bool {
    IDREF_ATTRIBUTE.is_match(text) || IDREF_ELEMENT.is_match(text)
}

fn captured(regex: &Regex, text: &str) -> Vec<(String, usize)> {
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.as_str().to_string(), m.start()))
        .collect()
}

/// IdRef attribute values must be unique within the document.
pub fn validate_idref_uniqueness(doc: &Document<'_>, result: &mut ValidationResult) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates: Vec<String> = Vec::new();
    let mut first_duplicate: Option<usize> = None;

    for (value, offset) in captured(&IDREF_ATTRIBUTE, doc.text) {
        let count = seen.entry(value.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(format!("\"{}\"", value));
            first_duplicate.get_or_insert(offset);
        }
    }

    if duplicates.is_empty() {
        return;
    }

    let mut issue = ValidationIssue::error(
        IDREF_UNIQUE,
        format!("Duplicate IdRef values: {}", truncate_list(&duplicates, 3)),
    );
    if let Some(offset) = first_duplicate {
        issue = issue.with_line(line_of(doc.text, offset));
    }
    result.add_issue(issue);
}

/// An IdRef is declared once, as an attribute. Values that also appear as a
/// property element are errors; element-only values are warnings.
pub fn validate_idref_declarations(doc: &Document<'_>, result: &mut ValidationResult) {
    let attributes: BTreeSet<String> = captured(&IDREF_ATTRIBUTE, doc.text)
        .into_iter()
        .map(|(value, _)| value)
        .collect();

    let mut both: Vec<String> = Vec::new();
    let mut element_only: Vec<String> = Vec::new();
    let mut both_line = None;
    let mut element_line = None;

    for (value, offset) in captured(&IDREF_ELEMENT, doc.text) {
        if attributes.contains(&value) {
            if !both.contains(&value) {
                both.push(value);
                both_line.get_or_insert(line_of(doc.text, offset));
            }
        } else if !element_only.contains(&value) {
            element_only.push(value);
            element_line.get_or_insert(line_of(doc.text, offset));
        }
    }

    if !both.is_empty() {
        let mut issue = ValidationIssue::error(
            IDREF_DECLARATION,
            format!(
                "IdRef declared both as attribute and element: {}",
                truncate_list(&both, 3)
            ),
        );
        if let Some(line) = both_line {
            issue = issue.with_line(line);
        }
        result.add_issue(issue);
    }

    if !element_only.is_empty() {
        let mut issue = ValidationIssue::warning(
            IDREF_DECLARATION,
            format!(
                "IdRef declared only in element form, use the attribute form: {}",
                truncate_list(&element_only, 3)
            ),
        );
        if let Some(line) = element_line {
            issue = issue.with_line(line);
        }
        result.add_issue(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run, workflow};
    use models::Severity;

    #[test]
    fn test_duplicate_reported_once() {
        let body = r#"<Sequence sap2010:WorkflowViewState.IdRef="abc">
  <Sequence sap2010:WorkflowViewState.IdRef="abc" />
  <Sequence sap:WorkflowViewState.IdRef="abc" />
  <Sequence sap2010:WorkflowViewState.IdRef="def" />
</Sequence>"#;
        let issues = run(validate_idref_uniqueness, &workflow(body));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].message, "Duplicate IdRef values: \"abc\"");
        assert_eq!(issues[0].message.matches("abc").count(), 1);
    }

    #[test]
    fn test_duplicates_truncated() {
        let body: String = ["a", "b", "c", "d"]
            .iter()
            .map(|id| {
                format!(
                    "<Sequence sap2010:WorkflowViewState.IdRef=\"{0}\" /><Sequence sap2010:WorkflowViewState.IdRef=\"{0}\" />",
                    id
                )
            })
            .collect();
        let issues = run(validate_idref_uniqueness, &workflow(&body));
        assert_eq!(
            issues[0].message,
            "Duplicate IdRef values: \"a\", \"b\", \"c\" (+1 more)"
        );
    }

    #[test]
    fn test_dual_and_element_only_declarations() {
        let body = r#"<Sequence sap2010:WorkflowViewState.IdRef="Seq_1">
  <sap2010:WorkflowViewState.IdRef>Seq_1</sap2010:WorkflowViewState.IdRef>
  <Assign>
    <sap2010:WorkflowViewState.IdRef> Assign_1 </sap2010:WorkflowViewState.IdRef>
  </Assign>
</Sequence>"#;
        let issues = run(validate_idref_declarations, &workflow(body));
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].message.ends_with("Seq_1"));
        assert_eq!(issues[1].severity, Severity::Warning);
        assert!(issues[1].message.ends_with("Assign_1"));
    }

    #[test]
    fn test_has_idref() {
        assert!(has_idref(r#"<a sap2010:WorkflowViewState.IdRef="x" />"#));
        assert!(!has_idref("<a />"));
    }
}
