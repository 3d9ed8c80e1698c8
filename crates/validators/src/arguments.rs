use crate::rule_ids::ARGUMENTS;
use crate::Document;
use models::{Language, ValidationIssue, ValidationResult};
use utils::text::{line_of, truncate_list};

/// Argument type wrapper and the name prefix it calls for
const DIRECTION_PREFIXES: &[(&str, &str)] = &[
    ("InOutArgument(", "io_"),
    ("InArgument(", "in_"),
    ("OutArgument(", "out_"),
];

fn expected_prefix(type_name: &str) -> Option<&'static str> {
    let type_name = type_name.trim();
    DIRECTION_PREFIXES
        .iter()
        .find(|(wrapper, _)| type_name.starts_with(wrapper))
        .map(|(_, prefix)| *prefix)
}

/// Arguments carry their direction in their name; variables must not reuse
/// an argument's name.
pub fn validate_arguments(doc: &Document<'_>, result: &mut ValidationResult) {
    let mut arguments: Vec<&str> = Vec::new();
    let mut unprefixed: Vec<String> = Vec::new();
    let mut first_unprefixed: Option<usize> = None;

    for element in doc.elements.iter().filter(|e| e.name == "x:Property") {
        let Some(name) = element.attr("Name") else {
            continue;
        };
        let Some(prefix) = element.attr("Type").and_then(expected_prefix) else {
            continue;
        };
        arguments.push(name);
        if !name.to_ascii_lowercase().starts_with(prefix) {
            unprefixed.push(format!("{} (expected {})", name, prefix));
            first_unprefixed.get_or_insert(element.start);
        }
    }

    if !unprefixed.is_empty() {
        let mut issue = ValidationIssue::warning(
            ARGUMENTS,
            format!(
                "Arguments without a direction prefix: {}",
                truncate_list(&unprefixed, 5)
            ),
        );
        if let Some(offset) = first_unprefixed {
            issue = issue.with_line(line_of(doc.text, offset));
        }
        result.add_issue(issue);
    }

    let case_sensitive = doc.context.language == Language::CSharp;
    let same_name = |a: &str, b: &str| {
        if case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    };

    let mut shadowing: Vec<&str> = Vec::new();
    let mut first_shadow: Option<usize> = None;
    for element in doc.elements.iter().filter(|e| e.local_name() == "Variable") {
        let Some(name) = element.attr("Name") else {
            continue;
        };
        if arguments.iter().any(|arg| same_name(arg, name)) {
            shadowing.push(name);
            first_shadow.get_or_insert(element.start);
        }
    }

    if !shadowing.is_empty() {
        let mut issue = ValidationIssue::error(
            ARGUMENTS,
            format!(
                "Variables shadow arguments: {}",
                truncate_list(&shadowing, 5)
            ),
        );
        if let Some(offset) = first_shadow {
            issue = issue.with_line(line_of(doc.text, offset));
        }
        result.add_issue(issue);
    }
}
