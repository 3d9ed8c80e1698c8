use crate::rule_ids::TYPE_SYSTEM;
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use regex::Regex;
use utils::text::{line_of, truncate_list};

lazy_static! {
    static ref TYPE_STRING: Regex =
        Regex::new(r#"\s(Type|[A-Za-z_][\w\-]*:TypeArguments)\s*=\s*"([^"]*)""#)
            .expect("Failed to compile type string regex");
}

/// Why a type string is malformed, if it is
fn type_problem(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some("empty");
    }
    if value != value.trim() {
        return Some("leading or trailing whitespace");
    }
    if value.contains('<') || value.contains("&lt;") {
        return Some("C# generic syntax, use parentheses");
    }

    let mut depth: i32 = 0;
    for c in value.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Some("unbalanced parentheses");
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Some("unbalanced parentheses");
    }

    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains("()") || compact.contains("(,") || compact.contains(",)") || compact.contains(",,")
    {
        return Some("empty generic argument");
    }
    None
}

fn identifier_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("empty")
    } else if name.chars().any(char::is_whitespace) {
        Some("contains whitespace")
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        Some("starts with a digit")
    } else {
        None
    }
}

/// Type strings must be well-formed and declared names usable as
/// identifiers.
pub fn validate_type_system(doc: &Document<'_>, result: &mut ValidationResult) {
    let mut malformed: Vec<String> = Vec::new();
    let mut first_type: Option<usize> = None;
    for caps in TYPE_STRING.captures_iter(doc.text) {
        let (Some(attr), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if let Some(problem) = type_problem(value.as_str()) {
            malformed.push(format!("{}=\"{}\" ({})", attr.as_str(), value.as_str(), problem));
            first_type.get_or_insert(value.start());
        }
    }

    if !malformed.is_empty() {
        let mut issue = ValidationIssue::warning(
            TYPE_SYSTEM,
            format!("Malformed type strings: {}", truncate_list(&malformed, 3)),
        );
        if let Some(offset) = first_type {
            issue = issue.with_line(line_of(doc.text, offset));
        }
        result.add_issue(issue);
    }

    let mut invalid: Vec<String> = Vec::new();
    let mut first_name: Option<usize> = None;
    for element in doc
        .elements
        .iter()
        .filter(|e| e.name == "x:Property" || e.local_name() == "Variable")
    {
        let Some(name) = element.attr("Name") else {
            continue;
        };
        if let Some(problem) = identifier_problem(name) {
            invalid.push(format!("'{}' ({})", name, problem));
            first_name.get_or_insert(element.start);
        }
    }

    if !invalid.is_empty() {
        let mut issue = ValidationIssue::warning(
            TYPE_SYSTEM,
            format!("Invalid identifiers: {}", truncate_list(&invalid, 5)),
        );
        if let Some(offset) = first_name {
            issue = issue.with_line(line_of(doc.text, offset));
        }
        result.add_issue(issue);
    }
}
