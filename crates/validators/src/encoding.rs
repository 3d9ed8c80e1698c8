use crate::markup::{attributes, body_range, is_expression};
use crate::rule_ids::{DOUBLE_ENCODING, EXPRESSION_ENCODING};
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use regex::Regex;
use std::collections::BTreeMap;
use utils::text::{line_of, truncate_list};

/// Elements whose content is an argument or literal value
const VALUE_ELEMENTS: &[&str] = &[
    "InArgument",
    "OutArgument",
    "InOutArgument",
    "Literal",
    "VisualBasicValue",
    "VisualBasicReference",
    "CSharpValue",
    "CSharpReference",
];

lazy_static! {
    static ref DOUBLE_ENCODED: Regex =
        Regex::new(r"&amp;(?:amp|lt|gt|quot|apos|#\d+|#x[0-9a-fA-F]+);")
            .expect("Failed to compile double encoding regex");
    static ref ENTITY: Regex = Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]*|#\d+|#x[0-9a-fA-F]+);")
        .expect("Failed to compile entity regex");
    static ref TEXT_RUN: Regex = Regex::new(r">([^<]+)<").expect("Failed to compile text run regex");
}

fn is_selector(name: &str) -> bool {
    name.contains("Selector")
}

fn unescaped_characters(value: &str) -> Vec<char> {
    let mut found = Vec::new();
    for (i, c) in value.char_indices() {
        let bad = match c {
            '<' | '>' => true,
            '&' => !ENTITY.is_match(&value[i..]),
            _ => false,
        };
        if bad && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

/// Expression attribute values must escape `<`, `>` and `&`.
pub fn validate_expression_encoding(doc: &Document<'_>, result: &mut ValidationResult) {
    let mut offenders: Vec<String> = Vec::new();
    let mut first: Option<usize> = None;

    for attr in attributes(doc.text).filter(|a| is_expression(a.value)) {
        let chars = unescaped_characters(attr.value);
        if chars.is_empty() {
            continue;
        }
        let chars: Vec<String> = chars.iter().map(|c| c.to_string()).collect();
        offenders.push(format!("{} ({})", attr.name, chars.join(" ")));
        first.get_or_insert(attr.offset);
    }

    if offenders.is_empty() {
        return;
    }

    let mut issue = ValidationIssue::warning(
        EXPRESSION_ENCODING,
        format!(
            "Unescaped characters in expression attributes: {}",
            truncate_list(&offenders, 5)
        ),
    );
    if let Some(offset) = first {
        issue = issue.with_line(line_of(doc.text, offset));
    }
    result.add_issue(issue);
}

/// Entities encoded twice (e.g. `&amp;quot;`) in expressions and values.
/// Selector content is skipped since selectors legitimately nest markup.
pub fn validate_double_encoding(doc: &Document<'_>, result: &mut ValidationResult) {
    let text = doc.text;
    // offset -> description of where it was found
    let mut findings: BTreeMap<usize, String> = BTreeMap::new();

    for attr in attributes(text) {
        if is_selector(attr.name) || !is_expression(attr.value) {
            continue;
        }
        for m in DOUBLE_ENCODED.find_iter(attr.value) {
            findings
                .entry(attr.offset + m.start())
                .or_insert_with(|| format!("attribute {} ({})", attr.name, m.as_str()));
        }
    }

    let selector_spans: Vec<(usize, usize)> = doc
        .elements
        .iter()
        .filter(|e| is_selector(e.local_name()))
        .map(|e| (e.start, e.end))
        .collect();
    let in_selector =
        |offset: usize| selector_spans.iter().any(|(s, e)| *s <= offset && offset < *e);

    for element in doc
        .elements
        .iter()
        .filter(|e| VALUE_ELEMENTS.contains(&e.local_name()))
    {
        let Some((start, end)) = body_range(text, element) else {
            continue;
        };
        for m in DOUBLE_ENCODED.find_iter(&text[start..end]) {
            let offset = start + m.start();
            if in_selector(offset) {
                continue;
            }
            findings
                .entry(offset)
                .or_insert_with(|| format!("element {} ({})", element.local_name(), m.as_str()));
        }
    }

    for caps in TEXT_RUN.captures_iter(text) {
        let Some(run) = caps.get(1) else {
            continue;
        };
        for m in DOUBLE_ENCODED.find_iter(run.as_str()) {
            let offset = run.start() + m.start();
            if in_selector(offset) {
                continue;
            }
            findings
                .entry(offset)
                .or_insert_with(|| format!("text ({})", m.as_str()));
        }
    }

    let Some(first) = findings.keys().next().copied() else {
        return;
    };
    let locations: Vec<String> = findings.into_values().collect();
    result.add_issue(
        ValidationIssue::error(
            DOUBLE_ENCODING,
            format!(
                "Double-encoded entities in {} location(s): {}",
                locations.len(),
                truncate_list(&locations, 3)
            ),
        )
        .with_line(line_of(text, first)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run, workflow};
    use models::Severity;

    #[test]
    fn test_escaped_expressions_pass() {
        let body = r#"<If Condition="[a &lt; b AndAlso c &amp; d]" DisplayName="a > b" />"#;
        assert!(run(validate_expression_encoding, &workflow(body)).is_empty());
    }

    #[test]
    fn test_raw_greater_than_in_expression() {
        let body = r#"<If Condition="[count > 3]" />"#;
        let issues = run(validate_expression_encoding, &workflow(body));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(
            issues[0].message,
            "Unescaped characters in expression attributes: Condition (>)"
        );
    }

    #[test]
    fn test_double_encoded_attribute() {
        let body = r#"<ui:LogMessage Message="[&amp;quot;Hello&amp;quot;]" />"#;
        let issues = run(validate_double_encoding, &workflow(body));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].message.starts_with("Double-encoded entities in 2 location(s)"));
        assert!(issues[0].message.contains("attribute Message (&amp;quot;)"));
    }

    #[test]
    fn test_double_encoded_value_element_counted_once() {
        let body = r#"<Assign><Assign.Value><InArgument x:TypeArguments="x:String">[&amp;lt;tag]</InArgument></Assign.Value></Assign>"#;
        let issues = run(validate_double_encoding, &workflow(body));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("Double-encoded entities in 1 location(s)"));
        assert!(issues[0].message.contains("element InArgument"));
    }

    #[test]
    fn test_selectors_are_exempt() {
        let body = r#"<uix:TargetAnchorable FullSelectorArgument="[&amp;lt;html /&amp;gt;]">
<uix:TargetAnchorable.ScopeSelector>&amp;lt;wnd app='x' /&amp;gt;</uix:TargetAnchorable.ScopeSelector>
</uix:TargetAnchorable>"#;
        assert!(run(validate_double_encoding, &workflow(body)).is_empty());
    }

    #[test]
    fn test_single_encoding_passes() {
        let body = r#"<ui:LogMessage Message="[&quot;a &amp; b&quot;]" />"#;
        assert!(run(validate_double_encoding, &workflow(body)).is_empty());
    }
}
