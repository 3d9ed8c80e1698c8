use crate::rule_ids::EXPRESSION_LANGUAGE;
use crate::Document;
use lazy_static::lazy_static;
use models::{Language, ValidationIssue, ValidationResult};
use regex::Regex;

const VB_INDICATORS: &[&str] = &[
    r"\bAndAlso\b",
    r"\bOrElse\b",
    r"\bIsNot\b",
    r"\bNothing\b",
    r"\bCType\(",
    r"\bDirectCast\(",
    r"\bDim\s+\w+",
    r"<mva:VisualBasicValue\b",
    r"<mva:VisualBasicReference\b",
    r"<VisualBasicValue\b",
    r"<VisualBasicReference\b",
];

const CSHARP_INDICATORS: &[&str] = &[
    r"&amp;&amp;",
    r"\|\|",
    r"==",
    r"!=",
    r"\bnull\b",
    r"\$&quot;",
    r"<(?:\w+:)?CSharpValue\b",
    r"<(?:\w+:)?CSharpReference\b",
];

lazy_static! {
    static ref VB_PATTERNS: Vec<Regex> = VB_INDICATORS
        .iter()
        .map(|p| Regex::new(p).expect("Failed to compile VB indicator regex"))
        .collect();
    static ref CSHARP_PATTERNS: Vec<Regex> = CSHARP_INDICATORS
        .iter()
        .map(|p| Regex::new(p).expect("Failed to compile C# indicator regex"))
        .collect();
}

fn count(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}

/// Expressions should be written in the project's language.
pub fn validate_expression_language(doc: &Document<'_>, result: &mut ValidationResult) {
    let vb = count(&VB_PATTERNS, doc.text);
    let csharp = count(&CSHARP_PATTERNS, doc.text);

    let mismatch = match doc.context.language {
        Language::VisualBasic if csharp > vb => Some(("C#", "VB")),
        Language::CSharp if vb > csharp => Some(("VB", "C#")),
        _ => None,
    };

    if let Some((found, expected)) = mismatch {
        result.add_issue(ValidationIssue::warning(
            EXPRESSION_LANGUAGE,
            format!(
                "Expressions look like {} ({} C# vs {} VB indicators) but the project language is {}",
                found, csharp, vb, expected
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run_with, workflow};
    use models::{ProjectContext, Severity};

    fn context(language: Language) -> ProjectContext {
        let mut context = ProjectContext::unknown();
        context.language = language;
        context
    }

    #[test]
    fn test_csharp_expressions_in_vb_project() {
        let body = r#"<If Condition="[a != null &amp;&amp; b == 1]" />"#;
        let issues = run_with(
            validate_expression_language,
            &workflow(body),
            "Main.xaml",
            &context(Language::VisualBasic),
            None,
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].message.starts_with("Expressions look like C# (4 C# vs 0 VB"));
    }

    #[test]
    fn test_matching_language_passes() {
        let body = r#"<If Condition="[a IsNot Nothing AndAlso b]" />"#;
        let issues = run_with(
            validate_expression_language,
            &workflow(body),
            "Main.xaml",
            &context(Language::VisualBasic),
            None,
        );
        assert!(issues.is_empty());

        let issues = run_with(
            validate_expression_language,
            &workflow(body),
            "Main.xaml",
            &context(Language::CSharp),
            None,
        );
        assert_eq!(issues.len(), 1);
    }
}
