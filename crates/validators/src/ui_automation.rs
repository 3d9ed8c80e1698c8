use crate::markup::{label, open_tags};
use crate::rule_ids::UI_AUTOMATION;
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use regex::Regex;
use utils::text::{line_of, truncate_list};

/// Interactive UI automation activities, modern and classic
const FORBIDDEN_ACTIVITIES: &[&str] = &[
    "NApplicationCard",
    "NCheck",
    "NCheckState",
    "NClick",
    "NExtractData",
    "NGetText",
    "NGoToUrl",
    "NHover",
    "NKeyboardShortcuts",
    "NMouseScroll",
    "NSelectItem",
    "NTypeInto",
    "AttachBrowser",
    "AttachWindow",
    "Click",
    "ElementExists",
    "FindElement",
    "GetText",
    "Hover",
    "OpenApplication",
    "OpenBrowser",
    "SendHotkey",
    "SetText",
    "TypeInto",
    "UiElementExists",
    "WaitUiElementAppear",
];

lazy_static! {
    static ref SELECTOR_ATTRIBUTE: Regex = Regex::new(
        r#"\s[\w:.\-]*Selector[\w.\-]*\s*=\s*"\s*\[?\s*(?:&quot;)?&lt;(?:html|wnd|webctrl|ctrl)\b"#
    )
    .expect("Failed to compile selector attribute regex");
    static ref SELECTOR_ELEMENT: Regex = Regex::new(
        r"<[\w:.\-]*Selector[\w.\-]*>\s*(?:\[\s*)?(?:&quot;)?&lt;(?:html|wnd|webctrl|ctrl)\b"
    )
    .expect("Failed to compile selector element regex");
    static ref AUTOMATION_IMPORT: Regex = Regex::new(
        r#"(?:>|Import=")\s*UiPath\.UIAutomationNext(?:\.[\w.]+)?\s*[<"]"#
    )
    .expect("Failed to compile automation import regex");
}

/// Workflows must not drive user interfaces.
pub fn validate_ui_automation(doc: &Document<'_>, result: &mut ValidationResult) {
    let text = doc.text;

    let activities: Vec<(String, usize)> = open_tags(text)
        .filter(|tag| FORBIDDEN_ACTIVITIES.contains(&tag.local))
        .map(|tag| (label(text, tag.start, tag.local), tag.start))
        .collect();
    if let Some((_, first)) = activities.first() {
        let names: Vec<&str> = activities.iter().map(|(name, _)| name.as_str()).collect();
        result.add_issue(
            ValidationIssue::error(
                UI_AUTOMATION,
                format!(
                    "UI automation activities are not allowed: {}",
                    truncate_list(&names, 5)
                ),
            )
            .with_line(line_of(text, *first)),
        );
    }

    let selector = SELECTOR_ATTRIBUTE
        .find(text)
        .into_iter()
        .chain(SELECTOR_ELEMENT.find(text))
        .map(|m| m.start())
        .min();
    if let Some(offset) = selector {
        result.add_issue(
            ValidationIssue::error(
                UI_AUTOMATION,
                "UI selectors found; workflows must not target screen elements".to_string(),
            )
            .with_line(line_of(text, offset)),
        );
    }

    if let Some(m) = AUTOMATION_IMPORT.find(text) {
        result.add_issue(
            ValidationIssue::error(
                UI_AUTOMATION,
                "UiPath.UIAutomationNext namespace is imported".to_string(),
            )
            .with_line(line_of(text, m.start())),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{run, workflow};
    use models::Severity;

    #[test]
    fn test_clean_workflow_passes() {
        let body = r#"<Sequence><ui:LogMessage Level="Info" Message="[&quot;ok&quot;]" /><Assign DisplayName="Click count" /></Sequence>"#;
        assert!(run(validate_ui_automation, &workflow(body)).is_empty());
    }

    #[test]
    fn test_forbidden_activities_prefixed_and_bare() {
        let body = r#"<Sequence>
<uix:NClick DisplayName="Click Login"><uix:NClick.Target /></uix:NClick>
<TypeInto />
</Sequence>"#;
        let issues = run(validate_ui_automation, &workflow(body));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(
            issues[0].message,
            "UI automation activities are not allowed: NClick 'Click Login', TypeInto"
        );
        assert_eq!(issues[0].line, Some(9));
    }

    #[test]
    fn test_selector_and_import() {
        let body = r#"<TextExpression.NamespacesForImplementation>
<x:String>UiPath.UIAutomationNext.Activities</x:String>
</TextExpression.NamespacesForImplementation>
<ui:Custom Selector="&lt;wnd app='notepad.exe' /&gt;" />"#;
        let issues = run(validate_ui_automation, &workflow(body));
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.starts_with("UI selectors"));
        assert!(issues[1].message.contains("UIAutomationNext"));
    }
}
