// validators crate

mod activities;
mod arguments;
mod containers;
mod encoding;
mod flowchart;
mod idref;
mod invoke_code;
mod language;
mod markup;
mod namespaces;
mod secrets;
mod standards;
mod types;
mod ui_automation;

use models::{NamespaceMap, NamespaceRegistry, ProjectContext, ValidationResult};
use parser::Element;

pub use activities::{validate_activity_requirements, validate_excel_scoping};
pub use arguments::validate_arguments;
pub use containers::validate_primary_container;
pub use encoding::{validate_double_encoding, validate_expression_encoding};
pub use flowchart::{validate_flowchart_structure, validate_flowchart_viewstate};
pub use idref::{validate_idref_declarations, validate_idref_uniqueness};
pub use invoke_code::validate_invoke_code;
pub use language::validate_expression_language;
pub use namespaces::{
    validate_namespace_requirements, validate_namespace_usage, validate_required_namespaces,
};
pub use secrets::validate_secrets;
pub use standards::validate_standards;
pub use types::validate_type_system;
pub use ui_automation::validate_ui_automation;

/// Compliance keys, one per rule
pub mod rule_ids {
    pub const WELL_FORMED: &str = "Layer1-XML";
    pub const INPUT: &str = "Input";
    pub const PRIMARY_CONTAINER: &str = "HR-1";
    pub const REQUIRED_NAMESPACES: &str = "HR-2";
    pub const NAMESPACE_USAGE: &str = "HR-3";
    pub const ARGUMENTS: &str = "HR-4";
    pub const IDREF_UNIQUE: &str = "HR-5";
    pub const IDREF_DECLARATION: &str = "HR-6";
    pub const EXPRESSION_ENCODING: &str = "HR-7";
    pub const DOUBLE_ENCODING: &str = "HR-8";
    pub const UI_AUTOMATION: &str = "HR-9";
    pub const FLOWCHART_VIEWSTATE: &str = "HR-10";
    pub const INVOKE_CODE: &str = "HR-11";
    pub const SECRETS: &str = "Security-Secrets";
    pub const TYPE_SYSTEM: &str = "TypeSystem";
    pub const EXPRESSION_LANGUAGE: &str = "ExpressionLanguage";
    pub const FLOWCHART_STRUCTURE: &str = "FlowchartStructure";
    pub const NAMESPACE_REQUIREMENTS: &str = "NamespaceRequirements";
    pub const ACTIVITY_SPECIFIC: &str = "ActivitySpecific";
    pub const EXCEL_SCOPING: &str = "ExcelScoping";
    pub const STANDARDS: &str = "Standards";
}

/// Everything a rule may look at. Rules only read from it.
pub struct Document<'a> {
    pub text: &'a str,
    pub file_name: &'a str,
    pub namespaces: &'a NamespaceMap,
    pub context: &'a ProjectContext,
    pub registry: Option<&'a NamespaceRegistry>,
    pub elements: Vec<Element>,
}

impl<'a> Document<'a> {
    pub fn new(
        text: &'a str,
        file_name: &'a str,
        namespaces: &'a NamespaceMap,
        context: &'a ProjectContext,
        registry: Option<&'a NamespaceRegistry>,
    ) -> Self {
        Document {
            text,
            file_name,
            namespaces,
            context,
            registry,
            elements: parser::outline(text),
        }
    }

    /// Whether an element with this local name (any prefix) occurs
    pub fn has_activity(&self, local: &str) -> bool {
        markup::open_tags(self.text).any(|tag| tag.local == local)
    }
}

pub type CheckFn = fn(&Document<'_>, &mut ValidationResult);
pub type AppliesFn = fn(&Document<'_>) -> bool;

/// One entry of the rule pipeline
pub struct RuleDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub applies: AppliesFn,
    pub check: CheckFn,
}

fn always(_: &Document<'_>) -> bool {
    true
}

fn has_idref(doc: &Document<'_>) -> bool {
    idref::has_idref(doc.text)
}

fn has_flowchart(doc: &Document<'_>) -> bool {
    doc.has_activity("Flowchart")
}

fn has_invoke_code(doc: &Document<'_>) -> bool {
    doc.has_activity("InvokeCode")
}

fn has_known_language(doc: &Document<'_>) -> bool {
    doc.context.is_known()
}

fn has_scoped_excel_activity(doc: &Document<'_>) -> bool {
    activities::has_scoped_excel_activity(doc.text)
}

/// Rules after the well-formedness gate, in execution order
pub static RULES: &[RuleDescriptor] = &[
    RuleDescriptor {
        id: rule_ids::REQUIRED_NAMESPACES,
        name: "Required namespaces",
        applies: always,
        check: validate_required_namespaces,
    },
    RuleDescriptor {
        id: rule_ids::NAMESPACE_USAGE,
        name: "Namespace usage",
        applies: always,
        check: validate_namespace_usage,
    },
    RuleDescriptor {
        id: rule_ids::PRIMARY_CONTAINER,
        name: "Primary container",
        applies: always,
        check: validate_primary_container,
    },
    RuleDescriptor {
        id: rule_ids::ARGUMENTS,
        name: "Arguments and variables",
        applies: always,
        check: validate_arguments,
    },
    RuleDescriptor {
        id: rule_ids::IDREF_UNIQUE,
        name: "IdRef uniqueness",
        applies: has_idref,
        check: validate_idref_uniqueness,
    },
    RuleDescriptor {
        id: rule_ids::IDREF_DECLARATION,
        name: "IdRef declaration form",
        applies: has_idref,
        check: validate_idref_declarations,
    },
    RuleDescriptor {
        id: rule_ids::EXPRESSION_ENCODING,
        name: "Expression encoding",
        applies: always,
        check: validate_expression_encoding,
    },
    RuleDescriptor {
        id: rule_ids::DOUBLE_ENCODING,
        name: "Double encoding",
        applies: always,
        check: validate_double_encoding,
    },
    RuleDescriptor {
        id: rule_ids::UI_AUTOMATION,
        name: "UI automation prohibition",
        applies: always,
        check: validate_ui_automation,
    },
    RuleDescriptor {
        id: rule_ids::FLOWCHART_VIEWSTATE,
        name: "Flowchart viewstate",
        applies: has_flowchart,
        check: validate_flowchart_viewstate,
    },
    RuleDescriptor {
        id: rule_ids::INVOKE_CODE,
        name: "InvokeCode late binding",
        applies: has_invoke_code,
        check: validate_invoke_code,
    },
    RuleDescriptor {
        id: rule_ids::SECRETS,
        name: "Secrets detection",
        applies: always,
        check: validate_secrets,
    },
    RuleDescriptor {
        id: rule_ids::TYPE_SYSTEM,
        name: "Type system",
        applies: always,
        check: validate_type_system,
    },
    RuleDescriptor {
        id: rule_ids::EXPRESSION_LANGUAGE,
        name: "Expression language",
        applies: has_known_language,
        check: validate_expression_language,
    },
    RuleDescriptor {
        id: rule_ids::FLOWCHART_STRUCTURE,
        name: "Flowchart structure",
        applies: has_flowchart,
        check: validate_flowchart_structure,
    },
    RuleDescriptor {
        id: rule_ids::NAMESPACE_REQUIREMENTS,
        name: "Namespace requirements",
        applies: always,
        check: validate_namespace_requirements,
    },
    RuleDescriptor {
        id: rule_ids::ACTIVITY_SPECIFIC,
        name: "Activity completeness",
        applies: always,
        check: validate_activity_requirements,
    },
    RuleDescriptor {
        id: rule_ids::EXCEL_SCOPING,
        name: "Excel scoping",
        applies: has_scoped_excel_activity,
        check: validate_excel_scoping,
    },
    RuleDescriptor {
        id: rule_ids::STANDARDS,
        name: "Standards",
        applies: always,
        check: validate_standards,
    },
];

/// Human readable name for a compliance key
pub fn rule_name(id: &str) -> &'static str {
    match id {
        rule_ids::WELL_FORMED => "Well-formed XML",
        rule_ids::INPUT => "Readable input",
        _ => RULES
            .iter()
            .find(|rule| rule.id == id)
            .map(|rule| rule.name)
            .unwrap_or("Unknown rule"),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use models::ValidationIssue;

    pub const HEADER: &str = r#"<Activity mc:Ignorable="sap sap2010" x:Class="Main"
 xmlns="http://schemas.microsoft.com/netfx/2009/xaml/activities"
 xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"
 xmlns:sap="http://schemas.microsoft.com/netfx/2009/xaml/activities/presentation"
 xmlns:sap2010="http://schemas.microsoft.com/netfx/2010/xaml/activities/presentation"
 xmlns:ui="http://schemas.uipath.com/workflow/activities"
 xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml">"#;

    /// Wrap a body in a root element with the usual declarations
    pub fn workflow(body: &str) -> String {
        format!("{}\n{}\n</Activity>", HEADER, body)
    }

    pub fn run_with(
        check: CheckFn,
        text: &str,
        file_name: &str,
        context: &ProjectContext,
        registry: Option<&NamespaceRegistry>,
    ) -> Vec<ValidationIssue> {
        let namespaces = parser::extract_namespaces(text);
        let doc = Document::new(text, file_name, &namespaces, context, registry);
        let mut result = ValidationResult::new(file_name);
        check(&doc, &mut result);
        result.issues
    }

    pub fn run(check: CheckFn, text: &str) -> Vec<ValidationIssue> {
        run_with(check, text, "Main.xaml", &ProjectContext::unknown(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_ids_are_unique() {
        let mut ids: Vec<&str> = RULES.iter().map(|rule| rule.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), RULES.len());
    }

    #[test]
    fn test_rule_name_lookup() {
        assert_eq!(rule_name(rule_ids::IDREF_UNIQUE), "IdRef uniqueness");
        assert_eq!(rule_name(rule_ids::WELL_FORMED), "Well-formed XML");
        assert_eq!(rule_name("nope"), "Unknown rule");
    }
}
