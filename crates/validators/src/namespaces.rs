use crate::markup::attributes;
use crate::rule_ids::{NAMESPACE_REQUIREMENTS, NAMESPACE_USAGE, REQUIRED_NAMESPACES};
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use regex::Regex;
use std::collections::BTreeMap;
use utils::text::{line_of, truncate_list};

/// Prefixes every workflow must declare, in reporting order
const REQUIRED_PREFIXES: &[&str] = &["", "x", "mc", "sap", "sap2010"];

/// Prefixes that are never looked up in the declarations
const RESERVED_PREFIXES: &[&str] = &["xmlns", "xml"];

/// Content marker that needs a particular prefix bound to a particular URI
struct NamespaceRequirement {
    pattern: &'static str,
    prefix: &'static str,
    uri: &'static str,
    usage: &'static str,
}

const REQUIREMENTS: &[NamespaceRequirement] = &[
    NamespaceRequirement {
        pattern: r"<ui:[A-Za-z_]",
        prefix: "ui",
        uri: "http://schemas.uipath.com/workflow/activities",
        usage: "UiPath core activities",
    },
    NamespaceRequirement {
        pattern: r"<uix:[A-Za-z_]",
        prefix: "uix",
        uri: "http://schemas.uipath.com/workflow/activities/uix",
        usage: "modern UI automation activities",
    },
    NamespaceRequirement {
        pattern: r"<ueab:[A-Za-z_]",
        prefix: "ueab",
        uri: "clr-namespace:UiPath.Excel.Activities.Business;assembly=UiPath.Excel.Activities",
        usage: "modern Excel activities",
    },
    NamespaceRequirement {
        pattern: r"<ue:[A-Za-z_]",
        prefix: "ue",
        uri: "clr-namespace:UiPath.Excel;assembly=UiPath.Excel.Activities",
        usage: "Excel types",
    },
    NamespaceRequirement {
        pattern: r"\bsap:(?:VirtualizedContainerService|WorkflowViewStateService)\.",
        prefix: "sap",
        uri: "http://schemas.microsoft.com/netfx/2009/xaml/activities/presentation",
        usage: "designer view state",
    },
    NamespaceRequirement {
        pattern: r"\bsap2010:(?:WorkflowViewState|Annotation|ExpressionActivityEditor)\.",
        prefix: "sap2010",
        uri: "http://schemas.microsoft.com/netfx/2010/xaml/activities/presentation",
        usage: "designer view state",
    },
    NamespaceRequirement {
        pattern: r"\bmc:Ignorable\b",
        prefix: "mc",
        uri: "http://schemas.openxmlformats.org/markup-compatibility/2006",
        usage: "markup compatibility",
    },
    NamespaceRequirement {
        pattern: r"\bmva:VisualBasic\b",
        prefix: "mva",
        uri: "clr-namespace:Microsoft.VisualBasic.Activities;assembly=System.Activities",
        usage: "Visual Basic settings",
    },
    NamespaceRequirement {
        pattern: r"\bx:(?:Class|Members|Property|TypeArguments|Name|String|Reference)\b",
        prefix: "x",
        uri: "http://schemas.microsoft.com/winfx/2006/xaml",
        usage: "XAML language constructs",
    },
    NamespaceRequirement {
        pattern: r"\bscg:(?:List|Dictionary|IEnumerable|KeyValuePair)\b",
        prefix: "scg",
        uri: "clr-namespace:System.Collections.Generic;assembly=System.Private.CoreLib",
        usage: "generic collection types",
    },
    NamespaceRequirement {
        pattern: r"\bsd:Data(?:Table|Row|Column|View)\b",
        prefix: "sd",
        uri: "clr-namespace:System.Data;assembly=System.Data.Common",
        usage: "data table types",
    },
];

lazy_static! {
    static ref TAG_PREFIX: Regex = Regex::new(r"</?([A-Za-z_][\w\-]*):[A-Za-z_]")
        .expect("Failed to compile tag prefix regex");
    static ref ATTRIBUTE_PREFIX: Regex = Regex::new(r"\s([A-Za-z_][\w\-]*):[A-Za-z_][\w.\-]*\s*=\s*[\x22']")
        .expect("Failed to compile attribute prefix regex");
    static ref TYPE_VALUE: Regex = Regex::new(r#"\s(?:Type|[A-Za-z_][\w\-]*:TypeArguments)\s*=\s*"([^"]*)""#)
        .expect("Failed to compile type value regex");
    static ref MARKUP_EXTENSION: Regex = Regex::new(r"\{([A-Za-z_][\w\-]*):[A-Za-z_]")
        .expect("Failed to compile markup extension regex");
    static ref QUALIFIED_NAME: Regex = Regex::new(r"(?:^|[^\w\-])([A-Za-z_][\w\-]*):[A-Za-z_]")
        .expect("Failed to compile qualified name regex");
    static ref REQUIREMENT_PATTERNS: Vec<(Regex, &'static NamespaceRequirement)> = REQUIREMENTS
        .iter()
        .map(|req| {
            (
                Regex::new(req.pattern).expect("Failed to compile namespace requirement regex"),
                req,
            )
        })
        .collect();
}

fn display_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        "(default)"
    } else {
        prefix
    }
}

/// Every workflow must declare the default, x, mc, sap and sap2010
/// namespaces. With a registry, declared URIs are also compared against it.
pub fn validate_required_namespaces(doc: &Document<'_>, result: &mut ValidationResult) {
    let missing: Vec<&str> = REQUIRED_PREFIXES
        .iter()
        .filter(|prefix| !doc.namespaces.contains_key(**prefix))
        .map(|prefix| display_prefix(prefix))
        .collect();

    if !missing.is_empty() {
        result.add_issue(ValidationIssue::error(
            REQUIRED_NAMESPACES,
            format!(
                "Missing required namespace declarations: {}",
                missing.join(", ")
            ),
        ));
    }

    if let Some(registry) = doc.registry {
        let drift: Vec<String> = doc
            .namespaces
            .iter()
            .filter_map(|(prefix, uri)| {
                let expected = registry.expected_uri(prefix)?;
                (expected != uri).then(|| {
                    format!(
                        "{} is '{}', registry expects '{}'",
                        display_prefix(prefix),
                        uri,
                        expected
                    )
                })
            })
            .collect();

        if !drift.is_empty() {
            result.add_issue(ValidationIssue::warning(
                REQUIRED_NAMESPACES,
                format!(
                    "Namespace URIs differ from the registry: {}",
                    truncate_list(&drift, 5)
                ),
            ));
        }
    }
}

/// Prefixes used in tag names, attribute names and type strings, with the
/// offset of their first use.
fn used_prefixes(text: &str) -> BTreeMap<String, usize> {
    let mut used: BTreeMap<String, usize> = BTreeMap::new();
    let mut record = |prefix: &str, offset: usize| {
        if RESERVED_PREFIXES.contains(&prefix) {
            return;
        }
        let entry = used.entry(prefix.to_string()).or_insert(offset);
        if offset < *entry {
            *entry = offset;
        }
    };

    for regex in [&*TAG_PREFIX, &*ATTRIBUTE_PREFIX] {
        for caps in regex.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                record(m.as_str(), m.start());
            }
        }
    }

    // Markup extensions only live in attribute values opening with `{`;
    // `{}` escapes a literal brace.
    for attr in attributes(text) {
        let value = attr.value.trim_start();
        if !value.starts_with('{') || value.starts_with("{}") {
            continue;
        }
        let lead = attr.value.len() - value.len();
        for caps in MARKUP_EXTENSION.captures_iter(value) {
            if let Some(m) = caps.get(1) {
                record(m.as_str(), attr.offset + lead + m.start());
            }
        }
    }

    for caps in TYPE_VALUE.captures_iter(text) {
        if let Some(value) = caps.get(1) {
            for inner in QUALIFIED_NAME.captures_iter(value.as_str()) {
                if let Some(m) = inner.get(1) {
                    record(m.as_str(), value.start() + m.start());
                }
            }
        }
    }

    used
}

/// Every prefix used in the document must be declared.
pub fn validate_namespace_usage(doc: &Document<'_>, result: &mut ValidationResult) {
    let undeclared: Vec<(String, usize)> = used_prefixes(doc.text)
        .into_iter()
        .filter(|(prefix, _)| !doc.namespaces.contains_key(prefix))
        .collect();

    if undeclared.is_empty() {
        return;
    }

    let names: Vec<&str> = undeclared.iter().map(|(p, _)| p.as_str()).collect();
    let first = undeclared.iter().map(|(_, offset)| *offset).min().unwrap_or(0);
    result.add_issue(
        ValidationIssue::error(
            NAMESPACE_USAGE,
            format!("Undeclared namespace prefixes: {}", truncate_list(&names, 5)),
        )
        .with_line(line_of(doc.text, first)),
    );
}

/// Content that needs a specific namespace must find that prefix declared
/// with the canonical URI.
pub fn validate_namespace_requirements(doc: &Document<'_>, result: &mut ValidationResult) {
    for (regex, req) in REQUIREMENT_PATTERNS.iter() {
        let Some(found) = regex.find(doc.text) else {
            continue;
        };
        let line = line_of(doc.text, found.start());

        match doc.namespaces.get(req.prefix) {
            None => result.add_issue(
                ValidationIssue::warning(
                    NAMESPACE_REQUIREMENTS,
                    format!(
                        "Document uses {} but prefix '{}' is not declared (expected '{}')",
                        req.usage, req.prefix, req.uri
                    ),
                )
                .with_line(line),
            ),
            Some(uri) if uri != req.uri => result.add_issue(
                ValidationIssue::warning(
                    NAMESPACE_REQUIREMENTS,
                    format!(
                        "Prefix '{}' is bound to '{}', expected '{}' for {}",
                        req.prefix, uri, req.uri, req.usage
                    ),
                )
                .with_line(line),
            ),
            Some(_) => {}
        }
    }
}
