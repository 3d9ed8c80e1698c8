use crate::markup::{body, label};
use crate::rule_ids::{FLOWCHART_STRUCTURE, FLOWCHART_VIEWSTATE};
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use parser::outline::ancestors;
use parser::Element;
use regex::Regex;
use std::collections::BTreeSet;
use utils::text::{line_of, truncate_list};

const FLOW_NODES: &[&str] = &["FlowStep", "FlowDecision", "FlowSwitch"];

/// Parents under which a node is declared rather than linked
const NODE_LISTS: &[&str] = &["Flowchart", "Flowchart.Nodes"];

lazy_static! {
    static ref REFERENCE_EXTENSION: Regex = Regex::new(r"\{x:Reference\s+([^}\s]+)\s*\}")
        .expect("Failed to compile x:Reference extension regex");
}

fn is_flow_node(element: &Element) -> bool {
    FLOW_NODES.contains(&element.local_name())
}

fn parent_local<'a>(elements: &'a [Element], element: &Element) -> Option<&'a str> {
    element
        .parent
        .and_then(|p| elements.get(p))
        .map(|p| p.local_name())
}

/// Flowcharts with nodes need designer shape information.
pub fn validate_flowchart_viewstate(doc: &Document<'_>, result: &mut ValidationResult) {
    if !doc.elements.iter().any(is_flow_node) {
        return;
    }

    let missing: Vec<&str> = ["ShapeLocation", "ShapeSize"]
        .into_iter()
        .filter(|marker| !doc.text.contains(marker))
        .collect();

    if !missing.is_empty() {
        result.add_issue(ValidationIssue::warning(
            FLOWCHART_VIEWSTATE,
            format!(
                "Flowchart nodes lack view state: missing {}",
                missing.join(", ")
            ),
        ));
    }
}

/// References in the document, split into links between nodes and entries
/// of a flowchart's node list.
struct References {
    all: Vec<(String, usize)>,
    links: BTreeSet<String>,
}

fn collect_references(doc: &Document<'_>) -> References {
    let mut all = Vec::new();
    let mut links = BTreeSet::new();

    for element in doc.elements.iter().filter(|e| e.name == "x:Reference") {
        let Some(target) = body(doc.text, element).map(str::trim) else {
            continue;
        };
        if target.is_empty() {
            continue;
        }
        all.push((target.to_string(), element.start));
        if !parent_local(&doc.elements, element).is_some_and(|p| NODE_LISTS.contains(&p)) {
            links.insert(target.to_string());
        }
    }

    for caps in REFERENCE_EXTENSION.captures_iter(doc.text) {
        if let Some(m) = caps.get(1) {
            all.push((m.as_str().to_string(), m.start()));
            links.insert(m.as_str().to_string());
        }
    }

    References { all, links }
}

/// Structural soundness of flowcharts: a start node, named and reachable
/// nodes, resolvable references and decisions with a true branch.
pub fn validate_flowchart_structure(doc: &Document<'_>, result: &mut ValidationResult) {
    let text = doc.text;
    let elements = &doc.elements;

    for (index, flowchart) in elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.local_name() == "Flowchart")
    {
        let has_start = flowchart.attr("StartNode").is_some()
            || elements
                .iter()
                .any(|e| e.parent == Some(index) && e.local_name() == "Flowchart.StartNode");
        if !has_start {
            result.add_issue(
                ValidationIssue::warning(
                    FLOWCHART_STRUCTURE,
                    format!("{} has no start node", label(text, flowchart.start, "Flowchart")),
                )
                .with_line(line_of(text, flowchart.start)),
            );
        }
    }

    let unnamed: Vec<&Element> = elements
        .iter()
        .filter(|e| e.local_name() == "FlowStep" && e.attr("x:Name").is_none())
        .collect();
    if let Some(first) = unnamed.first() {
        result.add_issue(
            ValidationIssue::warning(
                FLOWCHART_STRUCTURE,
                format!("{} FlowStep node(s) have no x:Name", unnamed.len()),
            )
            .with_line(line_of(text, first.start)),
        );
    }

    let names: BTreeSet<&str> = elements.iter().filter_map(|e| e.attr("x:Name")).collect();
    let references = collect_references(doc);

    let mut dangling: Vec<&str> = Vec::new();
    let mut dangling_line = None;
    for (target, offset) in &references.all {
        if !names.contains(target.as_str()) && !dangling.contains(&target.as_str()) {
            dangling.push(target);
            dangling_line.get_or_insert(line_of(text, *offset));
        }
    }
    if !dangling.is_empty() {
        let mut issue = ValidationIssue::warning(
            FLOWCHART_STRUCTURE,
            format!(
                "Unresolved x:Reference targets: {}",
                truncate_list(&dangling, 5)
            ),
        );
        if let Some(line) = dangling_line {
            issue = issue.with_line(line);
        }
        result.add_issue(issue);
    }

    let mut no_true_branch: Vec<String> = Vec::new();
    for (index, decision) in elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.local_name() == "FlowDecision")
    {
        let has_true = decision.attr("True").is_some()
            || elements
                .iter()
                .any(|e| e.parent == Some(index) && e.local_name() == "FlowDecision.True");
        if !has_true {
            no_true_branch.push(label(text, decision.start, "FlowDecision"));
        }
    }
    if !no_true_branch.is_empty() {
        result.add_issue(ValidationIssue::warning(
            FLOWCHART_STRUCTURE,
            format!(
                "FlowDecision without a True branch: {}",
                truncate_list(&no_true_branch, 5)
            ),
        ));
    }

    let mut misplaced: Vec<String> = Vec::new();
    let mut orphans: Vec<&str> = Vec::new();
    for (index, node) in elements.iter().enumerate().filter(|(_, e)| is_flow_node(e)) {
        if !ancestors(elements, index).any(|a| a.local_name() == "Flowchart") {
            misplaced.push(label(text, node.start, node.local_name()));
            continue;
        }

        let declared_in_list =
            parent_local(elements, node).is_some_and(|p| NODE_LISTS.contains(&p));
        if let Some(name) = node.attr("x:Name") {
            if declared_in_list && !references.links.contains(name) {
                orphans.push(name);
            }
        }
    }

    if !misplaced.is_empty() {
        result.add_issue(ValidationIssue::warning(
            FLOWCHART_STRUCTURE,
            format!(
                "Flow nodes outside a Flowchart: {}",
                truncate_list(&misplaced, 5)
            ),
        ));
    }

    if !orphans.is_empty() {
        result.add_issue(ValidationIssue::warning(
            FLOWCHART_STRUCTURE,
            format!(
                "Flow nodes never linked from the start node or another node: {}",
                truncate_list(&orphans, 5)
            ),
        ));
    }
}
