use crate::markup::{body, label};
use crate::rule_ids::INVOKE_CODE;
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use parser::decode_entities;
use regex::Regex;
use std::collections::HashMap;
use utils::text::{line_of, truncate_list};

/// Members that are safe to call on any object
const SAFE_MEMBERS: &[&str] = &["GetType"];

lazy_static! {
    static ref VB_OBJECT_DECLARATION: Regex = Regex::new(r"(?i)\bDim\s+(\w+)\s+As\s+Object\b")
        .expect("Failed to compile VB object declaration regex");
    static ref CSHARP_OBJECT_DECLARATION: Regex = Regex::new(r"\bobject\s+(\w+)\s*[=;]")
        .expect("Failed to compile C# object declaration regex");
    static ref TYPED_DECLARATION: Regex = Regex::new(r"(?i)\bDim\s+(\w+)\s+As\s+(?:New\s+)?([\w.]+)")
        .expect("Failed to compile typed declaration regex");
    static ref COM_ASSIGNMENT: Regex = Regex::new(
        r"(?im)(?:^|[^\w.])(\w+)\s*=\s*(?:CreateObject|GetObject|(?:Marshal\.)?GetActiveObject|Activator\.CreateInstance)\s*\("
    )
    .expect("Failed to compile COM assignment regex");
    static ref WITH_MEMBER: Regex = Regex::new(r"(?m)(?:^|[\s(=,&+])\.([A-Za-z_]\w*)")
        .expect("Failed to compile With member regex");
}

/// Variables bound late: declared as Object or assigned a COM object
/// without an early-bound declared type.
fn late_bound_variables(code: &str) -> Vec<String> {
    let declared_types: HashMap<String, String> = TYPED_DECLARATION
        .captures_iter(code)
        .map(|caps| (caps[1].to_ascii_lowercase(), caps[2].to_ascii_lowercase()))
        .collect();

    let mut variables: Vec<String> = Vec::new();
    let mut add = |name: &str| {
        if !variables.iter().any(|v| v.eq_ignore_ascii_case(name)) {
            variables.push(name.to_string());
        }
    };

    for caps in VB_OBJECT_DECLARATION
        .captures_iter(code)
        .chain(CSHARP_OBJECT_DECLARATION.captures_iter(code))
    {
        add(&caps[1]);
    }

    for caps in COM_ASSIGNMENT.captures_iter(code) {
        let name = &caps[1];
        if name.eq_ignore_ascii_case("object") {
            continue;
        }
        let early_bound = declared_types
            .get(&name.to_ascii_lowercase())
            .is_some_and(|t| t != "object");
        if !early_bound {
            add(name);
        }
    }

    variables
}

/// Member accesses on late-bound variables, as `variable.Member`
fn late_bound_members(code: &str) -> Vec<String> {
    let mut members: Vec<String> = Vec::new();
    let mut add = |variable: &str, member: &str| {
        if SAFE_MEMBERS.iter().any(|m| m.eq_ignore_ascii_case(member)) {
            return;
        }
        let access = format!("{}.{}", variable, member);
        if !members.contains(&access) {
            members.push(access);
        }
    };

    for variable in late_bound_variables(code) {
        let escaped = regex::escape(&variable);

        if let Ok(direct) = Regex::new(&format!(r"(?i)(?:^|[^\w.]){}\.([A-Za-z_]\w*)", escaped)) {
            for caps in direct.captures_iter(code) {
                add(&variable, &caps[1]);
            }
        }

        let (Ok(with_start), Ok(with_end)) = (
            Regex::new(&format!(r"(?im)^\s*With\s+{}\s*$", escaped)),
            Regex::new(r"(?im)^\s*End\s+With\b"),
        ) else {
            continue;
        };
        for start in with_start.find_iter(code) {
            let rest = &code[start.end()..];
            let block = match with_end.find(rest) {
                Some(end) => &rest[..end.start()],
                None => rest,
            };
            for caps in WITH_MEMBER.captures_iter(block) {
                add(&variable, &caps[1]);
            }
        }
    }

    members
}

/// InvokeCode bodies must not call members on late-bound COM objects.
pub fn validate_invoke_code(doc: &Document<'_>, result: &mut ValidationResult) {
    let text = doc.text;

    for (index, element) in doc
        .elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.local_name() == "InvokeCode")
    {
        let mut code = element.attr("Code").map(decode_entities).unwrap_or_default();
        for child in doc
            .elements
            .iter()
            .filter(|e| e.parent == Some(index) && e.local_name() == "InvokeCode.Code")
        {
            if let Some(content) = body(text, child) {
                code.push('\n');
                code.push_str(&decode_entities(content));
            }
        }

        let members = late_bound_members(&code);
        if members.is_empty() {
            continue;
        }

        let name = label(text, element.start, "InvokeCode");
        result.add_issue(
            ValidationIssue::error(
                INVOKE_CODE,
                format!(
                    "{} uses late-bound member access on Object variables: {}",
                    name,
                    truncate_list(&members, 3)
                ),
            )
            .with_line(line_of(text, element.start))
            .with_element(name),
        );
    }
}
