use crate::markup::{attributes, label, open_tag, open_tags};
use crate::rule_ids::{ACTIVITY_SPECIFIC, EXCEL_SCOPING};
use crate::Document;
use models::{ValidationIssue, ValidationResult};
use parser::outline::ancestors;
use utils::text::{line_of, truncate_list, window};

/// Mandatory members of an activity. A member is satisfied by an attribute
/// on the opening tag or by an `Activity.Member` property element within
/// `window` bytes of the opening tag. `a|b` accepts either spelling.
struct ActivityRequirement {
    activity: &'static str,
    required: &'static [&'static str],
    window: usize,
}

const fn requirement(
    activity: &'static str,
    required: &'static [&'static str],
    window: usize,
) -> ActivityRequirement {
    ActivityRequirement {
        activity,
        required,
        window,
    }
}

const ACTIVITY_REQUIREMENTS: &[ActivityRequirement] = &[
    // Core workflow activities
    requirement("LogMessage", &["Level", "Message"], 300),
    requirement("Assign", &["To", "Value"], 800),
    requirement("If", &["Condition"], 600),
    requirement("While", &["Condition"], 800),
    requirement("DoWhile", &["Condition"], 1500),
    requirement("Delay", &["Duration"], 300),
    requirement("Throw", &["Exception"], 400),
    requirement("Switch", &["Expression"], 800),
    requirement("TryCatch", &["Try"], 1500),
    requirement("InvokeWorkflowFile", &["WorkflowFileName"], 1000),
    requirement("InvokeCode", &["Code"], 1200),
    requirement("ForEach", &["Values", "Body"], 1500),
    requirement("ForEachRow", &["DataTable", "Body"], 1500),
    requirement("RetryScope", &["ActivityBody"], 1500),
    // Excel
    requirement("ExcelApplicationCard", &["WorkbookPath", "Body"], 1500),
    requirement("ExcelProcessScopeX", &["Body"], 1500),
    requirement("ReadRangeX", &["Range", "SaveTo"], 400),
    requirement("WriteCellX", &["Cell", "Value"], 400),
    requirement("WriteRangeX", &["Destination", "Source"], 400),
    requirement("SaveExcelFileX", &["Workbook"], 300),
    requirement("CopyPasteRangeX", &["SourceRange", "DestinationRange"], 400),
    requirement("ClearRangeX", &["TargetRange"], 300),
    requirement("FilterX", &["Range", "ColumnName"], 400),
    requirement("FindFirstLastDataRowX", &["Range"], 400),
    // Files and system
    requirement("ReadTextFile", &["FileName|File", "Content"], 500),
    requirement("CreateDirectory", &["Path"], 300),
    requirement("MoveFile", &["Path", "Destination"], 400),
    requirement("DeleteFileX", &["Path"], 300),
    requirement("PathExists", &["Path", "Exists"], 400),
    requirement("KillProcess", &["ProcessName|Process"], 400),
    requirement("SetToClipboard", &["Text"], 300),
    requirement("InputDialog", &["Result"], 800),
    // Data tables
    requirement("AddDataRow", &["DataTable"], 400),
    requirement("BuildDataTable", &["DataTable", "TableInfo"], 1500),
];

/// Excel activities that only run inside an ExcelApplicationCard
const EXCEL_SCOPED_ACTIVITIES: &[&str] = &[
    "AutoFillRangeX",
    "ClearRangeX",
    "CopyPasteRangeX",
    "DeleteRowsX",
    "FilterX",
    "FindFirstLastDataRowX",
    "FormatRangeX",
    "GetSelectedRangeX",
    "InsertRowsX",
    "LookupRangeX",
    "ReadRangeX",
    "SaveExcelFileX",
    "WriteCellX",
    "WriteRangeX",
];

const EXCEL_SCOPE: &str = "ExcelApplicationCard";

fn is_satisfied(tag_attributes: &[&str], nearby: &str, activity: &str, member: &str) -> bool {
    member.split('|').any(|name| {
        tag_attributes.contains(&name) || nearby.contains(&format!("{}.{}", activity, name))
    })
}

fn primary_name(member: &'static str) -> &'static str {
    member.split('|').next().unwrap_or(member)
}

/// Activities must set their mandatory members.
pub fn validate_activity_requirements(doc: &Document<'_>, result: &mut ValidationResult) {
    let text = doc.text;

    for tag in open_tags(text) {
        let Some(req) = ACTIVITY_REQUIREMENTS
            .iter()
            .find(|req| req.activity == tag.local)
        else {
            continue;
        };

        let tag_text = open_tag(text, tag.start);
        let tag_attributes: Vec<&str> = attributes(tag_text).map(|attr| attr.name).collect();
        let nearby = window(text, tag.start, req.window.max(tag_text.len()));
        let name = label(text, tag.start, tag.local);
        let line = line_of(text, tag.start);

        if req.activity == "LogMessage" && nearby.contains("LogMessage.Message>") {
            result.add_issue(
                ValidationIssue::warning(
                    ACTIVITY_SPECIFIC,
                    format!(
                        "{} sets Message with element syntax; set the Message attribute instead, the wrapped argument is not assignable to the expected type",
                        name
                    ),
                )
                .with_line(line)
                .with_element(name.clone()),
            );
        }

        let missing: Vec<&str> = req
            .required
            .iter()
            .copied()
            .filter(|member| !is_satisfied(&tag_attributes, nearby, req.activity, member))
            .map(primary_name)
            .collect();

        if !missing.is_empty() {
            result.add_issue(
                ValidationIssue::warning(
                    ACTIVITY_SPECIFIC,
                    format!("{} is missing required {}", name, missing.join(", ")),
                )
                .with_line(line)
                .with_element(name),
            );
        }
    }
}

pub(crate) fn has_scoped_excel_activity(text: &str) -> bool {
    open_tags(text).any(|tag| EXCEL_SCOPED_ACTIVITIES.contains(&tag.local))
}

/// Modern Excel activities must sit inside an ExcelApplicationCard.
pub fn validate_excel_scoping(doc: &Document<'_>, result: &mut ValidationResult) {
    let elements = &doc.elements;
    let mut unscoped: Vec<String> = Vec::new();
    let mut first: Option<usize> = None;

    for (index, element) in elements.iter().enumerate() {
        if !EXCEL_SCOPED_ACTIVITIES.contains(&element.local_name()) {
            continue;
        }
        if ancestors(elements, index).any(|a| a.local_name() == EXCEL_SCOPE) {
            continue;
        }
        unscoped.push(label(doc.text, element.start, element.local_name()));
        first.get_or_insert(element.start);
    }

    if unscoped.is_empty() {
        return;
    }

    let mut issue = ValidationIssue::error(
        EXCEL_SCOPING,
        format!(
            "Excel activities outside an {}: {}",
            EXCEL_SCOPE,
            truncate_list(&unscoped, 5)
        ),
    );
    if let Some(offset) = first {
        issue = issue.with_line(line_of(doc.text, offset));
    }
    result.add_issue(issue);
}
