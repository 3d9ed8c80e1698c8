use std::fs;
use std::path::{Path, PathBuf};

use models::{ComplianceStatus, NamespaceRegistry, ProjectContext, ValidationIssue, ValidationResult};
use thiserror::Error;
use validators::rule_ids::{INPUT, WELL_FORMED};
use validators::{Document, RULES};

/// Optional inputs that apply to every document of a run
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    /// Project metadata file overriding the upward `project.json` search
    pub project_meta: Option<PathBuf>,
    pub namespace_registry: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Path does not exist: {0}")]
    NotFound(String),

    #[error("Path is neither a file nor a directory: {0}")]
    NotAFileOrDirectory(String),

    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),
}

/// Result reporting a document that could not be validated at all
pub fn input_failure(file_path: &str, error: &InputError) -> ValidationResult {
    logging::error(&format!("{}: {}", file_path, error));
    let mut result = ValidationResult::new(file_path);
    result.add_issue(ValidationIssue::error(INPUT, error.to_string()));
    result.set_status(INPUT, ComplianceStatus::Fail);
    result
}

pub fn evaluate_workflow_file(path: &Path, options: &EvaluateOptions) -> ValidationResult {
    let file_path = path.display().to_string();
    logging::debug(&format!("Validating {}", file_path));

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return input_failure(&file_path, &InputError::Read(e)),
    };
    let text = strip_bom(&content);

    let mut result = ValidationResult::new(&file_path);
    if !check_structure(text, &mut result) {
        return result;
    }

    let context = context::resolve_project_context(path, options.project_meta.as_deref());
    let registry = options
        .namespace_registry
        .as_deref()
        .and_then(context::load_namespace_registry);

    run_rules(text, &file_name(path), context, registry.as_ref(), &mut result);
    result
}

/// Validate in-memory text with an already resolved context
pub fn evaluate_text(
    file_path: &str,
    content: &str,
    context: ProjectContext,
    registry: Option<&NamespaceRegistry>,
) -> ValidationResult {
    let text = strip_bom(content);
    let mut result = ValidationResult::new(file_path);
    if check_structure(text, &mut result) {
        run_rules(text, &file_name(Path::new(file_path)), context, registry, &mut result);
    }
    result
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Well-formedness gate. A malformed document gets exactly one issue and
/// no other rule runs.
fn check_structure(text: &str, result: &mut ValidationResult) -> bool {
    match parser::check_well_formed(text) {
        Ok(()) => {
            result.set_status(WELL_FORMED, ComplianceStatus::Pass);
            true
        }
        Err(e) => {
            logging::debug(&format!("{} is not well-formed: {}", result.file_path, e));
            result.add_issue(
                ValidationIssue::error(
                    WELL_FORMED,
                    format!("Document is not well-formed XML: {}", e.message),
                )
                .with_line(e.line),
            );
            result.set_status(WELL_FORMED, ComplianceStatus::Fail);
            false
        }
    }
}

fn run_rules(
    text: &str,
    file_name: &str,
    context: ProjectContext,
    registry: Option<&NamespaceRegistry>,
    result: &mut ValidationResult,
) {
    let namespaces = parser::extract_namespaces(text);
    let doc = Document::new(text, file_name, &namespaces, &context, registry);

    for rule in RULES {
        if !(rule.applies)(&doc) {
            result.set_status(rule.id, ComplianceStatus::NotApplicable);
            continue;
        }

        let before = result.issues.len();
        (rule.check)(&doc, result);
        let status = ComplianceStatus::from_issues(
            result.issues[before..]
                .iter()
                .filter(|issue| issue.rule == rule.id),
        );
        if status != ComplianceStatus::Pass {
            logging::debug(&format!("{} {}: {}", result.file_path, rule.id, status));
        }
        result.set_status(rule.id, status);
    }

    logging::info(&format!(
        "{}: {} error(s), {} warning(s)",
        result.file_path,
        result.error_count(),
        result.warning_count()
    ));

    drop(doc);
    result.project_context = context;
}
