use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Prefix to URI bindings declared in a document. The empty prefix is the
/// default namespace.
pub type NamespaceMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// A single finding produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub line: Option<usize>,
    pub element: Option<String>,
}

impl ValidationIssue {
    pub fn new(rule: &str, severity: Severity, message: String) -> Self {
        ValidationIssue {
            rule: rule.to_string(),
            severity,
            message,
            line: None,
            element: None,
        }
    }

    pub fn error(rule: &str, message: String) -> Self {
        Self::new(rule, Severity::Error, message)
    }

    pub fn warning(rule: &str, message: String) -> Self {
        Self::new(rule, Severity::Warning, message)
    }

    pub fn info(rule: &str, message: String) -> Self {
        Self::new(rule, Severity::Info, message)
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

/// Compliance status of one rule for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "WARN")]
    Warn,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl ComplianceStatus {
    /// Status implied by the most severe issue a rule produced
    pub fn from_issues<'a, I>(issues: I) -> Self
    where
        I: IntoIterator<Item = &'a ValidationIssue>,
    {
        let mut status = ComplianceStatus::Pass;
        for issue in issues {
            match issue.severity {
                Severity::Error => return ComplianceStatus::Fail,
                Severity::Warning => status = ComplianceStatus::Warn,
                Severity::Info => {}
            }
        }
        status
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Pass => "PASS",
            ComplianceStatus::Fail => "FAIL",
            ComplianceStatus::Warn => "WARN",
            ComplianceStatus::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expression language of the owning project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "VB")]
    VisualBasic,
    #[serde(rename = "CSharp")]
    CSharp,
    Unknown,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::VisualBasic => write!(f, "VB"),
            Language::CSharp => write!(f, "CSharp"),
            Language::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Runtime compatibility bucket derived from the project's target framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compatibility {
    /// Default Windows runtime
    Windows,
    /// Legacy .NET Framework Windows runtime
    Legacy,
    /// Modern cross-platform runtime
    Portable,
    Unknown,
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compatibility::Windows => write!(f, "Windows"),
            Compatibility::Legacy => write!(f, "Legacy"),
            Compatibility::Portable => write!(f, "Portable"),
            Compatibility::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

/// Project metadata surrounding a workflow document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub language: Language,
    pub compatibility: Compatibility,
    pub dependencies: Vec<Dependency>,
    #[serde(rename = "projectPath")]
    pub project_path: Option<String>,
}

impl Default for ProjectContext {
    fn default() -> Self {
        Self::unknown()
    }
}

impl ProjectContext {
    /// Context used when no project metadata could be resolved
    pub fn unknown() -> Self {
        ProjectContext {
            language: Language::Unknown,
            compatibility: Compatibility::Unknown,
            dependencies: Vec::new(),
            project_path: None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.language != Language::Unknown
    }
}

/// Expected prefix to URI bindings supplied from outside the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceRegistry {
    pub namespaces: BTreeMap<String, String>,
}

impl NamespaceRegistry {
    pub fn expected_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }
}

/// Accumulated outcome of validating one document
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub file_path: String,
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub compliance: IndexMap<String, ComplianceStatus>,
    pub project_context: ProjectContext,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new("")
    }
}

impl ValidationResult {
    pub fn new(file_path: &str) -> Self {
        ValidationResult {
            file_path: file_path.to_string(),
            is_valid: true,
            issues: Vec::new(),
            compliance: IndexMap::new(),
            project_context: ProjectContext::unknown(),
        }
    }

    pub fn add_issue(&mut self, issue: ValidationIssue) {
        if issue.severity == Severity::Error {
            self.is_valid = false;
        }
        self.issues.push(issue);
    }

    pub fn set_status(&mut self, rule: &str, status: ComplianceStatus) {
        self.compliance.insert(rule.to_string(), status);
    }

    pub fn status(&self, rule: &str) -> Option<ComplianceStatus> {
        self.compliance.get(rule).copied()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn issues_for<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.rule == rule)
    }

    /// Whether this document fails the run's exit-code policy. Strict mode
    /// also disqualifies on warnings; `is_valid` is never affected.
    pub fn is_disqualified(&self, strict: bool) -> bool {
        self.error_count() > 0 || (strict && self.warning_count() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_errors_invalidate() {
        let mut result = ValidationResult::new("Main.xaml");
        result.add_issue(ValidationIssue::warning("HR-7", "warn".to_string()));
        result.add_issue(ValidationIssue::info("HR-1", "info".to_string()));
        assert!(result.is_valid);

        result.add_issue(ValidationIssue::error("HR-2", "err".to_string()));
        assert!(!result.is_valid);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_strict_disqualification_keeps_validity() {
        let mut result = ValidationResult::new("Main.xaml");
        result.add_issue(ValidationIssue::warning("HR-7", "warn".to_string()));

        assert!(!result.is_disqualified(false));
        assert!(result.is_disqualified(true));
        assert!(result.is_valid);
    }

    #[test]
    fn test_status_from_issues() {
        let info = ValidationIssue::info("R", "i".to_string());
        let warning = ValidationIssue::warning("R", "w".to_string());
        let error = ValidationIssue::error("R", "e".to_string());

        assert_eq!(ComplianceStatus::from_issues(std::iter::empty()), ComplianceStatus::Pass);
        assert_eq!(
            ComplianceStatus::from_issues([&info]),
            ComplianceStatus::Pass
        );
        assert_eq!(
            ComplianceStatus::from_issues([&info, &warning]),
            ComplianceStatus::Warn
        );
        assert_eq!(
            ComplianceStatus::from_issues([&warning, &error]),
            ComplianceStatus::Fail
        );
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"WARNING\""
        );
        assert_eq!(
            serde_json::to_string(&ComplianceStatus::NotApplicable).unwrap(),
            "\"N/A\""
        );
        let context = serde_json::to_value(ProjectContext::unknown()).unwrap();
        assert_eq!(context["language"], "Unknown");
        assert!(context["projectPath"].is_null());
    }
}
