use crate::ContextError;
use indexmap::IndexMap;
use models::{Compatibility, Dependency, Language, ProjectContext};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE_NAME: &str = "project.json";

/// The parts of the project metadata the validator cares about
#[derive(Debug, Deserialize)]
struct ProjectFile {
    #[serde(rename = "expressionLanguage")]
    expression_language: Option<String>,

    #[serde(rename = "targetFramework")]
    target_framework: Option<String>,

    #[serde(default)]
    dependencies: Option<Dependencies>,
}

/// `dependencies` as written. Anything but an object contributes nothing
/// and leaves the other fields usable.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Dependencies {
    Listed(IndexMap<String, Value>),
    Other(Value),
}

impl ProjectFile {
    fn dependencies(&self) -> Vec<Dependency> {
        match &self.dependencies {
            Some(Dependencies::Listed(listed)) => listed
                .iter()
                .map(|(name, version)| Dependency {
                    name: name.clone(),
                    version: version_string(version),
                })
                .collect(),
            Some(Dependencies::Other(value)) => {
                logging::debug(&format!("Ignoring dependencies that are not an object: {}", value));
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}

/// Resolve the project context for a document. Any failure yields the
/// unknown context so dependent checks are skipped instead of failing.
pub fn resolve_project_context(document: &Path, explicit: Option<&Path>) -> ProjectContext {
    match load_project_context(document, explicit) {
        Ok(context) => context,
        Err(e) => {
            logging::debug(&format!(
                "Project context unavailable for {}: {}",
                document.display(),
                e
            ));
            ProjectContext::unknown()
        }
    }
}

fn load_project_context(
    document: &Path,
    explicit: Option<&Path>,
) -> Result<ProjectContext, ContextError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_project_file(document).ok_or(ContextError::NotFound(PROJECT_FILE_NAME))?,
    };

    let content = fs::read_to_string(&path)?;
    let project: ProjectFile = serde_json::from_str(&content)?;

    logging::debug(&format!("Using project metadata {}", path.display()));

    Ok(ProjectContext {
        language: infer_language(project.expression_language.as_deref()),
        compatibility: infer_compatibility(project.target_framework.as_deref()),
        dependencies: project.dependencies(),
        project_path: Some(path.display().to_string()),
    })
}

/// Walk up from the document's directory looking for the project file.
pub fn find_project_file(document: &Path) -> Option<PathBuf> {
    let absolute = document
        .canonicalize()
        .unwrap_or_else(|_| document.to_path_buf());
    let start = absolute.parent()?;

    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

fn infer_language(expression_language: Option<&str>) -> Language {
    match expression_language {
        Some(lang) if lang.contains("CSharp") || lang.contains("C#") => Language::CSharp,
        // Projects without the field predate C# support
        _ => Language::VisualBasic,
    }
}

fn infer_compatibility(target_framework: Option<&str>) -> Compatibility {
    let framework = target_framework.unwrap_or("").to_lowercase();
    if framework.contains("portable") || framework.contains("crossplatform") {
        Compatibility::Portable
    } else if framework.contains("legacy") {
        Compatibility::Legacy
    } else {
        Compatibility::Windows
    }
}

fn version_string(value: &Value) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .to_string()
}
