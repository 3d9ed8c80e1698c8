use crate::ContextError;
use models::NamespaceRegistry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Accepted registry layouts: a bare prefix map or one nested under
/// `namespaces`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RegistryFile {
    Wrapped {
        namespaces: BTreeMap<String, String>,
    },
    Flat(BTreeMap<String, String>),
}

/// Load the external prefix to URI registry. Failures are logged and
/// treated as "no registry".
pub fn load_namespace_registry(path: &Path) -> Option<NamespaceRegistry> {
    match read_registry(path) {
        Ok(registry) => Some(registry),
        Err(e) => {
            logging::debug(&format!(
                "Ignoring namespace registry {}: {}",
                path.display(),
                e
            ));
            None
        }
    }
}

fn read_registry(path: &Path) -> Result<NamespaceRegistry, ContextError> {
    let content = fs::read_to_string(path)?;
    let file: RegistryFile = serde_json::from_str(&content)?;

    let namespaces = match file {
        RegistryFile::Wrapped { namespaces } => namespaces,
        RegistryFile::Flat(namespaces) => namespaces,
    };

    Ok(NamespaceRegistry { namespaces })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_loads_flat_registry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(
            &path,
            r#"{"ui": "http://schemas.uipath.com/workflow/activities"}"#,
        )
        .unwrap();

        let registry = load_namespace_registry(&path).unwrap();
        assert_eq!(
            registry.expected_uri("ui"),
            Some("http://schemas.uipath.com/workflow/activities")
        );
    }

    #[test]
    fn test_loads_wrapped_registry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, r#"{"namespaces": {"x": "urn:x"}}"#).unwrap();

        let registry = load_namespace_registry(&path).unwrap();
        assert_eq!(registry.expected_uri("x"), Some("urn:x"));
        assert_eq!(registry.namespaces.len(), 1);
    }

    #[test]
    fn test_bad_registry_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        fs::write(&path, r#"["not", "a", "map"]"#).unwrap();

        assert!(load_namespace_registry(&path).is_none());
        assert!(load_namespace_registry(&dir.path().join("missing.json")).is_none());
    }
}
