use lazy_static::lazy_static;
use models::NamespaceMap;
use regex::Regex;

lazy_static! {
    static ref XMLNS_DECLARATION: Regex = Regex::new(
        r#"(?:^|\s)xmlns(?::([A-Za-z_][\w.\-]*))?\s*=\s*(?:"([^"]*)"|'([^']*)')"#
    )
    .expect("Failed to compile xmlns declaration regex");
}

/// Collect `xmlns` / `xmlns:prefix` declarations from anywhere in the text.
///
/// This is a lexical scan so it also works on documents a strict parser
/// would reject. The default namespace is keyed by the empty string and the
/// first declaration of a prefix wins.
pub fn extract_namespaces(text: &str) -> NamespaceMap {
    let mut namespaces = NamespaceMap::new();

    for caps in XMLNS_DECLARATION.captures_iter(text) {
        let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let uri = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or("");

        namespaces
            .entry(prefix.to_string())
            .or_insert_with(|| uri.to_string());
    }

    namespaces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_default_and_prefixed() {
        let text = r#"<Activity mc:Ignorable="sap sap2010" x:Class="Main"
  xmlns="http://schemas.microsoft.com/netfx/2009/xaml/activities"
  xmlns:x='http://schemas.microsoft.com/winfx/2006/xaml'
  xmlns:sap2010="http://schemas.microsoft.com/netfx/2010/xaml/activities/presentation">"#;

        let namespaces = extract_namespaces(text);

        assert_eq!(namespaces.len(), 3);
        assert_eq!(
            namespaces.get("").map(String::as_str),
            Some("http://schemas.microsoft.com/netfx/2009/xaml/activities")
        );
        assert_eq!(
            namespaces.get("x").map(String::as_str),
            Some("http://schemas.microsoft.com/winfx/2006/xaml")
        );
        assert!(namespaces.contains_key("sap2010"));
    }

    #[test]
    fn test_first_declaration_wins() {
        let text = r#"<a xmlns:ui="first"><b xmlns:ui="second"/></a>"#;
        let namespaces = extract_namespaces(text);
        assert_eq!(namespaces.get("ui").map(String::as_str), Some("first"));
    }

    #[test]
    fn test_survives_broken_markup() {
        let text = r#"<Activity xmlns:ui="http://schemas.uipath.com/workflow/activities" <<<"#;
        let namespaces = extract_namespaces(text);
        assert!(namespaces.contains_key("ui"));
    }

    #[test]
    fn test_ignores_attribute_suffixes() {
        let text = r#"<a notxmlns:foo="bar" />"#;
        assert!(extract_namespaces(text).is_empty());
    }
}
