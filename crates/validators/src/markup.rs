//! Lexical views over the raw document text shared by several rules.

use lazy_static::lazy_static;
use parser::Element;
use regex::Regex;
use utils::text::open_tag_end;

lazy_static! {
    static ref OPEN_TAG: Regex = Regex::new(r"<([A-Za-z_][\w\-]*:)?([A-Za-z_][\w.\-]*)")
        .expect("Failed to compile open tag regex");
    static ref ATTRIBUTE: Regex = Regex::new(r#"\s([A-Za-z_][\w:.\-]*)\s*=\s*"([^"]*)""#)
        .expect("Failed to compile attribute regex");
}

/// An opening tag as written in the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    pub start: usize,
    pub prefix: Option<&'a str>,
    pub local: &'a str,
}

/// An attribute as written in the text, value still escaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: &'a str,
    /// Byte offset of the value
    pub offset: usize,
}

pub fn open_tags(text: &str) -> impl Iterator<Item = Tag<'_>> {
    OPEN_TAG.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let local = caps.get(2)?.as_str();
        let prefix = caps.get(1).map(|m| m.as_str().trim_end_matches(':'));
        Some(Tag {
            start: whole.start(),
            prefix,
            local,
        })
    })
}

pub fn attributes(text: &str) -> impl Iterator<Item = Attribute<'_>> {
    ATTRIBUTE.captures_iter(text).filter_map(|caps| {
        let name = caps.get(1)?.as_str();
        let value = caps.get(2)?;
        Some(Attribute {
            name,
            value: value.as_str(),
            offset: value.start(),
        })
    })
}

/// Attribute values written as `[expression]`
pub fn is_expression(value: &str) -> bool {
    let value = value.trim();
    value.len() >= 2 && value.starts_with('[') && value.ends_with(']')
}

/// The opening tag text starting at `start`
pub fn open_tag(text: &str, start: usize) -> &str {
    &text[start..open_tag_end(text, start)]
}

/// Value of an attribute inside the opening tag at `start`
pub fn tag_attribute<'a>(text: &'a str, start: usize, name: &str) -> Option<&'a str> {
    let tag = open_tag(text, start);
    attributes(tag)
        .find(|attr| attr.name == name)
        .map(|attr| attr.value)
}

/// Label for an activity occurrence: its DisplayName, else its tag name.
pub fn label(text: &str, start: usize, local: &str) -> String {
    match tag_attribute(text, start, "DisplayName") {
        Some(name) if !name.trim().is_empty() => format!("{} '{}'", local, name),
        _ => local.to_string(),
    }
}

/// Byte range of the content between an element's opening and closing tags.
/// `None` for self-closing elements.
pub fn body_range(text: &str, element: &Element) -> Option<(usize, usize)> {
    let open_end = open_tag_end(text, element.start);
    if open_end > element.end || text[element.start..open_end].ends_with("/>") {
        return None;
    }
    let close = text[..element.end].rfind("</")?;
    if close < open_end {
        return None;
    }
    Some((open_end, close))
}

pub fn body<'a>(text: &'a str, element: &Element) -> Option<&'a str> {
    body_range(text, element).map(|(start, end)| &text[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_tags_split_prefix_and_local() {
        let text = r#"<Sequence><ui:LogMessage Level="Info" /><Sequence.Variables /></Sequence>"#;
        let tags: Vec<(Option<&str>, &str)> = open_tags(text).map(|t| (t.prefix, t.local)).collect();
        assert_eq!(
            tags,
            vec![
                (None, "Sequence"),
                (Some("ui"), "LogMessage"),
                (None, "Sequence.Variables")
            ]
        );
    }

    #[test]
    fn test_attributes_and_expressions() {
        let text = r#"<If Condition="[a &gt; b]" DisplayName="Check" />"#;
        let attrs: Vec<Attribute> = attributes(text).collect();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "Condition");
        assert!(is_expression(attrs[0].value));
        assert!(!is_expression(attrs[1].value));
        assert_eq!(&text[attrs[1].offset..attrs[1].offset + 5], "Check");
    }

    #[test]
    fn test_label_prefers_display_name() {
        let text = r#"<ui:LogMessage DisplayName="Log Start" />"#;
        assert_eq!(label(text, 0, "LogMessage"), "LogMessage 'Log Start'");
        assert_eq!(label("<Assign />", 0, "Assign"), "Assign");
    }

    #[test]
    fn test_body_of_elements() {
        let text = "<a><b>text</b><c /></a>";
        let elements = parser::outline(text);
        assert_eq!(body(text, &elements[1]), Some("text"));
        assert_eq!(body(text, &elements[2]), None);
        assert_eq!(body(text, &elements[0]), Some("<b>text</b><c />"));
    }
}
