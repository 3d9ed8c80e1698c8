use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use utils::text::line_of;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (line {line})")]
pub struct XmlError {
    pub message: String,
    pub line: usize,
}

impl XmlError {
    fn at(text: &str, offset: usize, message: impl Into<String>) -> Self {
        XmlError {
            message: message.into(),
            line: line_of(text, offset),
        }
    }
}

/// Check that `text` is a single well-formed XML document: one root element,
/// matching start/end tags, valid attributes and resolvable entities.
pub fn check_well_formed(text: &str) -> Result<(), XmlError> {
    let body = text.trim_start_matches('\u{feff}');
    let bom_len = text.len() - body.len();

    let mut reader = Reader::from_str(body);
    let mut stack: Vec<String> = Vec::new();
    let mut roots = 0usize;

    loop {
        let start = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() {
                    roots += 1;
                }
                if roots > 1 {
                    return Err(XmlError::at(
                        text,
                        bom_len + start,
                        "junk after document element",
                    ));
                }
                check_attributes(&e).map_err(|m| XmlError::at(text, bom_len + start, m))?;
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Empty(e)) => {
                if stack.is_empty() {
                    roots += 1;
                }
                if roots > 1 {
                    return Err(XmlError::at(
                        text,
                        bom_len + start,
                        "junk after document element",
                    ));
                }
                check_attributes(&e).map_err(|m| XmlError::at(text, bom_len + start, m))?;
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match stack.pop() {
                    Some(open) if open == name => {}
                    Some(open) => {
                        return Err(XmlError::at(
                            text,
                            bom_len + start,
                            format!("mismatched tag: expected </{}>, found </{}>", open, name),
                        ));
                    }
                    None => {
                        return Err(XmlError::at(
                            text,
                            bom_len + start,
                            format!("unexpected closing tag </{}>", name),
                        ));
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if stack.is_empty() {
                    if !t.iter().all(|b| b.is_ascii_whitespace()) {
                        return Err(XmlError::at(
                            text,
                            bom_len + start,
                            "text content outside the root element",
                        ));
                    }
                } else if let Err(e) = t.unescape() {
                    return Err(XmlError::at(
                        text,
                        bom_len + start,
                        format!("invalid character data: {}", e),
                    ));
                }
            }
            Ok(Event::CData(_)) => {
                if stack.is_empty() {
                    return Err(XmlError::at(
                        text,
                        bom_len + start,
                        "CDATA section outside the root element",
                    ));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(XmlError::at(
                    text,
                    bom_len + reader.buffer_position(),
                    e.to_string(),
                ));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::at(
            text,
            text.len(),
            format!("unclosed element <{}>", open),
        ));
    }
    if roots == 0 {
        return Err(XmlError::at(text, text.len(), "no root element found"));
    }

    Ok(())
}

fn check_attributes(start: &BytesStart<'_>) -> Result<(), String> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute: {}", e))?;
        if attr.value.contains(&b'<') {
            return Err(format!(
                "'<' not allowed in value of attribute '{}'",
                String::from_utf8_lossy(attr.key.as_ref())
            ));
        }
        attr.unescape_value().map_err(|e| {
            format!(
                "invalid value for attribute '{}': {}",
                String::from_utf8_lossy(attr.key.as_ref()),
                e
            )
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed_document() {
        let text = "\u{feff}<?xml version=\"1.0\"?>\n<Activity x:Class=\"Main\">\n  <!-- note -->\n  <Sequence DisplayName=\"A &amp; B\" />\n</Activity>\n";
        assert!(check_well_formed(text).is_ok());
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        let text = "<Activity>\n<Sequence>\n</Activity>";
        let err = check_well_formed(text).unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_rejects_unclosed_root() {
        let err = check_well_formed("<Activity><Sequence/>").unwrap_err();
        assert!(err.message.contains("Activity"));
    }

    #[test]
    fn test_rejects_multiple_roots() {
        assert!(check_well_formed("<a/><b/>").is_err());
    }

    #[test]
    fn test_rejects_undefined_entity_in_attribute() {
        assert!(check_well_formed(r#"<a b="x &nbsp; y"/>"#).is_err());
    }

    #[test]
    fn test_rejects_raw_less_than_in_attribute() {
        let text = "<Activity>\n<If Condition=\"[count < 3]\" />\n</Activity>";
        let err = check_well_formed(text).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("Condition"));

        assert!(check_well_formed(r#"<If Condition="[count &lt; 3 AndAlso n > 1]" />"#).is_ok());
    }

    #[test]
    fn test_rejects_duplicate_attribute() {
        assert!(check_well_formed(r#"<a b="1" b="2"/>"#).is_err());
    }

    #[test]
    fn test_rejects_empty_document() {
        assert!(check_well_formed("   ").is_err());
    }
}
