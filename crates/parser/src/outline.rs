use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An element located in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written, e.g. `ueab:WriteCellX`
    pub name: String,
    pub parent: Option<usize>,
    /// Byte offset of the opening `<`
    pub start: usize,
    /// Byte offset just past the closing tag (or `/>`)
    pub end: usize,
    /// Raw (still escaped) attribute values in document order
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Element tree of a document in document order. Parsing stops quietly at
/// the first malformed construct; callers only use this on documents that
/// already passed the well-formedness check.
pub fn outline(text: &str) -> Vec<Element> {
    let mut reader = Reader::from_str(text);
    let mut elements: Vec<Element> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    loop {
        let start = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let index = elements.len();
                elements.push(element_from(&e, stack.last().copied(), start));
                stack.push(index);
            }
            Ok(Event::Empty(e)) => {
                let mut element = element_from(&e, stack.last().copied(), start);
                element.end = reader.buffer_position();
                elements.push(element);
            }
            Ok(Event::End(_)) => {
                if let Some(index) = stack.pop() {
                    elements[index].end = reader.buffer_position();
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }

    for index in stack {
        elements[index].end = text.len();
    }

    elements
}

fn element_from(start_tag: &BytesStart<'_>, parent: Option<usize>, start: usize) -> Element {
    let attributes = start_tag
        .attributes()
        .with_checks(false)
        .flatten()
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect();

    Element {
        name: String::from_utf8_lossy(start_tag.name().as_ref()).into_owned(),
        parent,
        start,
        end: start,
        attributes,
    }
}

/// Iterate the ancestors of `index`, nearest first.
pub fn ancestors(elements: &[Element], index: usize) -> impl Iterator<Item = &Element> {
    let mut current = elements.get(index).and_then(|e| e.parent);
    std::iter::from_fn(move || {
        let element = elements.get(current?)?;
        current = element.parent;
        Some(element)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_tracks_parents_and_spans() {
        let text = r#"<Activity><Sequence DisplayName="Main"><ui:LogMessage Level="Info" /></Sequence></Activity>"#;
        let elements = outline(text);

        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1].local_name(), "Sequence");
        assert_eq!(elements[1].attr("DisplayName"), Some("Main"));
        assert_eq!(elements[2].name, "ui:LogMessage");
        assert_eq!(elements[2].parent, Some(1));
        assert_eq!(&text[elements[1].start..elements[1].end], r#"<Sequence DisplayName="Main"><ui:LogMessage Level="Info" /></Sequence>"#);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let text = "<a><b><c/></b></a>";
        let elements = outline(text);
        let names: Vec<&str> = ancestors(&elements, 2).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
