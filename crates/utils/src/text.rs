//! Small text helpers shared by the rule implementations.

/// 1-based line number of a byte offset
pub fn line_of(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Join items for display, keeping at most `limit` and noting the rest.
pub fn truncate_list<S: AsRef<str>>(items: &[S], limit: usize) -> String {
    let shown: Vec<&str> = items.iter().take(limit).map(|s| s.as_ref()).collect();
    let mut joined = shown.join(", ");
    if items.len() > limit {
        joined.push_str(&format!(" (+{} more)", items.len() - limit));
    }
    joined
}

/// Byte offset of the end of the opening tag starting at `start`, i.e. the
/// index just past its closing `>`. Quoted attribute values are skipped.
pub fn open_tag_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return i + 1,
            None => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Slice of at most `len` bytes starting at `start`, shortened to a char
/// boundary.
pub fn window(text: &str, start: usize, len: usize) -> &str {
    let start = start.min(text.len());
    let mut end = start.saturating_add(len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let text = "a\nb\nc";
        assert_eq!(line_of(text, 0), 1);
        assert_eq!(line_of(text, 2), 2);
        assert_eq!(line_of(text, 4), 3);
        assert_eq!(line_of(text, 100), 3);
    }

    #[test]
    fn test_truncate_list() {
        assert_eq!(truncate_list(&["a", "b"], 3), "a, b");
        assert_eq!(truncate_list(&["a", "b", "c", "d", "e"], 3), "a, b, c (+2 more)");
    }

    #[test]
    fn test_open_tag_end_skips_quoted_gt() {
        let text = r#"<If Condition="[a > b]">body</If>"#;
        let end = open_tag_end(text, 0);
        assert_eq!(&text[..end], r#"<If Condition="[a > b]">"#);
    }

    #[test]
    fn test_window_respects_char_boundaries() {
        let text = "aé";
        assert_eq!(window(text, 0, 2), "a");
        assert_eq!(window(text, 0, 10), "aé");
    }
}
