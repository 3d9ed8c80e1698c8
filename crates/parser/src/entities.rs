use quick_xml::escape::unescape;

/// Decode XML entity references, returning the input unchanged when it holds
/// a reference that cannot be resolved.
pub fn decode_entities(raw: &str) -> String {
    match unescape(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
