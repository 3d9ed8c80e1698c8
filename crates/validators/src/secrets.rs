use crate::rule_ids::SECRETS;
use crate::Document;
use lazy_static::lazy_static;
use models::{ValidationIssue, ValidationResult};
use regex::Regex;
use utils::text::line_of;

/// A credential pattern. With `value_group` set, matches whose captured
/// value is a placeholder are ignored.
struct SecretPattern {
    kind: &'static str,
    regex: Regex,
    value_group: Option<usize>,
}

fn pattern(kind: &'static str, regex: &str, value_group: Option<usize>) -> SecretPattern {
    SecretPattern {
        kind,
        regex: Regex::new(regex).expect("Failed to compile secret pattern"),
        value_group,
    }
}

lazy_static! {
    static ref SECRET_PATTERNS: Vec<SecretPattern> = vec![
        pattern("password attribute", r#"(?i)\b(?:password|passwd|pwd)\s*=\s*"([^"]*)""#, Some(1)),
        pattern("API key attribute", r#"(?i)\bapi[_\-]?key\s*=\s*"([^"]*)""#, Some(1)),
        pattern("client secret attribute", r#"(?i)\b(?:client[_\-]?)?secret\s*=\s*"([^"]*)""#, Some(1)),
        pattern("token attribute", r#"(?i)\b(?:access[_\-]?|auth[_\-]?|api[_\-]?|bearer[_\-]?)?token\s*=\s*"([^"]*)""#, Some(1)),
        pattern("SecureString attribute", r#"(?i)\bsecure(?:string|password)\s*=\s*"([^"]*)""#, Some(1)),
        pattern("password literal in expression", r"(?i)\b\w*(?:password|pwd)\w*\s*=\s*&quot;([^&]*)&quot;", Some(1)),
        pattern("bearer token", r"(?i)\bbearer\s+([A-Za-z0-9\-._~+/]{16,}=*)", Some(1)),
        pattern("basic authentication header", r"(?i)\bbasic\s+([A-Za-z0-9+/]{16,}={0,2})", Some(1)),
        pattern("credentials in URL", r#"(?i)\b[a-z][a-z0-9+.\-]*://([^:/\s"@&]+:[^@/\s"&]+)@"#, Some(1)),
        pattern("connection string password", r#"(?i)\b(?:password|pwd)\s*=\s*([^;"&\s][^;"&]*);"#, Some(1)),
        pattern("AWS access key", r"\b(AKIA[0-9A-Z]{16})\b", Some(1)),
        pattern("private key block", r"-----BEGIN (?:RSA |EC |DSA |OPENSSH )?PRIVATE KEY-----", None),
        pattern("personal access token", r"\b((?:ghp|gho|ghu|ghs|ghr)_[A-Za-z0-9]{36,}|xox[abpr]-[A-Za-z0-9\-]{10,})", Some(1)),
        pattern("empty credential asset name", r#"<(?:\w+:)?GetRobotCredential\b[^>]*\sAssetName\s*=\s*"""#, None),
    ];
}

/// Captured values that stand for "no literal secret here"
fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.starts_with('{')
        || value.starts_with('[')
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("nothing")
        || value.eq_ignore_ascii_case("null")
}

/// Hardcoded credentials. Matched values are never included in messages.
pub fn validate_secrets(doc: &Document<'_>, result: &mut ValidationResult) {
    for secret in SECRET_PATTERNS.iter() {
        let mut count = 0usize;
        let mut first: Option<usize> = None;

        for caps in secret.regex.captures_iter(doc.text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if let Some(group) = secret.value_group {
                match caps.get(group) {
                    Some(value) if !is_placeholder(value.as_str()) => {}
                    _ => continue,
                }
            }
            count += 1;
            first.get_or_insert(whole.start());
        }

        if let Some(offset) = first {
            let line = line_of(doc.text, offset);
            result.add_issue(
                ValidationIssue::error(
                    SECRETS,
                    format!(
                        "Possible hardcoded {} ({} occurrence(s), first on line {}); use a credential asset or SecureString argument",
                        secret.kind, count, line
                    ),
                )
                .with_line(line),
            );
        }
    }
}
