use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Ordered redaction rules: provider key formats first, then generic
/// header, field and query-parameter shapes.
const RULES: &[(&str, &str)] = &[
    (r"sk-ant-[A-Za-z0-9_-]{20,}", "[API_KEY_REDACTED]"),
    (r"sk-(?:proj-)?[A-Za-z0-9_-]{20,}", "[API_KEY_REDACTED]"),
    (r"AIza[0-9A-Za-z_-]{30,}", "[API_KEY_REDACTED]"),
    (r"Bearer\s+[A-Za-z0-9._~+/=-]+", "Bearer [TOKEN_REDACTED]"),
    (
        r#"(?i)(["']?(?:x-api-key|x-goog-api-key|api_key|apikey|token|secret|key)["']?\s*[:=]\s*["']?)[A-Za-z0-9._-]{16,}"#,
        "${1}[REDACTED]",
    ),
    (
        r#"(?i)(["']?password["']?\s*[:=]\s*["']?)[^"'\s,}]+"#,
        "${1}[REDACTED]",
    ),
];

static PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|re| (re, *replacement))
        })
        .collect()
});

/// Redact API keys, bearer tokens and password fields from `message`
///
/// Applied to provider error bodies before they are logged or stored, and
/// to configuration before it is displayed.
pub fn scrub(message: &str) -> String {
    PATTERNS
        .iter()
        .fold(message.to_string(), |text, (pattern, replacement)| {
            pattern
                .replace_all(&text, |caps: &Captures<'_>| {
                    let mut out = String::new();
                    caps.expand(replacement, &mut out);
                    out
                })
                .into_owned()
        })
}
