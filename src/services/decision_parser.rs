//! Turns a model completion into a [`Decision`].
//!
//! Two reply shapes are understood: a JSON object with `final_answer` or
//! `search_query` (possibly wrapped in prose or a code fence), and marker
//! lines such as `Final answer: True` / `Search query: ...`. A verdict
//! anywhere in the reply takes precedence over a search query.

use serde_json::{Map, Value};

use crate::domain::errors::ParseError;
use crate::domain::models::{Decision, Verdict};

const EXCERPT_CHARS: usize = 200;

/// Parse a decision-step reply
pub fn parse_decision(text: &str) -> Result<Decision, ParseError> {
    let text = non_empty(text)?;
    let objects = json_objects(text);

    if let Some(verdict) = find_verdict(text, &objects) {
        return Ok(Decision::Verdict(verdict));
    }

    objects
        .iter()
        .find_map(|object| object.get("search_query").and_then(Value::as_str))
        .map(clean_query)
        .filter(|query| !query.is_empty())
        .or_else(|| {
            marker_values(text, &["search query", "search_query", "query"])
                .map(clean_query)
                .find(|query| !query.is_empty())
        })
        .filter(|query| !query.is_empty())
        .map(Decision::search)
        .ok_or_else(|| unrecognized(text))
}

/// Parse a reply that must carry a verdict; search requests are ignored
pub fn parse_verdict(text: &str) -> Result<Verdict, ParseError> {
    let text = non_empty(text)?;
    let objects = json_objects(text);
    find_verdict(text, &objects).ok_or_else(|| unrecognized(text))
}

/// Map a reported confidence onto `[0, 1]`
///
/// Values in `(1, 100]` are read as percentages. Non-finite values are dropped.
pub fn normalize_confidence(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let value = if value > 1.0 && value <= 100.0 {
        value / 100.0
    } else {
        value
    };
    Some(value.clamp(0.0, 1.0))
}

fn non_empty(text: &str) -> Result<&str, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        Err(ParseError::Empty)
    } else {
        Ok(text)
    }
}

fn unrecognized(text: &str) -> ParseError {
    let mut excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
    if text.chars().count() > EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    ParseError::Unrecognized { excerpt }
}

fn find_verdict(text: &str, objects: &[Map<String, Value>]) -> Option<Verdict> {
    for object in objects {
        if let Some(label) = object.get("final_answer").and_then(json_label) {
            let confidence = object.get("confidence").and_then(json_confidence);
            let rationale = ["rationale", "reasoning", "explanation"]
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(text);
            return Some(Verdict {
                label,
                confidence,
                rationale: rationale.to_string(),
            });
        }
    }

    let label = marker_values(text, &["final answer", "final_answer", "verdict"]).find_map(text_label)?;
    let confidence = marker_values(text, &["confidence"]).find_map(text_confidence);
    let rationale = marker_value(text, &["rationale", "reasoning", "explanation"])
        .filter(|r| !r.is_empty())
        .unwrap_or(text);

    Some(Verdict {
        label,
        confidence,
        rationale: rationale.to_string(),
    })
}

fn json_label(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => text_label(s),
        _ => None,
    }
}

fn text_label(raw: &str) -> Option<bool> {
    let word = raw
        .trim_matches(|c: char| !c.is_alphanumeric())
        .split_whitespace()
        .next()?
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    match word.as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn json_confidence(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().and_then(normalize_confidence),
        Value::String(s) => text_confidence(s),
        _ => None,
    }
}

fn text_confidence(raw: &str) -> Option<f64> {
    let raw = raw.trim().trim_matches(|c: char| c == '*' || c == '"' || c == '\'');
    let number: String = raw
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value: f64 = number.parse().ok()?;

    if raw[number.len()..].trim_start().starts_with('%') {
        Some((value / 100.0).clamp(0.0, 1.0)).filter(|v| v.is_finite())
    } else {
        normalize_confidence(value)
    }
}

/// Value following the first line that starts with one of `labels` and a colon
fn marker_value<'a>(text: &'a str, labels: &'a [&'a str]) -> Option<&'a str> {
    marker_values(text, labels).next()
}

/// Values of every line that starts with one of `labels` and a colon, in order
///
/// Leading markdown decoration (`**`, `#`, `-`, `>`) is ignored and the
/// label match is case-insensitive.
fn marker_values<'a>(text: &'a str, labels: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
    text.lines().filter_map(move |line| {
        let line = line.trim_start_matches(|c: char| c.is_whitespace() || "*#->_`".contains(c));
        labels.iter().find_map(|label| {
            let head = line.get(..label.len())?;
            if !head.eq_ignore_ascii_case(label) {
                return None;
            }
            let rest = line[label.len()..].trim_start_matches(|c: char| c == '*' || c == '_' || c == ' ');
            let value = rest.strip_prefix(':').or_else(|| rest.strip_prefix('='))?;
            Some(value.trim().trim_matches('*').trim())
        })
    })
}

fn clean_query(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '*')
        .trim()
        .to_string()
}

/// Every top-level JSON object embedded in `text`, in order of appearance
fn json_objects(text: &str) -> Vec<Map<String, Value>> {
    let mut objects = Vec::new();
    let mut from = 0;

    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        let parsed = matching_brace(&text[start..]).and_then(|len| {
            match serde_json::from_str::<Value>(&text[start..start + len]) {
                Ok(Value::Object(object)) => Some((object, len)),
                _ => None,
            }
        });

        match parsed {
            Some((object, len)) => {
                objects.push(object);
                from = start + len;
            }
            None => from = start + 1,
        }
    }

    objects
}

/// Byte length of the balanced `{...}` at the start of `text`
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
